//! Domain Layer
//!
//! Core location types shared by every adapter. No I/O, no framework
//! dependencies beyond serde.

pub mod location;
