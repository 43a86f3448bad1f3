//! Application Layer
//!
//! Port definitions for the backing stores, following the Hexagonal
//! Architecture pattern.

pub mod ports;
