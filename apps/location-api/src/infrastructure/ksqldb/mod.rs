//! ksqlDB Integration
//!
//! Everything that talks to the ksqlDB REST API:
//!
//! - `codec`: incremental frame decoder for chunked response bodies
//! - `frames`: wire types for the push and pull query protocols
//! - `relay`: per-session bridge from a chunk stream to vehicle events
//! - `client`: reqwest-based client for `/query` and `/query-stream`

pub mod client;
pub mod codec;
pub mod frames;
pub mod relay;

pub use client::{KsqlClient, KsqlError};
pub use codec::{CodecError, FrameDecoder};
pub use frames::{PullElement, PullRow, PushHeader};
pub use relay::{EventStream, PushSession, RelayError};
