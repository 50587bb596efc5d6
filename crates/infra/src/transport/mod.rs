//! Transport adapters producing pull-based readers
//!
//! Adapters are explicit, injected collaborators: the streaming runtime only
//! sees the `ChunkStream`/`StreamFactory` ports, never a concrete client.

pub mod http;

pub use http::{HttpStreamSource, HttpStreamSourceBuilder};
