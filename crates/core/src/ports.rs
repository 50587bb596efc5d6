//! Stream-source port interfaces
//!
//! The generative-text transport is a consumed capability: the runtime only
//! needs a factory that opens a fresh pull-based reader, and the two reader
//! operations below. Errors a reader produces must carry message text usable
//! by the keyword classifier (see `classify`).

use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use futures::future::BoxFuture;
use rivulet_domain::{Result, StreamError};

/// A pull-based reader over one live upstream connection.
#[async_trait]
pub trait ChunkStream: Send {
    /// Read the next chunk. `Ok(None)` signals a clean end of stream.
    async fn next_chunk(&mut self) -> Result<Option<Bytes>>;

    /// Release the underlying connection.
    ///
    /// Called exactly once, after the last `next_chunk` call on this reader.
    /// The default implementation drops state on the floor, which is correct
    /// for transports whose connections close on drop.
    async fn release(&mut self) {}
}

/// Boxed reader, the form the runtime passes around.
pub type BoxChunkStream = Box<dyn ChunkStream>;

/// Future resolving to a freshly opened reader.
pub type OpenFuture = BoxFuture<'static, std::result::Result<BoxChunkStream, StreamError>>;

/// Zero-argument factory producing a fresh reader per invocation.
///
/// Each call must open a *new* upstream connection; the recovery runtime
/// invokes it once on open and once per reconnection.
pub type StreamFactory = Arc<dyn Fn() -> OpenFuture + Send + Sync>;

/// Build a [`StreamFactory`] from an async closure.
pub fn stream_factory<F, Fut>(f: F) -> StreamFactory
where
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = std::result::Result<BoxChunkStream, StreamError>> + Send + 'static,
{
    Arc::new(move || Box::pin(f()) as OpenFuture)
}
