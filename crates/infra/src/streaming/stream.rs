//! Reconnecting stream decorator
//!
//! [`RecoverableStream`] wraps a stream-producing factory and exposes the
//! same pull-based contract as the wrapped stream, with all failure handling
//! delegated to a [`StreamRecoveryManager`]. Transient failures are repaired
//! in place by reopening the connection; the consumer only ever sees chunks,
//! a clean end, or one terminal error.
//!
//! Reconnection starts the provider's stream from scratch: chunks already
//! delivered are never replayed, and output the provider produced but never
//! delivered before the drop is not recovered. There is no cursor to resume
//! from; this is documented behavior, not a bug to patch here.

use std::fmt;

use bytes::Bytes;
use futures::stream::unfold;
use futures::Stream;
use rivulet_common::{Clock, SystemClock};
use rivulet_core::classify::is_recoverable;
use rivulet_core::{BoxChunkStream, RecoveryPolicy, StreamFactory};
use rivulet_domain::StreamError;
use tracing::{debug, warn};
use uuid::Uuid;

use super::manager::StreamRecoveryManager;
use super::metrics::StreamMetrics;

/// Session-level lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Constructed, factory not yet invoked
    Created,
    /// First connection being opened
    Opening,
    /// Chunks flowing from a live reader
    Streaming,
    /// Transient failure being repaired via the factory
    Reconnecting,
    /// Clean end of stream
    Completed,
    /// Terminal error delivered to the consumer
    Failed,
    /// Consumer cancelled the session
    Cancelled,
}

impl SessionState {
    /// Whether the session can produce no further chunks.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Failed | Self::Cancelled)
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Created => write!(f, "CREATED"),
            Self::Opening => write!(f, "OPENING"),
            Self::Streaming => write!(f, "STREAMING"),
            Self::Reconnecting => write!(f, "RECONNECTING"),
            Self::Completed => write!(f, "COMPLETED"),
            Self::Failed => write!(f, "FAILED"),
            Self::Cancelled => write!(f, "CANCELLED"),
        }
    }
}

/// Pull-based stream decorator with transparent reconnection.
///
/// At most one underlying reader is live at any instant; the previous reader
/// is always released before a replacement is opened.
pub struct RecoverableStream<C: Clock = SystemClock> {
    session_id: Uuid,
    factory: StreamFactory,
    manager: StreamRecoveryManager<C>,
    reader: Option<BoxChunkStream>,
    state: SessionState,
    metrics: StreamMetrics,
}

impl RecoverableStream<SystemClock> {
    /// Wrap a factory with the given recovery policy, using the system clock.
    pub fn new(factory: StreamFactory, policy: RecoveryPolicy) -> Self {
        Self::with_manager(factory, StreamRecoveryManager::new(policy))
    }
}

impl<C: Clock> RecoverableStream<C> {
    /// Wrap a factory around an existing manager (lets tests inject a clock).
    pub fn with_manager(factory: StreamFactory, manager: StreamRecoveryManager<C>) -> Self {
        Self {
            session_id: Uuid::new_v4(),
            factory,
            manager,
            reader: None,
            state: SessionState::Created,
            metrics: StreamMetrics::new(),
        }
    }

    /// Session identifier used in log output.
    pub fn session_id(&self) -> Uuid {
        self.session_id
    }

    /// Current session state.
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Counters for this session.
    pub fn metrics(&self) -> &StreamMetrics {
        &self.metrics
    }

    /// The recovery manager owned by this session.
    pub fn manager(&self) -> &StreamRecoveryManager<C> {
        &self.manager
    }

    /// Pull the next chunk.
    ///
    /// Returns `None` on clean completion (and after cancellation), chunks
    /// in upstream order otherwise. A terminal failure is delivered once as
    /// `Some(Err(..))`; every later call returns `None`.
    pub async fn next_chunk(&mut self) -> Option<rivulet_domain::Result<Bytes>> {
        loop {
            if self.state.is_terminal() {
                return None;
            }

            // Open (or reopen) the underlying reader if none is live.
            if self.reader.is_none() {
                self.state = match self.state {
                    SessionState::Created | SessionState::Opening => SessionState::Opening,
                    _ => SessionState::Reconnecting,
                };
                match (self.factory)().await {
                    Ok(reader) => {
                        debug!(session_id = %self.session_id, state = %self.state, "reader opened");
                        self.reader = Some(reader);
                        self.state = SessionState::Streaming;
                        self.manager.start_monitoring();
                    }
                    Err(err) => {
                        if self.manager.handle_error(&err).await {
                            self.metrics.record_recovery();
                            continue;
                        }
                        return Some(Err(self.fail(err).await));
                    }
                }
            }

            let read_result = match self.reader.as_mut() {
                Some(reader) => reader.next_chunk().await,
                None => continue,
            };

            match read_result {
                Ok(Some(chunk)) => {
                    self.manager.record_activity();
                    self.metrics.record_chunk(chunk.len());
                    return Some(Ok(chunk));
                }
                Ok(None) => {
                    self.release_reader().await;
                    self.manager.stop();
                    self.state = SessionState::Completed;
                    self.metrics.record_completed();
                    return None;
                }
                Err(err) => {
                    if self.manager.handle_error(&err).await {
                        // Recovered: drop the dead reader and reopen through
                        // the factory. Chunks delivered before the failure
                        // are not replayed.
                        self.release_reader().await;
                        self.state = SessionState::Reconnecting;
                        self.metrics.record_recovery();
                        continue;
                    }
                    return Some(Err(self.fail(err).await));
                }
            }
        }
    }

    /// Cancel the session: stop the watchdog and release the live reader.
    ///
    /// Raises nothing; in-flight upstream work is abandoned, not aborted.
    /// After cancellation every `next_chunk` call returns `None`.
    pub async fn cancel(&mut self) {
        if self.state.is_terminal() {
            return;
        }
        self.manager.stop();
        self.release_reader().await;
        self.state = SessionState::Cancelled;
        debug!(session_id = %self.session_id, "stream cancelled by consumer");
    }

    /// Adapt this session into a `futures::Stream` of chunk results.
    pub fn into_stream(self) -> impl Stream<Item = rivulet_domain::Result<Bytes>> + Send {
        unfold(self, |mut session| async move {
            session.next_chunk().await.map(|item| (item, session))
        })
    }

    /// Enter the Failed state: release resources, stop the manager and shape
    /// the terminal error.
    async fn fail(&mut self, cause: StreamError) -> StreamError {
        self.release_reader().await;
        self.manager.stop();
        self.state = SessionState::Failed;

        let exhausted =
            self.manager.retries_exhausted() && is_recoverable(&cause.to_string());
        warn!(
            session_id = %self.session_id,
            cause = %cause,
            retries = self.manager.retry_count(),
            exhausted,
            "stream failed"
        );
        if exhausted {
            StreamError::RetriesExhausted { attempts: self.manager.retry_count() }
        } else {
            cause
        }
    }

    async fn release_reader(&mut self) {
        if let Some(mut reader) = self.reader.take() {
            reader.release().await;
        }
    }
}

impl<C: Clock> fmt::Debug for RecoverableStream<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RecoverableStream")
            .field("session_id", &self.session_id)
            .field("state", &self.state)
            .field("reader", &self.reader.is_some())
            .finish()
    }
}
