//! Per-session stream metrics
//!
//! Counters the stream decorator maintains while pulling chunks. Purely
//! observational: nothing in the recovery logic reads them back.

use std::time::{Duration, Instant};

use tracing::debug;

/// Counters for one streaming session.
#[derive(Debug, Clone)]
pub struct StreamMetrics {
    started_at: Instant,
    first_chunk_at: Option<Instant>,
    /// Chunks delivered to the consumer
    pub chunk_count: u64,
    /// Bytes delivered to the consumer
    pub byte_count: u64,
    /// Successful recovery attempts (reconnects) performed
    pub recovery_count: u32,
    /// Whether the session reached a clean end of stream
    pub completed: bool,
}

impl StreamMetrics {
    /// Start tracking a new session.
    pub fn new() -> Self {
        Self {
            started_at: Instant::now(),
            first_chunk_at: None,
            chunk_count: 0,
            byte_count: 0,
            recovery_count: 0,
            completed: false,
        }
    }

    /// Record one delivered chunk.
    pub fn record_chunk(&mut self, bytes: usize) {
        if self.first_chunk_at.is_none() {
            self.first_chunk_at = Some(Instant::now());
        }
        self.chunk_count += 1;
        self.byte_count += bytes as u64;
    }

    /// Record one successful recovery.
    pub fn record_recovery(&mut self) {
        self.recovery_count += 1;
    }

    /// Mark the session as cleanly completed and log a summary.
    pub fn record_completed(&mut self) {
        self.completed = true;
        debug!(
            chunks = self.chunk_count,
            bytes = self.byte_count,
            recoveries = self.recovery_count,
            ttfb_ms = self.time_to_first_chunk().map(|d| d.as_millis() as u64),
            elapsed_ms = self.elapsed().as_millis() as u64,
            "stream completed"
        );
    }

    /// Latency from session start to the first delivered chunk.
    pub fn time_to_first_chunk(&self) -> Option<Duration> {
        self.first_chunk_at.map(|at| at.saturating_duration_since(self.started_at))
    }

    /// Time since the session started.
    pub fn elapsed(&self) -> Duration {
        self.started_at.elapsed()
    }
}

impl Default for StreamMetrics {
    fn default() -> Self {
        Self::new()
    }
}
