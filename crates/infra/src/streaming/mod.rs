//! Resilient streaming runtime
//!
//! - `manager`: inactivity watchdog + bounded-retry recovery state machine
//! - `stream`: the reconnecting pull-based stream decorator
//! - `metrics`: per-session counters for observability

pub mod manager;
pub mod metrics;
pub mod stream;

pub use manager::{ManagerState, StreamRecoveryManager};
pub use metrics::StreamMetrics;
pub use stream::{RecoverableStream, SessionState};
