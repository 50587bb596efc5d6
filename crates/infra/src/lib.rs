//! # Rivulet Infra
//!
//! Runtime layer of the resilient streaming subsystem.
//!
//! This crate contains:
//! - `streaming`: the recovery manager (inactivity watchdog + bounded
//!   retries) and the reconnecting stream decorator
//! - `transport`: an HTTP adapter producing pull-based readers for the
//!   streaming runtime
//!
//! ## Architecture
//! - Depends on `rivulet-common`, `rivulet-domain` and `rivulet-core`
//! - All timing decisions go through the injected `Clock`
//! - The transport performs no retries of its own; recovery is owned
//!   exclusively by the streaming layer

pub mod streaming;
pub mod transport;

pub use streaming::{
    ManagerState, RecoverableStream, SessionState, StreamMetrics, StreamRecoveryManager,
};
pub use transport::{HttpStreamSource, HttpStreamSourceBuilder};
