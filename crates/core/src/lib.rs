//! # Rivulet Core
//!
//! Pure decision logic layer - no infrastructure dependencies.
//!
//! This crate contains:
//! - The token-budget resolver (deterministic, total)
//! - The recoverable-error keyword classifier
//! - The recovery policy configuration surface
//! - Port interfaces (traits) the streaming runtime consumes
//!
//! ## Architecture Principles
//! - Only depends on `rivulet-common` and `rivulet-domain`
//! - No HTTP, timers, or platform code
//! - All external capabilities via traits

pub mod budget;
pub mod classify;
pub mod policy;
pub mod ports;

pub use budget::TokenBudgetResolver;
pub use classify::is_recoverable;
pub use policy::{ConfigError, RecoveryPolicy, RecoveryPolicyBuilder};
pub use ports::{BoxChunkStream, ChunkStream, StreamFactory};
