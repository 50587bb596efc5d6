//! Generic runtime utilities shared across Rivulet crates.
//!
//! This crate holds the pieces that have no knowledge of streaming, models,
//! or providers:
//! - `clock`: a time abstraction (`Clock`, `SystemClock`, `MockClock`) so
//!   that time-dependent state machines can be tested deterministically
//! - `backoff`: delay calculation strategies for retry loops

#![forbid(unsafe_code)]
#![warn(rust_2018_idioms)]
#![warn(clippy::all, clippy::perf, clippy::complexity, clippy::suspicious)]

pub mod backoff;
pub mod clock;

pub use backoff::BackoffStrategy;
pub use clock::{Clock, MockClock, SystemClock};
