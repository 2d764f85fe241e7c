//! Rolling window statistics.
//!
//! # Data Flow
//! ```text
//! ProbeOutcome
//!     → rolling.rs (append, evict oldest, recount errors)
//!     → pool.rs (corroborated active-pool transition detection)
//!     → WindowSnapshot (error rate, sample count, active pool, transition)
//!     → alerting engine
//! ```
//!
//! # Design Decisions
//! - Window exclusively owns the outcome ring and the pool state
//! - Error count maintained incrementally; rate is 0% on an empty window
//! - Corroboration guards against a single noisy probe flipping the pool

pub mod pool;
pub mod rolling;

pub use pool::{PoolState, PoolTracker, PoolTransition};
pub use rolling::{RollingWindow, WindowSnapshot};
