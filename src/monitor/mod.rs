//! Monitoring loop subsystem.
//!
//! # Data Flow
//! ```text
//! interval tick (skip on overlap)
//!     → probe (bounded by request timeout)
//!     → window.record_outcome → WindowSnapshot
//!     → engine.evaluate → AlertIntents
//!     → maintenance gate (one LiveSettings snapshot per tick)
//!         suppressed → "[MAINTENANCE] Alert Suppressed" record
//!         otherwise  → notifier.deliver (bounded by delivery timeout)
//!     → WatcherStatus published on a watch channel
//! ```
//!
//! # Design Decisions
//! - Outcomes are processed strictly in arrival order, one tick at a time
//! - Shutdown is observed only between ticks
//! - Only the maintenance flag crosses thread boundaries

pub mod runner;
pub mod status;

pub use runner::{Dispatch, TickReport, Watcher};
pub use status::{DeliveryCounters, SuppressedAlert, WatcherStatus};
