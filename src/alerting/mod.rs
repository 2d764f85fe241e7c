//! Alert decision subsystem.
//!
//! # Data Flow
//! ```text
//! WindowSnapshot
//!     → engine.rs (failover track + error-rate track, shared cooldown)
//!     → Vec<AlertIntent>
//!     → monitor (maintenance gate)
//!     → notifier
//! ```

pub mod engine;
pub mod types;

pub use engine::{AlertEngine, Cooldown, EngineSettings, EngineStatus};
pub use types::{
    AlertDetails, AlertIntent, AlertKind, AlertState, ErrorRateState, FailoverState,
};
