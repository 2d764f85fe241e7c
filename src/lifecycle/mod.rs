//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (startup.rs):
//!     WatcherConfig → metrics → prober + notifier → admin API → reload watcher → loop
//!
//! Shutdown (shutdown.rs):
//!     broadcast → loop exits after its current tick → drain within grace, else abort
//!
//! Signals (signals.rs):
//!     SIGTERM/SIGINT → SignalEvent::Shutdown
//!     SIGHUP → SignalEvent::Reload (re-read the config file)
//! ```

pub mod shutdown;
pub mod signals;
pub mod startup;

pub use shutdown::Shutdown;
