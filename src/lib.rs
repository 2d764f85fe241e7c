//! Blue/green pool watcher library

pub mod admin;
pub mod alerting;
pub mod config;
pub mod lifecycle;
pub mod monitor;
pub mod notifier;
pub mod observability;
pub mod probe;
pub mod window;

pub use alerting::{AlertEngine, AlertIntent, AlertKind};
pub use config::schema::WatcherConfig;
pub use lifecycle::Shutdown;
pub use monitor::Watcher;
