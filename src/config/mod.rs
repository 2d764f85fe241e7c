//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML) + environment overrides
//!     → loader.rs (parse, deserialize, apply env)
//!     → validation.rs (semantic checks)
//!     → WatcherConfig (validated, immutable)
//!     → handed by reference to each subsystem constructor
//!
//! On reload (file change or SIGHUP):
//!     watcher.rs detects change
//!     → loader.rs loads new config
//!     → validation.rs validates
//!     → live.rs atomically swaps the maintenance snapshot
//!     → monitor observes it on its next tick
//! ```
//!
//! # Design Decisions
//! - Only the maintenance flag is live; everything else needs a restart
//! - Every section is `#[serde(default)]`, so a file only names what it changes
//! - Environment variables from the container deployment override the file

pub mod live;
pub mod loader;
pub mod schema;
pub mod validation;
pub mod watcher;

pub use live::{LiveSettings, RuntimeSettings};
pub use loader::{load_config, load_from_env, ConfigError};
pub use schema::{
    AdminConfig, AlertConfig, LifecycleConfig, LogFormat, NotifierConfig, ObservabilityConfig,
    PollingConfig, TargetConfig, WatcherConfig, WindowConfig,
};
