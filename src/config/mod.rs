//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! gateway-admin.toml
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → AdminServiceConfig (validated, immutable)
//!     → shared via ArcSwap with the admin API
//!
//! On file change:
//!     watcher.rs detects change
//!     → loader.rs loads new config
//!     → validation.rs validates
//!     → atomic swap into the admin state
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; changes require full reload
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks
//! - Listener and metrics addresses are read once at startup; reloads only
//!   affect per-request settings (API key, export settings)

pub mod loader;
pub mod schema;
pub mod validation;
pub mod watcher;

pub use loader::{load_config, ConfigError};
pub use schema::{AdminConfig, AdminServiceConfig, ExportConfig, LogFormat, ObservabilityConfig};
pub use watcher::ConfigWatcher;
