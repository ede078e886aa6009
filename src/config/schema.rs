//! Configuration schema definitions.
//!
//! All types derive Serde traits for deserialization from the TOML config
//! file. Every section defaults, so an empty file is a valid config.

use serde::{Deserialize, Serialize};

use crate::bundle::BundleFormat;
use crate::openapi::ProjectorSettings;

/// Root configuration for the admin service.
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq)]
#[serde(default)]
pub struct AdminServiceConfig {
    /// Listener configuration.
    pub listener: ListenerConfig,

    /// Admin API access settings.
    pub admin: AdminConfig,

    /// Export document settings.
    pub export: ExportConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,

    /// Entity store settings.
    pub store: StoreConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "127.0.0.1:9180").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "127.0.0.1:9180".to_string(),
        }
    }
}

/// Admin API configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct AdminConfig {
    /// Bearer token required on `/admin/*`. Empty disables the check.
    pub api_key: String,

    /// Whole-request deadline.
    pub request_timeout_secs: u64,
}

impl Default for AdminConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            request_timeout_secs: 30,
        }
    }
}

/// Export document configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ExportConfig {
    /// `info.title` of exported OpenAPI documents.
    pub openapi_title: String,

    /// `openapi` (and `info.version`) of exported OpenAPI documents.
    pub openapi_version: String,

    /// Bundle encoding when the request does not ask for one.
    pub bundle_format: BundleFormat,
}

impl Default for ExportConfig {
    fn default() -> Self {
        let projector = ProjectorSettings::default();
        Self {
            openapi_title: projector.title,
            openapi_version: projector.openapi_version,
            bundle_format: BundleFormat::Json,
        }
    }
}

impl ExportConfig {
    pub fn projector_settings(&self) -> ProjectorSettings {
        ProjectorSettings {
            title: self.openapi_title.clone(),
            openapi_version: self.openapi_version.clone(),
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Default log level; `RUST_LOG` overrides it.
    pub log_level: String,

    pub log_format: LogFormat,

    /// Enable the Prometheus exporter.
    pub metrics_enabled: bool,

    /// Prometheus scrape address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
            metrics_enabled: false,
            metrics_address: "127.0.0.1:9190".to_string(),
        }
    }
}

/// Entity store configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Default)]
#[serde(default)]
pub struct StoreConfig {
    /// Bundle imported into the empty store at startup.
    pub seed_bundle: Option<String>,
}
