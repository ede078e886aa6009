//! Portable configuration bundles.
//!
//! # Data Flow
//! ```text
//! export: Store → export_bundle (validate refs, extract variables) → encode
//! import: decode → import_bundle (substitute, creating, staged validation)
//!             → StagedStore::commit → Store
//! ```
//!
//! # Design Decisions
//! - Entities are exported as stored; only hosts and designated secrets
//!   are swapped for placeholders
//! - Import is all-or-nothing

pub mod export;
pub mod format;
pub mod import;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::entity::{Consumer, Route, Service, Upstream, Variable};
use crate::error::EngineError;

pub use export::export_bundle;
pub use format::{decode, encode, BundleFormat};
pub use import::{import_bundle, ImportSummary};

/// Bundle document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Bundle {
    #[serde(default)]
    pub consumers: Vec<Consumer>,
    #[serde(default)]
    pub routes: Vec<Route>,
    #[serde(default)]
    pub upstreams: Vec<Upstream>,
    #[serde(default)]
    pub services: Vec<Service>,
    #[serde(default)]
    pub variables: Vec<Variable>,
}

#[derive(Debug, Error)]
pub enum BundleError {
    #[error("invalid JSON bundle: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid YAML bundle: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("invalid bundle: {0}")]
    Invalid(String),

    #[error(transparent)]
    Engine(#[from] EngineError),
}

pub type BundleResult<T> = Result<T, BundleError>;
