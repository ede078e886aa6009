//! Startup orchestration.
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal
//! - The store is seeded before the listener binds, so the first request
//!   already sees the seed configuration

use std::path::Path;
use std::sync::Arc;

use thiserror::Error;

use crate::admin::AppState;
use crate::bundle::{decode, import_bundle, BundleError, ImportSummary};
use crate::config::AdminServiceConfig;
use crate::store::MemoryStore;

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("cannot read seed bundle `{path}`: {source}")]
    SeedIo {
        path: String,
        source: std::io::Error,
    },

    #[error("cannot import seed bundle `{path}`: {source}")]
    Seed { path: String, source: BundleError },
}

/// Build the admin state: an in-memory store, seeded when configured.
pub fn build_state(config: AdminServiceConfig) -> Result<AppState, StartupError> {
    let store = Arc::new(MemoryStore::new());

    if let Some(path) = &config.store.seed_bundle {
        let summary = seed_store(&store, Path::new(path))?;
        tracing::info!(
            path = %path,
            routes = summary.routes,
            services = summary.services,
            upstreams = summary.upstreams,
            consumers = summary.consumers,
            "Store seeded"
        );
    }

    Ok(AppState::new(store, config))
}

/// Import a bundle file into `store`.
pub fn seed_store(store: &MemoryStore, path: &Path) -> Result<ImportSummary, StartupError> {
    let display = path.display().to_string();
    let text = std::fs::read_to_string(path).map_err(|source| StartupError::SeedIo {
        path: display.clone(),
        source,
    })?;

    decode(&text, None)
        .and_then(|bundle| import_bundle(store, bundle))
        .map_err(|source| StartupError::Seed {
            path: display,
            source,
        })
}
