//! Admin API subsystem.
//!
//! # Data Flow
//! ```text
//! HTTP request
//!     → TraceLayer / TimeoutLayer
//!     → auth.rs (bearer token, skipped for /admin/status)
//!     → handlers.rs
//!         → openapi::Projector      (route export)
//!         → bundle::export/import   (configuration transfer)
//!     → AdminError → JSON error body
//! ```
//!
//! # Design Decisions
//! - State is cheap to clone: one shared store, one swappable config
//! - The API key and export settings are read per request so file reloads
//!   apply without a restart

pub mod auth;
pub mod error;
pub mod handlers;

use std::sync::Arc;
use std::time::Duration;

use arc_swap::ArcSwap;
use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

use crate::config::AdminServiceConfig;
use crate::store::Store;

use self::auth::admin_auth_middleware;
use self::handlers::*;

pub use error::AdminError;

/// Shared state of the admin API.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn Store>,
    pub config: Arc<ArcSwap<AdminServiceConfig>>,
}

impl AppState {
    pub fn new(store: Arc<dyn Store>, config: AdminServiceConfig) -> Self {
        Self {
            store,
            config: Arc::new(ArcSwap::from_pointee(config)),
        }
    }

    /// Swap in a reloaded configuration.
    pub fn reload(&self, config: AdminServiceConfig) {
        self.config.store(Arc::new(config));
    }
}

/// Build the admin router. The request timeout is fixed at build time.
#[allow(deprecated)]
pub fn setup_admin_router(state: AppState) -> Router {
    let timeout = Duration::from_secs(state.config.load().admin.request_timeout_secs);

    let protected = Router::new()
        .route("/admin/store", get(get_store_counts))
        .route("/admin/export/routes", get(export_all_routes))
        .route("/admin/export/routes/{ids}", get(export_routes))
        .route("/admin/export/configuration", get(export_configuration))
        .route("/admin/import/configuration", post(import_configuration))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            admin_auth_middleware,
        ));

    Router::new()
        .route("/admin/status", get(get_status))
        .merge(protected)
        .layer(TimeoutLayer::new(timeout))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
