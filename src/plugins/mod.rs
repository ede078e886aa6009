//! Plugin merger.
//!
//! # Data Flow
//! ```text
//! route.plugins ─┐
//!                ├─→ merge_plugins (merge-patch, route wins)
//! service.plugins┘        │
//!                         ├─→ take_request_validation → header params + body schema
//!                         ├─→ take_auth_schemes      → security schemes
//!                         └─→ remaining generic plugins
//! ```
//!
//! # Design Decisions
//! - Classification runs on the merged map, so auth inherited from a service
//!   shows up on the route
//! - The output is neutral; the OpenAPI projector decides how to render it

pub mod merge;
pub mod security;
pub mod validation;

use std::collections::BTreeMap;

use crate::entity::{PluginMap, Route, Service};
use crate::error::EngineResult;

pub use merge::{merge_maps, merge_patch, merge_plugins};
pub use security::{take_auth_schemes, AuthScheme};
pub use validation::{take_request_validation, HeaderParam, RequestValidation};

/// Everything the plugin layer contributes to one route's operations.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PluginProjection {
    /// Merged plugins left after classification.
    pub generic: PluginMap,
    pub security: Vec<AuthScheme>,
    pub validation: RequestValidation,
}

/// Merge a route's plugins with its service's and classify the result.
pub fn project_plugins(route: &Route, service: Option<&Service>) -> EngineResult<PluginProjection> {
    let service_plugins = service.and_then(|s| s.plugins.as_ref());
    let mut merged = merge_plugins(route.plugins.as_ref(), service_plugins);

    let validation = take_request_validation(&mut merged)?;
    let security = take_auth_schemes(&mut merged);

    tracing::trace!(
        route_id = %route.base.id_str(),
        generic = merged.len(),
        security = security.len(),
        headers = validation.header_params.len(),
        "Plugins projected"
    );

    Ok(PluginProjection {
        generic: merged,
        security,
        validation,
    })
}

/// Labels an operation carries: the route's own, else its service's.
pub fn inherit_labels(
    route: &Route,
    service: Option<&Service>,
) -> Option<BTreeMap<String, String>> {
    match (&route.labels, service) {
        (Some(labels), _) => Some(labels.clone()),
        (None, Some(service)) => service.labels.clone(),
        (None, None) => None,
    }
}
