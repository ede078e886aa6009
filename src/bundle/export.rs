//! Full-configuration export.

use crate::bundle::Bundle;
use crate::entity::{Consumer, Route, Service, Upstream};
use crate::error::EngineResult;
use crate::resolve::Resolver;
use crate::store::{Store, StoreExt};
use crate::variables::{extract_route, extract_service, extract_upstream, VariableSet};

/// Snapshot the store into a portable bundle.
///
/// Every route and service reference must resolve; a dangling one aborts
/// the export. Hosts and designated secrets in the returned copies are
/// replaced by placeholders listed under `variables`.
pub fn export_bundle<S: Store + ?Sized>(store: &S) -> EngineResult<Bundle> {
    let consumers: Vec<Consumer> = store.fetch_all()?;
    let mut routes: Vec<Route> = store.fetch_all()?;
    let mut upstreams: Vec<Upstream> = store.fetch_all()?;
    let mut services: Vec<Service> = store.fetch_all()?;

    let resolver = Resolver::new(store);
    for route in &routes {
        resolver.resolve_route(route)?;
    }
    for service in &services {
        resolver.resolve_service_upstream(service)?;
    }

    let mut vars = VariableSet::new();
    for route in &mut routes {
        extract_route(route, &mut vars);
    }
    for upstream in &mut upstreams {
        extract_upstream(upstream, &mut vars);
    }
    for service in &mut services {
        extract_service(service, &mut vars);
    }

    tracing::info!(
        consumers = consumers.len(),
        routes = routes.len(),
        upstreams = upstreams.len(),
        services = services.len(),
        variables = vars.len(),
        "Exported configuration bundle"
    );

    Ok(Bundle {
        consumers,
        routes,
        upstreams,
        services,
        variables: vars.into_vec(),
    })
}
