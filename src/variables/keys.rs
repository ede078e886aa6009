//! Deterministic variable keys.
//!
//! Every key starts with the owning entity's scope, `<Kind>.<name>_<id>`,
//! so two entities never share a key even when their names collide.

use crate::entity::{Route, Service, Upstream};

/// Plugin whose shared secret is externalized.
pub const ON_BEHALF_PLUGIN: &str = "onbehalf-jwt";
pub const ON_BEHALF_FIELD: &str = "secret";

/// Plugin whose identity-provider settings are externalized.
pub const CAS_AUTH_PLUGIN: &str = "3ds-cas-auth";
pub const CAS_AUTH_FIELDS: [&str; 3] = ["idp_url", "encryption_key", "encryption_salt"];

/// Key prefix for one entity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Scope(String);

impl Scope {
    pub fn route(route: &Route) -> Self {
        Self::new("Route", &route.name, route.base.id_str())
    }

    pub fn service(service: &Service) -> Self {
        Self::new("Service", service.name(), service.base.id_str())
    }

    pub fn upstream(upstream: &Upstream) -> Self {
        Self::new("Upstream", upstream.name(), upstream.base.id_str())
    }

    fn new(kind: &str, name: &str, id: &str) -> Self {
        Self(format!("{kind}.{}_{}", escape(name), escape(id)))
    }

    pub fn host(&self) -> String {
        format!("{}.Host", self.0)
    }

    pub fn hosts(&self, index: usize) -> String {
        format!("{}.Hosts.{index}", self.0)
    }

    /// Node host of an upstream owned inline by a route or service.
    pub fn inline_node(&self, index: usize) -> String {
        format!("{}.Upstream.Host.{index}", self.0)
    }

    /// Node host of a standalone upstream.
    pub fn node(&self, index: usize) -> String {
        format!("{}.Host.{index}", self.0)
    }

    /// Key for a designated plugin secret, `None` when the field is not one.
    pub fn plugin_secret(&self, plugin: &str, field: &str) -> Option<String> {
        match plugin {
            ON_BEHALF_PLUGIN if field == ON_BEHALF_FIELD => {
                Some(format!("{}.Plugin.OnBehalf", self.0))
            }
            CAS_AUTH_PLUGIN if CAS_AUTH_FIELDS.contains(&field) => {
                Some(format!("{}.Plugin.3dsCasAuth.{field}", self.0))
            }
            _ => None,
        }
    }
}

/// A `}` would end the placeholder early, so it is percent-encoded.
fn escape(part: &str) -> String {
    part.replace('}', "%7D")
}
