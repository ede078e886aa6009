//! Route entity.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::entity::base::{BaseInfo, EntityId};
use crate::entity::upstream::UpstreamBinding;
use crate::entity::PluginMap;

/// Whether the gateway serves a route.
///
/// Encoded as `1` (enabled) / `0` (disabled); absent means enabled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "u8", into = "u8")]
pub enum RouteStatus {
    #[default]
    Enabled,
    Disabled,
}

impl From<u8> for RouteStatus {
    fn from(val: u8) -> Self {
        match val {
            0 => RouteStatus::Disabled,
            _ => RouteStatus::Enabled,
        }
    }
}

impl From<RouteStatus> for u8 {
    fn from(status: RouteStatus) -> Self {
        match status {
            RouteStatus::Enabled => 1,
            RouteStatus::Disabled => 0,
        }
    }
}

/// A routing rule: request predicates plus where and how to forward.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Route {
    #[serde(flatten)]
    pub base: BaseInfo,

    #[serde(default)]
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub desc: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uri: Option<String>,

    /// When non-empty, replaces `uri`.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub uris: Vec<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub methods: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub hosts: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remote_addr: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub remote_addrs: Vec<String>,

    /// Raw match expressions, passed through untouched.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub vars: Vec<Value>,

    #[serde(default, skip_serializing_if = "is_zero")]
    pub priority: i64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filter_func: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub script: Option<Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub script_id: Option<EntityId>,

    /// `None` means the route defines no plugins at all, which is distinct
    /// from an explicitly empty map when merging with a service.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plugins: Option<PluginMap>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plugin_config_id: Option<EntityId>,

    #[serde(flatten)]
    pub upstream: UpstreamBinding,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service_id: Option<EntityId>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service_protocol: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub labels: Option<BTreeMap<String, String>>,

    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub enable_websocket: bool,

    #[serde(default)]
    pub status: RouteStatus,
}

fn is_zero(v: &i64) -> bool {
    *v == 0
}

impl Route {
    /// The URIs this route matches: `uris` when non-empty, otherwise `uri`.
    pub fn uri_set(&self) -> Vec<&str> {
        if !self.uris.is_empty() {
            return self.uris.iter().map(String::as_str).collect();
        }
        self.uri
            .as_deref()
            .filter(|uri| !uri.is_empty())
            .into_iter()
            .collect()
    }
}
