//! Service entity: a reusable bundle of upstream and plugins.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::entity::base::BaseInfo;
use crate::entity::upstream::UpstreamBinding;
use crate::entity::PluginMap;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Service {
    #[serde(flatten)]
    pub base: BaseInfo,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub desc: Option<String>,

    #[serde(flatten)]
    pub upstream: UpstreamBinding,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plugins: Option<PluginMap>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub script: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub labels: Option<BTreeMap<String, String>>,

    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub enable_websocket: bool,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub hosts: Vec<String>,
}

impl Service {
    pub fn name(&self) -> &str {
        self.name.as_deref().unwrap_or_default()
    }
}
