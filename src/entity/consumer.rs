//! Consumer entity. Keyed by username; never bound to an upstream.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::entity::base::{is_zero, unix_now};
use crate::entity::PluginMap;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Consumer {
    pub username: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub desc: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plugins: Option<PluginMap>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub labels: Option<BTreeMap<String, String>>,

    #[serde(default, skip_serializing_if = "is_zero")]
    pub create_time: i64,

    #[serde(default, skip_serializing_if = "is_zero")]
    pub update_time: i64,
}

impl Consumer {
    pub fn creating(&mut self) {
        let now = unix_now();
        self.create_time = now;
        self.update_time = now;
    }

    /// Stamp a consumer that replaces `stored`: the creation time is kept.
    pub fn updating(&mut self, stored: &Consumer) {
        self.create_time = stored.create_time;
        self.update_time = unix_now().max(stored.create_time);
    }
}
