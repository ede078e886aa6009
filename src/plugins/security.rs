//! Authentication plugin classification.

use serde::{Deserialize, Serialize};

use crate::entity::PluginMap;

/// Authentication schemes the gateway's auth plugins map onto.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum AuthScheme {
    Basic,
    ApiKey,
    Bearer,
}

impl AuthScheme {
    pub const ALL: [AuthScheme; 3] = [AuthScheme::Basic, AuthScheme::ApiKey, AuthScheme::Bearer];

    /// The plugin that enables this scheme on a route.
    pub fn plugin_name(&self) -> &'static str {
        match self {
            AuthScheme::Basic => "basic-auth",
            AuthScheme::ApiKey => "key-auth",
            AuthScheme::Bearer => "jwt-auth",
        }
    }

    /// Name the scheme is registered under in the API description.
    pub fn scheme_name(&self) -> &'static str {
        match self {
            AuthScheme::Basic => "basicAuth",
            AuthScheme::ApiKey => "api_key",
            AuthScheme::Bearer => "bearerAuth",
        }
    }

    pub fn from_plugin(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.plugin_name() == name)
    }
}

/// Remove every auth plugin from `plugins` and return the schemes they
/// stand for, in plugin-map order. Unknown keys stay in the map.
pub fn take_auth_schemes(plugins: &mut PluginMap) -> Vec<AuthScheme> {
    let schemes: Vec<AuthScheme> = plugins
        .keys()
        .filter_map(|name| AuthScheme::from_plugin(name))
        .collect();

    for scheme in &schemes {
        plugins.remove(scheme.plugin_name());
    }
    schemes
}
