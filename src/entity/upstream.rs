//! Upstream definitions: backend node sets and their balancing policy.

use std::collections::BTreeMap;

use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::entity::base::{BaseInfo, EntityId};

/// A single backend node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    #[serde(default)]
    pub host: String,

    #[serde(default, skip_serializing_if = "is_zero_port")]
    pub port: u16,

    #[serde(default)]
    pub weight: u32,

    #[serde(default, skip_serializing_if = "is_zero_priority")]
    pub priority: i32,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Value>,
}

impl Node {
    pub fn new(host: impl Into<String>, port: u16, weight: u32) -> Self {
        Self {
            host: host.into(),
            port,
            weight,
            priority: 0,
            metadata: None,
        }
    }
}

fn is_zero_port(port: &u16) -> bool {
    *port == 0
}

fn is_zero_priority(priority: &i32) -> bool {
    *priority == 0
}

/// Nodes as stored documents carry them: either a list of node objects or a
/// `"host:port" -> weight` map.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawNodes {
    List(Vec<Node>),
    Weights(IndexMap<String, u32>),
}

fn decode_nodes<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<Node>, D::Error> {
    let raw = Option::<RawNodes>::deserialize(deserializer)?;
    Ok(match raw {
        None => Vec::new(),
        Some(RawNodes::List(nodes)) => nodes,
        Some(RawNodes::Weights(weights)) => weights
            .into_iter()
            .map(|(addr, weight)| {
                let (host, port) = split_host_port(&addr);
                Node::new(host, port, weight)
            })
            .collect(),
    })
}

/// Split `host:port`, `[v6]:port` or a bare host. A missing or unparsable
/// port yields 0.
fn split_host_port(addr: &str) -> (String, u16) {
    if let Some(rest) = addr.strip_prefix('[') {
        if let Some((host, tail)) = rest.split_once(']') {
            let port = tail
                .strip_prefix(':')
                .and_then(|p| p.parse().ok())
                .unwrap_or(0);
            return (host.to_string(), port);
        }
    }

    match addr.rsplit_once(':') {
        Some((host, port)) if !host.contains(':') => match port.parse() {
            Ok(port) => (host.to_string(), port),
            Err(_) => (addr.to_string(), 0),
        },
        _ => (addr.to_string(), 0),
    }
}

/// Per-phase upstream timeouts in seconds.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Timeout {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub connect: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub send: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub read: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HealthyRule {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interval: Option<u32>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub http_statuses: Vec<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub successes: Option<u32>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UnhealthyRule {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interval: Option<u32>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub http_statuses: Vec<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tcp_failures: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeouts: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub http_failures: Option<u32>,
}

/// Active probing configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ActiveCheck {
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub concurrency: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub http_path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub https_verify_certificate: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub healthy: Option<HealthyRule>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unhealthy: Option<UnhealthyRule>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub req_headers: Vec<String>,
}

/// Passive (traffic-observing) health configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PassiveCheck {
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub healthy: Option<HealthyRule>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unhealthy: Option<UnhealthyRule>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HealthChecks {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active: Option<ActiveCheck>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub passive: Option<PassiveCheck>,
}

/// Client certificate presented to upstream nodes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UpstreamTls {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_cert: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_key: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct KeepalivePool {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub idle_timeout: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub requests: Option<u32>,
    #[serde(default)]
    pub size: u32,
}

/// Backend node set plus balancing, retry and health policy.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UpstreamDef {
    #[serde(
        default,
        deserialize_with = "decode_nodes",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub nodes: Vec<Node>,

    /// Load balancing algorithm (`roundrobin`, `chash`, `ewma`, `least_conn`).
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub balancer: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub retries: Option<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub retry_timeout: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout: Option<Timeout>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub checks: Option<HealthChecks>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hash_on: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scheme: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub discovery_type: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub discovery_args: Option<serde_json::Map<String, Value>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pass_host: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub upstream_host: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub desc: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service_name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub labels: Option<BTreeMap<String, String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tls: Option<UpstreamTls>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub keepalive_pool: Option<KeepalivePool>,
}

impl UpstreamDef {
    /// An upstream over the given nodes with default policy.
    pub fn with_nodes(nodes: Vec<Node>) -> Self {
        Self {
            nodes,
            ..Self::default()
        }
    }
}

/// A standalone, referenceable upstream.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Upstream {
    #[serde(flatten)]
    pub base: BaseInfo,

    #[serde(flatten)]
    pub def: UpstreamDef,
}

impl Upstream {
    /// Name used in variable keys and logs.
    pub fn name(&self) -> &str {
        self.def.name.as_deref().unwrap_or_default()
    }
}

/// How a route or service reaches its upstream.
///
/// Inline definitions and references are mutually exclusive; the wire form
/// uses two optional fields (`upstream`, `upstream_id`), decoded into exactly
/// one variant here.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "UpstreamFields", into = "UpstreamFields")]
pub enum UpstreamBinding {
    #[default]
    None,
    Inline(Box<UpstreamDef>),
    Reference(EntityId),
}

impl UpstreamBinding {
    pub fn inline(def: UpstreamDef) -> Self {
        Self::Inline(Box::new(def))
    }

    pub fn reference(id: impl Into<EntityId>) -> Self {
        Self::Reference(id.into())
    }

    pub fn is_none(&self) -> bool {
        matches!(self, Self::None)
    }

    pub fn as_inline(&self) -> Option<&UpstreamDef> {
        match self {
            Self::Inline(def) => Some(def),
            _ => None,
        }
    }

    pub fn as_inline_mut(&mut self) -> Option<&mut UpstreamDef> {
        match self {
            Self::Inline(def) => Some(def),
            _ => None,
        }
    }

    pub fn reference_id(&self) -> Option<&EntityId> {
        match self {
            Self::Reference(id) => Some(id),
            _ => None,
        }
    }
}

#[derive(Default, Serialize, Deserialize)]
struct UpstreamFields {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    upstream: Option<UpstreamDef>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    upstream_id: Option<EntityId>,
}

impl From<UpstreamFields> for UpstreamBinding {
    fn from(fields: UpstreamFields) -> Self {
        match (fields.upstream, fields.upstream_id) {
            (Some(def), Some(id)) => {
                tracing::warn!(
                    upstream_id = %id,
                    "Both inline upstream and upstream_id set; keeping the inline definition"
                );
                Self::inline(def)
            }
            (Some(def), None) => Self::inline(def),
            (None, Some(id)) => Self::Reference(id),
            (None, None) => Self::None,
        }
    }
}

impl From<UpstreamBinding> for UpstreamFields {
    fn from(binding: UpstreamBinding) -> Self {
        match binding {
            UpstreamBinding::None => Self::default(),
            UpstreamBinding::Inline(def) => Self {
                upstream: Some(*def),
                upstream_id: None,
            },
            UpstreamBinding::Reference(id) => Self {
                upstream: None,
                upstream_id: Some(id),
            },
        }
    }
}
