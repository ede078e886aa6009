//! Entity model.
//!
//! # Data Flow
//! ```text
//! bundle document / store record
//!     → serde decode (ids canonicalized, node maps → node lists,
//!       upstream/upstream_id → UpstreamBinding)
//!     → Route / Service / Upstream / Consumer (strongly typed)
//!     → resolve, plugins, variables, openapi (read-only consumers)
//! ```
//!
//! # Design Decisions
//! - Value types only; no behavior beyond decode-time normalization
//! - Plugin configuration stays as structured JSON, typed at the point
//!   where a specific plugin is interpreted
//! - Inline vs referenced upstream is a sum type, never two nullable fields

pub mod base;
pub mod consumer;
pub mod route;
pub mod service;
pub mod upstream;
pub mod variable;

use std::fmt;

use serde::{Deserialize, Serialize};

pub use base::{BaseInfo, EntityId};
pub use consumer::Consumer;
pub use route::{Route, RouteStatus};
pub use service::Service;
pub use upstream::{Node, Upstream, UpstreamBinding, UpstreamDef};
pub use variable::Variable;

/// Plugin name → plugin configuration.
pub type PluginMap = serde_json::Map<String, serde_json::Value>;

/// The stored entity kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    Route,
    Service,
    Upstream,
    Consumer,
}

impl EntityKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::Route => "route",
            EntityKind::Service => "service",
            EntityKind::Upstream => "upstream",
            EntityKind::Consumer => "consumer",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Any stored entity.
#[derive(Debug, Clone, PartialEq)]
pub enum Entity {
    Route(Route),
    Service(Service),
    Upstream(Upstream),
    Consumer(Consumer),
}

impl Entity {
    pub fn kind(&self) -> EntityKind {
        match self {
            Entity::Route(_) => EntityKind::Route,
            Entity::Service(_) => EntityKind::Service,
            Entity::Upstream(_) => EntityKind::Upstream,
            Entity::Consumer(_) => EntityKind::Consumer,
        }
    }

    /// Store key: the id for routes, services and upstreams; the username for
    /// consumers. `None` when the entity has not been created yet.
    pub fn key(&self) -> Option<&str> {
        let key = match self {
            Entity::Route(r) => r.base.id_str(),
            Entity::Service(s) => s.base.id_str(),
            Entity::Upstream(u) => u.base.id_str(),
            Entity::Consumer(c) => c.username.as_str(),
        };
        (!key.is_empty()).then_some(key)
    }

    /// Creation time used to order listings.
    pub fn create_time(&self) -> i64 {
        match self {
            Entity::Route(r) => r.base.create_time(),
            Entity::Service(s) => s.base.create_time(),
            Entity::Upstream(u) => u.base.create_time(),
            Entity::Consumer(c) => c.create_time,
        }
    }
}

/// A concrete entity type that can be pulled out of an [`Entity`].
pub trait Typed: Sized {
    const KIND: EntityKind;

    fn from_entity(entity: Entity) -> Result<Self, Entity>;

    fn into_entity(self) -> Entity;
}

macro_rules! typed_entity {
    ($ty:ident) => {
        impl Typed for $ty {
            const KIND: EntityKind = EntityKind::$ty;

            fn from_entity(entity: Entity) -> Result<Self, Entity> {
                match entity {
                    Entity::$ty(inner) => Ok(inner),
                    other => Err(other),
                }
            }

            fn into_entity(self) -> Entity {
                Entity::$ty(self)
            }
        }
    };
}

typed_entity!(Route);
typed_entity!(Service);
typed_entity!(Upstream);
typed_entity!(Consumer);
