//! Identity and timestamps shared by every stored entity.

use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

/// Canonical entity identifier.
///
/// Bundles and admin callers send ids either as numbers or as strings. Both
/// decode into the same string form here; nothing past the decode boundary
/// ever sees the original representation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct EntityId(String);

impl EntityId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Generate a fresh identifier for an entity created without one.
    pub fn generate() -> Self {
        Self(Uuid::new_v4().simple().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for EntityId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for EntityId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// 2^53: beyond this an f64 no longer holds every integer exactly.
const MAX_EXACT_FLOAT: f64 = 9_007_199_254_740_992.0;

/// Identifier as it appears on the wire.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawId {
    Signed(i64),
    Unsigned(u64),
    Float(f64),
    Text(String),
}

impl From<RawId> for EntityId {
    fn from(raw: RawId) -> Self {
        match raw {
            RawId::Signed(n) => Self(n.to_string()),
            RawId::Unsigned(n) => Self(n.to_string()),
            RawId::Float(f) if f.is_finite() && f.fract() == 0.0 && f.abs() < MAX_EXACT_FLOAT => {
                Self((f as i64).to_string())
            }
            RawId::Float(f) => Self(f.to_string()),
            RawId::Text(s) => Self(s),
        }
    }
}

impl<'de> Deserialize<'de> for EntityId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        RawId::deserialize(deserializer).map(Into::into)
    }
}

/// Current time in unix seconds.
pub fn unix_now() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs() as i64
}

pub(crate) fn is_zero(v: &i64) -> bool {
    *v == 0
}

/// Identity and lifecycle timestamps.
///
/// The id is assigned once (`creating`) and carried over on every later
/// mutation (`updating`); `update_time` never falls below `create_time`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BaseInfo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    id: Option<EntityId>,

    #[serde(default, skip_serializing_if = "is_zero")]
    create_time: i64,

    #[serde(default, skip_serializing_if = "is_zero")]
    update_time: i64,
}

impl BaseInfo {
    /// Base info for an entity that already has an identifier.
    pub fn with_id(id: impl Into<EntityId>) -> Self {
        Self {
            id: Some(id.into()),
            ..Self::default()
        }
    }

    pub fn id(&self) -> Option<&EntityId> {
        self.id.as_ref()
    }

    /// The id as a plain string, empty for entities not yet created.
    pub fn id_str(&self) -> &str {
        self.id.as_ref().map(EntityId::as_str).unwrap_or_default()
    }

    pub fn create_time(&self) -> i64 {
        self.create_time
    }

    pub fn update_time(&self) -> i64 {
        self.update_time
    }

    /// Stamp a newly created entity: assign an id if it has none and set both
    /// timestamps to now.
    pub fn creating(&mut self) {
        if self.id.is_none() {
            self.id = Some(EntityId::generate());
        }
        let now = unix_now();
        self.create_time = now;
        self.update_time = now;
    }

    /// Stamp a mutation of an already stored entity.
    pub fn updating(&mut self, stored: &BaseInfo) {
        self.id = stored.id.clone();
        self.create_time = stored.create_time;
        self.update_time = unix_now().max(stored.create_time);
    }
}
