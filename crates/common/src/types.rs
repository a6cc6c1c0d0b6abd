use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for an exchange.
///
/// Wraps a UUID to provide type safety and prevent mixing up
/// exchange IDs with other UUID-based identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExchangeId(Uuid);

impl ExchangeId {
    /// Creates a new random exchange ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates an exchange ID from an existing UUID.
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Returns the underlying UUID.
    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for ExchangeId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ExchangeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<Uuid> for ExchangeId {
    fn from(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

impl From<ExchangeId> for Uuid {
    fn from(id: ExchangeId) -> Self {
        id.0
    }
}
