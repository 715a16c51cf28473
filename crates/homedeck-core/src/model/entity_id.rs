// ── Identity types ──
//
// `DeviceId` is the backend's row id for a managed device. `EntityId` is
// the hub's `<domain>.<slug>` identifier, which the backend also accepts
// on its `/devices/entity/...` routes.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use homedeck_api::types::RawId;

use super::domain::Domain;

// ── DeviceId ────────────────────────────────────────────────────────

/// Backend-assigned identifier of a managed device.
///
/// Kept in its canonical string form so `7` from the wire and `"7"` typed
/// on a command line compare equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DeviceId(String);

impl DeviceId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DeviceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for DeviceId {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.trim().to_owned()))
    }
}

impl From<&str> for DeviceId {
    fn from(s: &str) -> Self {
        Self(s.trim().to_owned())
    }
}

impl From<RawId> for DeviceId {
    fn from(raw: RawId) -> Self {
        Self(raw.to_string())
    }
}

impl From<i64> for DeviceId {
    fn from(n: i64) -> Self {
        Self(n.to_string())
    }
}

// ── EntityId ────────────────────────────────────────────────────────

/// Why a string was rejected as an entity id.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EntityIdError {
    #[error("entity id is empty")]
    Empty,

    #[error("'{0}' is not of the form <domain>.<name>")]
    Malformed(String),
}

/// Hub entity identifier, always `<domain>.<slug>` with both parts
/// non-empty and free of whitespace.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct EntityId(String);

impl EntityId {
    /// Parse user or wire input. Surrounding whitespace is trimmed.
    pub fn parse(raw: &str) -> Result<Self, EntityIdError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(EntityIdError::Empty);
        }

        let Some((domain, slug)) = trimmed.split_once('.') else {
            return Err(EntityIdError::Malformed(trimmed.to_owned()));
        };
        if domain.is_empty() || slug.is_empty() || trimmed.chars().any(char::is_whitespace) {
            return Err(EntityIdError::Malformed(trimmed.to_owned()));
        }

        Ok(Self(trimmed.to_owned()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The raw prefix before the first `.`.
    pub fn domain_prefix(&self) -> &str {
        self.0.split_once('.').map_or(self.0.as_str(), |(d, _)| d)
    }

    /// Everything after the first `.`.
    pub fn slug(&self) -> &str {
        self.0.split_once('.').map_or("", |(_, s)| s)
    }

    /// Domain derived from the prefix.
    pub fn domain(&self) -> Domain {
        Domain::from_prefix(self.domain_prefix())
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for EntityId {
    type Err = EntityIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for EntityId {
    type Error = EntityIdError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::parse(&s)
    }
}

impl From<EntityId> for String {
    fn from(id: EntityId) -> Self {
        id.0
    }
}
