// ── Device domain types ──

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::{Map, Value};

use super::domain::Domain;
use super::entity_id::{DeviceId, EntityId};
use crate::controls::{self, Control, ControlCommand};

// ── Attributes ──────────────────────────────────────────────────────

/// Domain-dependent attribute bag reported by the hub.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Attributes(Map<String, Value>);

impl Attributes {
    pub fn new(map: Map<String, Value>) -> Self {
        Self(map)
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Current brightness when the hub reports a numeric value.
    ///
    /// `null`, strings and missing keys all count as absent. `0` is present.
    pub fn brightness(&self) -> Option<u8> {
        self.0
            .get("brightness")
            .and_then(Value::as_f64)
            .and_then(controls::clamp_brightness)
    }
}

impl From<Map<String, Value>> for Attributes {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

// ── StateTone ───────────────────────────────────────────────────────

/// Display classification of a raw state string.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, strum::Display, strum::IntoStaticStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum StateTone {
    Active,
    Inactive,
    Unavailable,
    Neutral,
}

impl StateTone {
    pub fn of(state: &str) -> Self {
        match state {
            "on" | "open" | "unlocked" => Self::Active,
            "off" | "closed" | "locked" => Self::Inactive,
            "unavailable" => Self::Unavailable,
            _ => Self::Neutral,
        }
    }
}

// ── Device ──────────────────────────────────────────────────────────

/// A managed device as cached by the registry.
///
/// `domain` always matches the prefix of `entity_id`; both are private so
/// that pairing cannot drift.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Device {
    pub id: DeviceId,
    entity_id: EntityId,
    domain: Domain,
    pub name: String,
    pub device_type: String,
    pub state: String,
    pub attributes: Attributes,
    pub last_updated: Option<DateTime<Utc>>,
}

impl Device {
    /// New device with an empty state and no attributes.
    pub fn new(id: DeviceId, entity_id: EntityId) -> Self {
        let domain = entity_id.domain();
        Self {
            id,
            domain,
            name: String::new(),
            device_type: String::new(),
            state: String::new(),
            attributes: Attributes::default(),
            last_updated: None,
            entity_id,
        }
    }

    pub fn entity_id(&self) -> &EntityId {
        &self.entity_id
    }

    pub fn domain(&self) -> &Domain {
        &self.domain
    }

    /// `name`, or the entity id when the hub gave none.
    pub fn display_name(&self) -> &str {
        if self.name.trim().is_empty() {
            self.entity_id.as_str()
        } else {
            &self.name
        }
    }

    pub fn tone(&self) -> StateTone {
        StateTone::of(&self.state)
    }

    /// Controls offered for the current state, in display order.
    pub fn controls(&self) -> Vec<Control> {
        controls::resolve(&self.domain, &self.state, &self.attributes)
    }

    /// What pressing this device's toggle would send, if it has one.
    pub fn toggle_command(&self) -> Option<ControlCommand> {
        self.controls()
            .iter()
            .find_map(|c| c.press(&self.entity_id))
    }

    /// What committing the brightness slider at `value` would send.
    ///
    /// `None` unless the light is on and reports a brightness.
    pub fn brightness_command(&self, value: f64) -> Option<ControlCommand> {
        self.controls()
            .iter()
            .find_map(|c| c.commit(&self.entity_id, value))
    }
}
