// ── Entity domains ──

use std::fmt;

use serde::{Deserialize, Serialize};

/// Category of a hub entity, taken from the `<domain>.` prefix of its id.
///
/// Unknown prefixes are kept verbatim in [`Domain::Other`] so nothing is
/// lost, but they never get interactive controls.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Domain {
    Light,
    Switch,
    Fan,
    Sensor,
    BinarySensor,
    Climate,
    Camera,
    Lock,
    Cover,
    MediaPlayer,
    #[serde(untagged)]
    Other(String),
}

impl Domain {
    pub fn from_prefix(prefix: &str) -> Self {
        match prefix {
            "light" => Self::Light,
            "switch" => Self::Switch,
            "fan" => Self::Fan,
            "sensor" => Self::Sensor,
            "binary_sensor" => Self::BinarySensor,
            "climate" => Self::Climate,
            "camera" => Self::Camera,
            "lock" => Self::Lock,
            "cover" => Self::Cover,
            "media_player" => Self::MediaPlayer,
            other => Self::Other(other.to_owned()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Light => "light",
            Self::Switch => "switch",
            Self::Fan => "fan",
            Self::Sensor => "sensor",
            Self::BinarySensor => "binary_sensor",
            Self::Climate => "climate",
            Self::Camera => "camera",
            Self::Lock => "lock",
            Self::Cover => "cover",
            Self::MediaPlayer => "media_player",
            Self::Other(s) => s,
        }
    }
}

impl fmt::Display for Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prefix_round_trips_through_as_str() {
        for prefix in ["light", "switch", "fan", "binary_sensor", "media_player", "vacuum"] {
            assert_eq!(Domain::from_prefix(prefix).as_str(), prefix);
        }
        assert_eq!(Domain::from_prefix("vacuum"), Domain::Other("vacuum".into()));
    }
}
