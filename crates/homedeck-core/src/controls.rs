// ── Domain control resolver ──
//
// Pure mapping from (domain, state, attributes) to the controls a device
// offers and the exact command each one issues. Nothing here touches the
// network.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use homedeck_api::ControlRequest;

use crate::model::{Attributes, Domain, EntityId};

/// Payload forwarded to the hub alongside a service name.
pub type ServiceData = Map<String, Value>;

// ── Service ─────────────────────────────────────────────────────────

/// Hub service to invoke on an entity.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Service {
    TurnOn,
    TurnOff,
    Toggle,
    #[serde(untagged)]
    Other(String),
}

impl Service {
    pub fn as_str(&self) -> &str {
        match self {
            Self::TurnOn => "turn_on",
            Self::TurnOff => "turn_off",
            Self::Toggle => "toggle",
            Self::Other(s) => s,
        }
    }
}

impl fmt::Display for Service {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Service {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.trim() {
            "turn_on" => Self::TurnOn,
            "turn_off" => Self::TurnOff,
            "toggle" => Self::Toggle,
            other => Self::Other(other.to_owned()),
        })
    }
}

// ── ControlCommand ──────────────────────────────────────────────────

/// A fully-formed command addressed to a hub entity.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ControlCommand {
    pub target: EntityId,
    pub service: Service,
    pub service_data: ServiceData,
}

impl ControlCommand {
    pub fn new(target: EntityId, service: Service) -> Self {
        Self {
            target,
            service,
            service_data: ServiceData::new(),
        }
    }

    pub(crate) fn to_request(&self) -> ControlRequest {
        ControlRequest {
            service: self.service.as_str().to_owned(),
            service_data: self.service_data.clone(),
        }
    }
}

// ── Control ─────────────────────────────────────────────────────────

/// One affordance a device offers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Control {
    /// Binary on/off switch.
    Toggle { is_on: bool },
    /// 0–255 slider. Only produced while the light is on.
    Brightness { current: u8 },
    /// No interaction; show the raw state.
    ReadOnly { state: String },
}

impl Control {
    /// Command issued when this control is pressed. Only toggles press.
    pub fn press(&self, target: &EntityId) -> Option<ControlCommand> {
        match self {
            Self::Toggle { is_on } => Some(toggle_command(target, *is_on)),
            Self::Brightness { .. } | Self::ReadOnly { .. } => None,
        }
    }

    /// Command issued when this control is committed at `value`.
    /// Only brightness sliders commit, and only with a finite value.
    pub fn commit(&self, target: &EntityId, value: f64) -> Option<ControlCommand> {
        match self {
            Self::Brightness { .. } => {
                let level = clamp_brightness(value)?;
                let mut cmd = ControlCommand::new(target.clone(), Service::TurnOn);
                cmd.service_data.insert("brightness".into(), Value::from(level));
                Some(cmd)
            }
            Self::Toggle { .. } | Self::ReadOnly { .. } => None,
        }
    }
}

fn toggle_command(target: &EntityId, is_on: bool) -> ControlCommand {
    let service = if is_on {
        Service::TurnOff
    } else {
        Service::TurnOn
    };
    ControlCommand::new(target.clone(), service)
}

/// Round and clamp a slider value into 0–255. Non-finite input is rejected.
#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::as_conversions
)]
pub(crate) fn clamp_brightness(value: f64) -> Option<u8> {
    if !value.is_finite() {
        return None;
    }
    Some(value.round().clamp(0.0, 255.0) as u8)
}

// ── Resolver ────────────────────────────────────────────────────────

/// How a domain is controlled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlProfile {
    /// Toggle, plus brightness while on.
    Dimmable,
    /// Toggle only.
    Binary,
    /// No controls.
    ReadOnly,
}

impl ControlProfile {
    fn controls(self, state: &str, attributes: &Attributes) -> Vec<Control> {
        let is_on = state == "on";
        match self {
            Self::Dimmable => {
                let mut controls = vec![Control::Toggle { is_on }];
                if let (true, Some(current)) = (is_on, attributes.brightness()) {
                    controls.push(Control::Brightness { current });
                }
                controls
            }
            Self::Binary => vec![Control::Toggle { is_on }],
            Self::ReadOnly => vec![Control::ReadOnly {
                state: state.to_owned(),
            }],
        }
    }
}

impl Domain {
    /// Control profile for this domain. Adding a variant to [`Domain`]
    /// forces a decision here.
    pub fn control_profile(&self) -> ControlProfile {
        match self {
            Self::Light => ControlProfile::Dimmable,
            Self::Switch | Self::Fan => ControlProfile::Binary,
            Self::Sensor
            | Self::BinarySensor
            | Self::Climate
            | Self::Camera
            | Self::Lock
            | Self::Cover
            | Self::MediaPlayer
            | Self::Other(_) => ControlProfile::ReadOnly,
        }
    }
}

/// Controls offered by an entity of `domain` in `state`.
pub fn resolve(domain: &Domain, state: &str, attributes: &Attributes) -> Vec<Control> {
    domain.control_profile().controls(state, attributes)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn attrs(v: Value) -> Attributes {
        match v {
            Value::Object(map) => Attributes::new(map),
            _ => Attributes::default(),
        }
    }

    fn eid(s: &str) -> EntityId {
        EntityId::parse(s).unwrap()
    }

    #[test]
    fn light_on_with_brightness_offers_slider() {
        let controls = resolve(&Domain::Light, "on", &attrs(json!({ "brightness": 120 })));
        assert_eq!(
            controls,
            vec![Control::Toggle { is_on: true }, Control::Brightness { current: 120 }]
        );
    }

    #[test]
    fn light_off_never_offers_slider() {
        let controls = resolve(&Domain::Light, "off", &attrs(json!({ "brightness": 120 })));
        assert_eq!(controls, vec![Control::Toggle { is_on: false }]);
    }

    #[test]
    fn light_without_brightness_is_toggle_only() {
        let controls = resolve(&Domain::Light, "on", &attrs(json!({})));
        assert_eq!(controls, vec![Control::Toggle { is_on: true }]);
    }

    #[test]
    fn switch_and_fan_are_binary() {
        for domain in [Domain::Switch, Domain::Fan] {
            let controls = resolve(&domain, "on", &attrs(json!({ "brightness": 50 })));
            assert_eq!(controls, vec![Control::Toggle { is_on: true }]);
        }
    }

    #[test]
    fn other_domains_are_read_only_regardless_of_attributes() {
        let domains = [
            Domain::Sensor,
            Domain::BinarySensor,
            Domain::Climate,
            Domain::Camera,
            Domain::Lock,
            Domain::Cover,
            Domain::MediaPlayer,
            Domain::Other("vacuum".into()),
        ];
        for domain in domains {
            let controls = resolve(&domain, "on", &attrs(json!({ "brightness": 200 })));
            assert_eq!(controls, vec![Control::ReadOnly { state: "on".into() }]);
            assert!(controls[0].press(&eid("sensor.x")).is_none());
        }
    }

    #[test]
    fn toggle_turns_off_only_from_on() {
        let target = eid("switch.kettle");
        for (state, expected) in [
            ("on", Service::TurnOff),
            ("off", Service::TurnOn),
            ("unavailable", Service::TurnOn),
            ("", Service::TurnOn),
        ] {
            let controls = resolve(&Domain::Switch, state, &Attributes::default());
            let cmd = controls[0].press(&target).unwrap();
            assert_eq!(cmd.service, expected, "state {state:?}");
            assert!(cmd.service_data.is_empty());
        }
    }

    #[test]
    fn slider_commit_rounds_and_clamps() {
        let slider = Control::Brightness { current: 10 };
        let target = eid("light.desk");

        let cmd = slider.commit(&target, 127.6).unwrap();
        assert_eq!(cmd.service, Service::TurnOn);
        assert_eq!(cmd.service_data.get("brightness"), Some(&json!(128)));

        let cmd = slider.commit(&target, 999.0).unwrap();
        assert_eq!(cmd.service_data.get("brightness"), Some(&json!(255)));

        let cmd = slider.commit(&target, -4.0).unwrap();
        assert_eq!(cmd.service_data.get("brightness"), Some(&json!(0)));

        assert!(slider.commit(&target, f64::NAN).is_none());
    }

    #[test]
    fn request_body_matches_wire_shape() {
        let cmd = Control::Brightness { current: 1 }
            .commit(&eid("light.desk"), 200.0)
            .unwrap();
        let body = serde_json::to_value(cmd.to_request()).unwrap();
        assert_eq!(body, json!({ "service": "turn_on", "service_data": { "brightness": 200 } }));
    }

    #[test]
    fn service_parses_known_and_custom_names() {
        assert_eq!("turn_on".parse::<Service>().unwrap(), Service::TurnOn);
        assert_eq!(
            "set_percentage".parse::<Service>().unwrap(),
            Service::Other("set_percentage".into())
        );
    }
}
