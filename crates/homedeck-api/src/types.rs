// Wire types for the backend REST API.
//
// These mirror the JSON bodies exactly and stay lenient: missing optional
// fields default instead of failing the whole response. Domain meaning
// (entity id parsing, domain derivation, timestamp parsing) is applied
// by homedeck-core, not here.

use std::fmt;

use secrecy::SecretString;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// Backend-assigned device identifier.
///
/// The backend uses numeric row ids, but nothing in the contract promises
/// that, so string ids are accepted too.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawId {
    Number(i64),
    Text(String),
}

impl fmt::Display for RawId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{n}"),
            Self::Text(s) => f.write_str(s),
        }
    }
}

/// A managed device as returned by `/devices` endpoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeviceResponse {
    pub id: RawId,
    pub entity_id: String,
    #[serde(default)]
    pub domain: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub device_type: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub attributes: Option<Map<String, Value>>,
    #[serde(default)]
    pub last_updated: Option<String>,
}

/// `GET /config/home-assistant/status`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HubStatusResponse {
    #[serde(default)]
    pub configured: bool,
    #[serde(default)]
    pub connected: bool,
    #[serde(default)]
    pub url: Option<String>,
}

/// `GET /config/home-assistant`
///
/// The token, when echoed back at all, is kept behind [`SecretString`].
#[derive(Debug, Clone, Default, Deserialize)]
pub struct HubConfigResponse {
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default, deserialize_with = "deserialize_secret")]
    pub token: Option<SecretString>,
}

/// `POST /config/home-assistant`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SaveConfigResponse {
    #[serde(default)]
    pub config: Option<HubConfigResponse>,
}

/// Body for both control endpoints.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ControlRequest {
    pub service: String,
    pub service_data: Map<String, Value>,
}

fn deserialize_secret<'de, D>(deserializer: D) -> Result<Option<SecretString>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    Ok(raw.map(SecretString::from))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn raw_id_accepts_numbers_and_strings() {
        let n: RawId = serde_json::from_value(json!(7)).unwrap();
        let s: RawId = serde_json::from_value(json!("abc")).unwrap();
        assert_eq!(n.to_string(), "7");
        assert_eq!(s.to_string(), "abc");
    }

    #[test]
    fn device_response_tolerates_missing_fields() {
        let device: DeviceResponse = serde_json::from_value(json!({
            "id": 1,
            "entity_id": "sensor.kitchen",
            "attributes": null
        }))
        .unwrap();
        assert_eq!(device.entity_id, "sensor.kitchen");
        assert!(device.attributes.is_none());
        assert!(device.state.is_none());
    }

    #[test]
    fn status_defaults_to_unconfigured() {
        let status: HubStatusResponse = serde_json::from_value(json!({})).unwrap();
        assert!(!status.configured);
        assert!(!status.connected);
    }

    #[test]
    fn config_token_is_redacted_in_debug() {
        let cfg: HubConfigResponse =
            serde_json::from_value(json!({ "url": "http://hub", "token": "s3cret" })).unwrap();
        assert!(cfg.token.is_some());
        assert!(!format!("{cfg:?}").contains("s3cret"));
    }
}
