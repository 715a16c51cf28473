// ── Wire → domain conversion ──
//
// Applies domain meaning to the lenient wire types: entity ids are
// validated, domains derived from the id prefix, timestamps parsed.

use chrono::{DateTime, NaiveDateTime, Utc};
use tracing::{debug, warn};

use homedeck_api::{DeviceResponse, HubConfigResponse, HubStatusResponse};

use crate::error::CoreError;
use crate::model::{Attributes, Device, DeviceId, EntityId, HubConfig, HubStatus};

impl From<HubStatusResponse> for HubStatus {
    fn from(s: HubStatusResponse) -> Self {
        Self {
            configured: s.configured,
            connected: s.connected,
            url: s.url.filter(|u| !u.trim().is_empty()),
        }
    }
}

impl From<HubConfigResponse> for HubConfig {
    fn from(c: HubConfigResponse) -> Self {
        Self {
            url: c.url.filter(|u| !u.trim().is_empty()),
            token: c.token,
        }
    }
}

impl TryFrom<DeviceResponse> for Device {
    type Error = CoreError;

    fn try_from(d: DeviceResponse) -> Result<Self, Self::Error> {
        let entity_id =
            EntityId::parse(&d.entity_id).map_err(|e| CoreError::InvalidResponse {
                message: format!("device {}: {e}", d.id),
            })?;

        if let Some(wire_domain) = d.domain.as_deref() {
            if wire_domain != entity_id.domain_prefix() {
                warn!(
                    entity_id = %entity_id,
                    wire_domain,
                    "backend domain disagrees with entity id prefix; using prefix"
                );
            }
        }

        let mut device = Device::new(DeviceId::from(d.id), entity_id);
        device.name = d.name.unwrap_or_default();
        device.device_type = d.device_type.unwrap_or_default();
        device.state = d.state.unwrap_or_default();
        device.attributes = d.attributes.map(Attributes::new).unwrap_or_default();
        device.last_updated = d.last_updated.as_deref().and_then(parse_timestamp);
        Ok(device)
    }
}

/// Convert a full device list, dropping entries whose entity id is
/// malformed rather than failing the whole list.
pub(crate) fn devices_from_wire(raw: Vec<DeviceResponse>) -> Vec<Device> {
    raw.into_iter()
        .filter_map(|d| match Device::try_from(d) {
            Ok(device) => Some(device),
            Err(e) => {
                warn!(error = %e, "skipping malformed device");
                None
            }
        })
        .collect()
}

/// RFC 3339, or `YYYY-MM-DD HH:MM:SS` taken as UTC.
pub(crate) fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    match NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S") {
        Ok(naive) => Some(naive.and_utc()),
        Err(_) => {
            debug!(raw, "unparseable last_updated");
            None
        }
    }
}
