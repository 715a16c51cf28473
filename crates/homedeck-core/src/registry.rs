// ── Device registry client ──
//
// Every operation that reads or rewrites the device cache from the
// backend. Everything except `load()` refuses to run while the hub is
// unconfigured, without touching the network.

use std::sync::Arc;

use tracing::{debug, info};

use crate::convert::devices_from_wire;
use crate::error::CoreError;
use crate::model::{Device, DeviceId, EntityId, HubStatus};
use crate::session::Session;

/// Cache-owning operations of a [`Session`].
#[derive(Clone)]
pub struct DeviceRegistry {
    session: Session,
}

impl DeviceRegistry {
    pub(crate) fn new(session: Session) -> Self {
        Self { session }
    }

    /// Fetch status and the device list together.
    ///
    /// The status feeds the connection state machine whenever it arrives.
    /// The cache is replaced only when both requests succeed and the hub
    /// is configured; otherwise it keeps its last-known-good contents.
    pub async fn load(&self) -> Result<HubStatus, CoreError> {
        let client = self.session.client();
        let (status, devices) = tokio::join!(client.hub_status(), client.list_devices());

        let status = status.map(HubStatus::from).map_err(CoreError::from);
        if let Ok(ref status) = status {
            self.session.connection().observe(status);
        }

        match (status, devices) {
            (Ok(status), _) if !status.configured => Err(CoreError::NotConfigured),
            (Ok(status), Ok(devices)) => {
                self.session.store().replace_all(devices_from_wire(devices));
                Ok(status)
            }
            (status, devices) => {
                let failures: Vec<CoreError> = [status.err(), devices.err().map(CoreError::from)]
                    .into_iter()
                    .flatten()
                    .collect();
                debug!(count = failures.len(), "load failed; keeping cached devices");
                Err(CoreError::LoadFailed { failures })
            }
        }
    }

    /// Trigger hub-side discovery and sync, then replace the cache with
    /// the server's list. Returns the new device count.
    pub async fn discover_and_sync(&self) -> Result<usize, CoreError> {
        self.session.connection().ensure_configured()?;
        let client = self.session.client();

        client.discover_devices().await?;
        client.sync_devices().await?;
        let devices = devices_from_wire(client.list_devices().await?);

        let count = devices.len();
        self.session.store().replace_all(devices);
        info!(count, "device discovery complete");
        Ok(count)
    }

    /// Start managing a hub entity.
    ///
    /// The id is checked locally before anything else; an empty or
    /// malformed id never reaches the backend.
    pub async fn add(&self, entity_id: &str) -> Result<Device, CoreError> {
        let entity_id = EntityId::parse(entity_id)?;
        self.session.connection().ensure_configured()?;

        let created =
            Device::try_from(self.session.client().add_device(entity_id.as_str()).await?)?;
        self.session.store().upsert(created.clone());
        info!(id = %created.id, %entity_id, "device added");
        Ok(created)
    }

    /// Stop managing a device. The cache entry goes away only after the
    /// backend confirms.
    pub async fn remove(&self, id: &DeviceId) -> Result<(), CoreError> {
        self.session.connection().ensure_configured()?;

        self.session.client().delete_device(id.as_str()).await?;
        self.session.store().remove(id);
        info!(%id, "device removed");
        Ok(())
    }

    /// Re-read one device and replace its cache entry in place.
    ///
    /// Devices that are not cached are returned but not inserted. A
    /// response for a different id is rejected and the cache is untouched.
    pub async fn refresh_one(&self, id: &DeviceId) -> Result<Device, CoreError> {
        self.session.connection().ensure_configured()?;

        let device = Device::try_from(self.session.client().device_state(id.as_str()).await?)?;
        if device.id != *id {
            return Err(CoreError::InvalidResponse {
                message: format!("requested device {id}, backend returned {}", device.id),
            });
        }
        self.session.store().replace(id, device.clone());
        Ok(device)
    }

    /// Re-read one device by hub entity id and replace its cache entry.
    pub async fn refresh_entity(&self, entity_id: &EntityId) -> Result<Device, CoreError> {
        self.session.connection().ensure_configured()?;

        let device =
            Device::try_from(self.session.client().entity_state(entity_id.as_str()).await?)?;
        if device.entity_id() != entity_id {
            return Err(CoreError::InvalidResponse {
                message: format!(
                    "requested {entity_id}, backend returned {}",
                    device.entity_id()
                ),
            });
        }
        self.session.store().replace(&device.id, device.clone());
        Ok(device)
    }

    /// Fetch one device without touching the cache.
    pub async fn fetch(&self, id: &DeviceId) -> Result<Device, CoreError> {
        self.session.connection().ensure_configured()?;

        match self.session.client().get_device(id.as_str()).await {
            Ok(raw) => Device::try_from(raw),
            Err(e) if e.is_not_found() => Err(CoreError::DeviceNotFound {
                identifier: id.to_string(),
            }),
            Err(e) => Err(e.into()),
        }
    }

    /// Look up a cached device by backend id or entity id.
    pub fn resolve(&self, identifier: &str) -> Result<Arc<Device>, CoreError> {
        let store = self.session.store();
        let by_id = store.get(&DeviceId::from(identifier));
        let by_entity = || {
            EntityId::parse(identifier)
                .ok()
                .and_then(|eid| store.by_entity(&eid))
        };
        by_id.or_else(by_entity).ok_or_else(|| CoreError::DeviceNotFound {
            identifier: identifier.trim().to_owned(),
        })
    }
}
