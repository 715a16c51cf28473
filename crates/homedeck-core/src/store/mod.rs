// ── Device cache ──
//
// The only owner of cached devices. Registry operations and the
// dispatcher's reconciliation write here; every write is broadcast.

mod collection;

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::watch;
use tracing::debug;

use crate::model::{Device, DeviceId, EntityId};
use crate::stream::DeviceStream;

use collection::{EntityCollection, Keyed};

impl Keyed for Device {
    type Key = DeviceId;

    fn key(&self) -> &DeviceId {
        &self.id
    }
}

/// Reactive cache of managed devices, in server order.
pub struct DeviceStore {
    devices: EntityCollection<Device>,
    last_full_refresh: watch::Sender<Option<DateTime<Utc>>>,
}

impl Default for DeviceStore {
    fn default() -> Self {
        Self::new()
    }
}

impl DeviceStore {
    pub fn new() -> Self {
        let (last_full_refresh, _) = watch::channel(None);
        Self {
            devices: EntityCollection::new(),
            last_full_refresh,
        }
    }

    // ── Reads ────────────────────────────────────────────────────────

    pub fn snapshot(&self) -> Arc<Vec<Arc<Device>>> {
        self.devices.snapshot()
    }

    pub fn get(&self, id: &DeviceId) -> Option<Arc<Device>> {
        self.devices.get(id)
    }

    pub fn by_entity(&self, entity_id: &EntityId) -> Option<Arc<Device>> {
        self.devices.find(|d| d.entity_id() == entity_id)
    }

    pub fn len(&self) -> usize {
        self.devices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.devices.is_empty()
    }

    /// When the cache was last replaced wholesale from the server.
    pub fn last_full_refresh(&self) -> Option<DateTime<Utc>> {
        *self.last_full_refresh.borrow()
    }

    /// Subscribe to every cache write.
    pub fn subscribe(&self) -> DeviceStream {
        DeviceStream::new(self.devices.subscribe())
    }

    // ── Writes (crate-internal) ──────────────────────────────────────

    pub(crate) fn replace_all(&self, devices: Vec<Device>) {
        debug!(count = devices.len(), "replacing device cache");
        self.devices.replace_all(devices);
        self.last_full_refresh.send_replace(Some(Utc::now()));
    }

    pub(crate) fn upsert(&self, device: Device) -> bool {
        debug!(id = %device.id, entity_id = %device.entity_id(), "upserting device");
        self.devices.upsert(device)
    }

    pub(crate) fn replace(&self, id: &DeviceId, device: Device) -> bool {
        let replaced = self.devices.replace(id, device);
        debug!(%id, replaced, "refreshing cached device");
        replaced
    }

    pub(crate) fn remove(&self, id: &DeviceId) -> Option<Arc<Device>> {
        debug!(%id, "removing device from cache");
        self.devices.remove(id)
    }
}
