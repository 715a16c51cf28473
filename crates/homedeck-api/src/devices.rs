// Device endpoints
//
// Managed-device CRUD, hub-side discovery/sync triggers, and control
// commands addressed either by backend id or by hub entity id.

use serde::Serialize;
use tracing::debug;

use crate::client::BackendClient;
use crate::error::Error;
use crate::types::{ControlRequest, DeviceResponse};

#[derive(Serialize)]
struct AddDeviceBody<'a> {
    entity_id: &'a str,
}

impl BackendClient {
    /// List every managed device.
    ///
    /// `GET /devices`
    pub async fn list_devices(&self) -> Result<Vec<DeviceResponse>, Error> {
        self.get(&["devices"]).await
    }

    /// Fetch one managed device by backend id.
    ///
    /// `GET /devices/{id}`
    pub async fn get_device(&self, id: &str) -> Result<DeviceResponse, Error> {
        self.get(&["devices", id]).await
    }

    /// Stop managing a device.
    ///
    /// `DELETE /devices/{id}`; any 2xx counts as success.
    pub async fn delete_device(&self, id: &str) -> Result<(), Error> {
        debug!(id, "deleting device");
        self.delete(&["devices", id]).await
    }

    /// Trigger hub-side discovery.
    ///
    /// `POST /devices/discover`
    pub async fn discover_devices(&self) -> Result<(), Error> {
        debug!("triggering device discovery");
        self.post_trigger(&["devices", "discover"]).await
    }

    /// Sync managed devices with the hub.
    ///
    /// `POST /devices/sync`
    pub async fn sync_devices(&self) -> Result<(), Error> {
        debug!("triggering device sync");
        self.post_trigger(&["devices", "sync"]).await
    }

    /// Issue a service call against a device addressed by backend id.
    ///
    /// `POST /devices/{id}/control`
    pub async fn control_device(&self, id: &str, request: &ControlRequest) -> Result<(), Error> {
        debug!(id, service = %request.service, "controlling device");
        self.post_no_response(&["devices", id, "control"], request)
            .await
    }

    /// Issue a service call against a hub entity.
    ///
    /// `POST /devices/entity/{entity_id}/control`
    pub async fn control_entity(
        &self,
        entity_id: &str,
        request: &ControlRequest,
    ) -> Result<(), Error> {
        debug!(entity_id, service = %request.service, "controlling entity");
        self.post_no_response(&["devices", "entity", entity_id, "control"], request)
            .await
    }

    /// Re-read a device's live state by backend id.
    ///
    /// `GET /devices/{id}/state`
    pub async fn device_state(&self, id: &str) -> Result<DeviceResponse, Error> {
        self.get(&["devices", id, "state"]).await
    }

    /// Re-read a device's live state by hub entity id.
    ///
    /// `GET /devices/entity/{entity_id}/state`
    pub async fn entity_state(&self, entity_id: &str) -> Result<DeviceResponse, Error> {
        self.get(&["devices", "entity", entity_id, "state"]).await
    }

    /// Start managing a hub entity.
    ///
    /// `POST /devices/add` with `{entity_id}`; returns the created device.
    pub async fn add_device(&self, entity_id: &str) -> Result<DeviceResponse, Error> {
        debug!(entity_id, "adding device");
        self.post(&["devices", "add"], &AddDeviceBody { entity_id })
            .await
    }
}
