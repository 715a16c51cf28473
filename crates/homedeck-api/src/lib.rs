// homedeck-api: Async Rust client for the homedeck backend REST API.
//
// The backend sits between this client and the home-automation hub. It
// persists hub credentials, keeps the realtime link to the hub alive, and
// exposes a small JSON API for device discovery and control.

pub mod client;
pub mod devices;
pub mod error;
pub mod hub;
pub mod transport;
pub mod types;

pub use client::BackendClient;
pub use error::Error;
pub use transport::{TlsMode, TransportConfig};
pub use types::{
    ControlRequest, DeviceResponse, HubConfigResponse, HubStatusResponse, SaveConfigResponse,
};
