//! Device control and state synchronization between `homedeck-api` and
//! user-facing surfaces.
//!
//! - **[`Session`]**: one explicit object per backend. Owns the HTTP
//!   client, the [`ConnectionMonitor`], the [`DeviceStore`] and pending
//!   reconciliations. Cheap to clone.
//!
//! - **[`DeviceRegistry`]**: `load`, `discover_and_sync`, `add`, `remove`,
//!   `refresh_one`. The only writer of the device cache apart from
//!   post-control reconciliation.
//!
//! - **[`ControlDispatcher`]**: sends control commands addressed by entity
//!   id, tracks per-entity busy state, and schedules one delayed
//!   refresh per accepted command ([`Reconciliation`]).
//!
//! - **[`controls`]**: the pure domain → control resolver.
//!
//! - **[`ConnectionState`]**: the configuration state machine that gates
//!   every device operation.
//!
//! - **[`CoreError`]**: normalized error taxonomy; every transport
//!   failure is converted through `From<homedeck_api::Error>`.

pub mod config;
pub mod connection;
pub mod controls;
pub mod convert;
pub mod dispatcher;
pub mod error;
pub mod hub;
pub mod model;
pub mod registry;
pub mod session;
pub mod store;
pub mod stream;

// ── Primary re-exports ──────────────────────────────────────────────
pub use config::SessionConfig;
pub use connection::{ConnectionEvent, ConnectionMonitor, ConnectionState};
pub use controls::{Control, ControlCommand, ControlProfile, Service, ServiceData};
pub use dispatcher::{ControlDispatcher, Reconciliation, ReconciliationOutcome};
pub use error::CoreError;
pub use hub::{HubCredentials, HubSettings, normalize_hub_url};
pub use registry::DeviceRegistry;
pub use session::Session;
pub use store::DeviceStore;
pub use stream::{DeviceStream, DeviceWatchStream};

pub use model::{
    Attributes, Device, DeviceId, Domain, EntityId, EntityIdError, HubConfig, HubSnapshot,
    HubStatus, StateTone,
};
