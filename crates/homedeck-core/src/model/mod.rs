// ── Domain model ──
//
// Canonical types handed to consumers. Wire shapes from `homedeck-api`
// are converted into these by `crate::convert`.

pub mod device;
pub mod domain;
pub mod entity_id;
pub mod hub;

pub use device::{Attributes, Device, StateTone};
pub use domain::Domain;
pub use entity_id::{DeviceId, EntityId, EntityIdError};
pub use hub::{HubConfig, HubSnapshot, HubStatus};
