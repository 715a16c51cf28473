// ── Hub configuration & status ──

use secrecy::SecretString;
use serde::Serialize;

/// Backend view of the hub link.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct HubStatus {
    pub configured: bool,
    pub connected: bool,
    pub url: Option<String>,
}

/// Stored hub configuration as reported by the backend.
///
/// The token is whatever the backend chooses to echo back; it stays
/// behind [`SecretString`] and is never serialized.
#[derive(Debug, Clone, Default)]
pub struct HubConfig {
    pub url: Option<String>,
    pub token: Option<SecretString>,
}

impl HubConfig {
    pub fn has_token(&self) -> bool {
        self.token.is_some()
    }
}

/// Result of [`HubSettings::snapshot`](crate::HubSettings::snapshot).
///
/// Either half is `None` when its request failed.
#[derive(Debug, Clone, Default)]
pub struct HubSnapshot {
    pub config: Option<HubConfig>,
    pub status: Option<HubStatus>,
}
