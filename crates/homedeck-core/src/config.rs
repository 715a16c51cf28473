// ── Runtime session configuration ──
//
// Describes which backend to talk to and how. Never touches disk; the
// CLI builds a `SessionConfig` from its profile and hands it in.

use std::time::Duration;

use url::Url;

/// Backend address used when nothing else is configured.
pub const DEFAULT_BACKEND_URL: &str = "http://localhost:3000/api";

/// Default per-request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Wait between an accepted control command and the follow-up list
/// refresh, absorbing the hub's own propagation latency.
pub const DEFAULT_RECONCILE_DELAY: Duration = Duration::from_millis(1000);

/// Configuration for a single [`Session`](crate::Session).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    /// Backend base URL (e.g. `http://192.168.1.20:3000/api`).
    pub backend_url: Url,
    /// Request timeout.
    pub timeout: Duration,
    /// Fixed delay before the post-control reconciliation refresh.
    pub reconcile_delay: Duration,
    /// Accept self-signed backend certificates.
    pub accept_invalid_certs: bool,
}

impl SessionConfig {
    /// Defaults for everything except the backend address.
    pub fn new(backend_url: Url) -> Self {
        Self {
            backend_url,
            timeout: DEFAULT_TIMEOUT,
            reconcile_delay: DEFAULT_RECONCILE_DELAY,
            accept_invalid_certs: false,
        }
    }

    pub fn with_reconcile_delay(mut self, delay: Duration) -> Self {
        self.reconcile_delay = delay;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}
