// ── Session ──
//
// One explicit object per backend that owns the HTTP client, the
// connection state machine, the device cache, per-entity busy flags and
// pending reconciliations. Registry, dispatcher and hub settings are thin
// views over it.

use std::sync::Arc;

use arc_swap::ArcSwap;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use homedeck_api::{BackendClient, TlsMode, TransportConfig};

use crate::config::SessionConfig;
use crate::connection::{ConnectionMonitor, ConnectionState};
use crate::dispatcher::{BusyTracker, ControlDispatcher};
use crate::error::CoreError;
use crate::hub::HubSettings;
use crate::registry::DeviceRegistry;
use crate::store::DeviceStore;

/// The main entry point for consumers.
///
/// Cheaply cloneable via `Arc<SessionInner>`. All clones share one cache
/// and one connection state.
#[derive(Clone)]
pub struct Session {
    inner: Arc<SessionInner>,
}

struct SessionInner {
    config: SessionConfig,
    client: BackendClient,
    connection: ConnectionMonitor,
    store: DeviceStore,
    busy: BusyTracker,
    /// Parent of every pending reconciliation's token. Swapped for a
    /// fresh one on cancel so later dispatches are unaffected.
    reconcile_root: ArcSwap<CancellationToken>,
}

impl Session {
    /// Build a session and its HTTP client. Does not touch the network.
    pub fn new(config: SessionConfig) -> Result<Self, CoreError> {
        let transport = TransportConfig {
            tls: if config.accept_invalid_certs {
                TlsMode::DangerAcceptInvalid
            } else {
                TlsMode::System
            },
            timeout: config.timeout,
        };
        let client = BackendClient::new(config.backend_url.as_str(), &transport)?;
        Ok(Self::with_client(config, client))
    }

    /// Wrap an already-built client.
    pub fn with_client(config: SessionConfig, client: BackendClient) -> Self {
        debug!(backend = %client.base_url(), "creating session");
        Self {
            inner: Arc::new(SessionInner {
                config,
                client,
                connection: ConnectionMonitor::new(),
                store: DeviceStore::new(),
                busy: BusyTracker::default(),
                reconcile_root: ArcSwap::from_pointee(CancellationToken::new()),
            }),
        }
    }

    // ── Accessors ────────────────────────────────────────────────────

    pub fn config(&self) -> &SessionConfig {
        &self.inner.config
    }

    pub fn client(&self) -> &BackendClient {
        &self.inner.client
    }

    pub fn store(&self) -> &DeviceStore {
        &self.inner.store
    }

    pub fn connection(&self) -> &ConnectionMonitor {
        &self.inner.connection
    }

    pub fn connection_state(&self) -> ConnectionState {
        self.inner.connection.current()
    }

    pub fn watch_connection(&self) -> watch::Receiver<ConnectionState> {
        self.inner.connection.subscribe()
    }

    pub(crate) fn busy(&self) -> &BusyTracker {
        &self.inner.busy
    }

    // ── Views ────────────────────────────────────────────────────────

    pub fn registry(&self) -> DeviceRegistry {
        DeviceRegistry::new(self.clone())
    }

    pub fn dispatcher(&self) -> ControlDispatcher {
        ControlDispatcher::new(self.clone())
    }

    pub fn hub(&self) -> HubSettings {
        HubSettings::new(self.clone())
    }

    // ── Reconciliation lifecycle ─────────────────────────────────────

    pub(crate) fn reconciliation_token(&self) -> CancellationToken {
        self.inner.reconcile_root.load().child_token()
    }

    /// Cancel every reconciliation that has not yet started its refresh.
    pub fn cancel_pending_reconciliations(&self) {
        let previous = self
            .inner
            .reconcile_root
            .swap(Arc::new(CancellationToken::new()));
        previous.cancel();
        debug!("cancelled pending reconciliations");
    }
}
