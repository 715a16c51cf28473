// ── Connection configuration state machine ──
//
// Tracks whether the backend has hub credentials and whether its link to
// the hub is up. Gates every device operation.

use serde::Serialize;
use tokio::sync::watch;
use tracing::info;

use crate::error::CoreError;
use crate::model::HubStatus;

// ── ConnectionState ──────────────────────────────────────────────

/// Where the hub link stands, as far as this client knows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, strum::Display)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum ConnectionState {
    /// No stored url/token.
    #[default]
    Unconfigured,
    /// Credentials saved, no status poll since.
    ConfiguredUnverified,
    ConfiguredConnected,
    ConfiguredDisconnected,
}

/// Inputs to the state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionEvent {
    /// The backend accepted new credentials.
    ConfigSaved,
    /// A status poll came back.
    StatusPolled { configured: bool, connected: bool },
}

impl From<&HubStatus> for ConnectionEvent {
    fn from(status: &HubStatus) -> Self {
        Self::StatusPolled {
            configured: status.configured,
            connected: status.connected,
        }
    }
}

impl ConnectionState {
    /// Pure transition function.
    #[must_use]
    pub fn apply(self, event: ConnectionEvent) -> Self {
        match event {
            ConnectionEvent::ConfigSaved => Self::ConfiguredUnverified,
            ConnectionEvent::StatusPolled {
                configured: false, ..
            } => Self::Unconfigured,
            ConnectionEvent::StatusPolled {
                configured: true,
                connected: true,
            } => Self::ConfiguredConnected,
            ConnectionEvent::StatusPolled {
                configured: true,
                connected: false,
            } => Self::ConfiguredDisconnected,
        }
    }

    pub fn is_configured(self) -> bool {
        !matches!(self, Self::Unconfigured)
    }

    pub fn is_connected(self) -> bool {
        matches!(self, Self::ConfiguredConnected)
    }
}

// ── ConnectionMonitor ────────────────────────────────────────────

/// Holds the current [`ConnectionState`] and publishes every change.
#[derive(Debug)]
pub struct ConnectionMonitor {
    state: watch::Sender<ConnectionState>,
}

impl Default for ConnectionMonitor {
    fn default() -> Self {
        Self::new()
    }
}

impl ConnectionMonitor {
    pub fn new() -> Self {
        let (state, _) = watch::channel(ConnectionState::Unconfigured);
        Self { state }
    }

    pub fn current(&self) -> ConnectionState {
        *self.state.borrow()
    }

    /// Receiver that wakes on every transition.
    pub fn subscribe(&self) -> watch::Receiver<ConnectionState> {
        self.state.subscribe()
    }

    /// Feed an event through the machine and return the new state.
    pub fn apply(&self, event: ConnectionEvent) -> ConnectionState {
        let mut next = ConnectionState::Unconfigured;
        self.state.send_if_modified(|state| {
            let previous = *state;
            next = previous.apply(event);
            if next == previous {
                return false;
            }
            info!(from = %previous, to = %next, "hub connection state changed");
            *state = next;
            true
        });
        next
    }

    pub fn observe(&self, status: &HubStatus) -> ConnectionState {
        self.apply(ConnectionEvent::from(status))
    }

    /// Refuse with [`CoreError::NotConfigured`] unless credentials are stored.
    pub fn ensure_configured(&self) -> Result<(), CoreError> {
        if self.current().is_configured() {
            Ok(())
        } else {
            Err(CoreError::NotConfigured)
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn polled(configured: bool, connected: bool) -> ConnectionEvent {
        ConnectionEvent::StatusPolled {
            configured,
            connected,
        }
    }

    #[test]
    fn starts_unconfigured_and_gates() {
        let monitor = ConnectionMonitor::new();
        assert_eq!(monitor.current(), ConnectionState::Unconfigured);
        assert!(monitor.ensure_configured().unwrap_err().is_not_configured());
    }

    #[test]
    fn save_moves_to_unverified() {
        assert_eq!(
            ConnectionState::Unconfigured.apply(ConnectionEvent::ConfigSaved),
            ConnectionState::ConfiguredUnverified
        );
        assert_eq!(
            ConnectionState::ConfiguredConnected.apply(ConnectionEvent::ConfigSaved),
            ConnectionState::ConfiguredUnverified
        );
    }

    #[test]
    fn polls_move_between_connected_and_disconnected() {
        let s = ConnectionState::ConfiguredUnverified.apply(polled(true, false));
        assert_eq!(s, ConnectionState::ConfiguredDisconnected);
        let s = s.apply(polled(true, true));
        assert_eq!(s, ConnectionState::ConfiguredConnected);
        let s = s.apply(polled(true, false));
        assert_eq!(s, ConnectionState::ConfiguredDisconnected);
    }

    #[test]
    fn unconfigured_poll_resets_from_any_state() {
        for start in [
            ConnectionState::ConfiguredUnverified,
            ConnectionState::ConfiguredConnected,
            ConnectionState::ConfiguredDisconnected,
        ] {
            assert_eq!(start.apply(polled(false, true)), ConnectionState::Unconfigured);
        }
    }

    #[test]
    fn monitor_notifies_only_on_change() {
        let monitor = ConnectionMonitor::new();
        let mut rx = monitor.subscribe();

        monitor.apply(polled(false, false));
        assert!(!rx.has_changed().unwrap_or(true));

        monitor.apply(polled(true, true));
        assert!(rx.has_changed().unwrap_or(false));
        assert_eq!(*rx.borrow_and_update(), ConnectionState::ConfiguredConnected);
        assert!(monitor.ensure_configured().is_ok());
    }

    #[test]
    fn display_uses_screaming_case() {
        assert_eq!(
            ConnectionState::ConfiguredDisconnected.to_string(),
            "CONFIGURED_DISCONNECTED"
        );
    }
}
