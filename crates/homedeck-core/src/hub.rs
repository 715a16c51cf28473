// ── Hub settings ──
//
// Reads, replaces and probes the backend's hub credentials, and feeds
// the connection state machine.

use secrecy::{ExposeSecret, SecretString};
use tracing::{debug, info};

use crate::connection::{ConnectionEvent, ConnectionState};
use crate::error::CoreError;
use crate::model::{HubConfig, HubSnapshot, HubStatus};
use crate::session::Session;

// ── Credentials ──────────────────────────────────────────────────

/// Validated hub url + long-lived access token.
#[derive(Debug, Clone)]
pub struct HubCredentials {
    url: String,
    token: SecretString,
}

impl HubCredentials {
    /// Trim and validate both values, then normalize the URL.
    /// Fails with [`CoreError::Validation`] on empty input.
    pub fn new(url: &str, token: &SecretString) -> Result<Self, CoreError> {
        let url = url.trim();
        if url.is_empty() {
            return Err(CoreError::validation("url", "hub URL must not be empty"));
        }
        let token = token.expose_secret().trim();
        if token.is_empty() {
            return Err(CoreError::validation("token", "access token must not be empty"));
        }

        Ok(Self {
            url: normalize_hub_url(url),
            token: SecretString::from(token.to_owned()),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn token(&self) -> &SecretString {
        &self.token
    }
}

/// Trim, add `http://` unless an http(s) scheme is present, and drop
/// exactly one trailing `/`.
pub fn normalize_hub_url(raw: &str) -> String {
    let trimmed = raw.trim();
    let with_scheme = if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
        trimmed.to_owned()
    } else {
        format!("http://{trimmed}")
    };
    match with_scheme.strip_suffix('/') {
        Some(stripped) => stripped.to_owned(),
        None => with_scheme,
    }
}

// ── HubSettings ──────────────────────────────────────────────────

/// Hub configuration operations of a [`Session`].
#[derive(Clone)]
pub struct HubSettings {
    session: Session,
}

impl HubSettings {
    pub(crate) fn new(session: Session) -> Self {
        Self { session }
    }

    /// Shorthand for [`HubCredentials::new`].
    #[allow(clippy::unused_self)]
    pub fn credentials(&self, url: &str, token: &SecretString) -> Result<HubCredentials, CoreError> {
        HubCredentials::new(url, token)
    }

    /// Store new credentials on the backend. On success the connection
    /// state becomes `CONFIGURED_UNVERIFIED` until the next status poll.
    pub async fn save(&self, credentials: &HubCredentials) -> Result<HubConfig, CoreError> {
        let saved = self
            .session
            .client()
            .save_hub_config(credentials.url(), credentials.token())
            .await?;

        self.session.connection().apply(ConnectionEvent::ConfigSaved);
        info!(url = credentials.url(), "hub configuration saved");

        Ok(saved.config.map(HubConfig::from).unwrap_or_else(|| HubConfig {
            url: Some(credentials.url().to_owned()),
            token: None,
        }))
    }

    /// Ask the backend to probe the hub with these credentials. Nothing
    /// is stored and the connection state does not change.
    pub async fn test(&self, credentials: &HubCredentials) -> Result<(), CoreError> {
        self.session
            .client()
            .test_hub_connection(credentials.url(), credentials.token())
            .await?;
        debug!(url = credentials.url(), "hub connection test passed");
        Ok(())
    }

    /// Fetch status and feed it to the state machine.
    pub async fn poll_status(&self) -> Result<HubStatus, CoreError> {
        let status = HubStatus::from(self.session.client().hub_status().await?);
        self.session.connection().observe(&status);
        Ok(status)
    }

    /// Stored configuration.
    pub async fn current(&self) -> Result<HubConfig, CoreError> {
        Ok(HubConfig::from(self.session.client().hub_config().await?))
    }

    /// Config and status fetched concurrently; a failed half is `None`.
    pub async fn snapshot(&self) -> HubSnapshot {
        let (config, status) = tokio::join!(self.current(), self.poll_status());
        if let Err(ref e) = config {
            debug!(error = %e, "hub config unavailable");
        }
        if let Err(ref e) = status {
            debug!(error = %e, "hub status unavailable");
        }
        HubSnapshot {
            config: config.ok(),
            status: status.ok(),
        }
    }

    /// Re-open the backend's realtime link to the hub.
    ///
    /// The connection state is left alone; the next poll reflects the result.
    pub async fn restart_link(&self) -> Result<(), CoreError> {
        self.session.connection().ensure_configured()?;
        self.session.client().restart_hub_link().await?;
        info!("hub realtime link restart requested");
        Ok(())
    }

    pub fn state(&self) -> ConnectionState {
        self.session.connection_state()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn secret(s: &str) -> SecretString {
        SecretString::from(s.to_owned())
    }

    #[test]
    fn normalization_adds_scheme() {
        assert_eq!(normalize_hub_url("192.168.1.5:8123"), "http://192.168.1.5:8123");
        assert_eq!(normalize_hub_url("  hub.local  "), "http://hub.local");
    }

    #[test]
    fn normalization_keeps_existing_scheme() {
        assert_eq!(normalize_hub_url("https://hub.example"), "https://hub.example");
        assert_eq!(normalize_hub_url("http://hub:8123"), "http://hub:8123");
    }

    #[test]
    fn normalization_strips_exactly_one_slash() {
        assert_eq!(normalize_hub_url("http://hub:8123/"), "http://hub:8123");
        assert_eq!(normalize_hub_url("http://hub:8123//"), "http://hub:8123/");
    }

    #[test]
    fn credentials_reject_empty_fields() {
        let err = HubCredentials::new("   ", &secret("tok")).unwrap_err();
        assert!(matches!(err, CoreError::Validation { ref field, .. } if field == "url"));

        let err = HubCredentials::new("hub", &secret("  ")).unwrap_err();
        assert!(matches!(err, CoreError::Validation { ref field, .. } if field == "token"));
    }

    #[test]
    fn credentials_trim_and_normalize() {
        let creds = HubCredentials::new(" 192.168.1.5:8123 ", &secret(" tok ")).unwrap();
        assert_eq!(creds.url(), "http://192.168.1.5:8123");
        assert_eq!(creds.token().expose_secret(), "tok");
    }
}
