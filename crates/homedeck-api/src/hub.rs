// Hub configuration endpoints
//
// The backend owns the hub URL + long-lived access token and the realtime
// link built from them. These calls read, replace, and probe that config.

use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use tracing::debug;

use crate::client::BackendClient;
use crate::error::Error;
use crate::types::{HubConfigResponse, HubStatusResponse, SaveConfigResponse};

const CONFIG: &[&str] = &["config", "home-assistant"];

#[derive(Serialize)]
struct CredentialsBody<'a> {
    url: &'a str,
    token: &'a str,
}

impl BackendClient {
    /// Read the stored hub configuration.
    ///
    /// `GET /config/home-assistant`
    pub async fn hub_config(&self) -> Result<HubConfigResponse, Error> {
        self.get(CONFIG).await
    }

    /// Replace the stored hub configuration.
    ///
    /// `POST /config/home-assistant` with `{url, token}`
    pub async fn save_hub_config(
        &self,
        url: &str,
        token: &SecretString,
    ) -> Result<SaveConfigResponse, Error> {
        debug!(url, "saving hub configuration");
        let body = CredentialsBody {
            url,
            token: token.expose_secret(),
        };
        self.post(CONFIG, &body).await
    }

    /// Ask the backend to probe a hub without persisting anything.
    ///
    /// `POST /config/home-assistant/test` with `{url, token}`
    pub async fn test_hub_connection(&self, url: &str, token: &SecretString) -> Result<(), Error> {
        debug!(url, "testing hub connection");
        let body = CredentialsBody {
            url,
            token: token.expose_secret(),
        };
        self.post_no_response(&["config", "home-assistant", "test"], &body)
            .await
    }

    /// Current configured/connected flags as seen by the backend.
    ///
    /// `GET /config/home-assistant/status`
    pub async fn hub_status(&self) -> Result<HubStatusResponse, Error> {
        self.get(&["config", "home-assistant", "status"]).await
    }

    /// Re-open the backend's realtime link to the hub.
    ///
    /// `POST /config/home-assistant/websocket/restart`
    pub async fn restart_hub_link(&self) -> Result<(), Error> {
        debug!("restarting hub realtime link");
        self.post_trigger(&["config", "home-assistant", "websocket", "restart"])
            .await
    }
}
