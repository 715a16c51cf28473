//! Shared helpers for command handlers.

use std::io::IsTerminal;
use std::time::Duration;

use indicatif::ProgressBar;
use secrecy::SecretString;

use homedeck_core::{EntityId, Session};

use crate::error::CliError;

/// Prompt for confirmation, auto-approving if `--yes` was passed.
pub fn confirm(message: &str, yes_flag: bool) -> Result<bool, CliError> {
    if yes_flag {
        return Ok(true);
    }
    if !std::io::stdin().is_terminal() {
        return Err(CliError::NonInteractiveRequiresYes {
            action: message.into(),
        });
    }
    let confirmed = dialoguer::Confirm::new()
        .with_prompt(message)
        .default(false)
        .interact()
        .map_err(|e| CliError::Io(std::io::Error::other(e)))?;
    Ok(confirmed)
}

/// The hub token from `--token` / `HOMEDECK_HUB_TOKEN`, else a hidden prompt.
pub fn hub_token(flag: Option<String>) -> Result<SecretString, CliError> {
    if let Some(token) = flag {
        return Ok(SecretString::from(token));
    }
    if !std::io::stdin().is_terminal() {
        return Err(CliError::Validation {
            field: "token".into(),
            reason: "no token given; pass --token or set HOMEDECK_HUB_TOKEN".into(),
        });
    }
    let token = rpassword::prompt_password("Long-lived access token: ")?;
    Ok(SecretString::from(token))
}

/// Parse an entity id argument, turning a malformed one into a usage error.
pub fn entity_id(raw: &str) -> Result<EntityId, CliError> {
    EntityId::parse(raw).map_err(|e| CliError::Validation {
        field: "entity_id".into(),
        reason: e.to_string(),
    })
}

/// Poll hub status and stop early when the hub is not configured.
pub async fn require_configured(session: &Session) -> Result<(), CliError> {
    let status = session.hub().poll_status().await?;
    if status.configured {
        Ok(())
    } else {
        Err(CliError::NotConfigured)
    }
}

/// Spinner on stderr for slow operations; hidden when `quiet`.
pub fn spinner(message: &str, quiet: bool) -> ProgressBar {
    let bar = if quiet {
        ProgressBar::hidden()
    } else {
        ProgressBar::new_spinner()
    };
    bar.set_message(message.to_owned());
    bar.enable_steady_tick(Duration::from_millis(100));
    bar
}
