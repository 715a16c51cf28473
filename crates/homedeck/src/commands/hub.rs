//! Hub command handlers.

use serde::Serialize;

use homedeck_core::{ConnectionState, HubSnapshot, HubStatus, Session};

use crate::cli::{GlobalOpts, HubArgs, HubCommand, HubCredentialArgs, OutputFormat};
use crate::error::CliError;
use crate::output;

use super::util;

// ── Views ───────────────────────────────────────────────────────────

#[derive(Serialize)]
struct StatusView {
    state: ConnectionState,
    configured: bool,
    connected: bool,
    url: Option<String>,
}

impl StatusView {
    fn new(status: HubStatus, state: ConnectionState) -> Self {
        Self {
            state,
            configured: status.configured,
            connected: status.connected,
            url: status.url,
        }
    }
}

/// Settings screen view: each half is absent when its request failed.
#[derive(Serialize)]
struct SettingsView {
    url: Option<String>,
    token_set: Option<bool>,
    configured: Option<bool>,
    connected: Option<bool>,
}

impl From<HubSnapshot> for SettingsView {
    fn from(snap: HubSnapshot) -> Self {
        Self {
            url: snap
                .config
                .as_ref()
                .and_then(|c| c.url.clone())
                .or_else(|| snap.status.as_ref().and_then(|s| s.url.clone())),
            token_set: snap.config.as_ref().map(homedeck_core::HubConfig::has_token),
            configured: snap.status.as_ref().map(|s| s.configured),
            connected: snap.status.as_ref().map(|s| s.connected),
        }
    }
}

fn yes_no(flag: Option<bool>) -> String {
    match flag {
        Some(true) => "yes".into(),
        Some(false) => "no".into(),
        None => "(unavailable)".into(),
    }
}

fn status_detail(view: &StatusView) -> String {
    output::detail_lines(&[
        ("State", view.state.to_string()),
        ("Configured", yes_no(Some(view.configured))),
        ("Connected", yes_no(Some(view.connected))),
        ("URL", view.url.clone().unwrap_or_else(|| "-".into())),
    ])
}

fn settings_detail(view: &SettingsView) -> String {
    output::detail_lines(&[
        ("URL", view.url.clone().unwrap_or_else(|| "-".into())),
        ("Token", yes_no(view.token_set)),
        ("Configured", yes_no(view.configured)),
        ("Connected", yes_no(view.connected)),
    ])
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(
    session: &Session,
    args: HubArgs,
    global: &GlobalOpts,
    format: OutputFormat,
) -> Result<(), CliError> {
    let hub = session.hub();

    match args.command {
        HubCommand::Status => {
            let status = hub.poll_status().await?;
            let view = StatusView::new(status, hub.state());
            let out = output::render_single(format, &view, status_detail, |v| v.state.to_string())?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        HubCommand::Show => {
            let snapshot = hub.snapshot().await;
            if snapshot.config.is_none() && snapshot.status.is_none() {
                // Nothing loaded at all; surface the reason.
                hub.poll_status().await?;
            }
            let view = SettingsView::from(snapshot);
            let out = output::render_single(format, &view, settings_detail, |v| {
                v.url.clone().unwrap_or_default()
            })?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        HubCommand::Set(creds) => {
            let credentials = read_credentials(session, creds)?;
            let saved = hub.save(&credentials).await?;
            let url = saved.url.unwrap_or_else(|| credentials.url().to_owned());
            output::notice(&format!("✓ Hub configuration saved ({url})"), global.quiet);
            output::notice("  Check the link with: homedeck hub status", global.quiet);
            Ok(())
        }

        HubCommand::Test(creds) => {
            let credentials = read_credentials(session, creds)?;
            hub.test(&credentials).await?;
            output::notice(
                &format!("✓ Hub at {} accepted the token", credentials.url()),
                global.quiet,
            );
            Ok(())
        }

        HubCommand::RestartLink => {
            util::require_configured(session).await?;
            hub.restart_link().await?;
            output::notice("Realtime link restart requested", global.quiet);
            Ok(())
        }
    }
}

fn read_credentials(
    session: &Session,
    args: HubCredentialArgs,
) -> Result<homedeck_core::HubCredentials, CliError> {
    let token = util::hub_token(args.token)?;
    Ok(session.hub().credentials(&args.url, &token)?)
}
