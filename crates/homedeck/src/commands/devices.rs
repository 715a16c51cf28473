//! Device command handlers.

use std::str::FromStr;
use std::sync::Arc;

use serde_json::Value;
use tabled::Tabled;
use tracing::debug;

use homedeck_core::{
    Control, Device, EntityId, Reconciliation, ReconciliationOutcome, Service, ServiceData,
    Session,
};

use crate::cli::{DevicesArgs, DevicesCommand, GlobalOpts, OutputFormat, WaitArgs};
use crate::error::CliError;
use crate::output;

use super::util;

// ── Table rows ──────────────────────────────────────────────────────

#[derive(Tabled)]
struct DeviceRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Entity")]
    entity: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Domain")]
    domain: String,
    #[tabled(rename = "State")]
    state: String,
    #[tabled(rename = "Updated")]
    updated: String,
}

impl DeviceRow {
    fn new(d: &Device, color: bool) -> Self {
        Self {
            id: d.id.to_string(),
            entity: d.entity_id().to_string(),
            name: d.display_name().to_owned(),
            domain: d.domain().to_string(),
            state: output::paint_state(d, color),
            updated: updated(d),
        }
    }
}

#[derive(Tabled)]
struct ControlRow {
    #[tabled(rename = "Control")]
    kind: &'static str,
    #[tabled(rename = "Current")]
    current: String,
    #[tabled(rename = "Sends")]
    sends: String,
}

impl ControlRow {
    fn new(control: &Control) -> Self {
        match control {
            Control::Toggle { is_on } => Self {
                kind: "toggle",
                current: if *is_on { "on" } else { "off" }.into(),
                sends: if *is_on { "turn_off" } else { "turn_on" }.into(),
            },
            Control::Brightness { current } => Self {
                kind: "brightness",
                current: current.to_string(),
                sends: "turn_on {brightness: 0-255}".into(),
            },
            Control::ReadOnly { state } => Self {
                kind: "read-only",
                current: state.clone(),
                sends: "-".into(),
            },
        }
    }
}

fn control_kind(control: &Control) -> String {
    ControlRow::new(control).kind.to_owned()
}

// ── Detail view ─────────────────────────────────────────────────────

fn updated(d: &Device) -> String {
    d.last_updated.map_or_else(
        || "-".into(),
        |t| {
            t.with_timezone(&chrono::Local)
                .format("%Y-%m-%d %H:%M:%S")
                .to_string()
        },
    )
}

fn detail(d: &Device, color: bool) -> String {
    let controls = d
        .controls()
        .iter()
        .map(control_kind)
        .collect::<Vec<_>>()
        .join(", ");
    let mut text = output::detail_lines(&[
        ("ID", d.id.to_string()),
        ("Entity", d.entity_id().to_string()),
        ("Name", d.display_name().to_owned()),
        ("Domain", d.domain().to_string()),
        (
            "Type",
            if d.device_type.is_empty() {
                "-".into()
            } else {
                d.device_type.clone()
            },
        ),
        ("State", output::paint_state(d, color)),
        ("Updated", updated(d)),
        ("Controls", controls),
    ]);

    if !d.attributes.is_empty() {
        text.push_str("\n\nAttributes:");
        for (key, value) in d.attributes.iter() {
            let value = match value {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            text.push_str(&format!("\n  {key}: {value}"));
        }
    }
    text
}

fn print_device(d: &Device, global: &GlobalOpts, format: OutputFormat) -> Result<(), CliError> {
    let color = output::should_color();
    let out = output::render_single(format, d, |d| detail(d, color), |d| d.id.to_string())?;
    output::print_output(&out, global.quiet);
    Ok(())
}

// ── Handler ─────────────────────────────────────────────────────────

#[allow(clippy::too_many_lines)]
pub async fn handle(
    session: &Session,
    args: DevicesArgs,
    global: &GlobalOpts,
    format: OutputFormat,
) -> Result<(), CliError> {
    let registry = session.registry();
    let dispatcher = session.dispatcher();

    match args.command {
        DevicesCommand::List => {
            registry.load().await?;
            let snap = session.store().snapshot();
            debug!(
                count = snap.len(),
                refreshed_at = ?session.store().last_full_refresh(),
                "device cache loaded"
            );
            let color = output::should_color();
            let out = output::render_list(
                format,
                snap.as_slice(),
                |d| DeviceRow::new(d, color),
                |d| d.id.to_string(),
            )?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        DevicesCommand::Get { device } => {
            let found = loaded(session, &device).await?;
            print_device(&found, global, format)
        }

        DevicesCommand::Discover => {
            util::require_configured(session).await?;
            let spinner = util::spinner("Discovering devices on the hub...", global.quiet);
            let result = registry.discover_and_sync().await;
            spinner.finish_and_clear();
            let count = result?;
            output::notice(&format!("✓ Discovery complete: {count} devices managed"), global.quiet);
            Ok(())
        }

        DevicesCommand::Add { entity_id } => {
            let entity_id = util::entity_id(&entity_id)?;
            util::require_configured(session).await?;
            let device = registry.add(entity_id.as_str()).await?;
            output::notice(&format!("✓ Now managing {entity_id}"), global.quiet);
            print_device(&device, global, format)
        }

        DevicesCommand::Remove { device } => {
            let found = loaded(session, &device).await?;
            let prompt = format!("Stop managing {} ({})?", found.display_name(), found.entity_id());
            if !util::confirm(&prompt, global.yes)? {
                return Ok(());
            }
            registry.remove(&found.id).await?;
            output::notice(&format!("✓ Removed {}", found.entity_id()), global.quiet);
            Ok(())
        }

        DevicesCommand::Refresh { device } => {
            let found = loaded(session, &device).await?;
            let fresh = registry.refresh_one(&found.id).await?;
            print_device(&fresh, global, format)
        }

        DevicesCommand::Controls { entity_id } => {
            let entity_id = util::entity_id(&entity_id)?;
            let found = loaded(session, entity_id.as_str()).await?;
            let controls = found.controls();
            let out = output::render_list(format, &controls, ControlRow::new, control_kind)?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        DevicesCommand::Toggle { entity_id, wait } => {
            let entity_id = util::entity_id(&entity_id)?;
            let found = loaded(session, entity_id.as_str()).await?;
            let reconciliation = dispatcher.toggle(&found).await?;
            settle(session, reconciliation, &entity_id, &wait, global, format).await
        }

        DevicesCommand::Brightness {
            entity_id,
            level,
            wait,
        } => {
            let entity_id = util::entity_id(&entity_id)?;
            let found = loaded(session, entity_id.as_str()).await?;
            let reconciliation = dispatcher.set_brightness(&found, level).await?;
            settle(session, reconciliation, &entity_id, &wait, global, format).await
        }

        DevicesCommand::Control {
            entity_id,
            service,
            data,
            wait,
        } => {
            let entity_id = util::entity_id(&entity_id)?;
            let service = parse_service(&service)?;
            let service_data = parse_service_data(data.as_deref())?;
            util::require_configured(session).await?;
            let reconciliation = dispatcher
                .dispatch(&entity_id, service, service_data)
                .await?;
            settle(session, reconciliation, &entity_id, &wait, global, format).await
        }
    }
}

// ── Helpers ─────────────────────────────────────────────────────────

/// Load status + devices (gating on configuration), then find one device
/// by backend id or entity id.
async fn loaded(session: &Session, identifier: &str) -> Result<Arc<Device>, CliError> {
    session.registry().load().await?;
    Ok(session.registry().resolve(identifier)?)
}

fn parse_service(raw: &str) -> Result<Service, CliError> {
    if raw.trim().is_empty() {
        return Err(CliError::Validation {
            field: "service".into(),
            reason: "service cannot be empty".into(),
        });
    }
    Ok(Service::from_str(raw).unwrap_or_else(|never| match never {}))
}

fn parse_service_data(raw: Option<&str>) -> Result<ServiceData, CliError> {
    let Some(raw) = raw else {
        return Ok(ServiceData::new());
    };
    match serde_json::from_str::<Value>(raw) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(_) => Err(CliError::Validation {
            field: "data".into(),
            reason: "expected a JSON object".into(),
        }),
        Err(e) => Err(CliError::Validation {
            field: "data".into(),
            reason: format!("invalid JSON: {e}"),
        }),
    }
}

/// Wait for the post-command refresh and print the reconciled device,
/// unless `--no-wait`.
async fn settle(
    session: &Session,
    reconciliation: Reconciliation,
    entity_id: &EntityId,
    wait: &WaitArgs,
    global: &GlobalOpts,
    format: OutputFormat,
) -> Result<(), CliError> {
    if wait.no_wait {
        output::notice(&format!("✓ Command sent to {entity_id}"), global.quiet);
        return Ok(());
    }

    let spinner = util::spinner("Waiting for the hub to settle...", global.quiet);
    let outcome = reconciliation.wait().await;
    spinner.finish_and_clear();

    match outcome {
        ReconciliationOutcome::Refreshed => match session.store().by_entity(entity_id) {
            Some(device) => print_device(&device, global, format),
            None => {
                output::notice(
                    &format!("✓ Command accepted; {entity_id} is not a managed device"),
                    global.quiet,
                );
                Ok(())
            }
        },
        ReconciliationOutcome::Failed | ReconciliationOutcome::Cancelled => {
            output::notice(
                &format!("✓ Command accepted, but refreshing {entity_id} failed ({outcome})"),
                global.quiet,
            );
            Ok(())
        }
    }
}
