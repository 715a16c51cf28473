//! CLI configuration: thin wrapper around `homedeck_config`.
//!
//! Adds resolution that respects `GlobalOpts` flag overrides
//! (--profile, --backend, --timeout, --insecure, --output).

use std::time::Duration;

use clap::ValueEnum;

use homedeck_core::SessionConfig;

use crate::cli::{GlobalOpts, OutputFormat};
use crate::error::CliError;

// ── Re-exports from shared crate ────────────────────────────────────

pub use homedeck_config::{
    Config, Profile, config_path, load_config_or_default, render_config, save_config,
};

// ── CLI-specific helpers ────────────────────────────────────────────

/// Resolve the active profile name from CLI flags and config.
pub fn active_profile_name(global: &GlobalOpts, config: &Config) -> String {
    config.active_profile_name(global.profile.as_deref())
}

/// Error for a profile name with no entry in `config`.
pub fn profile_not_found(config: &Config, name: &str) -> CliError {
    let available: Vec<_> = config.profiles.keys().cloned().collect();
    CliError::ProfileNotFound {
        name: name.into(),
        available: if available.is_empty() {
            "(none)".into()
        } else {
            available.join(", ")
        },
    }
}

/// Look up the active profile.
///
/// A missing profile is fine when `--backend` names the backend directly.
pub fn resolve_profile(global: &GlobalOpts, config: &Config) -> Result<Profile, CliError> {
    let name = active_profile_name(global, config);
    match config.profile(&name) {
        Ok(profile) => Ok(profile),
        Err(_) if global.backend.is_some() => Ok(Profile::default()),
        Err(_) => Err(profile_not_found(config, &name)),
    }
}

/// Translate the active profile + global flags into a `SessionConfig`.
///
/// CLI flag overrides take priority over profile values.
pub fn build_session_config(
    global: &GlobalOpts,
    config: &Config,
) -> Result<SessionConfig, CliError> {
    let profile = resolve_profile(global, config)?;
    let mut session = homedeck_config::profile_to_session_config(&profile, &config.defaults)?;

    if let Some(ref backend) = global.backend {
        session.backend_url = homedeck_config::parse_backend_url(backend)?;
    }
    if let Some(secs) = global.timeout {
        session.timeout = Duration::from_secs(secs);
    }
    if global.insecure {
        session.accept_invalid_certs = true;
    }

    tracing::debug!(
        backend = %session.backend_url,
        timeout = ?session.timeout,
        reconcile_delay = ?session.reconcile_delay,
        "resolved session config"
    );
    Ok(session)
}

/// The `--output` flag, else the configured default, else table.
pub fn output_format(global: &GlobalOpts, config: &Config) -> OutputFormat {
    global.output.unwrap_or_else(|| {
        OutputFormat::from_str(&config.defaults.output, true).unwrap_or(OutputFormat::Table)
    })
}
