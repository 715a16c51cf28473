//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` and `ConfigError` into user-facing errors with
//! actionable help text and stable exit codes.

use miette::Diagnostic;
use thiserror::Error;

use homedeck_config::ConfigError;
use homedeck_core::CoreError;

/// Process exit codes.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const NOT_CONFIGURED: i32 = 3;
    pub const NOT_FOUND: i32 = 4;
    pub const CONNECTION: i32 = 7;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Connection ───────────────────────────────────────────────────
    #[error("Could not reach the homedeck backend at {url}")]
    #[diagnostic(
        code(homedeck::connection_failed),
        help(
            "{reason}\n\
             Check that the backend is running and reachable, or pass --backend.\n\
             Slow networks may need a larger --timeout."
        )
    )]
    ConnectionFailed { url: String, reason: String },

    #[error("Home Assistant is not configured on the backend")]
    #[diagnostic(
        code(homedeck::not_configured),
        help(
            "Configure the hub first:\n  \
             homedeck hub set <URL> --token <TOKEN>"
        )
    )]
    NotConfigured,

    // ── Resources ────────────────────────────────────────────────────
    #[error("{resource_type} '{identifier}' not found")]
    #[diagnostic(
        code(homedeck::not_found),
        help("Run: homedeck {list_command} to see available {resource_type}s")
    )]
    NotFound {
        resource_type: String,
        identifier: String,
        list_command: String,
    },

    // ── Backend ──────────────────────────────────────────────────────
    #[error("Backend error (HTTP {status}): {message}")]
    #[diagnostic(code(homedeck::backend))]
    Backend { status: u16, message: String },

    #[error("Unexpected response from backend: {message}")]
    #[diagnostic(
        code(homedeck::invalid_response),
        help("Check that --backend points at the homedeck API (usually ending in /api).")
    )]
    InvalidResponse { message: String },

    #[error("{message}")]
    #[diagnostic(code(homedeck::load_failed))]
    LoadFailed {
        message: String,
        #[related]
        causes: Vec<CliError>,
    },

    // ── Validation ───────────────────────────────────────────────────
    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(homedeck::validation))]
    Validation { field: String, reason: String },

    // ── Configuration ────────────────────────────────────────────────
    #[error("Profile '{name}' not found in configuration")]
    #[diagnostic(
        code(homedeck::profile_not_found),
        help(
            "Available profiles: {available}\n\
             Create one with: homedeck config init"
        )
    )]
    ProfileNotFound { name: String, available: String },

    #[error(transparent)]
    #[diagnostic(code(homedeck::config))]
    Config(ConfigError),

    // ── Interactive ──────────────────────────────────────────────────
    #[error("Destructive operation '{action}' requires confirmation")]
    #[diagnostic(
        code(homedeck::confirmation_required),
        help("Use --yes (-y) to skip confirmation in non-interactive contexts.")
    )]
    NonInteractiveRequiresYes { action: String },

    // ── IO / Internal ────────────────────────────────────────────────
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Internal error: {0}")]
    #[diagnostic(code(homedeck::internal))]
    Internal(String),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConnectionFailed { .. } => exit_code::CONNECTION,
            Self::NotConfigured => exit_code::NOT_CONFIGURED,
            Self::NotFound { .. } | Self::Backend { status: 404, .. } => exit_code::NOT_FOUND,
            Self::Validation { .. }
            | Self::NonInteractiveRequiresYes { .. }
            | Self::Config(ConfigError::Validation { .. }) => exit_code::USAGE,
            Self::LoadFailed { causes, .. } => causes
                .iter()
                .map(Self::exit_code)
                .find(|code| *code == exit_code::CONNECTION)
                .or_else(|| causes.first().map(Self::exit_code))
                .unwrap_or(exit_code::GENERAL),
            _ => exit_code::GENERAL,
        }
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::NetworkUnreachable { url, reason } => Self::ConnectionFailed { url, reason },

            CoreError::NotConfigured => Self::NotConfigured,

            CoreError::Backend { status, message } => Self::Backend { status, message },

            CoreError::InvalidResponse { message } => Self::InvalidResponse { message },

            CoreError::LoadFailed { failures } => Self::LoadFailed {
                message: "Failed to load hub data".into(),
                causes: failures.into_iter().map(Self::from).collect(),
            },

            CoreError::Validation { field, message } => Self::Validation {
                field,
                reason: message,
            },

            CoreError::DeviceNotFound { identifier } => Self::NotFound {
                resource_type: "device".into(),
                identifier,
                list_command: "devices list".into(),
            },

            CoreError::Config { message } => Self::Validation {
                field: "backend".into(),
                reason: message,
            },

            CoreError::Internal(message) => Self::Internal(message),
        }
    }
}

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        Self::Config(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn core_errors_map_to_stable_exit_codes() {
        let cases = [
            (
                CoreError::NetworkUnreachable {
                    url: "http://x/api".into(),
                    reason: "timed out".into(),
                },
                exit_code::CONNECTION,
            ),
            (CoreError::NotConfigured, exit_code::NOT_CONFIGURED),
            (
                CoreError::DeviceNotFound {
                    identifier: "9".into(),
                },
                exit_code::NOT_FOUND,
            ),
            (
                CoreError::Backend {
                    status: 404,
                    message: "entity not found".into(),
                },
                exit_code::NOT_FOUND,
            ),
            (
                CoreError::Backend {
                    status: 500,
                    message: "request failed".into(),
                },
                exit_code::GENERAL,
            ),
            (
                CoreError::Validation {
                    field: "entity_id".into(),
                    message: "empty".into(),
                },
                exit_code::USAGE,
            ),
        ];

        for (core, expected) in cases {
            let label = core.to_string();
            assert_eq!(CliError::from(core).exit_code(), expected, "{label}");
        }
    }

    #[test]
    fn load_failure_prefers_connection_code() {
        let err = CliError::from(CoreError::LoadFailed {
            failures: vec![
                CoreError::Backend {
                    status: 500,
                    message: "db locked".into(),
                },
                CoreError::NetworkUnreachable {
                    url: "http://x/api".into(),
                    reason: "refused".into(),
                },
            ],
        });
        assert_eq!(err.exit_code(), exit_code::CONNECTION);
    }

    #[test]
    fn load_failure_falls_back_to_first_cause() {
        let err = CliError::from(CoreError::LoadFailed {
            failures: vec![CoreError::InvalidResponse {
                message: "bad json".into(),
            }],
        });
        assert_eq!(err.exit_code(), exit_code::GENERAL);
    }
}
