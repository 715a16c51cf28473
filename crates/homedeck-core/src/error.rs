// ── Core error types ──
//
// User-facing errors from homedeck-core. Consumers never see reqwest or
// serde failures directly; `From<homedeck_api::Error>` normalizes every
// transport-layer failure into this taxonomy.

use thiserror::Error;

use crate::model::EntityIdError;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Connection errors ────────────────────────────────────────────
    #[error("Cannot reach the backend at {url}: {reason}")]
    NetworkUnreachable { url: String, reason: String },

    #[error("Home Assistant is not configured")]
    NotConfigured,

    // ── Backend errors ───────────────────────────────────────────────
    #[error("{message} (HTTP {status})")]
    Backend { status: u16, message: String },

    #[error("Invalid response from backend: {message}")]
    InvalidResponse { message: String },

    #[error("Failed to load hub data: {}", summarize(.failures))]
    LoadFailed { failures: Vec<CoreError> },

    // ── Input errors ─────────────────────────────────────────────────
    #[error("Invalid {field}: {message}")]
    Validation { field: String, message: String },

    #[error("Device not found: {identifier}")]
    DeviceNotFound { identifier: String },

    // ── Configuration errors ─────────────────────────────────────────
    #[error("Configuration error: {message}")]
    Config { message: String },

    // ── Internal errors ──────────────────────────────────────────────
    #[error("Internal error: {0}")]
    Internal(String),
}

impl CoreError {
    pub(crate) fn validation(field: &str, message: impl Into<String>) -> Self {
        Self::Validation {
            field: field.to_owned(),
            message: message.into(),
        }
    }

    pub fn is_not_configured(&self) -> bool {
        matches!(self, Self::NotConfigured)
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation { .. })
    }

    /// True when the backend could not be reached at all, including when
    /// every part of an aggregated load failed that way.
    pub fn is_unreachable(&self) -> bool {
        match self {
            Self::NetworkUnreachable { .. } => true,
            Self::LoadFailed { failures } => {
                !failures.is_empty() && failures.iter().all(Self::is_unreachable)
            }
            _ => false,
        }
    }

    /// HTTP status carried by a backend rejection.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Backend { status, .. } => Some(*status),
            Self::LoadFailed { failures } => failures.iter().find_map(Self::status),
            _ => None,
        }
    }
}

fn summarize(failures: &[CoreError]) -> String {
    failures
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<homedeck_api::Error> for CoreError {
    fn from(err: homedeck_api::Error) -> Self {
        match err {
            homedeck_api::Error::Transport(ref e) => {
                if let Some(status) = e.status() {
                    CoreError::Backend {
                        status: status.as_u16(),
                        message: e.to_string(),
                    }
                } else if e.is_decode() || e.is_body() {
                    CoreError::InvalidResponse {
                        message: e.to_string(),
                    }
                } else {
                    CoreError::NetworkUnreachable {
                        url: e
                            .url()
                            .map(|u| u.origin().ascii_serialization())
                            .unwrap_or_else(|| "<unknown>".into()),
                        reason: if e.is_timeout() {
                            "request timed out".into()
                        } else {
                            root_cause(e)
                        },
                    }
                }
            }
            homedeck_api::Error::InvalidUrl(e) => CoreError::Config {
                message: format!("Invalid URL: {e}"),
            },
            homedeck_api::Error::CannotBeABase(url) => CoreError::Config {
                message: format!("URL cannot be used as a backend base: {url}"),
            },
            homedeck_api::Error::Tls(msg) => CoreError::Config {
                message: format!("TLS setup failed: {msg}"),
            },
            homedeck_api::Error::Backend { status, message } => {
                CoreError::Backend { status, message }
            }
            homedeck_api::Error::Deserialization { message, body: _ } => {
                CoreError::InvalidResponse { message }
            }
        }
    }
}

impl From<EntityIdError> for CoreError {
    fn from(err: EntityIdError) -> Self {
        CoreError::validation("entity_id", err.to_string())
    }
}

/// Innermost error message; reqwest's top-level text is just
/// "error sending request".
fn root_cause(err: &(dyn std::error::Error + 'static)) -> String {
    let mut current = err;
    while let Some(next) = current.source() {
        current = next;
    }
    current.to_string()
}
