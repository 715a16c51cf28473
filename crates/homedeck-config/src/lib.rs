//! Local configuration for the homedeck CLI.
//!
//! TOML profiles naming which backend to talk to, loaded through figment
//! and translated into a `homedeck_core::SessionConfig`. Hub credentials
//! live on the backend and are never written here.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

use homedeck_core::SessionConfig;
use homedeck_core::config::{DEFAULT_BACKEND_URL, DEFAULT_RECONCILE_DELAY, DEFAULT_TIMEOUT};

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("profile '{name}' not found")]
    ProfileNotFound { name: String },

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level TOML configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Config {
    /// Profile used when `--profile` is not given.
    pub default_profile: Option<String>,

    #[serde(default)]
    pub defaults: Defaults,

    /// Named backend profiles.
    #[serde(default)]
    pub profiles: BTreeMap<String, Profile>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_profile: Some(DEFAULT_PROFILE.into()),
            defaults: Defaults::default(),
            profiles: BTreeMap::new(),
        }
    }
}

impl Config {
    /// Name of the profile to use: the explicit one, else the configured
    /// default, else `"default"`.
    pub fn active_profile_name(&self, explicit: Option<&str>) -> String {
        explicit
            .or(self.default_profile.as_deref())
            .unwrap_or(DEFAULT_PROFILE)
            .to_owned()
    }

    /// Look up a profile by name.
    ///
    /// A missing `"default"` profile resolves to [`Profile::default`] so a
    /// fresh install talks to the local backend without any setup.
    pub fn profile(&self, name: &str) -> Result<Profile, ConfigError> {
        match self.profiles.get(name) {
            Some(profile) => Ok(profile.clone()),
            None if name == DEFAULT_PROFILE => Ok(Profile::default()),
            None => Err(ConfigError::ProfileNotFound { name: name.into() }),
        }
    }
}

/// Name of the implicit profile.
pub const DEFAULT_PROFILE: &str = "default";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Defaults {
    #[serde(default = "default_output")]
    pub output: String,

    /// Request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout: u64,

    /// Delay before the post-control refresh, in milliseconds.
    #[serde(default = "default_reconcile_delay_ms")]
    pub reconcile_delay_ms: u64,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            output: default_output(),
            timeout: default_timeout(),
            reconcile_delay_ms: default_reconcile_delay_ms(),
        }
    }
}

fn default_output() -> String {
    "table".into()
}
fn default_timeout() -> u64 {
    DEFAULT_TIMEOUT.as_secs()
}
fn default_reconcile_delay_ms() -> u64 {
    u64::try_from(DEFAULT_RECONCILE_DELAY.as_millis()).unwrap_or(1000)
}

/// A named backend profile.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Profile {
    /// Backend base URL (e.g., "http://192.168.1.20:3000/api").
    pub backend: String,

    /// Override timeout (seconds).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout: Option<u64>,

    /// Override reconciliation delay (milliseconds).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reconcile_delay_ms: Option<u64>,

    /// Accept self-signed backend certificates.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub insecure: Option<bool>,
}

impl Default for Profile {
    fn default() -> Self {
        Self {
            backend: DEFAULT_BACKEND_URL.into(),
            timeout: None,
            reconcile_delay_ms: None,
            insecure: None,
        }
    }
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("dev", "homedeck", "homedeck").map_or_else(
        || {
            let mut p = dirs_fallback();
            p.push("config.toml");
            p
        },
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

fn dirs_fallback() -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(".config");
    p.push("homedeck");
    p
}

// ── Config loading ──────────────────────────────────────────────────

/// Load the full Config from the canonical file + environment.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

/// Load from an explicit file, layered over defaults and under
/// `HOMEDECK_`-prefixed environment variables (`__` separates nesting,
/// e.g. `HOMEDECK_DEFAULTS__TIMEOUT=5`).
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed("HOMEDECK_").split("__"));

    let config: Config = figment.extract()?;
    Ok(config)
}

/// Load config, returning a default if the file doesn't exist or is invalid.
pub fn load_config_or_default() -> Config {
    load_config().unwrap_or_default()
}

// ── Config saving ───────────────────────────────────────────────────

/// Serialize config to TOML and write to the canonical config path.
pub fn save_config(cfg: &Config) -> Result<PathBuf, ConfigError> {
    let path = config_path();
    save_config_to(&path, cfg)?;
    Ok(path)
}

pub fn save_config_to(path: &Path, cfg: &Config) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, render_config(cfg)?)?;
    Ok(())
}

/// Render the config as it would be written to disk.
pub fn render_config(cfg: &Config) -> Result<String, ConfigError> {
    Ok(toml::to_string_pretty(cfg)?)
}

// ── Translation ─────────────────────────────────────────────────────

/// Parse and check a backend URL.
pub fn parse_backend_url(raw: &str) -> Result<Url, ConfigError> {
    let url: Url = raw.trim().parse().map_err(|_| ConfigError::Validation {
        field: "backend".into(),
        reason: format!("invalid URL: {raw}"),
    })?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::Validation {
            field: "backend".into(),
            reason: format!("expected an http(s) URL, got '{raw}'"),
        });
    }
    Ok(url)
}

/// Build a `SessionConfig` from a profile, falling back to `defaults`
/// for anything the profile leaves unset. No CLI flag overrides.
pub fn profile_to_session_config(
    profile: &Profile,
    defaults: &Defaults,
) -> Result<SessionConfig, ConfigError> {
    let url = parse_backend_url(&profile.backend)?;

    let timeout = Duration::from_secs(profile.timeout.unwrap_or(defaults.timeout));
    let delay =
        Duration::from_millis(profile.reconcile_delay_ms.unwrap_or(defaults.reconcile_delay_ms));

    let mut config = SessionConfig::new(url)
        .with_timeout(timeout)
        .with_reconcile_delay(delay);
    config.accept_invalid_certs = profile.insecure.unwrap_or(false);
    Ok(config)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = load_config_from(&dir.path().join("nope.toml")).unwrap();

        assert_eq!(cfg.default_profile.as_deref(), Some("default"));
        assert_eq!(cfg.defaults.timeout, 30);
        assert_eq!(cfg.defaults.reconcile_delay_ms, 1000);
        assert!(cfg.profiles.is_empty());
    }

    #[test]
    fn file_values_override_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            r#"
default_profile = "attic"

[defaults]
output = "json"

[profiles.attic]
backend = "http://192.168.1.20:3000/api"
timeout = 10
reconcile_delay_ms = 500
insecure = true
"#,
        )
        .unwrap();

        let cfg = load_config_from(&path).unwrap();
        assert_eq!(cfg.active_profile_name(None), "attic");
        assert_eq!(cfg.defaults.output, "json");
        assert_eq!(cfg.defaults.timeout, 30);

        let profile = cfg.profile("attic").unwrap();
        assert_eq!(profile.timeout, Some(10));
        assert_eq!(profile.insecure, Some(true));
    }

    #[test]
    fn rendered_config_quotes_awkward_names() {
        let mut cfg = Config::default();
        cfg.profiles.insert(
            "attic.v2".into(),
            Profile {
                backend: r#"http://hub.local/api?tag="x""#.into(),
                ..Profile::default()
            },
        );

        let text = render_config(&cfg).unwrap();
        assert!(!text.contains("[profiles.attic.v2]"));

        let parsed: Config = toml::from_str(&text).unwrap();
        assert_eq!(parsed, cfg);
    }

    #[test]
    fn save_then_load_preserves_profiles() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut cfg = Config::default();
        cfg.profiles.insert(
            "lab".into(),
            Profile {
                backend: "https://lab.local/api".into(),
                timeout: Some(5),
                ..Profile::default()
            },
        );
        save_config_to(&path, &cfg).unwrap();

        let written = std::fs::read_to_string(&path).unwrap();
        assert!(written.contains("[profiles.lab]"));
        assert!(!written.contains("insecure"));
        assert_eq!(load_config_from(&path).unwrap(), cfg);
    }

    #[test]
    fn implicit_default_profile_points_at_local_backend() {
        let cfg = Config::default();
        let profile = cfg.profile("default").unwrap();
        assert_eq!(profile.backend, DEFAULT_BACKEND_URL);
    }

    #[test]
    fn unknown_profile_is_an_error() {
        let cfg = Config::default();
        assert!(matches!(
            cfg.profile("garage"),
            Err(ConfigError::ProfileNotFound { ref name }) if name == "garage"
        ));
    }

    #[test]
    fn explicit_profile_name_wins() {
        let cfg = Config {
            default_profile: Some("attic".into()),
            ..Config::default()
        };
        assert_eq!(cfg.active_profile_name(Some("lab")), "lab");
        assert_eq!(cfg.active_profile_name(None), "attic");
    }

    #[test]
    fn session_config_uses_profile_overrides() {
        let profile = Profile {
            backend: "http://hub.local:3000/api".into(),
            timeout: Some(10),
            reconcile_delay_ms: None,
            insecure: Some(true),
        };
        let defaults = Defaults {
            reconcile_delay_ms: 250,
            ..Defaults::default()
        };

        let session = profile_to_session_config(&profile, &defaults).unwrap();
        assert_eq!(session.backend_url.as_str(), "http://hub.local:3000/api");
        assert_eq!(session.timeout, Duration::from_secs(10));
        assert_eq!(session.reconcile_delay, Duration::from_millis(250));
        assert!(session.accept_invalid_certs);
    }

    #[test]
    fn session_config_rejects_bad_backend() {
        let defaults = Defaults::default();
        for backend in ["not a url", "ftp://files.local/api"] {
            let profile = Profile {
                backend: backend.into(),
                ..Profile::default()
            };
            assert!(matches!(
                profile_to_session_config(&profile, &defaults),
                Err(ConfigError::Validation { ref field, .. }) if field == "backend"
            ));
        }
    }
}
