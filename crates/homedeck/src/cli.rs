//! Clap derive structures for the `homedeck` CLI.
//!
//! Defines the complete command tree, global flags, and shared types.

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// homedeck -- control Home Assistant devices through a homedeck backend
#[derive(Debug, Parser)]
#[command(
    name = "homedeck",
    version,
    about = "Control Home Assistant devices from the command line",
    long_about = "Manage the devices a homedeck backend exposes from a Home Assistant hub.\n\n\
        The backend owns the hub connection; this tool configures it, lists\n\
        and controls devices, and reports the reconciled state.",
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Command,
}

// ── Global Options ───────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// Backend profile to use
    #[arg(long, short = 'p', env = "HOMEDECK_PROFILE", global = true)]
    pub profile: Option<String>,

    /// Backend URL (overrides profile)
    #[arg(long, short = 'b', env = "HOMEDECK_BACKEND", global = true)]
    pub backend: Option<String>,

    /// Output format [default: from config, else table]
    #[arg(long, short = 'o', env = "HOMEDECK_OUTPUT", global = true)]
    pub output: Option<OutputFormat>,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Skip confirmation prompts
    #[arg(long, short = 'y', global = true)]
    pub yes: bool,

    /// Accept self-signed TLS certificates from the backend
    #[arg(long, short = 'k', env = "HOMEDECK_INSECURE", global = true)]
    pub insecure: bool,

    /// Request timeout in seconds (overrides profile)
    #[arg(long, env = "HOMEDECK_TIMEOUT", global = true)]
    pub timeout: Option<u64>,
}

// ── Output Enum ──────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Pretty table (default, interactive)
    Table,
    /// Pretty-printed JSON
    Json,
    /// Compact single-line JSON
    JsonCompact,
    /// YAML
    Yaml,
    /// Plain text, one value per line (scripting)
    Plain,
}

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Configure and inspect the backend's hub connection
    Hub(HubArgs),

    /// List, manage and control devices
    #[command(alias = "dev", alias = "d")]
    Devices(DevicesArgs),

    /// Manage local CLI configuration and profiles
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  HUB
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct HubArgs {
    #[command(subcommand)]
    pub command: HubCommand,
}

/// Hub URL plus the long-lived access token to send with it.
#[derive(Debug, Args)]
pub struct HubCredentialArgs {
    /// Hub URL (e.g. 192.168.1.5:8123; http:// is assumed)
    pub url: String,

    /// Long-lived access token (prompted for when omitted)
    #[arg(long, env = "HOMEDECK_HUB_TOKEN", hide_env_values = true)]
    pub token: Option<String>,
}

#[derive(Debug, Subcommand)]
pub enum HubCommand {
    /// Show whether the hub is configured and connected
    Status,

    /// Show the stored hub configuration and status
    Show,

    /// Save hub credentials on the backend
    Set(HubCredentialArgs),

    /// Test hub credentials without saving them
    Test(HubCredentialArgs),

    /// Re-open the backend's realtime link to the hub
    RestartLink,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  DEVICES
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct DevicesArgs {
    #[command(subcommand)]
    pub command: DevicesCommand,
}

/// Shared flag for commands that schedule a reconciliation refresh.
#[derive(Debug, Args)]
pub struct WaitArgs {
    /// Return as soon as the hub accepts the command
    #[arg(long)]
    pub no_wait: bool,
}

#[derive(Debug, Subcommand)]
pub enum DevicesCommand {
    /// List managed devices
    #[command(alias = "ls")]
    List,

    /// Show one device (backend id or entity id)
    Get {
        /// Backend id or entity id
        device: String,
    },

    /// Discover hub entities and sync the managed list
    Discover,

    /// Start managing a hub entity
    Add {
        /// Entity id (e.g. light.living_room)
        entity_id: String,
    },

    /// Stop managing a device
    #[command(alias = "rm")]
    Remove {
        /// Backend id or entity id
        device: String,
    },

    /// Re-read one device's live state
    Refresh {
        /// Backend id or entity id
        device: String,
    },

    /// Show the controls a device offers in its current state
    Controls {
        /// Entity id
        entity_id: String,
    },

    /// Press a device's on/off toggle
    Toggle {
        /// Entity id
        entity_id: String,

        #[command(flatten)]
        wait: WaitArgs,
    },

    /// Set a light's brightness (0-255, rounded and clamped)
    Brightness {
        /// Entity id
        entity_id: String,

        /// Brightness level
        #[arg(allow_negative_numbers = true)]
        level: f64,

        #[command(flatten)]
        wait: WaitArgs,
    },

    /// Call an arbitrary hub service on an entity
    Control {
        /// Entity id
        entity_id: String,

        /// Service name (e.g. turn_on, turn_off, toggle)
        service: String,

        /// Service data as a JSON object
        #[arg(long)]
        data: Option<String>,

        #[command(flatten)]
        wait: WaitArgs,
    },
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  CONFIG
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Create a profile with guided setup
    Init,

    /// Display current configuration
    Show,

    /// Print the config file location
    Path,

    /// Set the default profile
    Use {
        /// Profile name to set as default
        name: String,
    },
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  COMPLETIONS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}
