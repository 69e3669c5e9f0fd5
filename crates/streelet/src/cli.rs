//! Clap derive structures for the `streelet` CLI.
//!
//! Defines the command tree, global flags, and shared value enums.

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// streelet -- watch, switch and provision dashboard devices
#[derive(Debug, Parser)]
#[command(
    name = "streelet",
    version,
    about = "Manage Streelet IoT devices from the command line",
    long_about = "Talks to a Streelet dashboard backend: lists and watches devices,\n\
        switches them on and off, and provisions freshly flashed boards.",
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
    /// Dashboard profile to use
    #[arg(long, short = 'p', env = "STREELET_PROFILE", global = true)]
    pub profile: Option<String>,

    /// Dashboard URL (overrides profile)
    #[arg(long, short = 's', env = "STREELET_SERVER", global = true)]
    pub server: Option<String>,

    /// Output format
    #[arg(
        long,
        short = 'o',
        env = "STREELET_OUTPUT",
        default_value = "table",
        global = true
    )]
    pub output: OutputFormat,

    /// When to use color output
    #[arg(long, default_value = "auto", global = true)]
    pub color: ColorMode,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Skip confirmation prompts
    #[arg(long, short = 'y', global = true)]
    pub yes: bool,

    /// Accept self-signed TLS certificates
    #[arg(long, short = 'k', env = "STREELET_INSECURE", global = true)]
    pub insecure: bool,

    /// Request timeout in seconds (overrides profile)
    #[arg(long, env = "STREELET_TIMEOUT", global = true)]
    pub timeout: Option<u64>,
}

// ── Output & Color Enums ─────────────────────────────────────────────

#[derive(Debug, Clone, ValueEnum)]
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

#[derive(Debug, Clone, ValueEnum)]
pub enum ColorMode {
    /// Auto-detect (color if terminal is interactive)
    Auto,
    /// Always emit color codes
    Always,
    /// Never emit color codes
    Never,
}

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// List, watch and control dashboard devices
    #[command(alias = "dev", alias = "d")]
    Devices(DevicesArgs),

    /// Dashboard summary tiles and status distribution
    #[command(alias = "st")]
    Stats,

    /// Configure a freshly flashed device (group, then name)
    #[command(alias = "prov")]
    Provision(ProvisionArgs),

    /// Hand WiFi credentials to the dashboard host
    #[command(alias = "w")]
    Wifi(WifiArgs),

    /// Manage CLI configuration and profiles
    #[command(alias = "cfg")]
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ── Devices ──────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct DevicesArgs {
    #[command(subcommand)]
    pub command: DevicesCommand,
}

#[derive(Debug, Subcommand)]
pub enum DevicesCommand {
    /// List devices
    #[command(alias = "ls")]
    List,

    /// Poll the dashboard and redraw on every change (Ctrl-C to stop)
    Watch {
        /// Poll interval in milliseconds (overrides profile)
        #[arg(long, value_name = "MS")]
        interval: Option<u64>,
    },

    /// Toggle a device on or off
    #[command(alias = "toggle")]
    Power {
        /// Device ID
        device: String,
    },

    /// Delete a device
    #[command(alias = "rm")]
    Delete {
        /// Device ID
        device: String,
    },

    /// Register a device by hand
    Add {
        /// Device ID
        #[arg(long = "id", value_name = "ID")]
        device_id: String,

        /// MQTT topic the device listens on
        #[arg(long)]
        topic: String,

        /// Display name
        #[arg(long)]
        name: Option<String>,

        /// Device IP address
        #[arg(long)]
        ip: Option<String>,
    },
}

// ── Provisioning ─────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ProvisionArgs {
    /// Device group (prompted for when omitted)
    #[arg(long, short = 'g')]
    pub group: Option<String>,

    /// Device name (prompted for when omitted)
    #[arg(long, short = 'n')]
    pub name: Option<String>,

    /// Seconds to wait before returning to the device list
    #[arg(long, value_name = "SECS")]
    pub redirect_delay: Option<u64>,
}

// ── WiFi ─────────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct WifiArgs {
    #[command(subcommand)]
    pub command: WifiCommand,
}

#[derive(Debug, Subcommand)]
pub enum WifiCommand {
    /// Send SSID and password to the dashboard host
    Set {
        /// Network name (defaults to the profile's wifi_ssid)
        #[arg(long)]
        ssid: Option<String>,

        /// Read the password from this environment variable
        #[arg(long, value_name = "VAR")]
        password_env: Option<String>,
    },
}

// ── Config ───────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Interactive configuration wizard
    Init,

    /// Show the resolved configuration (secrets masked)
    Show,

    /// Print the config file path
    Path,
}

// ── Completions ──────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}
