//! Clap derive structures for the `ecovacs` CLI.
//!
//! Defines the command tree, global flags, and shared types.

use chrono::{DateTime, Utc};
use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// ecovacs -- control Ecovacs robot vacuums through the domestic open platform
#[derive(Debug, Parser)]
#[command(
    name = "ecovacs",
    version,
    about = "Control Ecovacs robot vacuums from the command line",
    long_about = "Query and control Ecovacs DEEBOT robots bound to a Mainland China\n\
        account, using an API key issued on the Ecovacs open platform.\n\n\
        Keys are valid for 90 days and cannot be refreshed; issue a new one\n\
        on the platform and run `ecovacs config set-key` when it expires.",
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
    /// Account profile to use
    #[arg(long, short = 'p', env = "ECOVACS_PROFILE", global = true)]
    pub profile: Option<String>,

    /// Open platform base URL (overrides profile)
    #[arg(long, env = "ECOVACS_API_URL", global = true)]
    pub api_url: Option<String>,

    /// API key (overrides profile)
    #[arg(long, env = "ECOVACS_API_KEY", global = true, hide_env = true)]
    pub api_key: Option<String>,

    /// When the API key was issued, RFC 3339 (overrides profile)
    #[arg(long, env = "ECOVACS_ISSUED_AT", global = true)]
    pub issued_at: Option<DateTime<Utc>>,

    /// Output format
    #[arg(
        long,
        short = 'o',
        env = "ECOVACS_OUTPUT",
        default_value = "table",
        global = true
    )]
    pub output: OutputFormat,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Request timeout in seconds (overrides profile)
    #[arg(long, env = "ECOVACS_TIMEOUT", global = true)]
    pub timeout: Option<u64>,
}

// ── Output Format ────────────────────────────────────────────────────

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

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// List robots and their status
    #[command(alias = "dev", alias = "d")]
    Devices(DevicesArgs),

    /// Start, pause, resume or stop cleaning
    Clean(CleanArgs),

    /// Send a robot to its dock or cancel the return
    Dock(DockArgs),

    /// Poll continuously and print each update
    Watch(WatchArgs),

    /// Manage CLI configuration and profiles
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
    /// List all robots bound to the account
    #[command(alias = "ls")]
    List,

    /// Show one robot
    Get {
        /// Device nickname
        device: String,
    },
}

// ── Clean ────────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct CleanArgs {
    #[command(subcommand)]
    pub command: CleanCommand,
}

#[derive(Debug, Subcommand)]
pub enum CleanCommand {
    /// Start cleaning
    Start {
        /// Device nickname
        device: String,
    },
    /// Pause cleaning
    Pause {
        /// Device nickname
        device: String,
    },
    /// Resume paused cleaning
    Resume {
        /// Device nickname
        device: String,
    },
    /// Stop cleaning
    Stop {
        /// Device nickname
        device: String,
    },
}

// ── Dock ─────────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct DockArgs {
    #[command(subcommand)]
    pub command: DockCommand,
}

#[derive(Debug, Subcommand)]
pub enum DockCommand {
    /// Return to the charging dock
    Return {
        /// Device nickname
        device: String,
    },
    /// Cancel an in-progress return
    Cancel {
        /// Device nickname
        device: String,
    },
}

// ── Watch ────────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct WatchArgs {
    /// Polling interval in seconds (overrides profile)
    #[arg(long, short = 'i')]
    pub interval: Option<u64>,

    /// Exit after this many updates
    #[arg(long, short = 'n')]
    pub count: Option<u64>,
}

// ── Config ───────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Create initial config file with guided setup
    Init,

    /// Display current configuration (secrets masked)
    Show,

    /// Store a newly issued API key for the active profile
    ///
    /// The issue time defaults to now; pass --issued-at for an older key.
    SetKey {
        /// Save the key to the config file instead of the system keyring
        #[arg(long)]
        plaintext: bool,
    },

    /// Print the config file path
    Path,
}

// ── Completions ──────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}
