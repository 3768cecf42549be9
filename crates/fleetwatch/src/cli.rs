//! Clap derive structures for the `fleetwatch` CLI.

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// fleetwatch -- live fleet monitoring from the terminal
#[derive(Debug, Parser)]
#[command(
    name = "fleetwatch",
    version,
    about = "Monitor a vehicle fleet from the command line",
    long_about = "Polls a GPS tracking API for unit positions and alerts, merges in\n\
        operator overrides and client assignments, and keeps a deduplicated\n\
        alarm list.",
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
    /// Tracking account profile to use
    #[arg(long, short = 'p', env = "FLEETWATCH_PROFILE", global = true)]
    pub profile: Option<String>,

    /// Tracking API key
    #[arg(long, env = "FLEETWATCH_API_KEY", global = true, hide_env_values = true)]
    pub api_key: Option<String>,

    /// Tracking API root (overrides profile)
    #[arg(long, env = "FLEETWATCH_BASE_URL", global = true)]
    pub base_url: Option<String>,

    /// Output format
    #[arg(
        long,
        short = 'o',
        env = "FLEETWATCH_OUTPUT",
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

    /// Accept invalid TLS certificates
    #[arg(long, short = 'k', global = true)]
    pub insecure: bool,

    /// Request timeout in seconds (overrides profile)
    #[arg(long, env = "FLEETWATCH_TIMEOUT", global = true)]
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
    /// Run the poll loop and print changes until Ctrl-C
    Watch(WatchArgs),

    /// Poll once and list merged units
    #[command(alias = "u")]
    Units,

    /// List deduplicated alarms from a recent time range
    #[command(alias = "a")]
    Alarms(AlarmsArgs),

    /// Manage per-unit overrides
    #[command(alias = "ov")]
    Overrides(OverridesArgs),

    /// Manage clients units are assigned to
    #[command(alias = "cl")]
    Clients(ClientsArgs),

    /// Inspect CLI configuration
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  WATCH / ALARMS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct WatchArgs {
    /// Seconds between polls (overrides config)
    #[arg(long, short = 'i', value_parser = clap::value_parser!(u64).range(1..))]
    pub interval: Option<u64>,
}

#[derive(Debug, Args)]
pub struct AlarmsArgs {
    /// How many minutes back to query
    #[arg(long, default_value = "120", value_parser = clap::value_parser!(u32).range(1..))]
    pub since_minutes: u32,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  OVERRIDES
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct OverridesArgs {
    #[command(subcommand)]
    pub command: OverridesCommand,
}

#[derive(Debug, Subcommand)]
pub enum OverridesCommand {
    /// List stored overrides
    #[command(alias = "ls")]
    List,

    /// Set override fields for a unit; omitted fields keep their value
    Set {
        /// Unit ID
        unit_id: u64,

        /// Display number or plate
        #[arg(long)]
        number: Option<String>,

        /// Vehicle model
        #[arg(long)]
        model: Option<String>,

        /// Driver name
        #[arg(long)]
        driver: Option<String>,

        /// Driver phone
        #[arg(long)]
        driver_phone: Option<String>,

        /// Owning client ID
        #[arg(long)]
        client: Option<u64>,
    },
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  CLIENTS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct ClientsArgs {
    #[command(subcommand)]
    pub command: ClientsCommand,
}

#[derive(Debug, Subcommand)]
pub enum ClientsCommand {
    /// List clients
    #[command(alias = "ls")]
    List,

    /// Add a client, or update one when --id is given
    Add {
        /// Company name
        #[arg(long)]
        company: String,

        /// Contact person
        #[arg(long)]
        contact: Option<String>,

        #[arg(long)]
        phone: Option<String>,

        #[arg(long)]
        email: Option<String>,

        /// Existing client ID to update
        #[arg(long)]
        id: Option<u64>,
    },

    /// Remove a client
    #[command(alias = "rm")]
    Remove {
        /// Client ID
        id: u64,
    },
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  CONFIG / COMPLETIONS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Display the loaded configuration, secrets redacted
    Show,

    /// Print the config file location
    Path,
}

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}
