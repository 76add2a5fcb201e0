//! Clap derive structures for the `keenawg` CLI.
//!
//! Defines the complete command tree, global flags, and shared types.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// keenawg -- AmneziaWG tunnels and static routes on Keenetic routers
#[derive(Debug, Parser)]
#[command(
    name = "keenawg",
    version,
    about = "Provision AmneziaWG interfaces and routes on Keenetic routers",
    long_about = "Imports WireGuard / AmneziaWG .conf files as Keenetic router\n\
        interfaces, brings them up, and replaces the static routes bound to\n\
        them from batch route files or route list URLs.\n\n\
        Talks to the router through its RCI web interface.",
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
    /// Router profile to use
    #[arg(long, short = 'p', env = "KEENAWG_PROFILE", global = true)]
    pub profile: Option<String>,

    /// Router URL (overrides profile)
    #[arg(long, short = 'u', env = "KEENAWG_URL", global = true)]
    pub url: Option<String>,

    /// Router admin login (overrides profile)
    #[arg(long, short = 'l', env = "KEENAWG_LOGIN", global = true)]
    pub login: Option<String>,

    /// Router admin password
    #[arg(
        long,
        env = "KEENAWG_PASSWORD",
        global = true,
        hide = true,
        hide_env_values = true
    )]
    pub password: Option<String>,

    /// Output format
    #[arg(
        long,
        short = 'o',
        env = "KEENAWG_OUTPUT",
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
    #[arg(long, short = 'k', env = "KEENAWG_INSECURE", global = true)]
    pub insecure: bool,

    /// Request timeout in seconds (overrides profile)
    #[arg(long, env = "KEENAWG_TIMEOUT", global = true)]
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
    /// Check the router connection and credentials
    Check,

    /// Manage WireGuard / AmneziaWG interfaces
    #[command(alias = "wg")]
    Awg(AwgArgs),

    /// Manage static routes bound to an interface
    #[command(alias = "r")]
    Routes(RoutesArgs),

    /// Manage CLI configuration and profiles
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  AWG
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct AwgArgs {
    #[command(subcommand)]
    pub command: AwgCommand,
}

#[derive(Debug, Subcommand)]
pub enum AwgCommand {
    /// Import a .conf file as a new interface and bring it up
    #[command(alias = "add")]
    Create(CreateArgs),

    /// List WireGuard interfaces on the router
    #[command(alias = "ls")]
    List,

    /// Delete an interface
    #[command(alias = "rm")]
    Delete {
        /// Interface ID (e.g. Wireguard0)
        id: String,
    },
}

#[derive(Debug, Args)]
pub struct CreateArgs {
    /// WireGuard / AmneziaWG configuration file
    #[arg(value_name = "FILE")]
    pub file: PathBuf,

    /// Interface description on the router (defaults to the file name)
    #[arg(long, short = 'n')]
    pub name: Option<String>,

    /// Pause between import and configuration, in milliseconds
    #[arg(long, value_name = "MS")]
    pub settle_delay_ms: Option<u64>,

    /// How long to wait for the tunnel to come up, in seconds
    #[arg(long, value_name = "SECS")]
    pub ready_timeout: Option<u64>,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  ROUTES
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct RoutesArgs {
    #[command(subcommand)]
    pub command: RoutesCommand,
}

/// Route sources, read in order. Later sources override earlier ones for
/// the same destination.
#[derive(Debug, Args)]
pub struct SourceArgs {
    /// Batch route file (repeatable)
    #[arg(long = "file", short = 'f', value_name = "PATH")]
    pub files: Vec<PathBuf>,

    /// Route list URL (repeatable)
    #[arg(long = "url", short = 'U', value_name = "URL")]
    pub urls: Vec<String>,
}

#[derive(Debug, Subcommand)]
pub enum RoutesCommand {
    /// Replace all routes on an interface with the given sources
    Replace {
        /// Interface ID (e.g. Wireguard0)
        interface: String,

        #[command(flatten)]
        sources: SourceArgs,
    },

    /// Delete every route bound to an interface
    Clear {
        /// Interface ID (e.g. Wireguard0)
        interface: String,
    },

    /// List routes bound to an interface
    #[command(alias = "ls")]
    List {
        /// Interface ID (e.g. Wireguard0)
        interface: String,
    },

    /// Load and merge sources without touching the router
    Preview {
        #[command(flatten)]
        sources: SourceArgs,
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
    /// Create initial config file with guided setup
    Init,

    /// Display current resolved configuration
    Show,

    /// Print the config file location
    Path,

    /// Set a profile value
    Set {
        /// Profile key (url, login, password_env, insecure, timeout, ca_cert)
        key: String,

        /// Value to set
        value: String,
    },

    /// List configured profiles
    Profiles,

    /// Set the default profile
    Use {
        /// Profile name to set as default
        name: String,
    },

    /// Store the active profile's router password in the system keyring
    SetPassword,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  COMPLETIONS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}
