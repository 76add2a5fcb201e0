//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError`, `ProvisionError` and `ConfigError` into user-facing
//! errors with actionable help text and stable exit codes.

use miette::Diagnostic;
use thiserror::Error;

use keenawg_config::ConfigError;
use keenawg_core::{CoreError, ProvisionError, ProvisionState, ProvisionStep, Step};

/// Process exit codes.
pub mod exit_code {
    pub const SUCCESS: i32 = 0;
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const AUTH: i32 = 3;
    pub const NOT_FOUND: i32 = 4;
    pub const CONFLICT: i32 = 6;
    pub const CONNECTION: i32 = 7;
    pub const TIMEOUT: i32 = 8;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Connection ───────────────────────────────────────────────────

    #[error("Could not connect to router at {url}")]
    #[diagnostic(
        code(keenawg::connection_failed),
        help(
            "{reason}\n\
             Check that the router web interface is reachable from this machine.\n\
             For a self-signed HTTPS certificate, try --insecure (-k)."
        )
    )]
    ConnectionFailed { url: String, reason: String },

    // ── Authentication ───────────────────────────────────────────────

    #[error("Authentication failed: {message}")]
    #[diagnostic(
        code(keenawg::auth_failed),
        help(
            "Verify the router login and password.\n\
             Store a new password with: keenawg config set-password"
        )
    )]
    AuthFailed { message: String },

    #[error("No password configured for profile '{profile}'")]
    #[diagnostic(
        code(keenawg::no_credentials),
        help(
            "Store one with: keenawg config set-password --profile {profile}\n\
             Or set the KEENAWG_PASSWORD environment variable."
        )
    )]
    NoCredentials { profile: String },

    // ── Router ───────────────────────────────────────────────────────

    #[error("{resource_type} '{identifier}' not found")]
    #[diagnostic(
        code(keenawg::not_found),
        help("Run: keenawg {list_command} to see what the router has")
    )]
    NotFound {
        resource_type: String,
        identifier: String,
        list_command: String,
    },

    #[error("Interface {interface} already serves peer {identity}")]
    #[diagnostic(
        code(keenawg::already_exists),
        help(
            "This peer is already provisioned on the router.\n\
             Remove it first with: keenawg awg delete {interface}"
        )
    )]
    AlreadyExists { interface: String, identity: String },

    #[error("Router refused to {step} ({target}): {detail}")]
    #[diagnostic(code(keenawg::router_error))]
    Router {
        step: Step,
        target: String,
        detail: String,
    },

    #[error("Interface {interface} did not come up within {seconds}s")]
    #[diagnostic(
        code(keenawg::timeout),
        help(
            "The interface exists but the tunnel is not connected.\n\
             Check the peer endpoint, or wait longer with --ready-timeout."
        )
    )]
    Timeout { interface: String, seconds: u64 },

    #[error("Interrupted while waiting for {interface}")]
    #[diagnostic(code(keenawg::cancelled))]
    Cancelled { interface: String },

    #[error("Provisioning stopped at step '{at}'")]
    #[diagnostic(
        code(keenawg::provision_incomplete),
        help(
            "Interface {interface} was left on the router.\n\
             Inspect it in the web interface, or remove it with: keenawg awg delete {interface}"
        )
    )]
    ProvisionIncomplete {
        at: String,
        interface: String,
        #[source]
        cause: Box<CliError>,
    },

    // ── Input ────────────────────────────────────────────────────────

    #[error("Invalid input")]
    #[diagnostic(code(keenawg::validation), help("{details}"))]
    InvalidInput { details: String },

    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(keenawg::validation))]
    Validation { field: String, reason: String },

    #[error("{message}")]
    #[diagnostic(
        code(keenawg::parse),
        help("Check the file: one `key = value` per line inside [Interface] / [Peer] sections.")
    )]
    Parse { message: String },

    #[error("Route source {origin} could not be used")]
    #[diagnostic(code(keenawg::route_source), help("{reason}"))]
    RouteSource { origin: String, reason: String },

    // ── Configuration ────────────────────────────────────────────────

    #[error("Profile '{name}' not found in configuration")]
    #[diagnostic(
        code(keenawg::profile_not_found),
        help(
            "Available profiles: {available}\n\
             Create one with: keenawg config init"
        )
    )]
    ProfileNotFound { name: String, available: String },

    #[error("No router configured")]
    #[diagnostic(
        code(keenawg::no_config),
        help(
            "Create a profile with: keenawg config init\n\
             Or pass --url and --login.\n\
             Expected config at: {path}"
        )
    )]
    NoConfig { path: String },

    #[error("Configuration error: {message}")]
    #[diagnostic(code(keenawg::config))]
    Config { message: String },

    // ── Interactive ──────────────────────────────────────────────────

    #[error("Destructive operation '{action}' requires confirmation")]
    #[diagnostic(
        code(keenawg::confirmation_required),
        help("Use --yes (-y) to skip confirmation in non-interactive contexts.")
    )]
    NonInteractiveRequiresYes { action: String },

    // ── IO ───────────────────────────────────────────────────────────

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConnectionFailed { .. } => exit_code::CONNECTION,
            Self::AuthFailed { .. } | Self::NoCredentials { .. } => exit_code::AUTH,
            Self::NotFound { .. } | Self::ProfileNotFound { .. } => exit_code::NOT_FOUND,
            Self::AlreadyExists { .. } => exit_code::CONFLICT,
            Self::Timeout { .. } | Self::Cancelled { .. } => exit_code::TIMEOUT,
            Self::InvalidInput { .. }
            | Self::Validation { .. }
            | Self::Parse { .. }
            | Self::NoConfig { .. }
            | Self::NonInteractiveRequiresYes { .. } => exit_code::USAGE,
            Self::ProvisionIncomplete { cause, .. } => cause.exit_code(),
            _ => exit_code::GENERAL,
        }
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Validation { errors } => CliError::InvalidInput {
                details: errors
                    .iter()
                    .map(|e| format!("- {e}"))
                    .collect::<Vec<_>>()
                    .join("\n"),
            },

            CoreError::Parse(e) => CliError::Parse {
                message: e.to_string(),
            },

            CoreError::RouteSource { origin, reason } => CliError::RouteSource { origin, reason },

            CoreError::Authentication { message } => CliError::AuthFailed { message },

            CoreError::Connection { url, reason } => CliError::ConnectionFailed { url, reason },

            CoreError::RemoteCall {
                step,
                message,
                source,
            } => {
                if source.is_auth_expired() {
                    CliError::AuthFailed {
                        message: "the router ended the session".into(),
                    }
                } else if source.is_not_found() {
                    CliError::NotFound {
                        resource_type: "interface".into(),
                        identifier: message,
                        list_command: "awg list".into(),
                    }
                } else {
                    CliError::Router {
                        step,
                        target: message,
                        detail: source.to_string(),
                    }
                }
            }

            CoreError::Timeout {
                interface,
                cancelled: true,
                ..
            } => CliError::Cancelled { interface },

            CoreError::Timeout {
                interface,
                waited_secs,
                ..
            } => CliError::Timeout {
                interface,
                seconds: waited_secs,
            },

            CoreError::AlreadyExists {
                interface,
                identity,
            } => CliError::AlreadyExists {
                interface,
                identity,
            },

            CoreError::Config { message } => CliError::Config { message },
        }
    }
}

impl From<ProvisionError> for CliError {
    fn from(err: ProvisionError) -> Self {
        let (at, saving) = match &err.state {
            ProvisionState::Failed { at, .. } => {
                (Step::from(*at).to_string(), *at == ProvisionStep::Save)
            }
            other => (other.to_string(), false),
        };
        let cause = CliError::from(err.source);

        // Nothing was created, or the interface is up and only the save
        // failed: the cause alone says it all.
        match err.handle {
            Some(handle) if !saving => CliError::ProvisionIncomplete {
                at,
                interface: handle.id,
                cause: Box::new(cause),
            },
            _ => cause,
        }
    }
}

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::NoCredentials { profile } => CliError::NoCredentials { profile },
            ConfigError::Validation { field, reason } => CliError::Validation { field, reason },
            ConfigError::Io(e) => CliError::Io(e),
            other => CliError::Config {
                message: other.to_string(),
            },
        }
    }
}
