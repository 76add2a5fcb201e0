// ── Core error types ──
//
// User-facing errors from keenawg-core. Every remote failure carries the
// step it happened in, so callers can tell "import failed" from "bring-up
// failed" without parsing strings. Raw `keenawg_api::Error`s stay reachable
// through `source()` for diagnostics.

use std::fmt;
use std::path::PathBuf;

use strum::Display;
use thiserror::Error;

use crate::validate::FieldError;

/// The remote operation a failure is attributed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum Step {
    #[strum(to_string = "authenticate")]
    Authenticate,
    #[strum(to_string = "look up existing interfaces")]
    ProbeExisting,
    #[strum(to_string = "create interface")]
    CreateInterface,
    #[strum(to_string = "configure interface")]
    ConfigureInterface,
    #[strum(to_string = "enable global IP")]
    EnableCapability,
    #[strum(to_string = "bring interface up")]
    Activate,
    #[strum(to_string = "wait for interface")]
    AwaitReady,
    #[strum(to_string = "save configuration")]
    Save,
    #[strum(to_string = "list interfaces")]
    ListInterfaces,
    #[strum(to_string = "delete interface")]
    DeleteInterface,
    #[strum(to_string = "list routes")]
    ListRoutes,
    #[strum(to_string = "delete route")]
    DeleteRoute,
    #[strum(to_string = "add route")]
    AddRoute,
}

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Input errors ─────────────────────────────────────────────────
    #[error("Invalid input: {}", join_fields(.errors))]
    Validation { errors: Vec<FieldError> },

    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error("Route source {origin} failed: {reason}")]
    RouteSource { origin: String, reason: String },

    // ── Connection errors ────────────────────────────────────────────
    #[error("Authentication failed: {message}")]
    Authentication { message: String },

    #[error("Cannot connect to router at {url}: {reason}")]
    Connection { url: String, reason: String },

    // ── Operation errors ─────────────────────────────────────────────
    #[error("Failed to {step} ({message})")]
    RemoteCall {
        step: Step,
        /// What the step was acting on (interface id, route, URL).
        message: String,
        #[source]
        source: keenawg_api::Error,
    },

    #[error(
        "Interface {interface} was not ready after {waited_secs}s{}",
        cancel_suffix(.cancelled)
    )]
    Timeout {
        interface: String,
        waited_secs: u64,
        cancelled: bool,
    },

    #[error("Interface {interface} already serves peer {identity}")]
    AlreadyExists { interface: String, identity: String },

    // ── Configuration errors ─────────────────────────────────────────
    #[error("Configuration error: {message}")]
    Config { message: String },
}

impl CoreError {
    /// Attribute a router error to a step.
    pub fn remote(step: Step, message: impl Into<String>, source: keenawg_api::Error) -> Self {
        Self::RemoteCall {
            step,
            message: message.into(),
            source,
        }
    }

    /// The step a remote failure happened in, if any.
    pub fn step(&self) -> Option<Step> {
        match self {
            Self::RemoteCall { step, .. } => Some(*step),
            _ => None,
        }
    }

    /// Returns `true` when the router rejected our session.
    pub fn is_auth_failure(&self) -> bool {
        match self {
            Self::Authentication { .. } => true,
            Self::RemoteCall { source, .. } => source.is_auth_expired(),
            _ => false,
        }
    }
}

fn join_fields(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

#[allow(clippy::trivially_copy_pass_by_ref)]
fn cancel_suffix(cancelled: &bool) -> &'static str {
    if *cancelled { " (cancelled)" } else { "" }
}

// ── Session establishment ────────────────────────────────────────────

impl From<keenawg_api::Error> for CoreError {
    /// Classify errors raised while opening a session. Errors from later
    /// steps go through [`CoreError::remote`] instead.
    fn from(err: keenawg_api::Error) -> Self {
        match err {
            keenawg_api::Error::Authentication { message } => Self::Authentication { message },
            keenawg_api::Error::SessionExpired => Self::Authentication {
                message: "router rejected the session".into(),
            },
            keenawg_api::Error::Transport(ref e) if e.is_connect() || e.is_timeout() => {
                Self::Connection {
                    url: e.url().map(ToString::to_string).unwrap_or_default(),
                    reason: e.to_string(),
                }
            }
            keenawg_api::Error::Tls(reason) => Self::Connection {
                url: String::new(),
                reason: format!("TLS error: {reason}"),
            },
            keenawg_api::Error::InvalidUrl(e) => Self::Config {
                message: format!("Invalid router URL: {e}"),
            },
            other => Self::remote(Step::Authenticate, "router session", other),
        }
    }
}

// ── Parse errors ─────────────────────────────────────────────────────

/// Failures of the configuration artifact and batch route parsers.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("Cannot read {}: {reason}", .path.display())]
    NotFound { path: PathBuf, reason: String },

    #[error("Malformed configuration {origin}: {reason}")]
    MalformedArtifact { origin: String, reason: String },

    #[error("{origin}: {} malformed line(s): {}", .lines.len(), join_lines(.lines))]
    MalformedLines {
        origin: String,
        lines: Vec<MalformedLine>,
    },
}

/// One rejected line of a batch route file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MalformedLine {
    /// 1-based line number.
    pub line: usize,
    pub content: String,
    pub reason: String,
}

impl fmt::Display for MalformedLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}: `{}` ({})", self.line, self.content, self.reason)
    }
}

fn join_lines(lines: &[MalformedLine]) -> String {
    lines
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn remote_call_names_the_step() {
        let err = CoreError::remote(
            Step::Activate,
            "Wireguard2",
            keenawg_api::Error::Rci {
                status: 200,
                code: None,
                message: "busy".into(),
            },
        );
        assert_eq!(err.to_string(), "Failed to bring interface up (Wireguard2)");
        assert_eq!(err.step(), Some(Step::Activate));
    }

    #[test]
    fn session_expiry_mid_run_counts_as_auth_failure() {
        let err = CoreError::remote(
            Step::AddRoute,
            "10.0.0.0/8",
            keenawg_api::Error::SessionExpired,
        );
        assert!(err.is_auth_failure());
    }

    #[test]
    fn cancelled_timeout_reads_differently() {
        let err = CoreError::Timeout {
            interface: "Wireguard0".into(),
            waited_secs: 4,
            cancelled: true,
        };
        assert_eq!(
            err.to_string(),
            "Interface Wireguard0 was not ready after 4s (cancelled)"
        );
    }

    #[test]
    fn malformed_lines_list_line_numbers() {
        let err = ParseError::MalformedLines {
            origin: "routes.bat".into(),
            lines: vec![MalformedLine {
                line: 3,
                content: "bad-line".into(),
                reason: "invalid destination".into(),
            }],
        };
        assert_eq!(
            err.to_string(),
            "routes.bat: 1 malformed line(s): line 3: `bad-line` (invalid destination)"
        );
    }
}
