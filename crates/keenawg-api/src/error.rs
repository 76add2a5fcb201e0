use thiserror::Error;

/// Top-level error type for the `keenawg-api` crate.
///
/// Covers every failure mode of the router control plane:
/// authentication, transport, RCI command status, and remote text fetches.
/// `keenawg-core` maps these into user-facing diagnostics.
#[derive(Debug, Error)]
pub enum Error {
    // ── Authentication ──────────────────────────────────────────────
    /// Login failed (wrong credentials, missing challenge headers, etc.)
    #[error("Authentication failed: {message}")]
    Authentication { message: String },

    /// Session cookie expired or was revoked mid-run.
    #[error("Session expired -- re-authentication required")]
    SessionExpired,

    // ── Transport ───────────────────────────────────────────────────
    /// HTTP transport error (connection refused, DNS failure, etc.)
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// TLS setup or certificate error.
    #[error("TLS error: {0}")]
    Tls(String),

    // ── RCI ─────────────────────────────────────────────────────────
    /// The router rejected a command, either with a non-2xx status or an
    /// `"status": "error"` entry inside a 200 response.
    #[error("Router error (HTTP {status}): {message}")]
    Rci {
        status: u16,
        code: Option<String>,
        message: String,
    },

    // ── Remote resources ────────────────────────────────────────────
    /// Fetching a remote text resource (e.g. a route list) failed.
    #[error("Fetching {url} failed with HTTP {status}")]
    RemoteFetch { url: String, status: u16 },

    // ── Data ────────────────────────────────────────────────────────
    /// JSON deserialization failed, with the raw body for debugging.
    #[error("Deserialization error: {message}")]
    Deserialization { message: String, body: String },
}

impl Error {
    /// Returns `true` if this error indicates auth has expired
    /// and re-authentication might resolve it.
    pub fn is_auth_expired(&self) -> bool {
        matches!(self, Self::Authentication { .. } | Self::SessionExpired)
    }

    /// Returns `true` if this is a transient error worth retrying.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Transport(e) => e.is_timeout() || e.is_connect(),
            Self::Rci { status, .. } => *status >= 500,
            _ => false,
        }
    }

    /// Returns `true` if this is a "not found" error.
    pub fn is_not_found(&self) -> bool {
        match self {
            Self::Transport(e) => e.status() == Some(reqwest::StatusCode::NOT_FOUND),
            Self::Rci { status: 404, .. } | Self::RemoteFetch { status: 404, .. } => true,
            _ => false,
        }
    }

    /// Extract the RCI error code, if available.
    pub fn rci_error_code(&self) -> Option<&str> {
        match self {
            Self::Rci { code, .. } => code.as_deref(),
            _ => None,
        }
    }
}
