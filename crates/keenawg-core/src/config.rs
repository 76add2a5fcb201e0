// ── Runtime connection configuration ──
//
// These types describe *how* to reach a router and how patient the
// provisioner should be. They carry credential data and tuning, but never
// touch disk. The CLI constructs them and hands them in.

use std::time::Duration;

use secrecy::SecretString;

/// Router address and credentials.
///
/// All three fields must be non-empty before any remote call; see
/// [`validate_router_endpoint`](crate::validate::validate_router_endpoint).
#[derive(Debug, Clone)]
pub struct RouterEndpoint {
    /// Router base URL (e.g. `http://192.168.1.1` or a KeenDNS name).
    pub url: String,
    pub login: String,
    pub password: SecretString,
}

impl RouterEndpoint {
    pub fn new(url: impl Into<String>, login: impl Into<String>, password: SecretString) -> Self {
        Self {
            url: url.into(),
            login: login.into(),
            password,
        }
    }
}

/// TLS verification strategy.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum TlsVerification {
    /// System CA store (strict). KeenDNS certificates validate here.
    #[default]
    SystemDefaults,
    /// Custom CA certificate file.
    CustomCa(std::path::PathBuf),
    /// Skip verification (self-signed certs on a LAN address).
    DangerAcceptInvalid,
}

/// Everything needed to open a [`RouterSession`](crate::session::RouterSession).
#[derive(Debug, Clone)]
pub struct ConnectionConfig {
    pub endpoint: RouterEndpoint,
    pub tls: TlsVerification,
    /// Per-request timeout.
    pub timeout: Duration,
}

impl ConnectionConfig {
    pub fn new(endpoint: RouterEndpoint) -> Self {
        Self {
            endpoint,
            tls: TlsVerification::default(),
            timeout: Duration::from_secs(30),
        }
    }
}

/// Timing knobs for the interface provisioner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProvisionTimings {
    /// Quiescence period between interface creation and configuration.
    /// The router needs a moment to register a freshly imported interface.
    pub settle_delay: Duration,
    /// Interval between status polls while waiting for the tunnel.
    pub poll_interval: Duration,
    /// Upper bound on the wait for the tunnel to come up.
    pub ready_timeout: Duration,
}

impl Default for ProvisionTimings {
    fn default() -> Self {
        Self {
            settle_delay: Duration::from_secs(1),
            poll_interval: Duration::from_secs(1),
            ready_timeout: Duration::from_secs(30),
        }
    }
}
