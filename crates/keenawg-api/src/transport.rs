// HTTP clients for talking to a Keenetic router.
//
// Two clients come out of one `TransportConfig`. The router client carries
// the session cookie and honours the configured certificate check, which is
// often relaxed for self-signed KeenDNS or LAN certificates. The fetch
// client downloads public route lists: it always verifies against the
// system roots and never sees the router cookie.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use reqwest::cookie::Jar;

use crate::error::Error;

const USER_AGENT: &str = concat!("keenawg/", env!("CARGO_PKG_VERSION"));

/// How the router's certificate is checked.
#[derive(Debug, Clone, Default)]
pub enum TlsMode {
    /// Use the system certificate store.
    #[default]
    System,
    /// Trust the router's own CA, from a PEM file.
    CustomCa(PathBuf),
    /// Accept any certificate (KeenDNS names behind self-signed proxies).
    DangerAcceptInvalid,
}

#[derive(Debug, Clone)]
pub struct TransportConfig {
    pub tls: TlsMode,
    /// Whole-request timeout.
    pub timeout: Duration,
    /// TCP connect timeout. The router sits on the LAN, so an unreachable
    /// address should fail long before `timeout`.
    pub connect_timeout: Duration,
    /// Holds the RCI session cookie.
    pub cookie_jar: Option<Arc<Jar>>,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            tls: TlsMode::System,
            timeout: Duration::from_secs(30),
            connect_timeout: Duration::from_secs(10),
            cookie_jar: None,
        }
    }
}

impl TransportConfig {
    /// Settings for one router session, with a fresh cookie jar.
    pub fn for_router(tls: TlsMode, timeout: Duration) -> Self {
        Self {
            tls,
            timeout,
            connect_timeout: timeout.min(Duration::from_secs(10)),
            cookie_jar: None,
        }
        .with_cookie_jar()
    }

    /// Create a config with a fresh cookie jar (for session auth).
    pub fn with_cookie_jar(mut self) -> Self {
        self.cookie_jar = Some(Arc::new(Jar::default()));
        self
    }

    /// The client used for `/auth` and `/rci/` calls.
    pub fn build_client(&self) -> Result<reqwest::Client, Error> {
        let mut builder = self.base_builder();

        match &self.tls {
            TlsMode::System => {}
            TlsMode::CustomCa(path) => {
                let cert_pem = std::fs::read(path).map_err(|e| {
                    Error::Tls(format!("failed to read router CA {}: {e}", path.display()))
                })?;
                let cert = reqwest::Certificate::from_pem(&cert_pem)
                    .map_err(|e| Error::Tls(format!("invalid router CA: {e}")))?;
                builder = builder.add_root_certificate(cert);
            }
            TlsMode::DangerAcceptInvalid => {
                builder = builder.danger_accept_invalid_certs(true);
            }
        }

        if let Some(ref jar) = self.cookie_jar {
            builder = builder.cookie_provider(Arc::clone(jar));
        }

        builder
            .build()
            .map_err(|e| Error::Tls(format!("failed to build router client: {e}")))
    }

    /// The client used to download route lists from third-party hosts.
    ///
    /// Ignores `tls` and `cookie_jar`.
    pub fn build_fetch_client(&self) -> Result<reqwest::Client, Error> {
        self.base_builder()
            .build()
            .map_err(|e| Error::Tls(format!("failed to build fetch client: {e}")))
    }

    fn base_builder(&self) -> reqwest::ClientBuilder {
        reqwest::Client::builder()
            .timeout(self.timeout)
            .connect_timeout(self.connect_timeout)
            .user_agent(USER_AGENT)
    }
}
