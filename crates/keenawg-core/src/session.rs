// ── Authenticated router session ──
//
// `RouterSession` owns the RCI client and its cookie jar. It is created by
// `connect()`, which validates the endpoint and logs in; afterwards the
// endpoint is never mutated.

use tracing::{debug, info};
use url::Url;

use keenawg_api::{Error, RciClient, TlsMode, TransportConfig};

use crate::config::{ConnectionConfig, RouterEndpoint, TlsVerification};
use crate::convert::{route_from_rci, route_to_rci, wireguard_settings};
use crate::error::CoreError;
use crate::model::interface::{
    AdminState, Capability, InterfaceKind, InterfaceStatusReport, InterfaceSummary,
};
use crate::model::peer::PeerConfig;
use crate::model::route::RouteRecord;
use crate::router::RouterApi;
use crate::validate::{ensure_valid, validate_router_endpoint};

/// Interface class the router reports for WireGuard tunnels.
const WIREGUARD_KIND: &str = "Wireguard";

/// Router web UI page that lists WireGuard connections.
pub fn router_web_url(base: &str) -> String {
    format!("{}/otherConnections", base.trim().trim_end_matches('/'))
}

/// A logged-in session against one router.
pub struct RouterSession {
    client: RciClient,
    endpoint: RouterEndpoint,
}

impl RouterSession {
    /// Validate the endpoint, build the HTTP client and authenticate.
    pub async fn connect(config: ConnectionConfig) -> Result<Self, CoreError> {
        ensure_valid(validate_router_endpoint(&config.endpoint))?;

        let base_url = Url::parse(config.endpoint.url.trim()).map_err(|e| CoreError::Config {
            message: format!("Invalid router URL: {e}"),
        })?;

        let transport =
            TransportConfig::for_router(tls_to_transport(&config.tls), config.timeout);
        let client = RciClient::new(base_url.clone(), &transport)?;

        debug!(url = %base_url, login = %config.endpoint.login, "authenticating");
        client
            .login(&config.endpoint.login, &config.endpoint.password)
            .await?;
        info!(url = %base_url, "connected to router");

        Ok(Self {
            client,
            endpoint: config.endpoint,
        })
    }

    pub fn endpoint(&self) -> &RouterEndpoint {
        &self.endpoint
    }

    /// Link to the router's connection list, for humans.
    pub fn web_url(&self) -> String {
        router_web_url(self.client.base_url().as_str())
    }

    /// End the session on the router side.
    pub async fn close(self) -> Result<(), CoreError> {
        self.client.logout().await?;
        Ok(())
    }
}

fn tls_to_transport(tls: &TlsVerification) -> TlsMode {
    match tls {
        TlsVerification::SystemDefaults => TlsMode::System,
        TlsVerification::CustomCa(path) => TlsMode::CustomCa(path.clone()),
        TlsVerification::DangerAcceptInvalid => TlsMode::DangerAcceptInvalid,
    }
}

fn is_wireguard(summary: &InterfaceSummary) -> bool {
    summary.kind.as_deref() == Some(WIREGUARD_KIND) || summary.id.starts_with(WIREGUARD_KIND)
}

// ── RouterApi over RCI ───────────────────────────────────────────────

impl RouterApi for RouterSession {
    async fn create_interface(&self, peer: &PeerConfig, name: &str) -> Result<String, Error> {
        let filename = peer
            .source_name
            .clone()
            .unwrap_or_else(|| format!("{name}.conf"));
        self.client.import_wireguard(&peer.raw, name, &filename).await
    }

    async fn update_interface_config(
        &self,
        id: &str,
        peer: &PeerConfig,
        description: &str,
    ) -> Result<(), Error> {
        self.client
            .configure_wireguard(id, &wireguard_settings(peer, description))
            .await
    }

    async fn set_capability_flag(
        &self,
        id: &str,
        capability: Capability,
        enabled: bool,
    ) -> Result<(), Error> {
        match capability {
            Capability::GlobalIp => self.client.set_ip_global(id, enabled).await,
        }
    }

    async fn set_admin_state(&self, id: &str, state: AdminState) -> Result<(), Error> {
        self.client
            .set_interface_up(id, state == AdminState::Up)
            .await
    }

    async fn get_interface_status(&self, id: &str) -> Result<InterfaceStatusReport, Error> {
        let iface = self.client.show_interface(id).await?;
        Ok(InterfaceStatusReport::from(&iface))
    }

    async fn list_interfaces(&self, kind: InterfaceKind) -> Result<Vec<InterfaceSummary>, Error> {
        let summaries = self
            .client
            .list_interfaces()
            .await?
            .into_iter()
            .map(InterfaceSummary::from);
        Ok(match kind {
            InterfaceKind::Wireguard => summaries.filter(is_wireguard).collect(),
            InterfaceKind::Any => summaries.collect(),
        })
    }

    async fn delete_interface(&self, id: &str) -> Result<(), Error> {
        self.client.delete_interface(id).await
    }

    async fn get_routes(&self, interface_id: &str) -> Result<Vec<RouteRecord>, Error> {
        Ok(self
            .client
            .list_interface_routes(interface_id)
            .await?
            .into_iter()
            .filter_map(route_from_rci)
            .collect())
    }

    async fn add_route(&self, interface_id: &str, route: &RouteRecord) -> Result<(), Error> {
        let rci = route_to_rci(route, Some(interface_id))?;
        self.client.add_route(&rci).await
    }

    async fn delete_route(&self, route: &RouteRecord) -> Result<(), Error> {
        let rci = route_to_rci(route, route.interface.as_deref())?;
        self.client.delete_route(&rci).await
    }

    async fn fetch_remote_text(&self, url: &str) -> Result<String, Error> {
        self.client.fetch_text(url).await
    }

    async fn save_configuration(&self) -> Result<(), Error> {
        self.client.save_configuration().await
    }
}
