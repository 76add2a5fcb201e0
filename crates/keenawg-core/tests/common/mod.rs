// In-memory `RouterApi` double shared by the core integration tests.

#![allow(dead_code, clippy::unwrap_used)]

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::time::Duration;

use ipnet::IpNet;

use keenawg_api::Error;
use keenawg_core::{
    AdminState, Capability, InterfaceKind, InterfaceStatusReport, InterfaceSummary, PeerConfig,
    RouteRecord, RouterApi,
};

/// One recorded router call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    ListInterfaces,
    Create(String),
    Configure(String),
    Capability(String, bool),
    Admin(String, AdminState),
    Status(String),
    DeleteInterface(String),
    GetRoutes(String),
    AddRoute(String, IpNet),
    DeleteRoute(IpNet),
    Fetch(String),
    Save,
}

/// Scripted router. Status polls pop from `statuses`; once empty, the
/// interface reports "link down".
#[derive(Default)]
pub struct MockRouter {
    pub calls: Mutex<Vec<Call>>,
    pub existing: Vec<InterfaceSummary>,
    pub created_id: String,
    pub statuses: Mutex<VecDeque<Result<InterfaceStatusReport, Error>>>,
    pub routes: Vec<RouteRecord>,
    pub texts: HashMap<String, String>,
    /// Fail the configure step.
    pub fail_configure: bool,
    /// Fail the n-th (0-based) route delete.
    pub fail_delete_at: Option<usize>,
    pub fail_save: bool,
    /// How long each status poll takes to answer.
    pub status_latency: Duration,
}

impl MockRouter {
    pub fn creating(id: &str) -> Self {
        Self {
            created_id: id.to_owned(),
            ..Self::default()
        }
    }

    pub fn with_statuses(
        self,
        statuses: impl IntoIterator<Item = Result<InterfaceStatusReport, Error>>,
    ) -> Self {
        *self.statuses.lock().unwrap() = statuses.into_iter().collect();
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn count(&self, pred: impl Fn(&Call) -> bool) -> usize {
        self.calls().iter().filter(|c| pred(c)).count()
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }
}

pub fn up() -> InterfaceStatusReport {
    InterfaceStatusReport {
        admin_up: true,
        link_up: true,
        connected: true,
    }
}

pub fn down() -> InterfaceStatusReport {
    InterfaceStatusReport {
        admin_up: true,
        link_up: false,
        connected: false,
    }
}

pub fn rejected(message: &str) -> Error {
    Error::Rci {
        status: 200,
        code: Some("7405600".into()),
        message: message.into(),
    }
}

pub fn busy() -> Error {
    Error::Rci {
        status: 503,
        code: None,
        message: "busy".into(),
    }
}

pub const PEER_KEY: &str = "cGVlci1wdWJsaWMta2V5";

pub fn peer_config() -> PeerConfig {
    keenawg_core::parser::parse_peer_config_str(
        &format!(
            "[Interface]\nPrivateKey = cHJpdg==\nAddress = 10.8.0.2/32\nJc = 4\n\
             [Peer]\nPublicKey = {PEER_KEY}\nEndpoint = vpn.example.net:51820\n\
             AllowedIPs = 0.0.0.0/0\n"
        ),
        "wg0.conf",
    )
    .unwrap()
}

impl RouterApi for MockRouter {
    async fn create_interface(&self, _peer: &PeerConfig, name: &str) -> Result<String, Error> {
        self.record(Call::Create(name.to_owned()));
        Ok(self.created_id.clone())
    }

    async fn update_interface_config(
        &self,
        id: &str,
        _peer: &PeerConfig,
        _description: &str,
    ) -> Result<(), Error> {
        self.record(Call::Configure(id.to_owned()));
        if self.fail_configure {
            return Err(rejected("bad asc parameters"));
        }
        Ok(())
    }

    async fn set_capability_flag(
        &self,
        id: &str,
        _capability: Capability,
        enabled: bool,
    ) -> Result<(), Error> {
        self.record(Call::Capability(id.to_owned(), enabled));
        Ok(())
    }

    async fn set_admin_state(&self, id: &str, state: AdminState) -> Result<(), Error> {
        self.record(Call::Admin(id.to_owned(), state));
        Ok(())
    }

    async fn get_interface_status(&self, id: &str) -> Result<InterfaceStatusReport, Error> {
        self.record(Call::Status(id.to_owned()));
        if !self.status_latency.is_zero() {
            tokio::time::sleep(self.status_latency).await;
        }
        self.statuses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Ok(down()))
    }

    async fn list_interfaces(&self, _kind: InterfaceKind) -> Result<Vec<InterfaceSummary>, Error> {
        self.record(Call::ListInterfaces);
        Ok(self.existing.clone())
    }

    async fn delete_interface(&self, id: &str) -> Result<(), Error> {
        self.record(Call::DeleteInterface(id.to_owned()));
        Ok(())
    }

    async fn get_routes(&self, interface_id: &str) -> Result<Vec<RouteRecord>, Error> {
        self.record(Call::GetRoutes(interface_id.to_owned()));
        Ok(self.routes.clone())
    }

    async fn add_route(&self, interface_id: &str, route: &RouteRecord) -> Result<(), Error> {
        self.record(Call::AddRoute(interface_id.to_owned(), route.destination));
        Ok(())
    }

    async fn delete_route(&self, route: &RouteRecord) -> Result<(), Error> {
        let index = self.count(|c| matches!(c, Call::DeleteRoute(_)));
        self.record(Call::DeleteRoute(route.destination));
        if self.fail_delete_at == Some(index) {
            return Err(rejected("route is in use"));
        }
        Ok(())
    }

    async fn fetch_remote_text(&self, url: &str) -> Result<String, Error> {
        self.record(Call::Fetch(url.to_owned()));
        self.texts.get(url).cloned().ok_or_else(|| Error::RemoteFetch {
            url: url.to_owned(),
            status: 404,
        })
    }

    async fn save_configuration(&self) -> Result<(), Error> {
        self.record(Call::Save);
        if self.fail_save {
            return Err(rejected("flash is read-only"));
        }
        Ok(())
    }
}
