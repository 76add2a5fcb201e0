// ── Router collaborator seam ──
//
// The provisioner and reconciler talk to the router only through this
// trait. `RouterSession` is the production implementation; tests drive the
// core with in-memory doubles.

use std::future::Future;

use keenawg_api::Error;

use crate::model::interface::{
    AdminState, Capability, InterfaceKind, InterfaceStatusReport, InterfaceSummary,
};
use crate::model::peer::PeerConfig;
use crate::model::route::RouteRecord;

/// Remote operations the core needs from a router.
///
/// Each method is a single round trip with no retries. Errors keep the
/// transport classification (`is_transient`, `is_auth_expired`) so callers
/// decide what is retryable.
pub trait RouterApi: Send + Sync {
    /// Import the artifact as a new interface named `name`. Returns its id.
    fn create_interface(
        &self,
        peer: &PeerConfig,
        name: &str,
    ) -> impl Future<Output = Result<String, Error>> + Send;

    /// Push description, address, MTU and obfuscation settings.
    fn update_interface_config(
        &self,
        id: &str,
        peer: &PeerConfig,
        description: &str,
    ) -> impl Future<Output = Result<(), Error>> + Send;

    fn set_capability_flag(
        &self,
        id: &str,
        capability: Capability,
        enabled: bool,
    ) -> impl Future<Output = Result<(), Error>> + Send;

    fn set_admin_state(
        &self,
        id: &str,
        state: AdminState,
    ) -> impl Future<Output = Result<(), Error>> + Send;

    fn get_interface_status(
        &self,
        id: &str,
    ) -> impl Future<Output = Result<InterfaceStatusReport, Error>> + Send;

    fn list_interfaces(
        &self,
        kind: InterfaceKind,
    ) -> impl Future<Output = Result<Vec<InterfaceSummary>, Error>> + Send;

    fn delete_interface(&self, id: &str) -> impl Future<Output = Result<(), Error>> + Send;

    /// Static routes currently bound to `interface_id`.
    fn get_routes(
        &self,
        interface_id: &str,
    ) -> impl Future<Output = Result<Vec<RouteRecord>, Error>> + Send;

    fn add_route(
        &self,
        interface_id: &str,
        route: &RouteRecord,
    ) -> impl Future<Output = Result<(), Error>> + Send;

    /// Delete a route exactly as the router reported it.
    fn delete_route(&self, route: &RouteRecord) -> impl Future<Output = Result<(), Error>> + Send;

    /// GET an absolute URL and return the body as text.
    fn fetch_remote_text(&self, url: &str) -> impl Future<Output = Result<String, Error>> + Send;

    /// Persist the running configuration.
    fn save_configuration(&self) -> impl Future<Output = Result<(), Error>> + Send;
}
