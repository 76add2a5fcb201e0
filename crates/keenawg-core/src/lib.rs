//! Provisioning and route reconciliation for Keenetic WireGuard / AmneziaWG
//! interfaces.
//!
//! - **[`Provisioner`]**: takes a parsed `.conf` artifact through create,
//!   configure, global IP, activate and readiness polling. Each step is a
//!   state transition; failures report the step and the interface left
//!   behind.
//!
//! - **[`RouteReconciler`]**: merges routes from batch files and URLs into a
//!   [`RouteSet`] and replaces an interface's static routes with it.
//!
//! - **[`RouterApi`]**: the seam to the router. [`RouterSession`] implements
//!   it over the RCI client in `keenawg-api`.
//!
//! - **Validation and parsing** ([`validate`], [`parser`]): pure functions
//!   gating every entry point.

pub mod config;
mod convert;
pub mod error;
pub mod model;
pub mod parser;
pub mod provision;
pub mod router;
pub mod routes;
pub mod session;
pub mod validate;

// ── Primary re-exports ──────────────────────────────────────────────
pub use config::{ConnectionConfig, ProvisionTimings, RouterEndpoint, TlsVerification};
pub use error::{CoreError, MalformedLine, ParseError, Step};
pub use provision::{ProvisionError, ProvisionState, ProvisionStep, Provisioner};
pub use router::RouterApi;
pub use routes::{ReplaceSummary, RouteReconciler, load_route_files};
pub use session::{RouterSession, router_web_url};
pub use validate::FieldError;

pub use model::{
    AdminState, Capability, InterfaceHandle, InterfaceKind, InterfaceSpec, InterfaceStatus,
    InterfaceStatusReport, InterfaceSummary, PeerConfig, RouteOrigin, RouteRecord, RouteRequest,
    RouteSet, RouteSource,
};

// Re-exported for callers that build their own token.
pub use tokio_util::sync::CancellationToken;
