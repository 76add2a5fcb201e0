// ── Domain model ──

pub mod interface;
pub mod peer;
pub mod route;

pub use interface::{
    AdminState, Capability, InterfaceHandle, InterfaceKind, InterfaceSpec, InterfaceStatus,
    InterfaceStatusReport, InterfaceSummary,
};
pub use peer::{InterfaceSection, Obfuscation, PassthroughEntry, PeerConfig, PeerSection};
pub use route::{RouteOrigin, RouteRecord, RouteRequest, RouteSet, RouteSource};
