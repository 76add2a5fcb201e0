// ── Interface domain types ──

use std::path::{Path, PathBuf};

use serde::Serialize;
use strum::Display;

/// Fallback display name when the artifact path has no usable stem.
const DEFAULT_NAME: &str = "wireguard";

/// What the user asked to provision.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InterfaceSpec {
    pub display_name: Option<String>,
    pub path: PathBuf,
}

impl InterfaceSpec {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            display_name: None,
            path: path.into(),
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.display_name = Some(name.into());
        self
    }

    /// The name shown on the router: the explicit display name, else the
    /// artifact's file stem.
    pub fn effective_name(&self) -> String {
        self.display_name
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map_or_else(|| file_stem(&self.path), ToOwned::to_owned)
    }
}

fn file_stem(path: &Path) -> String {
    path.file_stem()
        .and_then(|stem| stem.to_str())
        .filter(|stem| !stem.is_empty())
        .unwrap_or(DEFAULT_NAME)
        .to_owned()
}

/// A router interface created by the provisioner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InterfaceHandle {
    /// Router-assigned id (`Wireguard0`).
    pub id: String,
    pub status: InterfaceStatus,
}

impl InterfaceHandle {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            status: InterfaceStatus::Created,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum InterfaceStatus {
    Created,
    Configured,
    Activating,
    Up,
    Failed,
}

/// Interface families the router can list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum InterfaceKind {
    Wireguard,
    Any,
}

/// Router capability toggles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum Capability {
    /// `ip global`: the interface may carry internet traffic.
    #[strum(to_string = "global IP")]
    GlobalIp,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "lowercase")]
pub enum AdminState {
    Up,
    Down,
}

/// Live status of one interface.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct InterfaceStatusReport {
    /// Administrative state is up.
    pub admin_up: bool,
    pub link_up: bool,
    /// The tunnel has a live peer.
    pub connected: bool,
}

impl InterfaceStatusReport {
    /// Link up and connected.
    pub fn is_operational(&self) -> bool {
        self.link_up && self.connected
    }
}

/// Listing row for an interface.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InterfaceSummary {
    pub id: String,
    pub description: Option<String>,
    pub kind: Option<String>,
    pub status: InterfaceStatusReport,
    /// Public keys of the configured peers.
    pub peer_keys: Vec<String>,
    /// `host:port` of the first peer, if the router reports one.
    pub endpoint: Option<String>,
}
