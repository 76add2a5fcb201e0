// RCI response models
//
// Field names follow the router's kebab-case JSON. Keenetic firmware adds
// fields between releases, so unknown keys are ignored and most fields are
// optional.

use serde::{Deserialize, Serialize};

/// One entry of `show interface`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct RciInterface {
    #[serde(default)]
    pub id: String,

    #[serde(default)]
    pub index: Option<u32>,

    /// Interface class, e.g. `Wireguard`, `GigabitEthernet`.
    #[serde(rename = "type", default)]
    pub kind: Option<String>,

    #[serde(default)]
    pub description: Option<String>,

    #[serde(default)]
    pub interface_name: Option<String>,

    /// Link state: `up` / `down`.
    #[serde(default)]
    pub link: Option<String>,

    /// `yes` once the tunnel has a working peer.
    #[serde(default)]
    pub connected: Option<String>,

    /// Administrative state: `up` / `down`.
    #[serde(default)]
    pub state: Option<String>,

    #[serde(default)]
    pub address: Option<String>,

    #[serde(default)]
    pub mask: Option<String>,

    #[serde(default)]
    pub global: Option<bool>,

    #[serde(default)]
    pub wireguard: Option<RciWireguard>,
}

impl RciInterface {
    pub fn is_link_up(&self) -> bool {
        self.link.as_deref() == Some("up")
    }

    pub fn is_connected(&self) -> bool {
        self.connected.as_deref() == Some("yes")
    }
}

/// WireGuard details nested in `show interface` for `Wireguard*` entries.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct RciWireguard {
    #[serde(default)]
    pub public_key: Option<String>,

    #[serde(default)]
    pub listen_port: Option<u16>,

    #[serde(default)]
    pub peer: Vec<RciWireguardPeer>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct RciWireguardPeer {
    pub public_key: String,

    #[serde(default)]
    pub remote: Option<String>,

    #[serde(default)]
    pub remote_port: Option<u16>,

    #[serde(default)]
    pub online: Option<bool>,
}

/// One entry of `ip route` (the user-configured static route table).
///
/// Either `network` + `mask` or `host` is set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct RciRoute {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub network: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mask: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gateway: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interface: Option<String>,

    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub auto: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}
