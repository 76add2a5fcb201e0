// ── Peer configuration artifact ──
//
// Structured view of a WireGuard / AmneziaWG `.conf` file. The raw text is
// kept alongside the parsed fields: the router import receives exactly the
// file the user gave, the parsed fields drive validation and follow-up
// configuration.

use serde::Serialize;

/// A parsed `.conf` artifact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PeerConfig {
    /// File name the artifact was read from (`office.conf`), if any.
    pub source_name: Option<String>,
    pub interface: InterfaceSection,
    /// The first `[Peer]` section. Only this peer is provisioned.
    pub peer: PeerSection,
    /// Any further `[Peer]` sections, kept for the router import.
    pub additional_peers: Vec<PeerSection>,
    /// Unrecognised keys in source order.
    pub passthrough: Vec<PassthroughEntry>,
    #[serde(skip)]
    pub raw: String,
}

impl PeerConfig {
    /// Identity of the remote tunnel: the peer public key.
    pub fn identity(&self) -> &str {
        &self.peer.public_key
    }
}

/// `[Interface]` section.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct InterfaceSection {
    #[serde(skip)]
    pub private_key: String,
    /// Local tunnel addresses (`10.8.0.2/32`), in declaration order.
    pub addresses: Vec<String>,
    pub dns: Vec<String>,
    pub mtu: Option<u16>,
    pub listen_port: Option<u16>,
    pub obfuscation: Option<Obfuscation>,
}

/// AmneziaWG junk-packet and header obfuscation parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Obfuscation {
    pub jc: u32,
    pub jmin: u32,
    pub jmax: u32,
    pub s1: u32,
    pub s2: u32,
    pub h1: u32,
    pub h2: u32,
    pub h3: u32,
    pub h4: u32,
}

impl Default for Obfuscation {
    /// Plain WireGuard behaviour: no junk packets, stock message types.
    fn default() -> Self {
        Self {
            jc: 0,
            jmin: 0,
            jmax: 0,
            s1: 0,
            s2: 0,
            h1: 1,
            h2: 2,
            h3: 3,
            h4: 4,
        }
    }
}

/// `[Peer]` section.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PeerSection {
    pub public_key: String,
    #[serde(skip)]
    pub preshared_key: Option<String>,
    /// `host:port` of the remote server.
    pub endpoint: String,
    pub allowed_ips: Vec<String>,
    pub persistent_keepalive: Option<u16>,
}

/// A key the parser does not interpret.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PassthroughEntry {
    pub section: String,
    pub key: String,
    pub value: String,
}
