// keenawg-api: Async Rust client for the Keenetic RCI control plane

pub mod auth;
pub mod error;
pub mod rci;
pub mod transport;

pub use error::Error;
pub use rci::client::RciClient;
pub use rci::models::{RciInterface, RciRoute, RciWireguard, RciWireguardPeer};
pub use rci::interfaces::{AscParams, WireguardSettings};
pub use transport::{TlsMode, TransportConfig};
