// RCI interface endpoints
//
// Listing, WireGuard import/configuration, capability flags, and
// administrative state for router interfaces.

use std::collections::BTreeMap;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::Serialize;
use serde_json::{Value, json};
use tracing::debug;

use crate::error::Error;
use crate::rci::client::{RciClient, decode, find_string};
use crate::rci::models::RciInterface;

/// AmneziaWG obfuscation parameters (`wireguard asc`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AscParams {
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

/// Settings pushed onto an imported WireGuard interface.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WireguardSettings {
    pub description: Option<String>,
    pub address: Option<String>,
    pub mask: Option<String>,
    pub mtu: Option<u16>,
    pub asc: Option<AscParams>,
}

impl WireguardSettings {
    /// Render the per-interface command body.
    fn to_command(&self) -> Value {
        let mut body = serde_json::Map::new();

        if let Some(ref description) = self.description {
            body.insert("description".into(), json!(description));
        }

        let mut ip = serde_json::Map::new();
        if let (Some(address), Some(mask)) = (&self.address, &self.mask) {
            ip.insert("address".into(), json!({ "address": address, "mask": mask }));
        }
        if let Some(mtu) = self.mtu {
            ip.insert("mtu".into(), json!(mtu));
        }
        if !ip.is_empty() {
            body.insert("ip".into(), Value::Object(ip));
        }

        if let Some(ref asc) = self.asc {
            body.insert(
                "wireguard".into(),
                json!({
                    "asc": {
                        "jc": asc.jc.to_string(),
                        "jmin": asc.jmin.to_string(),
                        "jmax": asc.jmax.to_string(),
                        "s1": asc.s1.to_string(),
                        "s2": asc.s2.to_string(),
                        "h1": asc.h1.to_string(),
                        "h2": asc.h2.to_string(),
                        "h3": asc.h3.to_string(),
                        "h4": asc.h4.to_string(),
                    }
                }),
            );
        }

        Value::Object(body)
    }
}

impl RciClient {
    /// List every interface on the router.
    ///
    /// `GET /rci/show/interface` returns a map keyed by interface id.
    pub async fn list_interfaces(&self) -> Result<Vec<RciInterface>, Error> {
        let url = self.rci_url("show/interface")?;
        debug!("listing interfaces");
        let map: BTreeMap<String, RciInterface> = self.get(url).await?;
        Ok(map
            .into_iter()
            .map(|(key, mut iface)| {
                if iface.id.is_empty() {
                    iface.id = key;
                }
                iface
            })
            .collect())
    }

    /// Show a single interface.
    ///
    /// `GET /rci/show/interface?name={id}`
    pub async fn show_interface(&self, id: &str) -> Result<RciInterface, Error> {
        let mut url = self.rci_url("show/interface")?;
        url.query_pairs_mut().append_pair("name", id);
        debug!(id, "showing interface");
        let body: Value = self.get(url).await?;
        if body.is_null() || body.as_object().is_some_and(serde_json::Map::is_empty) {
            return Err(Error::Rci {
                status: 404,
                code: None,
                message: format!("interface {id} not found"),
            });
        }
        let mut iface: RciInterface = decode(body)?;
        if iface.id.is_empty() {
            id.clone_into(&mut iface.id);
        }
        Ok(iface)
    }

    /// Import a WireGuard configuration file as a new interface.
    ///
    /// `interface wireguard import` with the file content base64 encoded.
    /// Returns the router-assigned id (e.g. `Wireguard2`).
    pub async fn import_wireguard(
        &self,
        conf: &str,
        name: &str,
        filename: &str,
    ) -> Result<String, Error> {
        debug!(name, filename, "importing wireguard config");
        let result = self
            .post(&json!({
                "interface": {
                    "wireguard": {
                        "import": STANDARD.encode(conf.as_bytes()),
                        "name": name,
                        "filename": filename,
                    }
                }
            }))
            .await?;

        find_string(&result, "created").ok_or_else(|| Error::Deserialization {
            message: "import response did not name the created interface".into(),
            body: result.to_string(),
        })
    }

    /// Push description, address, MTU, and obfuscation settings.
    pub async fn configure_wireguard(
        &self,
        id: &str,
        settings: &WireguardSettings,
    ) -> Result<(), Error> {
        debug!(id, "configuring wireguard interface");
        self.post(&json!({ "interface": { id: settings.to_command() } }))
            .await?;
        Ok(())
    }

    /// Toggle `ip global` so the interface can carry internet traffic.
    pub async fn set_ip_global(&self, id: &str, enabled: bool) -> Result<(), Error> {
        debug!(id, enabled, "setting ip global");
        let global = if enabled {
            json!({ "auto": true })
        } else {
            json!({ "no": true })
        };
        self.post(&json!({ "interface": { id: { "ip": { "global": global } } } }))
            .await?;
        Ok(())
    }

    /// Administrative up/down.
    pub async fn set_interface_up(&self, id: &str, up: bool) -> Result<(), Error> {
        debug!(id, up, "setting admin state");
        let state = if up { "up" } else { "down" };
        self.post(&json!({ "interface": { id: { state: true } } }))
            .await?;
        Ok(())
    }

    /// Remove an interface.
    pub async fn delete_interface(&self, id: &str) -> Result<(), Error> {
        debug!(id, "deleting interface");
        self.post(&json!({ "interface": { "no": true, "name": id } }))
            .await?;
        Ok(())
    }
}
