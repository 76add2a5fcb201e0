// RCI static route endpoints
//
// `ip route` entries configured by the user (not the kernel table).

use serde_json::{Value, json};
use tracing::debug;

use crate::error::Error;
use crate::rci::client::{RciClient, decode};
use crate::rci::models::RciRoute;

impl RciClient {
    /// List all user-configured static routes.
    ///
    /// `GET /rci/ip/route`
    pub async fn list_routes(&self) -> Result<Vec<RciRoute>, Error> {
        let url = self.rci_url("ip/route")?;
        debug!("listing static routes");
        let body: Value = self.get(url).await?;
        match body {
            Value::Null => Ok(Vec::new()),
            Value::Array(_) => decode(body),
            // A single route comes back as a bare object on some firmware.
            Value::Object(ref map) if map.is_empty() => Ok(Vec::new()),
            Value::Object(_) => Ok(vec![decode(body)?]),
            other => Err(Error::Deserialization {
                message: "unexpected ip/route payload".into(),
                body: other.to_string(),
            }),
        }
    }

    /// List static routes bound to one interface.
    pub async fn list_interface_routes(&self, interface: &str) -> Result<Vec<RciRoute>, Error> {
        Ok(self
            .list_routes()
            .await?
            .into_iter()
            .filter(|r| r.interface.as_deref() == Some(interface))
            .collect())
    }

    /// Add a static route.
    pub async fn add_route(&self, route: &RciRoute) -> Result<(), Error> {
        debug!(?route, "adding route");
        self.post(&json!({ "ip": { "route": route } })).await?;
        Ok(())
    }

    /// Delete a static route. The route is identified by its destination
    /// plus interface/gateway, exactly as listed.
    pub async fn delete_route(&self, route: &RciRoute) -> Result<(), Error> {
        debug!(?route, "deleting route");
        let mut body = serde_json::to_value(route).map_err(|e| Error::Deserialization {
            message: e.to_string(),
            body: String::new(),
        })?;
        if let Value::Object(ref mut map) = body {
            map.remove("auto");
            map.remove("comment");
            map.insert("no".into(), Value::Bool(true));
        }
        self.post(&json!({ "ip": { "route": body } })).await?;
        Ok(())
    }
}
