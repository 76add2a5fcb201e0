// RCI HTTP client
//
// Wraps `reqwest::Client` with Keenetic-specific URL construction and
// status unwrapping. Endpoint groups (interfaces, routes, system) are
// implemented as inherent methods in separate files to keep this module
// focused on transport mechanics.

use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, trace};
use url::Url;

use crate::error::Error;
use crate::transport::TransportConfig;

/// Raw HTTP client for a Keenetic router's RCI interface.
///
/// Reads go through `GET /rci/<path>`; writes are command trees posted to
/// `POST /rci/`. Writes answer HTTP 200 even when a command fails, so every
/// response is scanned for `"status": "error"` entries before the caller
/// sees it.
pub struct RciClient {
    http: reqwest::Client,
    /// Route list downloads; no router cookie, system roots only.
    fetch: reqwest::Client,
    base_url: Url,
}

impl RciClient {
    /// Create a new client from a `TransportConfig`.
    ///
    /// If the config doesn't already include a cookie jar, one is created
    /// automatically (the router session lives in a cookie). The `base_url`
    /// is the router root, e.g. `http://192.168.1.1` or a KeenDNS name.
    pub fn new(base_url: Url, transport: &TransportConfig) -> Result<Self, Error> {
        let config = if transport.cookie_jar.is_some() {
            transport.clone()
        } else {
            transport.clone().with_cookie_jar()
        };
        Ok(Self {
            http: config.build_client()?,
            fetch: config.build_fetch_client()?,
            base_url,
        })
    }

    /// Create a client with a pre-built `reqwest::Client`, used for both
    /// router calls and route list downloads.
    ///
    /// Use this when you already have a client with a session cookie in its
    /// jar, or in tests against a mock server.
    pub fn with_client(http: reqwest::Client, base_url: Url) -> Self {
        Self {
            fetch: http.clone(),
            http,
            base_url,
        }
    }

    /// The underlying HTTP client (for auth flows that need direct access).
    pub fn http(&self) -> &reqwest::Client {
        &self.http
    }

    /// The client for third-party downloads.
    pub(crate) fn fetch_client(&self) -> &reqwest::Client {
        &self.fetch
    }

    /// The router base URL.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    // ── URL builders ─────────────────────────────────────────────────

    /// Build a full URL below the router root: `{base}/{path}`.
    pub(crate) fn root_url(&self, path: &str) -> Result<Url, Error> {
        let base = self.base_url.as_str().trim_end_matches('/');
        let path = path.trim_start_matches('/');
        Ok(Url::parse(&format!("{base}/{path}"))?)
    }

    /// Build an RCI URL: `{base}/rci/{path}`.
    pub(crate) fn rci_url(&self, path: &str) -> Result<Url, Error> {
        self.root_url(&format!("rci/{}", path.trim_start_matches('/')))
    }

    // ── Request helpers ──────────────────────────────────────────────

    /// Send a GET request below `/rci/` and deserialize the body.
    pub(crate) async fn get<T: DeserializeOwned>(&self, url: Url) -> Result<T, Error> {
        debug!("GET {}", url);

        let resp = self.http.get(url).send().await.map_err(Error::Transport)?;
        let body = self.parse_response(resp).await?;
        decode(body)
    }

    /// Post a command tree to `POST /rci/` and return the echoed result tree.
    pub(crate) async fn post(&self, commands: &Value) -> Result<Value, Error> {
        let url = self.rci_url("")?;
        debug!("POST {}", url);
        trace!(%commands, "rci command tree");

        let resp = self
            .http
            .post(url)
            .json(commands)
            .send()
            .await
            .map_err(Error::Transport)?;

        self.parse_response(resp).await
    }

    /// Map HTTP status, then scan the body for RCI error statuses.
    async fn parse_response(&self, resp: reqwest::Response) -> Result<Value, Error> {
        let status = resp.status();

        if status == reqwest::StatusCode::UNAUTHORIZED {
            return Err(Error::SessionExpired);
        }

        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(Error::Rci {
                status: status.as_u16(),
                code: None,
                message: preview(&body).to_owned(),
            });
        }

        let body = resp.text().await.map_err(Error::Transport)?;
        if body.trim().is_empty() {
            return Ok(Value::Null);
        }

        let value: Value = serde_json::from_str(&body).map_err(|e| Error::Deserialization {
            message: format!("{e} (body preview: {:?})", preview(&body)),
            body: body.clone(),
        })?;

        if let Some((code, message)) = find_error_status(&value) {
            return Err(Error::Rci {
                status: status.as_u16(),
                code,
                message,
            });
        }

        Ok(value)
    }
}

/// Deserialize an already-checked RCI body into a typed value.
pub(crate) fn decode<T: DeserializeOwned>(body: Value) -> Result<T, Error> {
    serde_json::from_value(body.clone()).map_err(|e| Error::Deserialization {
        message: e.to_string(),
        body: body.to_string(),
    })
}

/// Depth-first search for the first string value stored under `key`.
pub(crate) fn find_string(value: &Value, key: &str) -> Option<String> {
    match value {
        Value::Object(map) => {
            if let Some(Value::String(s)) = map.get(key) {
                return Some(s.clone());
            }
            map.values().find_map(|v| find_string(v, key))
        }
        Value::Array(items) => items.iter().find_map(|v| find_string(v, key)),
        _ => None,
    }
}

/// Find the first `{"status": "error", "code", "message"}` entry anywhere
/// in an RCI response tree.
fn find_error_status(value: &Value) -> Option<(Option<String>, String)> {
    match value {
        Value::Object(map) => {
            if map.get("status").and_then(Value::as_str) == Some("error") {
                let code = map.get("code").and_then(|c| match c {
                    Value::String(s) => Some(s.clone()),
                    Value::Number(n) => Some(n.to_string()),
                    _ => None,
                });
                let message = map
                    .get("message")
                    .and_then(Value::as_str)
                    .unwrap_or("command failed")
                    .to_owned();
                return Some((code, message));
            }
            map.values().find_map(find_error_status)
        }
        Value::Array(items) => items.iter().find_map(find_error_status),
        _ => None,
    }
}

fn preview(body: &str) -> &str {
    match body.char_indices().nth(200) {
        Some((idx, _)) => &body[..idx],
        None => body,
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::{find_error_status, find_string};

    #[test]
    fn nested_error_status_is_found() {
        let body = json!({
            "interface": {
                "Wireguard3": {
                    "up": {
                        "status": [
                            { "status": "message", "message": "ok" },
                            { "status": "error", "code": "7405600", "message": "unable to find Wireguard3" }
                        ]
                    }
                }
            }
        });

        let (code, message) = find_error_status(&body).expect("error entry present");
        assert_eq!(code.as_deref(), Some("7405600"));
        assert!(message.contains("Wireguard3"));
    }

    #[test]
    fn success_status_is_not_an_error() {
        let body = json!({ "status": [{ "status": "message", "message": "saved" }] });
        assert!(find_error_status(&body).is_none());
    }

    #[test]
    fn created_id_is_found_at_any_depth() {
        let body = json!({ "interface": { "wireguard": { "import": { "created": "Wireguard2" } } } });
        assert_eq!(find_string(&body, "created").as_deref(), Some("Wireguard2"));
    }
}
