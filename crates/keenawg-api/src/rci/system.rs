// RCI system endpoints
//
// Configuration persistence and generic remote text fetches.

use serde_json::json;
use tracing::debug;
use url::Url;

use crate::error::Error;
use crate::rci::client::RciClient;

impl RciClient {
    /// Persist the running configuration to flash.
    ///
    /// `system configuration save`
    pub async fn save_configuration(&self) -> Result<(), Error> {
        debug!("saving router configuration");
        self.post(&json!({ "system": { "configuration": { "save": {} } } }))
            .await?;
        Ok(())
    }

    /// Fetch a text resource from an arbitrary absolute URL.
    ///
    /// Goes through the fetch client: same timeouts as the session, but
    /// system certificate checks and no router cookie.
    pub async fn fetch_text(&self, url: &str) -> Result<String, Error> {
        let parsed = Url::parse(url)?;
        debug!(%parsed, "fetching remote text");

        let resp = self
            .fetch_client()
            .get(parsed)
            .send()
            .await
            .map_err(Error::Transport)?;

        if !resp.status().is_success() {
            return Err(Error::RemoteFetch {
                url: url.to_owned(),
                status: resp.status().as_u16(),
            });
        }

        resp.text().await.map_err(Error::Transport)
    }
}
