// RCI authentication
//
// Cookie-based session login using the NDM challenge scheme.
// The `/auth` endpoint sets a session cookie in the client's jar;
// subsequent RCI requests use that cookie automatically.

use secrecy::SecretString;
use serde_json::json;
use tracing::debug;

use crate::auth::NdmChallenge;
use crate::error::Error;
use crate::rci::client::RciClient;

impl RciClient {
    /// Authenticate with the router using login/password.
    ///
    /// `GET /auth` first: a 200 means the session cookie is still valid.
    /// On 401 the router hands out a realm and challenge, answered with
    /// `POST /auth`. Any non-2xx answer to the POST is an authentication
    /// failure.
    pub async fn login(&self, login: &str, password: &SecretString) -> Result<(), Error> {
        let url = self.root_url("auth")?;
        debug!("probing session at {}", url);

        let probe = self
            .http()
            .get(url.clone())
            .send()
            .await
            .map_err(Error::Transport)?;

        if probe.status().is_success() {
            debug!("session already authenticated");
            return Ok(());
        }

        if probe.status() != reqwest::StatusCode::UNAUTHORIZED {
            return Err(Error::Authentication {
                message: format!("unexpected HTTP {} from /auth", probe.status()),
            });
        }

        let challenge =
            NdmChallenge::from_headers(probe.headers()).ok_or_else(|| Error::Authentication {
                message: "router did not send X-NDM-Realm / X-NDM-Challenge headers".into(),
            })?;

        debug!(realm = %challenge.realm, "answering NDM challenge");

        let body = json!({
            "login": login,
            "password": challenge.respond(login, password),
        });

        let resp = self
            .http()
            .post(url)
            .json(&body)
            .send()
            .await
            .map_err(Error::Transport)?;

        let status = resp.status();
        if !status.is_success() {
            return Err(Error::Authentication {
                message: format!("login rejected (HTTP {status})"),
            });
        }

        debug!("login successful");
        Ok(())
    }

    /// End the current session.
    ///
    /// `DELETE /auth` drops the session cookie on the router side.
    pub async fn logout(&self) -> Result<(), Error> {
        let url = self.root_url("auth")?;
        debug!("logging out at {}", url);

        let _resp = self
            .http()
            .delete(url)
            .send()
            .await
            .map_err(Error::Transport)?;

        debug!("logout complete");
        Ok(())
    }
}
