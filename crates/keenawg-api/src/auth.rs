// NDM challenge/response helpers.
//
// Keenetic routers answer an unauthenticated `GET /auth` with 401 and two
// headers: `X-NDM-Realm` and `X-NDM-Challenge`. The login body carries
// `sha256(challenge + md5("login:realm:password"))`, both hex encoded.

use md5::Md5;
use secrecy::{ExposeSecret, SecretString};
use sha2::{Digest, Sha256};

/// Header carrying the authentication realm on a 401 from `/auth`.
pub const REALM_HEADER: &str = "X-NDM-Realm";

/// Header carrying the one-shot challenge on a 401 from `/auth`.
pub const CHALLENGE_HEADER: &str = "X-NDM-Challenge";

/// The realm/challenge pair handed out by the router.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NdmChallenge {
    pub realm: String,
    pub challenge: String,
}

impl NdmChallenge {
    /// Extract the challenge from response headers, if both are present.
    pub fn from_headers(headers: &reqwest::header::HeaderMap) -> Option<Self> {
        let realm = headers.get(REALM_HEADER)?.to_str().ok()?;
        let challenge = headers.get(CHALLENGE_HEADER)?.to_str().ok()?;
        Some(Self {
            realm: realm.to_owned(),
            challenge: challenge.to_owned(),
        })
    }

    /// Compute the hex password digest the router expects for `login`.
    pub fn respond(&self, login: &str, password: &SecretString) -> String {
        let mut md5 = Md5::new();
        md5.update(login.as_bytes());
        md5.update(b":");
        md5.update(self.realm.as_bytes());
        md5.update(b":");
        md5.update(password.expose_secret().as_bytes());
        let inner = hex::encode(md5.finalize());

        let mut sha = Sha256::new();
        sha.update(self.challenge.as_bytes());
        sha.update(inner.as_bytes());
        hex::encode(sha.finalize())
    }
}
