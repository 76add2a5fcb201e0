// ── Input parsers ──
//
// Both parsers are pure: they read text (and, for artifacts, one file) and
// never talk to the router.

pub mod batch;
pub mod peer;

pub use batch::{BatchParse, parse_batch_routes};
pub use peer::{parse_peer_config, parse_peer_config_str};
