// ── WireGuard / AmneziaWG `.conf` parser ──
//
// INI-style: `[Interface]` and `[Peer]` sections, `Key = Value` lines,
// `#`/`;` comments. Keys are case-insensitive. Structural problems (a line
// without `=`, a key outside any section, a non-numeric number) stop the
// parse at that line. Missing mandatory keys are collected and reported
// together.

use std::path::Path;
use std::str::FromStr;

use crate::error::ParseError;
use crate::model::peer::{
    InterfaceSection, Obfuscation, PassthroughEntry, PeerConfig, PeerSection,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    Interface,
    Peer,
}

impl Section {
    fn name(self) -> &'static str {
        match self {
            Self::Interface => "Interface",
            Self::Peer => "Peer",
        }
    }
}

/// Partially-read `[Peer]` section; mandatory keys are checked at the end.
#[derive(Debug, Default)]
struct PendingPeer {
    public_key: Option<String>,
    preshared_key: Option<String>,
    endpoint: Option<String>,
    allowed_ips: Option<Vec<String>>,
    persistent_keepalive: Option<u16>,
}

/// Read and parse a configuration artifact from disk.
pub fn parse_peer_config(path: &Path) -> Result<PeerConfig, ParseError> {
    let text = std::fs::read_to_string(path).map_err(|e| ParseError::NotFound {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;
    let mut config = parse_peer_config_str(&text, &path.display().to_string())?;
    config.source_name = path
        .file_name()
        .and_then(|name| name.to_str())
        .map(ToOwned::to_owned);
    Ok(config)
}

/// Parse artifact text. `origin` names the artifact in error messages.
pub fn parse_peer_config_str(text: &str, origin: &str) -> Result<PeerConfig, ParseError> {
    let malformed = |reason: String| ParseError::MalformedArtifact {
        origin: origin.to_owned(),
        reason,
    };

    let mut section: Option<Section> = None;
    let mut interface = InterfaceSection::default();
    let mut private_key: Option<String> = None;
    let mut peers: Vec<PendingPeer> = Vec::new();
    let mut passthrough = Vec::new();

    for (idx, raw) in text.lines().enumerate() {
        let line_no = idx + 1;
        let line = raw.trim().trim_start_matches('\u{feff}');
        if line.is_empty() || line.starts_with('#') || line.starts_with(';') {
            continue;
        }

        if let Some(header) = line.strip_prefix('[').and_then(|l| l.strip_suffix(']')) {
            section = match header.trim().to_ascii_lowercase().as_str() {
                "interface" => Some(Section::Interface),
                "peer" => {
                    peers.push(PendingPeer::default());
                    Some(Section::Peer)
                }
                other => {
                    return Err(malformed(format!("line {line_no}: unknown section [{other}]")));
                }
            };
            continue;
        }

        let Some((key, value)) = line.split_once('=') else {
            return Err(malformed(format!("line {line_no}: expected `Key = Value`")));
        };
        let key = key.trim();
        let value = value.trim();
        let Some(current) = section else {
            return Err(malformed(format!(
                "line {line_no}: `{key}` appears outside any section"
            )));
        };

        let consumed = match current {
            Section::Interface => {
                read_interface_key(&mut interface, &mut private_key, key, value, line_no)
            }
            Section::Peer => match peers.last_mut() {
                Some(peer) => read_peer_key(peer, key, value, line_no),
                None => Ok(false),
            },
        }
        .map_err(malformed)?;

        if !consumed {
            passthrough.push(PassthroughEntry {
                section: current.name().to_owned(),
                key: key.to_owned(),
                value: value.to_owned(),
            });
        }
    }

    let mut missing = Vec::new();
    match private_key {
        Some(key) => interface.private_key = key,
        None => missing.push("PrivateKey in [Interface]"),
    }
    if interface.addresses.is_empty() {
        missing.push("Address in [Interface]");
    }

    let mut peers = peers.into_iter();
    let Some(first) = peers.next() else {
        return Err(malformed("no [Peer] section".into()));
    };
    if first.public_key.is_none() {
        missing.push("PublicKey in [Peer]");
    }
    if first.endpoint.is_none() {
        missing.push("Endpoint in [Peer]");
    }
    if first.allowed_ips.is_none() {
        missing.push("AllowedIPs in [Peer]");
    }
    if !missing.is_empty() {
        return Err(malformed(format!("missing {}", missing.join(", "))));
    }

    Ok(PeerConfig {
        source_name: None,
        interface,
        peer: finish_peer(first),
        additional_peers: peers.map(finish_peer).collect(),
        passthrough,
        raw: text.to_owned(),
    })
}

fn finish_peer(peer: PendingPeer) -> PeerSection {
    PeerSection {
        public_key: peer.public_key.unwrap_or_default(),
        preshared_key: peer.preshared_key,
        endpoint: peer.endpoint.unwrap_or_default(),
        allowed_ips: peer.allowed_ips.unwrap_or_default(),
        persistent_keepalive: peer.persistent_keepalive,
    }
}

/// Returns `Ok(false)` for keys that belong in the passthrough list.
fn read_interface_key(
    interface: &mut InterfaceSection,
    private_key: &mut Option<String>,
    key: &str,
    value: &str,
    line_no: usize,
) -> Result<bool, String> {
    match key.to_ascii_lowercase().as_str() {
        "privatekey" => *private_key = Some(value.to_owned()),
        "address" => interface.addresses.extend(split_list(value)),
        "dns" => interface.dns.extend(split_list(value)),
        "mtu" => interface.mtu = Some(number(key, value, line_no)?),
        "listenport" => interface.listen_port = Some(number(key, value, line_no)?),
        awg @ ("jc" | "jmin" | "jmax" | "s1" | "s2" | "h1" | "h2" | "h3" | "h4") => {
            let n: u32 = number(key, value, line_no)?;
            let params = interface
                .obfuscation
                .get_or_insert_with(Obfuscation::default);
            let slot = match awg {
                "jc" => &mut params.jc,
                "jmin" => &mut params.jmin,
                "jmax" => &mut params.jmax,
                "s1" => &mut params.s1,
                "s2" => &mut params.s2,
                "h1" => &mut params.h1,
                "h2" => &mut params.h2,
                "h3" => &mut params.h3,
                _ => &mut params.h4,
            };
            *slot = n;
        }
        _ => return Ok(false),
    }
    Ok(true)
}

fn read_peer_key(
    peer: &mut PendingPeer,
    key: &str,
    value: &str,
    line_no: usize,
) -> Result<bool, String> {
    match key.to_ascii_lowercase().as_str() {
        "publickey" => peer.public_key = Some(value.to_owned()),
        "presharedkey" => peer.preshared_key = Some(value.to_owned()),
        "endpoint" => peer.endpoint = Some(value.to_owned()),
        "allowedips" => peer
            .allowed_ips
            .get_or_insert_with(Vec::new)
            .extend(split_list(value)),
        "persistentkeepalive" => peer.persistent_keepalive = Some(number(key, value, line_no)?),
        _ => return Ok(false),
    }
    Ok(true)
}

fn split_list(value: &str) -> impl Iterator<Item = String> + '_ {
    value
        .split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(ToOwned::to_owned)
}

fn number<T: FromStr>(key: &str, value: &str, line_no: usize) -> Result<T, String> {
    value
        .parse()
        .map_err(|_| format!("line {line_no}: {key} must be a number, got `{value}`"))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::io::Write;

    use pretty_assertions::assert_eq;

    use super::*;

    const AWG_CONF: &str = "\
[Interface]
PrivateKey = cHJpdmF0ZQ==
Address = 10.8.0.2/32, fd00::2/128
DNS = 1.1.1.1
MTU = 1280
Jc = 4
Jmin = 40
Jmax = 70
S1 = 15
H1 = 1186977
PostUp = iptables -A FORWARD

# home server
[Peer]
PublicKey = cGVlcg==
PresharedKey = c2hhcmVk
Endpoint = vpn.example.net:51820
AllowedIPs = 0.0.0.0/0, ::/0
PersistentKeepalive = 25
";

    #[test]
    fn parses_awg_artifact() {
        let config = parse_peer_config_str(AWG_CONF, "office.conf").unwrap();

        assert_eq!(config.identity(), "cGVlcg==");
        assert_eq!(config.interface.private_key, "cHJpdmF0ZQ==");
        assert_eq!(config.interface.addresses, ["10.8.0.2/32", "fd00::2/128"]);
        assert_eq!(config.interface.mtu, Some(1280));
        assert_eq!(config.peer.endpoint, "vpn.example.net:51820");
        assert_eq!(config.peer.allowed_ips, ["0.0.0.0/0", "::/0"]);
        assert_eq!(config.peer.persistent_keepalive, Some(25));
        assert_eq!(config.raw, AWG_CONF);

        let asc = config.interface.obfuscation.unwrap();
        assert_eq!((asc.jc, asc.jmin, asc.jmax, asc.s1), (4, 40, 70, 15));
        assert_eq!((asc.s2, asc.h1, asc.h2), (0, 1_186_977, 2));
    }

    #[test]
    fn unknown_keys_are_kept_in_order() {
        let config = parse_peer_config_str(AWG_CONF, "office.conf").unwrap();
        assert_eq!(
            config.passthrough,
            vec![PassthroughEntry {
                section: "Interface".into(),
                key: "PostUp".into(),
                value: "iptables -A FORWARD".into(),
            }]
        );
    }

    #[test]
    fn plain_wireguard_has_no_obfuscation() {
        let text = "[Interface]\nPrivateKey = a\nAddress = 10.0.0.2/32\n\
                    [Peer]\nPublicKey = b\nEndpoint = h:1\nAllowedIPs = 0.0.0.0/0\n";
        let config = parse_peer_config_str(text, "wg.conf").unwrap();
        assert!(config.interface.obfuscation.is_none());
        assert!(config.additional_peers.is_empty());
    }

    #[test]
    fn missing_keys_are_reported_together() {
        let text = "[Interface]\nAddress = 10.0.0.2/32\n[Peer]\nEndpoint = h:1\n";
        let err = parse_peer_config_str(text, "broken.conf").unwrap_err();
        assert_eq!(
            err,
            ParseError::MalformedArtifact {
                origin: "broken.conf".into(),
                reason: "missing PrivateKey in [Interface], PublicKey in [Peer], \
                         AllowedIPs in [Peer]"
                    .into(),
            }
        );
    }

    #[test]
    fn artifact_without_peer_is_rejected() {
        let err = parse_peer_config_str("[Interface]\nPrivateKey = a\n", "x.conf").unwrap_err();
        assert!(err.to_string().contains("no [Peer] section"), "got: {err}");
    }

    #[test]
    fn structural_errors_name_the_line() {
        let err = parse_peer_config_str("[Interface]\nMTU = big\n", "x.conf").unwrap_err();
        assert!(err.to_string().contains("line 2: MTU must be a number"), "got: {err}");

        let err = parse_peer_config_str("PrivateKey = a\n", "x.conf").unwrap_err();
        assert!(err.to_string().contains("outside any section"), "got: {err}");
    }

    #[test]
    fn reads_from_disk_and_records_file_name() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("wg0.conf");
        std::fs::File::create(&path)
            .unwrap()
            .write_all(AWG_CONF.as_bytes())
            .unwrap();

        let config = parse_peer_config(&path).unwrap();
        assert_eq!(config.source_name.as_deref(), Some("wg0.conf"));
    }

    #[test]
    fn missing_file_is_not_found() {
        let err = parse_peer_config(Path::new("/nonexistent/wg0.conf")).unwrap_err();
        assert!(matches!(err, ParseError::NotFound { .. }));
    }
}
