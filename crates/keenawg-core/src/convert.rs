// ── API-to-domain type conversions ──
//
// Bridges raw `keenawg_api` RCI types and the core domain model. Router
// strings are parsed into strong types here; entries the router reports in
// a shape we cannot represent are dropped with a log line. Dropped routes
// are invisible to the route reconciler, so those are logged as warnings.

use std::net::{IpAddr, Ipv4Addr};

use ipnet::{IpNet, Ipv4Net};
use tracing::warn;

use keenawg_api::{AscParams, Error, RciInterface, RciRoute, WireguardSettings};

use crate::model::interface::{InterfaceStatusReport, InterfaceSummary};
use crate::model::peer::{Obfuscation, PeerConfig};
use crate::model::route::{RouteOrigin, RouteRecord};

// ── Interfaces ─────────────────────────────────────────────────────

impl From<&RciInterface> for InterfaceStatusReport {
    fn from(iface: &RciInterface) -> Self {
        Self {
            admin_up: iface.state.as_deref() == Some("up"),
            link_up: iface.is_link_up(),
            connected: iface.is_connected(),
        }
    }
}

impl From<RciInterface> for InterfaceSummary {
    fn from(iface: RciInterface) -> Self {
        let status = InterfaceStatusReport::from(&iface);
        let peers = iface.wireguard.map(|wg| wg.peer).unwrap_or_default();
        let endpoint = peers.first().and_then(|peer| {
            let host = peer.remote.as_deref()?;
            Some(match peer.remote_port {
                Some(port) => format!("{host}:{port}"),
                None => host.to_owned(),
            })
        });

        Self {
            id: iface.id,
            description: iface.description.filter(|d| !d.is_empty()),
            kind: iface.kind,
            status,
            peer_keys: peers.into_iter().map(|peer| peer.public_key).collect(),
            endpoint,
        }
    }
}

// ── WireGuard settings ─────────────────────────────────────────────

impl From<&Obfuscation> for AscParams {
    fn from(o: &Obfuscation) -> Self {
        Self {
            jc: o.jc,
            jmin: o.jmin,
            jmax: o.jmax,
            s1: o.s1,
            s2: o.s2,
            h1: o.h1,
            h2: o.h2,
            h3: o.h3,
            h4: o.h4,
        }
    }
}

/// Follow-up settings for an imported interface. The router takes a single
/// IPv4 address per interface, so only the first one is pushed.
pub(crate) fn wireguard_settings(peer: &PeerConfig, description: &str) -> WireguardSettings {
    let address = peer
        .interface
        .addresses
        .iter()
        .find_map(|addr| parse_v4_interface_address(addr));

    WireguardSettings {
        description: Some(description.to_owned()),
        address: address.map(|net| net.addr().to_string()),
        mask: address.map(|net| net.netmask().to_string()),
        mtu: peer.interface.mtu,
        asc: peer.interface.obfuscation.as_ref().map(AscParams::from),
    }
}

fn parse_v4_interface_address(raw: &str) -> Option<Ipv4Net> {
    if raw.contains('/') {
        raw.parse().ok()
    } else {
        raw.parse::<Ipv4Addr>().ok().map(Ipv4Net::from)
    }
}

// ── Routes ─────────────────────────────────────────────────────────

/// Router route → domain record. `None` for entries we cannot parse.
pub(crate) fn route_from_rci(route: RciRoute) -> Option<RouteRecord> {
    let destination = match (&route.host, &route.network, &route.mask) {
        (Some(host), _, _) => host.parse::<Ipv4Addr>().ok().map(Ipv4Net::from),
        (None, Some(network), Some(mask)) => {
            match (network.parse::<Ipv4Addr>(), mask.parse::<Ipv4Addr>()) {
                (Ok(network), Ok(mask)) => Ipv4Net::with_netmask(network, mask).ok(),
                _ => None,
            }
        }
        _ => None,
    };

    let Some(destination) = destination else {
        warn!(?route, "router route not understood, it will be left in place");
        return None;
    };

    let mut record = RouteRecord::new(IpNet::V4(destination), RouteOrigin::Router);
    record.gateway = route.gateway.as_deref().and_then(|gw| gw.parse().ok());
    record.interface = route.interface;
    Some(record)
}

/// Domain record → router route bound to `interface`.
///
/// Host routes use the `host` form, everything else `network` + `mask`.
/// The router's static route table is IPv4 only.
pub(crate) fn route_to_rci(route: &RouteRecord, interface: Option<&str>) -> Result<RciRoute, Error> {
    let IpNet::V4(destination) = route.destination else {
        return Err(Error::Rci {
            status: 400,
            code: None,
            message: format!("IPv6 route {} is not supported", route.destination),
        });
    };

    let (network, mask, host) = if destination.prefix_len() == 32 {
        (None, None, Some(destination.addr().to_string()))
    } else {
        (
            Some(destination.network().to_string()),
            Some(destination.netmask().to_string()),
            None,
        )
    };

    Ok(RciRoute {
        network,
        mask,
        host,
        gateway: route.gateway.as_ref().map(IpAddr::to_string),
        interface: interface.map(ToOwned::to_owned),
        auto: true,
        comment: None,
    })
}
