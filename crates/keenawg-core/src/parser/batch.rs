// ── Batch route file parser ──
//
// Accepts the formats public route lists ship in:
//
//   10.0.0.0/24
//   192.168.0.0/16 gw=10.0.0.1
//   172.16.0.0/12 via 10.0.0.1
//   route ADD 8.8.8.0 MASK 255.255.255.0 0.0.0.0 metric 1
//   1.1.1.1
//
// Blank lines, `@echo` directives and `#`/`;`/`::`/`rem` comments are
// skipped. A bad line is recorded with its 1-based number and parsing moves
// on.

use std::net::{IpAddr, Ipv4Addr};

use ipnet::{IpNet, Ipv4Net};

use crate::error::{MalformedLine, ParseError};
use crate::model::route::{RouteOrigin, RouteRecord};

/// Outcome of parsing one batch file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchParse {
    pub routes: Vec<RouteRecord>,
    pub errors: Vec<MalformedLine>,
}

impl BatchParse {
    /// All records, or every malformed line if there was any.
    pub fn into_result(self, origin: &RouteOrigin) -> Result<Vec<RouteRecord>, ParseError> {
        if self.errors.is_empty() {
            Ok(self.routes)
        } else {
            Err(ParseError::MalformedLines {
                origin: origin.to_string(),
                lines: self.errors,
            })
        }
    }
}

pub fn parse_batch_routes(content: &str, origin: &RouteOrigin) -> BatchParse {
    let mut parsed = BatchParse::default();

    for (idx, raw) in content.lines().enumerate() {
        let line = raw.trim().trim_start_matches('\u{feff}');
        if is_ignored(line) {
            continue;
        }
        match parse_line(line) {
            Ok((destination, gateway)) => {
                let mut route = RouteRecord::new(destination, origin.clone());
                route.gateway = gateway;
                parsed.routes.push(route);
            }
            Err(reason) => parsed.errors.push(MalformedLine {
                line: idx + 1,
                content: line.to_owned(),
                reason,
            }),
        }
    }

    parsed
}

fn is_ignored(line: &str) -> bool {
    if line.is_empty() || line.starts_with(['#', ';', '@']) || line.starts_with("::") {
        return true;
    }
    line.split_whitespace()
        .next()
        .is_some_and(|word| word.eq_ignore_ascii_case("rem"))
}

fn parse_line(line: &str) -> Result<(IpNet, Option<IpAddr>), String> {
    let mut tokens: Vec<&str> = line.split_whitespace().collect();

    if tokens
        .first()
        .is_some_and(|t| t.eq_ignore_ascii_case("route"))
    {
        tokens.remove(0);
        // `route -p add ...`
        tokens.retain(|t| !t.starts_with('-'));
        if !tokens.first().is_some_and(|t| t.eq_ignore_ascii_case("add")) {
            return Err("only `route add` lines are supported".into());
        }
    }

    match tokens.split_first() {
        Some((first, rest)) if first.eq_ignore_ascii_case("add") => parse_route_add(rest),
        Some((first, rest)) => parse_cidr_line(first, rest),
        None => Err("empty line".into()),
    }
}

/// `add NET mask MASK [GATEWAY] [metric N] [if N]`
fn parse_route_add(tokens: &[&str]) -> Result<(IpNet, Option<IpAddr>), String> {
    let [net, mask_kw, mask, rest @ ..] = tokens else {
        return Err("expected `add NET mask MASK [GATEWAY]`".into());
    };
    if !mask_kw.eq_ignore_ascii_case("mask") {
        return Err(format!("expected `mask`, got `{mask_kw}`"));
    }
    let net: Ipv4Addr = net
        .parse()
        .map_err(|_| format!("invalid network `{net}`"))?;
    let mask: Ipv4Addr = mask
        .parse()
        .map_err(|_| format!("invalid mask `{mask}`"))?;
    let destination =
        Ipv4Net::with_netmask(net, mask).map_err(|_| format!("non-contiguous mask `{mask}`"))?;

    let mut gateway = None;
    let mut rest = rest.iter();
    while let Some(token) = rest.next() {
        if token.eq_ignore_ascii_case("metric") || token.eq_ignore_ascii_case("if") {
            if rest.next().is_none() {
                return Err(format!("`{token}` needs a value"));
            }
        } else if gateway.is_none() {
            gateway = parse_gateway(token)?;
        } else {
            return Err(format!("unexpected token `{token}`"));
        }
    }

    Ok((IpNet::V4(destination), gateway))
}

/// `CIDR [gw=IP | via IP | IP]` or a bare host address.
fn parse_cidr_line(first: &str, rest: &[&str]) -> Result<(IpNet, Option<IpAddr>), String> {
    let destination = parse_destination(first)?;
    let gateway = match rest {
        [] => None,
        [via, gw] if via.eq_ignore_ascii_case("via") => parse_gateway(gw)?,
        [token] => {
            let gw = token
                .split_once('=')
                .filter(|(key, _)| key.eq_ignore_ascii_case("gw"))
                .map_or(*token, |(_, value)| value);
            parse_gateway(gw)?
        }
        _ => return Err(format!("unexpected token `{}`", rest.join(" "))),
    };
    Ok((destination, gateway))
}

fn parse_destination(token: &str) -> Result<IpNet, String> {
    if token.contains('/') {
        token
            .parse::<IpNet>()
            .map_err(|_| format!("invalid destination `{token}`"))
    } else {
        token
            .parse::<IpAddr>()
            .map(IpNet::from)
            .map_err(|_| format!("invalid destination `{token}`"))
    }
}

/// An unspecified gateway (`0.0.0.0`) means "via the interface".
fn parse_gateway(token: &str) -> Result<Option<IpAddr>, String> {
    let gateway: IpAddr = token
        .parse()
        .map_err(|_| format!("invalid gateway `{token}`"))?;
    Ok((!gateway.is_unspecified()).then_some(gateway))
}
