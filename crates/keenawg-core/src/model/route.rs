// ── Static route domain types ──

use std::fmt;
use std::net::IpAddr;
use std::path::PathBuf;

use indexmap::IndexMap;
use indexmap::map::Values;
use ipnet::IpNet;
use serde::Serialize;

/// Where a route record came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "location", rename_all = "lowercase")]
pub enum RouteOrigin {
    File(PathBuf),
    Url(String),
    /// Read back from the router.
    Router,
}

impl fmt::Display for RouteOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::File(path) => write!(f, "{}", path.display()),
            Self::Url(url) => f.write_str(url),
            Self::Router => f.write_str("router"),
        }
    }
}

/// One static route.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RouteRecord {
    /// Destination, normalised to its network address.
    pub destination: IpNet,
    pub gateway: Option<IpAddr>,
    /// Interface the route is bound to on the router.
    pub interface: Option<String>,
    pub origin: RouteOrigin,
}

impl RouteRecord {
    pub fn new(destination: IpNet, origin: RouteOrigin) -> Self {
        Self {
            destination: destination.trunc(),
            gateway: None,
            interface: None,
            origin,
        }
    }

    pub fn with_gateway(mut self, gateway: IpAddr) -> Self {
        self.gateway = Some(gateway);
        self
    }

    pub fn bound_to(mut self, interface: impl Into<String>) -> Self {
        self.interface = Some(interface.into());
        self
    }
}

impl fmt::Display for RouteRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.destination)?;
        if let Some(gateway) = self.gateway {
            write!(f, " via {gateway}")?;
        }
        if let Some(ref interface) = self.interface {
            write!(f, " dev {interface}")?;
        }
        Ok(())
    }
}

/// Insertion-ordered set of routes, one per destination.
///
/// Re-inserting a destination replaces the record but keeps its original
/// position, so merging sources in order gives "later source wins".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RouteSet {
    routes: IndexMap<IpNet, RouteRecord>,
}

impl RouteSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace. Returns the record that was displaced.
    pub fn insert(&mut self, route: RouteRecord) -> Option<RouteRecord> {
        self.routes.insert(route.destination, route)
    }

    pub fn get(&self, destination: &IpNet) -> Option<&RouteRecord> {
        self.routes.get(destination)
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    pub fn iter(&self) -> Values<'_, IpNet, RouteRecord> {
        self.routes.values()
    }
}

impl Extend<RouteRecord> for RouteSet {
    fn extend<I: IntoIterator<Item = RouteRecord>>(&mut self, iter: I) {
        for route in iter {
            self.insert(route);
        }
    }
}

impl FromIterator<RouteRecord> for RouteSet {
    fn from_iter<I: IntoIterator<Item = RouteRecord>>(iter: I) -> Self {
        let mut set = Self::new();
        set.extend(iter);
        set
    }
}

impl<'a> IntoIterator for &'a RouteSet {
    type Item = &'a RouteRecord;
    type IntoIter = Values<'a, IpNet, RouteRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl Serialize for RouteSet {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.routes.values())
    }
}

/// A place to load routes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteSource {
    File(PathBuf),
    Url(String),
}

impl fmt::Display for RouteSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::File(path) => write!(f, "{}", path.display()),
            Self::Url(url) => f.write_str(url),
        }
    }
}

/// A request to replace the routes of one interface.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RouteRequest {
    pub interface_id: String,
    pub files: Vec<PathBuf>,
    pub urls: Vec<String>,
}

impl RouteRequest {
    /// Files first, then URLs, each in the order given.
    pub fn sources(&self) -> Vec<RouteSource> {
        self.files
            .iter()
            .cloned()
            .map(RouteSource::File)
            .chain(self.urls.iter().cloned().map(RouteSource::Url))
            .collect()
    }
}
