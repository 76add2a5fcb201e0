// ── Route reconciler ──
//
// Loads desired routes from batch files and URLs, then replaces the static
// routes bound to one interface: delete everything currently there, add
// everything desired, save. A failed delete stops the run before any add,
// so the router never ends up with a mix of old and new routes.

use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::error::{CoreError, Step};
use crate::model::route::{RouteOrigin, RouteRecord, RouteSet, RouteSource};
use crate::parser::parse_batch_routes;
use crate::router::RouterApi;
use crate::validate::FieldError;

/// What a replace run did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ReplaceSummary {
    pub deleted: usize,
    pub added: usize,
}

pub struct RouteReconciler<'a, R> {
    router: &'a R,
}

impl<'a, R: RouterApi> RouteReconciler<'a, R> {
    pub fn new(router: &'a R) -> Self {
        Self { router }
    }

    /// Read every source in order and merge the records.
    ///
    /// Any source that cannot be read or contains a malformed line aborts
    /// the whole load.
    pub async fn load_routes(&self, sources: &[RouteSource]) -> Result<RouteSet, CoreError> {
        let mut set = RouteSet::new();

        for source in sources {
            let routes = match source {
                RouteSource::File(path) => read_route_file(path).await?,
                RouteSource::Url(url) => {
                    let content = self
                        .router
                        .fetch_remote_text(url)
                        .await
                        .map_err(|e| source_error(source, e.to_string()))?;
                    parse_source(source, &content, &RouteOrigin::Url(url.clone()))?
                }
            };
            set.extend(routes);
        }

        info!(sources = sources.len(), routes = set.len(), "route sources merged");
        Ok(set)
    }

    /// Routes currently bound to `interface_id`.
    pub async fn current_routes(&self, interface_id: &str) -> Result<Vec<RouteRecord>, CoreError> {
        self.router
            .get_routes(interface_id)
            .await
            .map_err(|e| CoreError::remote(Step::ListRoutes, interface_id, e))
    }

    /// Make `desired` the complete route list of `interface_id`.
    pub async fn replace_routes(
        &self,
        interface_id: &str,
        desired: &RouteSet,
    ) -> Result<ReplaceSummary, CoreError> {
        let unsupported: Vec<FieldError> = desired
            .iter()
            .filter(|route| route.destination.addr().is_ipv6())
            .map(|route| {
                FieldError::new(
                    "routes",
                    format!("IPv6 destination {} is not supported", route.destination),
                )
            })
            .collect();
        if !unsupported.is_empty() {
            return Err(CoreError::Validation {
                errors: unsupported,
            });
        }

        let deleted = self.delete_all(interface_id).await?;

        let mut added = 0;
        for route in desired {
            self.router
                .add_route(interface_id, route)
                .await
                .map_err(|e| CoreError::remote(Step::AddRoute, route.to_string(), e))?;
            added += 1;
        }

        self.save().await?;
        info!(interface_id, deleted, added, "routes replaced");
        Ok(ReplaceSummary { deleted, added })
    }

    /// Delete every route bound to `interface_id`.
    pub async fn clear_routes(&self, interface_id: &str) -> Result<usize, CoreError> {
        let deleted = self.delete_all(interface_id).await?;
        self.save().await?;
        info!(interface_id, deleted, "routes cleared");
        Ok(deleted)
    }

    async fn delete_all(&self, interface_id: &str) -> Result<usize, CoreError> {
        let current = self.current_routes(interface_id).await?;
        for route in &current {
            self.router
                .delete_route(route)
                .await
                .map_err(|e| CoreError::remote(Step::DeleteRoute, route.to_string(), e))?;
        }
        Ok(current.len())
    }

    async fn save(&self) -> Result<(), CoreError> {
        self.router
            .save_configuration()
            .await
            .map_err(|e| CoreError::remote(Step::Save, "router", e))
    }
}

// ── Source loading ──────────────────────────────────────────────────

/// Merge local batch files without a router session.
pub async fn load_route_files(paths: &[PathBuf]) -> Result<RouteSet, CoreError> {
    let mut set = RouteSet::new();
    for path in paths {
        set.extend(read_route_file(path).await?);
    }
    Ok(set)
}

async fn read_route_file(path: &Path) -> Result<Vec<RouteRecord>, CoreError> {
    let source = RouteSource::File(path.to_path_buf());
    let content = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| source_error(&source, e.to_string()))?;
    parse_source(&source, &content, &RouteOrigin::File(path.to_path_buf()))
}

fn parse_source(
    source: &RouteSource,
    content: &str,
    origin: &RouteOrigin,
) -> Result<Vec<RouteRecord>, CoreError> {
    let routes = parse_batch_routes(content, origin)
        .into_result(origin)
        .map_err(|e| source_error(source, e.to_string()))?;

    if routes.is_empty() {
        warn!(%source, "route source contains no routes");
    }
    debug!(%source, count = routes.len(), "loaded route source");
    Ok(routes)
}

fn source_error(source: &RouteSource, reason: String) -> CoreError {
    CoreError::RouteSource {
        origin: source.to_string(),
        reason,
    }
}
