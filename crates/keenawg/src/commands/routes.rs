//! Static route command handlers.

use serde::Serialize;
use tabled::Tabled;

use keenawg_core::validate::{ensure_valid, validate_route_request};
use keenawg_core::{
    FieldError, ReplaceSummary, RouteReconciler, RouteRecord, RouteRequest, RouteSet,
    load_route_files,
};

use crate::cli::{GlobalOpts, RoutesArgs, RoutesCommand, SourceArgs};
use crate::config::Config;
use crate::error::CliError;
use crate::output;

use super::util;

// ── Table rows ──────────────────────────────────────────────────────

#[derive(Tabled)]
struct RouteRow {
    #[tabled(rename = "Destination")]
    destination: String,
    #[tabled(rename = "Gateway")]
    gateway: String,
    #[tabled(rename = "Interface")]
    interface: String,
    #[tabled(rename = "Source")]
    origin: String,
}

impl From<&RouteRecord> for RouteRow {
    fn from(r: &RouteRecord) -> Self {
        Self {
            destination: r.destination.to_string(),
            gateway: r.gateway.map_or_else(|| "-".into(), |g| g.to_string()),
            interface: r.interface.clone().unwrap_or_else(|| "-".into()),
            origin: r.origin.to_string(),
        }
    }
}

#[derive(Serialize)]
struct Replaced<'a> {
    interface: &'a str,
    #[serde(flatten)]
    summary: ReplaceSummary,
}

fn request(interface: String, sources: SourceArgs) -> RouteRequest {
    RouteRequest {
        interface_id: interface,
        files: sources.files,
        urls: sources.urls,
    }
}

fn print_routes<'a>(
    global: &GlobalOpts,
    routes: impl IntoIterator<Item = &'a RouteRecord> + Serialize,
) {
    let out = output::render_list(
        &global.output,
        routes,
        |r| RouteRow::from(r),
        |r| r.destination.to_string(),
    );
    output::print_output(&out, global.quiet);
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(args: RoutesArgs, global: &GlobalOpts, cfg: &Config) -> Result<(), CliError> {
    match args.command {
        RoutesCommand::Replace { interface, sources } => {
            let request = request(interface, sources);
            ensure_valid(validate_route_request(&request))?;

            let session = super::connect(global, cfg).await?;
            let reconciler = RouteReconciler::new(&session);

            let spinner = util::spinner("Loading route sources", global.quiet);
            let desired = reconciler.load_routes(&request.sources()).await;
            spinner.finish_and_clear();
            let desired = desired?;

            if !util::confirm(
                &format!(
                    "Replace every route on {} with {} loaded route(s)?",
                    request.interface_id,
                    desired.len()
                ),
                "routes replace",
                global.yes,
            )? {
                super::disconnect(session).await;
                return Ok(());
            }

            let spinner = util::spinner(
                &format!("Replacing routes on {}", request.interface_id),
                global.quiet,
            );
            let summary = reconciler
                .replace_routes(&request.interface_id, &desired)
                .await;
            spinner.finish_and_clear();
            super::disconnect(session).await;
            let summary = summary?;

            let report = Replaced {
                interface: &request.interface_id,
                summary,
            };
            let out = output::render_single(
                &global.output,
                &report,
                |r| {
                    format!(
                        "✓ {}: removed {} route(s), added {}",
                        r.interface, r.summary.deleted, r.summary.added
                    )
                },
                |r| r.summary.added.to_string(),
            );
            output::print_output(&out, global.quiet);
            Ok(())
        }

        RoutesCommand::Clear { interface } => {
            ensure_valid(validate_interface_id(&interface))?;
            if !util::confirm(
                &format!("Delete every static route on {interface}?"),
                "routes clear",
                global.yes,
            )? {
                return Ok(());
            }

            let session = super::connect(global, cfg).await?;
            let deleted = RouteReconciler::new(&session)
                .clear_routes(&interface)
                .await;
            super::disconnect(session).await;
            let deleted = deleted?;

            if !global.quiet {
                eprintln!("✓ {interface}: removed {deleted} route(s)");
            }
            Ok(())
        }

        RoutesCommand::List { interface } => {
            ensure_valid(validate_interface_id(&interface))?;
            let session = super::connect(global, cfg).await?;
            let routes = RouteReconciler::new(&session)
                .current_routes(&interface)
                .await;
            super::disconnect(session).await;

            print_routes(global, &routes?);
            Ok(())
        }

        RoutesCommand::Preview { sources } => {
            if sources.files.is_empty() && sources.urls.is_empty() {
                return Err(CliError::Validation {
                    field: "sources".into(),
                    reason: "give at least one --file or --url".into(),
                });
            }
            let set = preview(sources, global, cfg).await?;
            print_routes(global, &set);
            Ok(())
        }
    }
}

/// Local files load offline; URLs go through the router session.
async fn preview(
    sources: SourceArgs,
    global: &GlobalOpts,
    cfg: &Config,
) -> Result<RouteSet, CliError> {
    if sources.urls.is_empty() {
        return Ok(load_route_files(&sources.files).await?);
    }

    let request = request(String::new(), sources);
    let session = super::connect(global, cfg).await?;
    let set = RouteReconciler::new(&session)
        .load_routes(&request.sources())
        .await;
    super::disconnect(session).await;
    Ok(set?)
}

fn validate_interface_id(interface: &str) -> Vec<FieldError> {
    if interface.trim().is_empty() {
        vec![FieldError::new("interface", "must not be empty")]
    } else {
        Vec::new()
    }
}
