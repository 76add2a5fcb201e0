//! `keenawg check`: log in and report what we reached.

use serde::Serialize;

use keenawg_core::{CoreError, InterfaceKind, RouterApi, Step};

use crate::cli::GlobalOpts;
use crate::config::Config;
use crate::error::CliError;
use crate::output;

use super::util;

#[derive(Serialize)]
struct CheckReport {
    url: String,
    login: String,
    wireguard_interfaces: usize,
    web_url: String,
}

pub async fn handle(global: &GlobalOpts, cfg: &Config) -> Result<(), CliError> {
    let spinner = util::spinner("Connecting to router", global.quiet);
    let session = super::connect(global, cfg).await;
    spinner.finish_and_clear();
    let session = session?;

    let interfaces = session
        .list_interfaces(InterfaceKind::Wireguard)
        .await
        .map_err(|e| CoreError::remote(Step::ListInterfaces, "wireguard", e))?;
    let report = CheckReport {
        url: session.endpoint().url.clone(),
        login: session.endpoint().login.clone(),
        wireguard_interfaces: interfaces.len(),
        web_url: session.web_url(),
    };
    super::disconnect(session).await;

    let out = output::render_single(
        &global.output,
        &report,
        |r| {
            format!(
                "✓ Connected to {} as {}\n  WireGuard interfaces: {}\n  Web UI: {}",
                r.url, r.login, r.wireguard_interfaces, r.web_url
            )
        },
        |r| r.url.clone(),
    );
    output::print_output(&out, global.quiet);
    Ok(())
}
