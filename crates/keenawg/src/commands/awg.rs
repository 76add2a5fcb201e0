//! WireGuard / AmneziaWG interface command handlers.

use std::time::Duration;

use serde::Serialize;
use tabled::Tabled;

use keenawg_core::parser::parse_peer_config;
use keenawg_core::validate::{ensure_valid, validate_interface_spec};
use keenawg_core::{
    CoreError, InterfaceKind, InterfaceSpec, InterfaceSummary, ProvisionState, Provisioner,
    RouterApi, Step,
};

use crate::cli::{AwgArgs, AwgCommand, CreateArgs, GlobalOpts};
use crate::config::Config;
use crate::error::CliError;
use crate::output;

use super::util;

// ── Table rows ──────────────────────────────────────────────────────

#[derive(Tabled)]
struct InterfaceRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Description")]
    description: String,
    #[tabled(rename = "State")]
    state: String,
    #[tabled(rename = "Endpoint")]
    endpoint: String,
    #[tabled(rename = "Peers")]
    peers: usize,
}

fn interface_row(summary: &InterfaceSummary, color: bool) -> InterfaceRow {
    let (label, good) = match (summary.status.admin_up, summary.status.is_operational()) {
        (_, true) => ("connected", true),
        (true, false) => ("waiting", false),
        (false, false) => ("down", false),
    };
    InterfaceRow {
        id: summary.id.clone(),
        description: summary.description.clone().unwrap_or_default(),
        state: output::paint_state(label, good, color),
        endpoint: summary.endpoint.clone().unwrap_or_else(|| "-".into()),
        peers: summary.peer_keys.len(),
    }
}

/// What `awg create` reports.
#[derive(Serialize)]
struct Created {
    id: String,
    name: String,
    web_url: String,
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(args: AwgArgs, global: &GlobalOpts, cfg: &Config) -> Result<(), CliError> {
    match args.command {
        AwgCommand::Create(create) => handle_create(create, global, cfg).await,

        AwgCommand::List => {
            let session = super::connect(global, cfg).await?;
            let interfaces = session
                .list_interfaces(InterfaceKind::Wireguard)
                .await
                .map_err(|e| CoreError::remote(Step::ListInterfaces, "wireguard", e))?;
            super::disconnect(session).await;

            let color = output::should_color(&global.color);
            let out = output::render_list(
                &global.output,
                &interfaces,
                |s| interface_row(s, color),
                |s| s.id.clone(),
            );
            output::print_output(&out, global.quiet);
            Ok(())
        }

        AwgCommand::Delete { id } => {
            if !util::confirm(
                &format!("Delete interface {id} and its configuration?"),
                "awg delete",
                global.yes,
            )? {
                return Ok(());
            }

            let session = super::connect(global, cfg).await?;
            Provisioner::new(&session).delete_interface(&id).await?;
            super::disconnect(session).await;

            if !global.quiet {
                eprintln!("✓ Interface {id} deleted");
            }
            Ok(())
        }
    }
}

async fn handle_create(
    create: CreateArgs,
    global: &GlobalOpts,
    cfg: &Config,
) -> Result<(), CliError> {
    let spec = match create.name {
        Some(name) => InterfaceSpec::new(&create.file).with_name(name),
        None => InterfaceSpec::new(&create.file),
    };
    ensure_valid(validate_interface_spec(&spec))?;
    let peer = parse_peer_config(&spec.path).map_err(CoreError::from)?;
    let name = spec.effective_name();

    let mut timings = cfg.defaults.provision_timings();
    if let Some(ms) = create.settle_delay_ms {
        timings.settle_delay = Duration::from_millis(ms);
    }
    if let Some(secs) = create.ready_timeout {
        timings.ready_timeout = Duration::from_secs(secs);
    }

    let session = super::connect(global, cfg).await?;

    let spinner = util::spinner(&format!("Provisioning {name}"), global.quiet);
    let progress = spinner.clone();
    let cancel = util::cancel_on_interrupt();

    let result = Provisioner::new(&session)
        .with_timings(timings)
        .with_observer(move |state: &ProvisionState| {
            progress.set_message(format!("{name}: {state}"));
        })
        .run(&peer, &spec.effective_name(), &cancel)
        .await;
    spinner.finish_and_clear();

    let web_url = session.web_url();
    super::disconnect(session).await;
    let handle = result?;

    let created = Created {
        id: handle.id,
        name: spec.effective_name(),
        web_url,
    };
    let out = output::render_single(
        &global.output,
        &created,
        |c| {
            format!(
                "✓ Interface {} ({}) is up\n  Manage it at: {}",
                c.id, c.name, c.web_url
            )
        },
        |c| c.id.clone(),
    );
    output::print_output(&out, global.quiet);
    Ok(())
}
