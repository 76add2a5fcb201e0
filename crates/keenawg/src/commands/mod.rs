//! Command dispatch: bridges CLI args -> core operations -> output formatting.

pub mod awg;
pub mod check;
pub mod config_cmd;
pub mod routes;
pub mod util;

use keenawg_core::RouterSession;

use crate::cli::{Command, GlobalOpts};
use crate::config::{self, Config};
use crate::error::CliError;

/// Dispatch a router-bound command to the appropriate handler.
pub async fn dispatch(cmd: Command, global: &GlobalOpts, cfg: &Config) -> Result<(), CliError> {
    match cmd {
        Command::Check => check::handle(global, cfg).await,
        Command::Awg(args) => awg::handle(args, global, cfg).await,
        Command::Routes(args) => routes::handle(args, global, cfg).await,
        // Config and Completions are handled before dispatch
        Command::Config(_) | Command::Completions(_) => unreachable!(),
    }
}

/// Resolve the connection settings and log in.
///
/// Handlers call this only after their own input has been validated, so a
/// bad file never costs a router round trip.
pub async fn connect(global: &GlobalOpts, cfg: &Config) -> Result<RouterSession, CliError> {
    let connection = config::build_connection_config(global, cfg)?;
    tracing::debug!(url = %connection.endpoint.url, "connecting");
    Ok(RouterSession::connect(connection).await?)
}

/// Log out, ignoring failures: the work is already done.
pub async fn disconnect(session: RouterSession) {
    if let Err(e) = session.close().await {
        tracing::debug!(error = %e, "logout failed");
    }
}
