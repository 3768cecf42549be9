//! Command dispatch: bridges CLI args -> core operations -> output formatting.

pub mod alarms;
pub mod clients;
pub mod config_cmd;
pub mod overrides;
pub mod units;
pub mod util;
pub mod watch;

use crate::cli::{Command, GlobalOpts};
use crate::config::Resolved;
use crate::error::CliError;

/// Dispatch a profile-bound command to the appropriate handler.
pub async fn dispatch(cmd: Command, resolved: &Resolved, global: &GlobalOpts) -> Result<(), CliError> {
    match cmd {
        Command::Watch(args) => watch::handle(resolved, args, global).await,
        Command::Units => units::handle(resolved, global).await,
        Command::Alarms(args) => alarms::handle(resolved, args, global).await,
        Command::Overrides(args) => overrides::handle(resolved, args, global).await,
        Command::Clients(args) => clients::handle(resolved, args, global).await,
        // Config and Completions are handled before dispatch
        Command::Config(_) | Command::Completions(_) => Err(CliError::Internal {
            message: "command does not need a profile".into(),
        }),
    }
}
