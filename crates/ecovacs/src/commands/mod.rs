//! Command dispatch: bridges CLI args -> core operations -> output formatting.

pub mod config_cmd;
pub mod control;
pub mod devices;
pub mod watch;

use ecovacs_core::Coordinator;

use crate::cli::{Command, GlobalOpts};
use crate::error::CliError;

/// Dispatch a cloud-bound command to the appropriate handler.
pub async fn dispatch(
    cmd: Command,
    coordinator: &Coordinator,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match cmd {
        Command::Devices(args) => devices::handle(coordinator, args, global).await,
        Command::Clean(args) => control::handle_clean(coordinator, args, global).await,
        Command::Dock(args) => control::handle_dock(coordinator, args, global).await,
        Command::Watch(args) => watch::handle(coordinator, args, global).await,
        // Config and Completions are handled before dispatch
        Command::Config(_) | Command::Completions(_) => Ok(()),
    }
}
