//! Clean and dock command handlers.

use ecovacs_core::{Ack, Command as CoreCommand, Coordinator, DeviceId};

use crate::cli::{CleanArgs, CleanCommand, DockArgs, DockCommand, GlobalOpts};
use crate::error::CliError;
use crate::output;

pub async fn handle_clean(
    coordinator: &Coordinator,
    args: CleanArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let (device, command) = match args.command {
        CleanCommand::Start { device } => (device, CoreCommand::Start),
        CleanCommand::Pause { device } => (device, CoreCommand::Pause),
        CleanCommand::Resume { device } => (device, CoreCommand::Resume),
        CleanCommand::Stop { device } => (device, CoreCommand::Stop),
    };
    send(coordinator, device, command, global).await
}

pub async fn handle_dock(
    coordinator: &Coordinator,
    args: DockArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let (device, command) = match args.command {
        DockCommand::Return { device } => (device, CoreCommand::ReturnToDock),
        DockCommand::Cancel { device } => (device, CoreCommand::CancelReturn),
    };
    send(coordinator, device, command, global).await
}

async fn send(
    coordinator: &Coordinator,
    device: String,
    command: CoreCommand,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let ack = coordinator
        .send_command(&DeviceId::new(device), command)
        .await?;
    let out = output::render_single(&global.output, &ack, summary, |a| a.command.to_string())?;
    output::print_output(&out, global.quiet);
    Ok(())
}

fn summary(ack: &Ack) -> String {
    format!(
        "✓ {} accepted by {} at {}",
        ack.command,
        ack.device_id,
        ack.acknowledged_at.format("%Y-%m-%d %H:%M:%S UTC")
    )
}
