//! Device command handlers.

use tabled::Tabled;

use ecovacs_core::{Coordinator, Device, DeviceId};

use crate::cli::{DevicesArgs, DevicesCommand, GlobalOpts};
use crate::error::CliError;
use crate::output;

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
pub(crate) struct DeviceRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Model")]
    model: String,
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "Battery")]
    battery: String,
    #[tabled(rename = "Clean")]
    clean: String,
    #[tabled(rename = "Charge")]
    charge: String,
}

impl From<&Device> for DeviceRow {
    fn from(d: &Device) -> Self {
        Self {
            id: d.id.to_string(),
            name: d.name.clone(),
            model: d.model.clone(),
            status: d.status.to_string(),
            battery: d.battery.map(|b| format!("{b}%")).unwrap_or_default(),
            clean: d.clean_state.map(|s| s.to_string()).unwrap_or_default(),
            charge: d.charge_state.clone().unwrap_or_default(),
        }
    }
}

fn detail(d: &Device) -> String {
    [
        format!("ID:      {}", d.id),
        format!("Name:    {}", d.name),
        format!("Model:   {}", d.model),
        format!("Status:  {}", d.status),
        format!(
            "Battery: {}",
            d.battery.map_or_else(|| "-".into(), |b| format!("{b}%"))
        ),
        format!(
            "Clean:   {}",
            d.clean_state.map_or_else(|| "-".into(), |s| s.to_string())
        ),
        format!("Charge:  {}", d.charge_state.as_deref().unwrap_or("-")),
    ]
    .join("\n")
}

/// Render a device list in the selected format.
pub(crate) fn render_devices(global: &GlobalOpts, devices: &[Device]) -> Result<String, CliError> {
    output::render_list(&global.output, devices, |d| DeviceRow::from(d), |d| {
        d.id.to_string()
    })
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(
    coordinator: &Coordinator,
    args: DevicesArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match args.command {
        DevicesCommand::List => {
            coordinator.refresh().await?;
            let snap = coordinator.snapshot();
            let out = render_devices(global, &snap.devices)?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        DevicesCommand::Get { device } => {
            let session = coordinator.session().await?;
            let found = coordinator
                .cloud()
                .device(&session, &DeviceId::new(device))
                .await?;
            let out = output::render_single(&global.output, &found, detail, |d| d.id.to_string())?;
            output::print_output(&out, global.quiet);
            Ok(())
        }
    }
}
