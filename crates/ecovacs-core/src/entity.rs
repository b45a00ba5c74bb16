// ── Entity adapters ──
//
// Host-agnostic sensors and buttons for each robot. Sensors read the
// coordinator's latest snapshot; buttons dispatch through it.

use std::fmt;

use async_trait::async_trait;
use strum::IntoEnumIterator;

use crate::coordinator::Coordinator;
use crate::error::Error;
use crate::model::{Ack, Command, Device, DeviceId};

/// Something a host can read a state string from.
#[async_trait]
pub trait StatusProvider: Send + Sync {
    /// Stable per-device unique id, e.g. `Hall_clean_state`.
    fn unique_id(&self) -> String;
    fn name(&self) -> String;
    /// `None` when the robot is unknown or the reading is unavailable.
    async fn state(&self) -> Option<String>;
}

/// Something a host can press.
#[async_trait]
pub trait CommandTarget: Send + Sync {
    fn unique_id(&self) -> String;
    fn name(&self) -> String;
    async fn press(&self) -> Result<Ack, Error>;
}

// ── Sensors ──────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display, strum::EnumIter)]
#[strum(serialize_all = "snake_case")]
pub enum SensorKind {
    Status,
    CleanState,
    ChargeState,
    Battery,
}

impl SensorKind {
    pub fn label(self) -> &'static str {
        match self {
            Self::Status => "Status",
            Self::CleanState => "Clean state",
            Self::ChargeState => "Charge state",
            Self::Battery => "Battery",
        }
    }

    fn read(self, device: &Device) -> Option<String> {
        match self {
            Self::Status => Some(device.status.to_string()),
            Self::CleanState => device.clean_state.map(|s| s.to_string()),
            Self::ChargeState => device.charge_state.clone(),
            Self::Battery => device.battery.map(|b| b.to_string()),
        }
    }
}

pub struct SensorEntity {
    coordinator: Coordinator,
    device_id: DeviceId,
    device_name: String,
    kind: SensorKind,
}

impl SensorEntity {
    pub fn kind(&self) -> SensorKind {
        self.kind
    }

    pub fn device_id(&self) -> &DeviceId {
        &self.device_id
    }
}

impl fmt::Debug for SensorEntity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SensorEntity")
            .field("device_id", &self.device_id)
            .field("kind", &self.kind)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl StatusProvider for SensorEntity {
    fn unique_id(&self) -> String {
        format!("{}_{}", self.device_id, self.kind)
    }

    fn name(&self) -> String {
        format!("{} {}", self.device_name, self.kind.label())
    }

    async fn state(&self) -> Option<String> {
        let snapshot = self.coordinator.snapshot();
        snapshot.device(&self.device_id).and_then(|d| self.kind.read(d))
    }
}

// ── Buttons ──────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display, strum::EnumIter)]
#[strum(serialize_all = "snake_case")]
pub enum ButtonKind {
    StartClean,
    PauseClean,
    ResumeClean,
    StopClean,
    ReturnToDock,
    CancelReturn,
}

impl ButtonKind {
    pub fn command(self) -> Command {
        match self {
            Self::StartClean => Command::Start,
            Self::PauseClean => Command::Pause,
            Self::ResumeClean => Command::Resume,
            Self::StopClean => Command::Stop,
            Self::ReturnToDock => Command::ReturnToDock,
            Self::CancelReturn => Command::CancelReturn,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::StartClean => "[Clean] Start",
            Self::PauseClean => "[Clean] Pause",
            Self::ResumeClean => "[Clean] Resume",
            Self::StopClean => "[Clean] Stop",
            Self::ReturnToDock => "[Charge] Return to dock",
            Self::CancelReturn => "[Charge] Cancel return",
        }
    }
}

pub struct ButtonEntity {
    coordinator: Coordinator,
    device_id: DeviceId,
    device_name: String,
    kind: ButtonKind,
}

impl ButtonEntity {
    pub fn kind(&self) -> ButtonKind {
        self.kind
    }

    pub fn device_id(&self) -> &DeviceId {
        &self.device_id
    }
}

impl fmt::Debug for ButtonEntity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ButtonEntity")
            .field("device_id", &self.device_id)
            .field("kind", &self.kind)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl CommandTarget for ButtonEntity {
    fn unique_id(&self) -> String {
        format!("{}_{}", self.device_id, self.kind)
    }

    fn name(&self) -> String {
        format!("{} {}", self.device_name, self.kind.label())
    }

    async fn press(&self) -> Result<Ack, Error> {
        self.coordinator
            .send_command(&self.device_id, self.kind.command())
            .await
    }
}

// ── Discovery ────────────────────────────────────────────────────

/// Everything a host registers for one robot.
#[derive(Debug)]
pub struct DeviceEntities {
    pub sensors: Vec<SensorEntity>,
    pub buttons: Vec<ButtonEntity>,
}

/// Build the sensors and buttons for `device`. Buttons for command
/// families the device's model does not support are left out.
pub fn entities_for(coordinator: &Coordinator, device: &Device) -> DeviceEntities {
    let caps = coordinator.config().capabilities.lookup(&device.model);

    let sensors = SensorKind::iter()
        .map(|kind| SensorEntity {
            coordinator: coordinator.clone(),
            device_id: device.id.clone(),
            device_name: device.name.clone(),
            kind,
        })
        .collect();

    let buttons = ButtonKind::iter()
        .filter(|kind| caps.supports(kind.command()))
        .map(|kind| ButtonEntity {
            coordinator: coordinator.clone(),
            device_id: device.id.clone(),
            device_name: device.name.clone(),
            kind,
        })
        .collect();

    DeviceEntities { sensors, buttons }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn each_button_maps_to_a_distinct_command() {
        let commands: Vec<_> = ButtonKind::iter().map(ButtonKind::command).collect();
        let all: Vec<_> = Command::iter().collect();
        assert_eq!(commands, all);
    }

    #[test]
    fn labels_carry_the_command_family() {
        assert_eq!(ButtonKind::StopClean.label(), "[Clean] Stop");
        assert_eq!(ButtonKind::CancelReturn.label(), "[Charge] Cancel return");
        assert_eq!(SensorKind::ChargeState.to_string(), "charge_state");
    }
}
