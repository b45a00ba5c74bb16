// ── Control commands and model capabilities ──

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::device::DeviceId;

/// A control action a host can issue to a robot.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
    strum::EnumIter,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Command {
    Start,
    Pause,
    Resume,
    Stop,
    ReturnToDock,
    CancelReturn,
}

impl Command {
    /// The capability group the vendor files this command under.
    pub fn capability(self) -> Capability {
        match self {
            Self::Start | Self::Pause | Self::Resume | Self::Stop => Capability::Clean,
            Self::ReturnToDock | Self::CancelReturn => Capability::Charge,
        }
    }
}

/// Vendor command families: `Clean` and `Charge`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum::Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Capability {
    Clean,
    Charge,
}

/// Which command families a robot model accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Capabilities {
    #[serde(default = "enabled")]
    pub clean: bool,
    #[serde(default = "enabled")]
    pub charge: bool,
}

fn enabled() -> bool {
    true
}

impl Default for Capabilities {
    fn default() -> Self {
        Self {
            clean: true,
            charge: true,
        }
    }
}

impl Capabilities {
    pub fn supports(self, command: Command) -> bool {
        match command.capability() {
            Capability::Clean => self.clean,
            Capability::Charge => self.charge,
        }
    }
}

/// Confirmation that the cloud accepted a command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ack {
    pub device_id: DeviceId,
    pub command: Command,
    pub acknowledged_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use strum::IntoEnumIterator;

    use super::*;

    #[test]
    fn commands_split_into_clean_and_charge() {
        let charge: Vec<_> = Command::iter()
            .filter(|c| c.capability() == Capability::Charge)
            .collect();
        assert_eq!(charge, [Command::ReturnToDock, Command::CancelReturn]);
        assert_eq!(Command::iter().count(), 6);
    }

    #[test]
    fn capabilities_gate_by_family() {
        let clean_only = Capabilities {
            clean: true,
            charge: false,
        };
        assert!(clean_only.supports(Command::Stop));
        assert!(!clean_only.supports(Command::ReturnToDock));
        assert!(Capabilities::default().supports(Command::CancelReturn));
    }

    #[test]
    fn command_names_are_snake_case() {
        assert_eq!(Command::ReturnToDock.to_string(), "return_to_dock");
        assert_eq!("cancel_return".parse::<Command>().ok(), Some(Command::CancelReturn));
    }
}
