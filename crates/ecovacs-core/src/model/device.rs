// ── Device domain types ──

use std::fmt;

use serde::{Deserialize, Serialize};

/// The vendor identifies a robot on the control channel by its nickname,
/// so that nickname is the device id.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DeviceId(String);

impl DeviceId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DeviceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for DeviceId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// Robot status as exposed to hosts.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
    strum::EnumIter,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum DeviceStatus {
    Cleaning,
    Paused,
    Returning,
    Charging,
    Idle,
    Error,
}

impl DeviceStatus {
    /// Cleaning, or on the way to or from it.
    pub fn is_active(self) -> bool {
        matches!(self, Self::Cleaning | Self::Paused | Self::Returning)
    }

    pub fn is_docked(self) -> bool {
        matches!(self, Self::Charging)
    }
}

/// The vendor's clean-state reading (`st`), kept for the dedicated sensor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum::Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum CleanState {
    Cleaning,
    Paused,
    Idle,
}

impl CleanState {
    /// Decode the `st` field: `s` cleaning, `p` paused, `h` idle.
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "s" => Some(Self::Cleaning),
            "p" => Some(Self::Paused),
            "h" => Some(Self::Idle),
            _ => None,
        }
    }
}

/// Static identity of a bound robot, as learned from the device list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceInfo {
    pub id: DeviceId,
    pub name: String,
    pub model: String,
}

/// A robot and its most recent status. Rebuilt on every poll.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Device {
    pub id: DeviceId,
    pub name: String,
    pub model: String,
    pub status: DeviceStatus,
    pub battery: Option<u8>,

    // Raw readings behind `status`
    pub clean_state: Option<CleanState>,
    pub charge_state: Option<String>,
}

impl Device {
    pub fn info(&self) -> DeviceInfo {
        DeviceInfo {
            id: self.id.clone(),
            name: self.name.clone(),
            model: self.model.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::*;

    #[test]
    fn status_round_trips_through_snake_case() {
        assert_eq!(DeviceStatus::Returning.to_string(), "returning");
        assert_eq!(DeviceStatus::from_str("charging").ok(), Some(DeviceStatus::Charging));
        assert!(DeviceStatus::from_str("docked").is_err());
    }

    #[test]
    fn clean_state_codes() {
        assert_eq!(CleanState::from_code("s"), Some(CleanState::Cleaning));
        assert_eq!(CleanState::from_code("p"), Some(CleanState::Paused));
        assert_eq!(CleanState::from_code("h"), Some(CleanState::Idle));
        assert_eq!(CleanState::from_code("x"), None);
    }
}
