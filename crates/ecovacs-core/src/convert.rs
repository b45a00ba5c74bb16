// ── Wire ↔ domain conversions ──
//
// The vendor reports two independent readings per robot: a clean state
// (`st`) and a charge state (`type`). Hosts get a single status derived
// from both; the raw readings travel along for dedicated sensors.

use ecovacs_api::{ChargeAction, CleanAction, CtlPayload, DeviceEntry};

use crate::model::{CleanState, Command, Device, DeviceId, DeviceInfo, DeviceStatus};

/// Placeholder model for robots whose device-list entry names none.
pub const UNKNOWN_MODEL: &str = "unknown";

/// How a [`Command`] is expressed on the `robot/ctl` channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum WireAction {
    Clean(CleanAction),
    Charge(ChargeAction),
}

pub(crate) fn wire_action(command: Command) -> WireAction {
    match command {
        Command::Start => WireAction::Clean(CleanAction::Start),
        Command::Pause => WireAction::Clean(CleanAction::Pause),
        Command::Resume => WireAction::Clean(CleanAction::Resume),
        Command::Stop => WireAction::Clean(CleanAction::Stop),
        Command::ReturnToDock => WireAction::Charge(ChargeAction::ReturnToDock),
        Command::CancelReturn => WireAction::Charge(ChargeAction::CancelReturn),
    }
}

/// Identity plus any battery level the list entry already carried.
pub(crate) fn device_info(entry: DeviceEntry) -> (DeviceInfo, Option<u8>) {
    match entry {
        DeviceEntry::Nickname(nick) => (
            DeviceInfo {
                id: DeviceId::new(nick.clone()),
                name: nick,
                model: UNKNOWN_MODEL.into(),
            },
            None,
        ),
        DeviceEntry::Detailed(rec) => (
            DeviceInfo {
                name: rec.name.unwrap_or_else(|| rec.nick_name.clone()),
                id: DeviceId::new(rec.nick_name),
                model: rec.model.unwrap_or_else(|| UNKNOWN_MODEL.into()),
            },
            rec.battery,
        ),
    }
}

/// Charge `type` values meaning the robot sits on its dock.
const CHARGING_TYPES: &[&str] = &["SlotCharging", "WireCharging"];
/// Charge `type` values meaning the robot is heading back to the dock.
const RETURNING_TYPES: &[&str] = &["Going", "GoCharging", "Returning"];

/// Resolve the host-facing status from the two readings.
///
/// Charging and returning win over the clean state. A missing clean
/// reading or an unrecognized `st` code is reported as an error.
pub(crate) fn resolve_status(
    clean: Option<CleanState>,
    charge_type: Option<&str>,
) -> DeviceStatus {
    match charge_type {
        Some(t) if CHARGING_TYPES.contains(&t) => return DeviceStatus::Charging,
        Some(t) if RETURNING_TYPES.contains(&t) => return DeviceStatus::Returning,
        _ => {}
    }
    match clean {
        Some(CleanState::Cleaning) => DeviceStatus::Cleaning,
        Some(CleanState::Paused) => DeviceStatus::Paused,
        Some(CleanState::Idle) => DeviceStatus::Idle,
        None => DeviceStatus::Error,
    }
}

/// Assemble a [`Device`] from its identity and state replies.
///
/// `None` replies are state queries the robot refused (offline, busy).
pub(crate) fn device_from_states(
    info: DeviceInfo,
    listed_battery: Option<u8>,
    clean: Option<&CtlPayload>,
    charge: Option<&CtlPayload>,
) -> Device {
    let clean_state = clean
        .and_then(|p| p.field_str("st"))
        .and_then(CleanState::from_code);
    let charge_state = charge.and_then(|p| p.field_str("type")).map(str::to_owned);
    let battery = charge.and_then(|p| p.field_u8("power")).or(listed_battery);

    Device {
        status: resolve_status(clean_state, charge_state.as_deref()),
        id: info.id,
        name: info.name,
        model: info.model,
        battery,
        clean_state,
        charge_state,
    }
}
