// Wire types for the open platform's JSON shapes.
//
// Every response is wrapped as `{ "code": 0, "msg": "...", "data": ... }`.
// `code` arrives as a number from some endpoints and as a string from
// others, so it is normalized to a `String` at the edge.

use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Envelope `code` normalized to its string form. `"0"` means success.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Code(pub String);

impl Code {
    pub fn is_success(&self) -> bool {
        self.0 == "0"
    }
}

impl<'de> Deserialize<'de> for Code {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        match Value::deserialize(deserializer)? {
            Value::String(s) => Ok(Self(s)),
            Value::Number(n) => Ok(Self(n.to_string())),
            other => Err(de::Error::custom(format!(
                "expected string or number code, got {other}"
            ))),
        }
    }
}

/// Outer `{code, msg, data}` envelope returned by every endpoint.
#[derive(Debug, Deserialize)]
pub(crate) struct Envelope {
    pub code: Code,
    #[serde(default)]
    pub msg: Option<String>,
    #[serde(default)]
    pub data: Value,
}

/// `42` or `"42"` as a `u8`; anything else, including out-of-range, is `None`.
fn u8_from_value(value: &Value) -> Option<u8> {
    match value {
        Value::Number(n) => n.as_u64().and_then(|v| u8::try_from(v).ok()),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn lenient_u8<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<u8>, D::Error> {
    Ok(Option::<Value>::deserialize(deserializer)?
        .as_ref()
        .and_then(u8_from_value))
}

// ── Device list ─────────────────────────────────────────────────────

/// One bound robot as reported by `robot/deviceList`.
///
/// Older accounts return bare nicknames; newer ones return objects.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DeviceEntry {
    Nickname(String),
    Detailed(DeviceRecord),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceRecord {
    /// The identifier the control endpoint addresses the robot by.
    pub nick_name: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, alias = "class")]
    pub model: Option<String>,
    #[serde(default, deserialize_with = "lenient_u8")]
    pub battery: Option<u8>,
}

impl DeviceEntry {
    pub fn nick_name(&self) -> &str {
        match self {
            Self::Nickname(n) => n,
            Self::Detailed(r) => &r.nick_name,
        }
    }
}

// ── Control ─────────────────────────────────────────────────────────

/// `data` of a `robot/ctl` response: the robot's own envelope around
/// `{ ctl: { data: { ret, ... } } }`.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct CtlResponse {
    #[serde(default)]
    pub code: Option<Code>,
    #[serde(default)]
    pub msg: Option<String>,
    #[serde(default)]
    pub data: CtlBody,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct CtlBody {
    #[serde(default)]
    pub ctl: CtlOuter,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct CtlOuter {
    #[serde(default)]
    pub data: CtlPayload,
}

/// The robot's reply to a control or state query.
///
/// `ret` is `"ok"` on success; the remaining fields depend on the command
/// (`st` for clean state, `type` / `power` for charge state).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CtlPayload {
    #[serde(default)]
    pub ret: String,
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl CtlPayload {
    pub fn is_ok(&self) -> bool {
        self.ret == "ok"
    }

    /// A string field of the reply, e.g. `st` or `type`.
    pub fn field_str(&self, key: &str) -> Option<&str> {
        self.fields.get(key).and_then(Value::as_str)
    }

    /// A small unsigned field, accepting both `42` and `"42"`.
    pub fn field_u8(&self, key: &str) -> Option<u8> {
        self.fields.get(key).and_then(u8_from_value)
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use serde_json::json;

    use super::*;

    #[test]
    fn code_accepts_numbers_and_strings() {
        let n: Envelope = serde_json::from_value(json!({"code": 0, "msg": "ok"})).unwrap();
        let s: Envelope =
            serde_json::from_value(json!({"code": "ALREADY_DOCKED", "msg": "docked"})).unwrap();
        assert!(n.code.is_success());
        assert_eq!(s.code.0, "ALREADY_DOCKED");
        assert!(n.data.is_null());
    }

    #[test]
    fn null_or_missing_msg_is_tolerated() {
        let null: Envelope = serde_json::from_value(json!({"code": 0, "msg": null})).unwrap();
        let missing: Envelope = serde_json::from_value(json!({"code": 0})).unwrap();
        assert_eq!(null.msg, None);
        assert_eq!(missing.msg, None);
    }

    #[test]
    fn battery_accepts_strings_and_ignores_garbage() {
        let entries: Vec<DeviceEntry> = serde_json::from_value(json!([
            { "nickName": "Hall", "battery": "80" },
            { "nickName": "Attic", "battery": 300 },
            { "nickName": "Porch", "battery": "full" },
            { "nickName": "Shed", "battery": null }
        ]))
        .unwrap();
        let batteries: Vec<Option<u8>> = entries
            .iter()
            .map(|e| match e {
                DeviceEntry::Detailed(r) => r.battery,
                DeviceEntry::Nickname(_) => panic!("expected detailed entry"),
            })
            .collect();
        assert_eq!(batteries, vec![Some(80), None, None, None]);
    }

    #[test]
    fn device_entries_accept_both_shapes() {
        let entries: Vec<DeviceEntry> = serde_json::from_value(json!([
            "Living Room",
            { "nickName": "Bedroom", "class": "DEEBOT T8", "battery": 80 }
        ]))
        .unwrap();
        assert_eq!(entries[0], DeviceEntry::Nickname("Living Room".into()));
        let DeviceEntry::Detailed(rec) = &entries[1] else {
            panic!("expected detailed entry");
        };
        assert_eq!(rec.model.as_deref(), Some("DEEBOT T8"));
        assert_eq!(rec.battery, Some(80));
        assert_eq!(entries[1].nick_name(), "Bedroom");
    }

    #[test]
    fn ctl_payload_exposes_command_fields() {
        let resp: CtlResponse = serde_json::from_value(json!({
            "code": 0,
            "msg": "ok",
            "data": { "ctl": { "data": { "ret": "ok", "type": "SlotCharging", "power": "77" } } }
        }))
        .unwrap();
        let payload = resp.data.ctl.data;
        assert!(payload.is_ok());
        assert_eq!(payload.field_str("type"), Some("SlotCharging"));
        assert_eq!(payload.field_u8("power"), Some(77));
        assert_eq!(payload.field_str("st"), None);
    }

    #[test]
    fn missing_ctl_block_yields_empty_ret() {
        let resp: CtlResponse = serde_json::from_value(json!({ "code": 0, "msg": "ok" })).unwrap();
        assert!(!resp.data.ctl.data.is_ok());
    }
}
