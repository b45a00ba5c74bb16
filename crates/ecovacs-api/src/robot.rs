// Robot endpoints: device discovery and the `robot/ctl` command channel.

use reqwest::Method;
use secrecy::SecretString;
use serde_json::Value;
use tracing::debug;

use crate::client::EcovacsClient;
use crate::error::Error;
use crate::models::{CtlPayload, CtlResponse, DeviceEntry};

pub const ENDPOINT_DEVICE_LIST: &str = "robot/deviceList";
pub const ENDPOINT_CONTROL: &str = "robot/ctl";

pub const CMD_CLEAN: &str = "Clean";
pub const CMD_CHARGE: &str = "Charge";
pub const CMD_GET_CLEAN_STATE: &str = "GetCleanState";
pub const CMD_GET_CHARGE_STATE: &str = "GetChargeState";

/// `act` values accepted by the `Clean` command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CleanAction {
    Start,
    Pause,
    Resume,
    Stop,
}

impl CleanAction {
    pub fn code(self) -> &'static str {
        match self {
            Self::Start => "s",
            Self::Pause => "p",
            Self::Resume => "r",
            Self::Stop => "h",
        }
    }
}

/// `act` values accepted by the `Charge` command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChargeAction {
    ReturnToDock,
    CancelReturn,
}

impl ChargeAction {
    pub fn code(self) -> &'static str {
        match self {
            Self::ReturnToDock => "go",
            Self::CancelReturn => "stopGo",
        }
    }
}

impl EcovacsClient {
    /// List the robots bound to the account.
    ///
    /// `data` is normally an array; some accounts get an object keyed by
    /// nickname instead, in which case the keys are the devices.
    pub async fn device_list(&self, ak: &SecretString) -> Result<Vec<DeviceEntry>, Error> {
        let data = self.call(Method::GET, ENDPOINT_DEVICE_LIST, &[], ak).await?;
        let entries = match data {
            Value::Null => Vec::new(),
            Value::Object(map) => map.into_iter().map(|(k, _)| DeviceEntry::Nickname(k)).collect(),
            other => serde_json::from_value(other.clone()).map_err(|e| Error::Deserialization {
                message: format!("device list: {e}"),
                body: other.to_string(),
            })?,
        };
        debug!(count = entries.len(), "device list fetched");
        Ok(entries)
    }

    /// Start, pause, resume or stop cleaning.
    pub async fn set_cleaning(
        &self,
        ak: &SecretString,
        nick_name: &str,
        action: CleanAction,
    ) -> Result<CtlPayload, Error> {
        debug!(?action, act = action.code(), "clean action");
        self.control(ak, nick_name, CMD_CLEAN, action.code()).await
    }

    /// Send the robot to its dock or cancel the return.
    pub async fn set_charging(
        &self,
        ak: &SecretString,
        nick_name: &str,
        action: ChargeAction,
    ) -> Result<CtlPayload, Error> {
        debug!(?action, act = action.code(), "charge action");
        self.control(ak, nick_name, CMD_CHARGE, action.code()).await
    }

    /// Query the cleaning state. The reply carries `st`: `s` cleaning,
    /// `p` paused, `h` idle.
    pub async fn clean_state(&self, ak: &SecretString, nick_name: &str) -> Result<CtlPayload, Error> {
        self.control(ak, nick_name, CMD_GET_CLEAN_STATE, "").await
    }

    /// Query the charging state. The reply carries `type`
    /// (e.g. `Idle`, `SlotCharging`, `WireCharging`).
    pub async fn charge_state(&self, ak: &SecretString, nick_name: &str) -> Result<CtlPayload, Error> {
        self.control(ak, nick_name, CMD_GET_CHARGE_STATE, "").await
    }

    async fn control(
        &self,
        ak: &SecretString,
        nick_name: &str,
        cmd: &str,
        act: &str,
    ) -> Result<CtlPayload, Error> {
        let params = [("nickName", nick_name), ("cmd", cmd), ("act", act)];
        let data = self.call(Method::POST, ENDPOINT_CONTROL, &params, ak).await?;
        check_ctl_response(data)
    }
}

/// Unwrap the robot's inner envelope and insist on `ret == "ok"`.
fn check_ctl_response(data: Value) -> Result<CtlPayload, Error> {
    let resp: CtlResponse = if data.is_null() {
        CtlResponse::default()
    } else {
        serde_json::from_value(data.clone()).map_err(|e| Error::Deserialization {
            message: format!("control response: {e}"),
            body: data.to_string(),
        })?
    };

    if let Some(code) = resp.code.filter(|c| !c.is_success()) {
        return Err(Error::Api {
            code: code.0,
            message: resp.msg.unwrap_or_default(),
        });
    }

    let payload = resp.data.ctl.data;
    if !payload.is_ok() {
        return Err(Error::ControlRejected { ret: payload.ret });
    }
    Ok(payload)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn action_codes_match_vendor_vocabulary() {
        let clean: Vec<_> = [
            CleanAction::Start,
            CleanAction::Pause,
            CleanAction::Resume,
            CleanAction::Stop,
        ]
        .into_iter()
        .map(CleanAction::code)
        .collect();
        assert_eq!(clean, ["s", "p", "r", "h"]);
        assert_eq!(ChargeAction::ReturnToDock.code(), "go");
        assert_eq!(ChargeAction::CancelReturn.code(), "stopGo");
    }

    #[test]
    fn inner_business_code_is_an_api_error() {
        let err = check_ctl_response(json!({ "code": 30006, "msg": "robot offline" }))
            .expect_err("non-zero inner code must fail");
        assert!(matches!(err, Error::Api { ref code, .. } if code == "30006"));
    }

    #[test]
    fn non_ok_ret_is_rejected() {
        let err = check_ctl_response(json!({
            "code": 0, "msg": "ok",
            "data": { "ctl": { "data": { "ret": "fail" } } }
        }))
        .expect_err("ret=fail must be rejected");
        assert!(matches!(err, Error::ControlRejected { ref ret } if ret == "fail"));
    }
}
