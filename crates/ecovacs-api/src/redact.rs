// Redaction for HTTP trace logging.
//
// Works on the parsed JSON tree rather than on the rendered text, so a key
// only gets masked where it is actually a field name.

use serde_json::Value;

const SENSITIVE_KEYS: &[&str] = &["ak", "nickName", "cmd", "act"];
const MASK: &str = "XXXXXXXXX";

/// Clone `value`, masking every non-empty string stored under a sensitive key.
pub(crate) fn redact_value(value: &Value) -> Value {
    match value {
        Value::Object(map) => Value::Object(
            map.iter()
                .map(|(k, v)| {
                    let masked = match v {
                        Value::String(s)
                            if !s.is_empty() && SENSITIVE_KEYS.contains(&k.as_str()) =>
                        {
                            Value::String(MASK.into())
                        }
                        other => redact_value(other),
                    };
                    (k.clone(), masked)
                })
                .collect(),
        ),
        Value::Array(items) => Value::Array(items.iter().map(redact_value).collect()),
        other => other.clone(),
    }
}

/// Render a response body for logging. Bodies that are not JSON are
/// summarized rather than echoed.
pub(crate) fn redact_body(body: &str) -> String {
    serde_json::from_str::<Value>(body).map_or_else(
        |_| format!("<non-JSON body, {} bytes>", body.len()),
        |v| redact_value(&v).to_string(),
    )
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn masks_sensitive_fields_at_any_depth() {
        let input = json!({
            "ak": "secret-key",
            "nickName": "Kitchen",
            "data": { "ctl": { "data": { "ret": "ok", "act": "s" } } },
            "list": [{ "cmd": "Clean" }]
        });
        let out = redact_value(&input);
        assert_eq!(out["ak"], MASK);
        assert_eq!(out["nickName"], MASK);
        assert_eq!(out["data"]["ctl"]["data"]["act"], MASK);
        assert_eq!(out["data"]["ctl"]["data"]["ret"], "ok");
        assert_eq!(out["list"][0]["cmd"], MASK);
    }

    #[test]
    fn leaves_empty_values_alone() {
        let out = redact_value(&json!({ "act": "" }));
        assert_eq!(out["act"], "");
    }

    #[test]
    fn non_json_body_is_summarized() {
        assert_eq!(redact_body("<html>"), "<non-JSON body, 6 bytes>");
        assert!(!redact_body(r#"{"ak":"k"}"#).contains("\"k\""));
    }
}
