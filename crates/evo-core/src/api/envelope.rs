//! Normalization of the backends' inconsistent response envelopes.
//!
//! Responses arrive as `{data: ...}`, as a raw array, as `{accounts: ...}` /
//! `{groups: ...}`, or as `{success: false, message|error, details?}`. Every
//! call funnels through [`normalize`] so callers only ever see the payload or
//! an [`ApiError`].

use serde_json::Value;

use crate::error::{ApiError, ApiResult};

/// Turn a status code and a decoded body into the payload or an error.
///
/// `list_key` names the wrapper key used by the endpoint besides `data`.
pub fn normalize(status: u16, body: Value, list_key: Option<&str>) -> ApiResult<Value> {
    if status == 403 {
        return Err(ApiError::Forbidden);
    }

    if let Some(message) = rejection(&body) {
        return Err(ApiError::Rejected { message });
    }

    if !(200..300).contains(&status) {
        return Err(ApiError::Status {
            status,
            message: loose_message(&body).unwrap_or_default(),
        });
    }

    Ok(unwrap_payload(body, list_key))
}

/// `{success: false, ...}` bodies become their message.
fn rejection(body: &Value) -> Option<String> {
    let object = body.as_object()?;
    if object.get("success").and_then(Value::as_bool) != Some(false) {
        return None;
    }

    let mut message = ["message", "error"]
        .iter()
        .filter_map(|key| object.get(*key).and_then(Value::as_str))
        .find(|m| !m.trim().is_empty())
        .unwrap_or_default()
        .to_string();

    if let Some(details) = object.get("details").filter(|d| !d.is_null()) {
        let details = match details {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        };
        if !details.is_empty() {
            message = if message.is_empty() {
                details
            } else {
                format!("{message} ({details})")
            };
        }
    }

    Some(message)
}

/// Best-effort message from an error body that isn't a business envelope.
fn loose_message(body: &Value) -> Option<String> {
    match body {
        Value::String(s) => Some(s.trim().to_string()),
        Value::Object(object) => ["message", "error", "detail"]
            .iter()
            .filter_map(|key| object.get(*key).and_then(Value::as_str))
            .map(str::to_string)
            .next(),
        _ => None,
    }
}

fn unwrap_payload(body: Value, list_key: Option<&str>) -> Value {
    match body {
        Value::Object(mut object) => {
            if let Some(data) = object.remove("data") {
                return data;
            }
            if let Some(key) = list_key {
                if let Some(list) = object.remove(key) {
                    return list;
                }
            }
            Value::Object(object)
        }
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn forbidden_wins_over_body() {
        let err = normalize(403, json!({"data": []}), None).unwrap_err();
        assert!(err.is_forbidden());
    }

    #[test]
    fn rejected_prefers_message_then_error_with_details() {
        let err = normalize(200, json!({"success": false, "message": "Token inválido"}), None)
            .unwrap_err();
        assert_eq!(err.to_string(), "Token inválido");

        let err = normalize(
            400,
            json!({"success": false, "error": "Conta duplicada", "details": "subdomain"}),
            None,
        )
        .unwrap_err();
        assert_eq!(err.to_string(), "Conta duplicada (subdomain)");
    }

    #[test]
    fn plain_failure_is_status() {
        match normalize(500, json!("boom"), None).unwrap_err() {
            ApiError::Status { status, message } => {
                assert_eq!(status, 500);
                assert_eq!(message, "boom");
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn unwraps_data_then_list_key_then_raw() {
        assert_eq!(normalize(200, json!({"data": [1]}), None).unwrap(), json!([1]));
        assert_eq!(
            normalize(200, json!({"accounts": [2], "total": 1}), Some("accounts")).unwrap(),
            json!([2])
        );
        assert_eq!(normalize(200, json!([3]), Some("groups")).unwrap(), json!([3]));
        assert_eq!(
            normalize(201, json!({"success": true, "message": "ok"}), None).unwrap(),
            json!({"success": true, "message": "ok"})
        );
    }
}
