//! Translation of the `__reserved` parameter.
//!
//! ```json
//! "__reserved": {
//!     "credentials": {"type": "azure", "tenantId": "..."} | [ {...}, {...} ],
//!     "httpResponse": true
//! }
//! ```

use serde_json::{Map, Value};

use super::error::CredentialError;
use super::request::{
    DEFAULT_CREDENTIAL_TYPE, LiveTestCredentials, LiveTestRequest, RESERVED_PARAM, ReservedParams,
};

pub const CREDENTIALS_KEY: &str = "credentials";
pub const HTTP_RESPONSE_KEY: &str = "httpResponse";
pub const CREDENTIAL_TYPE_KEY: &str = "type";

/// Replace the generic `__reserved` value with typed fields on the request.
///
/// Credentials become [`LiveTestCredentials`] in array order; the
/// `httpResponse` flag moves to [`LiveTestRequest::http_response`]. Other
/// reserved keys are kept in [`ReservedParams::extra`]. A request without
/// `__reserved` is left untouched.
pub fn translate_credentials(request: &mut LiveTestRequest) -> Result<(), CredentialError> {
    let Some(key) = request
        .params
        .keys()
        .find(|k| k.eq_ignore_ascii_case(RESERVED_PARAM))
        .cloned()
    else {
        return Ok(());
    };

    let raw = request.params.shift_remove(&key).unwrap_or_default();
    let mut bag = match raw {
        Value::Object(map) => map,
        Value::Null => Map::new(),
        _ => return Err(CredentialError::InvalidReserved),
    };

    let credentials = match take_key(&mut bag, CREDENTIALS_KEY) {
        Some(value) => translate_credentials_value(value)?,
        None => Vec::new(),
    };

    if let Some(flag) = take_key(&mut bag, HTTP_RESPONSE_KEY) {
        match flag {
            Value::Bool(enabled) => request.http_response = enabled,
            other => tracing::warn!(
                "[credentials] ignoring non-boolean {HTTP_RESPONSE_KEY} value {other}"
            ),
        }
    }

    crate::debug_event!(
        "credentials",
        "translated",
        "request {}: {} credential(s), httpResponse={}",
        request.id,
        credentials.len(),
        request.http_response
    );

    request.reserved = Some(ReservedParams {
        credentials,
        extra: bag,
    });
    Ok(())
}

/// Translate a credentials value: one object or an array of objects.
pub fn translate_credentials_value(
    value: Value,
) -> Result<Vec<LiveTestCredentials>, CredentialError> {
    match value {
        Value::Object(map) => Ok(vec![translate_entry(map)?]),
        Value::Array(items) => items
            .into_iter()
            .enumerate()
            .map(|(index, item)| match item {
                Value::Object(map) => translate_entry(map),
                _ => Err(CredentialError::InvalidCredentialEntry { index }),
            })
            .collect(),
        Value::Null => Ok(Vec::new()),
        _ => Err(CredentialError::InvalidCredentials),
    }
}

fn translate_entry(mut map: Map<String, Value>) -> Result<LiveTestCredentials, CredentialError> {
    let type_tag = match take_key(&mut map, CREDENTIAL_TYPE_KEY) {
        Some(Value::String(tag)) => tag,
        Some(Value::Null) | None => DEFAULT_CREDENTIAL_TYPE.to_string(),
        Some(_) => return Err(CredentialError::InvalidTypeTag),
    };

    Ok(LiveTestCredentials {
        type_tag,
        properties: map.into_iter().collect(),
    })
}

/// Remove a key, matching its name case-insensitively.
fn take_key(map: &mut Map<String, Value>, key: &str) -> Option<Value> {
    let actual = map.keys().find(|k| k.eq_ignore_ascii_case(key))?.clone();
    map.shift_remove(&actual)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn request(reserved: Value) -> LiveTestRequest {
        LiveTestRequest::new("1", "Widgets_Get")
            .with_param("widgetName", json!("w"))
            .with_param(RESERVED_PARAM, reserved)
    }

    #[test]
    fn test_single_object_gets_default_tag() {
        let mut req = request(json!({
            "credentials": {"tenantId": "t", "clientId": "c"}
        }));
        translate_credentials(&mut req).unwrap();

        let creds = req.credentials();
        assert_eq!(creds.len(), 1);
        assert_eq!(creds[0].type_tag, DEFAULT_CREDENTIAL_TYPE);
        assert_eq!(creds[0].property("tenantid"), Some(&json!("t")));
        assert_eq!(creds[0].properties.len(), 2);
        assert!(!req.params.contains_key(RESERVED_PARAM));
    }

    #[test]
    fn test_array_keeps_order_and_explicit_tags() {
        let mut req = request(json!({
            "credentials": [
                {"type": "custom", "token": "a"},
                {"secret": "b"}
            ]
        }));
        translate_credentials(&mut req).unwrap();

        let creds = req.credentials();
        assert_eq!(creds.len(), 2);
        assert_eq!(creds[0].type_tag, "custom");
        assert_eq!(creds[0].property("token"), Some(&json!("a")));
        assert!(creds[0].property("type").is_none());
        assert_eq!(creds[1].type_tag, DEFAULT_CREDENTIAL_TYPE);
    }

    #[test]
    fn test_http_response_flag_is_lifted() {
        let mut req = request(json!({"httpResponse": true, "trace": "x"}));
        translate_credentials(&mut req).unwrap();

        assert!(req.http_response);
        let reserved = req.reserved.as_ref().unwrap();
        assert!(reserved.credentials.is_empty());
        assert!(!reserved.extra.contains_key(HTTP_RESPONSE_KEY));
        assert_eq!(reserved.extra.get("trace"), Some(&json!("x")));
    }

    #[test]
    fn test_no_reserved_param_is_noop() {
        let mut req = LiveTestRequest::new("1", "m").with_param("a", json!(1));
        translate_credentials(&mut req).unwrap();
        assert!(req.reserved.is_none());
        assert_eq!(req.params.len(), 1);
    }

    #[test]
    fn test_invalid_shapes() {
        let mut req = request(json!("nope"));
        assert_eq!(
            translate_credentials(&mut req),
            Err(CredentialError::InvalidReserved)
        );

        let mut req = request(json!({"credentials": [{"a": 1}, 5]}));
        assert_eq!(
            translate_credentials(&mut req),
            Err(CredentialError::InvalidCredentialEntry { index: 1 })
        );

        let mut req = request(json!({"credentials": {"type": 3}}));
        assert_eq!(
            translate_credentials(&mut req),
            Err(CredentialError::InvalidTypeTag)
        );
    }
}
