//! JSON-RPC request envelope.

use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

pub const JSONRPC_VERSION: &str = "2.0";

/// Parameter carrying protocol metadata rather than an operation argument.
pub const RESERVED_PARAM: &str = "__reserved";

/// Provider tag used when a credential block has no `type`.
pub const DEFAULT_CREDENTIAL_TYPE: &str = "azure";

/// An incoming request.
///
/// `http_response` and `reserved` are filled in by
/// [`translate_credentials`](super::translate_credentials) and never read
/// from the wire directly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LiveTestRequest {
    #[serde(default = "default_jsonrpc")]
    pub jsonrpc: String,

    #[serde(deserialize_with = "deserialize_id")]
    pub id: String,

    pub method: String,

    #[serde(default)]
    pub params: IndexMap<String, Value>,

    /// Echo the last traced HTTP status and headers in the response.
    #[serde(skip)]
    pub http_response: bool,

    #[serde(skip)]
    pub reserved: Option<ReservedParams>,
}

impl LiveTestRequest {
    pub fn new(id: impl Into<String>, method: impl Into<String>) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_string(),
            id: id.into(),
            method: method.into(),
            params: IndexMap::new(),
            http_response: false,
            reserved: None,
        }
    }

    pub fn with_param(mut self, name: impl Into<String>, value: Value) -> Self {
        self.params.insert(name.into(), value);
        self
    }

    /// Operation parameters, excluding the reserved bag.
    pub fn operation_params(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.params
            .iter()
            .filter(|(k, _)| !k.eq_ignore_ascii_case(RESERVED_PARAM))
            .map(|(k, v)| (k.as_str(), v))
    }

    /// Typed credentials, empty until translated.
    pub fn credentials(&self) -> &[LiveTestCredentials] {
        self.reserved
            .as_ref()
            .map(|r| r.credentials.as_slice())
            .unwrap_or_default()
    }
}

fn default_jsonrpc() -> String {
    JSONRPC_VERSION.to_string()
}

/// Ids are strings on this protocol; numeric ids are accepted and stringified.
fn deserialize_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        other => Err(serde::de::Error::custom(format!(
            "request id must be a string, got {other}"
        ))),
    }
}

/// Translated contents of the `__reserved` parameter.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReservedParams {
    pub credentials: Vec<LiveTestCredentials>,
    /// Keys the translator does not interpret, passed through unchanged.
    pub extra: Map<String, Value>,
}

/// One credential block: a provider tag plus an open property bag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LiveTestCredentials {
    #[serde(rename = "type")]
    pub type_tag: String,

    #[serde(flatten)]
    pub properties: IndexMap<String, Value>,
}

impl Default for LiveTestCredentials {
    fn default() -> Self {
        Self::new(DEFAULT_CREDENTIAL_TYPE)
    }
}

impl LiveTestCredentials {
    pub fn new(type_tag: impl Into<String>) -> Self {
        Self {
            type_tag: type_tag.into(),
            properties: IndexMap::new(),
        }
    }

    pub fn with_property(mut self, name: impl Into<String>, value: Value) -> Self {
        self.properties.insert(name.into(), value);
        self
    }

    /// Case-insensitive property lookup.
    pub fn property(&self, name: &str) -> Option<&Value> {
        self.properties
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_deserialize_request() {
        let request: LiveTestRequest = serde_json::from_value(json!({
            "jsonrpc": "2.0",
            "id": "7",
            "method": "Widgets_Get",
            "params": {"widgetName": "w1", "__reserved": {"httpResponse": true}}
        }))
        .unwrap();

        assert_eq!(request.id, "7");
        assert_eq!(request.method, "Widgets_Get");
        assert!(!request.http_response);
        assert_eq!(
            request.operation_params().collect::<Vec<_>>(),
            vec![("widgetName", &json!("w1"))]
        );
    }

    #[test]
    fn test_numeric_id_is_stringified() {
        let request: LiveTestRequest =
            serde_json::from_value(json!({"id": 12, "method": "m"})).unwrap();
        assert_eq!(request.id, "12");
        assert_eq!(request.jsonrpc, "2.0");
        assert!(request.params.is_empty());
    }

    #[test]
    fn test_object_id_is_rejected() {
        let result: Result<LiveTestRequest, _> =
            serde_json::from_value(json!({"id": {}, "method": "m"}));
        assert!(result.is_err());
    }

    #[test]
    fn test_credentials_serialize_flat() {
        let creds = LiveTestCredentials::default().with_property("tenantId", json!("t"));
        assert_eq!(
            serde_json::to_value(&creds).unwrap(),
            json!({"type": "azure", "tenantId": "t"})
        );
        assert_eq!(creds.property("TENANTID"), Some(&json!("t")));
    }
}
