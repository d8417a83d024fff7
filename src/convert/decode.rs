//! JSON to typed value.

use serde_json::{Map, Value};

use super::value::{DynamicValue, TypedObject};
use crate::schema::{RuntimeTypeData, TypeTag};

/// Decode `value` against an optional descriptor.
///
/// Never fails: values that cannot take the described type decode to null.
pub fn decode(value: &Value, descriptor: Option<&RuntimeTypeData>) -> DynamicValue {
    coerce(value, descriptor).unwrap_or_default()
}

/// Decode a JSON object into the shape described by `descriptor`.
///
/// Every declared property starts out null. Each source key is matched to a
/// property by name, then by JSON rename, ignoring case. Unmatched keys are
/// dropped; values of the wrong type leave the property null.
pub fn decode_object(map: &Map<String, Value>, descriptor: &RuntimeTypeData) -> TypedObject {
    let mut object = TypedObject::with_capacity(descriptor.properties.len());
    for property in descriptor.properties.values() {
        object.set(property.name.clone(), DynamicValue::Null);
    }

    for (key, raw) in map {
        let Some(target) = descriptor
            .property(key)
            .or_else(|| descriptor.find_by_json_name(key))
        else {
            crate::debug_event!("convert", "dropped", "unknown key '{key}'");
            continue;
        };

        match coerce(raw, target.type_data.as_ref()) {
            Some(value) => object.set(target.name.clone(), value),
            None => crate::debug_event!(
                "convert",
                "mismatch",
                "'{key}' cannot hold {}",
                target.type_tag().map(TypeTag::as_str).unwrap_or("value")
            ),
        }
    }

    object
}

fn coerce(value: &Value, descriptor: Option<&RuntimeTypeData>) -> Option<DynamicValue> {
    let Some(descriptor) = descriptor.filter(|d| !d.is_pass_through()) else {
        return Some(DynamicValue::from_json(value));
    };
    let tag = descriptor.type_tag.as_ref();

    match value {
        Value::Null => Some(DynamicValue::Null),
        Value::Object(map) if accepts_object(tag) => {
            if descriptor.properties.is_empty() {
                Some(DynamicValue::from_json(value))
            } else {
                Some(DynamicValue::Object(decode_object(map, descriptor)))
            }
        }
        Value::Array(items) if accepts_array(tag) => Some(DynamicValue::Array(
            items
                .iter()
                .map(|item| decode(item, descriptor.element_type()))
                .collect(),
        )),
        scalar => coerce_scalar(scalar, tag),
    }
}

fn accepts_object(tag: Option<&TypeTag>) -> bool {
    matches!(tag, None | Some(TypeTag::Object) | Some(TypeTag::Shape(_)))
}

fn accepts_array(tag: Option<&TypeTag>) -> bool {
    matches!(tag, None | Some(TypeTag::Array))
}

fn coerce_scalar(value: &Value, tag: Option<&TypeTag>) -> Option<DynamicValue> {
    match (tag, value) {
        (None, v) => Some(DynamicValue::from_json(v)),
        (Some(TypeTag::Boolean), Value::Bool(b)) => Some(DynamicValue::Bool(*b)),
        (Some(TypeTag::Integer), Value::Number(n)) => n
            .as_i64()
            .map(DynamicValue::Integer)
            .or_else(|| n.as_u64().map(DynamicValue::Unsigned)),
        (Some(TypeTag::Number), Value::Number(n)) => n.as_f64().map(DynamicValue::Number),
        (Some(TypeTag::String), Value::String(s)) => Some(DynamicValue::String(s.clone())),
        _ => None,
    }
}
