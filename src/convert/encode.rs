//! Typed value to JSON.

use serde_json::{Map, Number, Value};

use super::value::{DynamicValue, TypedObject};
use crate::schema::RuntimeTypeData;

/// Whether null-valued properties are written.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum NullHandling {
    #[default]
    Omit,
    Include,
}

impl NullHandling {
    pub fn from_include(include_nulls: bool) -> Self {
        if include_nulls { Self::Include } else { Self::Omit }
    }
}

/// Encode `value` against an optional descriptor.
///
/// A null value is a JSON null, never an empty object.
pub fn encode(
    value: &DynamicValue,
    descriptor: Option<&RuntimeTypeData>,
    nulls: NullHandling,
) -> Value {
    match value {
        DynamicValue::Null => Value::Null,
        DynamicValue::Bool(b) => Value::Bool(*b),
        DynamicValue::Integer(i) => Value::from(*i),
        DynamicValue::Unsigned(u) => Value::from(*u),
        DynamicValue::Number(n) => Number::from_f64(*n).map_or(Value::Null, Value::Number),
        DynamicValue::String(s) => Value::String(s.clone()),
        DynamicValue::Array(items) => {
            let element = descriptor.and_then(RuntimeTypeData::element_type);
            Value::Array(items.iter().map(|item| encode(item, element, nulls)).collect())
        }
        DynamicValue::Object(object) => Value::Object(encode_object(object, descriptor, nulls)),
    }
}

/// Encode a shaped value's properties.
///
/// Keys are the property names unless the descriptor renames them.
/// Properties marked `skip_serializing` are left out, as are nulls under
/// [`NullHandling::Omit`].
pub fn encode_object(
    object: &TypedObject,
    descriptor: Option<&RuntimeTypeData>,
    nulls: NullHandling,
) -> Map<String, Value> {
    let mut map = Map::new();
    for (name, value) in object.iter() {
        if value.is_null() && nulls == NullHandling::Omit {
            continue;
        }

        let property = descriptor.and_then(|d| d.property(name));
        if property.is_some_and(|p| p.skip_serializing) {
            continue;
        }

        let key = property
            .and_then(|p| p.json_name.as_deref())
            .unwrap_or(name);
        let nested = property.and_then(|p| p.type_data.as_ref());
        map.insert(key.to_string(), encode(value, nested, nulls));
    }
    map
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::convert::decode;
    use crate::schema::{ParameterData, TypeTag};
    use serde_json::json;

    fn renamed() -> RuntimeTypeData {
        RuntimeTypeData::new(TypeTag::shape("Sample"))
            .with_property(
                ParameterData::new("property")
                    .with_json_name("prop")
                    .with_tag(TypeTag::String),
            )
            .with_property(ParameterData::new("booleanproperty").with_tag(TypeTag::Boolean))
    }

    #[test]
    fn test_rename_round_trips_byte_for_byte() {
        let input = r#"{"prop":"test","booleanproperty":true}"#;
        let descriptor = renamed();

        let decoded = decode(&serde_json::from_str(input).unwrap(), Some(&descriptor));
        let object = decoded.as_object().unwrap();
        assert_eq!(object.get("property"), Some(&DynamicValue::from("test")));

        let encoded = encode(&decoded, Some(&descriptor), NullHandling::Omit);
        assert_eq!(serde_json::to_string(&encoded).unwrap(), input);
    }

    #[test]
    fn test_unsigned_beyond_i64_round_trips() {
        let wire = json!({"big": u64::MAX, "small": -3});
        let untyped = encode(&decode(&wire, None), None, NullHandling::Omit);
        assert_eq!(untyped, wire);
        assert_eq!(
            serde_json::to_string(&untyped).unwrap(),
            r#"{"big":18446744073709551615,"small":-3}"#
        );

        let counter = RuntimeTypeData::new(TypeTag::shape("Counter")).with_property(
            ParameterData::new("Total")
                .with_json_name("big")
                .with_tag(TypeTag::Integer),
        );
        let decoded = decode(&json!({"big": u64::MAX}), Some(&counter));
        assert_eq!(
            decoded.as_object().unwrap().get("Total"),
            Some(&DynamicValue::Unsigned(u64::MAX))
        );
        assert_eq!(
            encode(&decoded, Some(&counter), NullHandling::Omit),
            json!({"big": u64::MAX})
        );
    }

    #[test]
    fn test_nulls_omitted_unless_requested() {
        let object = TypedObject::new()
            .with("property", "x")
            .with("booleanproperty", DynamicValue::Null);
        let value = DynamicValue::Object(object);

        assert_eq!(
            encode(&value, Some(&renamed()), NullHandling::Omit),
            json!({"prop": "x"})
        );
        assert_eq!(
            encode(&value, Some(&renamed()), NullHandling::Include),
            json!({"prop": "x", "booleanproperty": null})
        );
    }

    #[test]
    fn test_null_value_is_json_null() {
        assert_eq!(
            encode(&DynamicValue::Null, Some(&renamed()), NullHandling::Omit),
            Value::Null
        );
    }

    #[test]
    fn test_skip_serializing_property() {
        let descriptor = renamed().with_property(ParameterData::new("Secret").skip_serializing());
        let value = DynamicValue::Object(
            TypedObject::new()
                .with("property", "x")
                .with("Secret", "hunter2"),
        );

        assert_eq!(
            encode(&value, Some(&descriptor), NullHandling::Omit),
            json!({"prop": "x"})
        );
    }

    #[test]
    fn test_nested_collection_renames() {
        let descriptor = RuntimeTypeData::new(TypeTag::shape("Page")).with_property(
            ParameterData::new("Values")
                .with_json_name("value")
                .with_type(RuntimeTypeData::array_of(renamed())),
        );
        let value = DynamicValue::Object(TypedObject::new().with(
            "Values",
            vec![
                DynamicValue::Object(TypedObject::new().with("property", "a")),
                DynamicValue::Object(TypedObject::new().with("booleanproperty", false)),
            ],
        ));

        assert_eq!(
            encode(&value, Some(&descriptor), NullHandling::Omit),
            json!({"value": [{"prop": "a"}, {"booleanproperty": false}]})
        );
    }

    #[test]
    fn test_unknown_property_uses_own_name() {
        let value = DynamicValue::Object(TypedObject::new().with("Unlisted", 3_i64));
        assert_eq!(
            encode(&value, Some(&renamed()), NullHandling::Omit),
            json!({"Unlisted": 3})
        );
    }
}
