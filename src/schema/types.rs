//! Type descriptors: how a shape's properties map to JSON keys.

use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize};

/// Native type of a value described by a [`RuntimeTypeData`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum TypeTag {
    Boolean,
    Integer,
    Number,
    String,
    Array,
    /// Untyped map.
    Object,
    /// A named object shape.
    Shape(String),
}

impl TypeTag {
    pub fn shape(name: impl Into<String>) -> Self {
        TypeTag::Shape(name.into())
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Boolean => "boolean",
            Self::Integer => "integer",
            Self::Number => "number",
            Self::String => "string",
            Self::Array => "array",
            Self::Object => "object",
            Self::Shape(name) => name.as_str(),
        }
    }
}

impl From<String> for TypeTag {
    fn from(raw: String) -> Self {
        match raw.to_ascii_lowercase().as_str() {
            "boolean" | "bool" => Self::Boolean,
            "integer" | "int" | "long" => Self::Integer,
            "number" | "double" | "float" => Self::Number,
            "string" => Self::String,
            "array" => Self::Array,
            "object" | "map" => Self::Object,
            _ => Self::Shape(raw),
        }
    }
}

impl From<TypeTag> for String {
    fn from(tag: TypeTag) -> Self {
        tag.as_str().to_string()
    }
}

impl fmt::Display for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Describes one logical type.
///
/// Property keys are lower-cased names; each [`ParameterData`] keeps the
/// declared casing in `name`. `Clone` is a deep copy.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RuntimeTypeData {
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub type_tag: Option<TypeTag>,

    /// Element descriptors for collection-valued types.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub collection_types: Vec<RuntimeTypeData>,

    #[serde(
        default,
        skip_serializing_if = "IndexMap::is_empty",
        deserialize_with = "deserialize_properties"
    )]
    pub properties: IndexMap<String, ParameterData>,
}

impl RuntimeTypeData {
    pub fn new(type_tag: TypeTag) -> Self {
        Self {
            type_tag: Some(type_tag),
            ..Self::default()
        }
    }

    /// A collection whose elements follow `element`.
    pub fn array_of(element: RuntimeTypeData) -> Self {
        Self {
            type_tag: Some(TypeTag::Array),
            collection_types: vec![element],
            properties: IndexMap::new(),
        }
    }

    pub fn with_property(mut self, property: ParameterData) -> Self {
        self.insert_property(property);
        self
    }

    pub fn insert_property(&mut self, property: ParameterData) {
        self.properties
            .insert(property.name.to_lowercase(), property);
    }

    pub fn property(&self, name: &str) -> Option<&ParameterData> {
        self.properties.get(&name.to_lowercase())
    }

    /// Find the property whose JSON rename equals `key`, ignoring case.
    pub fn find_by_json_name(&self, key: &str) -> Option<&ParameterData> {
        self.properties.values().find(|p| {
            p.json_name
                .as_deref()
                .is_some_and(|json| json.eq_ignore_ascii_case(key))
        })
    }

    /// The rename configured for `property`, if any.
    pub fn wire_name(&self, property: &str) -> Option<&str> {
        self.property(property).and_then(|p| p.json_name.as_deref())
    }

    pub fn element_type(&self) -> Option<&RuntimeTypeData> {
        self.collection_types.first()
    }

    /// No tag, no element types, no properties: values pass through untouched.
    pub fn is_pass_through(&self) -> bool {
        self.type_tag.is_none() && self.collection_types.is_empty() && self.properties.is_empty()
    }

    /// Overlay `other` onto `self`.
    ///
    /// Each of type tag, collection types and properties is replaced
    /// wholesale when `other` defines it. Properties are not unioned per key.
    pub fn merge_with(&mut self, other: &RuntimeTypeData) {
        if let Some(tag) = &other.type_tag {
            self.type_tag = Some(tag.clone());
        }
        if !other.collection_types.is_empty() {
            self.collection_types = other.collection_types.clone();
        }
        if !other.properties.is_empty() {
            self.properties = other.properties.clone();
        }
    }
}

/// A single property or parameter.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParameterData {
    /// Local name, in declared casing.
    #[serde(default)]
    pub name: String,

    /// JSON key used on the wire when it differs from `name`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub json_name: Option<String>,

    /// `None` means untyped: the value passes through as-is.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub type_data: Option<RuntimeTypeData>,

    /// Never written by the encoder.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub skip_serializing: bool,
}

impl ParameterData {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn with_json_name(mut self, json_name: impl Into<String>) -> Self {
        self.json_name = Some(json_name.into());
        self
    }

    pub fn with_type(mut self, type_data: RuntimeTypeData) -> Self {
        self.type_data = Some(type_data);
        self
    }

    pub fn with_tag(self, tag: TypeTag) -> Self {
        self.with_type(RuntimeTypeData::new(tag))
    }

    pub fn skip_serializing(mut self) -> Self {
        self.skip_serializing = true;
        self
    }

    /// Key used on the wire.
    pub fn wire_name(&self) -> &str {
        self.json_name.as_deref().unwrap_or(&self.name)
    }

    /// Native type tag, if declared.
    pub fn type_tag(&self) -> Option<&TypeTag> {
        self.type_data.as_ref().and_then(|t| t.type_tag.as_ref())
    }

    /// Overlay another source's view of this parameter.
    pub fn merge_with(&mut self, other: &ParameterData) {
        if other.json_name.is_some() {
            self.json_name = other.json_name.clone();
        }
        if let Some(theirs) = &other.type_data {
            match self.type_data.as_mut() {
                Some(mine) => mine.merge_with(theirs),
                None => self.type_data = Some(theirs.clone()),
            }
        }
        self.skip_serializing |= other.skip_serializing;
    }
}

/// Deserialize a property map, lower-casing keys and filling missing names.
pub(crate) fn deserialize_properties<'de, D>(
    deserializer: D,
) -> Result<IndexMap<String, ParameterData>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = IndexMap::<String, ParameterData>::deserialize(deserializer)?;
    let mut properties = IndexMap::with_capacity(raw.len());
    for (key, mut property) in raw {
        if property.name.is_empty() {
            property.name = key.clone();
        }
        let lowered = key.to_lowercase();
        if properties.contains_key(&lowered) {
            return Err(serde::de::Error::custom(format!(
                "duplicate property '{key}' (names are case-insensitive)"
            )));
        }
        properties.insert(lowered, property);
    }
    Ok(properties)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> RuntimeTypeData {
        RuntimeTypeData::new(TypeTag::shape("Widget"))
            .with_property(
                ParameterData::new("Property")
                    .with_json_name("prop")
                    .with_tag(TypeTag::String),
            )
            .with_property(ParameterData::new("Count").with_tag(TypeTag::Integer))
    }

    #[test]
    fn test_property_lookup_is_case_insensitive() {
        let data = sample();
        assert_eq!(data.property("PROPERTY").unwrap().name, "Property");
        assert_eq!(data.property("count").unwrap().name, "Count");
        assert!(data.property("missing").is_none());
    }

    #[test]
    fn test_json_name_lookup() {
        let data = sample();
        assert_eq!(data.find_by_json_name("PROP").unwrap().name, "Property");
        assert!(data.find_by_json_name("count").is_none());
        assert_eq!(data.wire_name("property"), Some("prop"));
        assert_eq!(data.wire_name("count"), None);
    }

    #[test]
    fn test_clone_is_independent() {
        let original = RuntimeTypeData::array_of(sample());
        let mut copy = original.clone();
        copy.collection_types[0].properties.clear();
        copy.collection_types.push(RuntimeTypeData::new(TypeTag::String));

        assert_eq!(original.collection_types.len(), 1);
        assert_eq!(original.collection_types[0].properties.len(), 2);
    }

    #[test]
    fn test_merge_replaces_defined_fields_only() {
        let mut base = sample();
        let overlay = RuntimeTypeData::default().with_property(ParameterData::new("other"));

        base.merge_with(&overlay);
        assert_eq!(base.type_tag, Some(TypeTag::shape("Widget")));
        assert_eq!(base.properties.len(), 1);
        assert!(base.property("property").is_none());
        assert!(base.property("other").is_some());
    }

    #[test]
    fn test_merge_with_empty_keeps_everything() {
        let mut base = sample();
        base.merge_with(&RuntimeTypeData::default());
        assert_eq!(base, sample());
    }

    #[test]
    fn test_parameter_merge_takes_rename_and_type() {
        let mut module = ParameterData::new("ResourceGroupName").with_tag(TypeTag::String);
        let spec = ParameterData::new("resourceGroupName").with_json_name("resourceGroup");

        module.merge_with(&spec);
        assert_eq!(module.name, "ResourceGroupName");
        assert_eq!(module.wire_name(), "resourceGroup");
        assert_eq!(module.type_tag(), Some(&TypeTag::String));
    }

    #[test]
    fn test_type_tag_parsing() {
        assert_eq!(TypeTag::from("Bool".to_string()), TypeTag::Boolean);
        assert_eq!(TypeTag::from("long".to_string()), TypeTag::Integer);
        assert_eq!(
            TypeTag::from("VirtualMachine".to_string()),
            TypeTag::shape("VirtualMachine")
        );
        assert_eq!(String::from(TypeTag::Number), "number");
    }

    #[test]
    fn test_deserialize_lowercases_keys_and_fills_names() {
        let data: RuntimeTypeData = serde_json::from_value(json!({
            "type": "Widget",
            "properties": {
                "Property": { "jsonName": "prop", "typeData": { "type": "string" } },
                "Count": { "typeData": { "type": "integer" } }
            }
        }))
        .unwrap();

        assert_eq!(data.type_tag, Some(TypeTag::shape("Widget")));
        assert_eq!(data.properties.keys().collect::<Vec<_>>(), ["property", "count"]);
        assert_eq!(data.property("count").unwrap().name, "Count");
        assert_eq!(data.wire_name("property"), Some("prop"));
    }

    #[test]
    fn test_deserialize_rejects_case_duplicates() {
        let result: Result<RuntimeTypeData, _> = serde_json::from_value(json!({
            "properties": { "Name": {}, "name": {} }
        }));
        assert!(result.is_err());
    }
}
