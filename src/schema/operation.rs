//! Operation and response descriptors.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::matching::find_best_matching;
use super::types::{ParameterData, RuntimeTypeData, deserialize_properties};

/// One invocable operation of the module under test.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OperationData {
    pub operation_id: String,

    /// Underlying command the executor runs.
    #[serde(default)]
    pub command: String,

    /// Lower-cased parameter name to metadata.
    #[serde(
        default,
        skip_serializing_if = "IndexMap::is_empty",
        deserialize_with = "deserialize_properties"
    )]
    pub parameters: IndexMap<String, ParameterData>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response_type: Option<ResponseTypeData>,
}

impl OperationData {
    pub fn new(operation_id: impl Into<String>, command: impl Into<String>) -> Self {
        Self {
            operation_id: operation_id.into(),
            command: command.into(),
            ..Self::default()
        }
    }

    pub fn with_parameter(mut self, parameter: ParameterData) -> Self {
        self.parameters
            .insert(parameter.name.to_lowercase(), parameter);
        self
    }

    pub fn with_response_type(mut self, response_type: ResponseTypeData) -> Self {
        self.response_type = Some(response_type);
        self
    }

    /// Resolve a request key: parameter name first, then JSON rename.
    pub fn find_parameter(&self, key: &str) -> Option<&ParameterData> {
        self.parameters.get(&key.to_lowercase()).or_else(|| {
            self.parameters.values().find(|p| {
                p.json_name
                    .as_deref()
                    .is_some_and(|json| json.eq_ignore_ascii_case(key))
            })
        })
    }

    /// Fold a specification's view of this operation into the module's.
    ///
    /// Parameters known to both sources are merged (specification wins on
    /// renames and defined type fields); specification-only parameters are
    /// ignored since the command cannot accept them. Response candidates
    /// are appended for later completion.
    pub fn merge_specification(&mut self, spec: &OperationData) {
        for (key, spec_param) in &spec.parameters {
            match self.parameters.get_mut(key) {
                Some(param) => param.merge_with(spec_param),
                None => crate::debug_event!(
                    "registry",
                    "skip",
                    "{}: parameter '{}' only in specification",
                    self.operation_id,
                    spec_param.name
                ),
            }
        }

        if let Some(spec_response) = &spec.response_type {
            let candidates = spec_response
                .specification_data
                .iter()
                .cloned()
                .collect::<Vec<_>>();
            if candidates.is_empty() {
                return;
            }
            self.response_type
                .get_or_insert_with(ResponseTypeData::default)
                .specification_data
                .extend(candidates);
        }
    }
}

/// Response type metadata gathered from both sources.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseTypeData {
    /// Descriptor introspected from the module.
    #[serde(default)]
    pub module_data: RuntimeTypeData,

    /// Candidate descriptors declared by a specification.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub specification_data: Vec<RuntimeTypeData>,

    #[serde(skip)]
    completed: Option<RuntimeTypeData>,
}

impl ResponseTypeData {
    pub fn new(module_data: RuntimeTypeData) -> Self {
        Self {
            module_data,
            ..Self::default()
        }
    }

    pub fn with_candidate(mut self, candidate: RuntimeTypeData) -> Self {
        self.specification_data.push(candidate);
        self
    }

    /// Merge the module descriptor with the best specification candidate.
    ///
    /// The module descriptor is the base; the winning candidate's defined
    /// fields are laid over it.
    pub fn resolve(&self) -> RuntimeTypeData {
        let mut resolved = self.module_data.clone();
        if let Some(index) =
            find_best_matching(&self.specification_data, &self.module_data.properties)
        {
            resolved.merge_with(&self.specification_data[index]);
        }
        resolved
    }

    /// Resolve once and cache the result.
    pub fn complete(&mut self) -> &RuntimeTypeData {
        let resolved = self.resolve();
        self.completed.insert(resolved)
    }

    pub fn is_complete(&self) -> bool {
        self.completed.is_some()
    }

    /// The completed descriptor, or the module descriptor before completion.
    pub fn resolved(&self) -> &RuntimeTypeData {
        self.completed.as_ref().unwrap_or(&self.module_data)
    }
}
