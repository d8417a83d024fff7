//! Operation registry built from module and specification metadata.

use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::error::{RegistryError, RegistryResult};
use super::operation::OperationData;

/// Supplies operation metadata, either introspected from the module under
/// test or declared by a specification document.
pub trait TypeSource {
    /// Short label for log lines.
    fn label(&self) -> String;

    fn operations(&self) -> RegistryResult<Vec<OperationData>>;
}

impl TypeSource for Vec<OperationData> {
    fn label(&self) -> String {
        format!("{} in-memory operations", self.len())
    }

    fn operations(&self) -> RegistryResult<Vec<OperationData>> {
        Ok(self.clone())
    }
}

/// On-disk manifest: `{ "operations": [ ... ] }`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Manifest {
    #[serde(default)]
    pub operations: Vec<OperationData>,
}

/// A JSON manifest file.
#[derive(Debug, Clone)]
pub struct ManifestSource {
    path: PathBuf,
}

impl ManifestSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl TypeSource for ManifestSource {
    fn label(&self) -> String {
        self.path.display().to_string()
    }

    fn operations(&self) -> RegistryResult<Vec<OperationData>> {
        let content =
            std::fs::read_to_string(&self.path).map_err(|source| RegistryError::ManifestRead {
                path: self.path.clone(),
                source,
            })?;
        let manifest: Manifest =
            serde_json::from_str(&content).map_err(|source| RegistryError::ManifestParse {
                path: self.path.clone(),
                source,
            })?;
        Ok(manifest.operations)
    }
}

/// Operations of a loaded module, keyed by lower-cased operation id.
///
/// Owns every descriptor for the lifetime of the module.
#[derive(Debug, Clone, Default)]
pub struct ModuleRegistry {
    operations: IndexMap<String, OperationData>,
}

impl ModuleRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from the module source, fold in the specification source if
    /// given, then complete every response type.
    pub fn load(
        module: &dyn TypeSource,
        specification: Option<&dyn TypeSource>,
    ) -> RegistryResult<Self> {
        let mut registry = Self::new();
        for operation in module.operations()? {
            registry.insert(operation)?;
        }
        crate::log_event!(
            "registry",
            "loaded",
            "{} operations from {}",
            registry.len(),
            module.label()
        );

        if let Some(spec) = specification {
            let declared = spec.operations()?;
            let merged = registry.merge_specification(&declared);
            crate::log_event!(
                "registry",
                "merged",
                "{merged} of {} operations from {}",
                declared.len(),
                spec.label()
            );
        }

        registry.complete();
        Ok(registry)
    }

    pub fn insert(&mut self, operation: OperationData) -> RegistryResult<()> {
        if operation.operation_id.is_empty() {
            return Err(RegistryError::MissingOperationId);
        }
        let key = operation.operation_id.to_lowercase();
        if self.operations.contains_key(&key) {
            return Err(RegistryError::DuplicateOperation(operation.operation_id));
        }
        self.operations.insert(key, operation);
        Ok(())
    }

    /// Merge declared operations into known ones. Returns how many matched.
    pub fn merge_specification(&mut self, declared: &[OperationData]) -> usize {
        let mut merged = 0;
        for spec in declared {
            match self.operations.get_mut(&spec.operation_id.to_lowercase()) {
                Some(operation) => {
                    operation.merge_specification(spec);
                    merged += 1;
                }
                None => crate::debug_event!(
                    "registry",
                    "skip",
                    "'{}' not exported by module",
                    spec.operation_id
                ),
            }
        }
        merged
    }

    /// Resolve every response type against its specification candidates.
    pub fn complete(&mut self) {
        for operation in self.operations.values_mut() {
            if let Some(response) = operation.response_type.as_mut() {
                response.complete();
            }
        }
    }

    /// Case-insensitive lookup.
    pub fn operation(&self, operation_id: &str) -> Option<&OperationData> {
        self.operations.get(&operation_id.to_lowercase())
    }

    pub fn operations(&self) -> impl Iterator<Item = &OperationData> {
        self.operations.values()
    }

    pub fn len(&self) -> usize {
        self.operations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }
}
