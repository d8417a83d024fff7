//! Type descriptor registry.
//!
//! Describes how each operation's parameters and response types map to JSON
//! property names. Metadata comes from two places: introspection of the
//! module under test and a declared specification. The registry merges them
//! per operation; response types pick the best-matching specification
//! candidate (see [`find_best_matching`]).

pub mod error;
pub mod matching;
pub mod operation;
pub mod registry;
pub mod types;

pub use error::{RegistryError, RegistryResult};
pub use matching::{count_matching_properties, find_best_matching};
pub use operation::{OperationData, ResponseTypeData};
pub use registry::{Manifest, ManifestSource, ModuleRegistry, TypeSource};
pub use types::{ParameterData, RuntimeTypeData, TypeTag};
