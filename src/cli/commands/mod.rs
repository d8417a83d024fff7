//! Command implementations for the CLI.
//!
//! Each command is implemented in its own module.

pub mod check;
pub mod init;
pub mod serve;

use anyhow::{Context, bail};

use super::args::ManifestArgs;
use crate::config::Settings;
use crate::schema::{ManifestSource, ModuleRegistry, TypeSource};

/// Load the registry from the manifests named on the command line, falling
/// back to `[server]` in settings.
pub fn load_registry(manifests: &ManifestArgs, settings: &Settings) -> anyhow::Result<ModuleRegistry> {
    let Some(module_path) = manifests
        .module
        .clone()
        .or_else(|| settings.server.module_path.clone())
    else {
        bail!("No module manifest given. Pass --module or set server.module_path");
    };
    let spec_path = manifests
        .specification
        .clone()
        .or_else(|| settings.server.specification_path.clone());

    let module = ManifestSource::new(module_path);
    let specification = spec_path.map(ManifestSource::new);

    ModuleRegistry::load(
        &module,
        specification.as_ref().map(|s| s as &dyn TypeSource),
    )
    .with_context(|| format!("Failed to load operations from {}", module.label()))
}
