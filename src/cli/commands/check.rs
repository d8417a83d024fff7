//! Check command - load manifests and list the merged operations.

use super::load_registry;
use crate::cli::args::ManifestArgs;
use crate::config::Settings;
use crate::schema::{ModuleRegistry, RuntimeTypeData};

pub fn run(manifests: &ManifestArgs, settings: &Settings) -> anyhow::Result<()> {
    let registry = load_registry(manifests, settings)?;
    print!("{}", render(&registry));
    Ok(())
}

/// One block per operation: id, command, parameters and response type.
pub fn render(registry: &ModuleRegistry) -> String {
    let mut out = format!("{} operation(s)\n", registry.len());
    for operation in registry.operations() {
        out.push_str(&format!(
            "\n{} -> {}\n",
            operation.operation_id, operation.command
        ));
        for parameter in operation.parameters.values() {
            let rename = match &parameter.json_name {
                Some(json_name) => format!(" as '{json_name}'"),
                None => String::new(),
            };
            out.push_str(&format!(
                "  {}{rename}: {}\n",
                parameter.name,
                describe(parameter.type_data.as_ref())
            ));
        }
        if let Some(response) = &operation.response_type {
            out.push_str(&format!(
                "  => {} ({} candidate(s))\n",
                describe(Some(response.resolved())),
                response.specification_data.len()
            ));
        }
    }
    out
}

fn describe(descriptor: Option<&RuntimeTypeData>) -> String {
    match descriptor.and_then(|d| d.type_tag.as_ref()) {
        Some(tag) => tag.to_string(),
        None => "any".to_string(),
    }
}
