//! YAML parser for provider definitions
//!
//! Parses and validates provider YAML files.
//! Supports both built-in providers (by name) and custom YAML files (by path).

use crate::error::{Error, Result};
use crate::loader::types::ProviderDefinition;
use crate::pagination::PaginationConfig;
use crate::partition::Partitioning;
use crate::providers;
use crate::stream::{StreamDescriptor, WatermarkSource, WindowPolicy};
use crate::template;
use std::collections::HashSet;
use std::fs;
use std::path::Path;

/// Load a provider definition from a built-in name or a file path
///
/// ```ignore
/// let provider = load_provider("contentful")?;
/// let provider = load_provider("./my-provider.yaml")?;
/// ```
pub fn load_provider(path: impl AsRef<Path>) -> Result<ProviderDefinition> {
    let path = path.as_ref();
    let path_str = path.to_string_lossy();

    if is_bare_name(&path_str) {
        if let Some(yaml) = providers::get_builtin(&path_str) {
            return load_provider_from_str(yaml);
        }
    }

    let content = fs::read_to_string(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            Error::config(format!(
                "Provider '{}' not found. Built-in providers: {}. Or provide a path to a YAML file.",
                path.display(),
                providers::list_builtin().join(", ")
            ))
        } else {
            Error::config(format!(
                "Failed to read provider file '{}': {e}",
                path.display()
            ))
        }
    })?;
    load_provider_from_str(&content)
}

fn is_bare_name(s: &str) -> bool {
    !s.contains('/') && !s.contains('\\') && !s.ends_with(".yaml") && !s.ends_with(".yml")
}

/// Load a provider definition from a YAML string
pub fn load_provider_from_str(yaml: &str) -> Result<ProviderDefinition> {
    let def: ProviderDefinition = serde_yaml::from_str(yaml)
        .map_err(|e| Error::config(format!("Failed to parse provider YAML: {e}")))?;

    validate_provider(&def)?;
    Ok(def)
}

fn validate_provider(def: &ProviderDefinition) -> Result<()> {
    if def.name.is_empty() {
        return Err(Error::config("Provider name cannot be empty"));
    }
    if def.base_url.is_empty() {
        return Err(Error::config("Provider base_url cannot be empty"));
    }
    if def.streams.is_empty() {
        return Err(Error::config("Provider must have at least one stream"));
    }

    let names: HashSet<_> = def.streams.iter().map(|s| &s.name).collect();
    if names.len() != def.streams.len() {
        return Err(Error::config("Duplicate stream names found"));
    }

    let mut templates = vec![def.base_url.as_str()];
    templates.extend(def.headers.values().map(String::as_str));
    templates.extend(def.params.values().map(String::as_str));
    check_references(def, "provider", &templates)?;

    for stream in &def.streams {
        validate_stream(stream)?;

        let mut templates = vec![stream.path.as_str()];
        templates.extend(stream.headers.values().map(String::as_str));
        templates.extend(stream.params.values().map(String::as_str));
        check_references(def, &format!("stream '{}'", stream.name), &templates)?;
    }

    Ok(())
}

fn validate_stream(stream: &StreamDescriptor) -> Result<()> {
    if stream.name.is_empty() {
        return Err(Error::config("Stream name cannot be empty"));
    }
    if stream.path.is_empty() {
        return Err(Error::config(format!(
            "Stream '{}' path cannot be empty",
            stream.name
        )));
    }

    let uses_partition = template::extract_variables(&stream.path)
        .iter()
        .any(|v| v == "partition");
    if uses_partition && stream.partitions == Partitioning::None {
        return Err(Error::config(format!(
            "Stream '{}' path uses {{{{ partition }}}} but the stream has no partitions",
            stream.name
        )));
    }

    let page_size = match &stream.pagination {
        PaginationConfig::None => None,
        PaginationConfig::PageNumber { page_size, .. }
        | PaginationConfig::Offset { page_size, .. } => Some(*page_size),
    };
    if page_size == Some(0) {
        return Err(Error::config(format!(
            "Stream '{}' page_size must be greater than 0",
            stream.name
        )));
    }

    if let Some(incremental) = stream.incremental() {
        if incremental.replication_key.is_empty() || incremental.filter_param.is_empty() {
            return Err(Error::config(format!(
                "Stream '{}' needs a replication_key and a filter_param",
                stream.name
            )));
        }
        if let WindowPolicy::Fixed { days: 0, .. } = incremental.window {
            return Err(Error::config(format!(
                "Stream '{}' window must span at least one day",
                stream.name
            )));
        }
        if let WatermarkSource::Record {
            path, order_param, ..
        } = &incremental.watermark
        {
            if path.is_empty() || order_param.is_empty() {
                return Err(Error::config(format!(
                    "Stream '{}' record watermark needs a path and an order_param",
                    stream.name
                )));
            }
        }
    }

    Ok(())
}

/// Every config key a template reads must be required by the definition
fn check_references(def: &ProviderDefinition, owner: &str, templates: &[&str]) -> Result<()> {
    for template in templates {
        for key in ProviderDefinition::config_references(template) {
            if !def.declares(&key) {
                return Err(Error::config(format!(
                    "{owner} references config '{key}', which is not in required_config"
                )));
            }
        }
    }
    Ok(())
}
