//! Template interpolation for provider definitions
//!
//! Handles `{{ variable }}` interpolation in stream paths, headers and
//! query parameters. Supports nested access like `{{ config.space_id }}`
//! and the current partition id as `{{ partition }}`.

use crate::error::{Error, Result};
use crate::types::StringMap;
use regex::Regex;
use serde_json::Value;
use std::sync::LazyLock;

/// Regex for matching template variables: {{ variable.path }}
static TEMPLATE_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\{\{\s*([a-zA-Z_][a-zA-Z0-9_]*(?:\.[a-zA-Z_][a-zA-Z0-9_]*)*)\s*\}\}").unwrap()
});

/// Context for template interpolation
#[derive(Debug, Clone, Default)]
pub struct TemplateContext {
    /// Tap configuration values
    pub config: Value,
    /// Current partition id
    pub partition: Value,
}

impl TemplateContext {
    /// Create a new empty context
    pub fn new() -> Self {
        Self::default()
    }

    /// Create context with config values
    pub fn with_config(config: Value) -> Self {
        Self {
            config,
            ..Default::default()
        }
    }

    /// Copy of this context scoped to one partition
    #[must_use]
    pub fn for_partition(&self, partition_id: &str) -> Self {
        Self {
            config: self.config.clone(),
            partition: Value::String(partition_id.to_string()),
        }
    }

    /// Get a value by path (e.g., "config.space_id")
    pub fn get(&self, path: &str) -> Option<&Value> {
        let parts: Vec<&str> = path.split('.').collect();

        let root = match parts[0] {
            "config" => &self.config,
            "partition" => &self.partition,
            // Bare names resolve against config
            _ => return get_nested_value(&self.config, &parts),
        };

        if root.is_null() {
            return None;
        }
        get_nested_value(root, &parts[1..])
    }
}

/// Get a nested value from a JSON value by path
fn get_nested_value<'a>(value: &'a Value, path: &[&str]) -> Option<&'a Value> {
    let mut current = value;
    for part in path {
        match current {
            Value::Object(map) => {
                current = map.get(*part)?;
            }
            _ => return None,
        }
    }
    Some(current)
}

/// Render a template string with the given context
pub fn render(template: &str, ctx: &TemplateContext) -> Result<String> {
    let mut result = template.to_string();
    let mut errors = Vec::new();

    for cap in TEMPLATE_REGEX.captures_iter(template) {
        let (Some(full_match), Some(var_path)) = (cap.get(0), cap.get(1)) else {
            continue;
        };

        match ctx.get(var_path.as_str()) {
            Some(value) => {
                result = result.replace(full_match.as_str(), &value_to_string(value));
            }
            None => errors.push(var_path.as_str().to_string()),
        }
    }

    if errors.is_empty() {
        Ok(result)
    } else {
        Err(Error::undefined_var(errors.join(", ")))
    }
}

/// Render every value of a string map
pub fn render_map(map: &StringMap, ctx: &TemplateContext) -> Result<StringMap> {
    map.iter()
        .map(|(k, v)| Ok((k.clone(), render(v, ctx)?)))
        .collect()
}

/// Extract all variable names from a template
pub fn extract_variables(template: &str) -> Vec<String> {
    TEMPLATE_REGEX
        .captures_iter(template)
        .filter_map(|cap| cap.get(1).map(|m| m.as_str().to_string()))
        .collect()
}

/// Convert a JSON value to a string for template substitution
fn value_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => String::new(),
        // For complex types, use JSON serialization
        _ => serde_json::to_string(value).unwrap_or_default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn context() -> TemplateContext {
        TemplateContext::with_config(json!({
            "space_id": "sp1",
            "access_token": "tok",
            "app_id": "app",
            "nested": {"region": "eu"}
        }))
    }

    #[test]
    fn test_render_config_paths() {
        let ctx = context();
        assert_eq!(
            render("/spaces/{{ config.space_id }}/entries", &ctx).unwrap(),
            "/spaces/sp1/entries"
        );
        assert_eq!(render("{{config.nested.region}}", &ctx).unwrap(), "eu");
        assert_eq!(render("{{ app_id }}", &ctx).unwrap(), "app");
    }

    #[test]
    fn test_render_partition() {
        let ctx = context().for_partition("club-9");
        assert_eq!(
            render("/{{ partition }}/members", &ctx).unwrap(),
            "/club-9/members"
        );
    }

    #[test]
    fn test_render_partition_without_scope_fails() {
        let err = render("/{{ partition }}/members", &context()).unwrap_err();
        assert!(matches!(err, Error::UndefinedVariable { .. }));
    }

    #[test]
    fn test_render_undefined_lists_all() {
        let err = render("{{ config.a }}-{{ config.b }}", &context()).unwrap_err();
        assert_eq!(err.to_string(), "Undefined variable in template: config.a, config.b");
    }

    #[test]
    fn test_render_map() {
        let mut map = StringMap::new();
        map.insert("app_id".to_string(), "{{ config.app_id }}".to_string());
        map.insert("Accept".to_string(), "application/json".to_string());

        let rendered = render_map(&map, &context()).unwrap();
        assert_eq!(rendered["app_id"], "app");
        assert_eq!(rendered["Accept"], "application/json");
    }

    #[test]
    fn test_extract_variables() {
        assert!(extract_variables("/plain").is_empty());
        assert_eq!(
            extract_variables("/{{ partition }}/x/{{ config.app_id }}"),
            vec!["partition".to_string(), "config.app_id".to_string()]
        );
    }
}
