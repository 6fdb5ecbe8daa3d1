//! Built-in provider definitions embedded in the binary
//!
//! Lets users pass `--provider contentful` instead of a path to a YAML file.

use std::collections::HashMap;
use std::sync::LazyLock;

/// Built-in provider YAML definitions
pub static BUILTIN_PROVIDERS: LazyLock<HashMap<&'static str, &'static str>> =
    LazyLock::new(|| {
        let mut m = HashMap::new();

        m.insert("contentful", include_str!("../providers/contentful.yaml"));
        m.insert(
            "abc_financial",
            include_str!("../providers/abc_financial.yaml"),
        );
        m.insert("abcfinancial", include_str!("../providers/abc_financial.yaml"));

        m
    });

/// Get a built-in provider by name
pub fn get_builtin(name: &str) -> Option<&'static str> {
    BUILTIN_PROVIDERS.get(name).copied()
}

/// Check if a name is a built-in provider
pub fn is_builtin(name: &str) -> bool {
    BUILTIN_PROVIDERS.contains_key(name)
}

/// List built-in provider names (primary names only)
pub fn list_builtin() -> Vec<&'static str> {
    vec!["abc_financial", "contentful"]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::load_provider_from_str;
    use crate::types::ReplicationMode;

    #[test]
    fn test_builtin_providers_exist() {
        for name in list_builtin() {
            assert!(is_builtin(name), "{name} missing");
        }
        assert!(get_builtin("unknown").is_none());
    }

    #[test]
    fn test_aliases_work() {
        assert_eq!(get_builtin("abc_financial"), get_builtin("abcfinancial"));
    }

    #[test]
    fn test_builtins_validate() {
        for name in list_builtin() {
            let yaml = get_builtin(name).unwrap();
            let def = load_provider_from_str(yaml)
                .unwrap_or_else(|e| panic!("{name} failed validation: {e}"));
            assert_eq!(def.name, name);
        }
    }

    #[test]
    fn test_abc_financial_streams() {
        let def = load_provider_from_str(get_builtin("abc_financial").unwrap()).unwrap();

        let streams: Vec<_> = def.streams.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(streams, vec!["members", "prospects", "checkins", "clubs"]);
        assert_eq!(def.stream("clubs").unwrap().mode(), ReplicationMode::Full);
        assert_eq!(
            def.stream("prospects").unwrap().partitions.hydrate_field(),
            Some("club_id")
        );
        assert_eq!(
            def.required_keys(),
            vec!["app_id".to_string(), "api_key".to_string(), "club_ids".to_string()]
        );
    }

    #[test]
    fn test_contentful_partitions_by_space() {
        let def = load_provider_from_str(get_builtin("contentful").unwrap()).unwrap();
        let entries = def.stream("entries").unwrap();

        assert_eq!(entries.partitions.config_key(), Some("space_id"));
        assert_eq!(
            entries.incremental().unwrap().order(),
            Some(("order", "sys.updatedAt"))
        );
    }
}
