//! Merging incoming settings over a base document
//!
//! ```text
//! incoming ──► resolve presentation keys ──► deep merge over base ──► normalize
//! ```
//!
//! Normalization keeps the document in the shape the renderer and the editor
//! expect: presentation keys are fully-qualified classes, entries are
//! mappings restricted to [`ALLOWED_PRESENTATION_KEYS`], and empty lists are
//! stored as empty mappings.

use crate::document::{PACKAGE, PRESENTATION, SettingsDocument};
use crate::namespace::{AppPaths, ModelNamespace};
use serde_json::{Map, Value};

/// Keys a presentation entry may carry
pub const ALLOWED_PRESENTATION_KEYS: [&str; 2] = ["icon", "class"];

/// Merge `incoming` over `base` and normalize the result
///
/// The merge recurses where both sides hold a mapping; any other incoming
/// value replaces the base value outright. Applying the same `incoming`
/// twice gives the same document as applying it once.
pub fn merge_settings(
    base: &SettingsDocument,
    incoming: &Map<String, Value>,
    paths: &AppPaths,
) -> SettingsDocument {
    let namespace = models_namespace(base, incoming, paths);

    let mut incoming = incoming.clone();
    if let Some(Value::Object(entries)) = incoming.get_mut(PRESENTATION) {
        *entries = resolve_keys(std::mem::take(entries), &namespace);
    }

    let mut merged = base.as_map().clone();
    deep_merge(&mut merged, incoming);

    let mut document = SettingsDocument::new(merged);
    normalize(&mut document, &namespace);
    document
}

/// Bring a document into canonical shape
pub fn normalize(document: &mut SettingsDocument, namespace: &ModelNamespace) {
    let map = document.as_map_mut();

    for value in map.values_mut() {
        collapse_empty_lists(value);
    }

    if let Some(section) = map.get_mut(PRESENTATION) {
        let entries = match std::mem::take(section) {
            Value::Object(entries) => entries,
            other => {
                tracing::debug!("Replacing non-mapping presentation section: {}", other);
                Map::new()
            }
        };
        *section = Value::Object(normalize_presentation(entries, namespace));
    }
}

/// The models namespace implied by the incoming or base `models_path`
pub fn models_namespace(
    base: &SettingsDocument,
    incoming: &Map<String, Value>,
    paths: &AppPaths,
) -> ModelNamespace {
    let models_path = incoming
        .get(PACKAGE)
        .and_then(|p| p.get("models_path"))
        .and_then(Value::as_str)
        .or_else(|| base.get_str("package.models_path"))
        .unwrap_or("app/Models");
    ModelNamespace::from_models_path(models_path, paths)
}

/// Recursively merge `incoming` into `target`
pub fn deep_merge(target: &mut Map<String, Value>, incoming: Map<String, Value>) {
    for (key, value) in incoming {
        match (target.get_mut(&key), value) {
            (Some(Value::Object(existing)), Value::Object(nested)) => deep_merge(existing, nested),
            (_, value) => {
                target.insert(key, value);
            }
        }
    }
}

fn resolve_keys(entries: Map<String, Value>, namespace: &ModelNamespace) -> Map<String, Value> {
    let mut resolved = Map::new();
    for (key, value) in entries {
        let key = namespace.resolve(&key);
        match (resolved.get_mut(&key), value) {
            (Some(Value::Object(existing)), Value::Object(nested)) => deep_merge(existing, nested),
            (_, value) => {
                resolved.insert(key, value);
            }
        }
    }
    resolved
}

fn normalize_presentation(
    entries: Map<String, Value>,
    namespace: &ModelNamespace,
) -> Map<String, Value> {
    resolve_keys(entries, namespace)
        .into_iter()
        .filter_map(|(key, value)| match value {
            Value::Object(entry) => {
                let entry: Map<String, Value> = entry
                    .into_iter()
                    .filter(|(k, _)| ALLOWED_PRESENTATION_KEYS.contains(&k.as_str()))
                    .collect();
                Some((key, Value::Object(entry)))
            }
            other => {
                tracing::debug!("Dropping presentation entry '{}': {}", key, other);
                None
            }
        })
        .collect()
}

fn collapse_empty_lists(value: &mut Value) {
    match value {
        Value::Array(items) if items.is_empty() => *value = Value::Object(Map::new()),
        Value::Array(items) => items.iter_mut().for_each(collapse_empty_lists),
        Value::Object(map) => map.values_mut().for_each(collapse_empty_lists),
        _ => {}
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn paths() -> AppPaths {
        AppPaths::new("/srv/shop")
    }

    fn object(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => panic!("expected an object"),
        }
    }

    #[test]
    fn test_deep_merge_replaces_leaves() {
        let defaults = SettingsDocument::defaults();
        let incoming = object(json!({
            "graph": {"grid_width": 25},
            "front": {"history_length": [1, 2]},
            "custom": {"x": 1}
        }));

        let merged = merge_settings(&defaults, &incoming, &paths());
        assert_eq!(merged.get_path("graph.grid_width"), Some(&json!(25)));
        assert_eq!(merged.get_path("graph.show_grid"), Some(&json!(true)));
        assert_eq!(merged.get_path("front.history_length"), Some(&json!([1, 2])));
        assert_eq!(merged.get_path("custom.x"), Some(&json!(1)));
    }

    #[test]
    fn test_presentation_keys_and_allow_list() {
        let defaults = SettingsDocument::defaults();
        let incoming = object(json!({
            "presentation": {"User": {"icon": "x", "class": "y", "extra": "z"}}
        }));

        let merged = merge_settings(&defaults, &incoming, &paths());
        assert_eq!(
            merged.section(PRESENTATION).cloned().map(Value::Object),
            Some(json!({"App\\Models\\User": {"icon": "x", "class": "y"}}))
        );
    }

    #[test]
    fn test_short_and_qualified_names_share_an_entry() {
        let mut base = SettingsDocument::defaults();
        base.as_map_mut().insert(
            PRESENTATION.into(),
            json!({"App\\Models\\User": {"icon": "old", "class": "keep"}}),
        );
        let incoming = object(json!({"presentation": {"User": {"icon": "new"}}}));

        let merged = merge_settings(&base, &incoming, &paths());
        assert_eq!(
            merged.get_path("presentation"),
            Some(&json!({"App\\Models\\User": {"icon": "new", "class": "keep"}}))
        );
    }

    #[test]
    fn test_null_entry_removes_model() {
        let mut base = SettingsDocument::defaults();
        base.as_map_mut().insert(
            PRESENTATION.into(),
            json!({"App\\Models\\User": {"icon": "u"}, "App\\Models\\Post": {"icon": "p"}}),
        );
        let incoming = object(json!({"presentation": {"Post": null}}));

        let merged = merge_settings(&base, &incoming, &paths());
        assert_eq!(
            merged.get_path("presentation"),
            Some(&json!({"App\\Models\\User": {"icon": "u"}}))
        );
    }

    #[test]
    fn test_models_path_from_incoming() {
        let defaults = SettingsDocument::defaults();
        let incoming = object(json!({
            "package": {"models_path": "app/Entities"},
            "presentation": {"Order": {"icon": "cart"}}
        }));

        let merged = merge_settings(&defaults, &incoming, &paths());
        assert!(
            merged
                .section(PRESENTATION)
                .unwrap()
                .contains_key("App\\Entities\\Order")
        );
    }

    #[test]
    fn test_empty_lists_collapse() {
        let defaults = SettingsDocument::defaults();
        let incoming = object(json!({"presentation": [], "front": {"recent": []}}));

        let merged = merge_settings(&defaults, &incoming, &paths());
        assert_eq!(merged.get_path("presentation"), Some(&json!({})));
        assert_eq!(merged.get_path("front.recent"), Some(&json!({})));
    }

    #[test]
    fn test_merge_is_idempotent() {
        let defaults = SettingsDocument::defaults();
        let incoming = object(json!({
            "package": {"editor": "php-storm", "update_env": true},
            "graph": {"column_width": 72.5},
            "presentation": {
                "User": {"icon": "user", "extra": 1},
                "Blog/Post": {"class": "bg-red"},
                "Vendor\\Team": "not an entry"
            }
        }));

        let once = merge_settings(&defaults, &incoming, &paths());
        let twice = merge_settings(&defaults, once.as_map(), &paths());
        assert_eq!(once, twice);

        let again = merge_settings(&once, &incoming, &paths());
        assert_eq!(once, again);
    }
}
