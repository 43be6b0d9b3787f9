//! The settings document
//!
//! An ordered mapping with the sections `package`, `front`, `graph` and
//! `presentation`. It is JSON-shaped in memory and persisted as a PHP array
//! literal (see [`crate::render`] and [`crate::parse`]).

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};

/// Section holding paths and integration switches
pub const PACKAGE: &str = "package";
/// Section holding editor front-end preferences
pub const FRONT: &str = "front";
/// Section holding canvas layout preferences
pub const GRAPH: &str = "graph";
/// Section holding per-model decoration
pub const PRESENTATION: &str = "presentation";

/// Sections in declaration order
pub const SECTIONS: [&str; 4] = [PACKAGE, FRONT, GRAPH, PRESENTATION];

/// Ordered settings mapping
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SettingsDocument(Map<String, Value>);

impl SettingsDocument {
    /// Wrap an existing mapping
    pub fn new(map: Map<String, Value>) -> Self {
        Self(map)
    }

    /// The packaged defaults
    pub fn defaults() -> Self {
        let value = json!({
            "package": {
                "models_path": "app/Models",
                "snapshot_path": "storage/app/draftsman/snapshots",
                "editor": "vscode",
                "update_env": false,
                "add_env": false,
            },
            "front": {
                "history_length": 200,
                "snap_to_grid": true,
            },
            "graph": {
                "show_grid": true,
                "grid_width": 50,
                "label_edges": true,
                "use_gutters": true,
                "column_width": 60,
                "column_min_width": 40,
                "column_max_width": 80,
                "gutter_width": 20,
                "gutter_min_width": 10,
                "gutter_max_width": 30,
            },
            "presentation": {},
        });

        match value {
            Value::Object(map) => Self(map),
            _ => Self::default(),
        }
    }

    /// Get a top-level section
    pub fn section(&self, name: &str) -> Option<&Map<String, Value>> {
        self.0.get(name).and_then(Value::as_object)
    }

    /// Get a value by dotted path, e.g. `package.models_path`
    pub fn get_path(&self, path: &str) -> Option<&Value> {
        let mut parts = path.split('.');
        let mut current = self.0.get(parts.next()?)?;
        for part in parts {
            current = current.as_object()?.get(part)?;
        }
        Some(current)
    }

    /// Get a string by dotted path
    pub fn get_str(&self, path: &str) -> Option<&str> {
        self.get_path(path).and_then(Value::as_str)
    }

    /// Interpret a value by dotted path as a switch
    ///
    /// Booleans are taken as-is; the strings `"true"`, `"1"`, `"on"` and
    /// `"yes"` and non-zero numbers count as enabled.
    pub fn flag(&self, path: &str) -> bool {
        match self.get_path(path) {
            Some(Value::Bool(b)) => *b,
            Some(Value::Number(n)) => n.as_f64().is_some_and(|f| f != 0.0),
            Some(Value::String(s)) => {
                matches!(s.to_ascii_lowercase().as_str(), "true" | "1" | "on" | "yes")
            }
            _ => false,
        }
    }

    /// Presentation entries, empty when the section is missing
    pub fn presentation(&self) -> Map<String, Value> {
        self.section(PRESENTATION).cloned().unwrap_or_default()
    }

    /// Borrow the underlying mapping
    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    /// Mutably borrow the underlying mapping
    pub fn as_map_mut(&mut self) -> &mut Map<String, Value> {
        &mut self.0
    }

    /// Consume into the underlying mapping
    pub fn into_map(self) -> Map<String, Value> {
        self.0
    }

    /// Convert into a JSON value
    pub fn to_value(&self) -> Value {
        Value::Object(self.0.clone())
    }
}

impl From<Map<String, Value>> for SettingsDocument {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_defaults_section_order() {
        let doc = SettingsDocument::defaults();
        let keys: Vec<&str> = doc.as_map().keys().map(String::as_str).collect();
        assert_eq!(keys, SECTIONS.to_vec());
    }

    #[test]
    fn test_defaults_values() {
        let doc = SettingsDocument::defaults();
        assert_eq!(doc.get_str("package.models_path"), Some("app/Models"));
        assert_eq!(doc.get_str("package.editor"), Some("vscode"));
        assert_eq!(doc.get_path("front.history_length"), Some(&json!(200)));
        assert_eq!(doc.get_path("graph.gutter_max_width"), Some(&json!(30)));
        assert!(doc.presentation().is_empty());
        assert!(!doc.flag("package.update_env"));
    }

    #[test]
    fn test_flag_interpretation() {
        let mut doc = SettingsDocument::defaults();
        let package = doc
            .as_map_mut()
            .get_mut(PACKAGE)
            .and_then(Value::as_object_mut)
            .unwrap();
        package.insert("update_env".into(), json!("yes"));
        package.insert("add_env".into(), json!(0));

        assert!(doc.flag("package.update_env"));
        assert!(!doc.flag("package.add_env"));
        assert!(!doc.flag("package.missing"));
    }

    #[test]
    fn test_get_path_missing() {
        let doc = SettingsDocument::defaults();
        assert!(doc.get_path("graph.nope").is_none());
        assert!(doc.get_path("package.models_path.deeper").is_none());
    }
}
