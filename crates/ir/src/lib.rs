//! # Draftsman IR
//!
//! This crate turns the application's model declarations into the graph
//! served to the visual editor.
//!
//! ## Core Concepts
//!
//! - **ModelSource**: the model-layer collaborator (type inspection, describe, live relations)
//! - **ModelDescriptor**: attributes and raw relation declarations of one model
//! - **Classifier**: derives a typed [`Relationship`] from one declaration
//! - **GraphBuilder**: classifies every model into a [`ModelGraph`]
//!
//! ## Pipeline
//!
//! ```text
//! list_models() ──► ModelSource::describe() ──► Classifier ──► ModelGraph
//! ```
//!

// Module declarations
pub mod classifier;
pub mod enumerator;
pub mod graph;
pub mod manifest;
pub mod model;
pub mod relationship;
pub mod source;

// Re-export commonly used types at crate root
pub use classifier::{Classification, Classifier, ClassifierOptions};
pub use enumerator::{class_for_path, list_models};
pub use graph::{Edge, GraphBuilder, ModelGraph};
pub use manifest::{Manifest, ManifestModel, ManifestRelation, ManifestSource};
pub use model::{Attribute, ModelDescriptor, ModelNode, RawRelation, basename_of, namespace_of};
pub use relationship::{MorphInfo, PivotInfo, Relationship, ThroughInfo};
pub use source::ModelSource;

// Re-export core types that are commonly used with IR
pub use draftsman_core::{
    Cardinality, ConnectionStyle, DraftsmanError, DraftsmanResult, RelationKind,
};

/// Namespace that application classes live under
pub const DEFAULT_ROOT_NAMESPACE: &str = "App";

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    #[test]
    fn test_root_namespace() {
        assert_eq!(DEFAULT_ROOT_NAMESPACE, "App");
    }

    #[test]
    fn test_pipeline_end_to_end() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let app = temp_dir.path().join("app");
        std::fs::create_dir_all(app.join("Models")).unwrap();
        std::fs::write(app.join("Models/User.php"), "<?php\n").unwrap();
        std::fs::write(app.join("Models/Role.php"), "<?php\n").unwrap();

        let source = ManifestSource::from_json(
            r#"{"models": [
                {"class": "App\\Models\\User", "relations": [
                    {"name": "roles", "type": "BelongsToMany", "related": "App\\Models\\Role",
                     "accessors": {"getParentKeyName": "id", "getRelatedKeyName": "id",
                                   "getPivotClass": "Illuminate\\Database\\Eloquent\\Relations\\Pivot",
                                   "getTable": "role_user"}}
                ]},
                {"class": "App\\Models\\Role"}
            ]}"#,
        )
        .unwrap();

        let ids = list_models(&source, Path::new(&app), DEFAULT_ROOT_NAMESPACE);
        let graph = GraphBuilder::new(&source).build(&ids);

        assert_eq!(graph.len(), 2);
        let user = graph.model("App\\Models\\User").unwrap();
        let pivot = user.relations[0].pivot.as_ref().unwrap();
        assert_eq!(
            pivot.class.as_deref(),
            Some("Illuminate\\Database\\Eloquent\\Relations\\Pivot.role_user")
        );
    }
}
