//! Model enumeration
//!
//! Scans the application source directory and keeps every class file that
//! the model source reports as a concrete persistent model.

use crate::source::ModelSource;
use std::collections::BTreeSet;
use std::path::Path;
use walkdir::WalkDir;

/// Extension of class files
pub const SOURCE_EXTENSION: &str = "php";

/// List model identifiers below `app_dir`, sorted and deduplicated
///
/// Each `*.php` file maps to `root_namespace\Relative\Path\Name`. Candidates
/// that do not resolve, are not persistent models, or are abstract are left
/// out. An unreadable directory yields an empty list.
pub fn list_models(source: &dyn ModelSource, app_dir: &Path, root_namespace: &str) -> Vec<String> {
    if let Err(e) = std::fs::read_dir(app_dir) {
        tracing::warn!("Cannot scan '{}' for models: {}", app_dir.display(), e);
        return Vec::new();
    }

    let mut models = BTreeSet::new();

    for entry in WalkDir::new(app_dir)
        .follow_links(true)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
    {
        let Some(identifier) = class_for_path(app_dir, entry.path(), root_namespace) else {
            continue;
        };

        match source.type_info(&identifier) {
            Some(info) if info.is_concrete_model() => {
                models.insert(identifier);
            }
            Some(_) => tracing::debug!("Skipping non-model or abstract type '{}'", identifier),
            None => tracing::debug!("Skipping unresolvable type '{}'", identifier),
        }
    }

    models.into_iter().collect()
}

/// Map a class file below `app_dir` to its identifier
pub fn class_for_path(app_dir: &Path, path: &Path, root_namespace: &str) -> Option<String> {
    if path.extension().is_none_or(|ext| ext != SOURCE_EXTENSION) {
        return None;
    }

    let relative = path.strip_prefix(app_dir).ok()?.with_extension("");
    let segments: Vec<String> = relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect();

    if segments.is_empty() {
        return None;
    }

    let root = root_namespace.trim_matches('\\');
    let mut identifier = String::from(root);
    for segment in segments {
        if !identifier.is_empty() {
            identifier.push('\\');
        }
        identifier.push_str(&segment);
    }
    Some(identifier)
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::manifest::ManifestSource;
    use std::fs;
    use tempfile::TempDir;

    const MANIFEST: &str = r#"{
        "models": [
            {"class": "App\\Models\\User"},
            {"class": "App\\Models\\Post"},
            {"class": "App\\Models\\Base", "abstract": true},
            {"class": "App\\Support\\Money", "persistent": false},
            {"class": "App\\Models\\Blog\\Comment"}
        ]
    }"#;

    fn touch(dir: &Path, relative: &str) {
        let path = dir.join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, "<?php\n").unwrap();
    }

    #[test]
    fn test_class_for_path() {
        let app = Path::new("/srv/app");
        assert_eq!(
            class_for_path(app, Path::new("/srv/app/Models/User.php"), "App"),
            Some("App\\Models\\User".to_string())
        );
        assert_eq!(
            class_for_path(app, Path::new("/srv/app/Models/readme.md"), "App"),
            None
        );
        assert_eq!(
            class_for_path(app, Path::new("/elsewhere/User.php"), "App"),
            None
        );
    }

    #[test]
    fn test_list_models_filters_and_sorts() {
        let temp_dir = TempDir::new().unwrap();
        let app = temp_dir.path();
        touch(app, "Models/User.php");
        touch(app, "Models/Post.php");
        touch(app, "Models/Base.php");
        touch(app, "Support/Money.php");
        touch(app, "Models/Blog/Comment.php");
        touch(app, "Http/Controllers/HomeController.php");
        touch(app, "Models/notes.txt");

        let source = ManifestSource::from_json(MANIFEST).unwrap();
        let models = list_models(&source, app, "App");

        assert_eq!(
            models,
            vec![
                "App\\Models\\Blog\\Comment".to_string(),
                "App\\Models\\Post".to_string(),
                "App\\Models\\User".to_string(),
            ]
        );
    }

    #[test]
    fn test_unreadable_root_is_empty() {
        let source = ManifestSource::from_json(MANIFEST).unwrap();
        let models = list_models(&source, Path::new("/nonexistent/app"), "App");
        assert!(models.is_empty());
    }
}
