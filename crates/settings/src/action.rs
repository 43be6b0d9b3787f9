//! Reading and updating the effective settings

use crate::document::SettingsDocument;
use crate::env::sync_env;
use crate::merge::{merge_settings, models_namespace};
use crate::namespace::AppPaths;
use crate::store::SettingsStore;
use draftsman_core::{DraftsmanError, DraftsmanResult};
use serde::Serialize;
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};

/// Message returned after a successful update
pub const UPDATE_SUCCESS_MESSAGE: &str = "Draftsman configuration updated successfully.";

/// Result of [`SettingsManager::update_config`]
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UpdateOutcome {
    pub message: String,
    pub config: SettingsDocument,
    pub env_updated: bool,
}

/// The settings file, the env file and the app layout they refer to
pub struct SettingsManager {
    store: SettingsStore,
    env_path: PathBuf,
    paths: AppPaths,
}

impl SettingsManager {
    pub fn new(store: SettingsStore, env_path: impl Into<PathBuf>, paths: AppPaths) -> Self {
        Self {
            store,
            env_path: env_path.into(),
            paths,
        }
    }

    pub fn store(&self) -> &SettingsStore {
        &self.store
    }

    pub fn env_path(&self) -> &Path {
        &self.env_path
    }

    pub fn paths(&self) -> &AppPaths {
        &self.paths
    }

    /// Defaults with the stored document merged over them
    pub fn get_config(&self) -> DraftsmanResult<SettingsDocument> {
        let defaults = SettingsDocument::defaults();
        match self.store.load()? {
            Some(stored) => Ok(merge_settings(&defaults, stored.as_map(), &self.paths)),
            None => Ok(defaults),
        }
    }

    /// Merge `payload` into the effective settings, persist, and sync the env file
    ///
    /// A payload that is not a mapping is rejected before anything is read
    /// or written.
    pub fn update_config(&self, payload: &Value) -> DraftsmanResult<UpdateOutcome> {
        let Value::Object(incoming) = payload else {
            return Err(DraftsmanError::invalid_payload(format!(
                "expected a settings mapping, got {}",
                kind_of(payload)
            )));
        };

        let current = self.get_config()?;
        let merged = merge_settings(&current, incoming, &self.paths);
        let namespace = models_namespace(&merged, &Map::new(), &self.paths);

        self.store.save(&merged, &namespace)?;
        let env_updated = sync_env(&merged, &self.env_path)?;

        Ok(UpdateOutcome {
            message: UPDATE_SUCCESS_MESSAGE.to_string(),
            config: merged,
            env_updated,
        })
    }

    /// Write the defaults unless a settings file already exists
    ///
    /// Returns whether a file was written.
    pub fn publish_defaults(&self) -> DraftsmanResult<bool> {
        if self.store.exists() {
            tracing::info!("Settings file '{}' already exists", self.store.path().display());
            return Ok(false);
        }
        let defaults = SettingsDocument::defaults();
        let namespace = models_namespace(&defaults, &Map::new(), &self.paths);
        self.store.save(&defaults, &namespace)?;
        Ok(true)
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a list",
        Value::Object(_) => "a mapping",
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::PRESENTATION;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use tempfile::TempDir;

    fn manager(temp_dir: &TempDir) -> SettingsManager {
        let base = temp_dir.path();
        SettingsManager::new(
            SettingsStore::new(base.join("storage/draftsman/config.php")),
            base.join(".env"),
            AppPaths::new(base),
        )
    }

    #[test]
    fn test_get_config_without_file_is_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let config = manager(&temp_dir).get_config().unwrap();
        assert_eq!(config, SettingsDocument::defaults());
    }

    #[test]
    fn test_update_resolves_and_filters_presentation() {
        let temp_dir = TempDir::new().unwrap();
        let manager = manager(&temp_dir);

        let outcome = manager
            .update_config(&json!({
                "presentation": {"User": {"icon": "x", "class": "y", "extra": "z"}}
            }))
            .unwrap();

        assert_eq!(outcome.message, UPDATE_SUCCESS_MESSAGE);
        assert!(!outcome.env_updated);

        let stored = manager.store().load().unwrap().unwrap();
        assert_eq!(
            stored.section(PRESENTATION).cloned().map(Value::Object),
            Some(json!({"App\\Models\\User": {"icon": "x", "class": "y"}}))
        );

        let written = std::fs::read_to_string(manager.store().path()).unwrap();
        assert!(written.contains("App\\Models\\User::class => ["));
        assert!(!written.contains("extra"));
    }

    #[test]
    fn test_invalid_payload_writes_nothing() {
        let temp_dir = TempDir::new().unwrap();
        let manager = manager(&temp_dir);

        let err = manager.update_config(&json!("not-an-object")).unwrap_err();
        assert!(err.is_client_error());
        assert!(!manager.store().exists());
        assert!(!manager.env_path().exists());
    }

    #[test]
    fn test_update_keeps_earlier_updates() {
        let temp_dir = TempDir::new().unwrap();
        let manager = manager(&temp_dir);

        manager
            .update_config(&json!({"graph": {"grid_width": 30}}))
            .unwrap();
        let outcome = manager
            .update_config(&json!({"front": {"history_length": 10}}))
            .unwrap();

        assert_eq!(outcome.config.get_path("graph.grid_width"), Some(&json!(30)));
        assert_eq!(outcome.config.get_path("front.history_length"), Some(&json!(10)));
        assert_eq!(manager.get_config().unwrap(), outcome.config);
    }

    #[test]
    fn test_update_syncs_env() {
        let temp_dir = TempDir::new().unwrap();
        let manager = manager(&temp_dir);
        std::fs::write(manager.env_path(), "APP_NAME=Shop\nDRAFTSMAN_EDITOR=vscode\n").unwrap();

        let outcome = manager
            .update_config(&json!({"package": {"editor": "php-storm", "update_env": true}}))
            .unwrap();

        assert!(outcome.env_updated);
        assert_eq!(
            std::fs::read_to_string(manager.env_path()).unwrap(),
            "APP_NAME=Shop\nDRAFTSMAN_EDITOR=php-storm\n"
        );
    }

    #[test]
    fn test_update_adds_env_keys_when_allowed() {
        let temp_dir = TempDir::new().unwrap();
        let manager = manager(&temp_dir);
        std::fs::write(manager.env_path(), "APP_NAME=Shop\n").unwrap();

        let outcome = manager
            .update_config(&json!({"package": {"update_env": true, "add_env": true}}))
            .unwrap();

        assert!(outcome.env_updated);
        let env = crate::env::EnvFile::load(manager.env_path()).unwrap();
        assert!(env.contains("DRAFTSMAN_MODELS_PATH"));
        assert!(env.contains("DRAFTSMAN_GRAPH_GRID_WIDTH"));
        assert!(!env.contains("DRAFTSMAN_PRESENTATION"));
    }

    #[test]
    fn test_publish_defaults_once() {
        let temp_dir = TempDir::new().unwrap();
        let manager = manager(&temp_dir);

        assert!(manager.publish_defaults().unwrap());
        assert!(!manager.publish_defaults().unwrap());
        assert_eq!(manager.get_config().unwrap(), SettingsDocument::defaults());
    }
}
