//! Locations of the host project's files

use draftsman_ir::{
    ClassifierOptions, DEFAULT_ROOT_NAMESPACE, GraphBuilder, ManifestSource, ModelGraph,
    list_models,
};
use draftsman_settings::{AppPaths, CommandHook, SettingsManager, SettingsStore};
use std::path::{Path, PathBuf};

/// Settings file, relative to the project root
pub const SETTINGS_FILE: &str = "storage/draftsman/config.php";
/// Model manifest, relative to the project root
pub const MANIFEST_FILE: &str = "storage/draftsman/models.json";
/// Env file, relative to the project root
pub const ENV_FILE: &str = ".env";

/// The host project as seen by one command invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Workspace {
    pub base_path: PathBuf,
    pub app_path: PathBuf,
    pub root_namespace: String,
    pub manifest_path: PathBuf,
    pub settings_path: PathBuf,
    pub env_path: PathBuf,
    /// Run the host's config-cache clear after settings writes
    pub clear_cache: bool,
}

impl Workspace {
    /// Conventional layout below `base_path`
    pub fn new(base_path: impl Into<PathBuf>) -> Self {
        let base_path = base_path.into();
        Self {
            app_path: base_path.join("app"),
            root_namespace: DEFAULT_ROOT_NAMESPACE.to_string(),
            manifest_path: base_path.join(MANIFEST_FILE),
            settings_path: base_path.join(SETTINGS_FILE),
            env_path: base_path.join(ENV_FILE),
            clear_cache: false,
            base_path,
        }
    }

    pub fn with_manifest(mut self, path: impl Into<PathBuf>) -> Self {
        self.manifest_path = path.into();
        self
    }

    pub fn with_settings(mut self, path: impl Into<PathBuf>) -> Self {
        self.settings_path = path.into();
        self
    }

    pub fn with_clear_cache(mut self, clear_cache: bool) -> Self {
        self.clear_cache = clear_cache;
        self
    }

    /// Resolve a possibly relative path against the project root
    pub fn resolve(&self, path: impl AsRef<Path>) -> PathBuf {
        let path = path.as_ref();
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.base_path.join(path)
        }
    }

    pub fn app_paths(&self) -> AppPaths {
        AppPaths {
            base_path: self.base_path.clone(),
            app_path: self.app_path.clone(),
            root_namespace: self.root_namespace.clone(),
        }
    }

    /// The model source; a missing or unreadable manifest yields an empty one
    pub fn model_source(&self) -> ManifestSource {
        match ManifestSource::load(&self.manifest_path) {
            Ok(source) => {
                tracing::debug!(
                    "Loaded {} models from '{}'",
                    source.len(),
                    self.manifest_path.display()
                );
                source
            }
            Err(e) => {
                tracing::warn!("No model manifest available: {}", e);
                ManifestSource::default()
            }
        }
    }

    /// Enumerate, describe and classify every model
    pub fn graph(&self, options: ClassifierOptions) -> ModelGraph {
        let source = self.model_source();
        let identifiers = list_models(&source, &self.app_path, &self.root_namespace);
        GraphBuilder::with_options(&source, options).build(&identifiers)
    }

    /// Settings access for this project
    pub fn settings(&self) -> SettingsManager {
        let mut store = SettingsStore::new(&self.settings_path);
        if self.clear_cache {
            store = store.with_hook(Box::new(CommandHook::config_clear(&self.base_path)));
        }
        SettingsManager::new(store, &self.env_path, self.app_paths())
    }
}

// ============================================================================
// Tests
// ============================================================================
