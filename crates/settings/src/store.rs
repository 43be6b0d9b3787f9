//! Persistence of the settings document
//!
//! Writes go to a temporary file in the target directory which is then
//! renamed over the target, so readers see either the old or the new file.

use crate::document::SettingsDocument;
use crate::namespace::ModelNamespace;
use crate::parse::parse;
use crate::render::render;
use draftsman_core::{DraftsmanError, DraftsmanResult};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::NamedTempFile;

// ============================================================================
// Atomic writes
// ============================================================================

/// Replace `path` with `contents` in one step
///
/// Missing parent directories are created.
pub fn write_atomic(path: &Path, contents: &str) -> DraftsmanResult<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };

    std::fs::create_dir_all(&dir).map_err(|e| DraftsmanError::DirectoryCreate {
        path: dir.clone(),
        message: e.to_string(),
    })?;

    let write_error = |message: String| DraftsmanError::FileWrite {
        path: path.to_path_buf(),
        message,
    };

    let mut file = NamedTempFile::new_in(&dir).map_err(|e| write_error(e.to_string()))?;
    file.write_all(contents.as_bytes())
        .and_then(|_| file.as_file().sync_all())
        .map_err(|e| write_error(e.to_string()))?;
    file.persist(path).map_err(|e| write_error(e.error.to_string()))?;

    Ok(())
}

// ============================================================================
// Post-write hooks
// ============================================================================

/// Runs after every successful settings write
pub trait PostWriteHook {
    fn after_write(&self, path: &Path) -> DraftsmanResult<()>;
}

/// Runs an external command, e.g. the host framework's config-cache clear
#[derive(Debug, Clone)]
pub struct CommandHook {
    program: String,
    args: Vec<String>,
    working_dir: Option<PathBuf>,
}

impl CommandHook {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            working_dir: None,
        }
    }

    /// `php artisan config:clear` in `base_path`
    pub fn config_clear(base_path: impl Into<PathBuf>) -> Self {
        Self::new("php")
            .arg("artisan")
            .arg("config:clear")
            .current_dir(base_path)
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn current_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_dir = Some(dir.into());
        self
    }

    /// The command line, for logging
    pub fn command_line(&self) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl PostWriteHook for CommandHook {
    fn after_write(&self, path: &Path) -> DraftsmanResult<()> {
        let mut command = Command::new(&self.program);
        command.args(&self.args);
        if let Some(dir) = &self.working_dir {
            command.current_dir(dir);
        }

        let output = command.output().map_err(|e| {
            DraftsmanError::with_context(format!("running '{}'", self.command_line()), e.to_string())
        })?;

        if !output.status.success() {
            return Err(DraftsmanError::with_context(
                format!("running '{}'", self.command_line()),
                String::from_utf8_lossy(&output.stderr).trim().to_string(),
            ));
        }

        tracing::info!("Ran '{}' after writing '{}'", self.command_line(), path.display());
        Ok(())
    }
}

// ============================================================================
// SettingsStore
// ============================================================================

/// Loads and saves the settings file
pub struct SettingsStore {
    path: PathBuf,
    hook: Option<Box<dyn PostWriteHook>>,
}

impl SettingsStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            hook: None,
        }
    }

    /// Run `hook` after every save
    pub fn with_hook(mut self, hook: Box<dyn PostWriteHook>) -> Self {
        self.hook = Some(hook);
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.is_file()
    }

    /// Read the stored document; `None` when no file exists yet
    pub fn load(&self) -> DraftsmanResult<Option<SettingsDocument>> {
        let source = match std::fs::read_to_string(&self.path) {
            Ok(source) => source,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(DraftsmanError::FileRead {
                    path: self.path.clone(),
                    message: e.to_string(),
                });
            }
        };

        let document = parse(&source).map_err(|e| {
            DraftsmanError::with_context(format!("reading '{}'", self.path.display()), e.to_string())
        })?;
        Ok(Some(document))
    }

    /// Render and write the document, then run the hook
    pub fn save(&self, document: &SettingsDocument, namespace: &ModelNamespace) -> DraftsmanResult<()> {
        write_atomic(&self.path, &render(document, namespace))?;
        tracing::info!("Saved settings to '{}'", self.path.display());

        if let Some(hook) = &self.hook {
            hook.after_write(&self.path)?;
        }
        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::namespace::AppPaths;
    use pretty_assertions::assert_eq;
    use std::cell::RefCell;
    use std::rc::Rc;
    use tempfile::TempDir;

    struct RecordingHook(Rc<RefCell<Vec<PathBuf>>>);

    impl PostWriteHook for RecordingHook {
        fn after_write(&self, path: &Path) -> DraftsmanResult<()> {
            self.0.borrow_mut().push(path.to_path_buf());
            Ok(())
        }
    }

    fn namespace() -> ModelNamespace {
        ModelNamespace::from_models_path("app/Models", &AppPaths::new("/srv/shop"))
    }

    #[test]
    fn test_write_atomic_creates_parents() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nested/dir/file.txt");

        write_atomic(&path, "one").unwrap();
        write_atomic(&path, "two").unwrap();

        assert_eq!(std::fs::read_to_string(&path).unwrap(), "two");
        let leftovers = std::fs::read_dir(path.parent().unwrap()).unwrap().count();
        assert_eq!(leftovers, 1);
    }

    #[test]
    fn test_load_missing_is_none() {
        let temp_dir = TempDir::new().unwrap();
        let store = SettingsStore::new(temp_dir.path().join("config.php"));
        assert!(!store.exists());
        assert!(store.load().unwrap().is_none());
    }

    #[test]
    fn test_save_and_load() {
        let temp_dir = TempDir::new().unwrap();
        let calls = Rc::new(RefCell::new(Vec::new()));
        let store = SettingsStore::new(temp_dir.path().join("storage/draftsman/config.php"))
            .with_hook(Box::new(RecordingHook(calls.clone())));

        let document = SettingsDocument::defaults();
        store.save(&document, &namespace()).unwrap();

        assert_eq!(store.load().unwrap(), Some(document));
        assert_eq!(calls.borrow().as_slice(), &[store.path().to_path_buf()]);
    }

    #[test]
    fn test_load_reports_parse_errors() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.php");
        std::fs::write(&path, "<?php return [").unwrap();

        let err = SettingsStore::new(&path).load().unwrap_err();
        assert!(err.to_string().contains("config.php"));
    }

    #[test]
    fn test_failing_command_hook() {
        let hook = CommandHook::new("draftsman-test-no-such-program").arg("--flag");
        assert_eq!(hook.command_line(), "draftsman-test-no-such-program --flag");
        assert!(hook.after_write(Path::new("config.php")).is_err());
    }
}
