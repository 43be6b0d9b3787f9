//! Support snapshots
//!
//! Collects the model graph together with settings, `composer.json` and a
//! short environment report into one pretty-printed JSON file, for
//! attaching to bug reports.

use crate::workspace::Workspace;
use chrono::{DateTime, Local};
use draftsman_core::{DraftsmanError, DraftsmanResult};
use draftsman_ir::ClassifierOptions;
use draftsman_settings::{EnvFile, write_atomic};
use serde_json::{Map, Value, json};
use std::path::{Path, PathBuf};

/// Section that is always present
pub const MODELS_SECTION: &str = "models";

/// Sections that may be excluded
pub const OPTIONAL_SECTIONS: [&str; 3] = ["config", "composer", "environment"];

/// Default snapshot directory when the settings do not name one
pub const DEFAULT_SNAPSHOT_DIR: &str = "storage/app/draftsman/snapshots";

/// Options of one snapshot run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SnapshotOptions {
    /// Normalized section names to leave out
    pub exclude: Vec<String>,
    /// Target file (`*.json`) or directory
    pub path: Option<PathBuf>,
}

impl SnapshotOptions {
    /// Build from raw `--exclude` values
    pub fn new(raw_exclude: &[String], path: Option<PathBuf>) -> Self {
        Self {
            exclude: normalize_excludes(raw_exclude),
            path,
        }
    }

    fn includes(&self, section: &str) -> bool {
        !self.exclude.iter().any(|s| s == section)
    }
}

/// Split comma lists, trim quotes and blanks, lower-case and deduplicate
///
/// `models` is dropped with a warning; it cannot be excluded.
pub fn normalize_excludes(raw: &[String]) -> Vec<String> {
    let mut items: Vec<String> = Vec::new();
    for part in raw.iter().flat_map(|entry| entry.split(',')) {
        let item = part
            .trim()
            .trim_matches(|c| c == '"' || c == '\'' || c == ' ')
            .to_lowercase();
        if item.is_empty() || items.contains(&item) {
            continue;
        }
        if item == MODELS_SECTION {
            tracing::warn!("The models section cannot be excluded");
            continue;
        }
        if !OPTIONAL_SECTIONS.contains(&item.as_str()) {
            tracing::warn!("Unknown snapshot section '{}'", item);
        }
        items.push(item);
    }
    items
}

// ============================================================================
// Collection
// ============================================================================

/// Collect every requested section
pub fn collect(ws: &Workspace, options: &SnapshotOptions) -> Map<String, Value> {
    let mut snapshot = Map::new();

    match serde_json::to_value(ws.graph(ClassifierOptions::default())) {
        Ok(models) => {
            snapshot.insert(MODELS_SECTION.into(), models);
        }
        Err(e) => {
            snapshot.insert(
                "models_error".into(),
                json!(format!("Error collecting model data: {e}")),
            );
        }
    }

    if options.includes("config") {
        config_section(ws, &mut snapshot);
    }
    if options.includes("composer") {
        composer_section(&ws.base_path.join("composer.json"), &mut snapshot);
    }
    if options.includes("environment") {
        snapshot.insert("environment".into(), environment_section(ws));
    }

    snapshot
}

fn config_section(ws: &Workspace, snapshot: &mut Map<String, Value>) {
    match ws.settings().get_config() {
        Ok(config) => {
            snapshot.insert("config".into(), config.to_value());
        }
        Err(e) => {
            snapshot.insert(
                "config_error".into(),
                json!(format!("Error reading Draftsman config: {e}")),
            );
        }
    }
}

fn composer_section(path: &Path, snapshot: &mut Map<String, Value>) {
    let contents = match std::fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            snapshot.insert(
                "composer_path".into(),
                json!(format!("composer.json not found at {}", path.display())),
            );
            return;
        }
        Err(e) => {
            snapshot.insert(
                "composer_error".into(),
                json!(format!("Error reading composer.json: {e}")),
            );
            return;
        }
    };

    match serde_json::from_str::<Value>(&contents) {
        Ok(composer) => {
            snapshot.insert("composer".into(), composer);
        }
        Err(e) => {
            snapshot.insert(
                "composer_error".into(),
                json!(format!("Could not decode composer.json: {e}")),
            );
            snapshot.insert("composer_raw".into(), Value::String(contents));
        }
    }
}

fn environment_section(ws: &Workspace) -> Value {
    let variables: Map<String, Value> = EnvFile::load(&ws.env_path)
        .map(|env| {
            env.visible_entries()
                .into_iter()
                .map(|(k, v)| (k, Value::String(v)))
                .collect()
        })
        .unwrap_or_default();

    json!({
        "tool": crate::NAME,
        "version": crate::VERSION,
        "os": std::env::consts::OS,
        "arch": std::env::consts::ARCH,
        "base_path": ws.base_path.display().to_string(),
        "variables": variables,
    })
}

// ============================================================================
// Output
// ============================================================================

/// Where the snapshot goes
///
/// A path ending in `.json` is the file itself; anything else is a
/// directory that receives a timestamped file.
pub fn target_path(ws: &Workspace, requested: Option<&Path>, now: DateTime<Local>) -> PathBuf {
    let requested = match requested {
        Some(path) if !path.as_os_str().is_empty() => ws.resolve(path),
        _ => {
            let configured = ws
                .settings()
                .get_config()
                .ok()
                .and_then(|c| c.get_str("package.snapshot_path").map(str::to_string))
                .unwrap_or_else(|| DEFAULT_SNAPSHOT_DIR.to_string());
            ws.resolve(configured)
        }
    };

    let is_file = requested
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
    if is_file {
        requested
    } else {
        requested.join(format!(
            "draftsman_snapshot_{}.json",
            now.format("%Y-%m-%d_%H-%M-%S")
        ))
    }
}

/// Collect and write a snapshot, returning the written path
pub fn write_snapshot(ws: &Workspace, options: &SnapshotOptions) -> DraftsmanResult<PathBuf> {
    let snapshot = collect(ws, options);
    let path = target_path(ws, options.path.as_deref(), Local::now());

    let json = serde_json::to_string_pretty(&snapshot)
        .map_err(|e| DraftsmanError::with_context("encoding snapshot", e.to_string()))?;
    write_atomic(&path, &json)?;

    tracing::info!("Snapshot written to '{}'", path.display());
    Ok(path)
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use tempfile::TempDir;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_normalize_excludes() {
        assert_eq!(
            normalize_excludes(&strings(&["Config,'composer'", "config", " models ", ""])),
            strings(&["config", "composer"])
        );
    }

    #[test]
    fn test_collect_sections() {
        let temp_dir = TempDir::new().unwrap();
        let ws = Workspace::new(temp_dir.path());
        std::fs::write(ws.base_path.join("composer.json"), r#"{"name": "acme/shop"}"#).unwrap();
        std::fs::write(&ws.env_path, "DRAFTSMAN_EDITOR=vscode\nDRAFTSMAN_SECRET=x\nAPP_KEY=y\n")
            .unwrap();

        let snapshot = collect(&ws, &SnapshotOptions::default());
        assert_eq!(snapshot["models"], json!([]));
        assert_eq!(snapshot["config"]["package"]["editor"], json!("vscode"));
        assert_eq!(snapshot["composer"]["name"], json!("acme/shop"));
        assert_eq!(
            snapshot["environment"]["variables"],
            json!({"DRAFTSMAN_EDITOR": "vscode"})
        );
    }

    #[test]
    fn test_collect_respects_excludes() {
        let temp_dir = TempDir::new().unwrap();
        let ws = Workspace::new(temp_dir.path());

        let options = SnapshotOptions::new(&strings(&["config,environment", "models"]), None);
        let snapshot = collect(&ws, &options);

        assert!(snapshot.contains_key("models"));
        assert!(!snapshot.contains_key("config"));
        assert!(!snapshot.contains_key("environment"));
        assert!(snapshot["composer_path"].as_str().unwrap().contains("composer.json"));
    }

    #[test]
    fn test_undecodable_composer() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("composer.json");
        std::fs::write(&path, "{broken").unwrap();

        let mut snapshot = Map::new();
        composer_section(&path, &mut snapshot);
        assert!(snapshot.contains_key("composer_error"));
        assert_eq!(snapshot["composer_raw"], json!("{broken"));
    }

    #[test]
    fn test_target_path() {
        let ws = Workspace::new("/srv/shop");
        let now = Local.with_ymd_and_hms(2026, 3, 4, 5, 6, 7).unwrap();

        assert_eq!(
            target_path(&ws, Some(Path::new("out/custom.JSON")), now),
            PathBuf::from("/srv/shop/out/custom.JSON")
        );
        assert_eq!(
            target_path(&ws, Some(Path::new("/tmp/snaps")), now),
            PathBuf::from("/tmp/snaps/draftsman_snapshot_2026-03-04_05-06-07.json")
        );
        assert_eq!(
            target_path(&ws, None, now),
            PathBuf::from(
                "/srv/shop/storage/app/draftsman/snapshots/draftsman_snapshot_2026-03-04_05-06-07.json"
            )
        );
    }

    #[test]
    fn test_write_snapshot() {
        let temp_dir = TempDir::new().unwrap();
        let ws = Workspace::new(temp_dir.path());
        let target = temp_dir.path().join("snapshots/report.json");

        let options = SnapshotOptions::new(&[], Some(target.clone()));
        let written = write_snapshot(&ws, &options).unwrap();

        assert_eq!(written, target);
        let value: Value = serde_json::from_str(&std::fs::read_to_string(&target).unwrap()).unwrap();
        assert!(value.get("models").is_some());
    }
}
