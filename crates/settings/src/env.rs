//! Keeping the project's `.env` file in step with the settings
//!
//! Every non-presentation setting maps to a `DRAFTSMAN_` variable:
//! `package.models_path` becomes `DRAFTSMAN_MODELS_PATH` and
//! `graph.grid_width` becomes `DRAFTSMAN_GRAPH_GRID_WIDTH`. Only variables
//! carrying that prefix are ever written.

use crate::document::{PACKAGE, PRESENTATION, SettingsDocument};
use crate::store::write_atomic;
use draftsman_core::{DraftsmanError, DraftsmanResult};
use regex::Regex;
use serde_json::Value;
use std::path::{Path, PathBuf};

/// Prefix of every variable this tool manages
pub const ENV_PREFIX: &str = "DRAFTSMAN_";

/// Key fragments that mark a variable as write-only
pub const SENSITIVE_MARKERS: [&str; 4] = ["KEY", "SECRET", "TOKEN", "PASSWORD"];

const ASSIGNMENT_PATTERN: &str = r"^(\s*(?:export\s+)?)([A-Z0-9_]+)\s*=(.*)$";

// ============================================================================
// Key mapping
// ============================================================================

/// Flatten a document into `DRAFTSMAN_` variables, in document order
///
/// The presentation section is skipped. Nested values extend the key with
/// their own upper-cased names or list indices; `-` and `.` become `_` and
/// camelCase is not split.
pub fn build_env_map(document: &SettingsDocument) -> Vec<(String, String)> {
    let mut map = Vec::new();
    for (section, value) in document.as_map() {
        if section == PRESENTATION {
            continue;
        }
        let prefix = if section == PACKAGE {
            String::new()
        } else {
            key_part(section)
        };
        flatten(&prefix, value, &mut map);
    }
    map
}

fn flatten(prefix: &str, value: &Value, out: &mut Vec<(String, String)>) {
    let join = |part: String| {
        if prefix.is_empty() {
            part
        } else {
            format!("{prefix}_{part}")
        }
    };

    match value {
        Value::Object(map) => {
            for (k, v) in map {
                flatten(&join(key_part(k)), v, out);
            }
        }
        Value::Array(items) => {
            for (i, v) in items.iter().enumerate() {
                flatten(&join(i.to_string()), v, out);
            }
        }
        scalar if !prefix.is_empty() => out.push((format!("{ENV_PREFIX}{prefix}"), scalar_to_env(scalar))),
        _ => {}
    }
}

fn key_part(name: &str) -> String {
    name.replace(['-', '.'], "_").to_ascii_uppercase()
}

fn scalar_to_env(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => "null".to_string(),
        other => other.to_string(),
    }
}

/// Check if a variable must never be read back
pub fn is_sensitive(key: &str) -> bool {
    let upper = key.to_ascii_uppercase();
    SENSITIVE_MARKERS.iter().any(|marker| upper.contains(marker))
}

/// Quote a value when it holds whitespace, `#` or quotes
pub fn quote_value(value: &str) -> String {
    if value
        .chars()
        .any(|c| c.is_whitespace() || c == '#' || c == '"' || c == '\'')
    {
        format!("\"{}\"", value.replace('\\', "\\\\").replace('"', "\\\""))
    } else {
        value.to_string()
    }
}

fn unquote_value(raw: &str) -> String {
    let raw = raw.trim();
    if raw.len() >= 2 && raw.starts_with('"') && raw.ends_with('"') {
        return raw[1..raw.len() - 1]
            .replace("\\\"", "\"")
            .replace("\\\\", "\\");
    }
    if raw.len() >= 2 && raw.starts_with('\'') && raw.ends_with('\'') {
        return raw[1..raw.len() - 1].to_string();
    }
    match raw.find(" #") {
        Some(i) => raw[..i].trim_end().to_string(),
        None => raw.to_string(),
    }
}

// ============================================================================
// EnvFile
// ============================================================================

/// An `.env` file held as lines, rewritten as a whole
#[derive(Debug, Clone)]
pub struct EnvFile {
    path: PathBuf,
    lines: Vec<String>,
    assignment: Regex,
}

/// What [`EnvFile::apply`] changed
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnvChanges {
    pub updated: Vec<String>,
    pub added: Vec<String>,
}

impl EnvChanges {
    /// Check if nothing changed
    pub fn is_empty(&self) -> bool {
        self.updated.is_empty() && self.added.is_empty()
    }
}

impl EnvFile {
    /// Read an env file; a missing file reads as empty
    pub fn load(path: impl AsRef<Path>) -> DraftsmanResult<Self> {
        let path = path.as_ref();
        let contents = match std::fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => String::new(),
            Err(e) => {
                return Err(DraftsmanError::FileRead {
                    path: path.to_path_buf(),
                    message: e.to_string(),
                });
            }
        };
        Self::parse(path, &contents)
    }

    /// Build from file contents
    pub fn parse(path: impl Into<PathBuf>, contents: &str) -> DraftsmanResult<Self> {
        let assignment = Regex::new(ASSIGNMENT_PATTERN)
            .map_err(|e| DraftsmanError::internal(format!("env pattern: {e}")))?;

        let mut lines: Vec<String> = contents.lines().map(str::to_string).collect();
        while lines.last().is_some_and(|l| l.trim().is_empty()) {
            lines.pop();
        }

        Ok(Self {
            path: path.into(),
            lines,
            assignment,
        })
    }

    /// Path the file is written to
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Every assigned key, in file order
    pub fn keys(&self) -> Vec<String> {
        self.entries().into_iter().map(|(k, _, _)| k).collect()
    }

    /// Check if a key is assigned
    pub fn contains(&self, key: &str) -> bool {
        self.line_of(key).is_some()
    }

    /// Read a value; sensitive keys always read as `None`
    pub fn get(&self, key: &str) -> Option<String> {
        if is_sensitive(key) {
            return None;
        }
        self.entries()
            .into_iter()
            .find(|(k, _, _)| k == key)
            .map(|(_, _, value)| unquote_value(&value))
    }

    /// `DRAFTSMAN_` variables that may be shown
    pub fn visible_entries(&self) -> Vec<(String, String)> {
        self.entries()
            .into_iter()
            .filter(|(k, _, _)| k.starts_with(ENV_PREFIX) && !is_sensitive(k))
            .map(|(k, _, value)| (k, unquote_value(&value)))
            .collect()
    }

    /// Apply updates to `DRAFTSMAN_` variables
    ///
    /// Existing variables are rewritten in place. Absent ones are appended
    /// only when `add_new` is set. Other variables are never touched.
    pub fn apply(&mut self, updates: &[(String, String)], add_new: bool) -> EnvChanges {
        let mut changes = EnvChanges::default();

        for (key, value) in updates {
            if !key.starts_with(ENV_PREFIX) {
                continue;
            }
            let value = quote_value(value);
            match self.line_of(key) {
                Some(index) => {
                    let lead = self
                        .assignment
                        .captures(&self.lines[index])
                        .map(|caps| caps[1].to_string())
                        .unwrap_or_default();
                    let line = format!("{lead}{key}={value}");
                    if self.lines[index] != line {
                        self.lines[index] = line;
                        changes.updated.push(key.clone());
                    }
                }
                None if add_new => {
                    self.lines.push(format!("{key}={value}"));
                    changes.added.push(key.clone());
                }
                None => tracing::debug!("Not adding absent env key {}", key),
            }
        }

        changes
    }

    /// File contents with a trailing newline
    pub fn render(&self) -> String {
        if self.lines.is_empty() {
            return String::new();
        }
        let mut out = self.lines.join("\n");
        out.push('\n');
        out
    }

    /// Replace the file on disk
    pub fn save(&self) -> DraftsmanResult<()> {
        write_atomic(&self.path, &self.render())
    }

    fn entries(&self) -> Vec<(String, usize, String)> {
        self.lines
            .iter()
            .enumerate()
            .filter_map(|(i, line)| {
                let caps = self.assignment.captures(line)?;
                Some((caps[2].to_string(), i, caps[3].to_string()))
            })
            .collect()
    }

    fn line_of(&self, key: &str) -> Option<usize> {
        self.entries()
            .into_iter()
            .find(|(k, _, _)| k == key)
            .map(|(_, i, _)| i)
    }
}

/// Write the document's `DRAFTSMAN_` variables into the env file
///
/// Does nothing unless `package.update_env` is on; new variables need
/// `package.add_env` as well. Returns whether the file was rewritten.
pub fn sync_env(document: &SettingsDocument, path: &Path) -> DraftsmanResult<bool> {
    if !document.flag("package.update_env") {
        return Ok(false);
    }

    let updates = build_env_map(document);
    if updates.is_empty() {
        return Ok(false);
    }

    let mut env = EnvFile::load(path)?;
    let changes = env.apply(&updates, document.flag("package.add_env"));
    if changes.is_empty() {
        tracing::debug!("Env file '{}' already up to date", path.display());
        return Ok(false);
    }

    env.save()?;
    tracing::info!(
        "Updated {} and added {} keys in '{}'",
        changes.updated.len(),
        changes.added.len(),
        path.display()
    );
    Ok(true)
}

// ============================================================================
// Tests
// ============================================================================
