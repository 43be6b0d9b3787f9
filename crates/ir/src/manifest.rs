//! Manifest-backed model source
//!
//! The host application dumps what it knows about its models into a JSON
//! manifest: per model, the `model:show --json` style description, the type
//! flags used by enumeration, and per relation the results of the framework
//! accessors. [`ManifestSource`] serves that dump through [`ModelSource`],
//! so the whole pipeline runs without a live host runtime.
//!
//! ```json
//! {
//!   "models": [{
//!     "class": "App\\Models\\User",
//!     "table": "users",
//!     "attributes": [{"name": "id", "type": "integer", "nullable": false}],
//!     "relations": [{
//!       "name": "posts", "type": "HasMany", "related": "App\\Models\\Post",
//!       "accessors": {"getLocalKeyName": "id", "getForeignKeyName": "user_id"}
//!     }]
//!   }]
//! }
//! ```
//!
//! An accessor value may be a string, `null`, or `{"error": "..."}` for an
//! accessor that raises. A model with a non-zero `status` or an `error`
//! fails to describe; a relation with an `error` cannot be obtained.

use crate::model::{Attribute, ModelDescriptor, RawRelation};
use crate::source::ModelSource;
use draftsman_core::{Accessor, DraftsmanError, DraftsmanResult, RelationAccessor, TypeInfo};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::path::Path;

// ============================================================================
// Manifest File Format
// ============================================================================

/// Root of a manifest file
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Manifest {
    #[serde(default)]
    pub models: Vec<ManifestModel>,
}

/// One model entry of the manifest
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ManifestModel {
    pub class: String,

    #[serde(rename = "abstract", default)]
    pub is_abstract: bool,

    #[serde(default = "default_true")]
    pub persistent: bool,

    /// Exit status of the describe command; non-zero means failure
    #[serde(default)]
    pub status: i32,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub table: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub database: Option<String>,

    #[serde(default)]
    pub attributes: Vec<Attribute>,

    #[serde(default)]
    pub relations: Vec<ManifestRelation>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// One relation entry of the manifest
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ManifestRelation {
    #[serde(flatten)]
    pub declaration: RawRelation,

    /// Accessor method name to result
    #[serde(default)]
    pub accessors: Map<String, Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

fn default_true() -> bool {
    true
}

// ============================================================================
// ManifestSource
// ============================================================================

/// A [`ModelSource`] answering from a loaded manifest
#[derive(Debug, Clone, Default)]
pub struct ManifestSource {
    manifest: Manifest,
    index: HashMap<String, usize>,
}

impl ManifestSource {
    /// Build a source from a manifest
    pub fn new(manifest: Manifest) -> Self {
        let index = manifest
            .models
            .iter()
            .enumerate()
            .map(|(i, m)| (m.class.clone(), i))
            .collect();
        Self { manifest, index }
    }

    /// Parse a manifest from a JSON string
    pub fn from_json(json: &str) -> DraftsmanResult<Self> {
        let manifest: Manifest = serde_json::from_str(json)
            .map_err(|e| DraftsmanError::InvalidManifest(e.to_string()))?;
        Ok(Self::new(manifest))
    }

    /// Load a manifest file
    pub fn load(path: impl AsRef<Path>) -> DraftsmanResult<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|e| DraftsmanError::FileRead {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        Self::from_json(&json)
    }

    /// Get the underlying manifest
    pub fn manifest(&self) -> &Manifest {
        &self.manifest
    }

    /// Number of models in the manifest
    pub fn len(&self) -> usize {
        self.manifest.models.len()
    }

    /// Check if the manifest lists no models
    pub fn is_empty(&self) -> bool {
        self.manifest.models.is_empty()
    }

    fn entry(&self, identifier: &str) -> Option<&ManifestModel> {
        self.index
            .get(identifier)
            .map(|&i| &self.manifest.models[i])
    }
}

impl ModelSource for ManifestSource {
    fn type_info(&self, identifier: &str) -> Option<TypeInfo> {
        self.entry(identifier).map(|m| TypeInfo {
            persistent: m.persistent,
            is_abstract: m.is_abstract,
        })
    }

    fn describe(&self, identifier: &str) -> DraftsmanResult<ModelDescriptor> {
        let model = self
            .entry(identifier)
            .ok_or_else(|| DraftsmanError::ModelNotFound(identifier.to_string()))?;

        if let Some(error) = &model.error {
            return Err(DraftsmanError::describe(identifier, error.clone()));
        }
        if model.status != 0 {
            return Err(DraftsmanError::describe(
                identifier,
                format!("describe exited with status {}", model.status),
            ));
        }

        Ok(ModelDescriptor {
            class: model.class.clone(),
            file: model.file.clone(),
            table: model.table.clone(),
            database: model.database.clone(),
            attributes: model.attributes.clone(),
            relations: model
                .relations
                .iter()
                .map(|r| r.declaration.clone())
                .collect(),
            extra: model.extra.clone(),
        })
    }

    fn relation(
        &self,
        identifier: &str,
        name: &str,
    ) -> DraftsmanResult<Box<dyn RelationAccessor + '_>> {
        let model = self
            .entry(identifier)
            .ok_or_else(|| DraftsmanError::ModelNotFound(identifier.to_string()))?;

        let relation = model
            .relations
            .iter()
            .find(|r| r.declaration.name == name)
            .ok_or_else(|| DraftsmanError::RelationUnavailable {
                model: identifier.to_string(),
                relation: name.to_string(),
                message: "relation method not found".to_string(),
            })?;

        if let Some(error) = &relation.error {
            return Err(DraftsmanError::RelationUnavailable {
                model: identifier.to_string(),
                relation: name.to_string(),
                message: error.clone(),
            });
        }

        Ok(Box::new(ManifestAccessor {
            model: &model.class,
            relation,
        }))
    }
}

/// Accessor results recorded for one relation
struct ManifestAccessor<'a> {
    model: &'a str,
    relation: &'a ManifestRelation,
}

impl RelationAccessor for ManifestAccessor<'_> {
    fn invoke(&self, accessor: Accessor) -> DraftsmanResult<Option<String>> {
        match self.relation.accessors.get(accessor.method_name()) {
            None | Some(Value::Null) => Ok(None),
            Some(Value::String(s)) => Ok(Some(s.clone())),
            Some(Value::Object(obj)) if obj.contains_key("error") => {
                let message = obj
                    .get("error")
                    .and_then(Value::as_str)
                    .unwrap_or("accessor raised")
                    .to_string();
                Err(DraftsmanError::Accessor {
                    model: self.model.to_string(),
                    relation: self.relation.declaration.name.clone(),
                    accessor: accessor.method_name().to_string(),
                    message,
                })
            }
            Some(other) => Ok(Some(other.to_string())),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
