//! Model descriptors
//!
//! A [`ModelDescriptor`] is what the model layer reports for one model class:
//! its attributes and its raw, unclassified relation declarations. After
//! classification the same model is exposed as a [`ModelNode`], the node type
//! of the relationship graph.

use crate::relationship::Relationship;
use draftsman_core::RelationKind;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

// ============================================================================
// Attribute
// ============================================================================

/// A persisted attribute (column) of a model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attribute {
    /// Column name
    pub name: String,

    /// Storage type as reported by the database (e.g. "varchar", "integer")
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub storage_type: Option<String>,

    /// Whether the column accepts NULL; unknown when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nullable: Option<bool>,

    /// Remaining fields reported by the model layer, kept verbatim
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Attribute {
    /// Create an attribute with only a name
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            storage_type: None,
            nullable: None,
            extra: Map::new(),
        }
    }

    /// Set nullability
    pub fn with_nullable(mut self, nullable: bool) -> Self {
        self.nullable = Some(nullable);
        self
    }
}

// ============================================================================
// RawRelation
// ============================================================================

/// A relation declaration as reported by the model layer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawRelation {
    /// Relation method name on the owning model
    pub name: String,

    /// Declared framework kind
    #[serde(rename = "type")]
    pub kind: RelationKind,

    /// Fully-qualified identifier of the related model
    pub related: String,

    /// Source file declaring the relation method
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,

    /// Line of the relation method
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line: Option<u32>,
}

impl RawRelation {
    /// Create a relation declaration
    pub fn new(name: impl Into<String>, kind: RelationKind, related: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind,
            related: related.into(),
            file: None,
            line: None,
        }
    }
}

// ============================================================================
// ModelDescriptor
// ============================================================================

/// Unclassified description of one model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelDescriptor {
    /// Fully-qualified model identifier
    pub class: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub table: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub database: Option<String>,

    /// Attributes in declaration order
    #[serde(default)]
    pub attributes: Vec<Attribute>,

    /// Relation declarations in declaration order
    #[serde(default)]
    pub relations: Vec<RawRelation>,

    /// Remaining fields reported by the model layer (policy, observers, ...)
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ModelDescriptor {
    /// Create an empty descriptor
    pub fn new(class: impl Into<String>) -> Self {
        Self {
            class: class.into(),
            file: None,
            table: None,
            database: None,
            attributes: Vec::new(),
            relations: Vec::new(),
            extra: Map::new(),
        }
    }

    /// Add an attribute
    pub fn with_attribute(mut self, attribute: Attribute) -> Self {
        self.attributes.push(attribute);
        self
    }

    /// Add a relation declaration
    pub fn with_relation(mut self, relation: RawRelation) -> Self {
        self.relations.push(relation);
        self
    }

    /// Find an attribute by name
    pub fn attribute(&self, name: &str) -> Option<&Attribute> {
        self.attributes.iter().find(|a| a.name == name)
    }

    /// Namespace part of the class identifier
    pub fn namespace(&self) -> &str {
        namespace_of(&self.class)
    }
}

/// Everything before the last namespace separator
pub fn namespace_of(class: &str) -> &str {
    class.rfind('\\').map_or("", |idx| &class[..idx])
}

/// Everything after the last namespace separator
pub fn basename_of(class: &str) -> &str {
    class.rsplit('\\').next().unwrap_or(class)
}

// ============================================================================
// ModelNode
// ============================================================================

/// Keys a node computes itself; upstream values for them are discarded
const NODE_KEYS: [&str; 5] = [
    "namespace",
    "attributes",
    "attributes_count",
    "relations",
    "relations_count",
];

/// A model with classified relationships, as served to the editor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelNode {
    pub class: String,
    pub namespace: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub table: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub database: Option<String>,

    pub attributes: Vec<Attribute>,
    pub attributes_count: usize,
    pub relations: Vec<Relationship>,
    pub relations_count: usize,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ModelNode {
    /// Build a node from a descriptor and its surviving relationships
    ///
    /// Counts are always taken from the final lists.
    pub fn from_descriptor(descriptor: ModelDescriptor, relations: Vec<Relationship>) -> Self {
        let namespace = descriptor.namespace().to_string();
        let mut extra = descriptor.extra;
        for key in NODE_KEYS {
            extra.remove(key);
        }
        Self {
            class: descriptor.class,
            namespace,
            file: descriptor.file,
            table: descriptor.table,
            database: descriptor.database,
            attributes_count: descriptor.attributes.len(),
            attributes: descriptor.attributes,
            relations_count: relations.len(),
            relations,
            extra,
        }
    }

    /// Short class name
    pub fn basename(&self) -> &str {
        basename_of(&self.class)
    }
}

// ============================================================================
// Tests
// ============================================================================
