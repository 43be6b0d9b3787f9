//! Classified relationships
//!
//! A [`Relationship`] is the graph edge derived from one raw relation
//! declaration: cardinality, connection style, join attributes, optional
//! pivot/through/morph metadata and the keys used to identify it.

use draftsman_core::{Cardinality, ConnectionStyle, RelationKind};
use serde::{Deserialize, Serialize};

// ============================================================================
// Relationship
// ============================================================================

/// A classified relationship between two models
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Relationship {
    /// Relation method name on the owning model
    pub name: String,

    /// Declared framework kind
    pub framework_type: RelationKind,

    /// Semantic cardinality (null for unrecognized kinds)
    #[serde(rename = "type")]
    pub cardinality: Option<Cardinality>,

    pub connection: Option<ConnectionStyle>,

    /// Crow's-foot multiplicity at the owning end
    pub multiplicity: Option<Cardinality>,

    pub mandatory: bool,

    /// `Owner.method`, unique per relationship instance
    pub key: String,

    /// Canonical pair key shared by a relationship and its inverse
    pub relationship_key: Option<String>,

    pub from: String,
    pub from_attribute: Option<String>,
    pub to: String,
    pub to_attribute: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pivot: Option<PivotInfo>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub through: Option<ThroughInfo>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub morph: Option<MorphInfo>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line: Option<u32>,
}

// ============================================================================
// Metadata
// ============================================================================

/// Join-table metadata of many-to-many relationships
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PivotInfo {
    /// Pivot model class; generic pivots carry a `.table` suffix
    pub class: Option<String>,
    /// Pivot column referencing the owning model
    pub from: Option<String>,
    /// Pivot column referencing the related model
    pub to: Option<String>,
}

/// Intermediate-model metadata of through-chain relationships
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThroughInfo {
    /// Intermediate model class
    pub class: Option<String>,
    /// Key on the intermediate model referencing the owner
    pub from: Option<String>,
    /// Local key on the intermediate model
    pub to: Option<String>,
}

/// Discriminator metadata of polymorphic relationships
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MorphInfo {
    /// Column storing the target type
    pub attribute: Option<String>,
    /// `related.to_attribute.attribute`
    pub key: String,
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> Relationship {
        Relationship {
            name: "author".to_string(),
            framework_type: RelationKind::BelongsTo,
            cardinality: Some(Cardinality::One),
            connection: Some(ConnectionStyle::Direct),
            multiplicity: Some(Cardinality::Many),
            mandatory: true,
            key: "App\\Models\\Post.author".to_string(),
            relationship_key: Some("App\\Models\\User.id.App\\Models\\Post.user_id".to_string()),
            from: "App\\Models\\Post".to_string(),
            from_attribute: Some("user_id".to_string()),
            to: "App\\Models\\User".to_string(),
            to_attribute: Some("id".to_string()),
            pivot: None,
            through: None,
            morph: None,
            file: None,
            line: None,
        }
    }

    #[test]
    fn test_serialized_shape() {
        let value = serde_json::to_value(sample()).unwrap();
        assert_eq!(value["type"], json!("one"));
        assert_eq!(value["framework_type"], json!("BelongsTo"));
        assert_eq!(value["connection"], json!("direct"));
        assert!(value.get("pivot").is_none());
        assert!(value.get("file").is_none());
    }
}
