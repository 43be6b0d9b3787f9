//! Core traits for Draftsman
//!
//! The model layer is an external collaborator. These traits describe the
//! narrow capabilities the classifier needs from it: inspecting a type and
//! invoking read-only accessors on a live relation object.

use crate::error::DraftsmanResult;
use crate::types::Accessor;
use serde::{Deserialize, Serialize};

// ============================================================================
// RelationAccessor Trait
// ============================================================================

/// A live relation object obtained by calling a model's relation method
///
/// Implementations answer the framework accessors listed in [`Accessor`].
/// An accessor the relation does not define yields `Ok(None)`; an accessor
/// that raises yields an error.
///
/// # Example
///
/// ```rust,ignore
/// use draftsman_core::{Accessor, DraftsmanResult, RelationAccessor};
///
/// struct PostsRelation;
///
/// impl RelationAccessor for PostsRelation {
///     fn invoke(&self, accessor: Accessor) -> DraftsmanResult<Option<String>> {
///         Ok(match accessor {
///             Accessor::LocalKeyName => Some("id".to_string()),
///             Accessor::ForeignKeyName => Some("user_id".to_string()),
///             _ => None,
///         })
///     }
/// }
/// ```
pub trait RelationAccessor {
    /// Invoke one accessor on the relation
    fn invoke(&self, accessor: Accessor) -> DraftsmanResult<Option<String>>;
}

// ============================================================================
// TypeInfo
// ============================================================================

/// What the model layer knows about a candidate type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TypeInfo {
    /// The type is a subtype of the persistent-model capability
    pub persistent: bool,
    /// The type is abstract and cannot be instantiated
    pub is_abstract: bool,
}

impl TypeInfo {
    /// A concrete persistent model
    pub fn model() -> Self {
        Self {
            persistent: true,
            is_abstract: false,
        }
    }

    /// Check if the type should be listed as a model
    pub fn is_concrete_model(&self) -> bool {
        self.persistent && !self.is_abstract
    }
}

// ============================================================================
// Tests
// ============================================================================
