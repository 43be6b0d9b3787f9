//! # Draftsman Core
//!
//! Core types, traits, and error handling for Draftsman.
//!
//! This crate provides the foundational building blocks used throughout
//! the workspace, including:
//!
//! - **Types**: the relationship kind vocabulary and its fixed facts table
//! - **Traits**: the model-layer capabilities (`RelationAccessor`)
//! - **Errors**: unified error handling with `DraftsmanError` and `DraftsmanResult`
//!

pub mod error;
pub mod traits;
pub mod types;

// Re-export commonly used items at crate root
pub use error::{DraftsmanError, DraftsmanResult};
pub use traits::{RelationAccessor, TypeInfo};
pub use types::{
    Accessor, Cardinality, ConnectionStyle, DEFAULT_MORPH_PIVOT_CLASS, DEFAULT_PIVOT_CLASS,
    KindFacts, MORPH_ACCESSORS, MandatoryRule, PIVOT_ACCESSORS, RelationKind, Slot,
    THROUGH_ACCESSORS,
};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");
