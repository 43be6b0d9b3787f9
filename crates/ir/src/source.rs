//! The model-layer collaborator
//!
//! Everything Draftsman knows about the application's models comes through
//! [`ModelSource`]. The source answers three questions: what a type is,
//! how a model is described, and which live relation object backs a
//! declared relation.

use crate::model::ModelDescriptor;
use draftsman_core::{DraftsmanResult, RelationAccessor, TypeInfo};

/// Provider of model descriptions and live relation objects
pub trait ModelSource {
    /// Inspect a candidate type; `None` when it does not resolve to a loadable type
    fn type_info(&self, identifier: &str) -> Option<TypeInfo>;

    /// Describe one model
    ///
    /// Returns an error when the describe capability reports failure.
    fn describe(&self, identifier: &str) -> DraftsmanResult<ModelDescriptor>;

    /// Obtain the live relation object behind `identifier::name()`
    fn relation(
        &self,
        identifier: &str,
        name: &str,
    ) -> DraftsmanResult<Box<dyn RelationAccessor + '_>>;

    /// Describe a model, reporting failure as `None`
    fn describe_lenient(&self, identifier: &str) -> Option<ModelDescriptor> {
        match self.describe(identifier) {
            Ok(descriptor) => Some(descriptor),
            Err(e) if e.is_not_found() => {
                tracing::debug!("Skipping unknown model '{}'", identifier);
                None
            }
            Err(e) => {
                tracing::warn!("Skipping model '{}': {}", identifier, e);
                None
            }
        }
    }
}
