//! Relationship classification
//!
//! Turns one raw relation declaration into a [`Relationship`] using the
//! kind's fixed facts and the accessors of the live relation object.
//!
//! ```text
//! RawRelation
//!     │ filter (omit / restrict_to)
//!     │ facts lookup (unknown kind → null facts)
//!     │ from / to attributes via accessors
//!     │ pivot / through / morph metadata
//!     │ degeneracy check (self-referencing inverse morphs)
//!     │ mandatory resolution
//!     ▼
//! Relationship
//! ```

use crate::model::{ModelDescriptor, RawRelation};
use crate::relationship::{MorphInfo, PivotInfo, Relationship, ThroughInfo};
use crate::source::ModelSource;
use draftsman_core::{
    Accessor, DEFAULT_MORPH_PIVOT_CLASS, DEFAULT_PIVOT_CLASS, DraftsmanResult, KindFacts,
    MORPH_ACCESSORS, MandatoryRule, PIVOT_ACCESSORS, RelationAccessor, RelationKind, Slot,
    THROUGH_ACCESSORS,
};
use std::collections::HashMap;

// ============================================================================
// Options
// ============================================================================

/// Kind filters applied before classification
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClassifierOptions {
    /// Kinds that are always dropped
    pub omit: Vec<RelationKind>,
    /// When non-empty, only these kinds are kept
    pub restrict_to: Vec<RelationKind>,
}

impl ClassifierOptions {
    /// Options that keep every kind
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop a kind
    pub fn omit(mut self, kind: RelationKind) -> Self {
        self.omit.push(kind);
        self
    }

    /// Keep only the given kind (cumulative)
    pub fn restrict_to(mut self, kind: RelationKind) -> Self {
        self.restrict_to.push(kind);
        self
    }

    /// Check if a kind passes both filters
    pub fn admits(&self, kind: &RelationKind) -> bool {
        if self.omit.contains(kind) {
            return false;
        }
        self.restrict_to.is_empty() || self.restrict_to.contains(kind)
    }
}

// ============================================================================
// Classification
// ============================================================================

/// Outcome of classifying one declaration
#[derive(Debug, Clone, PartialEq)]
pub enum Classification {
    Classified(Relationship),
    /// Dropped by the omit/restrict filters
    Filtered,
    /// Self-referencing artifact of an inverse polymorphic kind
    Degenerate,
}

impl Classification {
    /// The relationship, if one survived
    pub fn into_relationship(self) -> Option<Relationship> {
        match self {
            Classification::Classified(rel) => Some(rel),
            _ => None,
        }
    }
}

/// Classifies the relations of models served by a [`ModelSource`]
pub struct Classifier<'a> {
    source: &'a dyn ModelSource,
    options: &'a ClassifierOptions,
}

impl<'a> Classifier<'a> {
    pub fn new(source: &'a dyn ModelSource, options: &'a ClassifierOptions) -> Self {
        Self { source, options }
    }

    /// Classify one relation declared on `model`
    ///
    /// Errors come from obtaining the live relation or from a raising
    /// accessor; they concern this relation only.
    pub fn classify(
        &self,
        model: &ModelDescriptor,
        raw: &RawRelation,
    ) -> DraftsmanResult<Classification> {
        if !self.options.admits(&raw.kind) {
            tracing::debug!("Filtered {} relation '{}.{}'", raw.kind, model.class, raw.name);
            return Ok(Classification::Filtered);
        }

        let key = format!("{}.{}", model.class, raw.name);

        let Some(facts) = raw.kind.facts() else {
            tracing::debug!("Unrecognized relation kind '{}' on '{}'", raw.kind, key);
            return Ok(Classification::Classified(Relationship {
                name: raw.name.clone(),
                framework_type: raw.kind.clone(),
                cardinality: None,
                connection: None,
                multiplicity: None,
                mandatory: false,
                key,
                relationship_key: None,
                from: model.class.clone(),
                from_attribute: None,
                to: raw.related.clone(),
                to_attribute: None,
                pivot: None,
                through: None,
                morph: None,
                file: raw.file.clone(),
                line: raw.line,
            }));
        };

        let live = self.source.relation(&model.class, &raw.name)?;

        let from_attribute = live.invoke(facts.from_accessor)?;
        let to_attribute = live.invoke(facts.to_accessor)?;

        let from = model.class.clone();
        let to = raw.related.clone();

        // Metadata accessors are not consulted for a dropped relation
        if facts.skip_if_degenerate && from == to && from_attribute == to_attribute {
            tracing::debug!("Dropping self-referencing {} relation '{}'", raw.kind, key);
            return Ok(Classification::Degenerate);
        }

        let pivot = if facts.pivot {
            Some(resolve_pivot(live.as_ref())?)
        } else {
            None
        };

        let through = if facts.through {
            let fields = resolve_fields(live.as_ref(), THROUGH_ACCESSORS)?;
            Some(ThroughInfo {
                class: field(&fields, "class"),
                from: field(&fields, "from"),
                to: field(&fields, "to"),
            })
        } else {
            None
        };

        let morph = if facts.morph {
            let fields = resolve_fields(live.as_ref(), MORPH_ACCESSORS)?;
            let attribute = field(&fields, "attribute");
            Some(MorphInfo {
                key: format!(
                    "{}.{}.{}",
                    raw.related,
                    to_attribute.as_deref().unwrap_or_default(),
                    attribute.as_deref().unwrap_or_default()
                ),
                attribute,
            })
        } else {
            None
        };

        let mut relationship = Relationship {
            name: raw.name.clone(),
            framework_type: raw.kind.clone(),
            cardinality: Some(facts.cardinality),
            connection: Some(facts.connection),
            multiplicity: Some(facts.multiplicity),
            mandatory: false,
            key,
            relationship_key: None,
            from,
            from_attribute,
            to,
            to_attribute,
            pivot,
            through,
            morph,
            file: raw.file.clone(),
            line: raw.line,
        };

        relationship.mandatory = resolve_mandatory(&facts, &relationship, model);
        relationship.relationship_key = Some(relationship_key(&facts, &relationship));

        Ok(Classification::Classified(relationship))
    }
}

// ============================================================================
// Resolution Helpers
// ============================================================================

fn resolve_fields(
    live: &dyn RelationAccessor,
    accessors: &[(&'static str, Accessor)],
) -> DraftsmanResult<HashMap<&'static str, Option<String>>> {
    accessors
        .iter()
        .map(|(name, accessor)| live.invoke(*accessor).map(|value| (*name, value)))
        .collect()
}

fn field(fields: &HashMap<&'static str, Option<String>>, name: &str) -> Option<String> {
    fields.get(name).cloned().flatten()
}

/// Pivot metadata; generic pivot classes are suffixed with their table
fn resolve_pivot(live: &dyn RelationAccessor) -> DraftsmanResult<PivotInfo> {
    let fields = resolve_fields(live, PIVOT_ACCESSORS)?;
    let mut class = field(&fields, "class");

    if let Some(name) = class.as_mut() {
        if name == DEFAULT_PIVOT_CLASS || name == DEFAULT_MORPH_PIVOT_CLASS {
            if let Some(table) = live.invoke(Accessor::Table)? {
                name.push('.');
                name.push_str(&table);
            }
        }
    }

    Ok(PivotInfo {
        class,
        from: field(&fields, "from"),
        to: field(&fields, "to"),
    })
}

fn slot_value<'r>(relationship: &'r Relationship, slot: Slot) -> Option<&'r str> {
    match slot {
        Slot::From => Some(&relationship.from),
        Slot::FromAttribute => relationship.from_attribute.as_deref(),
        Slot::To => Some(&relationship.to),
        Slot::ToAttribute => relationship.to_attribute.as_deref(),
    }
}

/// Mandatory when the rule says so, or when the referenced attribute is NOT NULL
fn resolve_mandatory(
    facts: &KindFacts,
    relationship: &Relationship,
    model: &ModelDescriptor,
) -> bool {
    match facts.mandatory {
        MandatoryRule::Always(value) => value,
        MandatoryRule::Attribute(slot) => slot_value(relationship, slot)
            .and_then(|name| model.attribute(name))
            .and_then(|attribute| attribute.nullable)
            .is_some_and(|nullable| !nullable),
    }
}

/// Join the kind's key pieces; a relation and its inverse share this key
fn relationship_key(facts: &KindFacts, relationship: &Relationship) -> String {
    facts
        .key_pieces
        .iter()
        .map(|slot| slot_value(relationship, *slot).unwrap_or_default())
        .collect::<Vec<_>>()
        .join(".")
}

// ============================================================================
// Tests
// ============================================================================
