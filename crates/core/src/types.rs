//! Relationship kind vocabulary for Draftsman
//!
//! The framework tags every declared relation with a kind ("HasMany",
//! "BelongsToMany", ...). Each known kind carries a fixed [`KindFacts`]
//! record describing how it is classified: its cardinality, how the two
//! models are connected, which accessors resolve its join keys and which
//! extra metadata (pivot, through-parent, morph type) applies.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Fully-qualified class of the framework's generic pivot model
pub const DEFAULT_PIVOT_CLASS: &str = "Illuminate\\Database\\Eloquent\\Relations\\Pivot";

/// Fully-qualified class of the framework's generic polymorphic pivot model
pub const DEFAULT_MORPH_PIVOT_CLASS: &str =
    "Illuminate\\Database\\Eloquent\\Relations\\MorphPivot";

// ============================================================================
// Cardinality / Connection
// ============================================================================

/// One side of a relationship: exactly one or many records
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Cardinality {
    One,
    Many,
}

impl fmt::Display for Cardinality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cardinality::One => write!(f, "one"),
            Cardinality::Many => write!(f, "many"),
        }
    }
}

/// How two models are connected
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionStyle {
    /// Foreign key on one of the two tables
    Direct,
    /// Many-to-many through a pivot table
    Pivot,
    /// Mediated by an intermediate model
    Through,
    /// Target type stored in a discriminator column
    Polymorphic,
}

impl fmt::Display for ConnectionStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConnectionStyle::Direct => write!(f, "direct"),
            ConnectionStyle::Pivot => write!(f, "pivot"),
            ConnectionStyle::Through => write!(f, "through"),
            ConnectionStyle::Polymorphic => write!(f, "polymorphic"),
        }
    }
}

// ============================================================================
// Accessors
// ============================================================================

/// A read-only accessor exposed by a live relation object
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Accessor {
    ForeignKeyName,
    OwnerKeyName,
    LocalKeyName,
    ParentKeyName,
    RelatedKeyName,
    ForeignPivotKeyName,
    RelatedPivotKeyName,
    PivotClass,
    Table,
    FirstKeyName,
    SecondLocalKeyName,
    ThroughParentClass,
    MorphType,
}

impl Accessor {
    /// Method name of the accessor on the framework relation object
    pub fn method_name(&self) -> &'static str {
        match self {
            Accessor::ForeignKeyName => "getForeignKeyName",
            Accessor::OwnerKeyName => "getOwnerKeyName",
            Accessor::LocalKeyName => "getLocalKeyName",
            Accessor::ParentKeyName => "getParentKeyName",
            Accessor::RelatedKeyName => "getRelatedKeyName",
            Accessor::ForeignPivotKeyName => "getForeignPivotKeyName",
            Accessor::RelatedPivotKeyName => "getRelatedPivotKeyName",
            Accessor::PivotClass => "getPivotClass",
            Accessor::Table => "getTable",
            Accessor::FirstKeyName => "getFirstKeyName",
            Accessor::SecondLocalKeyName => "getSecondLocalKeyName",
            Accessor::ThroughParentClass => "getThroughParentClass",
            Accessor::MorphType => "getMorphType",
        }
    }
}

impl fmt::Display for Accessor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.method_name())
    }
}

/// Pivot metadata fields and the accessors that produce them
pub const PIVOT_ACCESSORS: &[(&str, Accessor)] = &[
    ("class", Accessor::PivotClass),
    ("from", Accessor::ForeignPivotKeyName),
    ("to", Accessor::RelatedPivotKeyName),
];

/// Through-chain metadata fields and the accessors that produce them
pub const THROUGH_ACCESSORS: &[(&str, Accessor)] = &[
    ("class", Accessor::ThroughParentClass),
    ("from", Accessor::FirstKeyName),
    ("to", Accessor::SecondLocalKeyName),
];

/// Morph metadata fields and the accessors that produce them
pub const MORPH_ACCESSORS: &[(&str, Accessor)] = &[("attribute", Accessor::MorphType)];

// ============================================================================
// Kind Facts
// ============================================================================

/// An endpoint slot of a classified relationship
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Slot {
    From,
    FromAttribute,
    To,
    ToAttribute,
}

/// How the mandatory flag of a relationship is decided
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MandatoryRule {
    /// Fixed for the kind
    Always(bool),
    /// Mandatory when the attribute named by this slot is not nullable
    Attribute(Slot),
}

/// Fixed classification facts of a relationship kind
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KindFacts {
    pub cardinality: Cardinality,
    pub connection: ConnectionStyle,
    /// Crow's-foot multiplicity at the owning end
    pub multiplicity: Cardinality,
    pub mandatory: MandatoryRule,
    pub from_accessor: Accessor,
    pub to_accessor: Accessor,
    pub pivot: bool,
    pub through: bool,
    pub morph: bool,
    /// Self-referencing instances with identical join attributes are dropped
    pub skip_if_degenerate: bool,
    /// Slots joined into the canonical relationship key
    pub key_pieces: [Slot; 4],
}

const OWNER_FIRST: [Slot; 4] = [Slot::From, Slot::FromAttribute, Slot::To, Slot::ToAttribute];
const RELATED_FIRST: [Slot; 4] = [Slot::To, Slot::ToAttribute, Slot::From, Slot::FromAttribute];

// ============================================================================
// RelationKind
// ============================================================================

/// Framework relationship kind
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum RelationKind {
    BelongsTo,
    BelongsToMany,
    HasMany,
    HasManyThrough,
    HasOne,
    HasOneThrough,
    MorphMany,
    MorphOne,
    MorphTo,
    MorphToMany,
    MorphedByMany,
    /// Any kind without a facts entry
    Other(String),
}

impl RelationKind {
    /// Parse a kind name, accepting fully-qualified class names
    pub fn parse(name: &str) -> Self {
        let base = name.rsplit('\\').next().unwrap_or(name);
        match base {
            "BelongsTo" => RelationKind::BelongsTo,
            "BelongsToMany" => RelationKind::BelongsToMany,
            "HasMany" => RelationKind::HasMany,
            "HasManyThrough" => RelationKind::HasManyThrough,
            "HasOne" => RelationKind::HasOne,
            "HasOneThrough" => RelationKind::HasOneThrough,
            "MorphMany" => RelationKind::MorphMany,
            "MorphOne" => RelationKind::MorphOne,
            "MorphTo" => RelationKind::MorphTo,
            "MorphToMany" => RelationKind::MorphToMany,
            "MorphedByMany" => RelationKind::MorphedByMany,
            other => RelationKind::Other(other.to_string()),
        }
    }

    /// Framework name of the kind
    pub fn name(&self) -> &str {
        match self {
            RelationKind::BelongsTo => "BelongsTo",
            RelationKind::BelongsToMany => "BelongsToMany",
            RelationKind::HasMany => "HasMany",
            RelationKind::HasManyThrough => "HasManyThrough",
            RelationKind::HasOne => "HasOne",
            RelationKind::HasOneThrough => "HasOneThrough",
            RelationKind::MorphMany => "MorphMany",
            RelationKind::MorphOne => "MorphOne",
            RelationKind::MorphTo => "MorphTo",
            RelationKind::MorphToMany => "MorphToMany",
            RelationKind::MorphedByMany => "MorphedByMany",
            RelationKind::Other(name) => name,
        }
    }

    /// Classification facts, `None` for unrecognized kinds
    pub fn facts(&self) -> Option<KindFacts> {
        use Accessor::*;
        use Cardinality::{Many, One};
        use ConnectionStyle::*;

        let facts = |cardinality,
                     connection,
                     multiplicity,
                     mandatory,
                     from_accessor,
                     to_accessor,
                     key_pieces| KindFacts {
            cardinality,
            connection,
            multiplicity,
            mandatory,
            from_accessor,
            to_accessor,
            pivot: false,
            through: false,
            morph: false,
            skip_if_degenerate: false,
            key_pieces,
        };

        let always = MandatoryRule::Always;

        Some(match self {
            RelationKind::BelongsTo => facts(
                One,
                Direct,
                Many,
                MandatoryRule::Attribute(Slot::FromAttribute),
                ForeignKeyName,
                OwnerKeyName,
                RELATED_FIRST,
            ),
            RelationKind::BelongsToMany => KindFacts {
                pivot: true,
                ..facts(
                    Many,
                    Pivot,
                    Many,
                    always(false),
                    ParentKeyName,
                    RelatedKeyName,
                    RELATED_FIRST,
                )
            },
            RelationKind::HasMany => facts(
                Many,
                Direct,
                One,
                always(true),
                LocalKeyName,
                ForeignKeyName,
                OWNER_FIRST,
            ),
            RelationKind::HasManyThrough => KindFacts {
                through: true,
                ..facts(
                    Many,
                    Through,
                    One,
                    always(true),
                    LocalKeyName,
                    ForeignKeyName,
                    OWNER_FIRST,
                )
            },
            RelationKind::HasOne => facts(
                One,
                Direct,
                Many,
                always(false),
                LocalKeyName,
                ForeignKeyName,
                OWNER_FIRST,
            ),
            RelationKind::HasOneThrough => KindFacts {
                through: true,
                ..facts(
                    One,
                    Through,
                    Many,
                    always(false),
                    LocalKeyName,
                    ForeignKeyName,
                    OWNER_FIRST,
                )
            },
            RelationKind::MorphMany => KindFacts {
                morph: true,
                ..facts(
                    Many,
                    Polymorphic,
                    One,
                    always(true),
                    LocalKeyName,
                    ForeignKeyName,
                    OWNER_FIRST,
                )
            },
            RelationKind::MorphOne => KindFacts {
                morph: true,
                ..facts(
                    One,
                    Polymorphic,
                    Many,
                    always(false),
                    LocalKeyName,
                    ForeignKeyName,
                    OWNER_FIRST,
                )
            },
            RelationKind::MorphTo => KindFacts {
                morph: true,
                skip_if_degenerate: true,
                ..facts(
                    One,
                    Polymorphic,
                    Many,
                    always(false),
                    ForeignKeyName,
                    ForeignKeyName,
                    RELATED_FIRST,
                )
            },
            RelationKind::MorphToMany => KindFacts {
                pivot: true,
                morph: true,
                skip_if_degenerate: true,
                ..facts(
                    Many,
                    Polymorphic,
                    One,
                    always(true),
                    ParentKeyName,
                    RelatedPivotKeyName,
                    RELATED_FIRST,
                )
            },
            RelationKind::MorphedByMany => KindFacts {
                pivot: true,
                morph: true,
                ..facts(
                    Many,
                    Polymorphic,
                    One,
                    always(true),
                    ParentKeyName,
                    RelatedPivotKeyName,
                    OWNER_FIRST,
                )
            },
            RelationKind::Other(_) => return None,
        })
    }

    /// Check if this kind has a facts entry
    pub fn is_known(&self) -> bool {
        !matches!(self, RelationKind::Other(_))
    }

    /// Get all known kinds
    pub fn all() -> Vec<RelationKind> {
        vec![
            RelationKind::BelongsTo,
            RelationKind::BelongsToMany,
            RelationKind::HasMany,
            RelationKind::HasManyThrough,
            RelationKind::HasOne,
            RelationKind::HasOneThrough,
            RelationKind::MorphMany,
            RelationKind::MorphOne,
            RelationKind::MorphTo,
            RelationKind::MorphToMany,
            RelationKind::MorphedByMany,
        ]
    }
}

impl From<String> for RelationKind {
    fn from(name: String) -> Self {
        RelationKind::parse(&name)
    }
}

impl From<RelationKind> for String {
    fn from(kind: RelationKind) -> Self {
        kind.name().to_string()
    }
}

impl fmt::Display for RelationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ============================================================================
// Tests
// ============================================================================
