//! Graph assembly
//!
//! Runs the classifier over every relation of every enumerated model and
//! collects the surviving relationships into a [`ModelGraph`].
//!
//! A model that fails to describe is left out, and a relation whose
//! accessors fail is left out; neither aborts the pass.

use crate::classifier::{Classification, Classifier, ClassifierOptions};
use crate::model::ModelNode;
use crate::relationship::Relationship;
use crate::source::ModelSource;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

// ============================================================================
// GraphBuilder
// ============================================================================

/// Builds model graphs from a [`ModelSource`]
pub struct GraphBuilder<'a> {
    source: &'a dyn ModelSource,
    options: ClassifierOptions,
}

impl<'a> GraphBuilder<'a> {
    /// Create a builder that keeps every relation kind
    pub fn new(source: &'a dyn ModelSource) -> Self {
        Self::with_options(source, ClassifierOptions::default())
    }

    /// Create a builder with kind filters
    pub fn with_options(source: &'a dyn ModelSource, options: ClassifierOptions) -> Self {
        Self { source, options }
    }

    /// Get the classifier options
    pub fn options(&self) -> &ClassifierOptions {
        &self.options
    }

    /// Build the graph for the given identifiers, in order
    pub fn build(&self, identifiers: &[String]) -> ModelGraph {
        let models: Vec<ModelNode> = identifiers
            .iter()
            .filter_map(|id| self.build_model(id))
            .collect();

        tracing::debug!(
            "Built graph with {} of {} models",
            models.len(),
            identifiers.len()
        );

        ModelGraph { models }
    }

    /// Describe and classify a single model
    pub fn build_model(&self, identifier: &str) -> Option<ModelNode> {
        let descriptor = self.source.describe_lenient(identifier)?;
        let classifier = Classifier::new(self.source, &self.options);

        let mut relations = Vec::with_capacity(descriptor.relations.len());
        for raw in &descriptor.relations {
            match classifier.classify(&descriptor, raw) {
                Ok(Classification::Classified(rel)) => relations.push(rel),
                Ok(Classification::Filtered | Classification::Degenerate) => {}
                Err(e) => tracing::warn!(
                    "Skipping relation '{}.{}': {}",
                    descriptor.class,
                    raw.name,
                    e
                ),
            }
        }

        Some(ModelNode::from_descriptor(descriptor, relations))
    }
}

// ============================================================================
// ModelGraph
// ============================================================================

/// Models with their classified relationships
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ModelGraph {
    pub models: Vec<ModelNode>,
}

impl ModelGraph {
    /// Same graph, models ordered by descending relation count
    ///
    /// The sort is stable: ties keep enumeration order.
    pub fn presorted(&self) -> ModelGraph {
        let mut models = self.models.clone();
        models.sort_by(|a, b| b.relations_count.cmp(&a.relations_count));
        ModelGraph { models }
    }

    /// Find a model by identifier
    pub fn model(&self, identifier: &str) -> Option<&ModelNode> {
        self.models.iter().find(|m| m.class == identifier)
    }

    /// All relationships, model by model
    pub fn relations(&self) -> Vec<&Relationship> {
        self.models.iter().flat_map(|m| m.relations.iter()).collect()
    }

    /// Relationships grouped by their canonical pair key
    ///
    /// A relation and its declared inverse collapse into one edge. Edges keep
    /// the order in which their first relationship was seen.
    pub fn edges(&self) -> Vec<Edge> {
        let mut edges: Vec<Edge> = Vec::new();
        let mut index: HashMap<String, usize> = HashMap::new();

        for rel in self.relations() {
            let edge_key = rel.relationship_key.clone().unwrap_or_else(|| rel.key.clone());
            match index.get(&edge_key) {
                Some(&i) => edges[i].relations.push(rel.key.clone()),
                None => {
                    index.insert(edge_key.clone(), edges.len());
                    edges.push(Edge {
                        key: edge_key,
                        from: rel.from.clone(),
                        to: rel.to.clone(),
                        relations: vec![rel.key.clone()],
                    });
                }
            }
        }

        edges
    }

    /// Number of models
    pub fn len(&self) -> usize {
        self.models.len()
    }

    /// Check if the graph has no models
    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }
}

/// A deduplicated edge: every relationship sharing one pair key
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Edge {
    pub key: String,
    pub from: String,
    pub to: String,
    /// Keys (`Owner.method`) of the relationships on this edge
    pub relations: Vec<String>,
}

// ============================================================================
// Tests
// ============================================================================
