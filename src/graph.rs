//! Search dependency graph.
//!
//! Searches are nodes; an `After` attribute (or nesting one search inside
//! another) adds an ordering edge from the child to its parent. The parent is
//! a forward reference: it may live in another document, so it is only
//! registered as a soft reference for the linking phase. Nothing here looks
//! for cycles; the downstream engine finds them when it orders the searches.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashSet};
use tracing::debug;

use crate::error::CompileError;
use crate::identifier::Identifier;
use crate::references::{ReferenceSet, SoftReference};
use crate::rows::TableName;

/// How strongly a child search is tied to its parent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum RelationStrength {
    /// Run after the parent, whatever the parent's outcome.
    #[default]
    AlwaysAfter,
}

impl RelationStrength {
    /// Integer written to `SearchRelation.relationStrength`.
    pub fn wire_value(&self) -> i32 {
        match self {
            RelationStrength::AlwaysAfter => 2,
        }
    }
}

/// Ordering edge between two searches.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SearchEdge {
    pub child_id: Identifier,
    pub parent_id: Identifier,
    pub strength: RelationStrength,
}

/// Search nodes and edges of one compiled unit.
#[derive(Debug, Default)]
pub struct DependencyGraph {
    nodes: BTreeSet<Identifier>,
    edges: Vec<SearchEdge>,
    edge_set: HashSet<SearchEdge>,
}

impl DependencyGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a search created in this pass.
    pub fn register_node(&mut self, id: &Identifier) {
        self.nodes.insert(id.clone());
    }

    pub fn contains_node(&self, id: &Identifier) -> bool {
        self.nodes.contains(id)
    }

    /// Add an edge from `child` to `parent` and register the soft reference
    /// to the parent.
    ///
    /// The child must already be registered; the parent need not exist.
    pub fn link(
        &mut self,
        child: &Identifier,
        parent: &Identifier,
        references: &mut ReferenceSet,
    ) -> Result<SearchEdge, CompileError> {
        if !self.contains_node(child) {
            return Err(CompileError::UnknownEdgeChild {
                child: child.to_string(),
                parent: parent.to_string(),
            });
        }

        let edge = SearchEdge {
            child_id: child.clone(),
            parent_id: parent.clone(),
            strength: RelationStrength::AlwaysAfter,
        };
        debug!(child = %child, parent = %parent, "search edge");

        references.add_soft(SoftReference::new(TableName::Search, parent.as_str()));
        if self.edge_set.insert(edge.clone()) {
            self.edges.push(edge.clone());
        }
        Ok(edge)
    }

    pub fn edges(&self) -> &[SearchEdge] {
        &self.edges
    }
}
