//! Inheritance resolver
//!
//! Walks HasSubtype references upward from a type to produce its inheritance chain. The
//! type hierarchy is single inheritance: a type with two direct supertypes, or a chain that
//! loops back onto itself, is rejected.

use std::collections::HashSet;

use thiserror::Error;

use crate::address_space::{NodeContext, NodeRegistry, ReferenceGraph};
use crate::models::{NodeId, ReferenceKind};

/// Errors raised while resolving an inheritance chain
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InheritanceError {
    #[error("Circular reference in the subtype hierarchy at {node_id}")]
    CircularReference { node_id: NodeId },
    #[error("To many subtypes: {node_id} has {count} direct supertypes")]
    TooManySubtypes { node_id: NodeId, count: usize },
    #[error("Node {0} is not registered in the address space")]
    UnknownNode(NodeId),
}

/// Read-only inheritance queries over one address space
#[derive(Debug, Clone, Copy)]
pub struct InheritanceResolver<'a> {
    nodes: &'a NodeRegistry,
    references: &'a ReferenceGraph,
}

impl<'a> InheritanceResolver<'a> {
    pub fn new(nodes: &'a NodeRegistry, references: &'a ReferenceGraph) -> Self {
        Self { nodes, references }
    }

    /// Direct supertypes of `node`: sources of HasSubtype references targeting it
    pub fn direct_supertypes(&self, node: &NodeId) -> Vec<&'a NodeId> {
        let references = self.references;
        references
            .iter()
            .filter(|reference| {
                reference.kind() == ReferenceKind::HasSubtype && reference.target() == node
            })
            .map(|reference| reference.source())
            .collect()
    }

    /// Inheritance chain of `root`, nearest supertype first
    ///
    /// `root` itself is not part of the chain. An empty chain means `root` has no
    /// supertype.
    pub fn base_types(&self, root: &NodeId) -> Result<Vec<&'a NodeContext>, InheritanceError> {
        let context = self
            .nodes
            .try_get(root)
            .ok_or_else(|| InheritanceError::UnknownNode(root.clone()))?;
        let mut chain = Vec::new();
        let mut visited = HashSet::new();
        self.collect_base_types(context, &mut visited, &mut chain)?;
        Ok(chain)
    }

    fn collect_base_types(
        &self,
        node: &'a NodeContext,
        visited: &mut HashSet<&'a NodeId>,
        chain: &mut Vec<&'a NodeContext>,
    ) -> Result<(), InheritanceError> {
        if !visited.insert(node.node_id()) {
            return Err(InheritanceError::CircularReference {
                node_id: node.node_id().clone(),
            });
        }
        let supertypes = self.direct_supertypes(node.node_id());
        match supertypes.as_slice() {
            [] => Ok(()),
            [supertype] => {
                let base = self
                    .nodes
                    .try_get(supertype)
                    .ok_or_else(|| InheritanceError::UnknownNode((*supertype).clone()))?;
                chain.push(base);
                self.collect_base_types(base, visited, chain)
            }
            _ => Err(InheritanceError::TooManySubtypes {
                node_id: node.node_id().clone(),
                count: supertypes.len(),
            }),
        }
    }
}
