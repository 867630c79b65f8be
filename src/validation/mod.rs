//! Validation functionality
//!
//! Provides validation logic for:
//! - Inheritance chains (single inheritance, cycle protection)
//! - Attribute inheritance (minimal delta against the base type)
//! - Whole-graph consistency (undefined nodes, subtype cycles)
//! - Per-node validation ahead of export

pub mod attributes;
pub mod hierarchy;
pub mod inheritance;
pub mod validator;

use crate::address_space::{NodeContext, NodeRegistry, ReferenceGraph};
use crate::models::{NamespaceTable, NodeId, ReferenceKind};

pub use attributes::remove_inherited_values;
pub use hierarchy::{ConsistencyReport, HierarchyValidator, MultipleInheritance};
pub use inheritance::{InheritanceError, InheritanceResolver};
pub use validator::{DefaultValidator, Validator};

/// Read-only view of an address space handed to validators
#[derive(Debug, Clone, Copy)]
pub struct ValidationContext<'a> {
    pub namespaces: &'a NamespaceTable,
    pub nodes: &'a NodeRegistry,
    pub references: &'a ReferenceGraph,
}

impl<'a> ValidationContext<'a> {
    pub fn new(
        namespaces: &'a NamespaceTable,
        nodes: &'a NodeRegistry,
        references: &'a ReferenceGraph,
    ) -> Self {
        Self {
            namespaces,
            nodes,
            references,
        }
    }

    pub fn inheritance(&self) -> InheritanceResolver<'a> {
        InheritanceResolver::new(self.nodes, self.references)
    }

    /// Instance declarations of `node`; unknown ids are registered stubs, so none are lost
    pub fn children_of(&self, node: &NodeId) -> Vec<&'a NodeId> {
        let references = self.references;
        references.children_of(node).collect()
    }

    /// Target of the HasTypeDefinition reference declared by `node`
    pub fn type_definition(&self, node: &NodeId) -> Option<&'a NodeId> {
        let references = self.references;
        references
            .outgoing_from(node)
            .find(|reference| reference.kind() == ReferenceKind::HasTypeDefinition)
            .map(|reference| reference.target())
    }

    pub fn is_defined(&self, node: &NodeId) -> bool {
        self.nodes
            .try_get(node)
            .is_some_and(|context| !context.is_stub())
    }

    pub fn context(&self, node: &NodeId) -> Option<&'a NodeContext> {
        let nodes = self.nodes;
        nodes.try_get(node)
    }
}
