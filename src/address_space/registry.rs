//! Node registry
//!
//! Owns every node context of the address space, keyed by the textual NodeId. A context
//! may exist before its data: references are allowed to name nodes that have not been
//! imported yet, so lookups create stubs that a later import fills in.

use indexmap::IndexMap;
use thiserror::Error;

use crate::models::{IdentifierError, NodeClass, NodeId, UANode};

/// Errors raised by the node registry
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("Cannot attach node {found} to the context of {expected}")]
    IdentityMismatch { expected: NodeId, found: String },
    #[error(transparent)]
    Identifier(#[from] IdentifierError),
}

/// Identity of a node plus its data, if the data has arrived
#[derive(Debug, Clone)]
pub struct NodeContext {
    node_id: NodeId,
    node: Option<UANode>,
}

impl NodeContext {
    fn stub(node_id: NodeId) -> Self {
        Self {
            node_id,
            node: None,
        }
    }

    pub fn node_id(&self) -> &NodeId {
        &self.node_id
    }

    /// Attached data, `None` for a stub
    pub fn node(&self) -> Option<&UANode> {
        self.node.as_ref()
    }

    pub fn is_stub(&self) -> bool {
        self.node.is_none()
    }

    pub fn node_class(&self) -> Option<NodeClass> {
        self.node.as_ref().map(UANode::node_class)
    }

    /// True for contexts holding type-class data
    pub fn is_type(&self) -> bool {
        self.node_class().is_some_and(|class| class.is_type())
    }
}

/// Registry of all node contexts of one address space
#[derive(Debug, Default)]
pub struct NodeRegistry {
    nodes: IndexMap<String, NodeContext>,
}

impl NodeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Existing context for `node_id`, or a newly registered stub
    pub fn get_or_create(&mut self, node_id: &NodeId) -> &mut NodeContext {
        self.nodes
            .entry(node_id.to_string())
            .or_insert_with(|| NodeContext::stub(node_id.clone()))
    }

    /// Pure lookup
    pub fn try_get(&self, node_id: &NodeId) -> Option<&NodeContext> {
        self.nodes.get(&node_id.to_string())
    }

    /// Set or replace the data of the context for `node_id`
    ///
    /// The NodeId carried by `node` must identify the same node. Returns the data that was
    /// attached before, if any.
    pub fn attach(
        &mut self,
        node_id: &NodeId,
        node: UANode,
    ) -> Result<Option<UANode>, RegistryError> {
        let declared = NodeId::parse(&node.node_id)?;
        if &declared != node_id {
            return Err(RegistryError::IdentityMismatch {
                expected: node_id.clone(),
                found: node.node_id,
            });
        }
        let context = self.get_or_create(node_id);
        Ok(context.node.replace(node))
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// All contexts in registration order
    pub fn iter(&self) -> impl Iterator<Item = &NodeContext> {
        self.nodes.values()
    }

    /// Contexts that are still stubs
    pub fn stubs(&self) -> impl Iterator<Item = &NodeContext> {
        self.nodes.values().filter(|context| context.is_stub())
    }

    /// Contexts whose NodeId lives in `namespace_index`
    pub fn in_namespace(&self, namespace_index: u16) -> impl Iterator<Item = &NodeContext> {
        self.nodes
            .values()
            .filter(move |context| context.node_id.namespace_index() == namespace_index)
    }
}
