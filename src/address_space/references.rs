//! Reference graph
//!
//! Resolved references between node contexts. A reference context names its nodes by
//! NodeId; the nodes themselves live in the [`NodeRegistry`].
//!
//! Every reference has four roles:
//!
//! - **source** / **target**: the ends of the reference in forward direction
//! - **parent**: the node whose record declared the reference. Equal to the source for
//!   forward references and to the target for inverse ones.
//! - **type node**: the reference type
//!
//! Traversals consult different roles: [`ReferenceGraph::outgoing_from`] and
//! [`ReferenceGraph::incoming_to`] use the parent, [`ReferenceGraph::children_of`] uses
//! the source.

use indexmap::IndexMap;

use super::registry::NodeRegistry;
use crate::models::{IdentifierError, NodeId, Reference, ReferenceKind};

/// Identity of a reference: one entry per (source, target, type)
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ReferenceKey {
    pub source: NodeId,
    pub target: NodeId,
    pub type_node: NodeId,
}

/// Reference resolved against the node registry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReferenceContext {
    source: NodeId,
    parent: NodeId,
    target: NodeId,
    type_node: NodeId,
    kind: ReferenceKind,
}

impl ReferenceContext {
    /// Resolve `reference` declared by `parent`
    ///
    /// `reference.value` must already be expressed in global namespace indices and
    /// `type_node` is the resolved reference type. Stubs are registered for the other end
    /// and for the type node when they are not known yet.
    pub fn resolve(
        parent: &NodeId,
        reference: &Reference,
        type_node: NodeId,
        registry: &mut NodeRegistry,
    ) -> Result<Self, IdentifierError> {
        let other = NodeId::parse(&reference.value)?;
        registry.get_or_create(&other);
        registry.get_or_create(&type_node);

        let (source, target) = if reference.is_forward {
            (parent.clone(), other)
        } else {
            (other, parent.clone())
        };
        Ok(Self {
            source,
            parent: parent.clone(),
            target,
            kind: ReferenceKind::from_type_id(&type_node),
            type_node,
        })
    }

    pub fn new(source: NodeId, parent: NodeId, target: NodeId, type_node: NodeId) -> Self {
        Self {
            kind: ReferenceKind::from_type_id(&type_node),
            source,
            parent,
            target,
            type_node,
        }
    }

    pub fn source(&self) -> &NodeId {
        &self.source
    }

    pub fn parent(&self) -> &NodeId {
        &self.parent
    }

    pub fn target(&self) -> &NodeId {
        &self.target
    }

    pub fn type_node(&self) -> &NodeId {
        &self.type_node
    }

    pub fn kind(&self) -> ReferenceKind {
        self.kind
    }

    pub fn key(&self) -> ReferenceKey {
        ReferenceKey {
            source: self.source.clone(),
            target: self.target.clone(),
            type_node: self.type_node.clone(),
        }
    }
}

/// All resolved references of one address space
#[derive(Debug, Default)]
pub struct ReferenceGraph {
    references: IndexMap<ReferenceKey, ReferenceContext>,
}

impl ReferenceGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert `reference` unless one with the same key exists; first wins
    ///
    /// Returns `true` if the reference was inserted.
    pub fn add(&mut self, reference: ReferenceContext) -> bool {
        let key = reference.key();
        if self.references.contains_key(&key) {
            return false;
        }
        self.references.insert(key, reference);
        true
    }

    pub fn len(&self) -> usize {
        self.references.len()
    }

    pub fn is_empty(&self) -> bool {
        self.references.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ReferenceContext> {
        self.references.values()
    }

    /// References declared by `node`
    pub fn outgoing_from<'a>(
        &'a self,
        node: &NodeId,
    ) -> impl Iterator<Item = &'a ReferenceContext> {
        self.references
            .values()
            .filter(move |reference| &reference.parent == node)
    }

    /// References pointing at `node` that `node` did not declare itself
    pub fn incoming_to<'a>(
        &'a self,
        node: &NodeId,
    ) -> impl Iterator<Item = &'a ReferenceContext> {
        self.references
            .values()
            .filter(move |reference| &reference.target == node && &reference.parent != node)
    }

    /// Targets of HasComponent/HasProperty references whose source is `node`
    pub fn children_of<'a>(&'a self, node: &NodeId) -> impl Iterator<Item = &'a NodeId> {
        self.references
            .values()
            .filter(move |reference| &reference.source == node && reference.kind.is_child())
            .map(|reference| &reference.target)
    }

    /// References of the given reference type
    pub fn of_type<'a>(
        &'a self,
        type_node: &NodeId,
    ) -> impl Iterator<Item = &'a ReferenceContext> {
        self.references
            .values()
            .filter(move |reference| &reference.type_node == type_node)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::well_known::reference_type_ids;

    fn id(value: u32) -> NodeId {
        NodeId::numeric(1, value)
    }

    #[test]
    fn test_resolve_forward_and_inverse() {
        let mut registry = NodeRegistry::new();
        let parent = id(1);

        let forward = ReferenceContext::resolve(
            &parent,
            &Reference::forward("i=47", "ns=1;i=2"),
            reference_type_ids::HAS_COMPONENT,
            &mut registry,
        )
        .unwrap();
        assert_eq!(forward.source(), &parent);
        assert_eq!(forward.target(), &id(2));
        assert_eq!(forward.parent(), &parent);
        assert_eq!(forward.kind(), ReferenceKind::HasComponent);

        let inverse = ReferenceContext::resolve(
            &parent,
            &Reference::inverse("i=45", "ns=1;i=3"),
            reference_type_ids::HAS_SUBTYPE,
            &mut registry,
        )
        .unwrap();
        assert_eq!(inverse.source(), &id(3));
        assert_eq!(inverse.target(), &parent);
        assert_eq!(inverse.parent(), &parent);

        // stubs for both targets and both reference types
        assert!(registry.try_get(&id(2)).unwrap().is_stub());
        assert!(registry.try_get(&id(3)).unwrap().is_stub());
        assert!(registry.try_get(&reference_type_ids::HAS_SUBTYPE).is_some());
    }

    #[test]
    fn test_add_deduplicates_first_wins() {
        let mut graph = ReferenceGraph::new();
        let declared_by_base =
            ReferenceContext::new(id(1), id(1), id(2), reference_type_ids::HAS_SUBTYPE);
        let declared_by_derived =
            ReferenceContext::new(id(1), id(2), id(2), reference_type_ids::HAS_SUBTYPE);

        assert!(graph.add(declared_by_base.clone()));
        assert!(!graph.add(declared_by_derived));
        assert_eq!(graph.len(), 1);
        assert_eq!(graph.iter().next().unwrap().parent(), &id(1));
    }

    #[test]
    fn test_outgoing_uses_parent() {
        let mut graph = ReferenceGraph::new();
        // declared by node 2 as an inverse reference: source 1, parent 2
        graph.add(ReferenceContext::new(
            id(1),
            id(2),
            id(2),
            reference_type_ids::HAS_SUBTYPE,
        ));
        assert_eq!(graph.outgoing_from(&id(2)).count(), 1);
        assert_eq!(graph.outgoing_from(&id(1)).count(), 0);
    }

    #[test]
    fn test_incoming_excludes_references_declared_by_the_node() {
        let mut graph = ReferenceGraph::new();
        graph.add(ReferenceContext::new(
            id(1),
            id(2),
            id(2),
            reference_type_ids::HAS_SUBTYPE,
        ));
        graph.add(ReferenceContext::new(
            id(3),
            id(3),
            id(2),
            reference_type_ids::ORGANIZES,
        ));
        let incoming: Vec<_> = graph.incoming_to(&id(2)).collect();
        assert_eq!(incoming.len(), 1);
        assert_eq!(incoming[0].parent(), &id(3));
    }

    #[test]
    fn test_children_use_source_and_kind() {
        let mut graph = ReferenceGraph::new();
        // child 2 declares itself a component of 1
        graph.add(ReferenceContext::new(
            id(1),
            id(2),
            id(2),
            reference_type_ids::HAS_COMPONENT,
        ));
        graph.add(ReferenceContext::new(
            id(1),
            id(1),
            id(3),
            reference_type_ids::HAS_PROPERTY,
        ));
        graph.add(ReferenceContext::new(
            id(1),
            id(1),
            id(4),
            reference_type_ids::ORGANIZES,
        ));
        let children: Vec<_> = graph.children_of(&id(1)).cloned().collect();
        assert_eq!(children, vec![id(2), id(3)]);
        assert_eq!(graph.children_of(&id(2)).count(), 0);
    }
}
