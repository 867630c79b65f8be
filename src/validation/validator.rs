//! Per-node validation ahead of export
//!
//! A [`Validator`] checks one node against the address space and hands the validated,
//! minimal form of the node to a model factory.

use tracing::debug;

use super::ValidationContext;
use crate::address_space::NodeContext;
use crate::diagnostics::{BuildError, TraceMessage, emit};
use crate::export::{ExportError, ExportedNode, ModelFactory};
use crate::models::QualifiedName;

/// Validates and exports a single node
pub trait Validator {
    fn validate_export_node(
        &self,
        node: &NodeContext,
        context: &ValidationContext<'_>,
        factory: &mut dyn ModelFactory,
        trace: &mut dyn FnMut(&TraceMessage),
    ) -> Result<(), ExportError>;
}

/// Standard validation rules
///
/// 1. The node must carry data.
/// 2. Its BrowseName must be a valid QualifiedName.
/// 3. A type node must have a sound inheritance chain; values inherited unchanged from the
///    nearest base are dropped from the exported copy.
/// 4. Undefined instance declarations and type definitions are reported, not fatal.
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultValidator;

impl DefaultValidator {
    pub fn new() -> Self {
        Self
    }
}

impl Validator for DefaultValidator {
    fn validate_export_node(
        &self,
        node: &NodeContext,
        context: &ValidationContext<'_>,
        factory: &mut dyn ModelFactory,
        trace: &mut dyn FnMut(&TraceMessage),
    ) -> Result<(), ExportError> {
        let node_id = node.node_id();
        let data = node
            .node()
            .ok_or_else(|| ExportError::UndefinedNode(node_id.clone()))?;
        let browse_name = QualifiedName::parse(&data.browse_name)?;
        let node_class = data.node_class();

        let mut minimal = data.clone();
        let mut base_type = None;
        if node_class.is_type() {
            let chain = context.inheritance().base_types(node_id)?;
            if let Some(base) = chain.first() {
                base_type = Some(base.node_id().clone());
                if let Some(base_data) = base.node() {
                    minimal.remove_inherited_values(base_data);
                }
            }
        }

        let children: Vec<_> = context
            .children_of(node_id)
            .into_iter()
            .cloned()
            .collect();
        for child in &children {
            if !context.is_defined(child) {
                emit(
                    trace,
                    TraceMessage::build_error(
                        BuildError::NodeIdNotDefined,
                        format!("Instance declaration {child} of {node_id} is not defined."),
                    ),
                );
            }
        }
        if let Some(type_definition) = context.type_definition(node_id) {
            if !context.is_defined(type_definition) {
                emit(
                    trace,
                    TraceMessage::build_error(
                        BuildError::NodeIdNotDefined,
                        format!("Type definition {type_definition} of {node_id} is not defined."),
                    ),
                );
            }
        }

        debug!(
            "Exporting {} {} with {} children",
            node_class,
            node_id,
            children.len()
        );
        factory.add_node(ExportedNode {
            node_id: node_id.clone(),
            browse_name,
            node_class,
            node: minimal,
            base_type,
            children,
        })?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::address_space::{NodeRegistry, ReferenceContext, ReferenceGraph};
    use crate::export::InMemoryModelFactory;
    use crate::models::well_known::reference_type_ids;
    use crate::models::{
        NamespaceTable, NodeClassAttributes, NodeId, ObjectAttributes, ObjectTypeAttributes,
        UANode,
    };

    struct Fixture {
        namespaces: NamespaceTable,
        nodes: NodeRegistry,
        references: ReferenceGraph,
    }

    impl Fixture {
        fn new() -> Self {
            let mut fixture = Self {
                namespaces: NamespaceTable::new(),
                nodes: NodeRegistry::new(),
                references: ReferenceGraph::new(),
            };
            fixture.define(
                UANode::new(
                    "ns=1;i=1",
                    "1:ComplexObjectType",
                    NodeClassAttributes::ObjectType(ObjectTypeAttributes::default()),
                )
                .with_display_name("Shared")
                .with_description("Base description"),
            );
            fixture.define(
                UANode::new(
                    "ns=1;i=2",
                    "1:DerivedFromComplexObjectType",
                    NodeClassAttributes::ObjectType(ObjectTypeAttributes::default()),
                )
                .with_display_name("Shared")
                .with_description("Own description"),
            );
            fixture.link(1, 2, reference_type_ids::HAS_SUBTYPE);
            fixture
        }

        fn define(&mut self, node: UANode) {
            let id = NodeId::parse(&node.node_id).unwrap();
            self.nodes.attach(&id, node).unwrap();
        }

        fn link(&mut self, source: u32, target: u32, type_node: NodeId) {
            let source = NodeId::numeric(1, source);
            let target = NodeId::numeric(1, target);
            self.nodes.get_or_create(&target);
            self.references.add(ReferenceContext::new(
                source.clone(),
                source,
                target,
                type_node,
            ));
        }

        fn validate(
            &self,
            node_id: u32,
            factory: &mut InMemoryModelFactory,
        ) -> (Result<(), ExportError>, Vec<TraceMessage>) {
            let context = ValidationContext::new(&self.namespaces, &self.nodes, &self.references);
            let node = self.nodes.try_get(&NodeId::numeric(1, node_id)).unwrap();
            let mut messages = Vec::new();
            let mut sink = |message: &TraceMessage| messages.push(message.clone());
            let result = DefaultValidator.validate_export_node(node, &context, factory, &mut sink);
            (result, messages)
        }
    }

    #[test]
    fn test_type_exports_minimal_delta() {
        let fixture = Fixture::new();
        let mut factory = InMemoryModelFactory::new();
        let (result, messages) = fixture.validate(2, &mut factory);
        result.unwrap();
        assert!(messages.is_empty());

        let exported = factory.node(&NodeId::numeric(1, 2)).unwrap();
        assert_eq!(exported.base_type, Some(NodeId::numeric(1, 1)));
        assert!(exported.node.display_name.is_none());
        assert_eq!(
            exported.node.description.as_ref().unwrap()[0].value,
            "Own description"
        );
    }

    #[test]
    fn test_stub_is_rejected() {
        let mut fixture = Fixture::new();
        fixture.nodes.get_or_create(&NodeId::numeric(1, 9));
        let mut factory = InMemoryModelFactory::new();
        let (result, _) = fixture.validate(9, &mut factory);
        assert!(matches!(result, Err(ExportError::UndefinedNode(_))));
        assert!(factory.nodes.is_empty());
    }

    #[test]
    fn test_undefined_children_are_reported() {
        let mut fixture = Fixture::new();
        fixture.define(UANode::new(
            "ns=1;i=3",
            "1:Boiler",
            NodeClassAttributes::Object(ObjectAttributes::default()),
        ));
        fixture.link(3, 4, reference_type_ids::HAS_COMPONENT);
        fixture.link(3, 2, reference_type_ids::HAS_TYPE_DEFINITION);
        fixture.link(3, 5, reference_type_ids::HAS_TYPE_DEFINITION);

        let mut factory = InMemoryModelFactory::new();
        let (result, messages) = fixture.validate(3, &mut factory);
        result.unwrap();

        let exported = factory.node(&NodeId::numeric(1, 3)).unwrap();
        assert_eq!(exported.children, vec![NodeId::numeric(1, 4)]);
        assert!(exported.base_type.is_none());
        // first HasTypeDefinition is defined, only the undefined child is reported
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].build_error, Some(BuildError::NodeIdNotDefined));
    }

    #[test]
    fn test_cycle_fails_validation() {
        let mut fixture = Fixture::new();
        fixture.link(2, 1, reference_type_ids::HAS_SUBTYPE);
        let mut factory = InMemoryModelFactory::new();
        let (result, _) = fixture.validate(2, &mut factory);
        assert!(matches!(result, Err(ExportError::Inheritance(_))));
    }

    #[test]
    fn test_invalid_browse_name() {
        let mut fixture = Fixture::new();
        fixture.define(UANode::new(
            "ns=1;i=6",
            "",
            NodeClassAttributes::Object(ObjectAttributes::default()),
        ));
        let mut factory = InMemoryModelFactory::new();
        let (result, _) = fixture.validate(6, &mut factory);
        assert!(matches!(result, Err(ExportError::Identifier(_))));
    }
}
