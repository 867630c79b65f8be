//! Validate/export pipeline
//!
//! Exports the part of an address space belonging to one namespace:
//!
//! 1. **Select**: type nodes of the target namespace plus the instances the standard
//!    `Objects` folder organizes into that namespace.
//! 2. **Declare namespaces**: every registered namespace is declared to the factory before
//!    any node, so the exported model does not depend on node order.
//! 3. **Export each node**: one failing node is recorded and the batch continues.

use std::fmt::Write as _;

use chrono::format::{Item, StrftimeItems};
use chrono::{DateTime, Utc};
use indexmap::IndexSet;
use serde::Serialize;
use tracing::{info, info_span};

use super::{ExportError, ModelFactory};
use crate::diagnostics::{BuildError, NodeFault, TraceMessage, emit};
use crate::models::well_known::{object_ids, reference_type_ids};
use crate::models::{NamespaceEntry, NodeId};
use crate::validation::{ValidationContext, Validator};

/// Publication date format used when none is configured
pub const DEFAULT_PUBLICATION_DATE_FORMAT: &str = "%Y-%m-%d";

/// Whether `format` is a chrono format string without unknown specifiers
pub fn is_valid_date_format(format: &str) -> bool {
    !StrftimeItems::new(format).any(|item| matches!(item, Item::Error))
}

/// Outcome of one validate/export run
///
/// `exported + errors.len() == selected` always holds.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportReport {
    /// URI of the exported namespace
    pub namespace: String,
    pub selected: usize,
    pub exported: usize,
    pub errors: Vec<NodeFault>,
}

impl ExportReport {
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Validate/export pipeline bound to one address space, validator and factory
pub struct ValidateExportPipeline<'a> {
    context: ValidationContext<'a>,
    validator: &'a dyn Validator,
    factory: &'a mut dyn ModelFactory,
    trace: &'a mut dyn FnMut(&TraceMessage),
    default_publication_date: Option<DateTime<Utc>>,
    publication_date_format: String,
}

impl<'a> ValidateExportPipeline<'a> {
    pub fn new(
        context: ValidationContext<'a>,
        validator: &'a dyn Validator,
        factory: &'a mut dyn ModelFactory,
        trace: &'a mut dyn FnMut(&TraceMessage),
    ) -> Self {
        Self {
            context,
            validator,
            factory,
            trace,
            default_publication_date: None,
            publication_date_format: DEFAULT_PUBLICATION_DATE_FORMAT.to_string(),
        }
    }

    /// Date declared for namespaces without a publication date; "now" when unset
    pub fn with_default_publication_date(mut self, date: Option<DateTime<Utc>>) -> Self {
        self.default_publication_date = date;
        self
    }

    pub fn with_publication_date_format(mut self, format: impl Into<String>) -> Self {
        self.publication_date_format = format.into();
        self
    }

    /// Validate and export every node selected for `namespace_index`
    ///
    /// Fails without exporting anything when the standard `Objects` folder is missing, the
    /// publication date format is invalid or a namespace declaration is rejected by the
    /// factory.
    pub fn run(&mut self, namespace_index: u16) -> Result<ExportReport, ExportError> {
        let namespace = self
            .context
            .namespaces
            .get_string(namespace_index)
            .map_err(|_| ExportError::UnknownNamespace(format!("ns={namespace_index}")))?
            .to_string();
        let _span = info_span!("validate_and_export", namespace = %namespace).entered();

        let selected = self.select_nodes(namespace_index)?;
        self.trace(TraceMessage::diagnostic(format!(
            "Validate and export of {namespace} - selected {} nodes to be added to the model.",
            selected.len()
        )));

        self.declare_namespaces()?;

        let mut report = ExportReport {
            namespace,
            selected: selected.len(),
            ..ExportReport::default()
        };
        for node_id in &selected {
            match self.export_node(node_id) {
                Ok(()) => report.exported += 1,
                Err(error) => {
                    let message = format!(
                        "Error caught while processing the node {node_id}. The message: {error}."
                    );
                    self.trace(TraceMessage::build_error(
                        BuildError::NonCategorized,
                        message.clone(),
                    ));
                    report.errors.push(NodeFault::new(node_id.to_string(), message));
                }
            }
        }

        info!(
            "Exported {} of {} nodes from {} with {} errors",
            report.exported,
            report.selected,
            report.namespace,
            report.errors.len()
        );
        self.trace(TraceMessage::diagnostic(format!(
            "Finishing validate and export - the model contains {} nodes and {} errors.",
            report.exported,
            report.errors.len()
        )));
        Ok(report)
    }

    /// Type nodes of the namespace, then instances organized by the `Objects` folder
    fn select_nodes(&self, namespace_index: u16) -> Result<IndexSet<NodeId>, ExportError> {
        let objects = object_ids::OBJECTS_FOLDER;
        if !self.context.is_defined(&objects) {
            return Err(ExportError::MissingStandardNode(objects));
        }

        let mut selected: IndexSet<NodeId> = self
            .context
            .nodes
            .in_namespace(namespace_index)
            .filter(|context| context.is_type())
            .map(|context| context.node_id().clone())
            .collect();
        selected.extend(
            self.context
                .references
                .iter()
                .filter(|reference| {
                    reference.source() == &objects
                        && reference.type_node() == &reference_type_ids::ORGANIZES
                        && reference.target().namespace_index() == namespace_index
                })
                .map(|reference| reference.target().clone()),
        );
        Ok(selected)
    }

    fn declare_namespaces(&mut self) -> Result<(), ExportError> {
        let format = self.publication_date_format.as_str();
        if !is_valid_date_format(format) {
            return Err(ExportError::InvalidDateFormat(format.to_string()));
        }
        let entries: Vec<&NamespaceEntry> =
            self.context.namespaces.export_namespace_table().collect();
        for entry in entries {
            let date = entry
                .publication_date
                .or(self.default_publication_date)
                .unwrap_or_else(Utc::now);
            let mut publication_date = String::new();
            write!(publication_date, "{}", date.format(format))
                .map_err(|_| ExportError::InvalidDateFormat(format.to_string()))?;
            self.factory.create_namespace(
                &entry.uri,
                &publication_date,
                entry.version.as_deref(),
            )?;
        }
        Ok(())
    }

    fn export_node(&mut self, node_id: &NodeId) -> Result<(), ExportError> {
        let node = self
            .context
            .context(node_id)
            .ok_or_else(|| ExportError::UndefinedNode(node_id.clone()))?;
        self.validator
            .validate_export_node(node, &self.context, &mut *self.factory, &mut *self.trace)
    }

    fn trace(&mut self, message: TraceMessage) {
        emit(&mut *self.trace, message);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::address_space::{NodeRegistry, ReferenceContext, ReferenceGraph};
    use crate::export::{ExportedNode, InMemoryModelFactory};
    use crate::models::{
        NamespaceTable, NodeClassAttributes, ObjectAttributes, ObjectTypeAttributes, UANode,
    };
    use chrono::TimeZone;

    struct Space {
        namespaces: NamespaceTable,
        nodes: NodeRegistry,
        references: ReferenceGraph,
    }

    impl Space {
        fn new() -> Self {
            let mut space = Self {
                namespaces: NamespaceTable::new(),
                nodes: NodeRegistry::new(),
                references: ReferenceGraph::new(),
            };
            space
                .namespaces
                .get_index_or_append("http://example.com/Boiler/")
                .unwrap();
            space.define(UANode::new(
                "i=85",
                "Objects",
                NodeClassAttributes::Object(ObjectAttributes::default()),
            ));
            space
        }

        fn define(&mut self, node: UANode) {
            let id = NodeId::parse(&node.node_id).unwrap();
            self.nodes.attach(&id, node).unwrap();
        }

        fn object_type(&mut self, value: u32) {
            self.define(UANode::new(
                NodeId::numeric(1, value).to_string(),
                format!("1:Type{value}"),
                NodeClassAttributes::ObjectType(ObjectTypeAttributes::default()),
            ));
        }

        fn organize(&mut self, value: u32) {
            let target = NodeId::numeric(1, value);
            self.nodes.get_or_create(&target);
            self.references.add(ReferenceContext::new(
                object_ids::OBJECTS_FOLDER,
                object_ids::OBJECTS_FOLDER,
                target,
                reference_type_ids::ORGANIZES,
            ));
        }

        fn run(
            &self,
            validator: &dyn Validator,
            factory: &mut dyn ModelFactory,
        ) -> (Result<ExportReport, ExportError>, Vec<TraceMessage>) {
            let mut messages = Vec::new();
            let mut sink = |message: &TraceMessage| messages.push(message.clone());
            let context = ValidationContext::new(&self.namespaces, &self.nodes, &self.references);
            let result = ValidateExportPipeline::new(context, validator, factory, &mut sink)
                .with_default_publication_date(Some(
                    Utc.with_ymd_and_hms(2024, 1, 31, 0, 0, 0).unwrap(),
                ))
                .run(1);
            (result, messages)
        }
    }

    /// Fails every node whose identifier is even
    struct RejectEven;

    impl Validator for RejectEven {
        fn validate_export_node(
            &self,
            node: &crate::address_space::NodeContext,
            _context: &ValidationContext<'_>,
            factory: &mut dyn ModelFactory,
            _trace: &mut dyn FnMut(&TraceMessage),
        ) -> Result<(), ExportError> {
            if node.node_id().to_string().ends_with(['0', '2', '4', '6', '8']) {
                return Err(ExportError::UndefinedNode(node.node_id().clone()));
            }
            let data = node.node().unwrap();
            factory.add_node(ExportedNode {
                node_id: node.node_id().clone(),
                browse_name: crate::models::QualifiedName::parse(&data.browse_name).unwrap(),
                node_class: data.node_class(),
                node: data.clone(),
                base_type: None,
                children: Vec::new(),
            })?;
            Ok(())
        }
    }

    #[test]
    fn test_selects_types_and_organized_instances() {
        let mut space = Space::new();
        space.object_type(1);
        space.object_type(3);
        space.define(UANode::new(
            "ns=1;i=5",
            "1:Boiler",
            NodeClassAttributes::Object(ObjectAttributes::default()),
        ));
        // instance in the namespace but not organized by the Objects folder
        space.define(UANode::new(
            "ns=1;i=7",
            "1:Loose",
            NodeClassAttributes::Object(ObjectAttributes::default()),
        ));
        space.organize(5);

        let mut factory = InMemoryModelFactory::new();
        let (result, messages) = space.run(&crate::validation::DefaultValidator, &mut factory);
        let report = result.unwrap();

        assert_eq!(report.namespace, "http://example.com/Boiler/");
        assert_eq!(report.selected, 3);
        assert_eq!(report.exported, 3);
        assert!(report.is_clean());
        let exported: Vec<_> = factory.nodes.iter().map(|node| node.node_id.clone()).collect();
        assert_eq!(
            exported,
            vec![NodeId::numeric(1, 1), NodeId::numeric(1, 3), NodeId::numeric(1, 5)]
        );
        assert!(messages.last().unwrap().message.contains("3 nodes and 0 errors"));
    }

    #[test]
    fn test_namespaces_declared_before_nodes() {
        let mut space = Space::new();
        space.object_type(1);
        let mut factory = InMemoryModelFactory::new();
        space.run(&crate::validation::DefaultValidator, &mut factory).0.unwrap();

        assert_eq!(factory.namespaces.len(), 2);
        assert_eq!(factory.namespaces[0].uri, crate::models::STANDARD_NAMESPACE_URI);
        assert_eq!(factory.namespaces[1].publication_date, "2024-01-31");
    }

    #[test]
    fn test_failures_do_not_abort_batch() {
        let mut space = Space::new();
        for value in 1..=5 {
            space.object_type(value);
        }
        let mut factory = InMemoryModelFactory::new();
        let (result, messages) = space.run(&RejectEven, &mut factory);
        let report = result.unwrap();

        assert_eq!(report.selected, 5);
        assert_eq!(report.exported, 3);
        assert_eq!(report.errors.len(), 2);
        assert_eq!(report.exported + report.errors.len(), report.selected);
        assert_eq!(report.errors[0].node_id, "ns=1;i=2");
        assert_eq!(
            messages
                .iter()
                .filter(|m| m.build_error == Some(BuildError::NonCategorized))
                .count(),
            2
        );
    }

    #[test]
    fn test_missing_objects_folder_fails_fast() {
        let mut space = Space::new();
        space.nodes = NodeRegistry::new();
        space.object_type(1);
        let mut factory = InMemoryModelFactory::new();
        let (result, _) = space.run(&crate::validation::DefaultValidator, &mut factory);

        assert!(matches!(result, Err(ExportError::MissingStandardNode(_))));
        assert!(factory.namespaces.is_empty());
        assert!(factory.nodes.is_empty());
    }

    #[test]
    fn test_invalid_date_format_is_an_error() {
        let mut space = Space::new();
        space.object_type(1);
        let mut factory = InMemoryModelFactory::new();
        let mut sink = |_: &TraceMessage| {};
        let context = ValidationContext::new(&space.namespaces, &space.nodes, &space.references);
        let result = ValidateExportPipeline::new(
            context,
            &crate::validation::DefaultValidator,
            &mut factory,
            &mut sink,
        )
        .with_publication_date_format("%Y-%Q")
        .run(1);

        assert!(matches!(result, Err(ExportError::InvalidDateFormat(ref f)) if f == "%Y-%Q"));
        assert!(factory.namespaces.is_empty());
        assert!(factory.nodes.is_empty());
    }

    #[test]
    fn test_date_format_check() {
        assert!(is_valid_date_format(DEFAULT_PUBLICATION_DATE_FORMAT));
        assert!(is_valid_date_format("%d.%m.%Y"));
        assert!(!is_valid_date_format("%Y-%Q"));
    }
}
