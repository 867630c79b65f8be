//! Address space context
//!
//! Owns the namespace table, the node registry and the reference graph of one address
//! space, and exposes import, inheritance queries and validate/export on top of them.
//! Operations run to completion one at a time; there is no internal locking.

use std::path::Path;

use tracing::info;

use super::registry::{NodeContext, NodeRegistry};
use super::references::{ReferenceContext, ReferenceGraph};
use crate::config::AddressSpaceConfig;
use crate::diagnostics::{BuildError, TraceMessage, TraceSink, emit};
use crate::export::{
    ExportError, ExportReport, ModelFactory, NoopModelFactory, ValidateExportPipeline,
};
use crate::import::{ImportError, ImportSummary, ModelImporter, read_nodeset_file};
use crate::models::{
    NamespaceEntry, NamespaceError, NamespaceTable, NodeId, NodeSet, QualifiedName,
};
use crate::validation::{
    ConsistencyReport, DefaultValidator, HierarchyValidator, InheritanceError, ValidationContext,
    Validator,
};

/// Owner of one address space
pub struct AddressSpaceContext {
    config: AddressSpaceConfig,
    namespaces: NamespaceTable,
    nodes: NodeRegistry,
    references: ReferenceGraph,
    trace: TraceSink,
    factory: Box<dyn ModelFactory>,
    validator: Box<dyn Validator>,
}

impl AddressSpaceContext {
    /// Create a context holding the standard model
    pub fn new(trace: TraceSink) -> Result<Self, ImportError> {
        Self::with_config(AddressSpaceConfig::default(), trace)
    }

    /// Create a context from `config`
    ///
    /// The standard model is imported unless the config disables it; a standard model
    /// that cannot be decoded is an error.
    pub fn with_config(config: AddressSpaceConfig, trace: TraceSink) -> Result<Self, ImportError> {
        let mut context = Self {
            config,
            namespaces: NamespaceTable::new(),
            nodes: NodeRegistry::new(),
            references: ReferenceGraph::new(),
            trace,
            factory: Box::new(NoopModelFactory),
            validator: Box::new(DefaultValidator),
        };
        if context.config.load_standard_model {
            let standard = NodeSet::standard().map_err(|e| {
                ImportError::ParseError(format!("Failed to decode the standard model: {e}"))
            })?;
            let summary = context.import_nodeset(standard)?;
            info!(
                "Standard model loaded: {} nodes, {} references",
                summary.imported, summary.references_added
            );
        }
        Ok(context)
    }

    pub fn config(&self) -> &AddressSpaceConfig {
        &self.config
    }

    /// Replace the model factory; `None` restores the no-op factory
    pub fn set_model_factory(&mut self, factory: Option<Box<dyn ModelFactory>>) {
        self.factory = factory.unwrap_or_else(|| Box::new(NoopModelFactory));
    }

    /// Replace the per-node validator
    pub fn set_validator(&mut self, validator: Box<dyn Validator>) {
        self.validator = validator;
    }

    /// Merge `nodeset` into the address space
    pub fn import_nodeset(&mut self, nodeset: NodeSet) -> Result<ImportSummary, ImportError> {
        ModelImporter::new(
            &mut self.namespaces,
            &mut self.nodes,
            &mut self.references,
            &mut *self.trace,
        )
        .import(nodeset)
    }

    /// Load a JSON or YAML node set from `path` and merge it
    pub fn import_nodeset_file(&mut self, path: &Path) -> Result<ImportSummary, ImportError> {
        let nodeset = read_nodeset_file(path)?;
        info!("Importing node set from {}", path.display());
        self.import_nodeset(nodeset)
    }

    pub fn namespaces(&self) -> &NamespaceTable {
        &self.namespaces
    }

    pub fn nodes(&self) -> &NodeRegistry {
        &self.nodes
    }

    pub fn references(&self) -> &ReferenceGraph {
        &self.references
    }

    /// Register `uri`, returning its index
    pub fn get_index_or_append(&mut self, uri: &str) -> Result<u16, NamespaceError> {
        self.namespaces.get_index_or_append(uri)
    }

    /// Namespace declarations in index order
    pub fn export_namespace_table(&self) -> impl Iterator<Item = &NamespaceEntry> {
        self.namespaces.export_namespace_table()
    }

    pub fn try_get(&self, node_id: &NodeId) -> Option<&NodeContext> {
        self.nodes.try_get(node_id)
    }

    /// BrowseName of a defined node
    ///
    /// Unknown ids and stubs are reported as `NodeIdNotDefined`, an unparsable BrowseName
    /// as `NonCategorized`.
    pub fn export_browse_name(&mut self, node_id: &NodeId) -> Option<QualifiedName> {
        let browse_name = self
            .nodes
            .try_get(node_id)
            .and_then(NodeContext::node)
            .map(|node| QualifiedName::parse(&node.browse_name));
        match browse_name {
            Some(Ok(name)) => Some(name),
            Some(Err(error)) => {
                emit(
                    &mut *self.trace,
                    TraceMessage::build_error(
                        BuildError::NonCategorized,
                        format!("Invalid BrowseName of {node_id}: {error}"),
                    ),
                );
                None
            }
            None => {
                emit(
                    &mut *self.trace,
                    TraceMessage::build_error(
                        BuildError::NodeIdNotDefined,
                        format!("NodeId: {node_id} is omitted during the import."),
                    ),
                );
                None
            }
        }
    }

    /// Inheritance chain of `node_id`, nearest supertype first
    pub fn base_types(&self, node_id: &NodeId) -> Result<Vec<&NodeContext>, InheritanceError> {
        self.validation_context().inheritance().base_types(node_id)
    }

    /// Instance declarations of `node_id`
    pub fn children_of(&self, node_id: &NodeId) -> Vec<&NodeContext> {
        self.references
            .children_of(node_id)
            .filter_map(|child| self.nodes.try_get(child))
            .collect()
    }

    /// References declared by `node_id`
    pub fn outgoing_from(&self, node_id: &NodeId) -> Vec<&ReferenceContext> {
        self.references.outgoing_from(node_id).collect()
    }

    /// References pointing at `node_id` declared by other nodes
    pub fn incoming_to(&self, node_id: &NodeId) -> Vec<&ReferenceContext> {
        self.references.incoming_to(node_id).collect()
    }

    /// Report undefined nodes, subtype cycles and multiple inheritance
    pub fn check_consistency(&mut self) -> ConsistencyReport {
        let report = HierarchyValidator::new(&self.nodes, &self.references).check();
        for node_id in &report.undefined_nodes {
            emit(
                &mut *self.trace,
                TraceMessage::build_error(
                    BuildError::NodeIdNotDefined,
                    format!("NodeId: {node_id} is referenced but never defined."),
                ),
            );
        }
        for cycle in &report.subtype_cycles {
            let members: Vec<String> = cycle.iter().map(NodeId::to_string).collect();
            emit(
                &mut *self.trace,
                TraceMessage::build_error(
                    BuildError::CircularReference,
                    format!("Circular reference in the subtype hierarchy: {}", members.join(", ")),
                ),
            );
        }
        for found in &report.multiple_inheritance {
            emit(
                &mut *self.trace,
                TraceMessage::build_error(
                    BuildError::TooManySubtypes,
                    format!(
                        "{} has {} direct supertypes.",
                        found.node_id,
                        found.supertypes.len()
                    ),
                ),
            );
        }
        report
    }

    /// Validate and export the configured target namespace, or the last registered one
    pub fn validate_and_export_model(&mut self) -> Result<ExportReport, ExportError> {
        let namespace_index = match self.config.target_namespace.as_deref() {
            Some(uri) => self
                .namespaces
                .get_index(uri)
                .ok_or_else(|| ExportError::UnknownNamespace(uri.to_string()))?,
            None => self.namespaces.last_namespace_index(),
        };
        self.export_with(namespace_index, None)
    }

    /// Validate and export the namespace `uri`
    pub fn validate_and_export_namespace(&mut self, uri: &str) -> Result<ExportReport, ExportError> {
        let namespace_index = self
            .namespaces
            .get_index(uri)
            .ok_or_else(|| ExportError::UnknownNamespace(uri.to_string()))?;
        self.export_with(namespace_index, None)
    }

    /// Validate and export the namespace `uri` into `factory` instead of the installed one
    pub fn validate_and_export_namespace_to(
        &mut self,
        uri: &str,
        factory: &mut dyn ModelFactory,
    ) -> Result<ExportReport, ExportError> {
        let namespace_index = self
            .namespaces
            .get_index(uri)
            .ok_or_else(|| ExportError::UnknownNamespace(uri.to_string()))?;
        self.export_with(namespace_index, Some(factory))
    }

    fn export_with(
        &mut self,
        namespace_index: u16,
        factory: Option<&mut dyn ModelFactory>,
    ) -> Result<ExportReport, ExportError> {
        let context = ValidationContext::new(&self.namespaces, &self.nodes, &self.references);
        let factory: &mut dyn ModelFactory = match factory {
            Some(factory) => factory,
            None => &mut *self.factory,
        };
        ValidateExportPipeline::new(context, &*self.validator, factory, &mut *self.trace)
            .with_default_publication_date(self.config.default_publication_date)
            .with_publication_date_format(self.config.publication_date_format.clone())
            .run(namespace_index)
    }

    fn validation_context(&self) -> ValidationContext<'_> {
        ValidationContext::new(&self.namespaces, &self.nodes, &self.references)
    }
}

impl std::fmt::Debug for AddressSpaceContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AddressSpaceContext")
            .field("namespaces", &self.namespaces.len())
            .field("nodes", &self.nodes.len())
            .field("references", &self.references.len())
            .finish()
    }
}
