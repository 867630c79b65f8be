//! Node set importer
//!
//! Merges one node set into the registries of an address space:
//!
//! 1. **Remap namespaces**: unsupported top-level features are reported and dropped, the
//!    node set's namespace URIs are registered and a [`UAModelContext`] is built.
//! 2. **Import each node**: identifiers are remapped, the data is attached to its node
//!    context and every declared reference is resolved into the reference graph.
//!    A failing node is reported and skipped; nodes imported before it stay in place.
//! 3. **Done**: a summary diagnostic with the number of processed nodes is emitted.

use tracing::{info, info_span};

use super::{ImportError, ImportSummary};
use crate::address_space::{NodeRegistry, ReferenceContext, ReferenceGraph, UAModelContext};
use crate::diagnostics::{BuildError, NodeFault, TraceMessage, emit};
use crate::models::{NamespaceTable, NodeId, NodeSet, Reference, UANode};

/// Importer working on the registries of one address space
pub struct ModelImporter<'a> {
    namespaces: &'a mut NamespaceTable,
    nodes: &'a mut NodeRegistry,
    references: &'a mut ReferenceGraph,
    trace: &'a mut dyn FnMut(&TraceMessage),
}

impl<'a> ModelImporter<'a> {
    pub fn new(
        namespaces: &'a mut NamespaceTable,
        nodes: &'a mut NodeRegistry,
        references: &'a mut ReferenceGraph,
        trace: &'a mut dyn FnMut(&TraceMessage),
    ) -> Self {
        Self {
            namespaces,
            nodes,
            references,
            trace,
        }
    }

    /// Import `nodeset`
    ///
    /// Only a failure to register the node set's namespaces is returned as an error;
    /// faults of individual nodes are collected in the summary.
    pub fn import(&mut self, nodeset: NodeSet) -> Result<ImportSummary, ImportError> {
        let model_context = self.remap_namespaces(&nodeset)?;
        let _span = info_span!("import_nodeset", model = %model_context.model_uri()).entered();

        self.trace(TraceMessage::diagnostic(format!(
            "Context for the imported model {} is created, starting import of {} nodes.",
            model_context.model_uri(),
            nodeset.items.len()
        )));

        let mut summary = ImportSummary {
            model_uri: model_context.model_uri().to_string(),
            namespace_index: model_context.primary_namespace_index(),
            nodes: nodeset.items.len(),
            ..ImportSummary::default()
        };

        for node in nodeset.items {
            let declared_id = node.node_id.clone();
            match self.import_node(node, &model_context) {
                Ok(added) => {
                    summary.imported += 1;
                    summary.references_added += added;
                }
                Err(error) => {
                    let message = format!(
                        "Import of node {declared_id} is interrupted by error: {error}"
                    );
                    self.trace(TraceMessage::build_error(
                        BuildError::NodeImportFailed,
                        message.clone(),
                    ));
                    summary.faults.push(NodeFault::new(declared_id, message));
                }
            }
        }

        info!(
            "Imported {} of {} nodes from {}",
            summary.imported, summary.nodes, summary.model_uri
        );
        self.trace(TraceMessage::diagnostic(format!(
            "Finishing import of {} - imported {} nodes.",
            summary.model_uri, summary.nodes
        )));
        Ok(summary)
    }

    fn remap_namespaces(&mut self, nodeset: &NodeSet) -> Result<UAModelContext, ImportError> {
        if nodeset.server_uris.is_some() {
            self.trace(TraceMessage::build_error(
                BuildError::NotSupportedFeature,
                "ServerUris is omitted during the import",
            ));
        }
        if nodeset.extensions.is_some() {
            self.trace(TraceMessage::build_error(
                BuildError::NotSupportedFeature,
                "Extensions is omitted during the import",
            ));
        }
        Ok(UAModelContext::new(nodeset, self.namespaces)?)
    }

    /// Import a single node, returning the number of references added
    fn import_node(
        &mut self,
        mut node: UANode,
        model_context: &UAModelContext,
    ) -> Result<usize, ImportError> {
        node.recalculate_node_ids(model_context)?;
        let node_id = NodeId::parse(&node.node_id)?;

        // resolve everything that can fail before touching the registries
        let resolved: Vec<(Reference, NodeId)> = node
            .references
            .iter()
            .map(|reference| -> Result<_, ImportError> {
                NodeId::parse(&reference.value)?;
                let type_node = model_context.resolve_node_id(&reference.reference_type)?;
                Ok((reference.clone(), type_node))
            })
            .collect::<Result<_, _>>()?;

        if self.nodes.attach(&node_id, node)?.is_some() {
            self.trace(TraceMessage::build_error(
                BuildError::NodeIdDuplicated,
                format!("NodeId {node_id} is defined more than once, the last definition wins."),
            ));
        }

        let mut added = 0;
        for (reference, type_node) in resolved {
            let context = ReferenceContext::resolve(&node_id, &reference, type_node, self.nodes)?;
            if self.references.add(context) {
                added += 1;
            }
        }
        Ok(added)
    }

    fn trace(&mut self, message: TraceMessage) {
        emit(&mut *self.trace, message);
    }
}
