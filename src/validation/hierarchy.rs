//! Address space consistency checks
//!
//! Whole-graph checks run on demand after imports: undefined (stub) nodes, cycles in the
//! subtype hierarchy and types with more than one direct supertype.
//!
//! Uses petgraph to find strongly connected components of the HasSubtype graph.

use std::collections::HashMap;

use indexmap::IndexMap;
use petgraph::algo::tarjan_scc;
use petgraph::{Directed, Graph};
use serde::Serialize;
use tracing::debug;

use crate::address_space::{NodeRegistry, ReferenceGraph};
use crate::models::NodeId;
use crate::models::well_known::reference_type_ids;

/// Type with more than one direct supertype
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MultipleInheritance {
    pub node_id: NodeId,
    pub supertypes: Vec<NodeId>,
}

/// Result of a consistency check
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsistencyReport {
    /// Nodes referenced but never defined
    pub undefined_nodes: Vec<NodeId>,
    /// Each entry lists the members of one subtype cycle
    pub subtype_cycles: Vec<Vec<NodeId>>,
    pub multiple_inheritance: Vec<MultipleInheritance>,
}

impl ConsistencyReport {
    pub fn is_consistent(&self) -> bool {
        self.undefined_nodes.is_empty()
            && self.subtype_cycles.is_empty()
            && self.multiple_inheritance.is_empty()
    }
}

/// Hierarchy validator
pub struct HierarchyValidator<'a> {
    nodes: &'a NodeRegistry,
    references: &'a ReferenceGraph,
}

impl<'a> HierarchyValidator<'a> {
    pub fn new(nodes: &'a NodeRegistry, references: &'a ReferenceGraph) -> Self {
        Self { nodes, references }
    }

    /// Run every check
    pub fn check(&self) -> ConsistencyReport {
        let report = ConsistencyReport {
            undefined_nodes: self.undefined_nodes(),
            subtype_cycles: self.subtype_cycles(),
            multiple_inheritance: self.multiple_inheritance(),
        };
        debug!(
            "Consistency check: {} undefined nodes, {} subtype cycles, {} multiple inheritance",
            report.undefined_nodes.len(),
            report.subtype_cycles.len(),
            report.multiple_inheritance.len()
        );
        report
    }

    pub fn undefined_nodes(&self) -> Vec<NodeId> {
        self.nodes
            .stubs()
            .map(|context| context.node_id().clone())
            .collect()
    }

    /// Cycles in the subtype hierarchy, edges pointing from supertype to subtype
    pub fn subtype_cycles(&self) -> Vec<Vec<NodeId>> {
        let mut graph = Graph::<&NodeId, (), Directed>::new();
        let mut node_map = HashMap::new();
        let mut self_loops = Vec::new();

        let has_subtype = reference_type_ids::HAS_SUBTYPE;
        for reference in self.references.of_type(&has_subtype) {
            if reference.source() == reference.target() {
                self_loops.push(vec![reference.source().clone()]);
                continue;
            }
            let source = *node_map
                .entry(reference.source())
                .or_insert_with(|| graph.add_node(reference.source()));
            let target = *node_map
                .entry(reference.target())
                .or_insert_with(|| graph.add_node(reference.target()));
            graph.add_edge(source, target, ());
        }

        let mut cycles: Vec<Vec<NodeId>> = tarjan_scc(&graph)
            .into_iter()
            .filter(|component| component.len() > 1)
            .map(|component| {
                let mut members: Vec<NodeId> = component
                    .into_iter()
                    .map(|index| graph[index].clone())
                    .collect();
                members.sort();
                members
            })
            .collect();
        cycles.extend(self_loops);
        cycles
    }

    /// Types with more than one direct supertype, in registration order of the subtype
    pub fn multiple_inheritance(&self) -> Vec<MultipleInheritance> {
        let mut supertypes: IndexMap<&NodeId, Vec<NodeId>> = IndexMap::new();
        let has_subtype = reference_type_ids::HAS_SUBTYPE;
        for reference in self.references.of_type(&has_subtype) {
            supertypes
                .entry(reference.target())
                .or_default()
                .push(reference.source().clone());
        }
        supertypes
            .into_iter()
            .filter(|(_, bases)| bases.len() > 1)
            .map(|(node_id, bases)| MultipleInheritance {
                node_id: node_id.clone(),
                supertypes: bases,
            })
            .collect()
    }
}
