//! Export functionality
//!
//! Hands validated nodes to a model factory that renders them into a downstream model
//! representation:
//! - `NoopModelFactory`: accepts everything, used when no factory is supplied
//! - `InMemoryModelFactory`: records namespaces and nodes, serializes them to JSON or YAML

pub mod pipeline;

use serde::{Deserialize, Serialize};

use crate::models::{IdentifierError, NodeClass, NodeId, QualifiedName, UANode};
use crate::validation::InheritanceError;

pub use pipeline::{ExportReport, ValidateExportPipeline};

/// Result of an export operation
#[derive(Debug)]
pub struct ExportResult {
    /// Exported content
    pub content: String,
    /// Format identifier
    pub format: String,
}

/// Error during export
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("Serialization error: {0}")]
    SerializationError(String),
    #[error("Invalid publication date format '{0}'")]
    InvalidDateFormat(String),
    #[error("Namespace {0} is not registered in the address space")]
    UnknownNamespace(String),
    #[error("Cannot find {0} in the standard information model")]
    MissingStandardNode(NodeId),
    #[error("Node {0} is referenced but not defined")]
    UndefinedNode(NodeId),
    #[error("Inheritance error: {0}")]
    Inheritance(#[from] InheritanceError),
    #[error("Identifier error: {0}")]
    Identifier(#[from] IdentifierError),
    #[error("Model factory error: {0}")]
    Factory(#[from] anyhow::Error),
}

/// Validated node as handed to a model factory
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportedNode {
    pub node_id: NodeId,
    pub browse_name: QualifiedName,
    pub node_class: NodeClass,
    /// Node data reduced to the values not inherited from the base type
    pub node: UANode,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_type: Option<NodeId>,
    /// Instance declarations (HasComponent/HasProperty targets)
    #[serde(default)]
    pub children: Vec<NodeId>,
}

/// Namespace declaration as handed to a model factory
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportedNamespace {
    pub uri: String,
    pub publication_date: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}

/// Renders validated nodes into a downstream model
///
/// Implementations are third-party code; their errors are carried as `anyhow::Error`.
pub trait ModelFactory {
    /// Declare a namespace of the exported model
    fn create_namespace(
        &mut self,
        uri: &str,
        publication_date: &str,
        version: Option<&str>,
    ) -> anyhow::Result<()>;

    /// Add one validated node
    fn add_node(&mut self, node: ExportedNode) -> anyhow::Result<()>;
}

/// Factory that accepts everything and keeps nothing
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopModelFactory;

impl ModelFactory for NoopModelFactory {
    fn create_namespace(
        &mut self,
        _uri: &str,
        _publication_date: &str,
        _version: Option<&str>,
    ) -> anyhow::Result<()> {
        Ok(())
    }

    fn add_node(&mut self, _node: ExportedNode) -> anyhow::Result<()> {
        Ok(())
    }
}

/// Factory collecting the exported model in memory
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InMemoryModelFactory {
    pub namespaces: Vec<ExportedNamespace>,
    pub nodes: Vec<ExportedNode>,
}

impl InMemoryModelFactory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn node(&self, node_id: &NodeId) -> Option<&ExportedNode> {
        self.nodes.iter().find(|node| &node.node_id == node_id)
    }

    pub fn to_json(&self) -> Result<ExportResult, ExportError> {
        let content = serde_json::to_string_pretty(self)
            .map_err(|e| ExportError::SerializationError(e.to_string()))?;
        Ok(ExportResult {
            content,
            format: "json".to_string(),
        })
    }

    pub fn to_yaml(&self) -> Result<ExportResult, ExportError> {
        let content = serde_yaml::to_string(self)
            .map_err(|e| ExportError::SerializationError(e.to_string()))?;
        Ok(ExportResult {
            content,
            format: "yaml".to_string(),
        })
    }
}

impl ModelFactory for InMemoryModelFactory {
    fn create_namespace(
        &mut self,
        uri: &str,
        publication_date: &str,
        version: Option<&str>,
    ) -> anyhow::Result<()> {
        self.namespaces.push(ExportedNamespace {
            uri: uri.to_string(),
            publication_date: publication_date.to_string(),
            version: version.map(str::to_string),
        });
        Ok(())
    }

    fn add_node(&mut self, node: ExportedNode) -> anyhow::Result<()> {
        if self.nodes.iter().any(|known| known.node_id == node.node_id) {
            anyhow::bail!("Node {} has already been added to the model", node.node_id);
        }
        self.nodes.push(node);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{NodeClassAttributes, ObjectTypeAttributes};

    fn exported(node_id: NodeId) -> ExportedNode {
        ExportedNode {
            browse_name: QualifiedName::new(1, "BoilerType"),
            node_class: NodeClass::ObjectType,
            node: UANode::new(
                node_id.to_string(),
                "1:BoilerType",
                NodeClassAttributes::ObjectType(ObjectTypeAttributes::default()),
            ),
            base_type: Some(NodeId::numeric(0, 58)),
            children: vec![NodeId::numeric(1, 5002)],
            node_id,
        }
    }

    #[test]
    fn test_in_memory_factory_rejects_duplicates() {
        let mut factory = InMemoryModelFactory::new();
        factory.add_node(exported(NodeId::numeric(1, 1001))).unwrap();
        assert!(factory.add_node(exported(NodeId::numeric(1, 1001))).is_err());
        assert_eq!(factory.nodes.len(), 1);
        assert!(factory.node(&NodeId::numeric(1, 1001)).is_some());
    }

    #[test]
    fn test_in_memory_factory_serializes() {
        let mut factory = InMemoryModelFactory::new();
        factory
            .create_namespace("http://example.com/Boiler/", "2024-01-31", Some("1.0.0"))
            .unwrap();
        factory.add_node(exported(NodeId::numeric(1, 1001))).unwrap();

        let json = factory.to_json().unwrap();
        assert_eq!(json.format, "json");
        let value: serde_json::Value = serde_json::from_str(&json.content).unwrap();
        assert_eq!(value["namespaces"][0]["publicationDate"], "2024-01-31");
        assert_eq!(value["nodes"][0]["nodeId"], "ns=1;i=1001");
        assert_eq!(value["nodes"][0]["baseType"], "i=58");
        assert_eq!(value["nodes"][0]["browseName"], "1:BoilerType");

        let yaml = factory.to_yaml().unwrap();
        assert_eq!(yaml.format, "yaml");
        let restored: InMemoryModelFactory = serde_yaml::from_str(&yaml.content).unwrap();
        assert_eq!(restored.nodes.len(), 1);
    }

    #[test]
    fn test_noop_factory_accepts_everything() {
        let mut factory = NoopModelFactory;
        assert!(factory.create_namespace("urn:a", "2024-01-31", None).is_ok());
        assert!(factory.add_node(exported(NodeId::numeric(1, 1))).is_ok());
        assert!(factory.add_node(exported(NodeId::numeric(1, 1))).is_ok());
    }
}
