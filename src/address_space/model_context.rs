//! Per-import model context
//!
//! Created for every imported node set. Registers the node set's namespace URIs with the
//! global namespace table and rewrites identifiers from the node set's local namespace
//! indices to the global ones, resolving aliases on the way.

use std::collections::HashMap;

use crate::models::well_known::standard_reference_type;
use crate::models::{
    IdentifierError, NamespaceError, NamespaceTable, NodeId, NodeIdRemap, NodeSet,
    QualifiedName, STANDARD_NAMESPACE_URI,
};

/// Namespace remapping and alias resolution for one imported node set
#[derive(Debug, Clone)]
pub struct UAModelContext {
    model_uri: String,
    /// Global namespace index for each local namespace index
    namespace_map: Vec<u16>,
    aliases: HashMap<String, String>,
}

impl UAModelContext {
    /// Register the namespaces of `nodeset` and build the local -> global mapping
    pub fn new(nodeset: &NodeSet, namespaces: &mut NamespaceTable) -> Result<Self, NamespaceError> {
        let mut namespace_map = vec![0];
        for uri in nodeset.namespace_uris.iter().flatten() {
            namespace_map.push(namespaces.get_index_or_append(uri)?);
        }
        for model in nodeset.models.iter().flatten() {
            namespaces.update_model(model)?;
        }

        let aliases = nodeset
            .aliases
            .iter()
            .map(|alias| (alias.alias.clone(), alias.value.clone()))
            .collect();

        Ok(Self {
            model_uri: nodeset
                .primary_namespace()
                .unwrap_or(STANDARD_NAMESPACE_URI)
                .to_string(),
            namespace_map,
            aliases,
        })
    }

    /// URI of the model being imported
    pub fn model_uri(&self) -> &str {
        &self.model_uri
    }

    /// Global index of the model's primary namespace
    pub fn primary_namespace_index(&self) -> u16 {
        self.namespace_map.get(1).copied().unwrap_or(0)
    }

    /// Resolve an alias or NodeId string and remap it to global namespace indices
    pub fn resolve_node_id(&self, value: &str) -> Result<NodeId, IdentifierError> {
        let local = match self.aliases.get(value) {
            Some(aliased) => NodeId::parse(aliased)?,
            None => match NodeId::parse(value) {
                Ok(node_id) => node_id,
                Err(error) => standard_reference_type(value).ok_or(error)?,
            },
        };
        let global = self.global_index(local.namespace_index(), value)?;
        Ok(local.with_namespace_index(global))
    }

    fn global_index(&self, local: u16, value: &str) -> Result<u16, IdentifierError> {
        self.namespace_map
            .get(usize::from(local))
            .copied()
            .ok_or_else(|| IdentifierError::UnknownNamespaceIndex {
                index: local,
                value: value.to_string(),
            })
    }
}

impl NodeIdRemap for UAModelContext {
    fn import_node_id(&self, node_id: &str) -> Result<String, IdentifierError> {
        self.resolve_node_id(node_id).map(|id| id.to_string())
    }

    fn import_qualified_name(&self, name: &str) -> Result<String, IdentifierError> {
        let mut qualified = QualifiedName::parse(name)?;
        qualified.namespace_index = self.global_index(qualified.namespace_index, name)?;
        Ok(qualified.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Alias, ModelTableEntry};

    fn vendor_nodeset() -> NodeSet {
        NodeSet {
            namespace_uris: Some(vec![
                "http://example.com/Boiler/".to_string(),
                "http://example.com/DI/".to_string(),
            ]),
            models: Some(vec![ModelTableEntry::new("http://example.com/Boiler/")]),
            aliases: vec![Alias {
                alias: "Float".to_string(),
                value: "i=10".to_string(),
            }],
            ..NodeSet::default()
        }
    }

    #[test]
    fn test_registers_declared_namespaces() {
        let mut table = NamespaceTable::new();
        table.get_index_or_append("http://example.com/DI/").unwrap();

        let context = UAModelContext::new(&vendor_nodeset(), &mut table).unwrap();
        assert_eq!(table.len(), 3);
        assert_eq!(context.model_uri(), "http://example.com/Boiler/");
        assert_eq!(context.primary_namespace_index(), 2);

        // local 1 -> global 2, local 2 -> global 1
        assert_eq!(context.import_node_id("ns=1;i=5").unwrap(), "ns=2;i=5");
        assert_eq!(context.import_node_id("ns=2;i=5").unwrap(), "ns=1;i=5");
        assert_eq!(context.import_node_id("i=85").unwrap(), "i=85");
        assert_eq!(context.import_qualified_name("1:Boiler").unwrap(), "2:Boiler");
    }

    #[test]
    fn test_standard_model_registers_nothing() {
        let mut table = NamespaceTable::new();
        let context = UAModelContext::new(&NodeSet::default(), &mut table).unwrap();
        assert_eq!(table.len(), 1);
        assert_eq!(context.model_uri(), STANDARD_NAMESPACE_URI);
        assert_eq!(context.primary_namespace_index(), 0);
    }

    #[test]
    fn test_aliases_and_standard_names() {
        let mut table = NamespaceTable::new();
        let context = UAModelContext::new(&vendor_nodeset(), &mut table).unwrap();
        assert_eq!(context.import_node_id("Float").unwrap(), "i=10");
        assert_eq!(context.import_node_id("HasComponent").unwrap(), "i=47");
        assert!(matches!(
            context.import_node_id("NoSuchAlias"),
            Err(IdentifierError::InvalidNodeId(_))
        ));
    }

    #[test]
    fn test_undeclared_local_namespace() {
        let mut table = NamespaceTable::new();
        let context = UAModelContext::new(&vendor_nodeset(), &mut table).unwrap();
        assert!(matches!(
            context.import_node_id("ns=3;i=1"),
            Err(IdentifierError::UnknownNamespaceIndex { index: 3, .. })
        ));
    }
}
