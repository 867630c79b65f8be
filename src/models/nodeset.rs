//! Node set model
//!
//! A `NodeSet` is the already-decoded form of a node set document: namespace URIs, model
//! table, alias table and the node records. Decoding the on-disk document format is the
//! job of an external reader; JSON and YAML dumps of this structure can be loaded directly.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::node::UANode;

/// Standard model node set bundled with the crate
const STANDARD_NODESET_YAML: &str = include_str!("../../resources/standard_nodeset.yaml");

/// Entry of the model table of a node set
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelTableEntry {
    pub model_uri: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub publication_date: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub required_model: Vec<ModelTableEntry>,
}

impl ModelTableEntry {
    pub fn new(model_uri: impl Into<String>) -> Self {
        Self {
            model_uri: model_uri.into(),
            version: None,
            publication_date: None,
            required_model: Vec::new(),
        }
    }
}

/// Symbolic name standing in for a NodeId inside one node set
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Alias {
    pub alias: String,
    pub value: String,
}

/// Decoded node set document
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeSet {
    /// Namespace URIs; entry `k` is local namespace index `k + 1`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace_uris: Option<Vec<String>>,
    /// Not supported, dropped on import
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub server_uris: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub models: Option<Vec<ModelTableEntry>>,
    #[serde(default)]
    pub aliases: Vec<Alias>,
    #[serde(default)]
    pub items: Vec<UANode>,
    /// Not supported, dropped on import
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extensions: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_modified: Option<DateTime<Utc>>,
}

impl NodeSet {
    /// The standard information model
    pub fn standard() -> Result<Self, serde_yaml::Error> {
        Self::from_yaml(STANDARD_NODESET_YAML)
    }

    pub fn from_yaml(yaml_content: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(yaml_content)
    }

    pub fn from_json(json_content: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json_content)
    }

    /// Model URI the node set is authored for, `None` for the standard model
    pub fn primary_namespace(&self) -> Option<&str> {
        self.namespace_uris
            .as_ref()
            .and_then(|uris| uris.first())
            .map(String::as_str)
    }
}
