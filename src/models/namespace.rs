//! Namespace table
//!
//! Bidirectional registry of namespace URI <-> namespace index. Index 0 always holds the
//! standard model namespace; every imported model appends its URIs. Once assigned, the
//! index of a URI never changes for the lifetime of the table.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::nodeset::ModelTableEntry;

/// URI of the standard information model, always registered at index 0
pub const STANDARD_NAMESPACE_URI: &str = "http://opcfoundation.org/UA/";

/// Errors raised by the namespace table
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NamespaceError {
    #[error("Namespace index {0} is not assigned")]
    IndexOutOfRange(u16),
    #[error("Namespace table is full, cannot register '{0}'")]
    TableFull(String),
}

/// Registered namespace with the model metadata known for it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NamespaceEntry {
    pub uri: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub publication_date: Option<DateTime<Utc>>,
}

impl NamespaceEntry {
    fn new(uri: impl Into<String>) -> Self {
        Self {
            uri: uri.into(),
            version: None,
            publication_date: None,
        }
    }
}

/// Ordered namespace URI registry
#[derive(Debug, Clone)]
pub struct NamespaceTable {
    entries: Vec<NamespaceEntry>,
    index: HashMap<String, u16>,
}

impl Default for NamespaceTable {
    fn default() -> Self {
        Self::new()
    }
}

impl NamespaceTable {
    /// Create a table holding only the standard namespace at index 0
    pub fn new() -> Self {
        let mut index = HashMap::new();
        index.insert(STANDARD_NAMESPACE_URI.to_string(), 0);
        Self {
            entries: vec![NamespaceEntry::new(STANDARD_NAMESPACE_URI)],
            index,
        }
    }

    /// Return the index of `uri`, registering it first if unknown
    pub fn get_index_or_append(&mut self, uri: &str) -> Result<u16, NamespaceError> {
        if let Some(index) = self.index.get(uri) {
            return Ok(*index);
        }
        let next = u16::try_from(self.entries.len())
            .map_err(|_| NamespaceError::TableFull(uri.to_string()))?;
        self.entries.push(NamespaceEntry::new(uri));
        self.index.insert(uri.to_string(), next);
        Ok(next)
    }

    /// URI registered at `index`
    pub fn get_string(&self, index: u16) -> Result<&str, NamespaceError> {
        self.entries
            .get(usize::from(index))
            .map(|entry| entry.uri.as_str())
            .ok_or(NamespaceError::IndexOutOfRange(index))
    }

    /// Pure lookup, `None` if the URI is not registered
    pub fn get_index(&self, uri: &str) -> Option<u16> {
        self.index.get(uri).copied()
    }

    /// Highest assigned index
    pub fn last_namespace_index(&self) -> u16 {
        // entries always holds the standard namespace and never exceeds u16::MAX + 1 items
        u16::try_from(self.entries.len() - 1).unwrap_or(u16::MAX)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Always false: the standard namespace is registered on construction
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Record version and publication date of a model described by a model table entry
    ///
    /// The model URI is registered if it is not known yet. Absent metadata never
    /// overwrites values that are already known.
    pub fn update_model(&mut self, model: &ModelTableEntry) -> Result<u16, NamespaceError> {
        let index = self.get_index_or_append(&model.model_uri)?;
        let entry = &mut self.entries[usize::from(index)];
        if model.version.is_some() {
            entry.version = model.version.clone();
        }
        if model.publication_date.is_some() {
            entry.publication_date = model.publication_date;
        }
        Ok(index)
    }

    /// All registered namespaces in index order
    pub fn export_namespace_table(&self) -> impl Iterator<Item = &NamespaceEntry> {
        self.entries.iter()
    }
}
