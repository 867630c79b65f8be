//! Import functionality
//!
//! Merges node sets into an address space:
//! - Namespace remapping of every imported identifier
//! - Per-node fault isolation (one bad node never aborts the import)
//! - Loading serialized node sets (JSON/YAML) from disk

pub mod importer;

use std::path::{Path, PathBuf};

use crate::address_space::RegistryError;
use crate::diagnostics::NodeFault;
use crate::models::{IdentifierError, NamespaceError, NodeSet};

pub use importer::ModelImporter;

/// Error during import
#[derive(Debug, thiserror::Error)]
pub enum ImportError {
    #[error("Parse error: {0}")]
    ParseError(String),
    #[error("IO error: {0}")]
    IoError(String),
    #[error("File not found: {0}")]
    FileNotFound(PathBuf),
    #[error("Unsupported node set format: {0}")]
    UnsupportedFormat(String),
    #[error("Namespace error: {0}")]
    Namespace(#[from] NamespaceError),
    #[error("Identifier error: {0}")]
    Identifier(#[from] IdentifierError),
    #[error("Registry error: {0}")]
    Registry(#[from] RegistryError),
}

/// Result of importing one node set
#[derive(Debug, Clone, Default)]
pub struct ImportSummary {
    /// URI of the imported model
    pub model_uri: String,
    /// Global index assigned to the model's primary namespace
    pub namespace_index: u16,
    /// Node records processed
    pub nodes: usize,
    /// Node records attached to the registry
    pub imported: usize,
    /// References added to the graph (duplicates excluded)
    pub references_added: usize,
    /// Nodes that failed to import
    pub faults: Vec<NodeFault>,
}

impl ImportSummary {
    pub fn is_clean(&self) -> bool {
        self.faults.is_empty()
    }
}

/// Load a serialized node set, choosing the format by file extension
///
/// `.json` is read as JSON, `.yaml`/`.yml` as YAML.
pub fn read_nodeset_file(path: &Path) -> Result<NodeSet, ImportError> {
    if !path.exists() {
        return Err(ImportError::FileNotFound(path.to_path_buf()));
    }
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();

    let content = std::fs::read_to_string(path)
        .map_err(|e| ImportError::IoError(format!("Failed to read {}: {}", path.display(), e)))?;

    match extension.as_str() {
        "json" => NodeSet::from_json(&content).map_err(|e| {
            ImportError::ParseError(format!("Failed to parse {}: {}", path.display(), e))
        }),
        "yaml" | "yml" => NodeSet::from_yaml(&content).map_err(|e| {
            ImportError::ParseError(format!("Failed to parse {}: {}", path.display(), e))
        }),
        other => Err(ImportError::UnsupportedFormat(other.to_string())),
    }
}
