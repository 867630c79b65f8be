//! UA Modelling SDK - address space engine for OPC UA information models
//!
//! Provides unified interfaces for:
//! - Namespace index management and node identifiers
//! - Node and reference registries with forward-reference tolerance
//! - Import of node sets with namespace remapping and per-node fault isolation
//! - Inheritance resolution and attribute-inheritance diffing
//! - Validation and export of one namespace through a model factory

pub mod address_space;
pub mod config;
pub mod diagnostics;
pub mod export;
pub mod import;
pub mod models;
pub mod validation;

// Re-export commonly used types
pub use address_space::{
    AddressSpaceContext, NodeContext, NodeRegistry, ReferenceContext, ReferenceGraph,
    RegistryError, UAModelContext,
};
pub use config::AddressSpaceConfig;
pub use diagnostics::{BuildError, NodeFault, Severity, TraceMessage, TraceSink, tracing_sink};
pub use export::{
    ExportError, ExportReport, ExportResult, ExportedNode, InMemoryModelFactory, ModelFactory,
    NoopModelFactory, ValidateExportPipeline,
};
pub use import::{ImportError, ImportSummary, ModelImporter};
pub use validation::{
    ConsistencyReport, DefaultValidator, InheritanceError, InheritanceResolver, ValidationContext,
    Validator,
};

// Re-export models
pub use models::enums::*;
pub use models::{
    Identifier, IdentifierError, LocalizedText, NamespaceEntry, NamespaceError, NamespaceTable,
    NodeError, NodeId, NodeSet, QualifiedName, Reference, UANode,
};
