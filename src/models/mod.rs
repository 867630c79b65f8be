//! Models module for the SDK
//!
//! Defines the information model values: identifiers, the namespace table, node records
//! and node sets as delivered by a document reader.

pub mod enums;
pub mod ids;
pub mod namespace;
pub mod node;
pub mod nodeset;
pub mod well_known;

pub use enums::{NodeClass, ReferenceKind};
pub use ids::{Identifier, IdentifierError, NodeId, QualifiedName};
pub use namespace::{NamespaceEntry, NamespaceError, NamespaceTable, STANDARD_NAMESPACE_URI};
pub use node::{
    DataTypeAttributes, DataTypeDefinition, DataTypeField, LocalizedText, MethodAttributes,
    NodeClassAttributes, NodeError, NodeIdRemap, ObjectAttributes, ObjectTypeAttributes,
    Reference, ReferenceTypeAttributes, UANode, VariableAttributes, VariableTypeAttributes,
    ViewAttributes,
};
pub use nodeset::{Alias, ModelTableEntry, NodeSet};
