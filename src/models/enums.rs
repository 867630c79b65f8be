//! Enums for the address space model

use serde::{Deserialize, Serialize};

use super::ids::NodeId;
use super::well_known::reference_type_ids;

/// Node class of a node record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NodeClass {
    DataType,
    Object,
    ObjectType,
    ReferenceType,
    Variable,
    VariableType,
    View,
    Method,
}

impl NodeClass {
    /// Type-class nodes define types rather than instances
    pub fn is_type(&self) -> bool {
        matches!(
            self,
            NodeClass::DataType
                | NodeClass::ObjectType
                | NodeClass::ReferenceType
                | NodeClass::VariableType
        )
    }

    pub fn is_instance(&self) -> bool {
        !self.is_type()
    }
}

impl std::fmt::Display for NodeClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            NodeClass::DataType => "UADataType",
            NodeClass::Object => "UAObject",
            NodeClass::ObjectType => "UAObjectType",
            NodeClass::ReferenceType => "UAReferenceType",
            NodeClass::Variable => "UAVariable",
            NodeClass::VariableType => "UAVariableType",
            NodeClass::View => "UAView",
            NodeClass::Method => "UAMethod",
        };
        write!(f, "{name}")
    }
}

/// Semantic category of a reference, derived from its reference type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ReferenceKind {
    HasSubtype,
    HasComponent,
    HasProperty,
    Organizes,
    HasTypeDefinition,
    HasModellingRule,
    HasEncoding,
    /// Any other reference type, including vendor-defined ones
    Custom,
}

impl ReferenceKind {
    /// Classify a reference by its (already remapped) reference type id
    pub fn from_type_id(type_id: &NodeId) -> Self {
        let known = [
            (reference_type_ids::HAS_SUBTYPE, ReferenceKind::HasSubtype),
            (reference_type_ids::HAS_COMPONENT, ReferenceKind::HasComponent),
            (reference_type_ids::HAS_PROPERTY, ReferenceKind::HasProperty),
            (reference_type_ids::ORGANIZES, ReferenceKind::Organizes),
            (
                reference_type_ids::HAS_TYPE_DEFINITION,
                ReferenceKind::HasTypeDefinition,
            ),
            (
                reference_type_ids::HAS_MODELLING_RULE,
                ReferenceKind::HasModellingRule,
            ),
            (reference_type_ids::HAS_ENCODING, ReferenceKind::HasEncoding),
        ];
        known
            .into_iter()
            .find(|(id, _)| id == type_id)
            .map(|(_, kind)| kind)
            .unwrap_or(ReferenceKind::Custom)
    }

    /// Structural child links: instance declarations of a type or object
    pub fn is_child(&self) -> bool {
        matches!(self, ReferenceKind::HasComponent | ReferenceKind::HasProperty)
    }
}
