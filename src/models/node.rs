//! Node record model
//!
//! `UANode` is the payload attached to a node context: the attributes common to every node
//! class plus a closed set of per-class attributes. Identifier-valued attributes are kept
//! in their textual form, exactly as the document reader produced them, so that a model
//! can be re-targeted to another namespace with [`UANode::recalculate_node_ids`].

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::enums::NodeClass;
use super::ids::IdentifierError;
use crate::validation::attributes;

/// Errors raised by node-level operations
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NodeError {
    /// Type identity is structural; value equality of type-class nodes is not defined
    #[error("Equality is not implemented for {node_class} node {node_id}")]
    EqualityNotImplemented {
        node_id: String,
        node_class: NodeClass,
    },
}

/// Localized text entry of DisplayName, Description and similar attributes
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocalizedText {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub locale: Option<String>,
    pub value: String,
}

impl LocalizedText {
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            locale: None,
            value: value.into(),
        }
    }

    pub fn with_locale(locale: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            locale: Some(locale.into()),
            value: value.into(),
        }
    }
}

fn default_true() -> bool {
    true
}

/// Reference declared by a node
///
/// `reference_type` may be a NodeId or an alias; `value` is the NodeId of the other end.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Reference {
    pub reference_type: String,
    pub value: String,
    #[serde(default = "default_true")]
    pub is_forward: bool,
}

impl Reference {
    pub fn forward(reference_type: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            reference_type: reference_type.into(),
            value: value.into(),
            is_forward: true,
        }
    }

    pub fn inverse(reference_type: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            reference_type: reference_type.into(),
            value: value.into(),
            is_forward: false,
        }
    }
}

fn default_field_data_type() -> String {
    "i=24".to_string()
}

fn default_value_rank() -> i32 {
    -1
}

/// Field of a structure or enumeration definition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataTypeField {
    pub name: String,
    /// Field data type, `BaseDataType` unless stated otherwise
    #[serde(default = "default_field_data_type")]
    pub data_type: String,
    /// Enumeration value
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<i64>,
    #[serde(default = "default_value_rank")]
    pub value_rank: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<Vec<LocalizedText>>,
}

impl DataTypeField {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            data_type: default_field_data_type(),
            value: None,
            value_rank: default_value_rank(),
            description: None,
        }
    }
}

/// Definition of a structured or enumerated data type
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataTypeDefinition {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_type: Option<String>,
    #[serde(default)]
    pub is_union: bool,
    #[serde(default)]
    pub fields: Vec<DataTypeField>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataTypeAttributes {
    #[serde(default)]
    pub is_abstract: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub definition: Option<DataTypeDefinition>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectAttributes {
    #[serde(default)]
    pub event_notifier: u8,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectTypeAttributes {
    #[serde(default)]
    pub is_abstract: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReferenceTypeAttributes {
    #[serde(default)]
    pub is_abstract: bool,
    #[serde(default)]
    pub symmetric: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inverse_name: Option<Vec<LocalizedText>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VariableAttributes {
    #[serde(default = "default_field_data_type")]
    pub data_type: String,
    #[serde(default = "default_value_rank")]
    pub value_rank: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub array_dimensions: Option<String>,
    #[serde(default = "default_access_level")]
    pub access_level: u8,
    #[serde(default)]
    pub historizing: bool,
}

fn default_access_level() -> u8 {
    1
}

impl Default for VariableAttributes {
    fn default() -> Self {
        Self {
            data_type: default_field_data_type(),
            value_rank: default_value_rank(),
            array_dimensions: None,
            access_level: default_access_level(),
            historizing: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VariableTypeAttributes {
    #[serde(default = "default_field_data_type")]
    pub data_type: String,
    #[serde(default = "default_value_rank")]
    pub value_rank: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub array_dimensions: Option<String>,
    #[serde(default)]
    pub is_abstract: bool,
}

impl Default for VariableTypeAttributes {
    fn default() -> Self {
        Self {
            data_type: default_field_data_type(),
            value_rank: default_value_rank(),
            array_dimensions: None,
            is_abstract: false,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewAttributes {
    #[serde(default)]
    pub contains_no_loops: bool,
    #[serde(default)]
    pub event_notifier: u8,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MethodAttributes {
    #[serde(default = "default_true")]
    pub executable: bool,
    #[serde(default = "default_true")]
    pub user_executable: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub method_declaration_id: Option<String>,
}

impl Default for MethodAttributes {
    fn default() -> Self {
        Self {
            executable: true,
            user_executable: true,
            method_declaration_id: None,
        }
    }
}

/// Per-class attributes, tagged by node class in serialized form
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "nodeClass")]
pub enum NodeClassAttributes {
    #[serde(rename = "UADataType")]
    DataType(DataTypeAttributes),
    #[serde(rename = "UAObject")]
    Object(ObjectAttributes),
    #[serde(rename = "UAObjectType")]
    ObjectType(ObjectTypeAttributes),
    #[serde(rename = "UAReferenceType")]
    ReferenceType(ReferenceTypeAttributes),
    #[serde(rename = "UAVariable")]
    Variable(VariableAttributes),
    #[serde(rename = "UAVariableType")]
    VariableType(VariableTypeAttributes),
    #[serde(rename = "UAView")]
    View(ViewAttributes),
    #[serde(rename = "UAMethod")]
    Method(MethodAttributes),
}

impl NodeClassAttributes {
    pub fn node_class(&self) -> NodeClass {
        match self {
            NodeClassAttributes::DataType(_) => NodeClass::DataType,
            NodeClassAttributes::Object(_) => NodeClass::Object,
            NodeClassAttributes::ObjectType(_) => NodeClass::ObjectType,
            NodeClassAttributes::ReferenceType(_) => NodeClass::ReferenceType,
            NodeClassAttributes::Variable(_) => NodeClass::Variable,
            NodeClassAttributes::VariableType(_) => NodeClass::VariableType,
            NodeClassAttributes::View(_) => NodeClass::View,
            NodeClassAttributes::Method(_) => NodeClass::Method,
        }
    }

    /// Instance attributes that do not name the instance itself
    fn instance_content_eq(&self, other: &Self) -> bool {
        match (self, other) {
            (NodeClassAttributes::Object(a), NodeClassAttributes::Object(b)) => a == b,
            (NodeClassAttributes::Variable(a), NodeClassAttributes::Variable(b)) => a == b,
            (NodeClassAttributes::View(a), NodeClassAttributes::View(b)) => a == b,
            (NodeClassAttributes::Method(a), NodeClassAttributes::Method(b)) => {
                a.executable == b.executable && a.user_executable == b.user_executable
            }
            _ => false,
        }
    }
}

/// Capability rewriting identifiers from one namespace layout into another
pub trait NodeIdRemap {
    /// Rewrite a NodeId string (or alias) into its remapped NodeId string
    fn import_node_id(&self, node_id: &str) -> Result<String, IdentifierError>;

    /// Rewrite a QualifiedName string into its remapped QualifiedName string
    fn import_qualified_name(&self, name: &str) -> Result<String, IdentifierError>;
}

/// Node record as produced by the document reader
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UANode {
    pub node_id: String,
    pub browse_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub symbolic_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<Vec<LocalizedText>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<Vec<LocalizedText>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_node_id: Option<String>,
    #[serde(default)]
    pub references: Vec<Reference>,
    #[serde(flatten)]
    pub attributes: NodeClassAttributes,
}

impl UANode {
    pub fn new(
        node_id: impl Into<String>,
        browse_name: impl Into<String>,
        attributes: NodeClassAttributes,
    ) -> Self {
        Self {
            node_id: node_id.into(),
            browse_name: browse_name.into(),
            symbolic_name: None,
            display_name: None,
            description: None,
            parent_node_id: None,
            references: Vec::new(),
            attributes,
        }
    }

    pub fn with_display_name(mut self, value: impl Into<String>) -> Self {
        self.display_name
            .get_or_insert_with(Vec::new)
            .push(LocalizedText::new(value));
        self
    }

    pub fn with_description(mut self, value: impl Into<String>) -> Self {
        self.description
            .get_or_insert_with(Vec::new)
            .push(LocalizedText::new(value));
        self
    }

    pub fn with_parent(mut self, parent_node_id: impl Into<String>) -> Self {
        self.parent_node_id = Some(parent_node_id.into());
        self
    }

    pub fn with_reference(mut self, reference: Reference) -> Self {
        self.references.push(reference);
        self
    }

    pub fn node_class(&self) -> NodeClass {
        self.attributes.node_class()
    }

    /// Semantic equality
    ///
    /// Comparing type-class nodes is not supported and fails. Instance nodes compare by
    /// BrowseName, DisplayName entries, the set of references and their class attributes;
    /// NodeId and ParentNodeId are ignored.
    pub fn semantic_eq(&self, other: &UANode) -> Result<bool, NodeError> {
        for node in [self, other] {
            let node_class = node.node_class();
            if node_class.is_type() {
                return Err(NodeError::EqualityNotImplemented {
                    node_id: node.node_id.clone(),
                    node_class,
                });
            }
        }
        if self.node_class() != other.node_class() {
            return Ok(false);
        }

        let mut mine = self.references.clone();
        let mut theirs = other.references.clone();
        mine.sort();
        theirs.sort();

        Ok(self.browse_name == other.browse_name
            && self.display_name == other.display_name
            && mine == theirs
            && self.attributes.instance_content_eq(&other.attributes))
    }

    /// Drop DisplayName/Description entries identical to those of `base`
    pub fn remove_inherited_values(&mut self, base: &UANode) {
        attributes::remove_inherited_values(self, base);
    }

    /// Rewrite every namespace-bearing identifier of this node through `remap`
    ///
    /// Covers the NodeId, BrowseName, ParentNodeId, every reference target, data type
    /// references of variables and definition fields, and the method declaration id.
    /// Reference types are left untouched. On error the node is unchanged.
    pub fn recalculate_node_ids<R>(&mut self, remap: &R) -> Result<(), IdentifierError>
    where
        R: NodeIdRemap + ?Sized,
    {
        let mut updated = self.clone();
        updated.node_id = remap.import_node_id(&self.node_id)?;
        updated.browse_name = remap.import_qualified_name(&self.browse_name)?;
        if let Some(parent) = &self.parent_node_id {
            updated.parent_node_id = Some(remap.import_node_id(parent)?);
        }
        for reference in &mut updated.references {
            reference.value = remap.import_node_id(&reference.value)?;
        }
        match &mut updated.attributes {
            NodeClassAttributes::DataType(data_type) => {
                if let Some(definition) = &mut data_type.definition {
                    if let Some(base_type) = &definition.base_type {
                        definition.base_type = Some(remap.import_node_id(base_type)?);
                    }
                    for field in &mut definition.fields {
                        field.data_type = remap.import_node_id(&field.data_type)?;
                    }
                }
            }
            NodeClassAttributes::Variable(variable) => {
                variable.data_type = remap.import_node_id(&variable.data_type)?;
            }
            NodeClassAttributes::VariableType(variable_type) => {
                variable_type.data_type = remap.import_node_id(&variable_type.data_type)?;
            }
            NodeClassAttributes::Method(method) => {
                if let Some(declaration) = &method.method_declaration_id {
                    method.method_declaration_id = Some(remap.import_node_id(declaration)?);
                }
            }
            NodeClassAttributes::Object(_)
            | NodeClassAttributes::ObjectType(_)
            | NodeClassAttributes::ReferenceType(_)
            | NodeClassAttributes::View(_) => {}
        }
        *self = updated;
        Ok(())
    }
}
