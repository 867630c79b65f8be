//! Node identity types
//!
//! `NodeId` and `QualifiedName` carry a namespace index plus a namespace-free local part.
//! Both format to and parse from the textual notation used by node set documents:
//!
//! - `i=85`, `ns=1;i=11`, `ns=2;s=Pump.Speed`, `ns=1;g=<uuid>`, `ns=1;b=<base64>`
//! - `BrowseName`, `1:EnumerationDataType`
//!
//! The namespace index is only meaningful relative to the namespace table that issued it.

use std::fmt;
use std::str::FromStr;

use base64::{Engine as _, engine::general_purpose};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;
use uuid::Uuid;

static NODE_ID_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)^(?:ns=(\d+);)?([isgb])=(.*)$").unwrap());

static QUALIFIED_NAME_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)^(\d+):(.*)$").unwrap());

/// Errors raised while parsing or remapping identifiers
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IdentifierError {
    #[error("Invalid NodeId '{0}'")]
    InvalidNodeId(String),
    #[error("Invalid numeric identifier in NodeId '{0}'")]
    InvalidNumeric(String),
    #[error("Invalid Guid identifier in NodeId '{value}': {reason}")]
    InvalidGuid { value: String, reason: String },
    #[error("Invalid opaque identifier in NodeId '{value}': {reason}")]
    InvalidOpaque { value: String, reason: String },
    #[error("Namespace index {0} is out of range")]
    NamespaceIndexOutOfRange(String),
    #[error("Namespace index {index} used by '{value}' is not declared by the model")]
    UnknownNamespaceIndex { index: u16, value: String },
    #[error("QualifiedName cannot be empty")]
    EmptyQualifiedName,
}

/// Namespace-free local part of a [`NodeId`]
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Identifier {
    Numeric(u32),
    String(String),
    Guid(Uuid),
    Opaque(Vec<u8>),
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Identifier::Numeric(value) => write!(f, "i={value}"),
            Identifier::String(value) => write!(f, "s={value}"),
            Identifier::Guid(value) => write!(f, "g={value}"),
            Identifier::Opaque(value) => write!(f, "b={}", general_purpose::STANDARD.encode(value)),
        }
    }
}

/// Identifier of a node: namespace index plus local identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId {
    namespace_index: u16,
    identifier: Identifier,
}

impl NodeId {
    pub fn new(namespace_index: u16, identifier: Identifier) -> Self {
        Self {
            namespace_index,
            identifier,
        }
    }

    /// Numeric identifier, the form used by every standard node
    pub const fn numeric(namespace_index: u16, value: u32) -> Self {
        Self {
            namespace_index,
            identifier: Identifier::Numeric(value),
        }
    }

    pub fn string(namespace_index: u16, value: impl Into<String>) -> Self {
        Self::new(namespace_index, Identifier::String(value.into()))
    }

    pub fn namespace_index(&self) -> u16 {
        self.namespace_index
    }

    pub fn identifier(&self) -> &Identifier {
        &self.identifier
    }

    pub fn set_namespace_index(&mut self, namespace_index: u16) {
        self.namespace_index = namespace_index;
    }

    /// Copy of this id moved to another namespace
    pub fn with_namespace_index(&self, namespace_index: u16) -> Self {
        Self {
            namespace_index,
            identifier: self.identifier.clone(),
        }
    }

    /// Parse the textual notation, e.g. `ns=1;i=11`
    pub fn parse(value: &str) -> Result<Self, IdentifierError> {
        let captures = NODE_ID_REGEX
            .captures(value)
            .ok_or_else(|| IdentifierError::InvalidNodeId(value.to_string()))?;

        let namespace_index = match captures.get(1) {
            Some(ns) => parse_namespace_index(ns.as_str())?,
            None => 0,
        };
        let body = &captures[3];
        let identifier = match &captures[2] {
            "i" => Identifier::Numeric(
                body.parse::<u32>()
                    .map_err(|_| IdentifierError::InvalidNumeric(value.to_string()))?,
            ),
            "s" => Identifier::String(body.to_string()),
            "g" => Identifier::Guid(Uuid::parse_str(body).map_err(|e| {
                IdentifierError::InvalidGuid {
                    value: value.to_string(),
                    reason: e.to_string(),
                }
            })?),
            "b" => Identifier::Opaque(general_purpose::STANDARD.decode(body).map_err(|e| {
                IdentifierError::InvalidOpaque {
                    value: value.to_string(),
                    reason: e.to_string(),
                }
            })?),
            _ => return Err(IdentifierError::InvalidNodeId(value.to_string())),
        };

        Ok(Self {
            namespace_index,
            identifier,
        })
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.namespace_index == 0 {
            write!(f, "{}", self.identifier)
        } else {
            write!(f, "ns={};{}", self.namespace_index, self.identifier)
        }
    }
}

impl FromStr for NodeId {
    type Err = IdentifierError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Serialize for NodeId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for NodeId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = String::deserialize(deserializer)?;
        NodeId::parse(&value).map_err(serde::de::Error::custom)
    }
}

/// Browse name of a node: namespace index plus a name
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct QualifiedName {
    pub namespace_index: u16,
    pub name: String,
}

impl QualifiedName {
    pub fn new(namespace_index: u16, name: impl Into<String>) -> Self {
        Self {
            namespace_index,
            name: name.into(),
        }
    }

    /// Parse the textual notation, e.g. `1:EnumerationDataType`
    ///
    /// A prefix that is not a plain decimal number belongs to the name itself.
    pub fn parse(value: &str) -> Result<Self, IdentifierError> {
        if value.is_empty() {
            return Err(IdentifierError::EmptyQualifiedName);
        }
        match QUALIFIED_NAME_REGEX.captures(value) {
            Some(captures) => Ok(Self {
                namespace_index: parse_namespace_index(&captures[1])?,
                name: captures[2].to_string(),
            }),
            None => Ok(Self {
                namespace_index: 0,
                name: value.to_string(),
            }),
        }
    }
}

impl fmt::Display for QualifiedName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.namespace_index == 0 {
            write!(f, "{}", self.name)
        } else {
            write!(f, "{}:{}", self.namespace_index, self.name)
        }
    }
}

impl FromStr for QualifiedName {
    type Err = IdentifierError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Serialize for QualifiedName {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for QualifiedName {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = String::deserialize(deserializer)?;
        QualifiedName::parse(&value).map_err(serde::de::Error::custom)
    }
}

fn parse_namespace_index(value: &str) -> Result<u16, IdentifierError> {
    value
        .parse::<u16>()
        .map_err(|_| IdentifierError::NamespaceIndexOutOfRange(value.to_string()))
}
