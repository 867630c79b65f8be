//! Identifiers of standard model nodes the engine relies on

use super::ids::NodeId;

pub mod reference_type_ids {
    use super::NodeId;

    pub const REFERENCES: NodeId = NodeId::numeric(0, 31);
    pub const NON_HIERARCHICAL_REFERENCES: NodeId = NodeId::numeric(0, 32);
    pub const HIERARCHICAL_REFERENCES: NodeId = NodeId::numeric(0, 33);
    pub const HAS_CHILD: NodeId = NodeId::numeric(0, 34);
    pub const ORGANIZES: NodeId = NodeId::numeric(0, 35);
    pub const HAS_MODELLING_RULE: NodeId = NodeId::numeric(0, 37);
    pub const HAS_ENCODING: NodeId = NodeId::numeric(0, 38);
    pub const HAS_DESCRIPTION: NodeId = NodeId::numeric(0, 39);
    pub const HAS_TYPE_DEFINITION: NodeId = NodeId::numeric(0, 40);
    pub const GENERATES_EVENT: NodeId = NodeId::numeric(0, 41);
    pub const AGGREGATES: NodeId = NodeId::numeric(0, 44);
    pub const HAS_SUBTYPE: NodeId = NodeId::numeric(0, 45);
    pub const HAS_PROPERTY: NodeId = NodeId::numeric(0, 46);
    pub const HAS_COMPONENT: NodeId = NodeId::numeric(0, 47);
}

pub mod object_ids {
    use super::NodeId;

    pub const OBJECTS_FOLDER: NodeId = NodeId::numeric(0, 85);
}

pub mod object_type_ids {
    use super::NodeId;

    pub const BASE_OBJECT_TYPE: NodeId = NodeId::numeric(0, 58);
}

/// Standard reference type browse names usable in place of their NodeId
const REFERENCE_TYPE_NAMES: &[(&str, u32)] = &[
    ("References", 31),
    ("NonHierarchicalReferences", 32),
    ("HierarchicalReferences", 33),
    ("HasChild", 34),
    ("Organizes", 35),
    ("HasEventSource", 36),
    ("HasModellingRule", 37),
    ("HasEncoding", 38),
    ("HasDescription", 39),
    ("HasTypeDefinition", 40),
    ("GeneratesEvent", 41),
    ("Aggregates", 44),
    ("HasSubtype", 45),
    ("HasProperty", 46),
    ("HasComponent", 47),
    ("HasNotifier", 48),
    ("HasOrderedComponent", 49),
];

/// Resolve a standard reference type browse name, e.g. `HasSubtype` -> `i=45`
pub fn standard_reference_type(name: &str) -> Option<NodeId> {
    REFERENCE_TYPE_NAMES
        .iter()
        .find(|(known, _)| *known == name)
        .map(|(_, id)| NodeId::numeric(0, *id))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_reference_type_names() {
        assert_eq!(
            standard_reference_type("HasSubtype"),
            Some(reference_type_ids::HAS_SUBTYPE)
        );
        assert_eq!(
            standard_reference_type("Organizes"),
            Some(reference_type_ids::ORGANIZES)
        );
        assert_eq!(standard_reference_type("HasPump"), None);
    }

    #[test]
    fn test_standard_model_defines_every_named_reference_type() {
        let standard = crate::models::NodeSet::standard().unwrap();
        for (name, value) in REFERENCE_TYPE_NAMES {
            let node_id = NodeId::numeric(0, *value).to_string();
            let node = standard
                .items
                .iter()
                .find(|node| node.node_id == node_id)
                .unwrap_or_else(|| panic!("{name} ({node_id}) missing from the standard model"));
            assert_eq!(node.browse_name, *name);
            assert_eq!(node.node_class(), crate::models::NodeClass::ReferenceType);
        }
    }
}
