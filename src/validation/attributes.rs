//! Attribute inheritance
//!
//! Computes the minimal attribute delta of a derived node against its base, so that text
//! inherited unchanged from the base is not exported again.

use crate::models::{LocalizedText, UANode};

/// Drop DisplayName and Description entries of `derived` that `base` carries with the same
/// value. An attribute left without entries becomes `None`.
pub fn remove_inherited_values(derived: &mut UANode, base: &UANode) {
    remove_inherited(&mut derived.display_name, base.display_name.as_deref());
    remove_inherited(&mut derived.description, base.description.as_deref());
}

fn remove_inherited(derived: &mut Option<Vec<LocalizedText>>, base: Option<&[LocalizedText]>) {
    let Some(entries) = derived.as_mut() else {
        return;
    };
    if let Some(base) = base {
        entries.retain(|entry| !base.contains(entry));
    }
    if entries.is_empty() {
        *derived = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{NodeClassAttributes, ObjectTypeAttributes, Reference};

    fn object_type(node_id: &str, browse_name: &str) -> UANode {
        UANode::new(
            node_id,
            format!("1:{browse_name}"),
            NodeClassAttributes::ObjectType(ObjectTypeAttributes::default()),
        )
        .with_display_name(browse_name)
    }

    fn complex_object_type() -> UANode {
        object_type("ns=1;i=1", "ComplexObjectType")
    }

    fn derived_from_complex_object_type() -> UANode {
        object_type("ns=1;i=16", "DerivedFromComplexObjectType")
            .with_reference(Reference::inverse("HasSubtype", "ns=1;i=1"))
    }

    #[test]
    fn test_keeps_different_values() {
        let mut derived = derived_from_complex_object_type();
        derived.remove_inherited_values(&complex_object_type());

        let display_name = derived.display_name.unwrap();
        assert_eq!(display_name.len(), 1);
        assert_eq!(display_name[0].value, "DerivedFromComplexObjectType");
    }

    #[test]
    fn test_removes_same_values() {
        let mut derived = derived_from_complex_object_type();
        derived.remove_inherited_values(&derived_from_complex_object_type());
        assert!(derived.display_name.is_none());
    }

    #[test]
    fn test_partial_overlap_and_locale() {
        let mut derived = complex_object_type().with_description("Shared");
        derived
            .display_name
            .as_mut()
            .unwrap()
            .push(LocalizedText::with_locale("de", "KomplexerObjekttyp"));
        let base = complex_object_type().with_description("Shared");

        remove_inherited_values(&mut derived, &base);

        assert_eq!(
            derived.display_name,
            Some(vec![LocalizedText::with_locale("de", "KomplexerObjekttyp")])
        );
        assert!(derived.description.is_none());
    }

    #[test]
    fn test_empty_sequence_becomes_absent() {
        let mut derived = complex_object_type();
        derived.description = Some(Vec::new());
        remove_inherited_values(&mut derived, &object_type("ns=1;i=2", "Other"));
        assert!(derived.description.is_none());
        assert!(derived.display_name.is_some());
    }
}
