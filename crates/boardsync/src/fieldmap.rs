//! Field-name translation between the Callboard and Slate vocabularies.
//!
//! The table is small and static: only fields whose names differ between
//! the two systems appear here, per entity type. Everything else passes
//! through unchanged.

/// `(callboard_field, slate_field)` pairs per Callboard entity type.
const FIELD_PAIRS: &[(&str, &[(&str, &str)])] = &[
    (
        "Asset",
        &[("sg_asset_type", "category"), ("sg_status_list", "status")],
    ),
    ("Task", &[("sg_status_list", "status")]),
];

fn pairs_for(entity_type: &str) -> &'static [(&'static str, &'static str)] {
    FIELD_PAIRS
        .iter()
        .find(|(entity, _)| *entity == entity_type)
        .map(|(_, pairs)| *pairs)
        .unwrap_or(&[])
}

/// Translate a Callboard field name into its Slate counterpart.
pub fn to_slate_field(entity_type: &str, callboard_field: &str) -> String {
    pairs_for(entity_type)
        .iter()
        .find(|(from, _)| *from == callboard_field)
        .map(|(_, to)| to.to_string())
        .unwrap_or_else(|| callboard_field.to_string())
}

/// Translate a Slate field name back into its Callboard counterpart.
pub fn to_callboard_field(entity_type: &str, slate_field: &str) -> String {
    pairs_for(entity_type)
        .iter()
        .find(|(_, to)| *to == slate_field)
        .map(|(from, _)| from.to_string())
        .unwrap_or_else(|| slate_field.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn mapped_fields_translate_both_ways() {
        assert_eq!(to_slate_field("Asset", "sg_asset_type"), "category");
        assert_eq!(to_callboard_field("Asset", "category"), "sg_asset_type");
        assert_eq!(to_slate_field("Task", "sg_status_list"), "status");
    }

    #[test]
    fn unmapped_fields_pass_through() {
        assert_eq!(to_slate_field("Task", "content"), "content");
        assert_eq!(to_slate_field("Shot", "sg_status_list"), "sg_status_list");
    }

    #[test]
    fn mapping_is_scoped_per_entity_type() {
        // Task has no sg_asset_type mapping even though Asset does.
        assert_eq!(to_slate_field("Task", "sg_asset_type"), "sg_asset_type");
    }

    #[test]
    fn round_trip_is_identity_for_mapped_fields() {
        for (entity, pairs) in [("Asset", pairs_for("Asset")), ("Task", pairs_for("Task"))] {
            for (from, _) in pairs {
                let there = to_slate_field(entity, from);
                assert_eq!(to_callboard_field(entity, &there), *from);
            }
        }
    }
}
