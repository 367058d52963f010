use geojson::JsonObject;
use serde_json::json;

use crate::model::{BoundaryKind, Tags};

pub const OSM_SOURCE: &str = "OpenStreetMap";
pub const UNNAMED_AREA: &str = "Unnamed Area";
const UNKNOWN_ZIPCODE: &str = "Unknown";

/// Whether an element carries tags that make it a boundary of its own.
///
/// Skeleton ways pulled in by a recurse-down (`>`) statement are untagged
/// and only matter as relation members.
pub(crate) fn is_boundary(tags: &Tags) -> bool {
    tags.contains_key("boundary")
        || tags.contains_key("place")
        || (tags.contains_key("name") && tags.contains_key("landuse"))
}

fn display_name(tags: &Tags) -> &str {
    tags.get("name")
        .or_else(|| tags.get("place"))
        .map_or(UNNAMED_AREA, String::as_str)
}

fn postal_code(tags: &Tags) -> &str {
    tags.get("postal_code")
        .or_else(|| tags.get("addr:postcode"))
        .map_or(UNKNOWN_ZIPCODE, String::as_str)
}

/// Feature properties for a boundary described by `tags`.
///
/// `population` and `median_income` are placeholders filled by a later
/// demographic join.
pub(crate) fn boundary_properties(tags: &Tags, kind: BoundaryKind) -> JsonObject {
    let mut properties = JsonObject::new();
    properties.insert("name".to_string(), display_name(tags).into());
    properties.insert("type".to_string(), kind.as_str().into());
    properties.insert("source".to_string(), OSM_SOURCE.into());
    properties.insert("population".to_string(), 0.into());
    properties.insert("median_income".to_string(), 0.into());
    properties.insert("tags".to_string(), json!(tags));

    if kind == BoundaryKind::Zipcode {
        properties.insert("zipcode".to_string(), postal_code(tags).into());
    }

    properties
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;

    fn tags(pairs: &[(&str, &str)]) -> Tags {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect()
    }

    #[test]
    fn boundary_tags_qualify() {
        assert!(is_boundary(&tags(&[("boundary", "administrative")])));
        assert!(is_boundary(&tags(&[("place", "suburb")])));
        assert!(is_boundary(&tags(&[("name", "Forest Park"), ("landuse", "residential")])));

        assert!(!is_boundary(&tags(&[])));
        assert!(!is_boundary(&tags(&[("name", "Main Street")])));
        assert!(!is_boundary(&tags(&[("landuse", "commercial")])));
    }

    #[test]
    fn name_falls_back_to_place_then_placeholder() {
        assert_eq!(display_name(&tags(&[("name", "Holyoke"), ("place", "city")])), "Holyoke");
        assert_eq!(display_name(&tags(&[("place", "suburb")])), "suburb");
        assert_eq!(display_name(&tags(&[("boundary", "administrative")])), UNNAMED_AREA);
    }

    #[test]
    fn neighborhood_properties_have_fixed_schema() {
        let properties = boundary_properties(
            &tags(&[("boundary", "administrative"), ("name", "Test Town")]),
            BoundaryKind::Neighborhood,
        );

        assert_eq!(
            Value::Object(properties),
            json!({
                "name": "Test Town",
                "type": "neighborhood",
                "source": "OpenStreetMap",
                "population": 0,
                "median_income": 0,
                "tags": {"boundary": "administrative", "name": "Test Town"},
            })
        );
    }

    #[test]
    fn zipcode_properties_carry_postal_code() {
        let with_code = boundary_properties(
            &tags(&[("boundary", "postal_code"), ("postal_code", "01103")]),
            BoundaryKind::Zipcode,
        );
        assert_eq!(with_code["zipcode"], "01103");
        assert_eq!(with_code["type"], "zipcode");

        let addr_only = boundary_properties(
            &tags(&[("boundary", "postal_code"), ("addr:postcode", "01040")]),
            BoundaryKind::Zipcode,
        );
        assert_eq!(addr_only["zipcode"], "01040");

        let missing =
            boundary_properties(&tags(&[("boundary", "postal_code")]), BoundaryKind::Zipcode);
        assert_eq!(missing["zipcode"], "Unknown");
    }
}
