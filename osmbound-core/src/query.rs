//! Overpass QL templates for boundary lookups

use crate::model::{BoundaryKind, BoundingBox};

const HEADER: &str = "[out:json][timeout:25];";
// Bodies of the matched ways/relations, then every node and member way
// they reference as untagged skeletons.
const FOOTER: &str = "out body;\n>;\nout skel qt;";

const NEIGHBORHOOD_SELECTORS: &[&str] = &[
    r#"way["boundary"="administrative"]"#,
    r#"relation["boundary"="administrative"]"#,
    r#"way["place"~"neighbourhood|suburb|district|quarter"]"#,
    r#"relation["place"~"neighbourhood|suburb|district|quarter"]"#,
    r#"way["name"]["landuse"~"residential|commercial"]"#,
];

const ZIPCODE_SELECTORS: &[&str] = &[
    r#"way["boundary"="postal_code"]"#,
    r#"relation["boundary"="postal_code"]"#,
];

fn selectors(kind: BoundaryKind) -> &'static [&'static str] {
    match kind {
        BoundaryKind::Neighborhood => NEIGHBORHOOD_SELECTORS,
        BoundaryKind::Zipcode => ZIPCODE_SELECTORS,
    }
}

/// Renders the Overpass QL query fetching boundaries of `kind` within `bbox`
pub fn overpass_query(kind: BoundaryKind, bbox: &BoundingBox) -> String {
    let filter = bbox.overpass_filter();
    let statements = selectors(kind)
        .iter()
        .map(|selector| format!("  {selector}{filter};"))
        .collect::<Vec<_>>()
        .join("\n");

    format!("{HEADER}\n(\n{statements}\n);\n{FOOTER}\n")
}
