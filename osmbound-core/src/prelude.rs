// Re-export key components
pub use crate::assembly::{
    MIN_RING_POSITIONS, OSM_SOURCE, UNNAMED_AREA, assemble, assemble_str, assemble_value,
    bulk_assemble, to_geojson_string,
};
pub use crate::query::overpass_query;

// Core types of the Overpass element graph
pub use crate::model::{Element, Member, MemberType, Node, OverpassResponse, Relation, Tags, Way};
pub use crate::model::{BoundaryKind, BoundingBox};

pub use crate::Error;
pub use crate::OsmId;
