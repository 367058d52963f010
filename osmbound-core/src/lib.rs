//! Assembly of OpenStreetMap boundary polygons out of raw Overpass API
//! responses.
//!
//! The crate is split into three layers:
//!
//! - [`model`] mirrors the Overpass JSON element graph (nodes, ways and
//!   relations) together with the boundary kinds and bounding boxes used to
//!   query it.
//! - [`query`] renders the Overpass QL text for a boundary kind.
//! - [`assembly`] stitches the element graph into a `GeoJSON`
//!   `FeatureCollection` of closed polygons.

pub mod assembly;
pub mod error;
pub mod model;
pub mod prelude;
pub mod query;

pub use assembly::{assemble, assemble_str, assemble_value, bulk_assemble, to_geojson_string};
pub use error::Error;
pub use model::{BoundaryKind, BoundingBox, Element, OverpassResponse};

/// Identifier of an OSM node, way or relation
pub type OsmId = i64;
