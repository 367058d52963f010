//! Boundary assembly: turns the flat Overpass element graph into a
//! `GeoJSON` `FeatureCollection` of closed polygons.
//!
//! Every tagged way becomes one polygon. A tagged relation contributes one
//! polygon per `outer` member way, each carrying the relation's properties,
//! so a relation with several outer ways yields several features rather than
//! a single `MultiPolygon`. Inner rings are not assembled.

mod properties;
mod ring;

use geo::{LineString, Polygon};
use geojson::{Feature, FeatureCollection, Geometry, GeometryValue};
use hashbrown::HashSet;
use log::debug;
use rayon::prelude::*;
use serde::Deserialize;
use serde_json::Value;

use crate::model::{BoundaryKind, Element, OverpassResponse, Relation, Tags, Way};
use crate::{Error, OsmId};

pub use properties::{OSM_SOURCE, UNNAMED_AREA};
pub use ring::MIN_RING_POSITIONS;

use properties::{boundary_properties, is_boundary};
use ring::{NodeIndex, RingError, resolve_ring};

#[derive(Debug, Default)]
struct AssemblyStats {
    missing_nodes: usize,
    degenerate: usize,
}

impl AssemblyStats {
    fn record(&mut self, element: &str, id: OsmId, err: RingError) {
        match err {
            RingError::MissingNode(node) => {
                self.missing_nodes += 1;
                debug!("Skipping {element} {id}: node {node} is missing from the response");
            }
            RingError::Degenerate(len) => {
                self.degenerate += 1;
                debug!("Skipping {element} {id}: ring has only {len} positions");
            }
        }
    }
}

/// Assembles boundary polygons out of an Overpass element list.
///
/// Ways referencing nodes absent from `elements` are skipped, so a
/// truncated response yields fewer features instead of an error. An empty
/// input yields an empty collection.
pub fn assemble(elements: &[Element], kind: BoundaryKind) -> FeatureCollection {
    let index = NodeIndex::from_elements(elements);
    let ways = distinct_ways(elements);

    let mut stats = AssemblyStats::default();
    let mut features = Vec::new();

    for element in elements {
        match element {
            Element::Way(way) if is_boundary(&way.tags) => {
                match resolve_ring(way, &index) {
                    Ok(ring) => features.push(boundary_feature(ring, &way.tags, kind)),
                    Err(err) => stats.record("way", way.id, err),
                }
            }
            Element::Relation(relation) if is_boundary(&relation.tags) => {
                for way in outer_ways(relation, &ways) {
                    match resolve_ring(way, &index) {
                        Ok(ring) => features.push(boundary_feature(ring, &relation.tags, kind)),
                        Err(err) => stats.record("outer way", way.id, err),
                    }
                }
            }
            _ => {}
        }
    }

    debug!(
        "Assembled {} {kind} features from {} elements ({} nodes indexed, \
        {} ways with missing nodes, {} degenerate rings)",
        features.len(),
        elements.len(),
        index.len(),
        stats.missing_nodes,
        stats.degenerate
    );

    FeatureCollection {
        features,
        bbox: None,
        foreign_members: None,
    }
}

/// Distinct ways in element order.
///
/// Overpass prints a way once per statement that selects it, so a tagged way
/// reached again through `>` shows up a second time as an untagged skeleton.
/// Only the first copy of each id is kept.
fn distinct_ways(elements: &[Element]) -> Vec<&Way> {
    let mut seen = HashSet::new();
    elements
        .iter()
        .filter_map(|element| match element {
            Element::Way(way) if seen.insert(way.id) => Some(way),
            _ => None,
        })
        .collect()
}

/// Member ways of `relation` with the `outer` role, in element order
fn outer_ways<'a>(relation: &Relation, ways: &[&'a Way]) -> Vec<&'a Way> {
    let outer: HashSet<OsmId> = relation.outer_way_ids().collect();
    if outer.is_empty() {
        return Vec::new();
    }

    ways.iter()
        .copied()
        .filter(|way| outer.contains(&way.id))
        .collect()
}

fn boundary_feature(ring: LineString<f64>, tags: &Tags, kind: BoundaryKind) -> Feature {
    let polygon = Polygon::new(ring, Vec::new());

    Feature {
        bbox: None,
        geometry: Some(Geometry::new(GeometryValue::from(&polygon))),
        id: None,
        properties: Some(boundary_properties(tags, kind)),
        foreign_members: None,
    }
}

/// Assembles an Overpass response given as parsed JSON.
///
/// # Errors
///
/// Returns [`Error::InvalidInput`] if the response is not a JSON object, if
/// `elements` is present but not an array, or if an element is malformed.
/// A response without `elements` is treated as empty.
pub fn assemble_value(response: &Value, kind: BoundaryKind) -> Result<FeatureCollection, Error> {
    let Some(object) = response.as_object() else {
        return Err(Error::InvalidInput(
            "Overpass response is not a JSON object".to_string(),
        ));
    };

    let response = match object.get("elements") {
        None => OverpassResponse::default(),
        Some(Value::Array(_)) => OverpassResponse::deserialize(response)
            .map_err(|e| Error::InvalidInput(format!("Malformed Overpass element: {e}")))?,
        Some(other) => {
            return Err(Error::InvalidInput(format!(
                "Overpass `elements` must be an array, got {other}"
            )));
        }
    };

    Ok(assemble(&response.elements, kind))
}

/// Assembles an Overpass response given as raw JSON text
///
/// # Errors
///
/// Returns [`Error::InvalidInput`] if the text is not valid JSON or does not
/// have the shape accepted by [`assemble_value`].
pub fn assemble_str(response: &str, kind: BoundaryKind) -> Result<FeatureCollection, Error> {
    let value: Value = serde_json::from_str(response)
        .map_err(|e| Error::InvalidInput(format!("Overpass response is not valid JSON: {e}")))?;
    assemble_value(&value, kind)
}

/// Assembles independent responses in parallel
pub fn bulk_assemble(responses: &[OverpassResponse], kind: BoundaryKind) -> Vec<FeatureCollection> {
    responses
        .par_iter()
        .map(|response| assemble(&response.elements, kind))
        .collect()
}

/// Serializes a collection to `GeoJSON` text
///
/// # Errors
///
/// Returns [`Error::GeoJsonError`] if serialization fails.
pub fn to_geojson_string(collection: &FeatureCollection) -> Result<String, Error> {
    serde_json::to_string(collection).map_err(|e| Error::GeoJsonError(e.to_string()))
}
