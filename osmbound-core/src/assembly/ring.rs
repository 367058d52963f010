//! Node index and ring construction

use geo::{Coord, LineString};
use hashbrown::HashMap;

use crate::OsmId;
use crate::model::{Element, Way};

/// A linear ring needs at least four positions, the last repeating the first
pub const MIN_RING_POSITIONS: usize = 4;

/// Lookup of node positions by OSM id, built once per response
#[derive(Debug, Default)]
pub(crate) struct NodeIndex {
    coords: HashMap<OsmId, Coord<f64>>,
}

impl NodeIndex {
    /// Indexes every node in `elements`, regardless of where it appears
    /// relative to the ways that reference it
    pub(crate) fn from_elements(elements: &[Element]) -> Self {
        let coords = elements
            .iter()
            .filter_map(|element| match element {
                Element::Node(node) => Some((node.id, node.coord())),
                _ => None,
            })
            .collect();

        Self { coords }
    }

    pub(crate) fn get(&self, id: OsmId) -> Option<Coord<f64>> {
        self.coords.get(&id).copied()
    }

    pub(crate) fn len(&self) -> usize {
        self.coords.len()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum RingError {
    /// The way references a node absent from the response
    MissingNode(OsmId),
    /// Fewer than [`MIN_RING_POSITIONS`] positions after closing
    Degenerate(usize),
}

/// Resolves the node references of `way` into a closed ring.
///
/// Point order follows the way's node list. The first position is appended
/// only when the resolved ring is not already closed.
pub(crate) fn resolve_ring(way: &Way, index: &NodeIndex) -> Result<LineString<f64>, RingError> {
    let coords = way
        .nodes
        .iter()
        .map(|&id| index.get(id).ok_or(RingError::MissingNode(id)))
        .collect::<Result<Vec<_>, _>>()?;

    let mut ring = LineString::new(coords);
    ring.close();

    if ring.0.len() < MIN_RING_POSITIONS {
        return Err(RingError::Degenerate(ring.0.len()));
    }
    Ok(ring)
}
