//! Overpass element graph: nodes, ways and relations

use std::collections::BTreeMap;

use geo::Coord;
use serde::{Deserialize, Serialize};

use crate::OsmId;

/// OSM tags of a way or relation, ordered by key
pub type Tags = BTreeMap<String, String>;

/// Top-level body of an Overpass `[out:json]` response
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct OverpassResponse {
    /// Absent when Overpass found nothing in the requested area
    #[serde(default)]
    pub elements: Vec<Element>,
}

/// Single entry of the flat `elements` array, discriminated by `type`
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Element {
    Node(Node),
    Way(Way),
    Relation(Relation),
    /// `area`, `count` and other element types that carry no geometry
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
pub struct Node {
    pub id: OsmId,
    pub lat: f64,
    pub lon: f64,
}

impl Node {
    /// Node position as a `GeoJSON` ordered `(lon, lat)` coordinate
    pub fn coord(&self) -> Coord<f64> {
        Coord {
            x: self.lon,
            y: self.lat,
        }
    }
}

/// Ordered path of node references, open or closed
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Way {
    pub id: OsmId,
    #[serde(default)]
    pub nodes: Vec<OsmId>,
    #[serde(default)]
    pub tags: Tags,
}

impl Way {
    /// A way is closed when its first and last node references match
    pub fn is_closed(&self) -> bool {
        matches!(
            (self.nodes.first(), self.nodes.last()),
            (Some(first), Some(last)) if first == last
        )
    }
}

/// Compound boundary made of member ways and nodes
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Relation {
    pub id: OsmId,
    #[serde(default)]
    pub members: Vec<Member>,
    #[serde(default)]
    pub tags: Tags,
}

impl Relation {
    /// Ids of member ways with the `outer` role, in member order
    pub fn outer_way_ids(&self) -> impl Iterator<Item = OsmId> + '_ {
        self.members
            .iter()
            .filter(|member| member.member_type == MemberType::Way && member.role == "outer")
            .map(|member| member.reference)
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Member {
    #[serde(rename = "type")]
    pub member_type: MemberType,
    #[serde(rename = "ref")]
    pub reference: OsmId,
    #[serde(default)]
    pub role: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MemberType {
    Node,
    Way,
    Relation,
    #[serde(other)]
    Other,
}
