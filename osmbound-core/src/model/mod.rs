//! Data model of an Overpass API response
//!
//! Contains the raw element graph as well as the request-side types
//! (boundary kind and bounding box) that select which elements are fetched.

pub mod boundary;
pub mod element;

pub use boundary::{BoundaryKind, BoundingBox};
pub use element::{Element, Member, MemberType, Node, OverpassResponse, Relation, Tags, Way};
