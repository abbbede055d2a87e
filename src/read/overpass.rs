//! Reads the JSON an Overpass API query returns for country relations.
//!
//! Each element is one relation: its tags, and its members with their way
//! geometry inlined (`out geom`). Fetching the document is the caller's job.
//!
//! ```
//! use bordertopo::read::overpass;
//! use bordertopo::geom::RingRole;
//!
//! let json = r#"{
//!   "osm3s": { "timestamp_osm_base": "2024-01-01T00:00:00Z" },
//!   "elements": [ {
//!     "tags": { "name": "Squareland" },
//!     "members": [ { "type": "way", "role": "outer", "geometry": [
//!       { "lon": 0, "lat": 0 }, { "lon": 1, "lat": 0 }, { "lon": 0, "lat": 1 }, { "lon": 0, "lat": 0 }
//!     ] } ]
//!   } ]
//! }"#;
//!
//! let response = overpass::from_str(json).unwrap();
//! assert_eq!("Squareland", response.elements[0].name());
//! assert_eq!(1, response.elements[0].segments(RingRole::Outer).len());
//! ```
use std::collections::BTreeMap;
use std::io;

use serde::Deserialize;

use crate::error::ReadError;
use crate::geom::{Point, RingRole, Segment};

#[derive(Debug, Clone, Deserialize)]
pub struct OverpassResponse {
    pub osm3s: Osm3s,
    pub elements: Vec<Element>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Osm3s {
    /// When the database was last updated, e.g. "2024-01-01T00:00:00Z".
    pub timestamp_osm_base: String,
}

/// One relation.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Element {
    #[serde(default)]
    pub tags: BTreeMap<String, String>,

    #[serde(default)]
    pub members: Vec<Member>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Member {
    /// "way", "node" or "relation".
    #[serde(rename = "type")]
    pub kind: String,

    #[serde(default)]
    pub role: String,

    #[serde(default)]
    pub geometry: Vec<LonLat>,
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct LonLat {
    pub lon: f64,
    pub lat: f64,
}

impl From<LonLat> for Point {
    fn from(ll: LonLat) -> Point {
        Point(ll.lon, ll.lat)
    }
}

impl Element {
    /// The "name" tag, or "??".
    pub fn name(&self) -> &str {
        self.tags.get("name").map(String::as_str).unwrap_or("??")
    }

    /// Geometry of every way member with the given role. Members without
    /// geometry are skipped.
    pub fn segments(&self, role: RingRole) -> Vec<Segment> {
        self.members.iter()
            .filter(|m| m.kind == "way" && m.role == role.as_str() && !m.geometry.is_empty())
            .map(|m| m.geometry.iter().map(|&ll| Point::from(ll)).collect())
            .collect()
    }
}

/// Parses a response. A response with no elements is an error: a country
/// query always returns some.
pub fn from_reader<R: io::Read>(r: R) -> Result<OverpassResponse, ReadError> {
    let response: OverpassResponse = serde_json::from_reader(io::BufReader::new(r))?;
    check(response)
}

pub fn from_str(s: &str) -> Result<OverpassResponse, ReadError> {
    let response: OverpassResponse = serde_json::from_str(s)?;
    check(response)
}

fn check(response: OverpassResponse) -> Result<OverpassResponse, ReadError> {
    if response.elements.is_empty() {
        Err(ReadError::NoElements)
    } else {
        Ok(response)
    }
}
