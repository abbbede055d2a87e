use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::geom::Point;

/// Why a set of segments could not be turned into Rings.
#[derive(Error, Debug)]
pub enum AssemblyError {
    /// A segment ends at a node no other segment touches. The input ways
    /// don't close.
    #[error("segment is not closed: node {start} or node {end} is not an intersection")]
    OpenSegment { start: Point, end: Point },

    /// An elementary cycle resolved to a single chain: a one-node loop.
    #[error("single-chain cycle through {}", display_nodes(.nodes))]
    DegenerateCycle { nodes: Vec<Point> },

    #[error("more than {limit} cycles in one component of the intersection graph (component contains {node})")]
    TooManyCycles { limit: usize, node: Point },
}

fn display_nodes(nodes: &[Point]) -> String {
    nodes.iter().map(|p| p.to_string()).collect::<Vec<_>>().join(",")
}

#[derive(Error, Debug)]
pub enum ReconstructionError {
    #[error("geometry {geometry_id} is invalid and could not be repaired")]
    Unrepairable { geometry_id: u32 },
}

/// A failure scoped to one country. The batch decides whether to go on.
#[derive(Error, Debug)]
pub enum CountryError {
    #[error("error assembling {role} rings of {country}")]
    Assembly {
        country: String,
        role: &'static str,
        #[source]
        source: AssemblyError,
    },

    #[error("no outer polygons in {country}")]
    NoOuterPolygon { country: String },

    #[error("error reconstructing {country}")]
    Reconstruction {
        country: String,
        #[source]
        source: ReconstructionError,
    },

    #[error("no representative point for {country}")]
    NoRepresentativePoint { country: String },
}

impl CountryError {
    pub fn country(&self) -> &str {
        match self {
            CountryError::Assembly { country, .. }
            | CountryError::NoOuterPolygon { country }
            | CountryError::Reconstruction { country, .. }
            | CountryError::NoRepresentativePoint { country } => country,
        }
    }
}

/// Why a whole batch stopped.
#[derive(Error, Debug)]
pub enum BatchError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Country(#[from] CountryError),
}

#[derive(Error, Debug)]
pub enum ReadError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("no elements returned")]
    NoElements,
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("I/O error reading config '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("invalid config '{path}': {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("tolerance {0} must be finite and non-negative")]
    InvalidTolerance(f64),

    #[error("at least one tolerance is required")]
    NoTolerances,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn open_segment_names_nodes() {
        let err = AssemblyError::OpenSegment { start: Point(1.0, 2.0), end: Point(3.0, 4.0) };
        assert_eq!("segment is not closed: node (1,2) or node (3,4) is not an intersection", err.to_string());
    }

    #[test]
    fn degenerate_cycle_lists_nodes() {
        let err = AssemblyError::DegenerateCycle { nodes: vec![ Point(1.0, 1.0), Point(1.0, 1.0) ] };
        assert_eq!("single-chain cycle through (1,1),(1,1)", err.to_string());
    }

    #[test]
    fn country_error_keeps_name() {
        let err = CountryError::NoOuterPolygon { country: "Atlantis".to_string() };
        assert_eq!("Atlantis", err.country());
        assert_eq!("no outer polygons in Atlantis", err.to_string());
    }
}
