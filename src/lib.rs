//! Builds simplified country borders from OpenStreetMap boundary ways, such
//! that neighbouring countries keep sharing exactly the same border at every
//! level of detail.
//!
//! The pipeline:
//!
//! 1. `assemble`: join unordered ways into closed Rings.
//! 2. `country`: turn each country's Rings into one area.
//! 3. `topology`: split every area's rings into arcs, storing shared borders
//!    once.
//! 4. `simplify`: simplify each arc once per tolerance.
//! 5. `reconstruct`: rebuild valid, oriented polygons from the arcs.
pub mod assemble;
pub mod config;
pub mod country;
pub mod error;
pub mod geom;
pub mod read;
pub mod reconstruct;
pub mod simplify;
pub mod topology;

pub use assemble::assemble_rings;
pub use config::Config;
pub use country::{country_geometry, process_countries, Batch, CountryFeature, Level};
pub use error::BatchError;
pub use geom::{Point, Ring, RingRole, Segment};
pub use reconstruct::{reconstruct, reconstruct_geometry, Areal};
pub use simplify::{simplify, simplify_levels};
pub use topology::{build_topology, Topology};
