//! Parsers for input documents.
pub mod overpass;
