//! Turns Overpass country relations into simplified, border-consistent
//! geometry at several levels of detail.
use std::collections::BTreeMap;
use std::error::Error as StdError;

use geo::{BooleanOps, Contains, Intersects, MultiPolygon, Polygon, Validation};
use log::{debug, info, warn};
use rayon::prelude::*;

use crate::assemble::assemble_rings;
use crate::config::Config;
use crate::error::{BatchError, CountryError};
use crate::geom::{Point, RingRole};
use crate::read::overpass::Element;
use crate::reconstruct::{reconstruct_geometry, Areal};
use crate::simplify::simplify_levels;
use crate::topology::{build_topology, TopoGeometryId};

/// One country at one level of detail.
#[derive(Clone, Debug)]
pub struct CountryFeature {
    pub tags: BTreeMap<String, String>,
    pub geometry: Areal,

    /// Inside the most detailed geometry. The same at every level.
    pub representative_point: Point,
}

/// Every country, simplified at one tolerance.
#[derive(Clone, Debug)]
pub struct Level {
    pub tolerance: f64,
    pub features: Vec<CountryFeature>,
}

#[derive(Debug)]
pub struct Batch {
    /// In ascending tolerance order.
    pub levels: Vec<Level>,

    /// Countries left out, with the reason. Empty when `fail_fast` is set.
    pub skipped: Vec<(String, CountryError)>,
}

/// Builds one country's area from its relation members.
///
/// Outer and inner ways are assembled into Rings separately. Rings that
/// don't make a valid polygon are dropped. The outer polygons are unioned and
/// the inner ones subtracted.
pub fn country_geometry(element: &Element, config: &Config) -> Result<MultiPolygon<f64>, CountryError> {
    let outer = polygons(element, RingRole::Outer, config)?;
    let inner = polygons(element, RingRole::Inner, config)?;

    if outer.is_empty() {
        return Err(CountryError::NoOuterPolygon { country: element.name().to_string() });
    }

    debug!("{}: {} outer and {} inner polygons", element.name(), outer.len(), inner.len());

    Ok(subtract(union_all(outer), union_all(inner)))
}

fn polygons(element: &Element, role: RingRole, config: &Config) -> Result<Vec<Polygon<f64>>, CountryError> {
    let rings = assemble_rings(&element.segments(role), config.max_cycles)
        .map_err(|source| CountryError::Assembly {
            country: element.name().to_string(),
            role: role.as_str(),
            source,
        })?;

    Ok(rings.iter()
        .map(|ring| ring.to_polygon())
        .filter(|polygon| polygon.is_valid())
        .collect())
}

/// Unions polygons. Polygons that don't touch are kept as they are, so their
/// coordinates stay exactly as surveyed.
fn union_all(polygons: Vec<Polygon<f64>>) -> MultiPolygon<f64> {
    let disjoint = polygons.iter().enumerate()
        .all(|(i, a)| polygons[i + 1 ..].iter().all(|b| !a.intersects(b)));

    if disjoint {
        MultiPolygon::new(polygons)
    } else {
        polygons.into_iter()
            .fold(MultiPolygon::new(vec![]), |acc, p| acc.union(&MultiPolygon::new(vec![ p ])))
    }
}

/// Removes `holes` from `area`. Each hole that sits inside one polygon, clear
/// of its exterior and its other holes, becomes an interior ring as-is;
/// anything else goes through a boolean difference.
fn subtract(area: MultiPolygon<f64>, holes: MultiPolygon<f64>) -> MultiPolygon<f64> {
    if holes.0.is_empty() {
        return area;
    }

    let mut polygons = area.0.clone();

    for hole in &holes.0 {
        let target = polygons.iter_mut().find(|p| {
            p.contains(hole)
                && !p.exterior().intersects(hole)
                && !p.interiors().iter().any(|i| Polygon::new(i.clone(), vec![]).intersects(hole))
        });

        match target {
            Some(polygon) => polygon.interiors_push(hole.exterior().clone()),
            None => return area.difference(&holes),
        }
    }

    MultiPolygon::new(polygons)
}

/// Runs a whole batch: builds every country, simplifies them all together at
/// each configured tolerance and rebuilds the results.
///
/// A country that fails is logged and skipped, unless `config.fail_fast` is
/// set, in which case its error is returned. An invalid `config` fails before
/// any work is done.
pub fn process_countries(elements: &[Element], config: &Config) -> Result<Batch, BatchError> {
    config.validate()?;
    let mut skipped = vec![];

    let built: Vec<Result<MultiPolygon<f64>, CountryError>> = elements.par_iter()
        .map(|element| country_geometry(element, config))
        .collect();

    let mut countries: Vec<&Element> = vec![];
    let mut geometries: Vec<MultiPolygon<f64>> = vec![];
    for (element, result) in elements.iter().zip(built) {
        match result {
            Ok(geometry) => {
                countries.push(element);
                geometries.push(geometry);
            }
            Err(err) => skip(err, config.fail_fast, &mut skipped)?,
        }
    }
    info!("built {} countries ({} skipped)", countries.len(), skipped.len());

    let tolerances = config.sorted_tolerances();
    let best_level = tolerances.iter()
        .position(|&t| Some(t) == config.best_tolerance())
        .unwrap_or(0);
    let topology = build_topology(&geometries);
    drop(geometries);
    info!("topology: {} arcs, {} points", topology.arcs.len(), topology.point_count());

    let simplified = simplify_levels(&topology, &tolerances);
    drop(topology);

    let mut levels: Vec<Level> = tolerances.iter()
        .map(|&tolerance| Level { tolerance, features: vec![] })
        .collect();

    'countries: for (geometry_id, element) in countries.into_iter().enumerate() {
        let mut areals: Vec<Areal> = Vec::with_capacity(simplified.len());

        for topology in &simplified {
            match reconstruct_geometry(topology, geometry_id as TopoGeometryId) {
                Ok(areal) => areals.push(areal),
                Err(source) => {
                    let country = element.name().to_string();
                    skip(CountryError::Reconstruction { country, source }, config.fail_fast, &mut skipped)?;
                    continue 'countries;
                }
            }
        }

        let representative_point = match areals.get(best_level) {
            Some(best) => match best.representative_point() {
                Some(point) => point,
                None => {
                    let country = element.name().to_string();
                    skip(CountryError::NoRepresentativePoint { country }, config.fail_fast, &mut skipped)?;
                    continue 'countries;
                }
            },
            None => continue 'countries,
        };

        for (level, geometry) in levels.iter_mut().zip(areals) {
            level.features.push(CountryFeature {
                tags: element.tags.clone(),
                geometry,
                representative_point,
            });
        }
    }

    for level in &levels {
        info!("tolerance {}: {} countries", level.tolerance, level.features.len());
    }

    Ok(Batch { levels, skipped })
}

fn skip(err: CountryError, fail_fast: bool, skipped: &mut Vec<(String, CountryError)>) -> Result<(), CountryError> {
    if fail_fast {
        return Err(err);
    }

    match err.source() {
        Some(source) => warn!("skipping {}: {}: {}", err.country(), err, source),
        None => warn!("skipping {}: {}", err.country(), err),
    }
    skipped.push((err.country().to_string(), err));
    Ok(())
}
