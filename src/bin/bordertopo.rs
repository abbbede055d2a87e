use std::fs::File;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use log::info;

use bordertopo::read::overpass;
use bordertopo::{process_countries, Config};

/// Simplifies country borders from an Overpass JSON document.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Overpass API response (`out geom`) with one relation per country
    input: PathBuf,

    /// JSON config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Simplification tolerance, in degrees; repeat for several levels.
    /// Overrides the config file.
    #[arg(short, long)]
    tolerance: Vec<f64>,

    /// Stop at the first country that fails
    #[arg(long)]
    fail_fast: bool,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };
    if !args.tolerance.is_empty() {
        config.tolerances = args.tolerance.clone();
    }
    config.fail_fast |= args.fail_fast;
    config.validate()?;

    let file = File::open(&args.input)
        .with_context(|| format!("opening {}", args.input.display()))?;
    let response = overpass::from_reader(file)
        .with_context(|| format!("reading {}", args.input.display()))?;
    info!(
        "{} relations, data as of {}",
        response.elements.len(), response.osm3s.timestamp_osm_base
    );

    let batch = process_countries(&response.elements, &config)?;

    for level in &batch.levels {
        println!("tolerance {}", level.tolerance);
        for feature in &level.features {
            let name = feature.tags.get("name").map(String::as_str).unwrap_or("??");
            println!(
                "  {}\t{} polygons\t{} coordinates",
                name, feature.geometry.polygon_count(), feature.geometry.coord_count()
            );
        }
    }

    for (name, err) in &batch.skipped {
        eprintln!("skipped {}: {}", name, err);
    }

    Ok(())
}
