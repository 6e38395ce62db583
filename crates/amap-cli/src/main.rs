//! `accessmap` - service-accessibility index pipeline
//!
//! Subcommands:
//! - `run`: execute the full pipeline (network + facilities +
//!   population + units -> accessibility table, catchment layer,
//!   run metadata)
//! - `inspect`: summarize a geospatial input before a run

mod inspect;
mod pipeline;

use amap_core::{Crs, FacilityCategory, RunConfig};
use anyhow::{anyhow, Context};
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

fn cli() -> Command {
    Command::new("accessmap")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Service-accessibility index over a road network")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .subcommand(
            Command::new("run")
                .about("Run the full accessibility pipeline")
                .arg(
                    Arg::new("network")
                        .long("network")
                        .required(true)
                        .value_parser(value_parser!(PathBuf))
                        .help("Road network GeoJSON (LineString features)"),
                )
                .arg(
                    Arg::new("facilities")
                        .long("facilities")
                        .action(ArgAction::Append)
                        .required(true)
                        .value_name("CATEGORY=PATH")
                        .help("Facility source (GeoJSON points or lon/lat CSV); repeatable"),
                )
                .arg(
                    Arg::new("population")
                        .long("population")
                        .required(true)
                        .value_parser(value_parser!(PathBuf))
                        .help("Population raster (.asc) or polygon GeoJSON"),
                )
                .arg(
                    Arg::new("units")
                        .long("units")
                        .required(true)
                        .value_parser(value_parser!(PathBuf))
                        .help("Administrative unit polygons (GeoJSON)"),
                )
                .arg(
                    Arg::new("out-dir")
                        .long("out-dir")
                        .default_value("out")
                        .value_parser(value_parser!(PathBuf))
                        .help("Output directory for access.csv, catchments.geojson, run.json"),
                )
                .arg(
                    Arg::new("config")
                        .long("config")
                        .value_parser(value_parser!(PathBuf))
                        .help("TOML config file; explicit flags override its values"),
                )
                .arg(
                    Arg::new("mode")
                        .long("mode")
                        .help("Travel mode: walk|drive (default walk)"),
                )
                .arg(
                    Arg::new("thresholds")
                        .long("thresholds")
                        .help("Travel-time thresholds in minutes, comma separated (default 10,20,30)"),
                )
                .arg(
                    Arg::new("snap-distance-m")
                        .long("snap-distance-m")
                        .value_parser(value_parser!(f64))
                        .help("Maximum facility snap distance in meters (default 150)"),
                )
                .arg(
                    Arg::new("weighting")
                        .long("weighting")
                        .help("Population weighting: areal|centroid (default areal)"),
                )
                .arg(
                    Arg::new("metric-crs")
                        .long("metric-crs")
                        .help("Projected analysis CRS, e.g. EPSG:32737 (default)"),
                )
                .arg(
                    Arg::new("walk-speed-kmh")
                        .long("walk-speed-kmh")
                        .value_parser(value_parser!(f64))
                        .help("Walking speed in km/h (default 4.5)"),
                )
                .arg(
                    Arg::new("input-crs")
                        .long("input-crs")
                        .default_value("EPSG:4326")
                        .help("CRS the input coordinates are expressed in"),
                ),
        )
        .subcommand(
            Command::new("inspect")
                .about("Summarize a geospatial input")
                .arg(
                    Arg::new("source")
                        .required(true)
                        .value_parser(value_parser!(PathBuf))
                        .help("GeoJSON, CSV, or ESRI ASCII grid file"),
                ),
        )
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let matches = cli().get_matches();
    let result = match matches.subcommand() {
        Some(("run", args)) => run_command(args),
        Some(("inspect", args)) => {
            inspect::inspect(args.get_one::<PathBuf>("source").expect("required arg"))
        }
        _ => unreachable!("subcommand required"),
    };

    if let Err(err) = result {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}

fn run_command(args: &ArgMatches) -> anyhow::Result<()> {
    let mut config = RunConfig::new();
    if let Some(path) = args.get_one::<PathBuf>("config") {
        pipeline::FileConfig::load(path)?.apply(&mut config)?;
    }
    if let Some(mode) = args.get_one::<String>("mode") {
        config.mode = mode.parse()?;
    }
    if let Some(list) = args.get_one::<String>("thresholds") {
        config.thresholds_min = parse_thresholds(list)?;
    }
    if let Some(distance) = args.get_one::<f64>("snap-distance-m") {
        config.snap_distance_m = *distance;
    }
    if let Some(weighting) = args.get_one::<String>("weighting") {
        config.weighting = weighting.parse()?;
    }
    if let Some(crs) = args.get_one::<String>("metric-crs") {
        config.metric_crs = crs.parse()?;
    }
    if let Some(speed) = args.get_one::<f64>("walk-speed-kmh") {
        config.walk_speed_kmh = *speed;
    }

    let input_crs: Crs = args
        .get_one::<String>("input-crs")
        .expect("defaulted arg")
        .parse()?;

    let mut facilities = Vec::new();
    for spec in args.get_many::<String>("facilities").expect("required arg") {
        facilities.push(parse_facility_spec(spec)?);
    }

    let run = pipeline::RunArgs {
        network: args.get_one::<PathBuf>("network").expect("required arg").clone(),
        facilities,
        population: args
            .get_one::<PathBuf>("population")
            .expect("required arg")
            .clone(),
        units: args.get_one::<PathBuf>("units").expect("required arg").clone(),
        out_dir: args.get_one::<PathBuf>("out-dir").expect("defaulted arg").clone(),
        input_crs,
        config,
    };

    let summary = pipeline::run(&run)?;

    println!("Accessibility run complete");
    println!("  Graph: {} nodes, {} edges", summary.nodes, summary.edges);
    println!("  Facilities snapped: {}", summary.facilities);
    println!("  Population cells: {}", summary.cells);
    println!("  Units: {}", summary.units);
    println!("  Records: {}", summary.records);
    println!("  Warnings: {}", summary.warnings);
    println!("  Outputs: {}", run.out_dir.display());
    Ok(())
}

fn parse_thresholds(list: &str) -> anyhow::Result<Vec<u32>> {
    list.split(',')
        .map(|part| {
            part.trim()
                .parse::<u32>()
                .with_context(|| format!("invalid threshold '{part}' in '{list}'"))
        })
        .collect()
}

fn parse_facility_spec(spec: &str) -> anyhow::Result<(FacilityCategory, PathBuf)> {
    let (category, path) = spec
        .split_once('=')
        .ok_or_else(|| anyhow!("--facilities expects CATEGORY=PATH, got '{spec}'"))?;
    Ok((FacilityCategory::new(category)?, PathBuf::from(path)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn thresholds_parse_with_spaces() {
        assert_eq!(parse_thresholds("10, 20,30").unwrap(), vec![10, 20, 30]);
        assert!(parse_thresholds("10,twenty").is_err());
    }

    #[test]
    fn facility_spec_splits_on_first_equals() {
        let (category, path) = parse_facility_spec("clinic=data/clinics.csv").unwrap();
        assert_eq!(category.as_str(), "clinic");
        assert_eq!(path, PathBuf::from("data/clinics.csv"));
        assert!(parse_facility_spec("clinics.csv").is_err());
    }

    #[test]
    fn cli_definition_is_consistent() {
        cli().debug_assert();
    }
}
