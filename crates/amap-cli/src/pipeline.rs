//! Run orchestration
//!
//! Wires the crates into the end-to-end pipeline: load and reproject
//! every input, expand one catchment per facility category, assign
//! population to units, aggregate, and write the three deliverables.
//! Recoverable data-quality warnings from every stage are merged into
//! one log that lands in the run metadata.

use amap_core::{Crs, FacilityCategory, Projector, RunConfig, WarningLog};
use amap_graph::{compute_catchments, NodeLocator};
use amap_ingest::{
    load_facilities, load_network, load_population_raster, load_population_vector, load_units,
};
use amap_report::{
    aggregate, assign_population, write_catchments, write_run_metadata, write_table,
};
use anyhow::Context;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Everything one `run` invocation needs
#[derive(Debug)]
pub struct RunArgs {
    pub network: PathBuf,
    pub facilities: Vec<(FacilityCategory, PathBuf)>,
    pub population: PathBuf,
    pub units: PathBuf,
    pub out_dir: PathBuf,
    pub input_crs: Crs,
    pub config: RunConfig,
}

/// Counts reported after a successful run
#[derive(Debug)]
pub struct RunSummary {
    pub nodes: usize,
    pub edges: usize,
    pub facilities: usize,
    pub cells: usize,
    pub units: usize,
    pub records: usize,
    pub warnings: usize,
}

/// Optional TOML configuration, field-for-field with [`RunConfig`]
///
/// Absent fields keep their defaults; explicit CLI flags are applied
/// after this and win.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    mode: Option<String>,
    thresholds_min: Option<Vec<u32>>,
    snap_distance_m: Option<f64>,
    weighting: Option<String>,
    metric_crs: Option<String>,
    walk_speed_kmh: Option<f64>,
    areal_samples: Option<u8>,
}

impl FileConfig {
    /// Read and parse a config file
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        Self::parse(&text).with_context(|| format!("parsing config {}", path.display()))
    }

    fn parse(text: &str) -> anyhow::Result<Self> {
        Ok(toml::from_str(text)?)
    }

    /// Overlay the file's values onto `config`
    pub fn apply(self, config: &mut RunConfig) -> anyhow::Result<()> {
        if let Some(mode) = self.mode {
            config.mode = mode.parse()?;
        }
        if let Some(thresholds) = self.thresholds_min {
            config.thresholds_min = thresholds;
        }
        if let Some(distance) = self.snap_distance_m {
            config.snap_distance_m = distance;
        }
        if let Some(weighting) = self.weighting {
            config.weighting = weighting.parse()?;
        }
        if let Some(crs) = self.metric_crs {
            config.metric_crs = crs.parse()?;
        }
        if let Some(speed) = self.walk_speed_kmh {
            config.walk_speed_kmh = speed;
        }
        if let Some(samples) = self.areal_samples {
            config.areal_samples = samples;
        }
        Ok(())
    }
}

/// Execute the pipeline end to end
pub fn run(args: &RunArgs) -> anyhow::Result<RunSummary> {
    args.config.validate()?;
    let projector = Projector::new(args.config.metric_crs)?;
    std::fs::create_dir_all(&args.out_dir)
        .with_context(|| format!("creating output directory {}", args.out_dir.display()))?;

    let (graph, mut warnings) =
        load_network(&args.network, args.input_crs, &projector, &args.config)?;
    let locator = NodeLocator::build(&graph);

    let mut sources_by_category = Vec::with_capacity(args.facilities.len());
    let mut facility_count = 0usize;
    for (category, path) in &args.facilities {
        let (facilities, log) = load_facilities(
            path,
            args.input_crs,
            category,
            &locator,
            &projector,
            &args.config,
        )?;
        warnings.merge(log);
        if facilities.is_empty() {
            tracing::warn!(
                category = %category,
                path = %path.display(),
                "no facility snapped; every unit scores zero for this category"
            );
        }
        facility_count += facilities.len();
        sources_by_category.push((
            category.clone(),
            facilities.iter().map(|f| f.node).collect(),
        ));
    }

    // One expansion per category, bounded by the largest threshold
    let cutoff = args.config.thresholds_secs().last().copied().unwrap_or(0.0);
    let catchments = compute_catchments(&graph, &sources_by_category, cutoff)?;

    let (cells, log) = if args
        .population
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("asc"))
    {
        load_population_raster(&args.population, args.input_crs, &projector)?
    } else {
        load_population_vector(&args.population, args.input_crs, &projector)?
    };
    warnings.merge(log);

    let (units, log) = load_units(&args.units, args.input_crs, &projector)?;
    warnings.merge(log);

    let assignment = assign_population(&cells, &units, args.config.weighting, &mut warnings);
    let records = aggregate(&units, &cells, &assignment, &catchments, &locator, &args.config)?;

    write_table(&args.out_dir.join("access.csv"), &records)?;
    write_catchments(
        &args.out_dir.join("catchments.geojson"),
        &catchments,
        &args.config,
        &graph,
        &projector,
    )?;
    write_run_metadata(
        &args.out_dir.join("run.json"),
        &args.config,
        &records,
        &warnings,
    )?;

    Ok(RunSummary {
        nodes: graph.node_count(),
        edges: graph.edge_count(),
        facilities: facility_count,
        cells: cells.len(),
        units: units.len(),
        records: records.len(),
        warnings: warnings.len(),
    })
}
