//! Defines command-line interface options using `clap` for the acdtools application.

use clap::{Args as ClapArgs, Parser, Subcommand};
use std::path::PathBuf;

/// Ocean and climate model analysis helpers
#[derive(Parser, Debug)]
#[command(
    name = "acdtools",
    version,
    about = "Ensemble, ocean, marine heatwave, catalog and map tools for climate model output"
)]
pub struct Args {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Number of threads for parallel processing. Defaults to number of CPU cores.
    #[arg(short = 't', long, global = true)]
    pub threads: Option<usize>,

    /// Size the compute pool from this work type of the YAML config
    #[arg(long, global = true)]
    pub work_type: Option<String>,

    /// YAML configuration file (default: $ACDTOOLS_CONFIG or ./config.yaml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// List variables and dimensions, or describe one variable
    Info {
        /// Path to the NetCDF file
        #[arg(short, long)]
        file: PathBuf,
        /// Describe this variable (type, shape, attributes)
        #[arg(long)]
        var: Option<String>,
    },

    /// Shallowest depth below a threshold and number of downward crossings
    ThresholdDepth {
        #[command(flatten)]
        input: VarInput,
        #[arg(long, default_value_t = acd_tools::ocean::DEFAULT_THRESHOLD)]
        threshold: f64,
        #[arg(long, default_value = acd_tools::ocean::DEFAULT_DEPTH_DIM)]
        depth_dim: String,
        /// Also compute the linearly interpolated crossing depth
        #[arg(long)]
        interpolate: bool,
        #[command(flatten)]
        output: Output,
    },

    /// Mean, min, max and depth integrals over the top layer
    LayerStats {
        #[command(flatten)]
        input: VarInput,
        #[arg(long, default_value_t = acd_tools::ocean::DEFAULT_LAYER_DEPTH)]
        layer_depth: f64,
        #[arg(long, default_value = acd_tools::ocean::DEFAULT_DEPTH_DIM)]
        depth_dim: String,
        #[command(flatten)]
        output: Output,
    },

    /// Marine heatwave detection (Hobday et al. 2016)
    Mhw {
        #[command(flatten)]
        input: VarInput,
        #[arg(long, default_value = "time")]
        time_dim: String,
        #[arg(long, default_value_t = 90.0)]
        percentile: f64,
        #[arg(long, default_value_t = 5)]
        min_duration: usize,
        #[arg(long, default_value_t = 2)]
        max_gap: usize,
        /// Do not join events separated by short gaps
        #[arg(long)]
        no_join: bool,
        /// Do not smooth the climatology and threshold
        #[arg(long)]
        no_smooth: bool,
        /// Climatology period as START:END years, e.g. 1983:2012
        #[arg(long, value_parser = parse_year_range)]
        clim_period: Option<(i32, i32)>,
        /// Keep the threshold at least this far above the climatology
        #[arg(long)]
        min_threshold_delta: Option<f64>,
        #[command(flatten)]
        output: Output,
    },

    /// Unique values per catalog column
    CatalogUnique {
        #[command(flatten)]
        catalog: CatalogInput,
        /// Only report these columns (comma separated)
        #[arg(long, value_delimiter = ',')]
        keep: Option<Vec<String>>,
        /// Leave out these columns (comma separated); defaults to path, time_range,
        /// member_id, version, derived_variable_id
        #[arg(long, value_delimiter = ',')]
        drop: Option<Vec<String>>,
    },

    /// Columns usable as search terms
    CatalogColumns {
        #[command(flatten)]
        catalog: CatalogInput,
    },

    /// Attributes of a variable, read from the first file listing it
    VarInfo {
        #[command(flatten)]
        catalog: CatalogInput,
        #[arg(long)]
        var: String,
    },

    /// Load one variable across all members of a single-model ensemble
    Ensemble {
        #[command(flatten)]
        catalog: CatalogInput,
        #[arg(long)]
        var: String,
        /// Search terms as column=value (repeatable)
        #[arg(long = "query", value_parser = parse_query_term)]
        query: Vec<(String, String)>,
        /// Model family the search must contain
        #[arg(long)]
        source: Option<String>,
        #[arg(long, default_value = "time")]
        concat_dim: String,
        #[command(flatten)]
        output: Output,
    },

    /// Report disk chunks and validate a chunk spec
    Chunks {
        /// NetCDF files making up the dataset
        #[arg(required = true)]
        files: Vec<PathBuf>,
        /// Requested chunks as dim=size pairs, e.g. time=12,lat=-1
        #[arg(long, value_delimiter = ',', value_parser = parse_chunk_term)]
        chunks: Vec<(String, i64)>,
        /// Variables to inspect (comma separated); all when omitted
        #[arg(long, value_delimiter = ',')]
        vars: Option<Vec<String>>,
        /// Files to inspect: single, bookend, sample or all
        #[arg(long, default_value = "single")]
        mode: String,
    },

    /// Show whether we are on the HPC system
    Platform,

    /// Start a compute pool and print its size
    Cluster {
        #[arg(long)]
        n_workers: Option<usize>,
        #[arg(long)]
        threads_per_worker: Option<usize>,
        /// e.g. 16GB or 512MiB
        #[arg(long)]
        memory_limit: Option<String>,
    },

    /// Draw a 2-D field on a Pacific-centred map
    Map {
        #[command(flatten)]
        input: VarInput,
        #[arg(long, default_value = "longitude")]
        lon_name: String,
        #[arg(long, default_value = "latitude")]
        lat_name: String,
        /// GeoJSON file with land polygons
        #[arg(long)]
        land: Option<PathBuf>,
        #[arg(long, default_value = "thermal")]
        cmap: String,
        #[arg(long)]
        title: Option<String>,
        /// SVG file to write
        #[arg(short, long)]
        output: PathBuf,
    },
}

#[derive(ClapArgs, Debug)]
pub struct VarInput {
    /// NetCDF file(s); several files are joined along --concat-dim
    #[arg(short, long, required = true, num_args = 1..)]
    pub file: Vec<PathBuf>,
    /// Variable name
    #[arg(long)]
    pub var: String,
    /// Dimension along which several files are joined
    #[arg(long, default_value = "time")]
    pub concat_dim: String,
}

#[derive(ClapArgs, Debug)]
pub struct CatalogInput {
    /// Catalog CSV table or JSON descriptor
    #[arg(short, long)]
    pub catalog: PathBuf,
}

#[derive(ClapArgs, Debug)]
pub struct Output {
    /// Path to save results as NetCDF. If not set, prints a summary.
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

fn parse_year_range(s: &str) -> Result<(i32, i32), String> {
    let (start, end) = s
        .split_once(':')
        .ok_or_else(|| "Invalid format: Expected '<start year>:<end year>'.".to_string())?;
    let start = start.trim().parse().map_err(|_| format!("Invalid year '{}'", start))?;
    let end = end.trim().parse().map_err(|_| format!("Invalid year '{}'", end))?;
    Ok((start, end))
}

fn parse_query_term(s: &str) -> Result<(String, String), String> {
    match s.split_once('=') {
        Some((column, value)) if !column.is_empty() => Ok((column.to_string(), value.to_string())),
        _ => Err("Invalid format: Expected '<column>=<value>'.".to_string()),
    }
}

fn parse_chunk_term(s: &str) -> Result<(String, i64), String> {
    let (dim, size) = s
        .split_once('=')
        .ok_or_else(|| "Invalid format: Expected '<dimension>=<size>'.".to_string())?;
    let size = size
        .trim()
        .parse::<i64>()
        .map_err(|_| format!("Invalid chunk size for dimension '{}'", dim))?;
    Ok((dim.trim().to_string(), size))
}
