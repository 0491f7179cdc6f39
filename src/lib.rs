//! acd_tools: helpers for ocean and climate model analysis
//!
//! A Rust library for working with gridded NetCDF output of ocean and
//! climate models. It loads and aligns ensembles found through ESM datastore
//! catalogs, computes water-column threshold crossings and layer-integrated
//! statistics, detects marine heatwaves, draws Pacific-centred maps, and
//! reports catalog and file metadata as console tables.
//!
//! ## Key Features
//!
//! - **Parallel Processing**: every per-column or per-location computation runs on a rayon pool
//! - **Ensembles**: validated loading of single-model ensembles from catalog searches
//! - **Water Column**: threshold depths, interpolated crossings, layer statistics
//! - **Marine Heatwaves**: Hobday et al. (2016) detection with optional severity filter
//! - **Figures**: SVG maps with contours, land, markers and annotations; heatmaps
//! - **Chunking**: on-disk chunk inspection and chunk-spec validation
//!
//! ## Module Organization
//!
//! - [`dataarray`]: labeled arrays and datasets
//! - [`netcdf_io`]: NetCDF reading (single and multi-file) and writing
//! - [`ocean`]: water-column analysis
//! - [`mhw`]: marine heatwave detection
//! - [`ensemble`]: ensemble validation and loading
//! - [`catalog`]: ESM datastore catalogs and reports
//! - [`chunking`]: NetCDF chunk validation
//! - [`coords`]: longitude conventions
//! - [`parallel`] and [`config`]: compute pool, platform detection, YAML configuration
//! - [`plot`]: SVG figures
//! - [`metadata`] and [`table`]: console reports
//! - [`statistics`]: NaN-aware reductions and depth integrals
//! - [`errors`]: centralized error handling
//!
//! ## Usage
//!
//! ```rust,no_run
//! use acd_tools::prelude::*;
//!
//! let file = netcdf::open("argo_gridded.nc").unwrap();
//! let oxygen = read_variable(&file, "doxy").unwrap();
//!
//! // Shallowest depth where oxygen drops to 90 or below, and the number of drops
//! let (first, count) = threshold_depth(&oxygen, 90.0, "pres").unwrap();
//!
//! // Upper 300 m statistics written to a new file
//! let stats = layer_statistics(&oxygen, "doxy", 300.0, "pres").unwrap();
//! write_dataset(&stats, std::path::Path::new("doxy_layer.nc")).unwrap();
//! ```

pub mod catalog;
pub mod chunking;
pub mod config;
pub mod coords;
pub mod dataarray;
pub mod ensemble;
pub mod errors;
pub mod logging;
pub mod metadata;
pub mod mhw;
pub mod netcdf_io;
pub mod ocean;
pub mod parallel;
pub mod plot;
pub mod statistics;
pub mod table;

pub use errors::{AcdError, Result};

pub mod prelude {
    //! Commonly used imports for convenience
    pub use crate::catalog::{EsmDatastore, Query, UniqueReport};
    pub use crate::chunking::{get_disk_chunks, validate_chunkspec, ChunkSpec, ValidateMode};
    pub use crate::config::ClusterConfig;
    pub use crate::coords::{align_lon, convert_longitude_360_to_180};
    pub use crate::dataarray::{AttrValue, Coordinate, Dataset, LabeledArray};
    pub use crate::ensemble::{load_ensemble, EnsembleOptions};
    pub use crate::errors::{AcdError, Result};
    pub use crate::mhw::{detect, mhw_summary, MhwParams};
    pub use crate::netcdf_io::{open_mf_variable, read_variable, write_dataset, DatasetWriter};
    pub use crate::ocean::{
        interpolate_crossing_depth, interpolated_threshold_depth, layer_statistics,
        threshold_depth,
    };
    pub use crate::parallel::{detect_compute_platform, ComputeCluster, Platform};
    pub use crate::plot::{tropical_pacific, MapFigure, MapOptions};
    pub use crate::statistics::{StatOperation, StatisticalReduction};
}
