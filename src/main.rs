//! Entry point for the acdtools application.
//! Handles CLI parsing, sets up logging and the compute pool, and dispatches subcommands.

use acd_tools::catalog::{EsmDatastore, Query, UniqueReport};
use acd_tools::chunking::{validate_chunkspec, ChunkSpec, ValidateMode};
use acd_tools::config::default_config_path;
use acd_tools::dataarray::{Dataset, LabeledArray};
use acd_tools::ensemble::{load_ensemble, EnsembleOptions};
use acd_tools::errors::Result;
use acd_tools::mhw::{self, MhwParams};
use acd_tools::netcdf_io::{open_mf_variable, read_variable, write_dataset};
use acd_tools::parallel::{detect_compute_platform, get_parallel_info, ComputeCluster};
use acd_tools::plot::{tropical_pacific, ContourfOptions, GeoFeatures, MapOptions};
use acd_tools::table::Table;
use acd_tools::{logging, metadata, ocean};
use clap::Parser;
use std::path::{Path, PathBuf};

mod cli;

use cli::{Args, Command, VarInput};

fn load_input(input: &VarInput) -> Result<LabeledArray> {
    match input.file.as_slice() {
        [single] => {
            let file = netcdf::open(single)?;
            read_variable(&file, &input.var)
        }
        many => open_mf_variable(many, &input.var, &input.concat_dim),
    }
}

fn load_catalog(path: &Path) -> Result<EsmDatastore> {
    match path.extension().and_then(|e| e.to_str()) {
        Some("json") => EsmDatastore::from_json(path),
        _ => EsmDatastore::from_csv(path),
    }
}

/// Write to NetCDF when an output path is given, otherwise print a short summary
fn emit(ds: &Dataset, output: Option<&PathBuf>) -> Result<()> {
    match output {
        Some(path) => {
            write_dataset(ds, path)?;
            println!("✅ Saved result to {}", path.display());
        }
        None => {
            let mut table = Table::new(["Variable", "Dimensions", "Shape", "Finite values"]);
            for var in ds.iter() {
                let finite = var.data.iter().filter(|v| v.is_finite()).count();
                table.add_row([
                    var.name.clone(),
                    var.dims.join(", "),
                    format!("{:?}", var.shape()),
                    finite.to_string(),
                ]);
            }
            table.print();
        }
    }
    Ok(())
}

fn start_cluster(args: &Args) -> Result<ComputeCluster> {
    match &args.work_type {
        Some(work_type) => {
            let path = args.config.clone().unwrap_or_else(default_config_path);
            ComputeCluster::from_config(&path, work_type)
        }
        None => ComputeCluster::start(args.threads, Some(1), None),
    }
}

fn print_events(result: &mhw::MhwResult) {
    let mut table = Table::new([
        "Start", "End", "Peak", "Days", "Max", "Mean", "Cumulative", "Category",
    ]);
    for event in &result.events {
        table.add_row([
            event.date_start.to_string(),
            event.date_end.to_string(),
            event.date_peak.to_string(),
            event.duration.to_string(),
            format!("{:.2}", event.intensity_max),
            format!("{:.2}", event.intensity_mean),
            format!("{:.2}", event.intensity_cumulative),
            event.category.to_string(),
        ]);
    }
    table.print();
    println!("{} marine heatwave(s) detected", result.events.len());
}

fn run(args: Args, cluster: &ComputeCluster) -> Result<()> {
    match args.command {
        Command::Info { file, var } => {
            let nc = netcdf::open(&file)?;
            println!("Successfully opened NetCDF file: {}", file.display());
            match var {
                Some(var) => {
                    metadata::describe_variable(&nc, &var)?;
                }
                None => metadata::list_variables_and_dimensions(&nc)?,
            }
        }

        Command::ThresholdDepth {
            input,
            threshold,
            depth_dim,
            interpolate,
            output,
        } => {
            let da = load_input(&input)?;
            let ds = cluster.install(|| -> Result<Dataset> {
                let (first, count) = ocean::threshold_depth(&da, threshold, &depth_dim)?;
                let mut ds = Dataset::new();
                ds.insert(first);
                ds.insert(count);
                if interpolate {
                    ds.insert(ocean::interpolated_threshold_depth(&da, threshold, &depth_dim)?);
                }
                Ok(ds)
            })?;
            emit(&ds, output.output.as_ref())?;
        }

        Command::LayerStats {
            input,
            layer_depth,
            depth_dim,
            output,
        } => {
            let da = load_input(&input)?;
            let ds = cluster
                .install(|| ocean::layer_statistics(&da, &input.var, layer_depth, &depth_dim))?;
            emit(&ds, output.output.as_ref())?;
        }

        Command::Mhw {
            input,
            time_dim,
            percentile,
            min_duration,
            max_gap,
            no_join,
            no_smooth,
            clim_period,
            min_threshold_delta,
            output,
        } => {
            let params = MhwParams {
                percentile,
                min_duration,
                max_gap,
                join_across_gaps: !no_join,
                smooth_percentile: !no_smooth,
                climatology_period: clim_period,
                min_threshold_delta,
                ..MhwParams::default()
            };
            let da = load_input(&input)?;
            let mut dates = Vec::new();
            for path in sorted(&input.file) {
                dates.extend(mhw::read_time_axis(&path, &time_dim)?);
            }
            if da.ndim() == 1 {
                let temps: Vec<f64> = da.data.iter().copied().collect();
                let result = mhw::detect(&dates, &temps, &params)?;
                print_events(&result);
            } else {
                let ds = cluster.install(|| mhw::mhw_summary(&da, &time_dim, &dates, &params))?;
                emit(&ds, output.output.as_ref())?;
            }
        }

        Command::CatalogUnique {
            catalog,
            keep,
            drop,
        } => {
            let store = load_catalog(&catalog.catalog)?;
            let defaults = UniqueReport::default();
            let report = UniqueReport {
                keep_list: keep,
                drop_list: drop.or(defaults.drop_list),
                header: defaults.header,
            };
            println!("{}", store);
            store.report_unique(&report);
        }

        Command::CatalogColumns { catalog } => {
            load_catalog(&catalog.catalog)?.list_query_kwargs();
        }

        Command::VarInfo { catalog, var } => {
            load_catalog(&catalog.catalog)?.var_name_info(&var)?;
        }

        Command::Ensemble {
            catalog,
            var,
            query,
            source,
            concat_dim,
            output,
        } => {
            let store = load_catalog(&catalog.catalog)?;
            let mut q = Query::new().with(store.variable_column(), [var.clone()]);
            for (column, value) in query {
                q = q.with(&column, [value]);
            }
            let search = store.search(&q)?;
            println!("{}", search);
            let options = EnsembleOptions {
                expected_source: source,
                concat_dim,
            };
            let ensemble = cluster.install(|| load_ensemble(&search, &var, &options))?;
            let mut ds = Dataset::new();
            ds.insert(ensemble);
            emit(&ds, output.output.as_ref())?;
        }

        Command::Chunks {
            files,
            chunks,
            vars,
            mode,
        } => {
            let mode: ValidateMode = mode.parse()?;
            let spec: ChunkSpec = chunks.into_iter().collect();
            let names: Option<Vec<&str>> =
                vars.as_ref().map(|v| v.iter().map(String::as_str).collect());
            let validation = validate_chunkspec(&files, &spec, names.as_deref(), mode)?;
            let mut table = Table::new(["Dimension", "Requested", "Chunk"]);
            for (dim, size) in &validation.chunks {
                let requested = spec.get(dim).copied().unwrap_or(*size);
                table.add_row([dim.clone(), requested.to_string(), size.to_string()]);
            }
            table.print();
            for warning in &validation.warnings {
                println!("⚠️  {}", warning);
            }
        }

        Command::Platform => {
            let (platform, hostname) = detect_compute_platform();
            println!("Detected platform: {} (hostname: {})", platform, hostname);
        }

        Command::Cluster {
            n_workers,
            threads_per_worker,
            memory_limit,
        } => {
            let requested =
                n_workers.is_some() || threads_per_worker.is_some() || memory_limit.is_some();
            if requested {
                ComputeCluster::start(n_workers, threads_per_worker, memory_limit.as_deref())?
                    .print_summary();
            } else {
                cluster.print_summary();
            }
            get_parallel_info().print_info();
        }

        Command::Map {
            input,
            lon_name,
            lat_name,
            land,
            cmap,
            title,
            output,
        } => {
            let da = load_input(&input)?;
            let options = MapOptions {
                title: title.unwrap_or_else(|| da.name.clone()),
                ..MapOptions::default()
            };
            let contourf = ContourfOptions {
                lon_name,
                lat_name,
                cmap,
                ..ContourfOptions::default()
            };
            let mut figure = tropical_pacific(options, Some((&da, &contourf)))?;
            if let Some(path) = land {
                figure.add_land(GeoFeatures::from_geojson_file(&path)?);
            }
            figure.save_svg(&output)?;
            println!("✅ Saved map to {}", output.display());
        }
    }
    Ok(())
}

fn sorted(paths: &[PathBuf]) -> Vec<PathBuf> {
    let mut paths = paths.to_vec();
    paths.sort();
    paths
}

fn main() {
    let args = Args::parse();
    logging::init(args.verbose);

    let result = start_cluster(&args).and_then(|cluster| {
        tracing::info!("{}", cluster.summary());
        run(args, &cluster)
    });

    if let Err(e) = result {
        eprintln!("❌ Error: {}", e);
        std::process::exit(1);
    }
}
