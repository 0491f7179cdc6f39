use acd_tools::config::{ClusterConfig, ClusterSettings};
use acd_tools::errors::{AcdError, Result};
use acd_tools::parallel::{parse_memory_limit, platform_for_hostname, ComputeCluster, Platform};
use acd_tools::statistics::parallel::par_map_lanes;
use ndarray::Array2;
use std::fs;
use tempfile::tempdir;

const CONFIG: &str = r#"
dask_cluster:
  small:
    n_workers: 2
    threads_per_worker: 1
    memory_limit: "4GB"
  big:
    n_workers: 28
    threads_per_worker: "None"
    memory_limit: "None"
    dashboard_address: ":8787"
    processes: true
"#;

#[test]
fn test_yaml_settings() -> Result<()> {
    let config = ClusterConfig::from_yaml(CONFIG)?;

    let small = config.settings("small");
    assert_eq!(small.n_workers, Some(2));
    assert_eq!(small.threads_per_worker, Some(1));
    assert_eq!(small.memory_limit.as_deref(), Some("4GB"));
    assert!(small.other.is_empty());

    // "None" leaves a setting unset; unknown keys are kept aside
    let big = config.settings("big");
    assert_eq!(big.n_workers, Some(28));
    assert_eq!(big.threads_per_worker, None);
    assert_eq!(big.memory_limit, None);
    assert_eq!(big.other.len(), 2);
    assert!(big.other.contains_key("dashboard_address"));

    let unknown = config.settings("huge");
    assert_eq!(unknown, ClusterSettings::default());
    Ok(())
}

#[test]
fn test_bad_yaml_rejected() {
    let result = ClusterConfig::from_yaml("dask_cluster:\n  small:\n    n_workers: -3\n");
    assert!(matches!(result, Err(AcdError::YamlError(_))));

    let missing = ClusterConfig::load(std::path::Path::new("/does/not/exist.yaml"));
    assert!(matches!(missing, Err(AcdError::InvalidConfig { .. })));
}

#[test]
fn test_parse_memory_limit() -> Result<()> {
    assert_eq!(parse_memory_limit("16GB")?, 16_000_000_000);
    assert_eq!(parse_memory_limit("512MiB")?, 536_870_912);
    assert_eq!(parse_memory_limit("2.5 GB")?, 2_500_000_000);
    assert_eq!(parse_memory_limit("1000")?, 1000);
    assert_eq!(parse_memory_limit("4kb")?, 4000);

    for bad in ["", "GB", "16 parsecs", "1.2.3GB"] {
        assert!(
            matches!(parse_memory_limit(bad), Err(AcdError::InvalidConfig { .. })),
            "'{}' should not parse",
            bad
        );
    }
    Ok(())
}

#[test]
fn test_cluster_pool_size_and_install() -> Result<()> {
    let cluster = ComputeCluster::start(Some(2), Some(1), Some("4GB"))?;
    assert_eq!(cluster.n_workers(), 2);
    assert_eq!(cluster.total_threads(), 2);
    assert_eq!(cluster.memory_limit(), Some(4_000_000_000));
    assert_eq!(cluster.install(rayon::current_num_threads), 2);
    assert!(cluster.summary().contains("2 worker(s)"));

    // parallel reductions run inside the pool
    let data = Array2::from_shape_fn((4, 3), |(i, j)| (i * 3 + j) as f64).into_dyn();
    let sums = cluster.install(|| par_map_lanes(&data, 1, |lane| lane.sum()))?;
    assert_eq!(sums.shape(), &[4]);
    assert_eq!(sums.iter().copied().collect::<Vec<f64>>(), vec![3.0, 12.0, 21.0, 30.0]);
    Ok(())
}

#[test]
fn test_cluster_rejects_bad_sizes() {
    assert!(matches!(
        ComputeCluster::start(Some(0), Some(1), None),
        Err(AcdError::InvalidConfig { .. })
    ));
    assert!(matches!(
        ComputeCluster::start(Some(1), Some(0), None),
        Err(AcdError::InvalidConfig { .. })
    ));
    assert!(matches!(
        ComputeCluster::start(Some(1), Some(1), Some("lots")),
        Err(AcdError::InvalidConfig { .. })
    ));
}

#[test]
fn test_cluster_from_config_file() -> Result<()> {
    let temp_dir = tempdir().expect("Failed to create temp dir");
    let path = temp_dir.path().join("config.yaml");
    fs::write(&path, CONFIG).expect("Failed to write config");

    let cluster = ComputeCluster::from_config(&path, "small")?;
    assert_eq!(cluster.total_threads(), 2);
    assert_eq!(cluster.threads_per_worker(), 1);
    Ok(())
}

#[test]
fn test_platform_detection() {
    assert_eq!(platform_for_hostname("gadi-login-01.gadi.nci.org.au"), Platform::Hpc);
    assert_eq!(platform_for_hostname("gadi-cpu-clx-0123"), Platform::Hpc);
    assert_eq!(platform_for_hostname("my-laptop"), Platform::Laptop);
    assert_eq!(Platform::Hpc.to_string(), "HPC");
}
