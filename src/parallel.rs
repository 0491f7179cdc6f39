//! Local compute pool and platform detection
//!
//! A [`ComputeCluster`] is a dedicated rayon thread pool sized as
//! `n_workers × threads_per_worker`. Work submitted through
//! [`ComputeCluster::install`] runs on that pool, so every parallel reduction
//! in the crate (`par_map_lanes`, layer statistics, heatwave summaries) picks
//! it up without further plumbing.

use crate::config::{ClusterConfig, ClusterSettings};
use crate::errors::{AcdError, Result};
use rayon::{ThreadPool, ThreadPoolBuilder};
use std::fmt;
use std::path::Path;

/// Where the code is running
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    /// NCI Gadi
    Hpc,
    Laptop,
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Platform::Hpc => write!(f, "HPC"),
            Platform::Laptop => write!(f, "Laptop"),
        }
    }
}

/// Classify a hostname; Gadi login and compute nodes all contain `gadi`
pub fn platform_for_hostname(hostname: &str) -> Platform {
    if hostname.contains("gadi") {
        Platform::Hpc
    } else {
        Platform::Laptop
    }
}

fn hostname() -> String {
    std::fs::read_to_string("/proc/sys/kernel/hostname")
        .map(|s| s.trim().to_string())
        .ok()
        .filter(|s| !s.is_empty())
        .or_else(|| std::env::var("HOSTNAME").ok())
        .or_else(|| std::env::var("COMPUTERNAME").ok())
        .unwrap_or_default()
}

/// Detect whether we are on the HPC system, returning the platform and hostname
pub fn detect_compute_platform() -> (Platform, String) {
    let host = hostname();
    let platform = platform_for_hostname(&host);
    tracing::debug!(hostname = %host, %platform, "detected compute platform");
    (platform, host)
}

/// Parse a memory size such as `"16GB"`, `"512MiB"`, `"2.5 GB"` or `"1000"` into bytes.
///
/// Decimal suffixes (kB, MB, GB, TB) are powers of 1000, binary suffixes
/// (KiB, MiB, GiB, TiB) powers of 1024. A bare number is bytes.
pub fn parse_memory_limit(text: &str) -> Result<u64> {
    let invalid = || AcdError::InvalidConfig {
        message: format!("cannot parse memory limit '{}'", text),
    };
    let trimmed = text.trim();
    let split = trimmed
        .find(|c: char| !(c.is_ascii_digit() || c == '.'))
        .unwrap_or(trimmed.len());
    let (number, unit) = trimmed.split_at(split);
    let value: f64 = number.parse().map_err(|_| invalid())?;
    let multiplier: f64 = match unit.trim().to_ascii_lowercase().as_str() {
        "" | "b" => 1.0,
        "k" | "kb" => 1e3,
        "m" | "mb" => 1e6,
        "g" | "gb" => 1e9,
        "t" | "tb" => 1e12,
        "kib" => 1024.0,
        "mib" => 1024.0_f64.powi(2),
        "gib" => 1024.0_f64.powi(3),
        "tib" => 1024.0_f64.powi(4),
        _ => return Err(invalid()),
    };
    if !value.is_finite() || value < 0.0 {
        return Err(invalid());
    }
    Ok((value * multiplier).round() as u64)
}

fn format_bytes(bytes: u64) -> String {
    const UNITS: [&str; 5] = ["B", "kB", "MB", "GB", "TB"];
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1000.0 && unit < UNITS.len() - 1 {
        value /= 1000.0;
        unit += 1;
    }
    format!("{:.2} {}", value, UNITS[unit])
}

/// A started local compute pool
pub struct ComputeCluster {
    pool: ThreadPool,
    n_workers: usize,
    threads_per_worker: usize,
    /// Per-worker memory limit in bytes; recorded, not enforced
    memory_limit: Option<u64>,
}

impl ComputeCluster {
    /// Start a pool; `None` arguments fall back to all cores, one thread each, no limit
    ///
    /// # Errors
    ///
    /// Returns [`AcdError::InvalidConfig`] for zero workers or threads or an
    /// unparseable memory limit, and [`AcdError::ThreadPoolError`] if the pool
    /// cannot be built.
    pub fn start(
        n_workers: Option<usize>,
        threads_per_worker: Option<usize>,
        memory_limit: Option<&str>,
    ) -> Result<Self> {
        let n_workers = n_workers.unwrap_or_else(num_cpus::get);
        let threads_per_worker = threads_per_worker.unwrap_or(1);
        if n_workers == 0 || threads_per_worker == 0 {
            return Err(AcdError::InvalidConfig {
                message: format!(
                    "n_workers and threads_per_worker must be positive, got {} and {}",
                    n_workers, threads_per_worker
                ),
            });
        }
        let memory_limit = memory_limit.map(parse_memory_limit).transpose()?;

        let total = n_workers * threads_per_worker;
        let pool = ThreadPoolBuilder::new()
            .num_threads(total)
            .thread_name(|i| format!("acd-worker-{}", i))
            .build()
            .map_err(|e| {
                AcdError::ThreadPoolError(format!(
                    "Failed to initialize thread pool with {} threads: {}",
                    total, e
                ))
            })?;

        let cluster = Self {
            pool,
            n_workers,
            threads_per_worker,
            memory_limit,
        };
        tracing::info!(
            n_workers,
            threads_per_worker,
            memory_limit = ?cluster.memory_limit,
            "started compute pool"
        );
        Ok(cluster)
    }

    /// Start a pool from already-resolved settings
    pub fn from_settings(settings: &ClusterSettings) -> Result<Self> {
        for key in settings.other.keys() {
            tracing::debug!(setting = %key, "ignoring cluster setting");
        }
        Self::start(
            settings.n_workers,
            settings.threads_per_worker,
            settings.memory_limit.as_deref(),
        )
    }

    /// Start a pool sized by the `work_type` entry of a YAML configuration file
    pub fn from_config(path: &Path, work_type: &str) -> Result<Self> {
        let config = ClusterConfig::load(path)?;
        Self::from_settings(&config.settings(work_type))
    }

    /// Run `op` inside the pool
    pub fn install<OP, R>(&self, op: OP) -> R
    where
        OP: FnOnce() -> R + Send,
        R: Send,
    {
        self.pool.install(op)
    }

    pub fn n_workers(&self) -> usize {
        self.n_workers
    }

    pub fn threads_per_worker(&self) -> usize {
        self.threads_per_worker
    }

    pub fn total_threads(&self) -> usize {
        self.pool.current_num_threads()
    }

    pub fn memory_limit(&self) -> Option<u64> {
        self.memory_limit
    }

    pub fn summary(&self) -> String {
        let memory = match self.memory_limit {
            Some(bytes) => format!("{} per worker", format_bytes(bytes)),
            None => "unlimited".to_string(),
        };
        format!(
            "Compute pool: {} worker(s) x {} thread(s) = {} threads, memory {}",
            self.n_workers,
            self.threads_per_worker,
            self.total_threads(),
            memory
        )
    }

    pub fn print_summary(&self) {
        println!("✅ {}", self.summary());
    }
}

impl fmt::Debug for ComputeCluster {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ComputeCluster")
            .field("n_workers", &self.n_workers)
            .field("threads_per_worker", &self.threads_per_worker)
            .field("memory_limit", &self.memory_limit)
            .finish()
    }
}

/// Information about the parallel processing environment
#[derive(Debug, Clone)]
pub struct ParallelInfo {
    pub current_threads: usize,
    pub available_cores: usize,
    pub platform: Platform,
    pub hostname: String,
}

pub fn get_parallel_info() -> ParallelInfo {
    let (platform, hostname) = detect_compute_platform();
    ParallelInfo {
        current_threads: rayon::current_num_threads(),
        available_cores: num_cpus::get(),
        platform,
        hostname,
    }
}

impl ParallelInfo {
    pub fn print_info(&self) {
        println!("📊 Compute environment:");
        println!("   Platform: {} ({})", self.platform, self.hostname);
        println!("   Current threads: {}", self.current_threads);
        println!("   Available CPU cores: {}", self.available_cores);
    }
}
