//! On-disk chunk inspection and chunk-spec validation for NetCDF files
//!
//! Reading a NetCDF-4 variable with in-memory chunks that are not whole
//! multiples of its on-disk chunks means decompressing the same disk chunk
//! several times. [`validate_chunkspec`] rounds a requested chunk spec up to
//! whole multiples of the disk chunks and reports anything suspicious.

use crate::errors::{AcdError, Result};
use netcdf::File;
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Disk chunk sizes: variable -> dimension -> chunk length
pub type DiskChunks = BTreeMap<String, BTreeMap<String, usize>>;

/// Requested chunk sizes: dimension -> chunk length, `-1` for the whole dimension
pub type ChunkSpec = BTreeMap<String, i64>;

/// Which of several files to inspect when validating
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ValidateMode {
    /// First file only
    #[default]
    Single,
    /// First and last files
    Bookend,
    /// First, middle and last files
    Sample,
    /// Every file
    All,
}

impl FromStr for ValidateMode {
    type Err = AcdError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "single" => Ok(Self::Single),
            "bookend" => Ok(Self::Bookend),
            "sample" => Ok(Self::Sample),
            "all" => Ok(Self::All),
            other => Err(AcdError::InvalidValidateMode {
                mode: other.to_string(),
            }),
        }
    }
}

impl ValidateMode {
    /// Indices of the files to inspect out of `count`, without repeats
    pub fn select(self, count: usize) -> Vec<usize> {
        if count == 0 {
            return Vec::new();
        }
        let last = count - 1;
        let mut picked = match self {
            Self::Single => vec![0],
            Self::Bookend => vec![0, last],
            Self::Sample => vec![0, last / 2, last],
            Self::All => (0..count).collect(),
        };
        picked.dedup();
        picked
    }
}

/// Non-fatal warnings from [`validate_chunkspec`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChunkingWarning {
    /// Requested chunks were rounded up: (dimension, requested, used)
    NotIntegerMultiple { adjusted: Vec<(String, i64, i64)> },
    /// A file's disk chunks differ from the first file's for these variables
    DiskChunksDiffer {
        reference: PathBuf,
        other: PathBuf,
        variables: Vec<String>,
    },
    /// A requested dimension appears in none of the inspected variables
    UnknownDimension { dim: String },
}

impl fmt::Display for ChunkingWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChunkingWarning::NotIntegerMultiple { adjusted } => {
                let parts: Vec<String> = adjusted
                    .iter()
                    .map(|(dim, from, to)| format!("{}: {} -> {}", dim, from, to))
                    .collect();
                write!(
                    f,
                    "Specified chunks are not integer multiples of the disk chunks, adjusted [{}]",
                    parts.join(", ")
                )
            }
            ChunkingWarning::DiskChunksDiffer {
                reference,
                other,
                variables,
            } => write!(
                f,
                "Disk chunks differ between {} and {} for [{}]",
                reference.display(),
                other.display(),
                variables.join(", ")
            ),
            ChunkingWarning::UnknownDimension { dim } => {
                write!(f, "Dimension '{}' is not used by any inspected variable", dim)
            }
        }
    }
}

/// Outcome of [`validate_chunkspec`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChunkValidation {
    pub chunks: ChunkSpec,
    pub warnings: Vec<ChunkingWarning>,
}

fn chunks_of(file: &File, var_name: &str) -> Result<BTreeMap<String, usize>> {
    let var = file
        .variable(var_name)
        .ok_or_else(|| AcdError::VariableNotFound {
            var: var_name.to_string(),
        })?;
    let dims: Vec<String> = var
        .dimensions()
        .iter()
        .map(|d| d.name().to_string())
        .collect();
    let sizes: Vec<usize> = match var.chunking()? {
        Some(chunks) => chunks,
        // contiguous storage reads as a single chunk
        None => var.dimensions().iter().map(|d| d.len()).collect(),
    };
    Ok(dims.into_iter().zip(sizes).collect())
}

/// Disk chunk sizes of `varnames` (all variables when `None`) in one file
///
/// # Errors
///
/// Returns an error if the file cannot be opened or a variable is missing.
pub fn get_disk_chunks(path: &Path, varnames: Option<&[&str]>) -> Result<DiskChunks> {
    let file = netcdf::open(path)?;
    let names: Vec<String> = match varnames {
        Some(names) => names.iter().map(|n| n.to_string()).collect(),
        None => file.variables().map(|v| v.name().to_string()).collect(),
    };
    names
        .into_iter()
        .map(|name| {
            let chunks = chunks_of(&file, &name)?;
            Ok((name, chunks))
        })
        .collect()
}

fn gcd(a: usize, b: usize) -> usize {
    if b == 0 {
        a
    } else {
        gcd(b, a % b)
    }
}

fn lcm(a: usize, b: usize) -> usize {
    if a == 0 || b == 0 {
        a.max(b)
    } else {
        a / gcd(a, b) * b
    }
}

/// Check `chunkspec` against the disk chunks of `paths`
///
/// Each requested size must be a whole multiple of the disk chunk of every
/// inspected variable using that dimension; otherwise it is rounded up to the
/// next common multiple. `-1` (whole dimension) is always accepted. Files
/// picked by `mode` are compared against the first one.
///
/// # Errors
///
/// Returns an error if `paths` is empty, a chunk size is zero or below `-1`,
/// or a file cannot be read.
pub fn validate_chunkspec(
    paths: &[PathBuf],
    chunkspec: &ChunkSpec,
    varnames: Option<&[&str]>,
    mode: ValidateMode,
) -> Result<ChunkValidation> {
    if paths.is_empty() {
        return Err(AcdError::InvalidParameter {
            message: "no files to validate chunks against".to_string(),
        });
    }
    if let Some((dim, size)) = chunkspec.iter().find(|&(_, &s)| s == 0 || s < -1) {
        return Err(AcdError::InvalidParameter {
            message: format!("chunk size for '{}' must be positive or -1, got {}", dim, size),
        });
    }

    let selected = mode.select(paths.len());
    let reference = get_disk_chunks(&paths[selected[0]], varnames)?;
    let mut warnings = Vec::new();

    for &idx in &selected[1..] {
        let other = get_disk_chunks(&paths[idx], varnames)?;
        let mut differing: Vec<String> = reference
            .iter()
            .filter(|(name, chunks)| other.get(*name) != Some(*chunks))
            .map(|(name, _)| name.clone())
            .collect();
        differing.extend(other.keys().filter(|k| !reference.contains_key(*k)).cloned());
        if !differing.is_empty() {
            warnings.push(ChunkingWarning::DiskChunksDiffer {
                reference: paths[selected[0]].clone(),
                other: paths[idx].clone(),
                variables: differing,
            });
        }
    }

    let mut chunks = ChunkSpec::new();
    let mut adjusted = Vec::new();
    for (dim, &requested) in chunkspec {
        let required = reference
            .values()
            .filter_map(|var_chunks| var_chunks.get(dim))
            .fold(0, |acc, &c| lcm(acc, c));
        if required == 0 {
            warnings.push(ChunkingWarning::UnknownDimension { dim: dim.clone() });
            chunks.insert(dim.clone(), requested);
            continue;
        }
        let used = if requested == -1 {
            -1
        } else {
            let required = required as i64;
            let rounded = (requested + required - 1) / required * required;
            if rounded != requested {
                adjusted.push((dim.clone(), requested, rounded));
            }
            rounded
        };
        chunks.insert(dim.clone(), used);
    }
    if !adjusted.is_empty() {
        warnings.insert(0, ChunkingWarning::NotIntegerMultiple { adjusted });
    }

    for warning in &warnings {
        tracing::warn!("{}", warning);
    }
    Ok(ChunkValidation { chunks, warnings })
}
