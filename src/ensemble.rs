//! Ensemble loading from catalog search results
//!
//! A search over an ESM datastore for one model, experiment and variable
//! returns one dataset per ensemble member. [`load_ensemble`] validates that
//! the search really describes a single-model ensemble, reads every member,
//! and stacks them along a new `member` dimension ordered by realization.

use crate::catalog::{EsmDatastore, Query};
use crate::dataarray::LabeledArray;
use crate::errors::{AcdError, Result};
use crate::netcdf_io::open_mf_variable;
use regex::Regex;
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::OnceLock;

/// Columns a catalog search must carry to describe an ensemble
pub const REQUIRED_COLUMNS: [&str; 3] = ["source_id", "member_id", "path"];

/// Name of the dimension members are stacked along
pub const MEMBER_DIM: &str = "member";

/// Options for [`load_ensemble`]
#[derive(Debug, Clone)]
pub struct EnsembleOptions {
    /// Model family the search must contain, e.g. `ACCESS-ESM1-5`
    pub expected_source: Option<String>,
    /// Dimension along which one member's files are joined
    pub concat_dim: String,
}

impl Default for EnsembleOptions {
    fn default() -> Self {
        Self {
            expected_source: None,
            concat_dim: "time".to_string(),
        }
    }
}

/// Variant label of a CMIP member id: `r<realization>i<initialization>p<physics>f<forcing>`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct MemberId {
    pub realization: u32,
    pub initialization: u32,
    pub physics: u32,
    pub forcing: u32,
}

fn member_pattern() -> Result<&'static Regex> {
    static PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
    PATTERN
        .get_or_init(|| Regex::new(r"^r(\d+)i(\d+)p(\d+)f(\d+)$").ok())
        .as_ref()
        .ok_or_else(|| AcdError::Generic("member id pattern failed to compile".to_string()))
}

impl MemberId {
    /// Parse a member id such as `r10i1p1f1`
    ///
    /// # Errors
    ///
    /// Returns [`AcdError::MalformedMember`] if the id does not match the pattern.
    pub fn parse(member: &str) -> Result<Self> {
        let malformed = || AcdError::MalformedMember {
            member: member.to_string(),
        };
        let caps = member_pattern()?.captures(member).ok_or_else(malformed)?;
        let field = |i: usize| -> Result<u32> {
            caps.get(i)
                .and_then(|m| m.as_str().parse().ok())
                .ok_or_else(malformed)
        };
        Ok(Self {
            realization: field(1)?,
            initialization: field(2)?,
            physics: field(3)?,
            forcing: field(4)?,
        })
    }
}

/// One validated member: its id and the files that make it up
#[derive(Debug, Clone)]
pub struct EnsembleMember {
    pub member_id: String,
    pub parsed: MemberId,
    pub dataset_key: String,
    pub paths: Vec<PathBuf>,
}

/// Check that a catalog search describes a single-model ensemble and list its members
///
/// Members are returned sorted by realization index (then i, p, f).
///
/// # Errors
///
/// Each rejected condition has its own error: missing columns
/// ([`AcdError::InvalidCatalog`]), an empty search
/// ([`AcdError::TooFewMembers`]), several sources
/// ([`AcdError::MultipleSources`]), an unexpected source
/// ([`AcdError::UnexpectedSource`]), a malformed member id
/// ([`AcdError::MalformedMember`]), a member id repeated across datasets
/// ([`AcdError::DuplicateMember`]) and fewer than two members
/// ([`AcdError::TooFewMembers`]).
pub fn validate_ensemble(
    search: &EsmDatastore,
    options: &EnsembleOptions,
) -> Result<Vec<EnsembleMember>> {
    let missing: Vec<&str> = REQUIRED_COLUMNS
        .iter()
        .copied()
        .filter(|c| !search.has_column(c))
        .collect();
    if !missing.is_empty() {
        return Err(AcdError::InvalidCatalog {
            message: format!(
                "an ensemble search needs the columns [{}], missing [{}]",
                REQUIRED_COLUMNS.join(", "),
                missing.join(", ")
            ),
        });
    }

    if search.is_empty() {
        return Err(AcdError::TooFewMembers { found: 0 });
    }

    let mut sources: Vec<String> = search
        .column_values("source_id")?
        .into_iter()
        .map(str::to_string)
        .collect();
    sources.sort();
    sources.dedup();
    if sources.len() != 1 {
        return Err(AcdError::MultipleSources { sources });
    }
    if let Some(expected) = &options.expected_source {
        if &sources[0] != expected {
            return Err(AcdError::UnexpectedSource {
                expected: expected.clone(),
                found: sources[0].clone(),
            });
        }
    }

    // member_id -> (dataset key, files)
    let mut members: BTreeMap<String, (String, Vec<PathBuf>)> = BTreeMap::new();
    for (key, rows) in search.dataset_keys() {
        let mut member_ids: Vec<&str> = Vec::new();
        for &row in &rows {
            let id = search.value(row, "member_id")?;
            if !member_ids.contains(&id) {
                member_ids.push(id);
            }
        }
        for id in member_ids {
            MemberId::parse(id)?;
            let paths: Vec<PathBuf> = rows
                .iter()
                .filter(|&&row| search.value(row, "member_id").map(|m| m == id).unwrap_or(false))
                .map(|&row| search.value(row, "path").map(PathBuf::from))
                .collect::<Result<_>>()?;
            match members.get(id) {
                Some((existing_key, _)) if existing_key != &key => {
                    return Err(AcdError::DuplicateMember {
                        member: id.to_string(),
                    })
                }
                Some(_) => {}
                None => {
                    members.insert(id.to_string(), (key.clone(), paths));
                }
            }
        }
    }

    if members.len() < 2 {
        return Err(AcdError::TooFewMembers {
            found: members.len(),
        });
    }

    let mut validated = members
        .into_iter()
        .map(|(member_id, (dataset_key, paths))| {
            Ok(EnsembleMember {
                parsed: MemberId::parse(&member_id)?,
                member_id,
                dataset_key,
                paths,
            })
        })
        .collect::<Result<Vec<_>>>()?;
    validated.sort_by_key(|m| m.parsed);
    Ok(validated)
}

/// Load `variable` for every member of a validated ensemble search
///
/// Each member's files are joined along `options.concat_dim`; members are
/// stacked along a new leading `member` dimension whose labels are the member
/// ids, ordered by numeric realization index (`r2` before `r10`).
///
/// When the catalog has a variable column, only rows for `variable` are
/// considered, so a search covering several variables still yields one
/// dataset per member.
///
/// # Errors
///
/// Returns the validation errors of [`validate_ensemble`], I/O errors, and
/// [`AcdError::ShapeMismatch`] if members do not share a shape.
pub fn load_ensemble(
    search: &EsmDatastore,
    variable: &str,
    options: &EnsembleOptions,
) -> Result<LabeledArray> {
    let restricted;
    let search = if search.has_column(search.variable_column()) {
        restricted = search.search(&Query::new().with(search.variable_column(), [variable]))?;
        &restricted
    } else {
        search
    };
    let members = validate_ensemble(search, options)?;
    tracing::info!(variable, members = members.len(), "loading ensemble");

    let mut arrays = Vec::with_capacity(members.len());
    for member in &members {
        tracing::debug!(
            member = %member.member_id,
            files = member.paths.len(),
            "reading member"
        );
        arrays.push(open_mf_variable(&member.paths, variable, &options.concat_dim)?);
    }

    let labels = members.iter().map(|m| m.member_id.clone()).collect();
    LabeledArray::stack(&arrays, MEMBER_DIM, labels)
}
