//! Centralized error handling for acd_tools
//!
//! Every fallible operation in the crate returns [`AcdError`]. Validation
//! failures get their own variants so callers can match on the exact reason
//! an ensemble, a profile or a chunk specification was rejected.

use std::fmt;

/// Main error type for acd_tools operations
#[derive(Debug)]
pub enum AcdError {
    /// NetCDF file operation errors
    NetCDFError(netcdf::Error),

    /// I/O operation errors
    IoError(std::io::Error),

    /// Array shape or dimension error
    ArrayError(ndarray::ShapeError),

    /// CSV catalog parsing errors
    CsvError(csv::Error),

    /// JSON catalog descriptor errors
    JsonError(serde_json::Error),

    /// YAML configuration errors
    YamlError(serde_yaml::Error),

    /// Variable not found in a NetCDF file or dataset
    VariableNotFound { var: String },

    /// Dimension not found in variable
    DimensionNotFound { var: String, dim: String },

    /// Coordinate values or labels have the wrong length or kind
    InvalidCoordinate { dim: String, message: String },

    /// Arrays that must line up do not
    ShapeMismatch { message: String },

    /// The catalog object lacks the columns an operation needs
    InvalidCatalog { message: String },

    /// Query or report referenced a column the catalog does not have
    UnknownColumn { column: String },

    /// More than one `source_id` in an ensemble search
    MultipleSources { sources: Vec<String> },

    /// The ensemble search is for a different model family than requested
    UnexpectedSource { expected: String, found: String },

    /// Member id does not look like `r<N>i<N>p<N>f<N>`
    MalformedMember { member: String },

    /// Same member id found under more than one dataset key
    DuplicateMember { member: String },

    /// Ensembles need at least two members
    TooFewMembers { found: usize },

    /// Bracketing values of a linear interpolation are identical
    DegenerateInterpolation { value: f64 },

    /// Depth truncation left no samples
    EmptyLayer { layer_depth: f64 },

    /// Chunk validation mode is not one of single/bookend/sample/all
    InvalidValidateMode { mode: String },

    /// Bad numeric or named parameter passed to an analysis routine
    InvalidParameter { message: String },

    /// Malformed time axis or CF time units
    InvalidTime { message: String },

    /// Cluster or configuration file problems
    InvalidConfig { message: String },

    /// Thread pool configuration error
    ThreadPoolError(String),

    /// Generic error
    Generic(String),
}

impl fmt::Display for AcdError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AcdError::NetCDFError(e) => write!(f, "NetCDF error: {}", e),
            AcdError::IoError(e) => write!(f, "I/O error: {}", e),
            AcdError::ArrayError(e) => write!(f, "Array error: {}", e),
            AcdError::CsvError(e) => write!(f, "CSV catalog error: {}", e),
            AcdError::JsonError(e) => write!(f, "JSON error: {}", e),
            AcdError::YamlError(e) => write!(f, "YAML error: {}", e),
            AcdError::VariableNotFound { var } => write!(f, "Variable '{}' not found", var),
            AcdError::DimensionNotFound { var, dim } => {
                write!(f, "Dimension '{}' not found in variable '{}'", dim, var)
            }
            AcdError::InvalidCoordinate { dim, message } => {
                write!(f, "Invalid coordinate for dimension '{}': {}", dim, message)
            }
            AcdError::ShapeMismatch { message } => write!(f, "Shape mismatch: {}", message),
            AcdError::InvalidCatalog { message } => {
                write!(f, "Invalid catalog object: {}", message)
            }
            AcdError::UnknownColumn { column } => {
                write!(f, "Column '{}' is not present in the catalog", column)
            }
            AcdError::MultipleSources { sources } => write!(
                f,
                "Expected exactly one source_id in the search, found {}: [{}]",
                sources.len(),
                sources.join(", ")
            ),
            AcdError::UnexpectedSource { expected, found } => {
                write!(f, "Expected source_id '{}', found '{}'", expected, found)
            }
            AcdError::MalformedMember { member } => write!(
                f,
                "Member id '{}' does not match the pattern r<N>i<N>p<N>f<N>",
                member
            ),
            AcdError::DuplicateMember { member } => {
                write!(f, "Member id '{}' is not unique across datasets", member)
            }
            AcdError::TooFewMembers { found } => write!(
                f,
                "An ensemble needs at least 2 members, the search contains {}",
                found
            ),
            AcdError::DegenerateInterpolation { value } => write!(
                f,
                "Cannot interpolate a crossing depth: both bracketing values are {}",
                value
            ),
            AcdError::EmptyLayer { layer_depth } => {
                write!(f, "No samples at or above layer depth {}", layer_depth)
            }
            AcdError::InvalidValidateMode { mode } => write!(
                f,
                "Invalid validate_mode '{}': expected one of single, bookend, sample, all",
                mode
            ),
            AcdError::InvalidParameter { message } => write!(f, "Invalid parameter: {}", message),
            AcdError::InvalidTime { message } => write!(f, "Invalid time axis: {}", message),
            AcdError::InvalidConfig { message } => write!(f, "Invalid configuration: {}", message),
            AcdError::ThreadPoolError(msg) => write!(f, "Thread pool error: {}", msg),
            AcdError::Generic(msg) => write!(f, "{}", msg),
        }
    }
}

impl std::error::Error for AcdError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AcdError::NetCDFError(e) => Some(e),
            AcdError::IoError(e) => Some(e),
            AcdError::ArrayError(e) => Some(e),
            AcdError::CsvError(e) => Some(e),
            AcdError::JsonError(e) => Some(e),
            AcdError::YamlError(e) => Some(e),
            _ => None,
        }
    }
}

impl From<netcdf::Error> for AcdError {
    fn from(error: netcdf::Error) -> Self {
        AcdError::NetCDFError(error)
    }
}

impl From<std::io::Error> for AcdError {
    fn from(error: std::io::Error) -> Self {
        AcdError::IoError(error)
    }
}

impl From<ndarray::ShapeError> for AcdError {
    fn from(error: ndarray::ShapeError) -> Self {
        AcdError::ArrayError(error)
    }
}

impl From<csv::Error> for AcdError {
    fn from(error: csv::Error) -> Self {
        AcdError::CsvError(error)
    }
}

impl From<serde_json::Error> for AcdError {
    fn from(error: serde_json::Error) -> Self {
        AcdError::JsonError(error)
    }
}

impl From<serde_yaml::Error> for AcdError {
    fn from(error: serde_yaml::Error) -> Self {
        AcdError::YamlError(error)
    }
}

impl From<String> for AcdError {
    fn from(error: String) -> Self {
        AcdError::Generic(error)
    }
}

impl From<&str> for AcdError {
    fn from(error: &str) -> Self {
        AcdError::Generic(error.to_string())
    }
}

/// Result type alias for acd_tools operations
pub type Result<T> = std::result::Result<T, AcdError>;
