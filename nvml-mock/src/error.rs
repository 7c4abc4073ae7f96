//! Error types for simulated NVML operations.

use std::fmt;
use thiserror::Error;

/// Status code returned by the NVML capability surface.
///
/// Discriminants match the vendor library so callers written against it
/// can compare raw values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(i32)]
pub enum Return {
    /// Operation completed.
    Success = 0,
    /// Caller passed an id or index outside its legal range.
    InvalidArgument = 2,
    /// The id is legal but this generation does not offer it.
    NotSupported = 3,
    /// The referenced object does not currently exist.
    NotFound = 6,
}

impl Return {
    /// Status for an operation outcome.
    pub fn from_result<T>(result: &Result<T>) -> Self {
        match result {
            Ok(_) => Return::Success,
            Err(e) => e.status(),
        }
    }

    /// Check if this is the success status.
    pub fn is_success(&self) -> bool {
        *self == Return::Success
    }
}

/// Unknown codes are handed back unchanged.
impl TryFrom<i32> for Return {
    type Error = i32;

    fn try_from(value: i32) -> core::result::Result<Self, i32> {
        match value {
            0 => Ok(Return::Success),
            2 => Ok(Return::InvalidArgument),
            3 => Ok(Return::NotSupported),
            6 => Ok(Return::NotFound),
            other => Err(other),
        }
    }
}

impl fmt::Display for Return {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Return::Success => write!(f, "SUCCESS"),
            Return::InvalidArgument => write!(f, "ERROR_INVALID_ARGUMENT"),
            Return::NotSupported => write!(f, "ERROR_NOT_SUPPORTED"),
            Return::NotFound => write!(f, "ERROR_NOT_FOUND"),
        }
    }
}

/// Failure of a device, instance or fleet operation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Not supported: {0}")]
    NotSupported(String),
}

impl Error {
    /// Map the error onto its NVML status code.
    pub fn status(&self) -> Return {
        match self {
            Error::InvalidArgument(_) => Return::InvalidArgument,
            Error::NotFound(_) => Return::NotFound,
            Error::NotSupported(_) => Return::NotSupported,
        }
    }

    pub(crate) fn invalid_argument(message: impl Into<String>) -> Self {
        Error::InvalidArgument(message.into())
    }

    pub(crate) fn not_found(message: impl Into<String>) -> Self {
        Error::NotFound(message.into())
    }

    pub(crate) fn not_supported(message: impl Into<String>) -> Self {
        Error::NotSupported(message.into())
    }
}

/// Result type for simulated NVML operations.
pub type Result<T> = core::result::Result<T, Error>;

/// A profile catalog that breaks one of its closure rules.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CatalogError {
    #[error("GPU instance profile id {0} is outside the profile id space")]
    GpuInstanceProfileOutOfRange(i32),

    #[error("compute instance profile id {child} (parent {parent}) is out of range")]
    ComputeInstanceProfileOutOfRange { parent: i32, child: i32 },

    #[error("profile registered under id {key} describes itself as id {id}")]
    IdMismatch { key: i32, id: i32 },

    /// `parent` is `None` for GPU instance profiles.
    #[error("profile id {id} registered more than once (parent {parent:?})")]
    DuplicateProfile { parent: Option<i32>, id: i32 },

    #[error("compute instance profiles registered under unknown parent {0}")]
    OrphanComputeProfiles(i32),

    #[error("GPU instance profile {0} has no placements")]
    NoPlacements(i32),

    #[error("compute instance profile {child} (parent {parent}) has no placements")]
    NoComputePlacements { parent: i32, child: i32 },

    #[error("placement {start}+{size} of profile {profile} exceeds slot width {width}")]
    PlacementOutOfBounds {
        profile: i32,
        start: u32,
        size: u32,
        width: u32,
    },

    #[error("compute placement {start}+{size} of {child} exceeds parent {parent} span {span}")]
    ComputePlacementOutOfBounds {
        parent: i32,
        child: i32,
        start: u32,
        size: u32,
        span: u32,
    },
}

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file '{0}': {1}")]
    ReadError(String, String),

    #[error("Failed to parse config file '{0}': {1}")]
    ParseError(String, String),

    #[error("Invalid profile catalog: {0}")]
    Catalog(#[from] CatalogError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(Return::Success as i32, 0);
        assert_eq!(Return::InvalidArgument as i32, 2);
        assert_eq!(Return::NotSupported as i32, 3);
        assert_eq!(Return::NotFound as i32, 6);
        assert_eq!(Return::try_from(6), Ok(Return::NotFound));
        assert_eq!(Return::try_from(2), Ok(Return::InvalidArgument));
    }

    #[test]
    fn test_unknown_status_codes_are_rejected() {
        assert_eq!(Return::try_from(1), Err(1));
        assert_eq!(Return::try_from(4), Err(4));
        assert_eq!(Return::try_from(999), Err(999));
        assert_eq!(Return::try_from(-1), Err(-1));
    }

    #[test]
    fn test_error_status() {
        assert_eq!(Error::invalid_argument("x").status(), Return::InvalidArgument);
        assert_eq!(Error::not_found("x").status(), Return::NotFound);
        assert_eq!(Error::not_supported("x").status(), Return::NotSupported);
    }

    #[test]
    fn test_from_result() {
        let ok: Result<u32> = Ok(1);
        let err: Result<u32> = Err(Error::not_found("gpu instance 3"));
        assert!(Return::from_result(&ok).is_success());
        assert_eq!(Return::from_result(&err), Return::NotFound);
    }

    #[test]
    fn test_error_display() {
        let err = Error::not_supported("GPU instance profile 5");
        assert_eq!(err.to_string(), "Not supported: GPU instance profile 5");
        assert_eq!(Return::NotFound.to_string(), "ERROR_NOT_FOUND");
    }
}
