use std::fmt;
use thiserror::Error;

/// Prefix shown in place of the loading indicator when acquisition fails
pub const ACQUISITION_FAILED_PREFIX: &str = "获取链接失败: ";

/// Shown when the host failed without telling us why
pub const UNKNOWN_ERROR: &str = "未知错误";

#[derive(Error, Debug)]
pub enum Error {
    #[error("{0}")]
    Acquisition(#[from] AcquisitionError),

    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// `row` is 1-based, as shown in the table
    #[error("Row {row} out of range (table has {len} rows)")]
    RowOutOfRange { row: usize, len: usize },

    #[error("Download failed: {0}")]
    Download(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

/// The host could not run the extractor in the target tab, or returned nothing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AcquisitionError {
    detail: Option<String>,
}

impl AcquisitionError {
    /// Failure with an underlying error message
    pub fn new(detail: impl Into<String>) -> Self {
        let detail = detail.into();
        let detail = detail.trim();
        Self {
            detail: (!detail.is_empty()).then(|| detail.to_string()),
        }
    }

    /// The host completed without producing a result
    pub fn no_result() -> Self {
        Self { detail: None }
    }

    pub fn detail(&self) -> Option<&str> {
        self.detail.as_deref()
    }
}

impl fmt::Display for AcquisitionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{}",
            ACQUISITION_FAILED_PREFIX,
            self.detail().unwrap_or(UNKNOWN_ERROR)
        )
    }
}

impl std::error::Error for AcquisitionError {}
