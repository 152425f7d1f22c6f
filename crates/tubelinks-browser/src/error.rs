use thiserror::Error;
use tubelinks_core::AcquisitionError;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Browser error: {0}")]
    Browser(String),

    #[error("CDP error: {0}")]
    Cdp(String),

    #[error("No tab found: {0}")]
    TabNotFound(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<chromiumoxide::error::CdpError> for Error {
    fn from(err: chromiumoxide::error::CdpError) -> Self {
        Error::Cdp(err.to_string())
    }
}

impl From<Error> for AcquisitionError {
    fn from(err: Error) -> Self {
        match err {
            Error::TabNotFound(detail) | Error::Cdp(detail) | Error::Browser(detail) => {
                AcquisitionError::new(detail)
            }
            Error::Io(err) => AcquisitionError::new(err.to_string()),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
