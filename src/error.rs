use thiserror::Error;

use crate::region::RegionError;

/// Everything that can stop a reading
#[derive(Debug, Error)]
pub enum ReadError {
    #[error("File must be an image (got '{0}')")]
    InvalidContentType(String),

    #[error("Invalid image file")]
    UndecodableImage,

    #[error("no region found in image")]
    NoRegionFound,

    #[error("{0}")]
    ProcessingFailure(String),
}

impl ReadError {
    /// Whether the caller sent something unusable (as opposed to a server fault)
    pub fn is_client_error(&self) -> bool {
        matches!(self, ReadError::InvalidContentType(_) | ReadError::UndecodableImage)
    }
}

impl From<RegionError> for ReadError {
    fn from(err: RegionError) -> Self {
        match err {
            RegionError::NoRegionFound => ReadError::NoRegionFound,
            RegionError::Pipeline(msg) => ReadError::ProcessingFailure(msg),
        }
    }
}
