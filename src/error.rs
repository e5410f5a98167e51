//! Errors returned by freight operations.

use crate::model::{TrackingId, UnLocode, VoyageNumber};
use crate::storage::StorageError;

/// Errors returned to callers of booking, handling and inspection operations.
///
/// None of these are retried internally.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("unknown cargo: {0}")]
    UnknownCargo(TrackingId),

    #[error("unknown voyage: {0}")]
    UnknownVoyage(VoyageNumber),

    #[error("unknown location: {0}")]
    UnknownLocation(UnLocode),

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("storage error: {0}")]
    Storage(#[from] StorageError),
}

impl Error {
    pub(crate) fn invalid(reason: impl Into<String>) -> Self {
        Self::InvalidArgument(reason.into())
    }
}

pub type Result<T> = core::result::Result<T, Error>;
