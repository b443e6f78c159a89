use crate::api::TransportError;
use crate::loader::LoadError;
use crate::record::UnknownRecordType;

/// Why a single request did not go through.
#[derive(Debug, thiserror::Error)]
pub enum RequestError {
    #[error(transparent)]
    Transport(#[from] TransportError),
    #[error("server responded {status}: {body}")]
    Rejected { status: u16, body: String },
    #[error("unexpected response body: {0}")]
    BadResponse(String),
    #[error("record has no usable 'id' field")]
    MissingId,
}

/// Failure of an upload run. Batch and record failures carry the
/// starting index and the JSON that was being sent so the run can be
/// resumed by hand.
#[derive(Debug, thiserror::Error)]
pub enum SubmitError {
    #[error("failed at index {index}, data: {payload}")]
    Batch {
        index: usize,
        payload: String,
        #[source]
        source: RequestError,
    },
    #[error("record {index} failed, data: {payload}")]
    Record {
        index: usize,
        payload: String,
        #[source]
        source: RequestError,
    },
    #[error(transparent)]
    Request(#[from] RequestError),
    #[error(transparent)]
    Load(#[from] LoadError),
    #[error(transparent)]
    UnknownType(#[from] UnknownRecordType),
    #[error(transparent)]
    Transport(#[from] TransportError),
}

impl SubmitError {
    /// Index of the failing batch or record, if the failure had one.
    pub fn index(&self) -> Option<usize> {
        match self {
            SubmitError::Batch { index, .. } | SubmitError::Record { index, .. } => Some(*index),
            _ => None,
        }
    }
}
