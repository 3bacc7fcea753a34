use thiserror::Error;

use crate::identifier::IdentifierError;

/// Errors related to talking to the asset service and walking asset trees.
#[derive(Debug, Error, PartialEq)]
pub enum Error {
    /// A required asset (or its payload) is absent.
    #[error("required asset is missing: {0}")]
    NullAsset(String),

    /// A function table references a function that is not registered.
    #[error("no such function: {0}")]
    NoSuchFunction(String),

    /// None of the candidate types matched the asset behind an id.
    #[error("unable to resolve the type of {id} (candidates: {candidates})")]
    TypeResolution { id: String, candidates: String },

    /// The asset service reported an unsuccessful operation.
    #[error("remote operation failed: {0}")]
    RemoteOperation(String),

    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("internal storage error: {0}")]
    StorageError(String),
}

impl From<IdentifierError> for Error {
    fn from(value: IdentifierError) -> Self {
        Error::InvalidRequest(value.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(value: serde_json::Error) -> Self {
        Error::StorageError(value.to_string())
    }
}

impl From<std::io::Error> for Error {
    fn from(value: std::io::Error) -> Self {
        if value.kind() == std::io::ErrorKind::InvalidInput {
            Error::InvalidRequest(value.to_string())
        } else {
            Error::StorageError(value.to_string())
        }
    }
}
