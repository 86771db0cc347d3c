//! Error types for the CloudAMQP provider

use std::num::ParseIntError;

use thiserror::Error;

/// Result type alias using the provider Error
pub type Result<T> = std::result::Result<T, Error>;

/// Provider error types
#[derive(Error, Debug)]
pub enum Error {
    #[error("invalid instance id {id:?}: {source}")]
    InvalidId {
        id: String,
        #[source]
        source: ParseIntError,
    },

    #[error(transparent)]
    Api(#[from] ApiError),

    #[error("Error updating CloudAMQP instance {name}: {source}")]
    UpdateFailed {
        name: String,
        #[source]
        source: ApiError,
    },

    #[error("attribute {field:?} must be {expected}")]
    Decode {
        field: &'static str,
        expected: &'static str,
    },

    #[error("missing required attribute {0:?}")]
    MissingField(&'static str),

    #[error("attribute {0:?} is computed and cannot be set in configuration")]
    ComputedField(&'static str),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("provider has not been configured")]
    NotConfigured,

    #[error("Unknown resource type: {0}")]
    UnknownResourceType(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Failures reported by the CloudAMQP management API
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("instance {id} not found")]
    NotFound { id: i64 },

    #[error("API request failed ({status}): {message}")]
    Status { status: u16, message: String },

    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("unexpected response body: {0}")]
    Decode(String),
}

impl ApiError {
    /// Whether the API confirmed the instance does not exist
    pub fn is_not_found(&self) -> bool {
        matches!(self, ApiError::NotFound { .. })
    }
}

impl Error {
    /// Short summary used when the error is turned into a diagnostic
    pub fn summary(&self) -> &'static str {
        match self {
            Error::InvalidId { .. } => "Invalid resource identifier",
            Error::Api(_) | Error::UpdateFailed { .. } => "CloudAMQP API error",
            Error::Decode { .. } | Error::MissingField(_) | Error::ComputedField(_) => {
                "Invalid resource configuration"
            }
            Error::InvalidConfig(_) | Error::NotConfigured => "Invalid provider configuration",
            Error::UnknownResourceType(_) => "Unsupported resource type",
            Error::Serialization(_) => "Failed to encode state",
        }
    }

    /// Attribute the error refers to, if any
    pub fn attribute(&self) -> Option<&'static str> {
        match self {
            Error::Decode { field, .. } => Some(*field),
            Error::MissingField(field) | Error::ComputedField(field) => Some(*field),
            _ => None,
        }
    }
}
