// src/error/types.rs
use crate::domain::{DomainError, ProviderSite};
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    /// The other provider has no entry for this code. Not retriable.
    #[error("No {target} counterpart for {site} code {code}")]
    CrossReferenceNotFound {
        site: ProviderSite,
        code: String,
        target: ProviderSite,
    },

    /// A metadata fetch failed (network, HTTP status, undecodable body).
    #[error("{site} is unavailable: {message}")]
    ProviderUnavailable { site: ProviderSite, message: String },

    #[error("{site} has no movie with code {code}")]
    ProviderNotFound { site: ProviderSite, code: String },

    /// Raised by the store when a snapshot (site, code) pair is already taken.
    #[error("A movie with this provider code is already cataloged")]
    DuplicateRecord,

    #[error("Invalid {site} code: {code:?}")]
    InvalidCode { site: ProviderSite, code: String },

    #[error("Malformed provider payload: {0}")]
    MalformedPayload(String),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Pool error: {0}")]
    Pool(String),

    #[error("Domain error: {0}")]
    Domain(#[from] DomainError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Resource not found")]
    NotFound,

    #[error("Other error: {0}")]
    Other(String),
}

impl AppError {
    /// Whether a SQLite error is a UNIQUE / PRIMARY KEY violation.
    pub fn is_unique_violation(err: &rusqlite::Error) -> bool {
        matches!(
            err,
            rusqlite::Error::SqliteFailure(e, _)
                if e.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
                    || e.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_PRIMARYKEY
        )
    }
}

impl Serialize for AppError {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl From<uuid::Error> for AppError {
    fn from(err: uuid::Error) -> Self {
        AppError::Other(format!("UUID error: {}", err))
    }
}

impl From<chrono::ParseError> for AppError {
    fn from(err: chrono::ParseError) -> Self {
        AppError::Other(format!("Date parse error: {}", err))
    }
}

impl From<r2d2::Error> for AppError {
    fn from(err: r2d2::Error) -> Self {
        AppError::Pool(err.to_string())
    }
}

pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cross_reference_message_names_both_sites() {
        let err = AppError::CrossReferenceNotFound {
            site: ProviderSite::Imdb,
            code: "133093".to_string(),
            target: ProviderSite::Tmdb,
        };
        assert_eq!(err.to_string(), "No tmdb counterpart for imdb code 133093");
    }

    #[test]
    fn test_serializes_as_message() {
        let err = AppError::NotFound;
        let json = serde_json::to_string(&err).unwrap();
        assert_eq!(json, "\"Resource not found\"");
    }
}
