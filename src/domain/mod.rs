// src/domain/mod.rs
//
// Domain Root - the single source of truth for the domain API.
// All other modules import from `crate::domain::*`

pub mod genres;
pub mod movie;
pub mod provider;
pub mod snapshot;

pub use genres::{merge_genres, tags_for, MergedGenre};
pub use movie::{slugify, validate_movie, MovieRecord};
pub use provider::{imdb_title_id, normalize_code, AttributeRecord, ProviderSite};
pub use snapshot::{validate_snapshot, GenreTag, IndexerSnapshot};

use thiserror::Error;

/// Domain-level errors
/// These represent violations of business rules and invariants
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Invariant violation: {0}")]
    InvariantViolation(String),

    #[error("Entity not found: {0}")]
    NotFound(String),
}

/// Domain result type
pub type DomainResult<T> = Result<T, DomainError>;
