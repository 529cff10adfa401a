// src/domain/snapshot.rs
//
// Indexer snapshots: frozen per-provider copies of what was fetched for a
// movie, plus the genre tags the merge assigned to each of them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{AttributeRecord, DomainError, DomainResult, ProviderSite};

/// A genre name scoped to one snapshot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenreTag {
    pub name: String,
}

impl GenreTag {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// One provider's raw record for one movie.
///
/// Identity is `(site, code)`. Owned by exactly one movie and removed only
/// when that movie is deleted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexerSnapshot {
    pub id: Uuid,
    pub movie_id: Uuid,
    pub site: ProviderSite,
    pub code: String,
    pub data: AttributeRecord,
    /// Merged tags that originated from this provider, in merge order
    pub genres: Vec<GenreTag>,
    pub created_at: DateTime<Utc>,
}

impl IndexerSnapshot {
    pub fn new(movie_id: Uuid, data: AttributeRecord) -> Self {
        Self {
            id: Uuid::new_v4(),
            movie_id,
            site: data.site,
            code: data.code.clone(),
            data,
            genres: Vec::new(),
            created_at: Utc::now(),
        }
    }

    /// Attach the merged tags for this snapshot's provider.
    pub fn with_genres(mut self, genres: Vec<GenreTag>) -> Self {
        self.genres = genres;
        self
    }
}

/// Validates IndexerSnapshot invariants
pub fn validate_snapshot(snapshot: &IndexerSnapshot) -> DomainResult<()> {
    if snapshot.code.trim().is_empty() {
        return Err(DomainError::InvariantViolation(
            "Snapshot code cannot be empty".to_string(),
        ));
    }

    if snapshot.site != snapshot.data.site || snapshot.code != snapshot.data.code {
        return Err(DomainError::InvariantViolation(format!(
            "Snapshot {}:{} does not match its payload {}:{}",
            snapshot.site, snapshot.code, snapshot.data.site, snapshot.data.code
        )));
    }

    Ok(())
}
