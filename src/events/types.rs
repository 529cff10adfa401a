// src/events/types.rs
//
// Catalog events. Each one is an immutable fact that has already happened.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Trait that all domain events must implement
pub trait DomainEvent: std::fmt::Debug + Clone {
    /// Unique identifier for this event instance
    fn event_id(&self) -> Uuid;

    /// When this event occurred
    fn occurred_at(&self) -> DateTime<Utc>;

    /// Human-readable event type name
    fn event_type(&self) -> &'static str;
}

/// Emitted once, when a movie and its snapshots are committed
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MovieAdded {
    pub event_id: Uuid,
    pub occurred_at: DateTime<Utc>,
    pub movie_id: Uuid,
    pub name: String,
    pub year: Option<i32>,
    /// Provider the add was initiated from ("tmdb" / "imdb")
    pub source: String,
}

impl MovieAdded {
    pub fn new(movie_id: Uuid, name: String, year: Option<i32>, source: String) -> Self {
        Self {
            event_id: Uuid::new_v4(),
            occurred_at: Utc::now(),
            movie_id,
            name,
            year,
            source,
        }
    }
}

impl DomainEvent for MovieAdded {
    fn event_id(&self) -> Uuid { self.event_id }
    fn occurred_at(&self) -> DateTime<Utc> { self.occurred_at }
    fn event_type(&self) -> &'static str { "MovieAdded" }
}

/// Emitted after a movie (and, by cascade, its snapshots) is removed
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MovieDeleted {
    pub event_id: Uuid,
    pub occurred_at: DateTime<Utc>,
    pub movie_id: Uuid,
    pub name: String,
}

impl MovieDeleted {
    pub fn new(movie_id: Uuid, name: String) -> Self {
        Self {
            event_id: Uuid::new_v4(),
            occurred_at: Utc::now(),
            movie_id,
            name,
        }
    }
}

impl DomainEvent for MovieDeleted {
    fn event_id(&self) -> Uuid { self.event_id }
    fn occurred_at(&self) -> DateTime<Utc> { self.occurred_at }
    fn event_type(&self) -> &'static str { "MovieDeleted" }
}
