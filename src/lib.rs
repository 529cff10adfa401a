// src/lib.rs
// MovieHub - Local-first movie library catalog
//
// Architecture:
// - Domain-centric: records, snapshots, genre merge and their invariants
// - Integrations map provider payloads into typed records at the boundary
// - Services own every write; repositories are plain SQL mappers
// - Event-driven: the catalog announces adds and deletes on the EventBus

pub mod config;
pub mod db;
pub mod domain;
pub mod error;
pub mod events;
pub mod integrations;
pub mod repositories;
pub mod services;

// ============================================================================
// PUBLIC API - Domain
// ============================================================================

pub use domain::{
    merge_genres, normalize_code, slugify, validate_movie, AttributeRecord, GenreTag,
    IndexerSnapshot, MergedGenre, MovieRecord, ProviderSite,
};

// ============================================================================
// PUBLIC API - Errors & configuration
// ============================================================================

pub use config::CatalogConfig;
pub use error::{AppError, AppResult};

// ============================================================================
// PUBLIC API - Events
// ============================================================================

pub use events::{create_event_bus, DomainEvent, EventBus, EventLogEntry, MovieAdded, MovieDeleted};

// ============================================================================
// PUBLIC API - Database & repositories
// ============================================================================

pub use db::{create_connection_pool, initialize_database, ConnectionPool};
pub use repositories::{MovieRepository, NewMovie, SqliteMovieRepository};

// ============================================================================
// PUBLIC API - Integrations & services
// ============================================================================

pub use integrations::{CrossReference, ImdbClient, MetadataProvider, SearchResult, TmdbClient};
pub use services::{CatalogService, RecordResolver};
