// src/integrations/mod.rs
//
// External metadata providers
//
// - TMDB: movie attributes, search, and the cross-reference in both directions
// - IMDb: title attributes, served through the OMDb API

pub mod imdb;
pub mod provider;
pub mod tmdb;

pub use imdb::client::ImdbClient;
pub use provider::{CrossReference, MetadataProvider, SearchResult};
pub use tmdb::client::TmdbClient;

#[cfg(test)]
pub use provider::{MockCrossReference, MockMetadataProvider};
