// src/repositories/mod.rs
//
// Repository layer
//
// RULES:
// - Repositories are data mappers
// - NO reconciliation or merge logic
// - NO event emission
// - Explicit SQL only

pub mod movie_repository;

pub use movie_repository::{MovieRepository, NewMovie, SqliteMovieRepository};

#[cfg(test)]
pub use movie_repository::MockMovieRepository;
