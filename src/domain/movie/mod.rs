pub mod entity;
pub mod invariants;

pub use entity::{slugify, MovieRecord};
pub use invariants::validate_movie;
