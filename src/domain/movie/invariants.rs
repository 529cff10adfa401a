use super::entity::MovieRecord;
use crate::domain::{DomainError, DomainResult};

/// Validates all MovieRecord invariants
pub fn validate_movie(movie: &MovieRecord) -> DomainResult<()> {
    if movie.name.trim().is_empty() {
        return Err(DomainError::InvariantViolation(
            "Movie name cannot be empty".to_string(),
        ));
    }

    if movie.slug.is_empty() {
        return Err(DomainError::InvariantViolation(format!(
            "Movie {:?} produced an empty slug",
            movie.name
        )));
    }

    if let Some(year) = movie.year {
        if !(1000..=9999).contains(&year) {
            return Err(DomainError::InvariantViolation(format!(
                "Movie year {} is not a four-digit year",
                year
            )));
        }
    }

    if let Some(language) = &movie.language {
        if language.trim().is_empty() {
            return Err(DomainError::InvariantViolation(
                "Movie language cannot be an empty string".to_string(),
            ));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_movie() {
        let movie = MovieRecord::new("Heat".to_string(), Some(1995));
        assert!(validate_movie(&movie).is_ok());
    }

    #[test]
    fn test_empty_name_fails() {
        let movie = MovieRecord::new("   ".to_string(), Some(1995));
        assert!(validate_movie(&movie).is_err());
    }

    #[test]
    fn test_non_ascii_name_without_year_is_valid() {
        let movie = MovieRecord::new("七人の侍".to_string(), None);
        assert!(validate_movie(&movie).is_ok());
    }

    #[test]
    fn test_implausible_year_fails() {
        let movie = MovieRecord::new("Heat".to_string(), Some(95));
        assert!(validate_movie(&movie).is_err());
    }
}
