// src/domain/provider.rs
//
// Metadata provider identity and the typed attribute record each provider
// client produces.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::domain::{DomainError, DomainResult};

/// One of the two metadata providers a movie can be cataloged from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderSite {
    Tmdb,
    Imdb,
}

impl ProviderSite {
    /// The provider on the other side of a cross-reference.
    pub fn other(self) -> Self {
        match self {
            ProviderSite::Tmdb => ProviderSite::Imdb,
            ProviderSite::Imdb => ProviderSite::Tmdb,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ProviderSite::Tmdb => "tmdb",
            ProviderSite::Imdb => "imdb",
        }
    }
}

impl std::fmt::Display for ProviderSite {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ProviderSite {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "tmdb" => Ok(ProviderSite::Tmdb),
            "imdb" => Ok(ProviderSite::Imdb),
            other => Err(DomainError::InvariantViolation(format!(
                "Unknown provider site: {}",
                other
            ))),
        }
    }
}

/// Normalize a raw provider code into its canonical stored form.
///
/// IMDb codes lose their `tt` prefix; both providers' codes are reduced to
/// bare digits without leading zeros, so `tt0133093` and `133093` are the
/// same key.
pub fn normalize_code(site: ProviderSite, raw: &str) -> DomainResult<String> {
    let trimmed = raw.trim();
    let digits = match site {
        ProviderSite::Imdb => trimmed
            .strip_prefix("tt")
            .or_else(|| trimmed.strip_prefix("TT"))
            .unwrap_or(trimmed),
        ProviderSite::Tmdb => trimmed,
    };

    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(DomainError::InvariantViolation(format!(
            "{} code must be numeric, got {:?}",
            site, raw
        )));
    }

    let canonical = digits.trim_start_matches('0');
    if canonical.is_empty() {
        return Err(DomainError::InvariantViolation(format!(
            "{} code cannot be zero",
            site
        )));
    }

    Ok(canonical.to_string())
}

/// The external form of an IMDb code (`tt` + at least seven digits).
pub fn imdb_title_id(code: &str) -> String {
    format!("tt{:0>7}", code)
}

/// Flat attribute record returned by a metadata provider for one movie.
///
/// Absent values are `None`; the verbatim provider response is kept in `raw`
/// so a snapshot can be audited against what the provider actually sent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttributeRecord {
    pub site: ProviderSite,
    pub code: String,
    pub title: Option<String>,
    pub year: Option<i32>,
    /// ISO `YYYY-MM-DD`
    pub release_date: Option<String>,
    pub original_language: Option<String>,
    #[serde(default)]
    pub genres: Vec<String>,
    #[serde(default)]
    pub raw: serde_json::Value,
}

impl AttributeRecord {
    pub fn new(site: ProviderSite, code: impl Into<String>) -> Self {
        Self {
            site,
            code: code.into(),
            title: None,
            year: None,
            release_date: None,
            original_language: None,
            genres: Vec::new(),
            raw: serde_json::Value::Null,
        }
    }

    pub fn title(&self) -> Option<&str> {
        present(&self.title)
    }

    pub fn original_language(&self) -> Option<&str> {
        present(&self.original_language)
    }

    /// Four-digit year prefix of the release date.
    pub fn release_year(&self) -> Option<i32> {
        let date = present(&self.release_date)?;
        let prefix = date.get(..4)?;
        if !prefix.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        prefix.parse().ok()
    }

    /// Release date, when it parses as `YYYY-MM-DD`.
    pub fn parsed_release_date(&self) -> Option<NaiveDate> {
        let date = present(&self.release_date)?;
        NaiveDate::parse_from_str(date, "%Y-%m-%d").ok()
    }
}

/// Empty strings count as absent.
fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_imdb_prefix_and_zeros_are_stripped() {
        assert_eq!(normalize_code(ProviderSite::Imdb, "tt0133093").unwrap(), "133093");
        assert_eq!(normalize_code(ProviderSite::Imdb, " 133093 ").unwrap(), "133093");
    }

    #[test]
    fn test_tmdb_code_must_be_numeric() {
        assert_eq!(normalize_code(ProviderSite::Tmdb, "603").unwrap(), "603");
        assert!(normalize_code(ProviderSite::Tmdb, "tt603").is_err());
        assert!(normalize_code(ProviderSite::Tmdb, "").is_err());
        assert!(normalize_code(ProviderSite::Imdb, "tt").is_err());
        assert!(normalize_code(ProviderSite::Imdb, "tt0000000").is_err());
    }

    #[test]
    fn test_imdb_title_id_pads_to_seven_digits() {
        assert_eq!(imdb_title_id("133093"), "tt0133093");
        assert_eq!(imdb_title_id("10872600"), "tt10872600");
    }

    #[test]
    fn test_release_year_and_date() {
        let mut record = AttributeRecord::new(ProviderSite::Tmdb, "1");
        record.release_date = Some("2019-05-01".to_string());
        assert_eq!(record.release_year(), Some(2019));
        assert_eq!(
            record.parsed_release_date(),
            NaiveDate::from_ymd_opt(2019, 5, 1)
        );

        record.release_date = Some("2019".to_string());
        assert_eq!(record.release_year(), Some(2019));
        assert_eq!(record.parsed_release_date(), None);

        record.release_date = Some(String::new());
        assert_eq!(record.release_year(), None);
    }

    #[test]
    fn test_empty_title_is_absent() {
        let mut record = AttributeRecord::new(ProviderSite::Imdb, "1");
        record.title = Some("  ".to_string());
        assert_eq!(record.title(), None);
    }

    #[test]
    fn test_site_round_trips_through_str() {
        for site in [ProviderSite::Tmdb, ProviderSite::Imdb] {
            assert_eq!(site.as_str().parse::<ProviderSite>().unwrap(), site);
        }
        assert_eq!(ProviderSite::Tmdb.other(), ProviderSite::Imdb);
    }
}
