// src/config.rs
//
// Runtime configuration
//
// Values come from the environment; anything unset falls back to the
// defaults below. The database lives in the platform data directory unless
// MOVIEHUB_DB points elsewhere.

use serde::Deserialize;
use std::path::PathBuf;

use crate::error::{AppError, AppResult};

pub const DEFAULT_LANGUAGE: &str = "en";
pub const TMDB_BASE_URL: &str = "https://api.themoviedb.org/3";
pub const OMDB_BASE_URL: &str = "https://www.omdbapi.com";

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
    /// SQLite file; `None` means `{data_dir}/moviehub/movies.db`
    pub database_path: Option<PathBuf>,
    pub tmdb_api_key: Option<String>,
    /// OMDb serves IMDb title data
    pub omdb_api_key: Option<String>,
    /// Used when the primary provider reports no original language
    pub default_language: String,
    pub tmdb_base_url: String,
    pub omdb_base_url: String,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            database_path: None,
            tmdb_api_key: None,
            omdb_api_key: None,
            default_language: DEFAULT_LANGUAGE.to_string(),
            tmdb_base_url: TMDB_BASE_URL.to_string(),
            omdb_base_url: OMDB_BASE_URL.to_string(),
        }
    }
}

impl CatalogConfig {
    /// Build configuration from `MOVIEHUB_*`, `TMDB_API_KEY` and
    /// `OMDB_API_KEY` environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let defaults = Self::default();

        Self {
            database_path: non_empty("MOVIEHUB_DB").map(PathBuf::from),
            tmdb_api_key: non_empty("TMDB_API_KEY"),
            omdb_api_key: non_empty("OMDB_API_KEY"),
            default_language: non_empty("MOVIEHUB_DEFAULT_LANGUAGE")
                .unwrap_or(defaults.default_language),
            tmdb_base_url: non_empty("MOVIEHUB_TMDB_URL").unwrap_or(defaults.tmdb_base_url),
            omdb_base_url: non_empty("MOVIEHUB_OMDB_URL").unwrap_or(defaults.omdb_base_url),
        }
    }

    /// Resolve the database file path, creating its parent directory.
    pub fn database_path(&self) -> AppResult<PathBuf> {
        let path = match &self.database_path {
            Some(path) => path.clone(),
            None => {
                let data_dir = dirs::data_dir().ok_or_else(|| {
                    AppError::Config("Could not determine app data directory".to_string())
                })?;
                data_dir.join("moviehub").join("movies.db")
            }
        };

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        Ok(path)
    }

    pub fn require_tmdb_key(&self) -> AppResult<&str> {
        self.tmdb_api_key
            .as_deref()
            .ok_or_else(|| AppError::Config("TMDB_API_KEY is not set".to_string()))
    }

    pub fn require_omdb_key(&self) -> AppResult<&str> {
        self.omdb_api_key
            .as_deref()
            .ok_or_else(|| AppError::Config("OMDB_API_KEY is not set".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults_when_environment_is_empty() {
        let config = CatalogConfig::from_lookup(|_| None);
        assert_eq!(config.default_language, "en");
        assert_eq!(config.tmdb_base_url, TMDB_BASE_URL);
        assert!(config.require_tmdb_key().is_err());
    }

    #[test]
    fn test_values_are_read_and_blanks_ignored() {
        let env: HashMap<&str, &str> = [
            ("TMDB_API_KEY", "abc"),
            ("MOVIEHUB_DEFAULT_LANGUAGE", "pt"),
            ("OMDB_API_KEY", "  "),
            ("MOVIEHUB_DB", "/tmp/movies.db"),
        ]
        .into_iter()
        .collect();

        let config = CatalogConfig::from_lookup(|k| env.get(k).map(|v| v.to_string()));

        assert_eq!(config.require_tmdb_key().unwrap(), "abc");
        assert_eq!(config.default_language, "pt");
        assert!(config.omdb_api_key.is_none());
        assert_eq!(config.database_path, Some(PathBuf::from("/tmp/movies.db")));
    }

    #[test]
    fn test_database_path_creates_parent() {
        let dir = tempfile::tempdir().unwrap();
        let config = CatalogConfig {
            database_path: Some(dir.path().join("nested").join("movies.db")),
            ..CatalogConfig::default()
        };

        let path = config.database_path().unwrap();
        assert!(path.parent().unwrap().is_dir());
    }
}
