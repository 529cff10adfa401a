// src/integrations/tmdb/client.rs
//
// TMDB v3 REST client
//
// - Movie details mapped into `AttributeRecord` (provider A)
// - Cross-reference in both directions: /movie/{id}/external_ids for
//   TMDB -> IMDb, /find/{imdb_id} for IMDb -> TMDB
// - Title search and popular list for discovery
//
// No retry: a failed request surfaces as `ProviderUnavailable`.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use std::time::Duration;

use crate::domain::{imdb_title_id, normalize_code, AttributeRecord, ProviderSite};
use crate::error::{AppError, AppResult};
use crate::integrations::provider::{leading_year, CrossReference, MetadataProvider, SearchResult};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Deserialize)]
struct MovieDetail {
    id: u64,
    title: Option<String>,
    release_date: Option<String>,
    original_language: Option<String>,
    #[serde(default)]
    genres: Vec<Genre>,
}

#[derive(Debug, Deserialize)]
struct Genre {
    name: String,
}

#[derive(Debug, Deserialize)]
struct ExternalIds {
    imdb_id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct FindResponse {
    #[serde(default)]
    movie_results: Vec<MovieSummary>,
}

#[derive(Debug, Deserialize)]
struct PagedResponse {
    #[serde(default)]
    results: Vec<MovieSummary>,
}

#[derive(Debug, Deserialize)]
struct MovieSummary {
    id: u64,
    title: Option<String>,
    release_date: Option<String>,
    overview: Option<String>,
}

/// TMDB API Client
pub struct TmdbClient {
    base_url: String,
    api_key: String,
    http_client: Client,
}

impl TmdbClient {
    pub fn new(api_key: String, base_url: String) -> AppResult<Self> {
        let http_client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| AppError::Other(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
            http_client,
        })
    }

    /// Search movies by title, optionally narrowed by year and language.
    pub async fn search_movie(
        &self,
        query: &str,
        year: Option<i32>,
        language: Option<&str>,
    ) -> AppResult<Vec<SearchResult>> {
        let mut params = vec![("query", query.to_string())];
        if let Some(year) = year {
            params.push(("year", year.to_string()));
        }
        if let Some(language) = language {
            params.push(("language", language.to_string()));
        }

        let raw = self
            .get_json("/search/movie", &params)
            .await?
            .ok_or_else(|| self.unavailable("search endpoint returned 404"))?;
        let page: PagedResponse = decode(raw)?;

        Ok(page.results.into_iter().map(Self::map_summary).collect())
    }

    /// Currently popular movies.
    pub async fn popular(&self, language: Option<&str>) -> AppResult<Vec<SearchResult>> {
        let params: Vec<(&str, String)> = language
            .map(|l| vec![("language", l.to_string())])
            .unwrap_or_default();

        let raw = self
            .get_json("/movie/popular", &params)
            .await?
            .ok_or_else(|| self.unavailable("popular endpoint returned 404"))?;
        let page: PagedResponse = decode(raw)?;

        Ok(page.results.into_iter().map(Self::map_summary).collect())
    }

    // ========================================================================
    // INTERNAL: HTTP
    // ========================================================================

    /// GET a JSON document; `Ok(None)` on 404.
    async fn get_json(
        &self,
        path: &str,
        params: &[(&str, String)],
    ) -> AppResult<Option<serde_json::Value>> {
        let url = format!("{}{}", self.base_url, path);
        log::debug!("TMDB GET {}", path);

        let response = self
            .http_client
            .get(&url)
            .query(&[("api_key", self.api_key.as_str())])
            .query(params)
            .send()
            .await
            .map_err(|e| self.unavailable(format!("request to {} failed: {}", path, e)))?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }

        if !response.status().is_success() {
            return Err(self.unavailable(format!("{} returned status {}", path, response.status())));
        }

        let body = response
            .json::<serde_json::Value>()
            .await
            .map_err(|e| self.unavailable(format!("unreadable body from {}: {}", path, e)))?;

        Ok(Some(body))
    }

    fn unavailable(&self, message: impl Into<String>) -> AppError {
        AppError::ProviderUnavailable {
            site: ProviderSite::Tmdb,
            message: message.into(),
        }
    }

    // ========================================================================
    // INTERNAL: mapping
    // ========================================================================

    fn map_movie(code: &str, raw: serde_json::Value) -> AppResult<AttributeRecord> {
        let detail: MovieDetail = decode(raw.clone())?;

        if detail.id.to_string() != code {
            return Err(AppError::MalformedPayload(format!(
                "TMDB answered for id {} when asked for {}",
                detail.id, code
            )));
        }

        let release_date = detail.release_date.filter(|d| !d.trim().is_empty());

        Ok(AttributeRecord {
            site: ProviderSite::Tmdb,
            code: code.to_string(),
            title: detail.title,
            year: release_date.as_deref().and_then(leading_year),
            release_date,
            original_language: detail.original_language,
            genres: detail.genres.into_iter().map(|g| g.name).collect(),
            raw,
        })
    }

    fn map_summary(summary: MovieSummary) -> SearchResult {
        SearchResult {
            site: ProviderSite::Tmdb,
            code: summary.id.to_string(),
            title: summary.title.unwrap_or_default(),
            year: summary.release_date.as_deref().and_then(leading_year),
            overview: summary.overview.filter(|o| !o.is_empty()),
        }
    }

    fn imdb_code_from(ids: ExternalIds) -> Option<String> {
        ids.imdb_id
            .and_then(|id| normalize_code(ProviderSite::Imdb, &id).ok())
    }

    fn tmdb_code_from(found: FindResponse) -> Option<String> {
        found.movie_results.first().map(|m| m.id.to_string())
    }
}

fn decode<T>(raw: serde_json::Value) -> AppResult<T>
where
    T: for<'de> Deserialize<'de>,
{
    serde_json::from_value(raw)
        .map_err(|e| AppError::MalformedPayload(format!("TMDB payload: {}", e)))
}

#[async_trait]
impl MetadataProvider for TmdbClient {
    fn site(&self) -> ProviderSite {
        ProviderSite::Tmdb
    }

    async fn fetch_by_code(&self, code: &str) -> AppResult<AttributeRecord> {
        let raw = self
            .get_json(&format!("/movie/{}", code), &[])
            .await?
            .ok_or_else(|| AppError::ProviderNotFound {
                site: ProviderSite::Tmdb,
                code: code.to_string(),
            })?;

        Self::map_movie(code, raw)
    }
}

#[async_trait]
impl CrossReference for TmdbClient {
    async fn counterpart(&self, code: &str, from: ProviderSite) -> AppResult<Option<String>> {
        match from {
            ProviderSite::Tmdb => {
                let Some(raw) = self
                    .get_json(&format!("/movie/{}/external_ids", code), &[])
                    .await?
                else {
                    return Ok(None);
                };
                Ok(Self::imdb_code_from(decode(raw)?))
            }
            ProviderSite::Imdb => {
                let params = [("external_source", "imdb_id".to_string())];
                let Some(raw) = self
                    .get_json(&format!("/find/{}", imdb_title_id(code)), &params)
                    .await?
                else {
                    return Ok(None);
                };
                Ok(Self::tmdb_code_from(decode(raw)?))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_client_creation_trims_base_url() {
        let client = TmdbClient::new("key".to_string(), "https://example.test/3/".to_string()).unwrap();
        assert_eq!(client.base_url, "https://example.test/3");
    }

    #[test]
    fn test_movie_detail_mapping() {
        let raw = json!({
            "id": 603,
            "title": "The Matrix",
            "release_date": "1999-03-30",
            "original_language": "en",
            "genres": [{ "id": 28, "name": "Action" }, { "id": 878, "name": "Science Fiction" }],
            "imdb_id": "tt0133093"
        });

        let record = TmdbClient::map_movie("603", raw.clone()).unwrap();

        assert_eq!(record.title.as_deref(), Some("The Matrix"));
        assert_eq!(record.year, Some(1999));
        assert_eq!(record.release_date.as_deref(), Some("1999-03-30"));
        assert_eq!(record.original_language.as_deref(), Some("en"));
        assert_eq!(record.genres, vec!["Action", "Science Fiction"]);
        assert_eq!(record.raw, raw);
    }

    #[test]
    fn test_empty_release_date_is_absent() {
        let raw = json!({ "id": 1, "title": "Untitled", "release_date": "", "genres": [] });

        let record = TmdbClient::map_movie("1", raw).unwrap();

        assert_eq!(record.release_date, None);
        assert_eq!(record.year, None);
    }

    #[test]
    fn test_mismatched_or_broken_payload_is_malformed() {
        let wrong_id = json!({ "id": 2, "title": "Other" });
        assert!(matches!(
            TmdbClient::map_movie("1", wrong_id),
            Err(AppError::MalformedPayload(_))
        ));

        let no_id = json!({ "title": "Nothing" });
        assert!(matches!(
            TmdbClient::map_movie("1", no_id),
            Err(AppError::MalformedPayload(_))
        ));
    }

    #[test]
    fn test_cross_reference_payloads() {
        let ids: ExternalIds = decode(json!({ "imdb_id": "tt0133093", "facebook_id": null })).unwrap();
        assert_eq!(TmdbClient::imdb_code_from(ids).as_deref(), Some("133093"));

        let ids: ExternalIds = decode(json!({ "imdb_id": null })).unwrap();
        assert_eq!(TmdbClient::imdb_code_from(ids), None);

        let found: FindResponse =
            decode(json!({ "movie_results": [{ "id": 603, "title": "The Matrix" }], "tv_results": [] }))
                .unwrap();
        assert_eq!(TmdbClient::tmdb_code_from(found).as_deref(), Some("603"));

        let found: FindResponse = decode(json!({ "movie_results": [] })).unwrap();
        assert_eq!(TmdbClient::tmdb_code_from(found), None);
    }

    #[test]
    fn test_summary_mapping() {
        let summary: MovieSummary = decode(json!({
            "id": 496243,
            "title": "Parasite",
            "release_date": "2019-05-30",
            "overview": ""
        }))
        .unwrap();

        let result = TmdbClient::map_summary(summary);

        assert_eq!(result.code, "496243");
        assert_eq!(result.year, Some(2019));
        assert_eq!(result.overview, None);
    }
}
