// src/integrations/imdb/client.rs
//
// IMDb title data through the OMDb API (provider B)
//
// OMDb reports missing values as "N/A", dates as "31 Mar 1999", and
// comma-separated language / genre names. All of that is normalized here so
// the record matches the TMDB-side shape.

use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

use crate::domain::{imdb_title_id, normalize_code, AttributeRecord, ProviderSite};
use crate::error::{AppError, AppResult};
use crate::integrations::provider::{leading_year, MetadataProvider, SearchResult};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct TitleResponse {
    response: String,
    error: Option<String>,
    title: Option<String>,
    year: Option<String>,
    released: Option<String>,
    language: Option<String>,
    genre: Option<String>,
    #[serde(rename = "imdbID")]
    imdb_id: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct SearchResponse {
    response: String,
    #[serde(default)]
    search: Vec<SearchHit>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct SearchHit {
    title: String,
    year: Option<String>,
    #[serde(rename = "imdbID")]
    imdb_id: String,
}

/// OMDb-backed IMDb client
pub struct ImdbClient {
    base_url: String,
    api_key: String,
    http_client: Client,
}

impl ImdbClient {
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

    /// Search movie titles.
    pub async fn search(&self, query: &str) -> AppResult<Vec<SearchResult>> {
        let raw = self
            .get_json(&[("s", query.to_string()), ("type", "movie".to_string())])
            .await?;
        let response: SearchResponse = decode(raw)?;

        // OMDb answers "Movie not found!" with Response=False for empty results.
        if response.response != "True" {
            return Ok(Vec::new());
        }

        Ok(response
            .search
            .into_iter()
            .filter_map(|hit| {
                let code = normalize_code(ProviderSite::Imdb, &hit.imdb_id).ok()?;
                Some(SearchResult {
                    site: ProviderSite::Imdb,
                    code,
                    title: hit.title,
                    year: hit.year.as_deref().and_then(leading_year),
                    overview: None,
                })
            })
            .collect())
    }

    async fn get_json(&self, params: &[(&str, String)]) -> AppResult<serde_json::Value> {
        let response = self
            .http_client
            .get(format!("{}/", self.base_url))
            .query(&[("apikey", self.api_key.as_str())])
            .query(params)
            .send()
            .await
            .map_err(|e| self.unavailable(format!("request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(self.unavailable(format!("returned status {}", response.status())));
        }

        response
            .json::<serde_json::Value>()
            .await
            .map_err(|e| self.unavailable(format!("unreadable body: {}", e)))
    }

    fn unavailable(&self, message: impl Into<String>) -> AppError {
        AppError::ProviderUnavailable {
            site: ProviderSite::Imdb,
            message: message.into(),
        }
    }

    fn map_title(code: &str, raw: serde_json::Value) -> AppResult<AttributeRecord> {
        let title: TitleResponse = decode(raw.clone())?;

        if title.response != "True" {
            let reason = title.error.unwrap_or_default();
            // Invalid and unknown ids both come back as Response=False.
            if reason.contains("not found") || reason.contains("Incorrect IMDb ID") {
                return Err(AppError::ProviderNotFound {
                    site: ProviderSite::Imdb,
                    code: code.to_string(),
                });
            }
            return Err(AppError::ProviderUnavailable {
                site: ProviderSite::Imdb,
                message: reason,
            });
        }

        if let Some(returned) = title.imdb_id.as_deref() {
            if normalize_code(ProviderSite::Imdb, returned).ok().as_deref() != Some(code) {
                return Err(AppError::MalformedPayload(format!(
                    "OMDb answered for {} when asked for {}",
                    returned,
                    imdb_title_id(code)
                )));
            }
        }

        Ok(AttributeRecord {
            site: ProviderSite::Imdb,
            code: code.to_string(),
            title: available(title.title),
            year: available(title.year).as_deref().and_then(leading_year),
            release_date: available(title.released).and_then(|d| iso_date(&d)),
            original_language: available(title.language)
                .as_deref()
                .and_then(first_listed)
                .and_then(language_code),
            genres: available(title.genre)
                .map(|g| split_list(&g))
                .unwrap_or_default(),
            raw,
        })
    }
}

#[async_trait]
impl MetadataProvider for ImdbClient {
    fn site(&self) -> ProviderSite {
        ProviderSite::Imdb
    }

    async fn fetch_by_code(&self, code: &str) -> AppResult<AttributeRecord> {
        log::debug!("OMDb GET {}", imdb_title_id(code));
        let raw = self.get_json(&[("i", imdb_title_id(code))]).await?;
        Self::map_title(code, raw)
    }
}

fn decode<T>(raw: serde_json::Value) -> AppResult<T>
where
    T: for<'de> Deserialize<'de>,
{
    serde_json::from_value(raw)
        .map_err(|e| AppError::MalformedPayload(format!("OMDb payload: {}", e)))
}

/// "N/A" and blanks are absent.
fn available(value: Option<String>) -> Option<String> {
    value.filter(|v| {
        let v = v.trim();
        !v.is_empty() && v != "N/A"
    })
}

/// "31 Mar 1999" -> "1999-03-31"
fn iso_date(value: &str) -> Option<String> {
    NaiveDate::parse_from_str(value.trim(), "%d %b %Y")
        .ok()
        .map(|d| d.format("%Y-%m-%d").to_string())
}

fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

fn first_listed(value: &str) -> Option<&str> {
    value.split(',').map(str::trim).find(|s| !s.is_empty())
}

/// TMDB `original_language` code for the language names OMDb commonly
/// reports (mostly ISO 639-1; Cantonese is TMDB's "cn").
fn language_code(name: &str) -> Option<String> {
    let code = match name.to_ascii_lowercase().as_str() {
        "english" => "en",
        "japanese" => "ja",
        "korean" => "ko",
        "french" => "fr",
        "german" => "de",
        "spanish" => "es",
        "italian" => "it",
        "portuguese" => "pt",
        "russian" => "ru",
        "mandarin" | "chinese" => "zh",
        "cantonese" => "cn",
        "hindi" => "hi",
        "swedish" => "sv",
        "danish" => "da",
        "norwegian" => "no",
        "dutch" => "nl",
        "polish" => "pl",
        "turkish" => "tr",
        "persian" => "fa",
        "arabic" => "ar",
        _ => return None,
    };
    Some(code.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn matrix() -> serde_json::Value {
        json!({
            "Title": "The Matrix",
            "Year": "1999",
            "Released": "31 Mar 1999",
            "Genre": "Action, Sci-Fi",
            "Language": "English",
            "imdbID": "tt0133093",
            "Response": "True"
        })
    }

    #[test]
    fn test_title_mapping() {
        let record = ImdbClient::map_title("133093", matrix()).unwrap();

        assert_eq!(record.site, ProviderSite::Imdb);
        assert_eq!(record.title.as_deref(), Some("The Matrix"));
        assert_eq!(record.year, Some(1999));
        assert_eq!(record.release_date.as_deref(), Some("1999-03-31"));
        assert_eq!(record.original_language.as_deref(), Some("en"));
        assert_eq!(record.genres, vec!["Action", "Sci-Fi"]);
        assert_eq!(record.raw, matrix());
    }

    #[test]
    fn test_not_available_values_are_absent() {
        let raw = json!({
            "Title": "Obscure Short",
            "Year": "N/A",
            "Released": "N/A",
            "Genre": "N/A",
            "Language": "Klingon",
            "imdbID": "tt0000001",
            "Response": "True"
        });

        let record = ImdbClient::map_title("1", raw).unwrap();

        assert_eq!(record.year, None);
        assert_eq!(record.release_date, None);
        assert_eq!(record.original_language, None);
        assert!(record.genres.is_empty());
    }

    #[test]
    fn test_unknown_id_is_not_found() {
        let raw = json!({ "Response": "False", "Error": "Incorrect IMDb ID." });

        let result = ImdbClient::map_title("9999999", raw);

        assert!(matches!(result, Err(AppError::ProviderNotFound { .. })));
    }

    #[test]
    fn test_api_error_is_unavailable() {
        let raw = json!({ "Response": "False", "Error": "Request limit reached!" });

        let result = ImdbClient::map_title("133093", raw);

        assert!(matches!(result, Err(AppError::ProviderUnavailable { .. })));
    }

    #[test]
    fn test_answer_for_other_title_is_malformed() {
        let result = ImdbClient::map_title("1", matrix());
        assert!(matches!(result, Err(AppError::MalformedPayload(_))));
    }

    #[test]
    fn test_helpers() {
        assert_eq!(iso_date("01 May 2019").as_deref(), Some("2019-05-01"));
        assert_eq!(iso_date("May 2019"), None);
        assert_eq!(first_listed(" , Korean, English"), Some("Korean"));
        assert_eq!(split_list("Drama, Thriller,"), vec!["Drama", "Thriller"]);
        assert_eq!(language_code("Cantonese").as_deref(), Some("cn"));
        assert_eq!(language_code("Korean").as_deref(), Some("ko"));
    }
}
