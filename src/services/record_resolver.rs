// src/services/record_resolver.rs
//
// Record Resolver
//
// Turns one provider code into the canonical movie fields plus one frozen
// snapshot per provider.
//
// - Cross-reference first: no counterpart means no record
// - Each provider is fetched exactly once, both fetches concurrently
// - Field precedence: primary provider wins, secondary fills gaps
// - Performs no writes; persisting is the catalog service's job

use std::sync::Arc;

use crate::domain::{
    normalize_code, validate_movie, AttributeRecord, IndexerSnapshot, MovieRecord, ProviderSite,
};
use crate::error::{AppError, AppResult};
use crate::integrations::{CrossReference, MetadataProvider};
use crate::services::title_locks::TitleKey;

/// The same title's code on each provider
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodePair {
    pub tmdb: String,
    pub imdb: String,
}

impl CodePair {
    pub fn from_source(source: ProviderSite, code: String, counterpart: String) -> Self {
        match source {
            ProviderSite::Tmdb => Self {
                tmdb: code,
                imdb: counterpart,
            },
            ProviderSite::Imdb => Self {
                tmdb: counterpart,
                imdb: code,
            },
        }
    }

    pub fn code(&self, site: ProviderSite) -> &str {
        match site {
            ProviderSite::Tmdb => &self.tmdb,
            ProviderSite::Imdb => &self.imdb,
        }
    }

    pub fn key(&self) -> TitleKey {
        TitleKey {
            tmdb: self.tmdb.clone(),
            imdb: self.imdb.clone(),
        }
    }
}

/// Outcome of one resolution pass; nothing here has been persisted
#[derive(Debug, Clone)]
pub struct Resolution {
    pub movie: MovieRecord,
    /// `[primary, secondary]`
    pub snapshots: [IndexerSnapshot; 2],
}

impl Resolution {
    pub fn snapshot(&self, site: ProviderSite) -> &IndexerSnapshot {
        if self.snapshots[0].site == site {
            &self.snapshots[0]
        } else {
            &self.snapshots[1]
        }
    }
}

pub struct RecordResolver {
    tmdb: Arc<dyn MetadataProvider>,
    imdb: Arc<dyn MetadataProvider>,
    cross_reference: Arc<dyn CrossReference>,
}

impl RecordResolver {
    pub fn new(
        tmdb: Arc<dyn MetadataProvider>,
        imdb: Arc<dyn MetadataProvider>,
        cross_reference: Arc<dyn CrossReference>,
    ) -> Self {
        Self {
            tmdb,
            imdb,
            cross_reference,
        }
    }

    /// Full resolution of `id` (a `source` code) with `primary` taking
    /// precedence for every reconciled field.
    pub async fn resolve(
        &self,
        id: &str,
        source: ProviderSite,
        primary: ProviderSite,
        fallback_language: &str,
    ) -> AppResult<Resolution> {
        let code = normalize_code(source, id).map_err(|_| AppError::InvalidCode {
            site: source,
            code: id.to_string(),
        })?;

        let pair = self.counterpart(&code, source).await?;
        self.resolve_pair(&pair, primary, fallback_language).await
    }

    /// Step 1: find the other provider's code for a canonical `code`.
    pub async fn counterpart(&self, code: &str, source: ProviderSite) -> AppResult<CodePair> {
        let target = source.other();
        let not_found = || AppError::CrossReferenceNotFound {
            site: source,
            code: code.to_string(),
            target,
        };

        let raw = self
            .cross_reference
            .counterpart(code, source)
            .await?
            .ok_or_else(not_found)?;

        let counterpart = normalize_code(target, &raw).map_err(|_| not_found())?;
        log::debug!("{} {} cross-references {} {}", source, code, target, counterpart);

        Ok(CodePair::from_source(source, code.to_string(), counterpart))
    }

    /// Steps 2-4: fetch both providers, reconcile, snapshot.
    pub async fn resolve_pair(
        &self,
        pair: &CodePair,
        primary: ProviderSite,
        fallback_language: &str,
    ) -> AppResult<Resolution> {
        let (tmdb, imdb) = tokio::try_join!(
            Self::fetch(self.tmdb.as_ref(), &pair.tmdb),
            Self::fetch(self.imdb.as_ref(), &pair.imdb),
        )?;

        let (primary_record, secondary_record) = match primary {
            ProviderSite::Tmdb => (tmdb, imdb),
            ProviderSite::Imdb => (imdb, tmdb),
        };

        let movie = reconcile(&primary_record, &secondary_record, fallback_language)?;

        Ok(Resolution {
            snapshots: [
                IndexerSnapshot::new(movie.id, primary_record),
                IndexerSnapshot::new(movie.id, secondary_record),
            ],
            movie,
        })
    }

    async fn fetch(provider: &dyn MetadataProvider, code: &str) -> AppResult<AttributeRecord> {
        let site = provider.site();
        let record = match provider.fetch_by_code(code).await {
            Ok(record) => record,
            // A cross-referenced code the provider cannot serve is an outage
            // from the caller's point of view.
            Err(AppError::ProviderNotFound { site, code }) => {
                return Err(AppError::ProviderUnavailable {
                    site,
                    message: format!("no movie with code {}", code),
                })
            }
            Err(e) => return Err(e),
        };

        if record.site != site || record.code != code {
            return Err(AppError::MalformedPayload(format!(
                "{} returned {}:{} for code {}",
                site, record.site, record.code, code
            )));
        }

        Ok(record)
    }
}

/// Apply field precedence to two fetched records.
pub fn reconcile(
    primary: &AttributeRecord,
    secondary: &AttributeRecord,
    fallback_language: &str,
) -> AppResult<MovieRecord> {
    let name = primary
        .title()
        .or_else(|| secondary.title())
        .ok_or_else(|| {
            AppError::MalformedPayload(format!(
                "neither {} {} nor {} {} has a title",
                primary.site, primary.code, secondary.site, secondary.code
            ))
        })?;

    let year = primary.year.or_else(|| secondary.release_year());

    let mut movie = MovieRecord::new(name.to_string(), year);

    movie.date = secondary
        .parsed_release_date()
        .or_else(|| primary.parsed_release_date());

    movie.language = primary
        .original_language()
        .or(Some(fallback_language).filter(|l| !l.trim().is_empty()))
        .map(str::to_string);

    validate_movie(&movie)?;
    Ok(movie)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::integrations::{MockCrossReference, MockMetadataProvider};
    use chrono::NaiveDate;

    fn tmdb_record(code: &str) -> AttributeRecord {
        let mut record = AttributeRecord::new(ProviderSite::Tmdb, code);
        record.title = Some("Parasite".to_string());
        record.year = Some(2019);
        record.release_date = Some("2019-05-30".to_string());
        record.original_language = Some("ko".to_string());
        record.genres = vec!["Comedy".to_string(), "Thriller".to_string()];
        record
    }

    fn imdb_record(code: &str) -> AttributeRecord {
        let mut record = AttributeRecord::new(ProviderSite::Imdb, code);
        record.title = Some("Gisaengchung".to_string());
        record.year = Some(2019);
        record.release_date = Some("2019-11-08".to_string());
        record.original_language = Some("ko".to_string());
        record.genres = vec!["Drama".to_string(), "Thriller".to_string()];
        record
    }

    fn provider(site: ProviderSite, calls: usize) -> MockMetadataProvider {
        let mut mock = MockMetadataProvider::new();
        mock.expect_site().return_const(site);
        mock.expect_fetch_by_code().times(calls).returning(move |code| {
            Ok(match site {
                ProviderSite::Tmdb => tmdb_record(code),
                ProviderSite::Imdb => imdb_record(code),
            })
        });
        mock
    }

    fn cross_reference(answer: Option<&'static str>) -> MockCrossReference {
        let mut mock = MockCrossReference::new();
        mock.expect_counterpart()
            .times(1)
            .returning(move |_, _| Ok(answer.map(str::to_string)));
        mock
    }

    #[test]
    fn test_primary_title_wins() {
        let movie = reconcile(&tmdb_record("496243"), &imdb_record("6751668"), "en").unwrap();
        assert_eq!(movie.name, "Parasite");

        let movie = reconcile(&imdb_record("6751668"), &tmdb_record("496243"), "en").unwrap();
        assert_eq!(movie.name, "Gisaengchung");
    }

    #[test]
    fn test_empty_primary_title_falls_back() {
        let mut primary = imdb_record("6751668");
        primary.title = Some(String::new());

        let movie = reconcile(&primary, &tmdb_record("496243"), "en").unwrap();

        assert_eq!(movie.name, "Parasite");
    }

    #[test]
    fn test_no_title_anywhere_is_malformed() {
        let mut primary = imdb_record("1");
        primary.title = None;
        let mut secondary = tmdb_record("2");
        secondary.title = Some("  ".to_string());

        let result = reconcile(&primary, &secondary, "en");

        assert!(matches!(result, Err(AppError::MalformedPayload(_))));
    }

    #[test]
    fn test_year_falls_back_to_secondary_release_date() {
        let mut primary = imdb_record("1");
        primary.year = None;
        let mut secondary = tmdb_record("2");
        secondary.year = None;
        secondary.release_date = Some("2019-05-01".to_string());

        let movie = reconcile(&primary, &secondary, "en").unwrap();

        assert_eq!(movie.year, Some(2019));
    }

    #[test]
    fn test_year_left_unset_without_sources() {
        let mut primary = imdb_record("1");
        primary.year = None;
        primary.release_date = None;
        let mut secondary = tmdb_record("2");
        secondary.release_date = None;

        let movie = reconcile(&primary, &secondary, "en").unwrap();

        assert_eq!(movie.year, None);
        assert_eq!(movie.date, None);
    }

    #[test]
    fn test_date_prefers_secondary_then_primary() {
        let movie = reconcile(&imdb_record("1"), &tmdb_record("2"), "en").unwrap();
        assert_eq!(movie.date, NaiveDate::from_ymd_opt(2019, 5, 30));

        let mut secondary = tmdb_record("2");
        secondary.release_date = Some("sometime".to_string());
        let movie = reconcile(&imdb_record("1"), &secondary, "en").unwrap();
        assert_eq!(movie.date, NaiveDate::from_ymd_opt(2019, 11, 8));
    }

    #[test]
    fn test_non_ascii_title_without_dates_reconciles() {
        let mut primary = imdb_record("47478");
        primary.title = Some("七人の侍".to_string());
        primary.year = None;
        primary.release_date = None;
        let mut secondary = tmdb_record("346");
        secondary.title = Some("七人の侍".to_string());
        secondary.year = None;
        secondary.release_date = None;

        let movie = reconcile(&primary, &secondary, "en").unwrap();

        assert_eq!(movie.name, "七人の侍");
        assert_eq!(movie.year, None);
        assert_eq!(movie.date, None);
        assert!(!movie.slug.is_empty());
    }

    #[test]
    fn test_language_falls_back_to_default() {
        let mut primary = tmdb_record("1");
        primary.original_language = Some(String::new());

        let movie = reconcile(&primary, &imdb_record("2"), "pt").unwrap();

        assert_eq!(movie.language.as_deref(), Some("pt"));
    }

    #[tokio::test]
    async fn test_resolve_from_imdb_fetches_each_provider_once() {
        let resolver = RecordResolver::new(
            Arc::new(provider(ProviderSite::Tmdb, 1)),
            Arc::new(provider(ProviderSite::Imdb, 1)),
            Arc::new(cross_reference(Some("496243"))),
        );

        let resolution = resolver
            .resolve("tt6751668", ProviderSite::Imdb, ProviderSite::Imdb, "en")
            .await
            .unwrap();

        assert_eq!(resolution.movie.name, "Gisaengchung");
        assert_eq!(resolution.snapshots[0].site, ProviderSite::Imdb);
        assert_eq!(resolution.snapshots[0].code, "6751668");
        assert_eq!(resolution.snapshot(ProviderSite::Tmdb).code, "496243");
        assert_eq!(resolution.snapshot(ProviderSite::Tmdb).data, tmdb_record("496243"));
        assert!(resolution
            .snapshots
            .iter()
            .all(|s| s.movie_id == resolution.movie.id));
    }

    #[tokio::test]
    async fn test_missing_counterpart_fails_before_fetching() {
        let resolver = RecordResolver::new(
            Arc::new(provider(ProviderSite::Tmdb, 0)),
            Arc::new(provider(ProviderSite::Imdb, 0)),
            Arc::new(cross_reference(None)),
        );

        let result = resolver
            .resolve("603", ProviderSite::Tmdb, ProviderSite::Tmdb, "en")
            .await;

        assert!(matches!(
            result,
            Err(AppError::CrossReferenceNotFound {
                site: ProviderSite::Tmdb,
                target: ProviderSite::Imdb,
                ..
            })
        ));
    }

    #[tokio::test]
    async fn test_empty_id_is_rejected() {
        let mut cross = MockCrossReference::new();
        cross.expect_counterpart().times(0);
        let resolver = RecordResolver::new(
            Arc::new(provider(ProviderSite::Tmdb, 0)),
            Arc::new(provider(ProviderSite::Imdb, 0)),
            Arc::new(cross),
        );

        let result = resolver
            .resolve("", ProviderSite::Imdb, ProviderSite::Imdb, "en")
            .await;

        assert!(matches!(result, Err(AppError::InvalidCode { .. })));
    }

    #[tokio::test]
    async fn test_fetch_failure_is_provider_unavailable() {
        let mut imdb = MockMetadataProvider::new();
        imdb.expect_site().return_const(ProviderSite::Imdb);
        imdb.expect_fetch_by_code().times(1).returning(|code| {
            Err(AppError::ProviderNotFound {
                site: ProviderSite::Imdb,
                code: code.to_string(),
            })
        });

        // try_join! may stop before the tmdb fetch is polled
        let mut tmdb = MockMetadataProvider::new();
        tmdb.expect_site().return_const(ProviderSite::Tmdb);
        tmdb.expect_fetch_by_code()
            .times(0..=1)
            .returning(|code| Ok(tmdb_record(code)));

        let resolver = RecordResolver::new(
            Arc::new(tmdb),
            Arc::new(imdb),
            Arc::new(cross_reference(Some("tt0133093"))),
        );

        let result = resolver
            .resolve("603", ProviderSite::Tmdb, ProviderSite::Tmdb, "en")
            .await;

        assert!(matches!(
            result,
            Err(AppError::ProviderUnavailable {
                site: ProviderSite::Imdb,
                ..
            })
        ));
    }
}
