// src/services/catalog_service.rs
//
// Catalog Service - the only writer of movies.
//
// add: START -> EXISTENCE_CHECK -> FOUND: return | MISS: cross-reference ->
//      lock title -> re-check -> resolve -> merge genres -> persist -> return
//
// A title is stored at most once no matter which provider code it is added
// by, in which order, or how many adds race for it.

use std::sync::Arc;
use uuid::Uuid;

use crate::domain::{
    merge_genres, normalize_code, tags_for, validate_snapshot, IndexerSnapshot, MergedGenre,
    MovieRecord, ProviderSite,
};
use crate::error::{AppError, AppResult};
use crate::events::{EventBus, MovieAdded, MovieDeleted};
use crate::repositories::{MovieRepository, NewMovie};
use crate::services::record_resolver::{CodePair, RecordResolver, Resolution};
use crate::services::title_locks::TitleLocks;

/// Insert attempts before a duplicate race is reported to the caller
const MAX_PERSIST_ATTEMPTS: usize = 3;

pub struct CatalogService {
    store: Arc<dyn MovieRepository>,
    resolver: RecordResolver,
    event_bus: Arc<EventBus>,
    locks: TitleLocks,
    default_language: String,
}

impl CatalogService {
    pub fn new(
        store: Arc<dyn MovieRepository>,
        resolver: RecordResolver,
        event_bus: Arc<EventBus>,
        default_language: String,
    ) -> Self {
        Self {
            store,
            resolver,
            event_bus,
            locks: TitleLocks::new(),
            default_language,
        }
    }

    /// Catalog a movie by its TMDB id.
    pub async fn add_by_tmdb(&self, code: &str, language: Option<&str>) -> AppResult<MovieRecord> {
        self.add(ProviderSite::Tmdb, code, language).await
    }

    /// Catalog a movie by its IMDb id ("tt0133093" or "133093").
    pub async fn add_by_imdb(&self, code: &str, language: Option<&str>) -> AppResult<MovieRecord> {
        self.add(ProviderSite::Imdb, code, language).await
    }

    async fn add(
        &self,
        source: ProviderSite,
        raw_code: &str,
        language: Option<&str>,
    ) -> AppResult<MovieRecord> {
        let code = normalize_code(source, raw_code).map_err(|_| AppError::InvalidCode {
            site: source,
            code: raw_code.to_string(),
        })?;

        if let Some(existing) = self.store.find_by_provider_code(source, &code)? {
            log::debug!("{} {} already cataloged as {}", source, code, existing.id);
            return Ok(existing);
        }

        let pair = self.resolver.counterpart(&code, source).await?;

        let _guard = self.locks.lock(pair.key()).await;

        // Another add may have committed this title (under either code)
        // while we were cross-referencing or waiting for the lock.
        if let Some(existing) = self.find_either(&pair)? {
            log::debug!(
                "{} {} matched existing movie {} via {}",
                source,
                code,
                existing.id,
                source.other()
            );
            return Ok(existing);
        }

        let fallback_language = language
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .unwrap_or(self.default_language.as_str());

        let resolution = self
            .resolver
            .resolve_pair(&pair, source, fallback_language)
            .await?;

        let new_movie = Self::assemble(resolution, source);
        for snapshot in &new_movie.snapshots {
            validate_snapshot(snapshot)?;
        }

        self.persist(new_movie, &pair, source)
    }

    /// Attach merged genre tags to the resolved snapshots.
    fn assemble(resolution: Resolution, source: ProviderSite) -> NewMovie {
        let genres: Vec<MergedGenre> = merge_genres(
            &resolution.snapshot(ProviderSite::Tmdb).data,
            &resolution.snapshot(ProviderSite::Imdb).data,
            source == ProviderSite::Tmdb,
        );

        let Resolution { movie, snapshots } = resolution;
        let snapshots = snapshots
            .into_iter()
            .map(|snapshot| {
                let tags = tags_for(&genres, snapshot.site);
                snapshot.with_genres(tags)
            })
            .collect();

        NewMovie {
            movie,
            snapshots,
            genres,
        }
    }

    fn persist(
        &self,
        new_movie: NewMovie,
        pair: &CodePair,
        source: ProviderSite,
    ) -> AppResult<MovieRecord> {
        for attempt in 1..=MAX_PERSIST_ATTEMPTS {
            match self.store.insert(&new_movie) {
                Ok(()) => {
                    let movie = new_movie.movie;
                    log::info!(
                        "Cataloged {:?} ({}) as {} [tmdb {} / imdb {}]",
                        movie.name,
                        movie.year.map(|y| y.to_string()).unwrap_or_else(|| "-".to_string()),
                        movie.id,
                        pair.tmdb,
                        pair.imdb
                    );
                    self.event_bus.emit(MovieAdded::new(
                        movie.id,
                        movie.name.clone(),
                        movie.year,
                        source.as_str().to_string(),
                    ));
                    return Ok(movie);
                }
                Err(AppError::DuplicateRecord) => {
                    log::warn!(
                        "Insert for tmdb {} / imdb {} lost a race (attempt {})",
                        pair.tmdb,
                        pair.imdb,
                        attempt
                    );
                    if let Some(existing) = self.find_either(pair)? {
                        return Ok(existing);
                    }
                }
                Err(e) => return Err(e),
            }
        }

        Err(AppError::DuplicateRecord)
    }

    fn find_either(&self, pair: &CodePair) -> AppResult<Option<MovieRecord>> {
        for site in [ProviderSite::Tmdb, ProviderSite::Imdb] {
            if let Some(movie) = self.store.find_by_provider_code(site, pair.code(site))? {
                return Ok(Some(movie));
            }
        }
        Ok(None)
    }

    // ========================================================================
    // Lookups & maintenance
    // ========================================================================

    pub fn get(&self, id: Uuid) -> AppResult<Option<MovieRecord>> {
        self.store.get_by_id(id)
    }

    pub fn contains(&self, id: Uuid) -> AppResult<bool> {
        self.store.exists(id)
    }

    /// All movies, ordered by name then year.
    pub fn list(&self) -> AppResult<Vec<MovieRecord>> {
        self.store.list_all()
    }

    /// Slugs are not unique; the earliest cataloged match wins.
    pub fn by_slug(&self, slug: &str) -> AppResult<Option<MovieRecord>> {
        self.store.get_by_slug(slug)
    }

    pub fn find_by_provider_code(
        &self,
        site: ProviderSite,
        code: &str,
    ) -> AppResult<Option<MovieRecord>> {
        let code = normalize_code(site, code).map_err(|_| AppError::InvalidCode {
            site,
            code: code.to_string(),
        })?;
        self.store.find_by_provider_code(site, &code)
    }

    /// The frozen provider records behind a movie.
    pub fn snapshots(&self, id: Uuid) -> AppResult<Vec<IndexerSnapshot>> {
        self.require(id)?;
        self.store.snapshots_for(id)
    }

    /// The merged genre list of a movie, in merge order.
    pub fn genres(&self, id: Uuid) -> AppResult<Vec<MergedGenre>> {
        self.require(id)?;
        self.store.genres_for(id)
    }

    pub fn delete(&self, id: Uuid) -> AppResult<()> {
        let movie = self.require(id)?;

        self.store.delete(id)?;
        log::info!("Deleted {:?} ({})", movie.name, movie.id);

        self.event_bus.emit(MovieDeleted::new(movie.id, movie.name));
        Ok(())
    }

    /// Queries handed to provider search for this movie.
    pub fn search_strings(&self, movie: &MovieRecord) -> Vec<String> {
        movie.search_strings()
    }

    fn require(&self, id: Uuid) -> AppResult<MovieRecord> {
        self.store.get_by_id(id)?.ok_or(AppError::NotFound)
    }
}
