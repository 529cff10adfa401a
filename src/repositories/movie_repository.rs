// src/repositories/movie_repository.rs
//
// Movie persistence: canonical records, their indexer snapshots and the
// merged genre tags. A movie and its snapshots are only ever written
// together, inside one transaction.

use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::{params, OptionalExtension, Row, Transaction};
use std::collections::HashMap;
use std::str::FromStr;
use std::sync::Arc;
use uuid::Uuid;

use crate::db::ConnectionPool;
use crate::domain::{GenreTag, IndexerSnapshot, MergedGenre, MovieRecord, ProviderSite};
use crate::error::{AppError, AppResult};

const DATE_FORMAT: &str = "%Y-%m-%d";

const MOVIE_COLUMNS: &str =
    "m.id, m.name, m.slug, m.year, m.date, m.language, m.created_at, m.updated_at";

/// Everything written by one successful add
#[derive(Debug, Clone)]
pub struct NewMovie {
    pub movie: MovieRecord,
    pub snapshots: Vec<IndexerSnapshot>,
    /// Merged view; the index is persisted as the tag position
    pub genres: Vec<MergedGenre>,
}

#[cfg_attr(test, mockall::automock)]
pub trait MovieRepository: Send + Sync {
    /// Movie owning the snapshot `(site, code)`, if any.
    fn find_by_provider_code(&self, site: ProviderSite, code: &str)
        -> AppResult<Option<MovieRecord>>;

    /// Insert movie, snapshots and genre tags atomically.
    ///
    /// Fails with `DuplicateRecord` when a snapshot `(site, code)` already
    /// exists; nothing is written in that case.
    fn insert(&self, new_movie: &NewMovie) -> AppResult<()>;

    fn get_by_id(&self, id: Uuid) -> AppResult<Option<MovieRecord>>;
    fn get_by_slug(&self, slug: &str) -> AppResult<Option<MovieRecord>>;
    fn list_all(&self) -> AppResult<Vec<MovieRecord>>;

    /// Snapshots of a movie with their genre tags, tmdb first.
    fn snapshots_for(&self, movie_id: Uuid) -> AppResult<Vec<IndexerSnapshot>>;

    /// The merged genre view of a movie, in merge order.
    fn genres_for(&self, movie_id: Uuid) -> AppResult<Vec<MergedGenre>>;

    /// Delete a movie; snapshots and tags go with it.
    fn delete(&self, id: Uuid) -> AppResult<()>;
    fn exists(&self, id: Uuid) -> AppResult<bool>;
}

pub struct SqliteMovieRepository {
    pool: Arc<ConnectionPool>,
}

impl SqliteMovieRepository {
    pub fn new(pool: Arc<ConnectionPool>) -> Self {
        Self { pool }
    }

    fn conversion_error<E>(idx: usize, err: E) -> rusqlite::Error
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(err))
    }

    fn parse_timestamp(idx: usize, value: &str) -> Result<DateTime<Utc>, rusqlite::Error> {
        DateTime::parse_from_rfc3339(value)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(|e| Self::conversion_error(idx, e))
    }

    /// Map database row to MovieRecord - returns rusqlite::Error for query_map compatibility
    fn row_to_movie(row: &Row) -> Result<MovieRecord, rusqlite::Error> {
        let id_str: String = row.get(0)?;
        let id = Uuid::parse_str(&id_str).map_err(|e| Self::conversion_error(0, e))?;

        let date_str: Option<String> = row.get(4)?;
        let date = date_str
            .map(|s| NaiveDate::parse_from_str(&s, DATE_FORMAT))
            .transpose()
            .map_err(|e| Self::conversion_error(4, e))?;

        let created_at: String = row.get(6)?;
        let updated_at: String = row.get(7)?;

        Ok(MovieRecord {
            id,
            name: row.get(1)?,
            slug: row.get(2)?,
            year: row.get(3)?,
            date,
            language: row.get(5)?,
            created_at: Self::parse_timestamp(6, &created_at)?,
            updated_at: Self::parse_timestamp(7, &updated_at)?,
        })
    }

    fn row_to_snapshot(row: &Row) -> Result<IndexerSnapshot, rusqlite::Error> {
        let id_str: String = row.get("id")?;
        let id = Uuid::parse_str(&id_str).map_err(|e| Self::conversion_error(0, e))?;

        let movie_id_str: String = row.get("movie_id")?;
        let movie_id = Uuid::parse_str(&movie_id_str).map_err(|e| Self::conversion_error(1, e))?;

        let site_str: String = row.get("site")?;
        let site = ProviderSite::from_str(&site_str).map_err(|e| Self::conversion_error(2, e))?;

        let data_json: String = row.get("data")?;
        let data = serde_json::from_str(&data_json).map_err(|e| Self::conversion_error(4, e))?;

        let created_at: String = row.get("created_at")?;

        Ok(IndexerSnapshot {
            id,
            movie_id,
            site,
            code: row.get("code")?,
            data,
            genres: Vec::new(),
            created_at: Self::parse_timestamp(5, &created_at)?,
        })
    }

    fn insert_in(tx: &Transaction, new_movie: &NewMovie) -> AppResult<()> {
        let movie = &new_movie.movie;

        tx.execute(
            "INSERT INTO movies (id, name, slug, year, date, language, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                movie.id.to_string(),
                movie.name,
                movie.slug,
                movie.year,
                movie.date.map(|d| d.format(DATE_FORMAT).to_string()),
                movie.language,
                movie.created_at.to_rfc3339(),
                movie.updated_at.to_rfc3339(),
            ],
        )?;

        let mut snapshot_ids: HashMap<ProviderSite, Uuid> = HashMap::new();
        for snapshot in &new_movie.snapshots {
            let data_json = serde_json::to_string(&snapshot.data)?;
            tx.execute(
                "INSERT INTO indexer_data (id, movie_id, site, code, data, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    snapshot.id.to_string(),
                    movie.id.to_string(),
                    snapshot.site.as_str(),
                    snapshot.code,
                    data_json,
                    snapshot.created_at.to_rfc3339(),
                ],
            )?;
            snapshot_ids.insert(snapshot.site, snapshot.id);
        }

        let mut stmt = tx.prepare(
            "INSERT INTO genres (indexer_data_id, name, position) VALUES (?1, ?2, ?3)",
        )?;
        for (position, genre) in new_movie.genres.iter().enumerate() {
            let snapshot_id = snapshot_ids.get(&genre.origin).ok_or_else(|| {
                AppError::Other(format!(
                    "Genre {:?} references missing {} snapshot",
                    genre.tag.name, genre.origin
                ))
            })?;
            stmt.execute(params![
                snapshot_id.to_string(),
                genre.tag.name,
                position as i64
            ])?;
        }

        Ok(())
    }

    fn query_one(&self, sql: &str, param: &str) -> AppResult<Option<MovieRecord>> {
        let conn = self.pool.get()?;
        let mut stmt = conn.prepare(sql)?;
        let movie = stmt
            .query_row(params![param], Self::row_to_movie)
            .optional()?;
        Ok(movie)
    }
}

impl MovieRepository for SqliteMovieRepository {
    fn find_by_provider_code(
        &self,
        site: ProviderSite,
        code: &str,
    ) -> AppResult<Option<MovieRecord>> {
        let conn = self.pool.get()?;

        let mut stmt = conn.prepare(&format!(
            "SELECT {MOVIE_COLUMNS}
             FROM movies m
             JOIN indexer_data d ON d.movie_id = m.id
             WHERE d.site = ?1 AND d.code = ?2"
        ))?;

        match stmt.query_row(params![site.as_str(), code], Self::row_to_movie) {
            Ok(movie) => Ok(Some(movie)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(AppError::Database(e)),
        }
    }

    fn insert(&self, new_movie: &NewMovie) -> AppResult<()> {
        let mut conn = self.pool.get()?;
        let tx = conn.transaction()?;

        // Dropping `tx` on an early return rolls everything back.
        match Self::insert_in(&tx, new_movie) {
            Ok(()) => {}
            Err(AppError::Database(e)) if AppError::is_unique_violation(&e) => {
                return Err(AppError::DuplicateRecord);
            }
            Err(e) => return Err(e),
        }

        tx.commit()?;
        Ok(())
    }

    fn get_by_id(&self, id: Uuid) -> AppResult<Option<MovieRecord>> {
        self.query_one(
            &format!("SELECT {MOVIE_COLUMNS} FROM movies m WHERE m.id = ?1"),
            &id.to_string(),
        )
    }

    fn get_by_slug(&self, slug: &str) -> AppResult<Option<MovieRecord>> {
        self.query_one(
            &format!(
                "SELECT {MOVIE_COLUMNS} FROM movies m WHERE m.slug = ?1
                 ORDER BY m.created_at LIMIT 1"
            ),
            slug,
        )
    }

    fn list_all(&self) -> AppResult<Vec<MovieRecord>> {
        let conn = self.pool.get()?;

        let mut stmt = conn.prepare(&format!(
            "SELECT {MOVIE_COLUMNS} FROM movies m ORDER BY m.name, m.year"
        ))?;

        let movies: Vec<MovieRecord> = stmt
            .query_map([], Self::row_to_movie)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(movies)
    }

    fn snapshots_for(&self, movie_id: Uuid) -> AppResult<Vec<IndexerSnapshot>> {
        let conn = self.pool.get()?;

        let mut stmt = conn.prepare(
            "SELECT id, movie_id, site, code, data, created_at
             FROM indexer_data WHERE movie_id = ?1 ORDER BY site DESC",
        )?;
        let mut snapshots: Vec<IndexerSnapshot> = stmt
            .query_map(params![movie_id.to_string()], Self::row_to_snapshot)?
            .collect::<Result<Vec<_>, _>>()?;

        let mut tag_stmt =
            conn.prepare("SELECT name FROM genres WHERE indexer_data_id = ?1 ORDER BY position")?;
        for snapshot in &mut snapshots {
            snapshot.genres = tag_stmt
                .query_map(params![snapshot.id.to_string()], |row| {
                    row.get::<_, String>(0).map(GenreTag::new)
                })?
                .collect::<Result<Vec<_>, _>>()?;
        }

        Ok(snapshots)
    }

    fn genres_for(&self, movie_id: Uuid) -> AppResult<Vec<MergedGenre>> {
        let conn = self.pool.get()?;

        let mut stmt = conn.prepare(
            "SELECT d.site, g.name
             FROM genres g
             JOIN indexer_data d ON d.id = g.indexer_data_id
             WHERE d.movie_id = ?1
             ORDER BY g.position",
        )?;

        let genres: Vec<MergedGenre> = stmt
            .query_map(params![movie_id.to_string()], |row| {
                let site_str: String = row.get(0)?;
                let origin = ProviderSite::from_str(&site_str)
                    .map_err(|e| Self::conversion_error(0, e))?;
                Ok(MergedGenre {
                    origin,
                    tag: GenreTag::new(row.get::<_, String>(1)?),
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(genres)
    }

    fn delete(&self, id: Uuid) -> AppResult<()> {
        let conn = self.pool.get()?;

        let rows_affected =
            conn.execute("DELETE FROM movies WHERE id = ?1", params![id.to_string()])?;

        if rows_affected == 0 {
            return Err(AppError::NotFound);
        }

        Ok(())
    }

    fn exists(&self, id: Uuid) -> AppResult<bool> {
        let conn = self.pool.get()?;

        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM movies WHERE id = ?1",
            params![id.to_string()],
            |row| row.get(0),
        )?;

        Ok(count > 0)
    }
}
