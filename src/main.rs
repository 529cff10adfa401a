// src/main.rs
//
// moviehub command line: bootstraps config -> pool -> schema -> repository
// -> provider clients -> catalog service, then runs one command.

mod cli;

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;

use cli::{Cli, Commands};
use moviehub::db::{create_connection_pool, initialize_database};
use moviehub::events::{EventBus, MovieAdded, MovieDeleted};
use moviehub::integrations::{ImdbClient, SearchResult, TmdbClient};
use moviehub::repositories::{MovieRepository, SqliteMovieRepository};
use moviehub::services::{CatalogService, RecordResolver};
use moviehub::{CatalogConfig, MovieRecord, ProviderSite};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_filter = if cli.verbose { "moviehub=debug" } else { "moviehub=info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();

    let config = CatalogConfig::from_env();

    match cli.command {
        Commands::Add {
            site,
            code,
            language,
        } => {
            let catalog = build_catalog(&config)?;
            let movie = match ProviderSite::from(site) {
                ProviderSite::Tmdb => catalog.add_by_tmdb(&code, language.as_deref()).await?,
                ProviderSite::Imdb => catalog.add_by_imdb(&code, language.as_deref()).await?,
            };
            print_movie(&movie);
        }
        Commands::List => {
            let catalog = build_catalog(&config)?;
            for movie in catalog.list()? {
                print_movie(&movie);
            }
        }
        Commands::Show { slug } => {
            let catalog = build_catalog(&config)?;
            let movie = catalog
                .by_slug(&slug)?
                .with_context(|| format!("no movie with slug {:?}", slug))?;

            print_movie(&movie);
            let genres: Vec<String> = catalog
                .genres(movie.id)?
                .into_iter()
                .map(|g| format!("{} ({})", g.tag.name, g.origin))
                .collect();
            println!("  genres: {}", genres.join(", "));
            for snapshot in catalog.snapshots(movie.id)? {
                println!(
                    "  {} {}: {}",
                    snapshot.site,
                    snapshot.code,
                    snapshot.data.title().unwrap_or("-")
                );
            }
            println!("  search: {}", catalog.search_strings(&movie).join(" | "));
        }
        Commands::Delete { id } => {
            let catalog = build_catalog(&config)?;
            catalog.delete(id)?;
            println!("deleted {}", id);
        }
        Commands::Search { query, year, site } => {
            let results = match ProviderSite::from(site) {
                ProviderSite::Tmdb => {
                    tmdb_client(&config)?
                        .search_movie(&query, year, Some(config.default_language.as_str()))
                        .await?
                }
                ProviderSite::Imdb => imdb_client(&config)?.search(&query).await?,
            };
            print_results(&results);
        }
        Commands::Popular { language } => {
            let language = language.unwrap_or_else(|| config.default_language.clone());
            let results = tmdb_client(&config)?.popular(Some(&language)).await?;
            print_results(&results);
        }
    }

    Ok(())
}

fn build_catalog(config: &CatalogConfig) -> Result<CatalogService> {
    // 1. INFRASTRUCTURE
    let event_bus = Arc::new(EventBus::new());
    let pool = Arc::new(create_connection_pool(config)?);
    {
        let conn = pool.get()?;
        initialize_database(&conn)?;
    }

    event_bus.subscribe::<MovieAdded, _>(|event| {
        log::debug!("movie added from {}: {}", event.source, event.movie_id);
    });
    event_bus.subscribe::<MovieDeleted, _>(|event| {
        log::debug!("movie deleted: {}", event.movie_id);
    });

    // 2. REPOSITORIES
    let store: Arc<dyn MovieRepository> = Arc::new(SqliteMovieRepository::new(pool));

    // 3. PROVIDERS
    let tmdb = Arc::new(tmdb_client(config)?);
    let imdb = Arc::new(imdb_client(config)?);
    let resolver = RecordResolver::new(tmdb.clone(), imdb, tmdb);

    // 4. SERVICES
    Ok(CatalogService::new(
        store,
        resolver,
        event_bus,
        config.default_language.clone(),
    ))
}

fn tmdb_client(config: &CatalogConfig) -> Result<TmdbClient> {
    let key = config.require_tmdb_key()?.to_string();
    Ok(TmdbClient::new(key, config.tmdb_base_url.clone())?)
}

fn imdb_client(config: &CatalogConfig) -> Result<ImdbClient> {
    let key = config.require_omdb_key()?.to_string();
    Ok(ImdbClient::new(key, config.omdb_base_url.clone())?)
}

fn print_movie(movie: &MovieRecord) {
    println!(
        "{}  {} ({})  [{}]  {}",
        movie.id,
        movie.name,
        movie.year.map(|y| y.to_string()).unwrap_or_else(|| "?".to_string()),
        movie.language.as_deref().unwrap_or("-"),
        movie.slug
    );
}

fn print_results(results: &[SearchResult]) {
    for result in results {
        println!(
            "{} {:>10}  {} ({})",
            result.site,
            result.code,
            result.title,
            result.year.map(|y| y.to_string()).unwrap_or_else(|| "?".to_string())
        );
    }
}
