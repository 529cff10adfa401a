use clap::{Parser, Subcommand, ValueEnum};

use moviehub::ProviderSite;

#[derive(Parser)]
#[command(name = "moviehub")]
#[command(author, version, about = "Local-first movie library catalog")]
pub struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Catalog a movie by TMDB or IMDb id
    Add {
        #[arg(value_enum)]
        site: Site,

        /// Provider id ("603", "tt0133093")
        code: String,

        /// Language used when the provider reports none
        #[arg(short, long)]
        language: Option<String>,
    },

    /// List cataloged movies
    List,

    /// Show a movie with its snapshots and genres
    Show {
        /// Movie slug, e.g. "the-matrix-1999"
        slug: String,
    },

    /// Delete a movie by id
    Delete { id: uuid::Uuid },

    /// Search TMDB (or IMDb) titles without cataloging anything
    Search {
        query: String,

        #[arg(short, long)]
        year: Option<i32>,

        #[arg(long, value_enum, default_value = "tmdb")]
        site: Site,
    },

    /// Currently popular movies on TMDB
    Popular {
        #[arg(short, long)]
        language: Option<String>,
    },
}

#[derive(Clone, Copy, ValueEnum)]
pub enum Site {
    Tmdb,
    Imdb,
}

impl From<Site> for ProviderSite {
    fn from(site: Site) -> Self {
        match site {
            Site::Tmdb => ProviderSite::Tmdb,
            Site::Imdb => ProviderSite::Imdb,
        }
    }
}
