//! Movie metadata provider.
//!
//! The catalog trait has two implementations: [`TmdbCatalog`], a thin client
//! for the TMDB HTTP API, and [`FixtureCatalog`], a static dataset served
//! when no API key is configured.

pub mod fixtures;
pub mod tmdb;

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::entities::{MovieDetail, MoviePage};

pub use fixtures::FixtureCatalog;
pub use tmdb::TmdbCatalog;

/// Catalog lookup failure
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("movie {0} not found")]
    NotFound(u32),

    #[error("metadata provider request failed: {0}")]
    Upstream(String),
}

/// External movie catalog interface
#[async_trait]
pub trait MovieCatalog: Send + Sync {
    /// Search the catalog by title
    async fn search(&self, query: &str, page: u32) -> Result<MoviePage, CatalogError>;

    /// Currently popular movies
    async fn popular(&self) -> Result<MoviePage, CatalogError>;

    /// Movies trending today
    async fn trending_today(&self) -> Result<MoviePage, CatalogError>;

    /// Full detail for one movie
    async fn detail(&self, id: u32) -> Result<MovieDetail, CatalogError>;
}
