use async_trait::async_trait;

use super::{CatalogError, MovieCatalog};
use crate::domain::entities::{Genre, MovieDetail, MoviePage, MovieSummary};

/// Static catalog served when no TMDB API key is configured.
///
/// Holds a small well-known dataset so the API stays fully explorable in
/// development and tests.
pub struct FixtureCatalog {
    movies: Vec<MovieSummary>,
}

impl FixtureCatalog {
    #[must_use]
    pub fn new() -> Self {
        Self {
            movies: vec![
                MovieSummary {
                    id: 550,
                    title: "Fight Club".to_string(),
                    overview: "A ticking-time-bomb insomniac and a slippery soap salesman \
                               channel primal male aggression into a shocking new form of \
                               therapy."
                        .to_string(),
                    poster_path: Some("/pB8BM7pdSp6B6Ih7QZ4DrQ3PmJK.jpg".to_string()),
                    backdrop_path: Some("/fCayJrkfRaCRCTh8GqN30f8oyQF.jpg".to_string()),
                    release_date: Some("1999-10-15".to_string()),
                    vote_average: 8.4,
                    vote_count: 26280,
                    runtime: Some(139),
                    genres: vec![
                        Genre { id: 18, name: "Drama".to_string() },
                        Genre { id: 53, name: "Thriller".to_string() },
                    ],
                },
                MovieSummary {
                    id: 13,
                    title: "Forrest Gump".to_string(),
                    overview: "A man with a low IQ has accomplished great things in his life \
                               and been present during significant historic events - in each \
                               case, far exceeding what anyone imagined he could do."
                        .to_string(),
                    poster_path: Some("/arw2vcBveWOVZr6pxd9XTd1TdQa.jpg".to_string()),
                    backdrop_path: Some("/3h1JZGDhZ8nzxdgvkxha0qBqi05.jpg".to_string()),
                    release_date: Some("1994-06-23".to_string()),
                    vote_average: 8.8,
                    vote_count: 25000,
                    runtime: Some(142),
                    genres: vec![
                        Genre { id: 18, name: "Drama".to_string() },
                        Genre { id: 35, name: "Comedy".to_string() },
                    ],
                },
            ],
        }
    }

    fn extras(id: u32) -> (Option<String>, Option<String>, Vec<String>) {
        match id {
            550 => (
                Some("Mischief. Mayhem. Soap.".to_string()),
                Some("David Fincher".to_string()),
                vec![
                    "Brad Pitt".to_string(),
                    "Edward Norton".to_string(),
                    "Helena Bonham Carter".to_string(),
                ],
            ),
            13 => (
                Some("Life is like a box of chocolates.".to_string()),
                Some("Robert Zemeckis".to_string()),
                vec![
                    "Tom Hanks".to_string(),
                    "Robin Wright".to_string(),
                    "Gary Sinise".to_string(),
                ],
            ),
            _ => (None, None, Vec::new()),
        }
    }
}

impl Default for FixtureCatalog {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MovieCatalog for FixtureCatalog {
    async fn search(&self, query: &str, _page: u32) -> Result<MoviePage, CatalogError> {
        let needle = query.to_lowercase();
        let results = self
            .movies
            .iter()
            .filter(|m| m.title.to_lowercase().contains(&needle))
            .cloned()
            .collect();
        Ok(MoviePage::single(results))
    }

    async fn popular(&self) -> Result<MoviePage, CatalogError> {
        Ok(MoviePage::single(self.movies.clone()))
    }

    async fn trending_today(&self) -> Result<MoviePage, CatalogError> {
        Ok(MoviePage::single(self.movies.clone()))
    }

    async fn detail(&self, id: u32) -> Result<MovieDetail, CatalogError> {
        let summary = self
            .movies
            .iter()
            .find(|m| m.id == id)
            .cloned()
            .ok_or(CatalogError::NotFound(id))?;

        let (tagline, director, cast) = Self::extras(id);
        Ok(MovieDetail { summary, tagline, director, cast })
    }
}
