use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client as HttpClient, StatusCode};
use serde::Deserialize;
use tokio::time::sleep;
use tracing::{debug, warn};

use super::{CatalogError, MovieCatalog};
use crate::domain::entities::{MovieDetail, MoviePage, MovieSummary};
use crate::infrastructure::config::TmdbConfig;

/// How many top-billed cast members the detail endpoint exposes
const CAST_LIMIT: usize = 5;

/// TMDB-backed movie catalog.
///
/// Every request carries a bounded timeout; transport failures and upstream
/// 5xx responses are retried with exponential backoff up to `max_retries`,
/// client errors are not.
pub struct TmdbCatalog {
    client: HttpClient,
    base_url: String,
    api_key: String,
    max_retries: u32,
    retry_delay: Duration,
}

enum FetchError {
    Status(StatusCode),
    Transport(String),
}

impl TmdbCatalog {
    /// Build a catalog client from configuration
    pub fn new(config: &TmdbConfig, api_key: String) -> Result<Self, reqwest::Error> {
        let client = HttpClient::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key,
            max_retries: config.max_retries,
            retry_delay: Duration::from_millis(config.retry_delay_ms),
        })
    }

    async fn fetch(&self, path: &str, params: &[(&str, &str)]) -> Result<reqwest::Response, FetchError> {
        let url = format!("{}{path}", self.base_url);
        let mut attempt: u32 = 0;

        loop {
            let request = self
                .client
                .get(&url)
                .query(&[("api_key", self.api_key.as_str())])
                .query(params);

            match request.send().await {
                Ok(response) if response.status().is_success() => return Ok(response),
                Ok(response) if response.status().is_client_error() => {
                    // Client errors are definitive, retrying cannot help
                    return Err(FetchError::Status(response.status()));
                }
                Ok(response) => {
                    let status = response.status();
                    warn!(%status, path, attempt, "metadata provider returned a server error");
                    if attempt >= self.max_retries {
                        return Err(FetchError::Status(status));
                    }
                }
                Err(e) => {
                    warn!(error = %e, path, attempt, "metadata provider request failed");
                    if attempt >= self.max_retries {
                        return Err(FetchError::Transport(e.to_string()));
                    }
                }
            }

            attempt += 1;
            sleep(self.retry_delay * (1u32 << (attempt - 1))).await;
        }
    }

    async fn fetch_page(
        &self,
        path: &str,
        params: &[(&str, &str)],
    ) -> Result<MoviePage, CatalogError> {
        let response = self.fetch(path, params).await.map_err(|e| match e {
            FetchError::Status(status) => {
                CatalogError::Upstream(format!("unexpected status {status}"))
            }
            FetchError::Transport(message) => CatalogError::Upstream(message),
        })?;

        response
            .json::<MoviePage>()
            .await
            .map_err(|e| CatalogError::Upstream(format!("malformed response: {e}")))
    }
}

#[async_trait]
impl MovieCatalog for TmdbCatalog {
    async fn search(&self, query: &str, page: u32) -> Result<MoviePage, CatalogError> {
        debug!(query, page, "searching movie catalog");
        let page = page.to_string();
        self.fetch_page(
            "/search/movie",
            &[
                ("query", query),
                ("language", "en-US"),
                ("page", page.as_str()),
                ("include_adult", "false"),
            ],
        )
        .await
    }

    async fn popular(&self) -> Result<MoviePage, CatalogError> {
        self.fetch_page("/movie/popular", &[("language", "en-US"), ("page", "1")]).await
    }

    async fn trending_today(&self) -> Result<MoviePage, CatalogError> {
        self.fetch_page("/trending/movie/day", &[]).await
    }

    async fn detail(&self, id: u32) -> Result<MovieDetail, CatalogError> {
        let path = format!("/movie/{id}");
        let response = self
            .fetch(&path, &[("language", "en-US"), ("append_to_response", "credits")])
            .await
            .map_err(|e| match e {
                FetchError::Status(StatusCode::NOT_FOUND) => CatalogError::NotFound(id),
                FetchError::Status(status) => {
                    CatalogError::Upstream(format!("unexpected status {status}"))
                }
                FetchError::Transport(message) => CatalogError::Upstream(message),
            })?;

        let detail: DetailResponse = response
            .json()
            .await
            .map_err(|e| CatalogError::Upstream(format!("malformed response: {e}")))?;

        Ok(detail.into_domain())
    }
}

/// Raw TMDB detail payload with appended credits
#[derive(Debug, Deserialize)]
struct DetailResponse {
    #[serde(flatten)]
    summary: MovieSummary,
    #[serde(default)]
    tagline: Option<String>,
    #[serde(default)]
    credits: Option<Credits>,
}

#[derive(Debug, Deserialize)]
struct Credits {
    #[serde(default)]
    cast: Vec<CastMember>,
    #[serde(default)]
    crew: Vec<CrewMember>,
}

#[derive(Debug, Deserialize)]
struct CastMember {
    name: String,
}

#[derive(Debug, Deserialize)]
struct CrewMember {
    name: String,
    #[serde(default)]
    job: String,
}

impl DetailResponse {
    fn into_domain(self) -> MovieDetail {
        let (director, cast) = match self.credits {
            Some(credits) => {
                let director =
                    credits.crew.into_iter().find(|c| c.job == "Director").map(|c| c.name);
                let cast =
                    credits.cast.into_iter().take(CAST_LIMIT).map(|c| c.name).collect();
                (director, cast)
            }
            None => (None, Vec::new()),
        };

        MovieDetail {
            summary: self.summary,
            tagline: self.tagline.filter(|t| !t.is_empty()),
            director,
            cast,
        }
    }
}
