use axum::{
    extract::{Path, Query, State},
    response::Json,
};
use tracing::debug;

use super::AppState;
use crate::application::dto::MovieSearchQuery;
use crate::domain::entities::{MovieDetail, MoviePage};
use crate::presentation::middleware::error::AppError;

/// `GET /api/movies/search?query=&page=`
pub async fn search_movies(
    State(state): State<AppState>,
    Query(query): Query<MovieSearchQuery>,
) -> Result<Json<MoviePage>, AppError> {
    let Some(term) = query.query.filter(|q| !q.is_empty()) else {
        return Err(AppError::BadRequest { message: "Search query is required".to_string() });
    };

    debug!(query = %term, "movie search");
    let page = state.catalog.search(&term, query.page.unwrap_or(1)).await?;
    Ok(Json(page))
}

/// `GET /api/movies/popular`
pub async fn popular_movies(State(state): State<AppState>) -> Result<Json<MoviePage>, AppError> {
    Ok(Json(state.catalog.popular().await?))
}

/// `GET /api/movies/trending/day`
pub async fn trending_movies(State(state): State<AppState>) -> Result<Json<MoviePage>, AppError> {
    Ok(Json(state.catalog.trending_today().await?))
}

/// `GET /api/movies/{id}`
pub async fn get_movie(
    State(state): State<AppState>,
    Path(id): Path<u32>,
) -> Result<Json<MovieDetail>, AppError> {
    Ok(Json(state.catalog.detail(id).await?))
}
