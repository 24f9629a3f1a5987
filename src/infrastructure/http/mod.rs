use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::DefaultBodyLimit,
    http::{header, HeaderValue, Method, StatusCode},
    middleware::from_fn,
    response::Json,
    routing::get,
    Router,
};
use serde_json::{json, Value};
use tower::ServiceBuilder;
use tower_http::{
    cors::CorsLayer,
    request_id::{MakeRequestUuid, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};
use tracing::{info, warn};

use crate::infrastructure::config::{AppConfig, CorsConfig};
use crate::infrastructure::metadata::{FixtureCatalog, MovieCatalog, TmdbCatalog};
use crate::infrastructure::persistence::{InMemoryReviewRepository, InMemoryUserRepository};
use crate::presentation::handlers::AppState;
use crate::presentation::middleware::auth::{JwtVerifier, TokenVerifier};
use crate::presentation::middleware::rate_limit::{rate_limit_middleware, RateLimiter};
use crate::presentation::routes;

/// Matches the original API's JSON payload limit
const MAX_BODY_BYTES: usize = 10 * 1024 * 1024;

/// Build the application state from configuration: seeded in-memory
/// repositories, the configured (or fixture) movie catalog, and the token
/// verifier when a secret is present
pub fn build_state(config: &AppConfig) -> Result<AppState, Box<dyn std::error::Error>> {
    let catalog: Arc<dyn MovieCatalog> = match config.tmdb.configured_api_key() {
        Some(key) => {
            info!("movie metadata served from TMDB");
            Arc::new(TmdbCatalog::new(&config.tmdb, key.to_string())?)
        }
        None => {
            warn!("TMDB API key not configured - serving the static movie dataset");
            Arc::new(FixtureCatalog::new())
        }
    };

    let verifier: Option<Arc<dyn TokenVerifier>> = config
        .auth
        .token_secret
        .as_deref()
        .filter(|secret| !secret.is_empty())
        .map(|secret| Arc::new(JwtVerifier::new(secret)) as Arc<dyn TokenVerifier>);

    if verifier.is_none() {
        warn!(mode = %config.auth.mode, "no credential provider configured");
    }

    Ok(AppState {
        reviews: Arc::new(InMemoryReviewRepository::seeded()),
        users: Arc::new(InMemoryUserRepository::seeded()),
        catalog,
        verifier,
        auth_mode: config.auth.mode,
    })
}

/// Create the main application router
pub fn create_app(config: &AppConfig, state: AppState) -> Router {
    let api = routes::api_routes(&state)
        .layer(from_fn(rate_limit_middleware(RateLimiter::new(&config.rate_limit))));

    let middleware_stack = ServiceBuilder::new()
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::new(Duration::from_secs(30)))
        .layer(create_cors_layer(&config.cors))
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES));

    Router::new()
        .route("/", get(api_index))
        .route("/health", get(health_check))
        .nest("/api", api)
        .fallback(not_found_handler)
        .layer(middleware_stack)
        .with_state(state)
}

/// Service index listing the resource collections
async fn api_index() -> Json<Value> {
    Json(json!({
        "message": "Movie Review Platform API",
        "version": "1.0.0",
        "endpoints": {
            "movies": "/api/movies",
            "reviews": "/api/reviews",
            "users": "/api/users"
        }
    }))
}

/// Health check endpoint for liveness probes
async fn health_check() -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "service": "movie-review-service"
    }))
}

/// Handler for unmatched routes
async fn not_found_handler() -> (StatusCode, Json<Value>) {
    (StatusCode::NOT_FOUND, Json(json!({ "error": "Route not found" })))
}

/// Create CORS layer from the configured origin allowlist
fn create_cors_layer(config: &CorsConfig) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE, header::ACCEPT])
        .max_age(Duration::from_secs(3600));

    let origins: Vec<HeaderValue> =
        config.origins().iter().filter_map(|origin| origin.parse().ok()).collect();

    if origins.is_empty() {
        layer.allow_origin(tower_http::cors::Any)
    } else {
        layer.allow_origin(tower_http::cors::AllowOrigin::list(origins))
    }
}

/// Start the HTTP server
///
/// # Errors
/// Returns an error if the server fails to start
pub async fn start_server(config: AppConfig) -> Result<(), Box<dyn std::error::Error>> {
    let state = build_state(&config)?;
    let app = create_app(&config, state);
    let addr = config.server.socket_addr();

    info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>()).await?;

    Ok(())
}
