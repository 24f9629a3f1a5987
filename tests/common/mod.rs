#![allow(dead_code)]

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use jsonwebtoken::{encode, EncodingKey, Header};
use movie_review_service::infrastructure::config::{
    AppConfig, AuthConfig, AuthMode, CorsConfig, LogFormat, LoggingConfig, RateLimitSettings,
    RuntimeMode, ServerConfig, TmdbConfig,
};
use movie_review_service::infrastructure::http::{build_state, create_app};
use movie_review_service::presentation::middleware::auth::Claims;
use serde_json::Value;
use tower::ServiceExt;

pub const TEST_SECRET: &str = "integration-test-secret";

/// Expiry far enough out that tests never race it (2100-01-01)
const FAR_FUTURE: usize = 4_102_444_800;

pub fn test_config() -> AppConfig {
    AppConfig {
        mode: RuntimeMode::Local,
        server: ServerConfig { host: "127.0.0.1".to_string(), port: 0 },
        auth: AuthConfig { mode: AuthMode::Open, token_secret: None },
        tmdb: TmdbConfig {
            api_key: None,
            base_url: "https://api.themoviedb.org/3".to_string(),
            timeout_seconds: 10,
            max_retries: 2,
            retry_delay_ms: 200,
        },
        rate_limit: RateLimitSettings {
            max_requests: 10_000,
            window_seconds: 60,
            trust_forwarded_headers: false,
        },
        cors: CorsConfig { allowed_origins: String::new() },
        logging: LoggingConfig { level: "debug".to_string(), format: LogFormat::Pretty },
    }
}

/// Mint a bearer token the enforced app's verifier accepts
pub fn token_for(subject: &str) -> String {
    mint(subject, FAR_FUTURE)
}

/// Mint a token that expired long ago
pub fn expired_token_for(subject: &str) -> String {
    mint(subject, 1_000_000)
}

fn mint(subject: &str, exp: usize) -> String {
    let claims = Claims {
        sub: subject.to_string(),
        email: Some(format!("{subject}@example.com")),
        email_verified: true,
        exp,
        iat: 1_700_000_000,
    };
    encode(&Header::default(), &claims, &EncodingKey::from_secret(TEST_SECRET.as_ref()))
        .expect("test token encodes")
}

pub struct TestApp {
    pub router: Router,
}

impl TestApp {
    /// App in open mode with no credential provider (the development default)
    pub fn open() -> Self {
        let config = test_config();
        let state = build_state(&config).expect("state builds offline");
        Self { router: create_app(&config, state) }
    }

    /// App with a wired verifier and enforced auth
    pub fn enforced() -> Self {
        let mut config = test_config();
        config.auth =
            AuthConfig { mode: AuthMode::Enforced, token_secret: Some(TEST_SECRET.to_string()) };
        let state = build_state(&config).expect("state builds offline");
        Self { router: create_app(&config, state) }
    }

    pub async fn get(&self, path: &str) -> TestResponse {
        self.send(Request::builder().uri(path).method("GET").body(Body::empty()).unwrap()).await
    }

    pub async fn post(&self, path: &str, body: &Value) -> TestResponse {
        self.send(json_request("POST", path, body, None)).await
    }

    pub async fn post_auth(&self, path: &str, body: &Value, token: &str) -> TestResponse {
        self.send(json_request("POST", path, body, Some(token))).await
    }

    pub async fn put(&self, path: &str, body: &Value) -> TestResponse {
        self.send(json_request("PUT", path, body, None)).await
    }

    pub async fn put_auth(&self, path: &str, body: &Value, token: &str) -> TestResponse {
        self.send(json_request("PUT", path, body, Some(token))).await
    }

    pub async fn delete(&self, path: &str, body: &Value) -> TestResponse {
        self.send(json_request("DELETE", path, body, None)).await
    }

    pub async fn delete_auth(&self, path: &str, body: &Value, token: &str) -> TestResponse {
        self.send(json_request("DELETE", path, body, Some(token))).await
    }

    pub async fn send(&self, request: Request<Body>) -> TestResponse {
        let response = self.router.clone().oneshot(request).await.unwrap();
        TestResponse::new(response).await
    }
}

fn json_request(method: &str, path: &str, body: &Value, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder()
        .uri(path)
        .method(method)
        .header("content-type", "application/json");
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {token}"));
    }
    builder.body(Body::from(serde_json::to_vec(body).unwrap())).unwrap()
}

pub struct TestResponse {
    pub status: StatusCode,
    pub body: String,
}

impl TestResponse {
    async fn new(response: axum::response::Response) -> Self {
        let status = response.status();
        let body_bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = String::from_utf8(body_bytes.to_vec()).unwrap();

        Self { status, body }
    }

    pub fn assert_status(&self, expected: StatusCode) {
        assert_eq!(self.status, expected, "Response body: {}", self.body);
    }

    pub fn json(&self) -> Value {
        serde_json::from_str(&self.body).unwrap()
    }

    /// The `details` field names of a validation error response
    pub fn detail_fields(&self) -> Vec<String> {
        self.json()["details"]
            .as_array()
            .map(|details| {
                details
                    .iter()
                    .map(|d| d["field"].as_str().unwrap_or_default().to_string())
                    .collect()
            })
            .unwrap_or_default()
    }
}
