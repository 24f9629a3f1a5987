use axum::{
    extract::{Request, State},
    http::{header::AUTHORIZATION, HeaderMap},
    middleware::Next,
    response::Response,
};
use async_trait::async_trait;
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, error, warn};

use super::error::AppError;
use crate::infrastructure::config::AuthMode;
use crate::presentation::handlers::AppState;

/// Where an identity came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdentitySource {
    /// Attached after the credential provider verified a token
    Verified,
    /// The fixed development placeholder used in open mode
    Fallback,
}

/// Identity attached to a request by the auth middleware.
///
/// Immutable for the rest of the request; consumed by handlers for
/// ownership checks.
#[derive(Debug, Clone)]
pub struct Identity {
    pub subject_id: String,
    pub email: Option<String>,
    pub email_verified: bool,
    pub source: IdentitySource,
}

impl Identity {
    /// The fixed placeholder identity used when no credential provider is
    /// configured and auth mode is open
    #[must_use]
    pub fn dev_fallback() -> Self {
        Self {
            subject_id: "dev-user".to_string(),
            email: Some("dev@example.com".to_string()),
            email_verified: true,
            source: IdentitySource::Fallback,
        }
    }

    #[must_use]
    pub fn is_verified(&self) -> bool {
        self.source == IdentitySource::Verified
    }

    /// The id ownership checks compare against.
    ///
    /// A verified subject always wins; the development fallback defers to
    /// the client-supplied claim so the open-mode workflow keeps working.
    #[must_use]
    pub fn effective_requester<'a>(&'a self, claimed: Option<&'a str>) -> &'a str {
        if self.is_verified() {
            &self.subject_id
        } else {
            claimed.unwrap_or(&self.subject_id)
        }
    }
}

/// Token verification failure kinds
#[derive(Error, Debug)]
pub enum VerifyError {
    #[error("token has expired")]
    Expired,

    #[error("invalid token: {0}")]
    Invalid(String),

    #[error("verification failed: {0}")]
    Internal(String),
}

/// Credential provider interface: verifies a bearer token into an identity
#[async_trait]
pub trait TokenVerifier: Send + Sync {
    async fn verify(&self, token: &str) -> Result<Identity, VerifyError>;
}

/// Identity token claims
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub email_verified: bool,
    pub exp: usize,
    pub iat: usize,
}

/// HS256 token verifier backed by a shared secret
#[derive(Clone)]
pub struct JwtVerifier {
    decoding_key: DecodingKey,
    validation: Validation,
}

impl JwtVerifier {
    #[must_use]
    pub fn new(secret: &str) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        validation.validate_aud = false;

        Self { decoding_key: DecodingKey::from_secret(secret.as_ref()), validation }
    }

    fn decode_claims(&self, token: &str) -> Result<Claims, VerifyError> {
        decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => VerifyError::Expired,
                _ => VerifyError::Invalid(e.to_string()),
            })
    }
}

#[async_trait]
impl TokenVerifier for JwtVerifier {
    async fn verify(&self, token: &str) -> Result<Identity, VerifyError> {
        let claims = self.decode_claims(token)?;
        Ok(Identity {
            subject_id: claims.sub,
            email: claims.email,
            email_verified: claims.email_verified,
            source: IdentitySource::Verified,
        })
    }
}

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
}

/// Authentication middleware for routes that require an identity.
///
/// Without a configured credential provider this fails open in `Open` mode
/// (fixed placeholder identity) and closed in `Enforced` mode.
pub async fn require_auth(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let Some(verifier) = state.verifier.clone() else {
        return match state.auth_mode {
            AuthMode::Open => {
                warn!("authentication disabled - no credential provider configured");
                request.extensions_mut().insert(Identity::dev_fallback());
                Ok(next.run(request).await)
            }
            AuthMode::Enforced => Err(AppError::Authentication {
                message: "No authentication token provided".to_string(),
            }),
        };
    };

    let Some(token) = bearer_token(request.headers()).map(ToOwned::to_owned) else {
        return Err(AppError::Authentication {
            message: "No authentication token provided".to_string(),
        });
    };

    match verifier.verify(&token).await {
        Ok(identity) => {
            debug!(subject = %identity.subject_id, "request authenticated");
            request.extensions_mut().insert(identity);
            Ok(next.run(request).await)
        }
        Err(VerifyError::Expired) => Err(AppError::Authentication {
            message: "Authentication token expired. Please log in again.".to_string(),
        }),
        Err(VerifyError::Invalid(reason)) => {
            debug!(%reason, "token rejected");
            Err(AppError::Authentication {
                message: "Invalid authentication token".to_string(),
            })
        }
        Err(VerifyError::Internal(reason)) => {
            error!(%reason, "token verification failed unexpectedly");
            Err(AppError::Internal {
                message: "Authentication verification failed".to_string(),
            })
        }
    }
}

/// Authentication middleware for routes where an identity is welcome but
/// never required; verification failures are logged and ignored.
pub async fn optional_auth(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    if let Some(verifier) = state.verifier.clone() {
        if let Some(token) = bearer_token(request.headers()).map(ToOwned::to_owned) {
            match verifier.verify(&token).await {
                Ok(identity) => {
                    debug!(subject = %identity.subject_id, "optional auth succeeded");
                    request.extensions_mut().insert(identity);
                }
                Err(e) => {
                    warn!(error = %e, "optional auth failed, continuing without identity");
                }
            }
        }
    }

    next.run(request).await
}
