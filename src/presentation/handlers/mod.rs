use std::sync::Arc;

use crate::domain::repositories::{ReviewRepository, UserRepository};
use crate::infrastructure::config::AuthMode;
use crate::infrastructure::metadata::MovieCatalog;
use crate::presentation::middleware::auth::{Identity, TokenVerifier};

pub mod movies;
pub mod reviews;
pub mod users;

/// Shared application state injected into handlers and middleware
#[derive(Clone)]
pub struct AppState {
    pub reviews: Arc<dyn ReviewRepository>,
    pub users: Arc<dyn UserRepository>,
    pub catalog: Arc<dyn MovieCatalog>,
    pub verifier: Option<Arc<dyn TokenVerifier>>,
    pub auth_mode: AuthMode,
}

/// Resolve the id ownership checks compare against.
///
/// A verified identity always wins; otherwise the client-supplied claim is
/// used. `None` means nobody identified themselves at all.
pub(crate) fn requester_id<'a>(
    identity: Option<&'a Identity>,
    claimed: Option<&'a str>,
) -> Option<&'a str> {
    match identity {
        Some(identity) => Some(identity.effective_requester(claimed)),
        None => claimed,
    }
}

/// Round to one decimal, the precision the public stats contract uses
pub(crate) fn round_to_tenth(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
