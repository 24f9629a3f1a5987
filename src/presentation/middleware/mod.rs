//! Middleware for the request pipeline:
//! - Authentication (required and optional variants)
//! - Declarative per-route validation
//! - Rate limiting
//! - The application error taxonomy

pub mod auth;
pub mod error;
pub mod rate_limit;
pub mod validation;

pub use auth::{Identity, JwtVerifier, TokenVerifier};
pub use error::{AppError, ErrorResponse, FieldError};
pub use rate_limit::RateLimiter;
pub use validation::{FieldRule, RuleSet};
