#![deny(clippy::all)]
#![deny(clippy::pedantic)]
// Allow some overly strict pedantic lints for middleware code
#![allow(clippy::must_use_candidate)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_possible_wrap)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::missing_errors_doc)]

//! Movie Review Service
//!
//! A REST backend for a movie-review platform: movies proxied from an
//! external metadata provider (with a static fallback), reviews and users in
//! guarded in-memory stores, all behind an authentication and declarative
//! validation pipeline.

pub mod application;
pub mod domain;
pub mod infrastructure;
pub mod presentation;

// Re-export commonly used types
pub use application::dto::*;
pub use domain::entities::*;
