pub mod config;
pub mod http;
pub mod metadata;
pub mod persistence;
