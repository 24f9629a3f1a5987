pub mod memory;

pub use memory::{InMemoryReviewRepository, InMemoryUserRepository};
