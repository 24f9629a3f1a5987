use crate::domain::entities::{Review, ReviewId, User};
use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;

/// Storage-level failure. The in-memory backend never produces one, but the
/// trait contract keeps handlers ready for a backend that can.
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("storage backend unavailable: {0}")]
    Unavailable(String),
}

/// Filter and slicing parameters for review listings
#[derive(Debug, Clone)]
pub struct ReviewFilter {
    pub movie_id: Option<u32>,
    pub user_id: Option<String>,
    pub limit: usize,
    pub offset: usize,
}

/// A page of reviews plus the total matching the filter before slicing
#[derive(Debug, Clone)]
pub struct ReviewListing {
    pub reviews: Vec<Review>,
    pub total: usize,
}

/// Outcome of an insert that enforces one review per movie per user
#[derive(Debug, Clone)]
pub enum ReviewInsert {
    Created(Review),
    Duplicate,
}

/// Aggregate rating statistics across all reviews
#[derive(Debug, Clone)]
pub struct ReviewStats {
    pub total_reviews: usize,
    pub average_rating: f64,
    /// Counts for ratings 1 through 5, in order
    pub rating_distribution: [u32; 5],
}

/// Repository trait for review persistence
#[async_trait]
pub trait ReviewRepository: Send + Sync {
    /// List reviews matching the filter, newest first
    async fn list(&self, filter: &ReviewFilter) -> Result<ReviewListing, RepositoryError>;

    /// Find a review by ID
    async fn find_by_id(&self, id: ReviewId) -> Result<Option<Review>, RepositoryError>;

    /// Insert a review, assigning its ID; rejects a second review for the
    /// same `{movie_id, user_id}` pair atomically
    async fn insert(&self, review: Review) -> Result<ReviewInsert, RepositoryError>;

    /// Partially update rating and/or comment; `None` when the id is unknown
    async fn update(
        &self,
        id: ReviewId,
        rating: Option<u8>,
        comment: Option<String>,
    ) -> Result<Option<Review>, RepositoryError>;

    /// Delete a review; `false` when the id is unknown
    async fn delete(&self, id: ReviewId) -> Result<bool, RepositoryError>;

    /// Increment the helpful counter, returning the new value
    async fn mark_helpful(&self, id: ReviewId) -> Result<Option<u32>, RepositoryError>;

    /// Aggregate rating statistics
    async fn stats(&self) -> Result<ReviewStats, RepositoryError>;
}

/// A page of users plus the total before slicing
#[derive(Debug, Clone)]
pub struct UserListing {
    pub users: Vec<User>,
    pub total: usize,
}

/// Outcome of a user insert that enforces username/email uniqueness
#[derive(Debug, Clone)]
pub enum UserInsert {
    Created(User),
    UsernameOrEmailTaken,
}

/// Outcome of a profile update that enforces username uniqueness
#[derive(Debug, Clone)]
pub enum UserUpdate {
    Updated(User),
    UsernameTaken,
    NotFound,
}

/// Count of users naming a genre as a favorite
#[derive(Debug, Clone, Serialize)]
pub struct GenreCount {
    pub genre: String,
    pub count: u32,
}

/// Aggregate statistics across all users
#[derive(Debug, Clone)]
pub struct UserStats {
    pub total_users: usize,
    pub total_reviews: u64,
    pub average_reviews_per_user: f64,
    /// Top favorite genres, most popular first (at most five)
    pub popular_genres: Vec<GenreCount>,
}

/// Repository trait for user persistence
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// List users, most recently joined first
    async fn list(&self, limit: usize, offset: usize) -> Result<UserListing, RepositoryError>;

    /// Find a user by ID
    async fn find_by_id(&self, id: &str) -> Result<Option<User>, RepositoryError>;

    /// Insert a user; rejects duplicate usernames or emails
    /// (case-insensitive) atomically
    async fn insert(&self, user: User) -> Result<UserInsert, RepositoryError>;

    /// Partially update the profile; renames enforce username uniqueness
    async fn update_profile(
        &self,
        id: &str,
        username: Option<String>,
        bio: Option<String>,
        favorite_genres: Option<Vec<String>>,
    ) -> Result<UserUpdate, RepositoryError>;

    /// Delete a user account; `false` when the id is unknown
    async fn delete(&self, id: &str) -> Result<bool, RepositoryError>;

    /// Aggregate user statistics
    async fn stats(&self) -> Result<UserStats, RepositoryError>;
}
