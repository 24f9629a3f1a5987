use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::entities::{Review, User};
use crate::domain::repositories::GenreCount;

// --- Review DTOs -----------------------------------------------------------

/// Request body for creating a review
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateReviewRequest {
    pub movie_id: u32,
    pub movie_title: String,
    #[serde(default)]
    pub movie_poster: Option<String>,
    pub user_id: String,
    pub username: String,
    pub rating: u8,
    pub comment: String,
}

/// Request body for a partial review update
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateReviewRequest {
    #[serde(default)]
    pub rating: Option<u8>,
    #[serde(default)]
    pub comment: Option<String>,
    #[serde(default)]
    pub user_id: Option<String>,
}

/// Body naming the acting user on delete/helpful calls
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActingUserRequest {
    #[serde(default)]
    pub user_id: Option<String>,
}

/// Query parameters for listing reviews
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewListQuery {
    #[serde(default)]
    pub movie_id: Option<u32>,
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub limit: Option<usize>,
    #[serde(default)]
    pub offset: Option<usize>,
}

/// Paged review listing
#[derive(Debug, Clone, Serialize)]
pub struct ReviewListResponse {
    pub reviews: Vec<Review>,
    pub total: usize,
    pub limit: usize,
    pub offset: usize,
}

/// Envelope for create/update responses
#[derive(Debug, Clone, Serialize)]
pub struct ReviewResponse {
    pub message: String,
    pub review: Review,
}

/// Response for the helpful counter
#[derive(Debug, Clone, Serialize)]
pub struct HelpfulResponse {
    pub message: String,
    pub helpful: u32,
}

/// Bare confirmation message
#[derive(Debug, Clone, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

/// Aggregate review statistics
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewStatsResponse {
    pub total_reviews: usize,
    pub average_rating: f64,
    /// Keyed "1" through "5"
    pub rating_distribution: BTreeMap<u8, u32>,
}

// --- User DTOs -------------------------------------------------------------

/// Request body for registering a user
#[derive(Debug, Clone, Deserialize)]
pub struct CreateUserRequest {
    pub username: String,
    pub email: String,
    /// Accepted for API compatibility; credential management is out of scope
    #[allow(dead_code)]
    #[serde(default)]
    pub password: String,
}

/// Request body for a partial profile update
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserRequest {
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub bio: Option<String>,
    #[serde(default)]
    pub favorite_genres: Option<Vec<String>>,
    #[serde(default)]
    pub requesting_user_id: Option<String>,
}

/// Body naming the acting user on account deletion
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteUserRequest {
    #[serde(default)]
    pub requesting_user_id: Option<String>,
}

/// Query parameters for listing users
#[derive(Debug, Clone, Deserialize)]
pub struct UserListQuery {
    #[serde(default)]
    pub limit: Option<usize>,
    #[serde(default)]
    pub offset: Option<usize>,
}

/// Query parameter naming the requester on profile reads
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileQuery {
    #[serde(default)]
    pub requesting_user_id: Option<String>,
}

/// Public projection of a user: everything except contact details and
/// bookkeeping timestamps
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicUserProfile {
    pub id: String,
    pub username: String,
    pub bio: String,
    pub join_date: DateTime<Utc>,
    pub total_reviews: u32,
    pub average_rating: f64,
    pub favorite_genres: Vec<String>,
    pub reviews_helpful: u32,
}

impl From<&User> for PublicUserProfile {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.clone(),
            username: user.username.clone(),
            bio: user.bio.clone(),
            join_date: user.join_date,
            total_reviews: user.total_reviews,
            average_rating: user.average_rating,
            favorite_genres: user.favorite_genres.clone(),
            reviews_helpful: user.reviews_helpful,
        }
    }
}

/// Paged user listing
#[derive(Debug, Clone, Serialize)]
pub struct UserListResponse {
    pub users: Vec<PublicUserProfile>,
    pub total: usize,
    pub limit: usize,
    pub offset: usize,
}

/// Envelope for the create response (public projection only)
#[derive(Debug, Clone, Serialize)]
pub struct UserCreatedResponse {
    pub message: String,
    pub user: PublicUserProfile,
}

/// Envelope for the update response (the owner sees the full record)
#[derive(Debug, Clone, Serialize)]
pub struct UserUpdatedResponse {
    pub message: String,
    pub user: User,
}

/// Aggregate user statistics
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserStatsResponse {
    pub total_users: usize,
    pub total_reviews: u64,
    pub average_reviews_per_user: f64,
    pub popular_genres: Vec<GenreCount>,
}

// --- Movie DTOs ------------------------------------------------------------

/// Query parameters for movie search
#[derive(Debug, Clone, Deserialize)]
pub struct MovieSearchQuery {
    #[serde(default)]
    pub query: Option<String>,
    #[serde(default)]
    pub page: Option<u32>,
}
