use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Maximum number of favorite genres kept on a profile
pub const MAX_FAVORITE_GENRES: usize = 5;

/// A registered platform user.
///
/// The full record includes the email address and is only served to the
/// owner; everyone else sees the public projection built in the DTO layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub username: String,
    pub email: String,
    pub bio: String,
    pub join_date: DateTime<Utc>,
    pub avatar: Option<String>,
    pub total_reviews: u32,
    pub average_rating: f64,
    pub favorite_genres: Vec<String>,
    pub reviews_helpful: u32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Create a new user with a generated id and empty profile
    #[must_use]
    pub fn new(username: String, email: String) -> Self {
        let now = Utc::now();
        Self {
            id: format!("user-{}", uuid::Uuid::new_v4()),
            username,
            email,
            bio: String::new(),
            join_date: now,
            avatar: None,
            total_reviews: 0,
            average_rating: 0.0,
            favorite_genres: Vec::new(),
            reviews_helpful: 0,
            created_at: now,
            updated_at: now,
        }
    }

    /// Check whether the given requester owns this account
    #[must_use]
    pub fn is_owned_by(&self, requester_id: &str) -> bool {
        self.id == requester_id
    }

    /// Apply a partial profile update, bumping the update timestamp.
    ///
    /// Favorite genres are capped at [`MAX_FAVORITE_GENRES`].
    pub fn apply_profile_update(
        &mut self,
        username: Option<String>,
        bio: Option<String>,
        favorite_genres: Option<Vec<String>>,
    ) {
        if let Some(username) = username {
            self.username = username;
        }
        if let Some(bio) = bio {
            self.bio = bio;
        }
        if let Some(mut genres) = favorite_genres {
            genres.truncate(MAX_FAVORITE_GENRES);
            self.favorite_genres = genres;
        }
        self.updated_at = Utc::now();
    }
}
