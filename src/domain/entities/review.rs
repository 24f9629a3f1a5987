use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A user's review of a movie.
///
/// Wire names are camelCase to match the public API; `date` mirrors
/// `created_at` and is kept for API compatibility.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    pub id: ReviewId,
    pub movie_id: u32,
    pub movie_title: String,
    pub movie_poster: Option<String>,
    pub user_id: String,
    pub username: String,
    pub rating: u8,
    pub comment: String,
    pub date: DateTime<Utc>,
    pub helpful: u32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Unique identifier for reviews
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ReviewId(u64);

impl ReviewId {
    #[must_use]
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    #[must_use]
    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for ReviewId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for ReviewId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

impl Review {
    /// Create a new review (without a repository ID - assigned on insert)
    #[must_use]
    pub fn new(
        movie_id: u32,
        movie_title: String,
        movie_poster: Option<String>,
        user_id: String,
        username: String,
        rating: u8,
        comment: String,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: ReviewId::new(0), // Repository assigns the actual ID
            movie_id,
            movie_title,
            movie_poster,
            user_id,
            username,
            rating,
            comment,
            date: now,
            helpful: 0,
            created_at: now,
            updated_at: now,
        }
    }

    /// Check whether the given requester owns this review
    #[must_use]
    pub fn is_owned_by(&self, requester_id: &str) -> bool {
        self.user_id == requester_id
    }

    /// Apply a partial update, bumping the update timestamp
    pub fn apply_update(&mut self, rating: Option<u8>, comment: Option<String>) {
        if let Some(rating) = rating {
            self.rating = rating;
        }
        if let Some(comment) = comment {
            self.comment = comment;
        }
        self.updated_at = Utc::now();
    }

    /// Increment the helpful counter and return the new value
    pub fn mark_helpful(&mut self) -> u32 {
        self.helpful += 1;
        self.helpful
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_review() -> Review {
        Review::new(
            550,
            "Fight Club".to_string(),
            Some("/pB8BM7pdSp6B6Ih7QZ4DrQ3PmJK.jpg".to_string()),
            "user1".to_string(),
            "CinemaLover".to_string(),
            5,
            "An absolute masterpiece from start to finish.".to_string(),
        )
    }

    #[test]
    fn test_new_review_defaults() {
        let review = sample_review();

        assert_eq!(review.id, ReviewId::new(0));
        assert_eq!(review.movie_id, 550);
        assert_eq!(review.rating, 5);
        assert_eq!(review.helpful, 0);
        assert_eq!(review.date, review.created_at);
        assert_eq!(review.created_at, review.updated_at);
    }

    #[test]
    fn test_ownership_check() {
        let review = sample_review();

        assert!(review.is_owned_by("user1"));
        assert!(!review.is_owned_by("user2"));
    }

    #[test]
    fn test_apply_update_is_partial() {
        let mut review = sample_review();
        let created = review.created_at;

        review.apply_update(Some(3), None);
        assert_eq!(review.rating, 3);
        assert!(review.comment.contains("masterpiece"));
        assert!(review.updated_at >= created);

        review.apply_update(None, Some("Changed my mind on a rewatch.".to_string()));
        assert_eq!(review.rating, 3);
        assert_eq!(review.comment, "Changed my mind on a rewatch.");
    }

    #[test]
    fn test_mark_helpful_increments() {
        let mut review = sample_review();

        assert_eq!(review.mark_helpful(), 1);
        assert_eq!(review.mark_helpful(), 2);
        assert_eq!(review.helpful, 2);
    }

    #[test]
    fn test_review_serializes_camel_case() {
        let review = sample_review();
        let json = serde_json::to_value(&review).unwrap();

        assert_eq!(json["movieId"], 550);
        assert_eq!(json["movieTitle"], "Fight Club");
        assert_eq!(json["userId"], "user1");
        assert!(json.get("movie_id").is_none());
    }
}
