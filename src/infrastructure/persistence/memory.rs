//! Guarded in-process repositories.
//!
//! Each collection sits behind its own `tokio::sync::RwLock`; every mutation
//! holds the write guard for the whole read-modify-write, so concurrent
//! writers are serialized per collection and uniqueness checks are atomic
//! with the insert that depends on them.

use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use crate::domain::entities::{Review, ReviewId, User};
use crate::domain::repositories::{
    GenreCount, RepositoryError, ReviewFilter, ReviewInsert, ReviewListing, ReviewRepository,
    ReviewStats, UserInsert, UserListing, UserRepository, UserStats, UserUpdate,
};

fn seed_timestamp(value: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(value).expect("static seed timestamp").with_timezone(&Utc)
}

/// In-memory review store, keyed by id
pub struct InMemoryReviewRepository {
    state: RwLock<ReviewStore>,
}

struct ReviewStore {
    reviews: BTreeMap<u64, Review>,
    next_id: u64,
}

impl InMemoryReviewRepository {
    /// Create an empty store
    #[must_use]
    pub fn new() -> Self {
        Self { state: RwLock::new(ReviewStore { reviews: BTreeMap::new(), next_id: 1 }) }
    }

    /// Create a store pre-populated with the development sample reviews
    #[must_use]
    pub fn seeded() -> Self {
        let seeds = [
            Review {
                id: ReviewId::new(1),
                movie_id: 550,
                movie_title: "Fight Club".to_string(),
                movie_poster: Some("/pB8BM7pdSp6B6Ih7QZ4DrQ3PmJK.jpg".to_string()),
                user_id: "user1".to_string(),
                username: "CinemaLover".to_string(),
                rating: 5,
                comment: "An absolute masterpiece! The plot twist is incredible and the themes \
                          are thought-provoking. Brad Pitt and Edward Norton deliver outstanding \
                          performances."
                    .to_string(),
                date: seed_timestamp("2025-10-30T10:30:00Z"),
                helpful: 42,
                created_at: seed_timestamp("2025-10-30T10:30:00Z"),
                updated_at: seed_timestamp("2025-10-30T10:30:00Z"),
            },
            Review {
                id: ReviewId::new(2),
                movie_id: 13,
                movie_title: "Forrest Gump".to_string(),
                movie_poster: Some("/arw2vcBveWOVZr6pxd9XTd1TdQa.jpg".to_string()),
                user_id: "user2".to_string(),
                username: "MovieBuff2024".to_string(),
                rating: 5,
                comment: "A heartwarming story that spans decades. Tom Hanks is phenomenal as \
                          always. This movie has everything - comedy, drama, romance, and history."
                    .to_string(),
                date: seed_timestamp("2025-10-29T14:20:00Z"),
                helpful: 38,
                created_at: seed_timestamp("2025-10-29T14:20:00Z"),
                updated_at: seed_timestamp("2025-10-29T14:20:00Z"),
            },
            Review {
                id: ReviewId::new(3),
                movie_id: 550,
                movie_title: "Fight Club".to_string(),
                movie_poster: Some("/pB8BM7pdSp6B6Ih7QZ4DrQ3PmJK.jpg".to_string()),
                user_id: "user3".to_string(),
                username: "FilmCritic".to_string(),
                rating: 4,
                comment: "Great movie overall, though a bit long. The cinematography is \
                          outstanding and the ending still lands on a rewatch."
                    .to_string(),
                date: seed_timestamp("2025-10-28T16:45:00Z"),
                helpful: 25,
                created_at: seed_timestamp("2025-10-28T16:45:00Z"),
                updated_at: seed_timestamp("2025-10-28T16:45:00Z"),
            },
        ];

        let next_id = seeds.len() as u64 + 1;
        let reviews = seeds.into_iter().map(|r| (r.id.as_u64(), r)).collect();
        Self { state: RwLock::new(ReviewStore { reviews, next_id }) }
    }
}

impl Default for InMemoryReviewRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ReviewRepository for InMemoryReviewRepository {
    async fn list(&self, filter: &ReviewFilter) -> Result<ReviewListing, RepositoryError> {
        let state = self.state.read().await;

        let mut matching: Vec<&Review> = state
            .reviews
            .values()
            .filter(|r| filter.movie_id.is_none_or(|id| r.movie_id == id))
            .filter(|r| filter.user_id.as_deref().is_none_or(|id| r.user_id == id))
            .collect();

        // Newest first; id breaks creation-time ties so pagination slices
        // stay disjoint
        matching.sort_by(|a, b| {
            b.created_at.cmp(&a.created_at).then_with(|| b.id.as_u64().cmp(&a.id.as_u64()))
        });

        let total = matching.len();
        let reviews =
            matching.into_iter().skip(filter.offset).take(filter.limit).cloned().collect();

        Ok(ReviewListing { reviews, total })
    }

    async fn find_by_id(&self, id: ReviewId) -> Result<Option<Review>, RepositoryError> {
        let state = self.state.read().await;
        Ok(state.reviews.get(&id.as_u64()).cloned())
    }

    async fn insert(&self, mut review: Review) -> Result<ReviewInsert, RepositoryError> {
        let mut state = self.state.write().await;

        let duplicate = state
            .reviews
            .values()
            .any(|r| r.movie_id == review.movie_id && r.user_id == review.user_id);
        if duplicate {
            return Ok(ReviewInsert::Duplicate);
        }

        let id = state.next_id;
        state.next_id += 1;
        review.id = ReviewId::new(id);
        state.reviews.insert(id, review.clone());

        Ok(ReviewInsert::Created(review))
    }

    async fn update(
        &self,
        id: ReviewId,
        rating: Option<u8>,
        comment: Option<String>,
    ) -> Result<Option<Review>, RepositoryError> {
        let mut state = self.state.write().await;

        Ok(state.reviews.get_mut(&id.as_u64()).map(|review| {
            review.apply_update(rating, comment);
            review.clone()
        }))
    }

    async fn delete(&self, id: ReviewId) -> Result<bool, RepositoryError> {
        let mut state = self.state.write().await;
        Ok(state.reviews.remove(&id.as_u64()).is_some())
    }

    async fn mark_helpful(&self, id: ReviewId) -> Result<Option<u32>, RepositoryError> {
        let mut state = self.state.write().await;
        Ok(state.reviews.get_mut(&id.as_u64()).map(Review::mark_helpful))
    }

    async fn stats(&self) -> Result<ReviewStats, RepositoryError> {
        let state = self.state.read().await;

        let total_reviews = state.reviews.len();
        let mut rating_distribution = [0u32; 5];
        let mut rating_sum: u64 = 0;
        for review in state.reviews.values() {
            rating_sum += u64::from(review.rating);
            if (1..=5).contains(&review.rating) {
                rating_distribution[usize::from(review.rating) - 1] += 1;
            }
        }

        let average_rating =
            if total_reviews == 0 { 0.0 } else { rating_sum as f64 / total_reviews as f64 };

        Ok(ReviewStats { total_reviews, average_rating, rating_distribution })
    }
}

/// In-memory user store, keyed by id
pub struct InMemoryUserRepository {
    state: RwLock<HashMap<String, User>>,
}

impl InMemoryUserRepository {
    /// Create an empty store
    #[must_use]
    pub fn new() -> Self {
        Self { state: RwLock::new(HashMap::new()) }
    }

    /// Create a store pre-populated with the development sample users
    #[must_use]
    pub fn seeded() -> Self {
        let seeds = [
            User {
                id: "user1".to_string(),
                username: "CinemaLover".to_string(),
                email: "cinemalover@example.com".to_string(),
                bio: "Passionate about cinema and storytelling. Love discussing movies and \
                      discovering hidden gems."
                    .to_string(),
                join_date: seed_timestamp("2024-01-15T00:00:00Z"),
                avatar: None,
                total_reviews: 12,
                average_rating: 4.2,
                favorite_genres: vec![
                    "Action".to_string(),
                    "Drama".to_string(),
                    "Sci-Fi".to_string(),
                ],
                reviews_helpful: 156,
                created_at: seed_timestamp("2024-01-15T00:00:00Z"),
                updated_at: seed_timestamp("2025-10-30T10:30:00Z"),
            },
            User {
                id: "user2".to_string(),
                username: "MovieBuff2024".to_string(),
                email: "moviebuff@example.com".to_string(),
                bio: "Movie enthusiast since childhood. Always looking for the next great film \
                      to watch."
                    .to_string(),
                join_date: seed_timestamp("2024-03-22T00:00:00Z"),
                avatar: None,
                total_reviews: 8,
                average_rating: 4.5,
                favorite_genres: vec![
                    "Comedy".to_string(),
                    "Drama".to_string(),
                    "Romance".to_string(),
                ],
                reviews_helpful: 89,
                created_at: seed_timestamp("2024-03-22T00:00:00Z"),
                updated_at: seed_timestamp("2025-10-29T14:20:00Z"),
            },
            User {
                id: "user3".to_string(),
                username: "FilmCritic".to_string(),
                email: "filmcritic@example.com".to_string(),
                bio: "Professional film critic and movie blogger. Reviewing films for over 5 \
                      years."
                    .to_string(),
                join_date: seed_timestamp("2023-08-10T00:00:00Z"),
                avatar: None,
                total_reviews: 25,
                average_rating: 3.8,
                favorite_genres: vec![
                    "Drama".to_string(),
                    "Thriller".to_string(),
                    "Art House".to_string(),
                ],
                reviews_helpful: 234,
                created_at: seed_timestamp("2023-08-10T00:00:00Z"),
                updated_at: seed_timestamp("2025-10-28T16:45:00Z"),
            },
        ];

        let users = seeds.into_iter().map(|u| (u.id.clone(), u)).collect();
        Self { state: RwLock::new(users) }
    }
}

impl Default for InMemoryUserRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn list(&self, limit: usize, offset: usize) -> Result<UserListing, RepositoryError> {
        let state = self.state.read().await;

        let mut matching: Vec<&User> = state.values().collect();
        matching
            .sort_by(|a, b| b.join_date.cmp(&a.join_date).then_with(|| a.id.cmp(&b.id)));

        let total = matching.len();
        let users = matching.into_iter().skip(offset).take(limit).cloned().collect();

        Ok(UserListing { users, total })
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<User>, RepositoryError> {
        let state = self.state.read().await;
        Ok(state.get(id).cloned())
    }

    async fn insert(&self, user: User) -> Result<UserInsert, RepositoryError> {
        let mut state = self.state.write().await;

        let username = user.username.to_lowercase();
        let email = user.email.to_lowercase();
        let taken = state
            .values()
            .any(|u| u.username.to_lowercase() == username || u.email.to_lowercase() == email);
        if taken {
            return Ok(UserInsert::UsernameOrEmailTaken);
        }

        state.insert(user.id.clone(), user.clone());
        Ok(UserInsert::Created(user))
    }

    async fn update_profile(
        &self,
        id: &str,
        username: Option<String>,
        bio: Option<String>,
        favorite_genres: Option<Vec<String>>,
    ) -> Result<UserUpdate, RepositoryError> {
        let mut state = self.state.write().await;

        if !state.contains_key(id) {
            return Ok(UserUpdate::NotFound);
        }

        if let Some(new_username) = username.as_deref() {
            let lowered = new_username.to_lowercase();
            let taken =
                state.values().any(|u| u.id != id && u.username.to_lowercase() == lowered);
            if taken {
                return Ok(UserUpdate::UsernameTaken);
            }
        }

        let user = state.get_mut(id).ok_or_else(|| {
            RepositoryError::Unavailable("user vanished mid-update".to_string())
        })?;
        user.apply_profile_update(username, bio, favorite_genres);

        Ok(UserUpdate::Updated(user.clone()))
    }

    async fn delete(&self, id: &str) -> Result<bool, RepositoryError> {
        let mut state = self.state.write().await;
        Ok(state.remove(id).is_some())
    }

    async fn stats(&self) -> Result<UserStats, RepositoryError> {
        let state = self.state.read().await;

        let total_users = state.len();
        let total_reviews: u64 = state.values().map(|u| u64::from(u.total_reviews)).sum();
        let average_reviews_per_user =
            if total_users == 0 { 0.0 } else { total_reviews as f64 / total_users as f64 };

        let mut genre_counts: HashMap<&str, u32> = HashMap::new();
        for user in state.values() {
            for genre in &user.favorite_genres {
                *genre_counts.entry(genre.as_str()).or_insert(0) += 1;
            }
        }
        let mut popular_genres: Vec<GenreCount> = genre_counts
            .into_iter()
            .map(|(genre, count)| GenreCount { genre: genre.to_string(), count })
            .collect();
        popular_genres.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.genre.cmp(&b.genre)));
        popular_genres.truncate(5);

        Ok(UserStats { total_users, total_reviews, average_reviews_per_user, popular_genres })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn review_for(movie_id: u32, user_id: &str, rating: u8) -> Review {
        Review::new(
            movie_id,
            "Some Movie".to_string(),
            None,
            user_id.to_string(),
            user_id.to_uppercase(),
            rating,
            "Long enough comment for the store.".to_string(),
        )
    }

    #[tokio::test]
    async fn test_insert_assigns_sequential_ids() {
        let repo = InMemoryReviewRepository::new();

        let ReviewInsert::Created(first) = repo.insert(review_for(1, "a", 4)).await.unwrap()
        else {
            panic!("expected created");
        };
        let ReviewInsert::Created(second) = repo.insert(review_for(2, "a", 4)).await.unwrap()
        else {
            panic!("expected created");
        };

        assert_eq!(first.id, ReviewId::new(1));
        assert_eq!(second.id, ReviewId::new(2));
    }

    #[tokio::test]
    async fn test_insert_rejects_duplicate_movie_user_pair() {
        let repo = InMemoryReviewRepository::new();

        assert!(matches!(
            repo.insert(review_for(550, "u9", 5)).await.unwrap(),
            ReviewInsert::Created(_)
        ));
        assert!(matches!(
            repo.insert(review_for(550, "u9", 2)).await.unwrap(),
            ReviewInsert::Duplicate
        ));
        // Same user, different movie is fine
        assert!(matches!(
            repo.insert(review_for(13, "u9", 3)).await.unwrap(),
            ReviewInsert::Created(_)
        ));
    }

    #[tokio::test]
    async fn test_list_filters_and_paginates_newest_first() {
        let repo = InMemoryReviewRepository::seeded();

        let listing = repo
            .list(&ReviewFilter { movie_id: Some(550), user_id: None, limit: 20, offset: 0 })
            .await
            .unwrap();
        assert_eq!(listing.total, 2);
        assert!(listing.reviews.iter().all(|r| r.movie_id == 550));

        let all = repo
            .list(&ReviewFilter { movie_id: None, user_id: None, limit: 20, offset: 0 })
            .await
            .unwrap();
        let dates: Vec<_> = all.reviews.iter().map(|r| r.created_at).collect();
        let mut sorted = dates.clone();
        sorted.sort_by(|a, b| b.cmp(a));
        assert_eq!(dates, sorted);
    }

    #[tokio::test]
    async fn test_pagination_slices_are_disjoint() {
        let repo = InMemoryReviewRepository::seeded();
        let first = repo
            .list(&ReviewFilter { movie_id: None, user_id: None, limit: 2, offset: 0 })
            .await
            .unwrap();
        let second = repo
            .list(&ReviewFilter { movie_id: None, user_id: None, limit: 2, offset: 2 })
            .await
            .unwrap();

        assert_eq!(first.reviews.len(), 2);
        assert_eq!(second.reviews.len(), 1);
        for review in &first.reviews {
            assert!(second.reviews.iter().all(|r| r.id != review.id));
        }
    }

    #[tokio::test]
    async fn test_update_and_delete() {
        let repo = InMemoryReviewRepository::seeded();

        let updated = repo
            .update(ReviewId::new(1), Some(3), None)
            .await
            .unwrap()
            .expect("review exists");
        assert_eq!(updated.rating, 3);
        assert!(updated.updated_at >= updated.created_at);

        assert!(repo.delete(ReviewId::new(1)).await.unwrap());
        assert!(!repo.delete(ReviewId::new(1)).await.unwrap());
        assert!(repo.find_by_id(ReviewId::new(1)).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_mark_helpful_unknown_id() {
        let repo = InMemoryReviewRepository::new();
        assert!(repo.mark_helpful(ReviewId::new(99)).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_review_stats() {
        let repo = InMemoryReviewRepository::seeded();
        let stats = repo.stats().await.unwrap();

        assert_eq!(stats.total_reviews, 3);
        assert!((stats.average_rating - 14.0 / 3.0).abs() < f64::EPSILON);
        assert_eq!(stats.rating_distribution, [0, 0, 0, 1, 2]);
    }

    #[tokio::test]
    async fn test_review_stats_empty_store() {
        let repo = InMemoryReviewRepository::new();
        let stats = repo.stats().await.unwrap();

        assert_eq!(stats.total_reviews, 0);
        assert!((stats.average_rating - 0.0).abs() < f64::EPSILON);
    }

    #[tokio::test]
    async fn test_user_insert_uniqueness_is_case_insensitive() {
        let repo = InMemoryUserRepository::seeded();

        let dup_username =
            User::new("CINEMALOVER".to_string(), "fresh@example.com".to_string());
        assert!(matches!(
            repo.insert(dup_username).await.unwrap(),
            UserInsert::UsernameOrEmailTaken
        ));

        let dup_email =
            User::new("FreshName".to_string(), "CineMaLover@Example.com".to_string());
        assert!(matches!(
            repo.insert(dup_email).await.unwrap(),
            UserInsert::UsernameOrEmailTaken
        ));

        let fresh = User::new("FreshName".to_string(), "fresh@example.com".to_string());
        assert!(matches!(repo.insert(fresh).await.unwrap(), UserInsert::Created(_)));
    }

    #[tokio::test]
    async fn test_user_rename_conflicts() {
        let repo = InMemoryUserRepository::seeded();

        assert!(matches!(
            repo.update_profile("user1", Some("filmcritic".to_string()), None, None)
                .await
                .unwrap(),
            UserUpdate::UsernameTaken
        ));
        // Renaming to your own name (case shifted) is allowed
        assert!(matches!(
            repo.update_profile("user1", Some("cinemalover".to_string()), None, None)
                .await
                .unwrap(),
            UserUpdate::Updated(_)
        ));
        assert!(matches!(
            repo.update_profile("nobody", Some("x".to_string()), None, None).await.unwrap(),
            UserUpdate::NotFound
        ));
    }

    #[tokio::test]
    async fn test_user_list_sorted_by_join_date() {
        let repo = InMemoryUserRepository::seeded();
        let listing = repo.list(20, 0).await.unwrap();

        assert_eq!(listing.total, 3);
        assert_eq!(listing.users[0].id, "user2"); // joined 2024-03
        assert_eq!(listing.users[1].id, "user1"); // joined 2024-01
        assert_eq!(listing.users[2].id, "user3"); // joined 2023-08
    }

    #[tokio::test]
    async fn test_user_stats_popular_genres() {
        let repo = InMemoryUserRepository::seeded();
        let stats = repo.stats().await.unwrap();

        assert_eq!(stats.total_users, 3);
        assert_eq!(stats.total_reviews, 45);
        assert_eq!(stats.popular_genres[0].genre, "Drama");
        assert_eq!(stats.popular_genres[0].count, 3);
        assert!(stats.popular_genres.len() <= 5);
    }
}
