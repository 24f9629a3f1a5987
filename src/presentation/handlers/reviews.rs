use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
    Extension,
};
use tracing::{debug, info};

use super::{round_to_tenth, AppState};
use crate::application::dto::{
    ActingUserRequest, CreateReviewRequest, HelpfulResponse, MessageResponse, ReviewListQuery,
    ReviewListResponse, ReviewResponse, ReviewStatsResponse, UpdateReviewRequest,
};
use crate::domain::entities::{Review, ReviewId};
use crate::domain::repositories::{ReviewFilter, ReviewInsert};
use crate::presentation::middleware::auth::Identity;
use crate::presentation::middleware::error::AppError;

const DEFAULT_LIMIT: usize = 20;

/// `GET /api/reviews?movieId=&userId=&limit=&offset=`
pub async fn list_reviews(
    State(state): State<AppState>,
    Query(query): Query<ReviewListQuery>,
) -> Result<Json<ReviewListResponse>, AppError> {
    let limit = query.limit.unwrap_or(DEFAULT_LIMIT);
    let offset = query.offset.unwrap_or(0);

    let filter =
        ReviewFilter { movie_id: query.movie_id, user_id: query.user_id, limit, offset };
    let listing = state.reviews.list(&filter).await?;

    Ok(Json(ReviewListResponse {
        reviews: listing.reviews,
        total: listing.total,
        limit,
        offset,
    }))
}

/// `GET /api/reviews/{id}`
pub async fn get_review(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> Result<Json<Review>, AppError> {
    state
        .reviews
        .find_by_id(ReviewId::new(id))
        .await?
        .map(Json)
        .ok_or(AppError::NotFound { resource: "Review".to_string() })
}

/// `POST /api/reviews` (auth required)
pub async fn create_review(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Json(body): Json<CreateReviewRequest>,
) -> Result<(StatusCode, Json<ReviewResponse>), AppError> {
    // A verified token overrides the claimed author id
    let owner = identity.effective_requester(Some(body.user_id.as_str())).to_string();

    let review = Review::new(
        body.movie_id,
        body.movie_title,
        body.movie_poster,
        owner,
        body.username,
        body.rating,
        body.comment,
    );

    match state.reviews.insert(review).await? {
        ReviewInsert::Created(review) => {
            info!(review_id = %review.id, movie_id = review.movie_id, "review created");
            Ok((
                StatusCode::CREATED,
                Json(ReviewResponse {
                    message: "Review created successfully".to_string(),
                    review,
                }),
            ))
        }
        ReviewInsert::Duplicate => Err(AppError::Conflict {
            message: "You have already reviewed this movie. Use PUT to update your review."
                .to_string(),
        }),
    }
}

/// `PUT /api/reviews/{id}` (auth required, owner only)
pub async fn update_review(
    State(state): State<AppState>,
    Path(id): Path<u64>,
    Extension(identity): Extension<Identity>,
    body: Option<Json<UpdateReviewRequest>>,
) -> Result<Json<ReviewResponse>, AppError> {
    let body = body.map(|Json(b)| b).unwrap_or_default();
    let review_id = ReviewId::new(id);

    let existing = state
        .reviews
        .find_by_id(review_id)
        .await?
        .ok_or(AppError::NotFound { resource: "Review".to_string() })?;

    let requester = identity.effective_requester(body.user_id.as_deref());
    if !existing.is_owned_by(requester) {
        return Err(AppError::Authorization {
            message: "You can only update your own reviews".to_string(),
        });
    }

    let review = state
        .reviews
        .update(review_id, body.rating, body.comment)
        .await?
        .ok_or(AppError::NotFound { resource: "Review".to_string() })?;

    Ok(Json(ReviewResponse { message: "Review updated successfully".to_string(), review }))
}

/// `DELETE /api/reviews/{id}` (auth required, owner only)
pub async fn delete_review(
    State(state): State<AppState>,
    Path(id): Path<u64>,
    Extension(identity): Extension<Identity>,
    body: Option<Json<ActingUserRequest>>,
) -> Result<Json<MessageResponse>, AppError> {
    let claimed = body.as_ref().and_then(|Json(b)| b.user_id.as_deref());
    let review_id = ReviewId::new(id);

    let existing = state
        .reviews
        .find_by_id(review_id)
        .await?
        .ok_or(AppError::NotFound { resource: "Review".to_string() })?;

    if !existing.is_owned_by(identity.effective_requester(claimed)) {
        return Err(AppError::Authorization {
            message: "You can only delete your own reviews".to_string(),
        });
    }

    state.reviews.delete(review_id).await?;
    debug!(review_id = %review_id, "review deleted");

    Ok(Json(MessageResponse { message: "Review deleted successfully".to_string() }))
}

/// `POST /api/reviews/{id}/helpful`
pub async fn mark_helpful(
    State(state): State<AppState>,
    Path(id): Path<u64>,
    _body: Option<Json<ActingUserRequest>>,
) -> Result<Json<HelpfulResponse>, AppError> {
    state
        .reviews
        .mark_helpful(ReviewId::new(id))
        .await?
        .map(|helpful| {
            Json(HelpfulResponse { message: "Review marked as helpful".to_string(), helpful })
        })
        .ok_or(AppError::NotFound { resource: "Review".to_string() })
}

/// `GET /api/reviews/stats/summary`
pub async fn review_stats(
    State(state): State<AppState>,
) -> Result<Json<ReviewStatsResponse>, AppError> {
    let stats = state.reviews.stats().await?;

    let rating_distribution =
        (1..=5u8).zip(stats.rating_distribution).collect();

    Ok(Json(ReviewStatsResponse {
        total_reviews: stats.total_reviews,
        average_rating: round_to_tenth(stats.average_rating),
        rating_distribution,
    }))
}
