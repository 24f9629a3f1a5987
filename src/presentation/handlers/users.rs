use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
    Extension,
};
use serde_json::{json, Value};
use tracing::info;

use super::{requester_id, round_to_tenth, AppState};
use crate::application::dto::{
    CreateUserRequest, DeleteUserRequest, MessageResponse, ProfileQuery, PublicUserProfile,
    UpdateUserRequest, UserCreatedResponse, UserListQuery, UserListResponse, UserStatsResponse,
    UserUpdatedResponse,
};
use crate::domain::entities::User;
use crate::domain::repositories::{UserInsert, UserUpdate};
use crate::presentation::middleware::auth::Identity;
use crate::presentation::middleware::error::AppError;

const DEFAULT_LIMIT: usize = 20;

/// `GET /api/users?limit=&offset=`
pub async fn list_users(
    State(state): State<AppState>,
    Query(query): Query<UserListQuery>,
) -> Result<Json<UserListResponse>, AppError> {
    let limit = query.limit.unwrap_or(DEFAULT_LIMIT);
    let offset = query.offset.unwrap_or(0);

    let listing = state.users.list(limit, offset).await?;
    let users = listing.users.iter().map(PublicUserProfile::from).collect();

    Ok(Json(UserListResponse { users, total: listing.total, limit, offset }))
}

/// `GET /api/users/{id}`
pub async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<PublicUserProfile>, AppError> {
    state
        .users
        .find_by_id(&id)
        .await?
        .map(|user| Json(PublicUserProfile::from(&user)))
        .ok_or(AppError::NotFound { resource: "User".to_string() })
}

/// `GET /api/users/{id}/profile`
///
/// The owner sees the full record; everyone else gets the public projection.
pub async fn get_user_profile(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(query): Query<ProfileQuery>,
    identity: Option<Extension<Identity>>,
) -> Result<Json<Value>, AppError> {
    let user = state
        .users
        .find_by_id(&id)
        .await?
        .ok_or(AppError::NotFound { resource: "User".to_string() })?;

    let identity = identity.map(|Extension(i)| i);
    let requester = requester_id(identity.as_ref(), query.requesting_user_id.as_deref());

    if requester == Some(user.id.as_str()) {
        Ok(Json(json!(user)))
    } else {
        Ok(Json(json!(PublicUserProfile::from(&user))))
    }
}

/// `POST /api/users`
pub async fn create_user(
    State(state): State<AppState>,
    Json(body): Json<CreateUserRequest>,
) -> Result<(StatusCode, Json<UserCreatedResponse>), AppError> {
    let user = User::new(body.username, body.email.to_lowercase());

    match state.users.insert(user).await? {
        UserInsert::Created(user) => {
            info!(user_id = %user.id, "user created");
            Ok((
                StatusCode::CREATED,
                Json(UserCreatedResponse {
                    message: "User created successfully".to_string(),
                    user: PublicUserProfile::from(&user),
                }),
            ))
        }
        UserInsert::UsernameOrEmailTaken => Err(AppError::Conflict {
            message: "Username or email already exists".to_string(),
        }),
    }
}

/// `PUT /api/users/{id}` (owner only)
pub async fn update_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
    identity: Option<Extension<Identity>>,
    body: Option<Json<UpdateUserRequest>>,
) -> Result<Json<UserUpdatedResponse>, AppError> {
    let body = body.map(|Json(b)| b).unwrap_or_default();

    let user = state
        .users
        .find_by_id(&id)
        .await?
        .ok_or(AppError::NotFound { resource: "User".to_string() })?;

    let identity = identity.map(|Extension(i)| i);
    let requester = requester_id(identity.as_ref(), body.requesting_user_id.as_deref());
    if requester != Some(user.id.as_str()) {
        return Err(AppError::Authorization {
            message: "You can only update your own profile".to_string(),
        });
    }

    match state
        .users
        .update_profile(&id, body.username, body.bio, body.favorite_genres)
        .await?
    {
        UserUpdate::Updated(user) => Ok(Json(UserUpdatedResponse {
            message: "Profile updated successfully".to_string(),
            user,
        })),
        UserUpdate::UsernameTaken => {
            Err(AppError::Conflict { message: "Username already taken".to_string() })
        }
        UserUpdate::NotFound => Err(AppError::NotFound { resource: "User".to_string() }),
    }
}

/// `DELETE /api/users/{id}` (owner only)
pub async fn delete_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
    identity: Option<Extension<Identity>>,
    body: Option<Json<DeleteUserRequest>>,
) -> Result<Json<MessageResponse>, AppError> {
    let claimed = body.as_ref().and_then(|Json(b)| b.requesting_user_id.as_deref());

    let user = state
        .users
        .find_by_id(&id)
        .await?
        .ok_or(AppError::NotFound { resource: "User".to_string() })?;

    let identity = identity.map(|Extension(i)| i);
    if requester_id(identity.as_ref(), claimed) != Some(user.id.as_str()) {
        return Err(AppError::Authorization {
            message: "You can only delete your own account".to_string(),
        });
    }

    state.users.delete(&id).await?;
    info!(user_id = %id, "user account deleted");

    Ok(Json(MessageResponse { message: "User account deleted successfully".to_string() }))
}

/// `GET /api/users/stats/summary`
pub async fn user_stats(
    State(state): State<AppState>,
) -> Result<Json<UserStatsResponse>, AppError> {
    let stats = state.users.stats().await?;

    Ok(Json(UserStatsResponse {
        total_users: stats.total_users,
        total_reviews: stats.total_reviews,
        average_reviews_per_user: round_to_tenth(stats.average_reviews_per_user),
        popular_genres: stats.popular_genres,
    }))
}
