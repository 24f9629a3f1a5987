use axum::{
    middleware::{from_fn, from_fn_with_state},
    routing::{delete, get, post, put},
    Router,
};

use crate::presentation::handlers::{self, AppState};
use crate::presentation::middleware::auth::{optional_auth, require_auth};
use crate::presentation::middleware::validation::{
    create_review_rules, create_user_rules, delete_user_rules, movie_id_rules,
    movie_search_rules, review_id_rules, review_list_rules, review_mutation_rules,
    update_review_rules, update_user_rules, user_list_rules, validate,
};

/// Create the `/api` route tree.
///
/// Middleware runs auth first, then validation, then the handler; each route
/// group layers exactly the pipeline it needs.
pub fn api_routes(state: &AppState) -> Router<AppState> {
    Router::new()
        .nest("/movies", movie_routes())
        .nest("/reviews", review_routes(state))
        .nest("/users", user_routes(state))
}

fn movie_routes() -> Router<AppState> {
    let search = Router::new()
        .route("/search", get(handlers::movies::search_movies))
        .route_layer(from_fn(validate(movie_search_rules())));

    let listings = Router::new()
        .route("/popular", get(handlers::movies::popular_movies))
        .route("/trending/day", get(handlers::movies::trending_movies));

    let detail = Router::new()
        .route("/{id}", get(handlers::movies::get_movie))
        .route_layer(from_fn(validate(movie_id_rules())));

    search.merge(listings).merge(detail)
}

fn review_routes(state: &AppState) -> Router<AppState> {
    let list = Router::new()
        .route("/", get(handlers::reviews::list_reviews))
        .route_layer(from_fn(validate(review_list_rules())));

    let stats = Router::new().route("/stats/summary", get(handlers::reviews::review_stats));

    let get_one = Router::new()
        .route("/{id}", get(handlers::reviews::get_review))
        .route_layer(from_fn(validate(review_id_rules())));

    let create = Router::new()
        .route("/", post(handlers::reviews::create_review))
        .route_layer(from_fn(validate(create_review_rules())))
        .route_layer(from_fn_with_state(state.clone(), require_auth));

    let update = Router::new()
        .route("/{id}", put(handlers::reviews::update_review))
        .route_layer(from_fn(validate(update_review_rules())))
        .route_layer(from_fn_with_state(state.clone(), require_auth));

    let remove = Router::new()
        .route("/{id}", delete(handlers::reviews::delete_review))
        .route_layer(from_fn(validate(review_mutation_rules())))
        .route_layer(from_fn_with_state(state.clone(), require_auth));

    let helpful = Router::new()
        .route("/{id}/helpful", post(handlers::reviews::mark_helpful))
        .route_layer(from_fn(validate(review_mutation_rules())));

    list.merge(stats).merge(get_one).merge(create).merge(update).merge(remove).merge(helpful)
}

fn user_routes(state: &AppState) -> Router<AppState> {
    let list = Router::new()
        .route("/", get(handlers::users::list_users))
        .route_layer(from_fn(validate(user_list_rules())));

    let stats = Router::new().route("/stats/summary", get(handlers::users::user_stats));

    let create = Router::new()
        .route("/", post(handlers::users::create_user))
        .route_layer(from_fn(validate(create_user_rules())));

    let get_one = Router::new().route("/{id}", get(handlers::users::get_user));

    let profile = Router::new().route("/{id}/profile", get(handlers::users::get_user_profile));

    let update = Router::new()
        .route("/{id}", put(handlers::users::update_user))
        .route_layer(from_fn(validate(update_user_rules())));

    let remove = Router::new()
        .route("/{id}", delete(handlers::users::delete_user))
        .route_layer(from_fn(validate(delete_user_rules())));

    // Profile projection depends on who is asking, so the whole group gets
    // the non-blocking auth pass
    list.merge(stats)
        .merge(create)
        .merge(get_one)
        .merge(profile)
        .merge(update)
        .merge(remove)
        .route_layer(from_fn_with_state(state.clone(), optional_auth))
}
