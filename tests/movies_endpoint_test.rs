//! Movie endpoints served from the fixture catalog (no API key configured).

mod common;

use axum::http::StatusCode;
use common::TestApp;

#[tokio::test]
async fn search_requires_a_query() {
    let app = TestApp::open();
    let response = app.get("/api/movies/search").await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let body = response.json();
    assert_eq!(body["error"], "Bad Request");
    assert_eq!(body["message"], "Search query is required");
}

#[tokio::test]
async fn search_matches_titles_case_insensitively() {
    let app = TestApp::open();

    let response = app.get("/api/movies/search?query=fight").await;
    response.assert_status(StatusCode::OK);
    let body = response.json();
    assert_eq!(body["total_results"], 1);
    assert_eq!(body["results"][0]["id"], 550);

    let body = app.get("/api/movies/search?query=GUMP").await.json();
    assert_eq!(body["results"][0]["id"], 13);
}

#[tokio::test]
async fn search_with_no_match_is_an_empty_page() {
    let app = TestApp::open();
    let body = app.get("/api/movies/search?query=inception").await.json();

    assert_eq!(body["total_results"], 0);
    assert_eq!(body["results"].as_array().unwrap().len(), 0);
    assert_eq!(body["page"], 1);
}

#[tokio::test]
async fn search_validates_query_and_page() {
    let app = TestApp::open();

    let long_query = "x".repeat(101);
    let response = app.get(&format!("/api/movies/search?query={long_query}")).await;
    response.assert_status(StatusCode::BAD_REQUEST);
    assert_eq!(response.detail_fields(), vec!["query"]);

    let response = app.get("/api/movies/search?query=fight&page=501").await;
    response.assert_status(StatusCode::BAD_REQUEST);
    assert_eq!(response.detail_fields(), vec!["page"]);
}

#[tokio::test]
async fn popular_and_trending_serve_the_dataset() {
    let app = TestApp::open();

    for path in ["/api/movies/popular", "/api/movies/trending/day"] {
        let response = app.get(path).await;
        response.assert_status(StatusCode::OK);
        let body = response.json();
        assert_eq!(body["total_results"], 2);
        assert_eq!(body["total_pages"], 1);
    }
}

#[tokio::test]
async fn movie_detail_includes_credit_extras() {
    let app = TestApp::open();
    let response = app.get("/api/movies/550").await;
    response.assert_status(StatusCode::OK);

    let body = response.json();
    assert_eq!(body["title"], "Fight Club");
    assert_eq!(body["runtime"], 139);
    assert_eq!(body["tagline"], "Mischief. Mayhem. Soap.");
    assert_eq!(body["director"], "David Fincher");
    assert_eq!(body["cast"][0], "Brad Pitt");
}

#[tokio::test]
async fn movie_detail_unknown_id_is_404() {
    let app = TestApp::open();
    let response = app.get("/api/movies/999").await;

    response.assert_status(StatusCode::NOT_FOUND);
    assert_eq!(response.json()["message"], "Movie not found");
}

#[tokio::test]
async fn movie_detail_non_numeric_id_is_a_validation_error() {
    let app = TestApp::open();
    let response = app.get("/api/movies/abc").await;

    response.assert_status(StatusCode::BAD_REQUEST);
    assert_eq!(response.detail_fields(), vec!["id"]);
}
