//! Declarative request validation.
//!
//! Each route declares an ordered [`RuleSet`] of field constraints; one
//! evaluator interprets them all. Every rule is evaluated independently and
//! all failures are collected into a single 400 response, so clients see the
//! complete picture in one round trip. Fields that pass are sanitized
//! (trimmed, HTML-escaped, numeric strings canonicalized) in place before
//! the handler runs.

use std::pin::Pin;
use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    extract::{FromRequestParts, RawPathParams, Request},
    http::{header, request::Parts, uri::PathAndQuery, HeaderValue, Uri},
    middleware::Next,
    response::Response,
};
use regex::Regex;
use serde_json::{Number, Value};
use tracing::debug;

use super::error::{AppError, FieldError};

/// Matches the JSON body-size limit of the server shell
const MAX_BODY_BYTES: usize = 10 * 1024 * 1024;

const EMAIL_PATTERN: &str = r"^[^\s@]+@[^\s@]+\.[^\s@]+$";
const USERNAME_PATTERN: &str = r"^[A-Za-z0-9_-]+$";

/// Where a field is read from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldLocation {
    Path,
    Query,
    Body,
}

/// A single constraint
#[derive(Debug, Clone)]
enum Check {
    Int { min: i64, max: i64 },
    Length { min: usize, max: usize },
    Pattern(Regex),
}

/// Declarative constraints for one field of a route
#[derive(Debug, Clone)]
pub struct FieldRule {
    field: &'static str,
    location: FieldLocation,
    required: Option<&'static str>,
    checks: Vec<(Check, &'static str)>,
    sanitize: bool,
}

impl FieldRule {
    #[must_use]
    pub fn path(field: &'static str) -> Self {
        Self::at(FieldLocation::Path, field)
    }

    #[must_use]
    pub fn query(field: &'static str) -> Self {
        Self::at(FieldLocation::Query, field)
    }

    #[must_use]
    pub fn body(field: &'static str) -> Self {
        Self::at(FieldLocation::Body, field)
    }

    fn at(location: FieldLocation, field: &'static str) -> Self {
        Self { field, location, required: None, checks: Vec::new(), sanitize: false }
    }

    /// Mark the field required, with the message reported when it is missing
    /// or blank
    #[must_use]
    pub fn required(mut self, message: &'static str) -> Self {
        self.required = Some(message);
        self
    }

    /// Require an integer (JSON number or numeric string) within `min..=max`
    #[must_use]
    pub fn int_range(mut self, min: i64, max: i64, message: &'static str) -> Self {
        self.checks.push((Check::Int { min, max }, message));
        self
    }

    /// Require a string whose trimmed length is within `min..=max`
    #[must_use]
    pub fn length(mut self, min: usize, max: usize, message: &'static str) -> Self {
        self.checks.push((Check::Length { min, max }, message));
        self
    }

    /// Require the trimmed value to match the pattern
    ///
    /// # Panics
    /// Panics when given an invalid pattern; rule sets are built from
    /// hard-coded patterns at router construction.
    #[must_use]
    pub fn pattern(mut self, pattern: &str, message: &'static str) -> Self {
        let regex = Regex::new(pattern).expect("hard-coded rule pattern");
        self.checks.push((Check::Pattern(regex), message));
        self
    }

    /// Trim and HTML-escape the value in place once validation passes
    #[must_use]
    pub fn escaped(mut self) -> Self {
        self.sanitize = true;
        self
    }

    fn wants_int(&self) -> bool {
        self.checks.iter().any(|(check, _)| matches!(check, Check::Int { .. }))
    }
}

/// An ordered, shareable collection of field rules for one route
#[derive(Debug, Clone)]
pub struct RuleSet {
    rules: Arc<Vec<FieldRule>>,
}

impl RuleSet {
    #[must_use]
    pub fn new(rules: Vec<FieldRule>) -> Self {
        Self { rules: Arc::new(rules) }
    }

    fn has_body_rules(&self) -> bool {
        self.rules.iter().any(|r| r.location == FieldLocation::Body)
    }

    fn allows_body_field(&self, name: &str) -> bool {
        self.rules.iter().any(|r| r.location == FieldLocation::Body && r.field == name)
    }

    fn sanitizes_query(&self) -> bool {
        self.rules.iter().any(|r| r.location == FieldLocation::Query && r.sanitize)
    }
}

/// Raw field value before any coercion
enum Raw<'a> {
    Str(&'a str),
    Json(&'a Value),
}

impl Raw<'_> {
    fn as_text(&self) -> Option<&str> {
        match self {
            Raw::Str(s) => Some(s),
            Raw::Json(Value::String(s)) => Some(s),
            Raw::Json(_) => None,
        }
    }

    fn is_blank(&self) -> bool {
        self.as_text().is_some_and(|s| s.trim().is_empty())
    }
}

fn check_passes(check: &Check, raw: &Raw<'_>) -> bool {
    match check {
        Check::Int { min, max } => parse_int(raw).is_some_and(|n| n >= *min && n <= *max),
        Check::Length { min, max } => raw.as_text().is_some_and(|s| {
            let len = s.trim().chars().count();
            len >= *min && len <= *max
        }),
        Check::Pattern(regex) => raw.as_text().is_some_and(|s| regex.is_match(s.trim())),
    }
}

fn parse_int(raw: &Raw<'_>) -> Option<i64> {
    match raw {
        Raw::Str(s) => s.trim().parse::<i64>().ok(),
        Raw::Json(Value::Number(n)) => n.as_i64(),
        Raw::Json(Value::String(s)) => s.trim().parse::<i64>().ok(),
        Raw::Json(_) => None,
    }
}

/// Escape the characters meaningful to HTML, matching the sanitizer the
/// original API applied to stored text fields
fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            '/' => out.push_str("&#x2F;"),
            _ => out.push(c),
        }
    }
    out
}

fn lookup<'a>(
    rule: &FieldRule,
    path: &'a [(String, String)],
    query: &'a [(String, String)],
    body: Option<&'a Value>,
) -> Option<Raw<'a>> {
    match rule.location {
        FieldLocation::Path => path
            .iter()
            .find(|(name, _)| name == rule.field)
            .map(|(_, value)| Raw::Str(value.as_str())),
        FieldLocation::Query => query
            .iter()
            .find(|(name, _)| name == rule.field)
            .map(|(_, value)| Raw::Str(value.as_str())),
        FieldLocation::Body => match body {
            // JSON null counts as absent, like an omitted member
            Some(Value::Object(map)) => {
                map.get(rule.field).filter(|v| !v.is_null()).map(Raw::Json)
            }
            _ => None,
        },
    }
}

/// Evaluate every rule independently, collecting all failures in rule order
fn evaluate(
    rules: &RuleSet,
    path: &[(String, String)],
    query: &[(String, String)],
    body: Option<&Value>,
) -> Vec<FieldError> {
    let mut errors = Vec::new();

    for rule in rules.rules.iter() {
        match lookup(rule, path, query, body) {
            None => {
                if let Some(message) = rule.required {
                    errors.push(FieldError::new(rule.field, message));
                }
            }
            Some(raw) => {
                if let Some(message) = rule.required {
                    if raw.is_blank() {
                        errors.push(FieldError::new(rule.field, message));
                        continue;
                    }
                }
                for (check, message) in &rule.checks {
                    if !check_passes(check, &raw) {
                        errors.push(FieldError::new(rule.field, *message));
                    }
                }
            }
        }
    }

    // Bodies are closed shapes: members without a rule are rejected by name
    if rules.has_body_rules() {
        if let Some(Value::Object(map)) = body {
            for key in map.keys() {
                if !rules.allows_body_field(key) {
                    errors.push(FieldError::new(key.clone(), "Unknown field"));
                }
            }
        }
    }

    errors
}

/// Trim/escape passing string fields and canonicalize numeric strings so the
/// handler's typed DTO deserializes cleanly
fn sanitize_body(rules: &RuleSet, body: &mut Value) {
    let Value::Object(map) = body else { return };

    for rule in rules.rules.iter().filter(|r| r.location == FieldLocation::Body) {
        let Some(value) = map.get_mut(rule.field) else { continue };

        if let Value::String(s) = value {
            if rule.wants_int() {
                if let Ok(n) = s.trim().parse::<i64>() {
                    *value = Value::Number(Number::from(n));
                    continue;
                }
            }
            let cleaned =
                if rule.sanitize { escape_html(s.trim()) } else { s.trim().to_string() };
            *value = Value::String(cleaned);
        }
    }
}

fn sanitize_query(rules: &RuleSet, parts: &mut Parts, pairs: &[(String, String)]) {
    let rewritten: Vec<(String, String)> = pairs
        .iter()
        .map(|(name, value)| {
            let sanitized = rules
                .rules
                .iter()
                .find(|r| {
                    r.location == FieldLocation::Query && r.field == name.as_str() && r.sanitize
                })
                .map(|_| escape_html(value.trim()));
            (name.clone(), sanitized.unwrap_or_else(|| value.clone()))
        })
        .collect();

    let Ok(encoded) = serde_urlencoded::to_string(&rewritten) else { return };
    let path = parts.uri.path();
    let raw = if encoded.is_empty() {
        path.to_string()
    } else {
        format!("{path}?{encoded}")
    };
    if let Ok(path_and_query) = raw.parse::<PathAndQuery>() {
        let mut uri_parts = parts.uri.clone().into_parts();
        uri_parts.path_and_query = Some(path_and_query);
        if let Ok(uri) = Uri::from_parts(uri_parts) {
            parts.uri = uri;
        }
    }
}

/// Request validation middleware for one route's rule set
pub fn validate(
    rules: RuleSet,
) -> impl Fn(
    Request,
    Next,
)
    -> Pin<Box<dyn std::future::Future<Output = Result<Response, AppError>> + Send>>
       + Clone {
    move |request: Request, next: Next| {
        let rules = rules.clone();
        Box::pin(async move {
            let (mut parts, body) = request.into_parts();

            let path_params: Vec<(String, String)> =
                match RawPathParams::from_request_parts(&mut parts, &()).await {
                    Ok(params) => {
                        params.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
                    }
                    Err(_) => Vec::new(),
                };

            let query_pairs: Vec<(String, String)> = parts
                .uri
                .query()
                .and_then(|q| serde_urlencoded::from_str(q).ok())
                .unwrap_or_default();

            // Only buffer the body on routes that declare body rules
            let mut body_value: Option<Value> = None;
            let mut passthrough: Option<Body> = None;
            if rules.has_body_rules() {
                let bytes = to_bytes(body, MAX_BODY_BYTES).await.map_err(|_| {
                    AppError::BadRequest { message: "Failed to read request body".to_string() }
                })?;
                if !bytes.is_empty() {
                    body_value = Some(serde_json::from_slice(&bytes).map_err(|e| {
                        AppError::BadRequest { message: format!("Invalid JSON: {e}") }
                    })?);
                }
            } else {
                passthrough = Some(body);
            }

            let errors = evaluate(&rules, &path_params, &query_pairs, body_value.as_ref());
            if !errors.is_empty() {
                debug!(?errors, "request validation failed");
                return Err(AppError::Validation { errors });
            }

            if rules.sanitizes_query() {
                sanitize_query(&rules, &mut parts, &query_pairs);
            }

            let body = match body_value {
                Some(mut value) => {
                    sanitize_body(&rules, &mut value);
                    let bytes = serde_json::to_vec(&value).map_err(|e| AppError::Internal {
                        message: format!("failed to re-serialize sanitized body: {e}"),
                    })?;
                    // Keep the header honest after the rewrite
                    parts.headers.insert(header::CONTENT_LENGTH, HeaderValue::from(bytes.len()));
                    Body::from(bytes)
                }
                None => passthrough.unwrap_or_else(Body::empty),
            };

            Ok(next.run(Request::from_parts(parts, body)).await)
        })
    }
}

// ---------------------------------------------------------------------------
// Per-route rule sets. These tables are the single validation authority:
// handlers never re-check the constraints declared here.
// ---------------------------------------------------------------------------

/// `POST /api/reviews`
#[must_use]
pub fn create_review_rules() -> RuleSet {
    RuleSet::new(vec![
        FieldRule::body("movieId")
            .required("Movie ID is required")
            .int_range(1, i64::from(u32::MAX), "Movie ID must be a positive integer"),
        FieldRule::body("movieTitle")
            .required("Movie title is required")
            .length(1, 200, "Movie title must be 1-200 characters")
            .escaped(),
        FieldRule::body("moviePoster"),
        FieldRule::body("userId").required("User ID is required"),
        FieldRule::body("username").required("Username is required").escaped(),
        FieldRule::body("rating")
            .required("Rating is required")
            .int_range(1, 5, "Rating must be between 1 and 5"),
        FieldRule::body("comment")
            .required("Comment is required")
            .length(10, 1000, "Comment must be 10-1000 characters")
            .escaped(),
    ])
}

/// `PUT /api/reviews/{id}`
#[must_use]
pub fn update_review_rules() -> RuleSet {
    RuleSet::new(vec![
        FieldRule::path("id").int_range(
            1,
            i64::from(u32::MAX),
            "Review ID must be a positive integer",
        ),
        FieldRule::body("rating").int_range(1, 5, "Rating must be between 1 and 5"),
        FieldRule::body("comment")
            .length(10, 1000, "Comment must be 10-1000 characters")
            .escaped(),
        FieldRule::body("userId"),
    ])
}

/// `GET /api/reviews/{id}`
#[must_use]
pub fn review_id_rules() -> RuleSet {
    RuleSet::new(vec![FieldRule::path("id").int_range(
        1,
        i64::from(u32::MAX),
        "Review ID must be a positive integer",
    )])
}

/// `DELETE /api/reviews/{id}` and `POST /api/reviews/{id}/helpful`: the id
/// plus an optional body naming the acting user
#[must_use]
pub fn review_mutation_rules() -> RuleSet {
    RuleSet::new(vec![
        FieldRule::path("id").int_range(
            1,
            i64::from(u32::MAX),
            "Review ID must be a positive integer",
        ),
        FieldRule::body("userId"),
    ])
}

/// `GET /api/reviews`
#[must_use]
pub fn review_list_rules() -> RuleSet {
    RuleSet::new(vec![
        FieldRule::query("limit").int_range(1, 100, "Limit must be between 1 and 100"),
        FieldRule::query("offset").int_range(
            0,
            i64::from(u32::MAX),
            "Offset must be a non-negative integer",
        ),
        FieldRule::query("movieId").int_range(
            1,
            i64::from(u32::MAX),
            "Movie ID must be a positive integer",
        ),
        FieldRule::query("userId"),
    ])
}

/// `GET /api/movies/search`
#[must_use]
pub fn movie_search_rules() -> RuleSet {
    RuleSet::new(vec![
        FieldRule::query("query")
            .length(1, 100, "Search query must be 1-100 characters")
            .escaped(),
        FieldRule::query("page").int_range(1, 500, "Page must be between 1 and 500"),
    ])
}

/// `GET /api/movies/{id}`
#[must_use]
pub fn movie_id_rules() -> RuleSet {
    RuleSet::new(vec![FieldRule::path("id").int_range(
        1,
        i64::from(u32::MAX),
        "Movie ID must be a positive integer",
    )])
}

/// `GET /api/users`
#[must_use]
pub fn user_list_rules() -> RuleSet {
    RuleSet::new(vec![
        FieldRule::query("limit").int_range(1, 100, "Limit must be between 1 and 100"),
        FieldRule::query("offset").int_range(
            0,
            i64::from(u32::MAX),
            "Offset must be a non-negative integer",
        ),
    ])
}

/// `POST /api/users`
#[must_use]
pub fn create_user_rules() -> RuleSet {
    RuleSet::new(vec![
        FieldRule::body("username")
            .required("Username is required")
            .length(3, 30, "Username must be 3-30 characters")
            .pattern(
                USERNAME_PATTERN,
                "Username can only contain letters, numbers, underscores, and hyphens",
            )
            .escaped(),
        FieldRule::body("email")
            .required("Email is required")
            .pattern(EMAIL_PATTERN, "Invalid email format"),
        FieldRule::body("password").required("Password is required"),
    ])
}

/// `PUT /api/users/{id}`
#[must_use]
pub fn update_user_rules() -> RuleSet {
    RuleSet::new(vec![
        FieldRule::body("username")
            .length(3, 30, "Username must be 3-30 characters")
            .pattern(
                USERNAME_PATTERN,
                "Username can only contain letters, numbers, underscores, and hyphens",
            )
            .escaped(),
        FieldRule::body("bio")
            .length(0, 500, "Bio must be no more than 500 characters")
            .escaped(),
        FieldRule::body("favoriteGenres"),
        FieldRule::body("requestingUserId"),
    ])
}

/// `DELETE /api/users/{id}`
#[must_use]
pub fn delete_user_rules() -> RuleSet {
    RuleSet::new(vec![FieldRule::body("requestingUserId")])
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use serde_json::json;

    fn eval_body(rules: &RuleSet, body: &Value) -> Vec<FieldError> {
        evaluate(rules, &[], &[], Some(body))
    }

    #[test]
    fn test_valid_create_review_body_passes() {
        let body = json!({
            "movieId": 550,
            "movieTitle": "Fight Club",
            "userId": "u9",
            "username": "x",
            "rating": 5,
            "comment": "Loved every minute of it"
        });

        assert!(eval_body(&create_review_rules(), &body).is_empty());
    }

    #[test]
    fn test_all_failures_are_collected_in_rule_order() {
        let body = json!({
            "movieTitle": "Fight Club",
            "userId": "u9",
            "username": "x",
            "rating": 9,
            "comment": "short"
        });

        let errors = eval_body(&create_review_rules(), &body);
        let fields: Vec<&str> = errors.iter().map(|e| e.field.as_str()).collect();
        assert_eq!(fields, vec!["movieId", "rating", "comment"]);
    }

    #[rstest]
    #[case(json!(0))]
    #[case(json!(6))]
    #[case(json!("ten"))]
    #[case(json!(4.5))]
    #[case(json!(true))]
    fn test_rating_rejects_out_of_range_and_wrong_types(#[case] rating: Value) {
        let body = json!({
            "movieId": 550,
            "movieTitle": "Fight Club",
            "userId": "u9",
            "username": "x",
            "rating": rating,
            "comment": "Loved every minute of it"
        });

        let errors = eval_body(&create_review_rules(), &body);
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, "rating");
        assert_eq!(errors[0].message, "Rating must be between 1 and 5");
    }

    #[test]
    fn test_numeric_strings_are_coerced() {
        let rules = create_review_rules();
        let mut body = json!({
            "movieId": "550",
            "movieTitle": "Fight Club",
            "userId": "u9",
            "username": "x",
            "rating": "4",
            "comment": "Loved every minute of it"
        });

        assert!(eval_body(&rules, &body).is_empty());
        sanitize_body(&rules, &mut body);
        assert_eq!(body["movieId"], json!(550));
        assert_eq!(body["rating"], json!(4));
    }

    #[test]
    fn test_required_fields_report_missing_and_blank() {
        let errors = eval_body(&create_review_rules(), &json!({}));
        assert!(errors.iter().any(|e| e.field == "movieId"));
        assert!(errors.iter().any(|e| e.field == "comment"));

        let blank = json!({
            "movieId": 550,
            "movieTitle": "   ",
            "userId": "u9",
            "username": "x",
            "rating": 5,
            "comment": "Loved every minute of it"
        });
        let errors = eval_body(&create_review_rules(), &blank);
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].message, "Movie title is required");
    }

    #[test]
    fn test_null_optional_field_is_treated_as_absent() {
        let body = json!({
            "movieId": 550,
            "movieTitle": "Fight Club",
            "moviePoster": null,
            "userId": "u9",
            "username": "x",
            "rating": 5,
            "comment": "Loved every minute of it"
        });

        assert!(eval_body(&create_review_rules(), &body).is_empty());
    }

    #[test]
    fn test_unknown_body_fields_are_rejected_by_name() {
        let body = json!({
            "movieId": 550,
            "movieTitle": "Fight Club",
            "userId": "u9",
            "username": "x",
            "rating": 5,
            "comment": "Loved every minute of it",
            "isAdmin": true
        });

        let errors = eval_body(&create_review_rules(), &body);
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, "isAdmin");
        assert_eq!(errors[0].message, "Unknown field");
    }

    #[test]
    fn test_optional_rules_skip_missing_fields() {
        let errors = eval_body(&update_review_rules(), &json!({}));
        assert!(errors.is_empty());

        let errors = eval_body(&update_review_rules(), &json!({"rating": 6}));
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, "rating");
    }

    #[test]
    fn test_path_rule_rejects_non_numeric_id() {
        let path = vec![("id".to_string(), "abc".to_string())];
        let errors = evaluate(&review_id_rules(), &path, &[], None);

        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].message, "Review ID must be a positive integer");
    }

    #[rstest]
    #[case("limit", "0")]
    #[case("limit", "101")]
    #[case("offset", "-1")]
    #[case("movieId", "abc")]
    fn test_list_query_bounds(#[case] name: &str, #[case] value: &str) {
        let query = vec![(name.to_string(), value.to_string())];
        let errors = evaluate(&review_list_rules(), &[], &query, None);

        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, name);
    }

    #[test]
    fn test_sanitize_trims_and_escapes_strings() {
        let rules = create_review_rules();
        let mut body = json!({
            "movieId": 550,
            "movieTitle": "  Fight Club  ",
            "userId": "u9",
            "username": "x",
            "rating": 5,
            "comment": "  <b>Loved</b> every minute & more  "
        });

        sanitize_body(&rules, &mut body);
        assert_eq!(body["movieTitle"], "Fight Club");
        assert_eq!(body["comment"], "&lt;b&gt;Loved&lt;&#x2F;b&gt; every minute &amp; more");
        // Fields without the escape flag are trimmed only
        assert_eq!(body["userId"], "u9");
    }

    #[test]
    fn test_escape_html_covers_all_meta_characters() {
        assert_eq!(escape_html(r#"&<>"'/"#), "&amp;&lt;&gt;&quot;&#x27;&#x2F;");
        assert_eq!(escape_html("plain text"), "plain text");
    }

    #[test]
    fn test_username_pattern() {
        let good = json!({
            "username": "movie_fan-42",
            "email": "fan@example.com",
            "password": "hunter22"
        });
        assert!(eval_body(&create_user_rules(), &good).is_empty());

        let bad = json!({
            "username": "movie fan!",
            "email": "fan@example.com",
            "password": "hunter22"
        });
        let errors = eval_body(&create_user_rules(), &bad);
        assert_eq!(errors.len(), 1);
        assert!(errors[0].message.contains("letters, numbers"));
    }

    #[rstest]
    #[case("not-an-email")]
    #[case("missing@tld")]
    #[case("spaces in@example.com")]
    fn test_email_pattern_rejects(#[case] email: &str) {
        let body = json!({
            "username": "moviefan",
            "email": email,
            "password": "hunter22"
        });

        let errors = eval_body(&create_user_rules(), &body);
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].message, "Invalid email format");
    }

    #[test]
    fn test_bio_allows_empty_but_caps_length() {
        let errors = eval_body(&update_user_rules(), &json!({"bio": ""}));
        assert!(errors.is_empty());

        let long_bio = "x".repeat(501);
        let errors = eval_body(&update_user_rules(), &json!({"bio": long_bio}));
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, "bio");
    }
}
