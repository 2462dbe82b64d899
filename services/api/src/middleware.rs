//! Middleware for session token extraction and authentication
//!
//! The gate reads the session cookie first and falls back to a bearer
//! header, so browser clients and API clients share one verification path.

use axum::{
    body::Body,
    extract::State,
    http::{HeaderMap, Request, header},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::CookieJar;
use uuid::Uuid;

use crate::{AppState, error::ApiError, session::AUTH_COOKIE};

/// Authenticated account identity extracted from a verified token
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    pub verified: bool,
}

/// API paths that require authentication and answer 401 as JSON
const PROTECTED_API_PATHS: &[&str] = &[
    "/auth/me",
    "/profile",
    "/profile/contact-fields",
    "/profile/social-links",
    "/vcard",
    "/upload",
];

/// Page prefixes that redirect unauthenticated visitors to the login page
const PROTECTED_PAGE_PREFIXES: &[&str] = &["/dashboard", "/settings", "/cards"];

/// How a path is treated by the authorization gate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteClass {
    Public,
    ProtectedApi,
    ProtectedPage,
}

/// Classify a request path against the fixed protected sets
pub fn classify_path(path: &str) -> RouteClass {
    if PROTECTED_PAGE_PREFIXES
        .iter()
        .any(|prefix| path == *prefix || path.starts_with(&format!("{}/", prefix)))
    {
        return RouteClass::ProtectedPage;
    }

    if PROTECTED_API_PATHS.contains(&path) {
        return RouteClass::ProtectedApi;
    }

    RouteClass::Public
}

/// Extract a bearer token from the Authorization header
fn bearer_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(|token| token.to_string())
}

/// Middleware that requires a valid session token
///
/// On success the verified claims are inserted into the request extensions
/// as an [`AuthUser`]; protected handlers never run without one.
pub async fn require_auth(
    State(state): State<AppState>,
    jar: CookieJar,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    // Try cookie first, then header
    let token = jar
        .get(AUTH_COOKIE)
        .map(|cookie| cookie.value().to_string())
        .or_else(|| bearer_token(req.headers()));

    let claims = token.as_deref().and_then(|t| state.jwt_service.verify(t));

    match claims {
        Some(claims) => {
            req.extensions_mut().insert(AuthUser {
                id: claims.sub,
                email: claims.email,
                name: claims.name,
                verified: claims.verified,
            });
            next.run(req).await
        }
        None => reject(req.uri().path()),
    }
}

/// Build the rejection response for an unauthenticated request
fn reject(path: &str) -> Response {
    match classify_path(path) {
        RouteClass::ProtectedPage => {
            let target = format!("/login?redirect={}", urlencoding::encode(path));
            Redirect::to(&target).into_response()
        }
        _ => ApiError::Authentication("Authentication required".to_string()).into_response(),
    }
}
