//! Tapfolio API service
//!
//! Backend for the Tapfolio digital business-card platform: account
//! registration and login, profile records with contact fields and social
//! links, public profile sharing, vCard export, image upload, and
//! best-effort view/download analytics.

pub mod analytics;
pub mod error;
pub mod jwt;
pub mod middleware;
pub mod models;
pub mod rate_limiter;
pub mod repositories;
pub mod routes;
pub mod session;
pub mod storage;
pub mod validation;
pub mod vcard;

use sqlx::PgPool;

use crate::{
    analytics::AnalyticsRecorder,
    jwt::JwtService,
    rate_limiter::RateLimiter,
    repositories::{AccountRepository, ProfileRepository},
    session::SessionConfig,
    storage::MediaStorage,
};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub db_pool: PgPool,
    pub jwt_service: JwtService,
    pub session_config: SessionConfig,
    pub account_repository: AccountRepository,
    pub profile_repository: ProfileRepository,
    pub analytics: AnalyticsRecorder,
    pub storage: MediaStorage,
    pub rate_limiter: RateLimiter,
}
