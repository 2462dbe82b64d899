//! HTTP routes for the Tapfolio API

use axum::{
    Extension, Json, Router,
    extract::{DefaultBodyLimit, Multipart, Path, State},
    http::{HeaderMap, header},
    middleware::from_fn_with_state,
    response::IntoResponse,
    routing::{get, post, put},
};
use axum_extra::extract::cookie::CookieJar;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{info, warn};
use uuid::Uuid;

use crate::{
    AppState,
    analytics::metadata_from_headers,
    error::{ApiError, ApiResult},
    middleware::{AuthUser, require_auth},
    models::{
        AccountResponse, ContactField, EventKind, LoginCredentials, NewAccount, NewContactField,
        NewSocialLink, ProfilePatch, ProfileWithCollections, SocialLink,
    },
    storage::{ALLOWED_IMAGE_TYPES, MAX_IMAGE_BYTES},
    validation,
    vcard::{render_vcard, vcard_filename},
};

/// Response for authentication operations
#[derive(Serialize)]
pub struct AuthResponse {
    pub success: bool,
    pub user: AccountResponse,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profile: Option<ProfileWithCollections>,
}

/// Response envelope for profile reads and updates
#[derive(Serialize)]
pub struct ProfileEnvelope {
    pub success: bool,
    pub profile: ProfileWithCollections,
}

/// Request for contact-field batch replacement
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactFieldsRequest {
    pub contact_fields: Vec<NewContactField>,
}

/// Response for contact-field batch replacement
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactFieldsEnvelope {
    pub success: bool,
    pub contact_fields: Vec<ContactField>,
}

/// Request for social-link batch replacement
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SocialLinksRequest {
    pub social_links: Vec<NewSocialLink>,
}

/// Response for social-link batch replacement
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SocialLinksEnvelope {
    pub success: bool,
    pub social_links: Vec<SocialLink>,
}

/// Request for a public vCard export
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicVcardRequest {
    pub profile_id: Uuid,
}

/// Response for a public vCard export
#[derive(Serialize)]
pub struct VcardEnvelope {
    pub success: bool,
    pub vcard: String,
    pub filename: String,
}

/// Response for an image upload
#[derive(Serialize)]
pub struct UploadEnvelope {
    pub success: bool,
    pub url: String,
}

/// Create the router for the API service
pub fn create_router(state: AppState) -> Router {
    let protected = Router::new()
        .route("/auth/me", get(me))
        .route("/profile", get(get_own_profile).put(update_profile))
        .route("/profile/contact-fields", put(replace_contact_fields))
        .route("/profile/social-links", put(replace_social_links))
        .route("/vcard", get(export_own_vcard))
        .route(
            "/upload",
            post(upload_image)
                .delete(delete_image)
                .layer(DefaultBodyLimit::max(MAX_IMAGE_BYTES + 1024 * 1024)),
        )
        .route_layer(from_fn_with_state(state.clone(), require_auth));

    Router::new()
        .route("/health", get(health_check))
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
        .route("/auth/logout", post(logout))
        .route("/profile/:identifier", get(get_public_profile))
        .route("/vcard", post(export_public_vcard))
        .merge(protected)
        .with_state(state)
}

/// Health check endpoint
pub async fn health_check() -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "service": "tapfolio-api"
    }))
}

/// Rate-limit key for a client: first forwarded hop, else a shared bucket
fn client_key(headers: &HeaderMap) -> String {
    headers
        .get("x-forwarded-for")
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(',').next())
        .map(|value| value.trim().to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

/// Register a new account with its default profile
pub async fn register(
    State(state): State<AppState>,
    jar: CookieJar,
    headers: HeaderMap,
    Json(payload): Json<NewAccount>,
) -> ApiResult<impl IntoResponse> {
    if !state
        .rate_limiter
        .is_allowed(&format!("register:{}", client_key(&headers)))
    {
        return Err(ApiError::RateLimited);
    }

    validation::validate_registration(&payload).map_err(ApiError::Validation)?;

    // Friendlier error up front; the unique index has the final say
    if state
        .account_repository
        .find_by_email(&payload.email)
        .await?
        .is_some()
    {
        return Err(ApiError::Conflict(
            "An account with this email already exists".to_string(),
        ));
    }

    let (account, profile) = state.account_repository.create(&payload).await.map_err(|e| {
        ApiError::from_repo(
            e,
            "accounts_email_key",
            "An account with this email already exists",
        )
    })?;

    let token = state.jwt_service.generate_token(&account)?;
    let cookie = state.session_config.session_cookie(token);

    info!("Registered account {}", account.id);

    let body = AuthResponse {
        success: true,
        user: AccountResponse::from(&account),
        profile: Some(ProfileWithCollections {
            profile,
            contact_fields: vec![],
            social_links: vec![],
        }),
    };

    Ok((jar.add(cookie), Json(body)))
}

/// Log in with email and password
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    headers: HeaderMap,
    Json(payload): Json<LoginCredentials>,
) -> ApiResult<impl IntoResponse> {
    if !state
        .rate_limiter
        .is_allowed(&format!("login:{}", client_key(&headers)))
    {
        return Err(ApiError::RateLimited);
    }

    // Unknown email and wrong password are deliberately indistinguishable
    let invalid =
        || ApiError::Authentication("Invalid email or password".to_string());

    let Some(account) = state.account_repository.find_by_email(&payload.email).await? else {
        return Err(invalid());
    };

    if !state
        .account_repository
        .verify_password(&account, &payload.password)
        .await?
    {
        return Err(invalid());
    }

    let token = state.jwt_service.generate_token(&account)?;
    let cookie = state.session_config.session_cookie(token);

    info!("Account {} logged in", account.id);

    let body = AuthResponse {
        success: true,
        user: AccountResponse::from(&account),
        profile: None,
    };

    Ok((jar.add(cookie), Json(body)))
}

/// Log out by clearing the session cookie
///
/// Tokens are self-contained, so nothing is revoked server-side.
pub async fn logout(State(state): State<AppState>, jar: CookieJar) -> impl IntoResponse {
    let jar = jar.add(state.session_config.removal_cookie());
    (
        jar,
        Json(json!({"success": true, "message": "Logged out successfully"})),
    )
}

/// Return the authenticated account's claims
pub async fn me(Extension(user): Extension<AuthUser>) -> impl IntoResponse {
    Json(json!({
        "success": true,
        "user": {
            "id": user.id,
            "name": user.name,
            "email": user.email,
            "verified": user.verified,
        }
    }))
}

/// Get the authenticated account's full profile, private fields included
pub async fn get_own_profile(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> ApiResult<impl IntoResponse> {
    let profile = state
        .profile_repository
        .find_by_account(user.id)
        .await?
        .ok_or(ApiError::NotFound)?;

    let contact_fields = state.profile_repository.contact_fields(profile.id).await?;
    let social_links = state.profile_repository.social_links(profile.id).await?;

    Ok(Json(ProfileEnvelope {
        success: true,
        profile: ProfileWithCollections {
            profile,
            contact_fields,
            social_links,
        },
    }))
}

/// Apply a partial update to the authenticated account's profile
pub async fn update_profile(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Json(patch): Json<ProfilePatch>,
) -> ApiResult<impl IntoResponse> {
    validation::validate_profile_patch(&patch).map_err(ApiError::Validation)?;

    if let Some(custom_url) = patch.custom_url.as_deref() {
        if !custom_url.trim().is_empty()
            && state
                .profile_repository
                .custom_url_taken(custom_url, user.id)
                .await?
        {
            return Err(ApiError::Conflict(
                "This custom URL is already taken".to_string(),
            ));
        }
    }

    let profile = state
        .profile_repository
        .update(user.id, patch)
        .await
        .map_err(|e| {
            ApiError::from_repo(
                e,
                "profiles_custom_url_key",
                "This custom URL is already taken",
            )
        })?
        .ok_or(ApiError::NotFound)?;

    let contact_fields = state.profile_repository.contact_fields(profile.id).await?;
    let social_links = state.profile_repository.social_links(profile.id).await?;

    Ok(Json(ProfileEnvelope {
        success: true,
        profile: ProfileWithCollections {
            profile,
            contact_fields,
            social_links,
        },
    }))
}

/// Replace the authenticated account's contact fields as one batch
pub async fn replace_contact_fields(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Json(payload): Json<ContactFieldsRequest>,
) -> ApiResult<impl IntoResponse> {
    validation::validate_contact_fields(&payload.contact_fields).map_err(ApiError::Validation)?;

    let profile = state
        .profile_repository
        .find_by_account(user.id)
        .await?
        .ok_or(ApiError::NotFound)?;

    let contact_fields = state
        .profile_repository
        .replace_contact_fields(profile.id, &payload.contact_fields)
        .await?;

    Ok(Json(ContactFieldsEnvelope {
        success: true,
        contact_fields,
    }))
}

/// Replace the authenticated account's social links as one batch
pub async fn replace_social_links(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Json(payload): Json<SocialLinksRequest>,
) -> ApiResult<impl IntoResponse> {
    validation::validate_social_links(&payload.social_links).map_err(ApiError::Validation)?;

    let profile = state
        .profile_repository
        .find_by_account(user.id)
        .await?
        .ok_or(ApiError::NotFound)?;

    let social_links = state
        .profile_repository
        .replace_social_links(profile.id, &payload.social_links)
        .await?;

    Ok(Json(SocialLinksEnvelope {
        success: true,
        social_links,
    }))
}

/// Get a public profile by id or custom URL
///
/// Only public contact fields and links are included, and a private
/// profile is indistinguishable from a missing one.
pub async fn get_public_profile(
    State(state): State<AppState>,
    Path(identifier): Path<String>,
    headers: HeaderMap,
) -> ApiResult<impl IntoResponse> {
    let profile = state
        .profile_repository
        .find_public(&identifier)
        .await?
        .ok_or(ApiError::NotFound)?;

    let contact_fields: Vec<ContactField> = state
        .profile_repository
        .contact_fields(profile.id)
        .await?
        .into_iter()
        .filter(|field| field.is_public)
        .collect();
    let social_links: Vec<SocialLink> = state
        .profile_repository
        .social_links(profile.id)
        .await?
        .into_iter()
        .filter(|link| link.is_public)
        .collect();

    state
        .analytics
        .record(profile.id, EventKind::View, metadata_from_headers(&headers));

    Ok(Json(ProfileEnvelope {
        success: true,
        profile: ProfileWithCollections {
            profile,
            contact_fields,
            social_links,
        },
    }))
}

/// Export the authenticated account's profile as a downloadable vCard
///
/// Always allowed for the owner, regardless of visibility flags.
pub async fn export_own_vcard(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    headers: HeaderMap,
) -> ApiResult<impl IntoResponse> {
    let profile = state
        .profile_repository
        .find_by_account(user.id)
        .await?
        .ok_or(ApiError::NotFound)?;

    let contact_fields = state.profile_repository.contact_fields(profile.id).await?;
    let social_links = state.profile_repository.social_links(profile.id).await?;

    let card = render_vcard(&profile, &contact_fields, &social_links);
    let filename = vcard_filename(&profile.name);

    state.analytics.record(
        profile.id,
        EventKind::Download,
        metadata_from_headers(&headers),
    );

    let response_headers = [
        (
            header::CONTENT_TYPE,
            "text/vcard; charset=utf-8".to_string(),
        ),
        (
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{}\"", filename),
        ),
    ];

    Ok((response_headers, card))
}

/// Export a public, download-enabled profile as a vCard envelope
pub async fn export_public_vcard(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<PublicVcardRequest>,
) -> ApiResult<impl IntoResponse> {
    let profile = state
        .profile_repository
        .find_downloadable(payload.profile_id)
        .await?
        .ok_or(ApiError::NotFound)?;

    let contact_fields: Vec<ContactField> = state
        .profile_repository
        .contact_fields(profile.id)
        .await?
        .into_iter()
        .filter(|field| field.is_public)
        .collect();
    let social_links: Vec<SocialLink> = state
        .profile_repository
        .social_links(profile.id)
        .await?
        .into_iter()
        .filter(|link| link.is_public)
        .collect();

    let vcard = render_vcard(&profile, &contact_fields, &social_links);
    let filename = vcard_filename(&profile.name);

    state.analytics.record(
        profile.id,
        EventKind::Download,
        metadata_from_headers(&headers),
    );

    Ok(Json(VcardEnvelope {
        success: true,
        vcard,
        filename,
    }))
}

/// Upload a profile image and update the profile's image references
pub async fn upload_image(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    mut multipart: Multipart,
) -> ApiResult<impl IntoResponse> {
    let profile = state
        .profile_repository
        .find_by_account(user.id)
        .await?
        .ok_or(ApiError::NotFound)?;

    let mut stored = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::Validation(format!("Invalid multipart payload: {}", e)))?
    {
        if field.name() != Some("file") {
            continue;
        }

        let content_type = field.content_type().unwrap_or_default().to_string();
        if !ALLOWED_IMAGE_TYPES.contains(&content_type.as_str()) {
            return Err(ApiError::Validation(
                "Only JPEG, PNG, WebP, and GIF images are allowed".to_string(),
            ));
        }

        let data = field
            .bytes()
            .await
            .map_err(|e| ApiError::Validation(format!("Failed to read upload: {}", e)))?;
        if data.len() > MAX_IMAGE_BYTES {
            return Err(ApiError::Validation(
                "Image must be 5 MB or smaller".to_string(),
            ));
        }

        stored = Some(
            state
                .storage
                .upload_image(profile.id, &content_type, data.to_vec())
                .await?,
        );
        break;
    }

    let stored = stored.ok_or_else(|| ApiError::Validation("No file provided".to_string()))?;

    // Drop the previous object; losing it only orphans storage
    if let Some(old_key) = &profile.image_key {
        if let Err(e) = state.storage.delete_image(old_key).await {
            warn!("Failed to delete previous image {}: {}", old_key, e);
        }
    }

    state
        .profile_repository
        .set_image(user.id, Some(&stored.url), Some(&stored.key))
        .await?
        .ok_or(ApiError::NotFound)?;

    Ok(Json(UploadEnvelope {
        success: true,
        url: stored.url,
    }))
}

/// Remove the authenticated account's profile image
pub async fn delete_image(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> ApiResult<impl IntoResponse> {
    let profile = state
        .profile_repository
        .find_by_account(user.id)
        .await?
        .ok_or(ApiError::NotFound)?;

    if let Some(key) = &profile.image_key {
        if let Err(e) = state.storage.delete_image(key).await {
            warn!("Failed to delete image {}: {}", key, e);
        }
    }

    state
        .profile_repository
        .set_image(user.id, None, None)
        .await?
        .ok_or(ApiError::NotFound)?;

    Ok(Json(json!({"success": true})))
}
