use axum::{
    extract::State,
    http::header,
    response::IntoResponse,
};
use chrono::Duration;

use crate::{
    AppState,
    auth::{AuthAdmin, clear_session_cookie, issue_token, session_cookie, verify_password},
    config::Env,
    error::{ApiResult, AppError},
    extract::AppJson,
    models::{AdminProfile, LoginRequest, LoginResponse},
    response::ApiResponse,
    validation::required,
};

const BAD_CREDENTIALS: &str = "Invalid username or password";

/// login
///
/// [Public Route] Verifies the bcrypt hash and issues a session token, returned in
/// the body and set as the `admin-token` cookie. `remember_me` extends the
/// lifetime from `TOKEN_TTL_HOURS` to `REMEMBER_TTL_DAYS`.
#[utoipa::path(
    post,
    path = "/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Logged in", body = LoginResponse),
        (status = 401, description = "Bad credentials"),
        (status = 403, description = "Account inactive")
    )
)]
pub async fn login(
    State(state): State<AppState>,
    AppJson(payload): AppJson<LoginRequest>,
) -> Result<impl IntoResponse, AppError> {
    let username = required(payload.username, "username")?;
    let password = payload
        .password
        .filter(|p| !p.is_empty())
        .ok_or_else(|| AppError::Validation("password is required".to_string()))?;

    let admin = state
        .repo
        .find_admin_by_username(&username)
        .await?
        .filter(|admin| verify_password(&password, &admin.password_hash))
        .ok_or_else(|| {
            tracing::info!(username = %username, "rejected login attempt");
            AppError::Unauthorized(BAD_CREDENTIALS.to_string())
        })?;

    if !admin.is_active {
        return Err(AppError::Forbidden("Admin account is inactive".to_string()));
    }

    let ttl = if payload.remember_me {
        Duration::days(state.config.remember_ttl_days)
    } else {
        Duration::hours(state.config.token_ttl_hours)
    };
    let (token, expires_at) = issue_token(&admin, &state.config.jwt_secret, ttl)?;
    let cookie = session_cookie(&token, ttl, state.config.env == Env::Production);

    tracing::info!(admin_id = %admin.id, remember_me = payload.remember_me, "admin logged in");

    let body = ApiResponse::ok(
        LoginResponse {
            token,
            expires_at,
            admin: AdminProfile::from(&admin),
        },
        "Login successful",
    );
    Ok(([(header::SET_COOKIE, cookie)], body))
}

/// logout
///
/// [Public Route] Expires the session cookie. Tokens are stateless, so a copied bearer
/// token stays valid until it expires.
#[utoipa::path(
    post,
    path = "/auth/logout",
    responses((status = 200, description = "Logged out"))
)]
pub async fn logout(State(state): State<AppState>) -> impl IntoResponse {
    let cookie = clear_session_cookie(state.config.env == Env::Production);
    (
        [(header::SET_COOKIE, cookie)],
        ApiResponse::message("Logged out"),
    )
}

/// me
///
/// [Authenticated Route] The caller's profile.
#[utoipa::path(
    get,
    path = "/auth/me",
    responses(
        (status = 200, description = "Profile", body = AdminProfile),
        (status = 401, description = "Missing or invalid token")
    )
)]
pub async fn me(
    AuthAdmin { id, .. }: AuthAdmin,
    State(state): State<AppState>,
) -> ApiResult<AdminProfile> {
    let admin = state
        .repo
        .find_admin_by_id(id)
        .await?
        .ok_or_else(|| AppError::not_found("Admin"))?;
    Ok(ApiResponse::ok(AdminProfile::from(&admin), "Profile retrieved"))
}
