//! Authentication API endpoints
//!
//! - POST /api/auth/register - Account creation
//! - POST /api/auth/login - Login
//! - POST /api/auth/logout - Logout (invalidate session)
//! - GET /api/auth/me - Current user
//! - GET /api/auth/guest - Guest identity issuance
//!
//! Login and registration answer with the action state: a
//! discriminated status plus its notification message. Only `success`
//! sets the session cookie.

use axum::{
    extract::{Query, State},
    http::{header, HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Redirect, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;

use crate::api::middleware::{session_token, ApiError, AppState, AuthenticatedUser};
use crate::models::{ActionStatus, User};
use crate::services::user::{LoginInput, RegisterInput, UserServiceError};

const SECONDS_PER_DAY: i64 = 24 * 60 * 60;

/// Request body for login and registration
#[derive(Debug, Deserialize)]
pub struct CredentialsRequest {
    pub email: String,
    pub password: String,
}

/// Result of a login or registration action
#[derive(Debug, Serialize, Deserialize)]
pub struct ActionState {
    pub status: ActionStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl ActionState {
    fn login(status: ActionStatus) -> Self {
        Self {
            status,
            message: status.login_message().map(String::from),
        }
    }

    fn register(status: ActionStatus) -> Self {
        Self {
            status,
            message: status.register_message().map(String::from),
        }
    }
}

/// Response for user info
#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub id: i64,
    pub email: String,
    pub user_type: String,
    pub created_at: String,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            email: user.email,
            user_type: user.user_type.to_string(),
            created_at: user.created_at.to_rfc3339(),
        }
    }
}

/// Build the `Set-Cookie` header for a fresh session. The cookie
/// lifetime tracks the configured session expiration so the cookie
/// does not outlive or undercut the session itself.
fn session_cookie_headers(session_id: &str, expiration_days: i64) -> HeaderMap {
    let cookie = format!(
        "session={}; Path=/; HttpOnly; SameSite=Lax; Max-Age={}",
        session_id,
        expiration_days * SECONDS_PER_DAY
    );

    let mut headers = HeaderMap::new();
    if let Ok(value) = HeaderValue::from_str(&cookie) {
        headers.insert(header::SET_COOKIE, value);
    }
    headers
}

/// Form-level validation, mirroring what the login/register forms
/// enforce before the action runs.
fn credentials_valid(body: &CredentialsRequest) -> bool {
    body.email.contains('@') && body.password.len() >= 6
}

/// POST /api/auth/login
pub async fn login(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(body): Json<CredentialsRequest>,
) -> Result<Response, ApiError> {
    let ip_address = extract_ip_address(&headers);
    let user_agent = headers
        .get(header::USER_AGENT)
        .and_then(|h| h.to_str().ok())
        .map(String::from);

    // IP rate limit (10 requests per minute)
    if let Some(ip) = ip_address.as_ref().and_then(|s| s.parse().ok()) {
        if state.rate_limiter.is_ip_limited(ip).await {
            log_login_attempt(
                &state.pool,
                &body.email,
                ip_address.as_deref(),
                user_agent.as_deref(),
                false,
                Some("IP rate limit exceeded"),
            )
            .await;
            return Err(ApiError::with_details(
                "RATE_LIMIT",
                "Too many requests, try again later",
                serde_json::json!({"retry_after": 60}),
            ));
        }
        state.rate_limiter.record_ip_request(ip).await;
    }

    // Email rate limit (5 failed attempts per 15 minutes)
    if state.rate_limiter.is_email_limited(&body.email).await {
        log_login_attempt(
            &state.pool,
            &body.email,
            ip_address.as_deref(),
            user_agent.as_deref(),
            false,
            Some("Email rate limit exceeded"),
        )
        .await;
        return Err(ApiError::with_details(
            "RATE_LIMIT",
            "Too many failed attempts, try again in 15 minutes",
            serde_json::json!({"retry_after": 900}),
        ));
    }

    if !credentials_valid(&body) {
        return Ok((
            StatusCode::BAD_REQUEST,
            Json(ActionState::login(ActionStatus::InvalidData)),
        )
            .into_response());
    }

    let input = LoginInput::new(body.email.clone(), body.password);

    match state.user_service.login(input).await {
        Ok(session) => {
            state.rate_limiter.clear_email_attempts(&body.email).await;
            log_login_attempt(
                &state.pool,
                &body.email,
                ip_address.as_deref(),
                user_agent.as_deref(),
                true,
                None,
            )
            .await;

            Ok((
                session_cookie_headers(&session.id, state.user_service.session_expiration_days()),
                Json(ActionState::login(ActionStatus::Success)),
            )
                .into_response())
        }
        Err(UserServiceError::AuthenticationError(_)) => {
            state.rate_limiter.record_failed_attempt(&body.email).await;
            log_login_attempt(
                &state.pool,
                &body.email,
                ip_address.as_deref(),
                user_agent.as_deref(),
                false,
                Some("Invalid credentials"),
            )
            .await;

            Ok((
                StatusCode::UNAUTHORIZED,
                Json(ActionState::login(ActionStatus::Failed)),
            )
                .into_response())
        }
        Err(e) => Err(ApiError::internal_error(e.to_string())),
    }
}

/// POST /api/auth/register
pub async fn register(
    State(state): State<AppState>,
    Json(body): Json<CredentialsRequest>,
) -> Result<Response, ApiError> {
    if !credentials_valid(&body) {
        return Ok((
            StatusCode::BAD_REQUEST,
            Json(ActionState::register(ActionStatus::InvalidData)),
        )
            .into_response());
    }

    let password = body.password.clone();
    let input = RegisterInput::new(body.email.clone(), body.password);

    let user = match state.user_service.register(input).await {
        Ok(user) => user,
        Err(UserServiceError::ValidationError(_)) => {
            return Ok((
                StatusCode::BAD_REQUEST,
                Json(ActionState::register(ActionStatus::InvalidData)),
            )
                .into_response());
        }
        Err(UserServiceError::UserExists(_)) => {
            return Ok((
                StatusCode::CONFLICT,
                Json(ActionState::register(ActionStatus::UserExists)),
            )
                .into_response());
        }
        Err(_) => {
            return Ok((
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ActionState::register(ActionStatus::Failed)),
            )
                .into_response());
        }
    };

    // Log the fresh account in so the session cookie is set in the
    // same round trip, as the original registration action does.
    let session = state
        .user_service
        .login(LoginInput::new(user.email, password))
        .await
        .map_err(|e| ApiError::internal_error(e.to_string()))?;

    Ok((
        StatusCode::CREATED,
        session_cookie_headers(&session.id, state.user_service.session_expiration_days()),
        Json(ActionState::register(ActionStatus::Success)),
    )
        .into_response())
}

/// POST /api/auth/logout
///
/// Requires authentication.
pub async fn logout(
    State(state): State<AppState>,
    _user: AuthenticatedUser,
    headers: HeaderMap,
) -> Result<impl IntoResponse, ApiError> {
    let token = session_token(&headers)
        .ok_or_else(|| ApiError::unauthorized("Missing authentication token"))?;

    state
        .user_service
        .logout(&token)
        .await
        .map_err(|e| ApiError::internal_error(e.to_string()))?;

    let clear_cookie = "session=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0";
    let mut response_headers = HeaderMap::new();
    response_headers.insert(header::SET_COOKIE, HeaderValue::from_static(clear_cookie));

    Ok((StatusCode::NO_CONTENT, response_headers))
}

/// GET /api/auth/me
///
/// Requires authentication.
pub async fn get_current_user(user: AuthenticatedUser) -> Json<UserResponse> {
    Json(user.0.into())
}

/// Query parameters for guest auth
#[derive(Debug, Deserialize)]
pub struct GuestQuery {
    pub redirect_url: Option<String>,
}

/// GET /api/auth/guest
///
/// The unauthenticated fallback: issues a guest account and session,
/// then redirects back. A request that already carries a valid
/// session is redirected without creating anything.
pub async fn guest(
    State(state): State<AppState>,
    Query(query): Query<GuestQuery>,
    headers: HeaderMap,
) -> Result<Response, ApiError> {
    // Only relative paths are honored; an absolute or
    // protocol-relative target would make this an open redirect.
    let redirect_url = query
        .redirect_url
        .filter(|url| url.starts_with('/') && !url.starts_with("//"))
        .unwrap_or_else(|| "/".to_string());

    if let Some(token) = session_token(&headers) {
        let existing = state
            .user_service
            .validate_session(&token)
            .await
            .map_err(|e| ApiError::internal_error(e.to_string()))?;
        if existing.is_some() {
            return Ok(Redirect::temporary(&redirect_url).into_response());
        }
    }

    let (user, session) = state
        .user_service
        .create_guest()
        .await
        .map_err(|e| ApiError::internal_error(e.to_string()))?;

    tracing::info!(user_id = user.id, "Issued guest account");

    Ok((
        session_cookie_headers(&session.id, state.user_service.session_expiration_days()),
        Redirect::temporary(&redirect_url),
    )
        .into_response())
}

/// Extract the client IP from proxy headers
fn extract_ip_address(headers: &HeaderMap) -> Option<String> {
    if let Some(forwarded) = headers.get("x-forwarded-for") {
        if let Ok(forwarded_str) = forwarded.to_str() {
            if let Some(ip) = forwarded_str.split(',').next() {
                return Some(ip.trim().to_string());
            }
        }
    }

    if let Some(real_ip) = headers.get("x-real-ip") {
        if let Ok(ip_str) = real_ip.to_str() {
            return Some(ip_str.to_string());
        }
    }

    None
}

/// Log a login attempt for security auditing
async fn log_login_attempt(
    pool: &SqlitePool,
    email: &str,
    ip_address: Option<&str>,
    user_agent: Option<&str>,
    success: bool,
    failure_reason: Option<&str>,
) {
    let result = sqlx::query(
        "INSERT INTO login_logs (email, ip_address, user_agent, success, failure_reason) VALUES (?, ?, ?, ?, ?)",
    )
    .bind(email)
    .bind(ip_address)
    .bind(user_agent)
    .bind(if success { 1 } else { 0 })
    .bind(failure_reason)
    .execute(pool)
    .await;

    if let Err(e) = result {
        tracing::warn!("Failed to log login attempt: {}", e);
    }
}
