/// Authentication endpoints
///
/// Session lifecycle per user:
/// `Anonymous -> Authenticated -> AccessExpired -> Authenticated' -> LoggedOut`
///
/// A user holds at most one live refresh token (the `refresh_token` column).
/// Register, login, and refresh each overwrite it with the newly issued
/// value, so any previously issued refresh token stops working immediately;
/// logout clears it. That single slot is the entire revocation mechanism.
///
/// # Endpoints
///
/// - `POST /api/auth/register` - create an account, returns user + tokens
/// - `POST /api/auth/login` - authenticate, returns user + tokens
/// - `POST /api/auth/refresh` - rotate a refresh token into a new pair
/// - `POST /api/auth/logout` - clear the refresh-token slot

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
};
use axum::{extract::State, http::StatusCode, Extension, Json};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use taskboard_shared::{
    auth::{
        jwt::{issue_token_pair, verify_refresh_token, TokenPair},
        middleware::AuthUser,
        password::{hash_password, verify_password},
    },
    models::user::{CreateUser, User},
};
use uuid::Uuid;
use validator::Validate;

/// Register request
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(email(message = "Please provide a valid email"))]
    pub email: String,

    #[validate(length(min = 6, message = "Password must be at least 6 characters long"))]
    pub password: String,

    #[validate(length(min = 1, message = "Name must not be empty"))]
    pub name: Option<String>,
}

/// Login request
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(email(message = "Please provide a valid email"))]
    pub email: String,

    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

/// Refresh request; the field is checked by hand so a missing token yields
/// the documented 400 instead of a body-deserialization rejection
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshRequest {
    #[serde(default)]
    pub refresh_token: Option<String>,
}

/// Public projection of a user: id/email/name/createdAt only, never the
/// password hash or the stored refresh token
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: Uuid,
    pub email: String,
    pub name: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<&User> for UserResponse {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            email: user.email.clone(),
            name: user.name.clone(),
            created_at: user.created_at,
        }
    }
}

/// Response for register and login
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub message: String,
    pub user: UserResponse,
    pub tokens: TokenPair,
}

/// Response for refresh (tokens only, no user payload)
#[derive(Debug, Serialize)]
pub struct RefreshResponse {
    pub message: String,
    pub tokens: TokenPair,
}

/// Plain confirmation response
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

/// Lowercases and trims the login identifier so the unique index is
/// effectively case-insensitive.
fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Register a new user
///
/// # Errors
///
/// - `400` validation failed (malformed email, password under 6 characters)
/// - `400` email already registered
pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> ApiResult<(StatusCode, Json<AuthResponse>)> {
    req.validate()?;

    let email = normalize_email(&req.email);

    // Fast-path duplicate check; the unique index on users.email is the
    // authoritative one and surfaces as the same Conflict error
    if User::find_by_email(&state.db, &email).await?.is_some() {
        return Err(ApiError::Conflict("Email already registered".to_string()));
    }

    let password_hash = hash_password(&req.password)?;

    let name = req
        .name
        .map(|n| n.trim().to_string())
        .filter(|n| !n.is_empty());

    let user = User::create(
        &state.db,
        CreateUser {
            email,
            password_hash,
            name,
        },
    )
    .await?;

    let tokens = issue_token_pair(user.id, &user.email, state.token_config())?;
    User::set_refresh_token(&state.db, user.id, Some(&tokens.refresh_token)).await?;

    tracing::info!(user_id = %user.id, "User registered");

    Ok((
        StatusCode::CREATED,
        Json(AuthResponse {
            message: "User registered successfully".to_string(),
            user: UserResponse::from(&user),
            tokens,
        }),
    ))
}

/// Login with email and password
///
/// The rejection message is identical whether the email is unknown or the
/// password wrong, so the endpoint cannot be used to enumerate accounts.
///
/// # Errors
///
/// - `400` validation failed
/// - `401` invalid credentials
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> ApiResult<Json<AuthResponse>> {
    req.validate()?;

    let email = normalize_email(&req.email);

    let user = User::find_by_email(&state.db, &email)
        .await?
        .ok_or_else(|| ApiError::Authentication("Invalid credentials".to_string()))?;

    if !verify_password(&req.password, &user.password_hash)? {
        return Err(ApiError::Authentication("Invalid credentials".to_string()));
    }

    // Overwriting the slot revokes whatever session existed before
    let tokens = issue_token_pair(user.id, &user.email, state.token_config())?;
    User::set_refresh_token(&state.db, user.id, Some(&tokens.refresh_token)).await?;

    tracing::info!(user_id = %user.id, "User logged in");

    Ok(Json(AuthResponse {
        message: "Login successful".to_string(),
        user: UserResponse::from(&user),
        tokens,
    }))
}

/// Exchange a refresh token for a fresh pair
///
/// The presented token must verify against the refresh secret AND exactly
/// match the value currently stored for that user. The equality check is the
/// sole revocation mechanism: a logged-out or rotated-away token is rejected
/// even while still cryptographically valid.
///
/// # Errors
///
/// - `400` refresh token missing from the body
/// - `403` refresh token expired (distinguished so clients re-login)
/// - `403` refresh token invalid or stale
pub async fn refresh(
    State(state): State<AppState>,
    Json(req): Json<RefreshRequest>,
) -> ApiResult<Json<RefreshResponse>> {
    let presented = req
        .refresh_token
        .filter(|token| !token.is_empty())
        .ok_or_else(|| ApiError::BadRequest("Refresh token required".to_string()))?;

    let claims = verify_refresh_token(&presented, state.token_config())?;

    let user = User::find_by_id(&state.db, claims.user_id)
        .await?
        .ok_or_else(|| ApiError::Forbidden("Invalid refresh token".to_string()))?;

    if user.refresh_token.as_deref() != Some(presented.as_str()) {
        return Err(ApiError::Forbidden("Invalid refresh token".to_string()));
    }

    // Rotate: both tokens are reissued and the slot is overwritten
    let tokens = issue_token_pair(user.id, &user.email, state.token_config())?;
    User::set_refresh_token(&state.db, user.id, Some(&tokens.refresh_token)).await?;

    Ok(Json(RefreshResponse {
        message: "Token refreshed successfully".to_string(),
        tokens,
    }))
}

/// Logout the authenticated user
///
/// Clears the refresh-token slot; any refresh token issued earlier now fails
/// the equality check in [`refresh`] before its natural expiry.
pub async fn logout(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
) -> ApiResult<Json<MessageResponse>> {
    User::set_refresh_token(&state.db, auth.user_id, None).await?;

    tracing::info!(user_id = %auth.user_id, "User logged out");

    Ok(Json(MessageResponse {
        message: "Logout successful".to_string(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_email() {
        assert_eq!(normalize_email("  User@Example.COM "), "user@example.com");
        assert_eq!(normalize_email("user@example.com"), "user@example.com");
    }

    #[test]
    fn test_register_request_validation() {
        let valid = RegisterRequest {
            email: "user@example.com".to_string(),
            password: "secret".to_string(),
            name: None,
        };
        assert!(valid.validate().is_ok());

        let bad_email = RegisterRequest {
            email: "not-an-email".to_string(),
            password: "secret".to_string(),
            name: None,
        };
        assert!(bad_email.validate().is_err());

        let short_password = RegisterRequest {
            email: "user@example.com".to_string(),
            password: "12345".to_string(),
            name: None,
        };
        assert!(short_password.validate().is_err());

        // Exactly six characters is the boundary
        let six_chars = RegisterRequest {
            email: "user@example.com".to_string(),
            password: "123456".to_string(),
            name: None,
        };
        assert!(six_chars.validate().is_ok());
    }

    #[test]
    fn test_user_response_never_includes_secrets() {
        let user = User {
            id: Uuid::new_v4(),
            email: "user@example.com".to_string(),
            password_hash: "$argon2id$...".to_string(),
            name: None,
            refresh_token: Some("stored".to_string()),
            created_at: Utc::now(),
        };

        let value = serde_json::to_value(UserResponse::from(&user)).unwrap();

        assert_eq!(value["email"], "user@example.com");
        assert!(value.get("passwordHash").is_none());
        assert!(value.get("password_hash").is_none());
        assert!(value.get("refreshToken").is_none());
        assert!(value.get("createdAt").is_some());
    }

    #[test]
    fn test_refresh_request_tolerates_missing_field() {
        let req: RefreshRequest = serde_json::from_str("{}").unwrap();
        assert!(req.refresh_token.is_none());

        let req: RefreshRequest =
            serde_json::from_str(r#"{"refreshToken": "abc"}"#).unwrap();
        assert_eq!(req.refresh_token.as_deref(), Some("abc"));
    }
}
