/// Access-control middleware for Axum
///
/// Extracts the `Authorization: Bearer <token>` header, verifies the access
/// token, and attaches the verified identity to the request extensions for
/// downstream handlers. Pure gatekeeping, no persistence side effects.
///
/// Rejections distinguish the expiry case so clients know to call refresh
/// instead of forcing a re-login:
///
/// - missing/malformed header → `401 {"error": "Access token required"}`
/// - expired token → `401 {"error": "Access token expired"}`
/// - any other verification failure → `403 {"error": "Invalid access token"}`

use axum::{
    extract::Request,
    http::{header, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use uuid::Uuid;

use super::jwt::{verify_access_token, TokenConfig, TokenError};

/// Verified identity attached to request extensions.
///
/// Handlers extract it with Axum's `Extension` extractor:
///
/// ```
/// use axum::Extension;
/// use taskboard_shared::auth::middleware::AuthUser;
///
/// async fn handler(Extension(auth): Extension<AuthUser>) -> String {
///     format!("User: {}", auth.user_id)
/// }
/// ```
#[derive(Debug, Clone)]
pub struct AuthUser {
    /// Authenticated user ID
    pub user_id: Uuid,

    /// Email carried by the token claims
    pub email: String,
}

/// Rejection type for the access-control middleware
#[derive(Debug, PartialEq, Eq)]
pub enum AuthError {
    /// Authorization header absent or not of the form `Bearer <token>`
    MissingToken,

    /// Access token signature is valid but past expiration
    ExpiredToken,

    /// Access token failed verification (bad signature, malformed payload)
    InvalidToken,
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AuthError::MissingToken => (StatusCode::UNAUTHORIZED, "Access token required"),
            AuthError::ExpiredToken => (StatusCode::UNAUTHORIZED, "Access token expired"),
            AuthError::InvalidToken => (StatusCode::FORBIDDEN, "Invalid access token"),
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}

/// Verifies the request's access token and injects [`AuthUser`].
///
/// Layer it with `axum::middleware::from_fn` (or `from_fn_with_state` via an
/// adapter that passes the configured secrets):
///
/// ```no_run
/// use axum::{extract::Request, middleware::{self, Next}, routing::get, Router};
/// use taskboard_shared::auth::jwt::TokenConfig;
/// use taskboard_shared::auth::middleware::require_access_token;
///
/// let config = TokenConfig::new("access-secret", "refresh-secret");
/// let app: Router = Router::new()
///     .route("/protected", get(|| async { "OK" }))
///     .route_layer(middleware::from_fn(move |req: Request, next: Next| {
///         require_access_token(config.clone(), req, next)
///     }));
/// ```
pub async fn require_access_token(
    config: TokenConfig,
    mut req: Request,
    next: Next,
) -> Result<Response, AuthError> {
    let auth_header = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or(AuthError::MissingToken)?;

    let token = auth_header
        .strip_prefix("Bearer ")
        .ok_or(AuthError::MissingToken)?;

    if token.is_empty() {
        return Err(AuthError::MissingToken);
    }

    let claims = verify_access_token(token, &config).map_err(|e| match e {
        TokenError::Expired => AuthError::ExpiredToken,
        _ => AuthError::InvalidToken,
    })?;

    req.extensions_mut().insert(AuthUser {
        user_id: claims.user_id,
        email: claims.email,
    });

    Ok(next.run(req).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::jwt::{sign_token, Claims};
    use axum::{body::Body, routing::get, Extension, Router};
    use chrono::Duration;
    use tower::Service as _;

    fn test_config() -> TokenConfig {
        TokenConfig::new(
            "test-access-secret-at-least-32-bytes!!",
            "test-refresh-secret-at-least-32-bytes!",
        )
    }

    fn protected_app(config: TokenConfig) -> Router {
        async fn handler(Extension(auth): Extension<AuthUser>) -> String {
            auth.email
        }

        Router::new()
            .route("/protected", get(handler))
            .route_layer(axum::middleware::from_fn(move |req: Request, next: Next| {
                require_access_token(config.clone(), req, next)
            }))
    }

    async fn get_with_header(app: Router, auth_header: Option<&str>) -> (StatusCode, String) {
        let mut builder = axum::http::Request::builder().uri("/protected");
        if let Some(value) = auth_header {
            builder = builder.header(header::AUTHORIZATION, value);
        }
        let request = builder.body(Body::empty()).unwrap();

        let response = app.clone().call(request).await.unwrap();
        let status = response.status();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();

        (status, String::from_utf8_lossy(&body).to_string())
    }

    #[tokio::test]
    async fn test_missing_header_is_401() {
        let app = protected_app(test_config());
        let (status, body) = get_with_header(app, None).await;

        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert!(body.contains("Access token required"));
    }

    #[tokio::test]
    async fn test_malformed_header_is_401() {
        let app = protected_app(test_config());

        let (status, _) = get_with_header(app.clone(), Some("Basic abc")).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let (status, _) = get_with_header(app, Some("Bearer ")).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_expired_token_is_401() {
        let config = test_config();
        let claims = Claims::new(Uuid::new_v4(), "user@example.com", Duration::hours(-2));
        let token = sign_token(&claims, &config.access_secret).unwrap();

        let app = protected_app(config);
        let (status, body) = get_with_header(app, Some(&format!("Bearer {}", token))).await;

        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert!(body.contains("Access token expired"));
    }

    #[tokio::test]
    async fn test_invalid_token_is_403() {
        let app = protected_app(test_config());
        let (status, body) = get_with_header(app, Some("Bearer not-a-token")).await;

        assert_eq!(status, StatusCode::FORBIDDEN);
        assert!(body.contains("Invalid access token"));
    }

    #[tokio::test]
    async fn test_refresh_token_rejected_as_access_token() {
        let config = test_config();
        let claims = Claims::new(Uuid::new_v4(), "user@example.com", Duration::days(7));
        let token = sign_token(&claims, &config.refresh_secret).unwrap();

        let app = protected_app(config);
        let (status, _) = get_with_header(app, Some(&format!("Bearer {}", token))).await;

        assert_eq!(status, StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_valid_token_passes_identity_through() {
        let config = test_config();
        let claims = Claims::new(Uuid::new_v4(), "user@example.com", Duration::minutes(15));
        let token = sign_token(&claims, &config.access_secret).unwrap();

        let app = protected_app(config);
        let (status, body) = get_with_header(app, Some(&format!("Bearer {}", token))).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "user@example.com");
    }
}
