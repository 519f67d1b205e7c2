/// Token signing and verification
///
/// Two bearer token classes share one claim set but are signed with
/// different secrets and lifetimes:
///
/// - **Access token**: short-lived (default 15 minutes), presented on every
///   request via the `Authorization` header.
/// - **Refresh token**: long-lived (default 7 days), used solely to mint new
///   token pairs. Because the secrets differ, an access token can never be
///   replayed as a refresh token or vice versa.
///
/// Tokens are signed with HS256. Issuing a pair is a pure function of the
/// identity, the clock, and the configured secrets; persisting the refresh
/// token into the user's revocation slot is the caller's job.
///
/// # Example
///
/// ```
/// use taskboard_shared::auth::jwt::{issue_token_pair, verify_access_token, TokenConfig};
/// use uuid::Uuid;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = TokenConfig::new(
///     "access-secret-at-least-32-bytes-long!!",
///     "refresh-secret-at-least-32-bytes-long!",
/// );
///
/// let user_id = Uuid::new_v4();
/// let pair = issue_token_pair(user_id, "user@example.com", &config)?;
///
/// let claims = verify_access_token(&pair.access_token, &config)?;
/// assert_eq!(claims.user_id, user_id);
/// # Ok(())
/// # }
/// ```

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Error type for token operations
#[derive(Debug, thiserror::Error)]
pub enum TokenError {
    /// Failed to sign a token
    #[error("Failed to sign token: {0}")]
    Sign(String),

    /// Token has expired
    #[error("Token has expired")]
    Expired,

    /// Token failed verification for any non-expiry reason
    #[error("Invalid token: {0}")]
    Invalid(String),
}

/// Secrets and lifetimes for both token classes.
///
/// Secrets should be at least 32 bytes and generated randomly
/// (`openssl rand -hex 32`).
#[derive(Debug, Clone)]
pub struct TokenConfig {
    /// Secret for signing/verifying access tokens
    pub access_secret: String,

    /// Secret for signing/verifying refresh tokens
    pub refresh_secret: String,

    /// Access token lifetime (default 15 minutes)
    pub access_ttl: Duration,

    /// Refresh token lifetime (default 7 days)
    pub refresh_ttl: Duration,
}

impl TokenConfig {
    /// Creates a config with the default lifetimes (15 minutes / 7 days).
    pub fn new(access_secret: impl Into<String>, refresh_secret: impl Into<String>) -> Self {
        Self {
            access_secret: access_secret.into(),
            refresh_secret: refresh_secret.into(),
            access_ttl: Duration::minutes(15),
            refresh_ttl: Duration::days(7),
        }
    }
}

/// Signed claim set carried by both token classes.
///
/// Serialized as `{"userId", "email", "iat", "exp"}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Claims {
    /// Subject user ID
    pub user_id: Uuid,

    /// Subject email at issue time
    pub email: String,

    /// Issued at (Unix timestamp)
    pub iat: i64,

    /// Expiration time (Unix timestamp)
    pub exp: i64,
}

impl Claims {
    /// Creates claims expiring `ttl` from now.
    pub fn new(user_id: Uuid, email: impl Into<String>, ttl: Duration) -> Self {
        let now = Utc::now();

        Self {
            user_id,
            email: email.into(),
            iat: now.timestamp(),
            exp: (now + ttl).timestamp(),
        }
    }

    /// Checks if the claims are past their expiration
    pub fn is_expired(&self) -> bool {
        Utc::now().timestamp() >= self.exp
    }
}

/// A freshly issued access/refresh pair.
///
/// Serialized as `{"accessToken", "refreshToken"}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

/// Signs a claim set with the given secret (HS256).
pub fn sign_token(claims: &Claims, secret: &str) -> Result<String, TokenError> {
    let header = Header::new(Algorithm::HS256);
    let key = EncodingKey::from_secret(secret.as_bytes());

    encode(&header, claims, &key).map_err(|e| TokenError::Sign(format!("Token encoding failed: {}", e)))
}

/// Verifies a token's signature and expiration, returning its claims.
///
/// # Errors
///
/// - `TokenError::Expired` if the signature is valid but `exp` has passed
/// - `TokenError::Invalid` for any other failure (bad signature, malformed
///   payload, missing claims)
pub fn verify_token(token: &str, secret: &str) -> Result<Claims, TokenError> {
    let key = DecodingKey::from_secret(secret.as_bytes());

    let mut validation = Validation::new(Algorithm::HS256);
    validation.validate_exp = true;

    let token_data = decode::<Claims>(token, &key, &validation).map_err(|e| match e.kind() {
        jsonwebtoken::errors::ErrorKind::ExpiredSignature => TokenError::Expired,
        _ => TokenError::Invalid(format!("Token verification failed: {}", e)),
    })?;

    Ok(token_data.claims)
}

/// Issues a fresh access/refresh pair for an identity.
///
/// Callers are responsible for persisting the refresh token into the user's
/// revocation slot; this function has no side effects of its own.
pub fn issue_token_pair(
    user_id: Uuid,
    email: &str,
    config: &TokenConfig,
) -> Result<TokenPair, TokenError> {
    let access_claims = Claims::new(user_id, email, config.access_ttl);
    let refresh_claims = Claims::new(user_id, email, config.refresh_ttl);

    Ok(TokenPair {
        access_token: sign_token(&access_claims, &config.access_secret)?,
        refresh_token: sign_token(&refresh_claims, &config.refresh_secret)?,
    })
}

/// Verifies an access token against the access secret.
pub fn verify_access_token(token: &str, config: &TokenConfig) -> Result<Claims, TokenError> {
    verify_token(token, &config.access_secret)
}

/// Verifies a refresh token against the refresh secret.
pub fn verify_refresh_token(token: &str, config: &TokenConfig) -> Result<Claims, TokenError> {
    verify_token(token, &config.refresh_secret)
}
