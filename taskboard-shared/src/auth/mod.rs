/// Authentication primitives for Taskboard
///
/// # Modules
///
/// - [`password`]: Argon2id password hashing and verification
/// - [`jwt`]: access/refresh token signing and verification
/// - [`middleware`]: Bearer-token access control for protected routes
///
/// # Security Features
///
/// - **Password Hashing**: Argon2id with 64 MB memory, 3 iterations
/// - **Tokens**: HS256 with separate secrets per token class, so an access
///   token can never be replayed as a refresh token
/// - **Constant-time Comparison**: password verification goes through the
///   algorithm's own verifier

pub mod jwt;
pub mod middleware;
pub mod password;
