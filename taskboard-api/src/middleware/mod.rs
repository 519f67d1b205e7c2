/// Response-level middleware
///
/// - `security`: OWASP-style security headers on every response

pub mod security;
