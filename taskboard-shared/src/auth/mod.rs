/// Bearer-token authentication
///
/// # Modules
///
/// - [`jwt`]: HS256 token validation (and minting, for tests and tooling)
/// - [`middleware`]: header extraction and the per-request [`middleware::AuthContext`]

pub mod jwt;
pub mod middleware;
