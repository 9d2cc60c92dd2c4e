//! Token issuance and password hashing.
//!
//! Two JWTs are issued per session: a short-lived access token carrying the
//! user's public identity, and a refresh token carrying only the user id. The
//! refresh token's current value is persisted on the user row so that it can
//! be rotated on every refresh and revoked on logout.

pub mod password;
pub mod tokens;

pub use password::{hash_password, verify_password, PasswordError};
pub use tokens::{
    generate_access_token, generate_refresh_token, validate_access_token, validate_refresh_token,
    AccessClaims, RefreshClaims, TokenError, TokenPair,
};

/// Cookie names shared by the session handlers and the auth middleware
pub const ACCESS_TOKEN_COOKIE: &str = "accessToken";
pub const REFRESH_TOKEN_COOKIE: &str = "refreshToken";
