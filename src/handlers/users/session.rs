use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use axum_extra::extract::{
    cookie::{Cookie, SameSite},
    CookieJar,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::auth::{
    generate_access_token, generate_refresh_token, validate_refresh_token, verify_password, TokenPair,
    ACCESS_TOKEN_COOKIE, REFRESH_TOKEN_COOKIE,
};
use crate::database::models::User;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, CurrentUser};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshRequest {
    pub refresh_token: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginData {
    pub user: User,
    pub access_token: String,
    pub refresh_token: String,
}

/// POST /api/v1/users/login - Exchange credentials for a token pair
///
/// Accepts `username` or `email` plus `password`. The tokens are returned in
/// the body and also set as HTTP-only cookies.
pub async fn login_user(
    State(state): State<AppState>,
    jar: CookieJar,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<(CookieJar, ApiResponse<LoginData>), ApiError> {
    let Json(payload) = payload?;

    let username = non_blank(payload.username.as_deref()).map(str::to_lowercase);
    let email = non_blank(payload.email.as_deref()).map(str::to_lowercase);
    if username.is_none() && email.is_none() {
        return Err(ApiError::bad_request("username or email is required"));
    }
    let password = payload
        .password
        .filter(|p| !p.is_empty())
        .ok_or_else(|| ApiError::bad_request("password is required"))?;

    let user = state
        .users()
        .find_by_username_or_email(username.as_deref(), email.as_deref())
        .await?
        .ok_or_else(|| ApiError::not_found("User does not exist"))?;

    if !verify_password(&password, &user.password).await? {
        tracing::warn!("Invalid password for user {}", user.username);
        return Err(ApiError::unauthorized("Invalid user credentials"));
    }

    let tokens = sign_tokens(&state, &user)?;
    state.users().set_refresh_token(user.id, Some(&tokens.refresh_token)).await?;
    let jar = set_session_cookies(jar, &tokens, state.config.security.cookie_secure);

    tracing::info!("User logged in: {} ({})", user.username, user.id);
    Ok((
        jar,
        ApiResponse::ok(
            LoginData {
                user,
                access_token: tokens.access_token,
                refresh_token: tokens.refresh_token,
            },
            "User logged in successfully",
        ),
    ))
}

/// POST /api/v1/users/logout - Revoke the stored refresh token and clear cookies
pub async fn logout_user(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    jar: CookieJar,
) -> Result<(CookieJar, ApiResponse<Value>), ApiError> {
    state.users().set_refresh_token(user.id, None).await?;

    let jar = clear_session_cookies(jar, state.config.security.cookie_secure);

    tracing::info!("User logged out: {} ({})", user.username, user.id);
    Ok((jar, ApiResponse::ok(json!({}), "User logged out")))
}

/// POST /api/v1/users/refresh-token - Rotate the token pair
///
/// The refresh token comes from the `refreshToken` cookie or the JSON body.
/// It must match the one stored on the user, so each refresh token works once.
pub async fn refresh_access_token(
    State(state): State<AppState>,
    jar: CookieJar,
    payload: Result<Json<RefreshRequest>, JsonRejection>,
) -> Result<(CookieJar, ApiResponse<TokenPair>), ApiError> {
    let from_cookie = jar
        .get(REFRESH_TOKEN_COOKIE)
        .map(|c| c.value().to_string())
        .filter(|v| !v.trim().is_empty());
    let incoming = from_cookie
        .or_else(|| payload.ok().and_then(|Json(body)| body.refresh_token))
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| ApiError::unauthorized("Unauthorized request"))?;

    let claims = validate_refresh_token(&incoming, &state.config.security).map_err(|e| {
        tracing::debug!("Refresh token rejected: {}", e);
        ApiError::unauthorized("Invalid refresh token")
    })?;

    let users = state.users();
    let user = users
        .find_by_id(claims.sub)
        .await?
        .ok_or_else(|| ApiError::unauthorized("Invalid refresh token"))?;

    if user.refresh_token.as_deref() != Some(incoming.as_str()) {
        tracing::warn!("Stale refresh token presented for {}", user.id);
        return Err(ApiError::unauthorized("Refresh token is expired or used"));
    }

    let tokens = sign_tokens(&state, &user)?;
    // Only one of several concurrent refreshes with the same token may win
    if !users
        .rotate_refresh_token(user.id, &incoming, &tokens.refresh_token)
        .await?
    {
        tracing::warn!("Refresh token for {} was rotated concurrently", user.id);
        return Err(ApiError::unauthorized("Refresh token is expired or used"));
    }
    let jar = set_session_cookies(jar, &tokens, state.config.security.cookie_secure);

    Ok((jar, ApiResponse::ok(tokens, "Access token refreshed")))
}

/// Sign a fresh pair; callers decide how the refresh half is stored
fn sign_tokens(state: &AppState, user: &User) -> Result<TokenPair, ApiError> {
    let security = &state.config.security;
    let access_token = generate_access_token(user, security)?;
    let refresh_token = generate_refresh_token(user.id, security)?;

    Ok(TokenPair {
        access_token,
        refresh_token,
    })
}

fn session_cookie(name: &'static str, value: String, secure: bool) -> Cookie<'static> {
    Cookie::build((name, value))
        .http_only(true)
        .secure(secure)
        .same_site(if secure { SameSite::None } else { SameSite::Lax })
        .path("/")
        .build()
}

pub(crate) fn set_session_cookies(jar: CookieJar, tokens: &TokenPair, secure: bool) -> CookieJar {
    jar.add(session_cookie(ACCESS_TOKEN_COOKIE, tokens.access_token.clone(), secure))
        .add(session_cookie(REFRESH_TOKEN_COOKIE, tokens.refresh_token.clone(), secure))
}

pub(crate) fn clear_session_cookies(jar: CookieJar, secure: bool) -> CookieJar {
    jar.remove(session_cookie(ACCESS_TOKEN_COOKIE, String::new(), secure))
        .remove(session_cookie(REFRESH_TOKEN_COOKIE, String::new(), secure))
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pair() -> TokenPair {
        TokenPair {
            access_token: "access.jwt".to_string(),
            refresh_token: "refresh.jwt".to_string(),
        }
    }

    #[test]
    fn session_cookies_are_http_only() {
        let jar = set_session_cookies(CookieJar::new(), &pair(), true);

        let access = jar.get(ACCESS_TOKEN_COOKIE).unwrap();
        assert_eq!(access.value(), "access.jwt");
        assert_eq!(access.http_only(), Some(true));
        assert_eq!(access.secure(), Some(true));
        assert_eq!(access.path(), Some("/"));

        assert_eq!(jar.get(REFRESH_TOKEN_COOKIE).unwrap().value(), "refresh.jwt");
    }

    #[test]
    fn clearing_removes_both_cookies() {
        let jar = set_session_cookies(CookieJar::new(), &pair(), false);
        let jar = clear_session_cookies(jar, false);
        assert!(jar.get(ACCESS_TOKEN_COOKIE).is_none());
        assert!(jar.get(REFRESH_TOKEN_COOKIE).is_none());
    }

    #[test]
    fn blank_identifiers_are_ignored() {
        assert_eq!(non_blank(Some("  ")), None);
        assert_eq!(non_blank(Some(" Alice ")), Some("Alice"));
        assert_eq!(non_blank(None), None);
    }
}
