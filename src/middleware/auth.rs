use axum::{
    async_trait,
    extract::{FromRequestParts, Request, State},
    http::{header::AUTHORIZATION, request::Parts, HeaderMap},
    middleware::Next,
    response::Response,
};
use axum_extra::extract::CookieJar;

use crate::auth::{validate_access_token, ACCESS_TOKEN_COOKIE};
use crate::database::models::User;
use crate::error::ApiError;
use crate::state::AppState;

/// The authenticated user, loaded fresh from the database by [`verify_jwt`]
#[derive(Clone, Debug)]
pub struct CurrentUser(pub User);

/// Authenticates the request from the `accessToken` cookie or a Bearer header
/// and injects [`CurrentUser`] for downstream handlers.
pub async fn verify_jwt(
    State(state): State<AppState>,
    jar: CookieJar,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = extract_access_token(&jar, request.headers())
        .ok_or_else(|| ApiError::unauthorized("Unauthorized request"))?;

    let claims = validate_access_token(&token, &state.config.security).map_err(|e| {
        tracing::debug!("Access token rejected: {}", e);
        ApiError::unauthorized("Invalid access token")
    })?;

    let user = state.users().find_by_id(claims.sub).await?.ok_or_else(|| {
        tracing::warn!("Access token for missing user {}", claims.sub);
        ApiError::unauthorized("Invalid access token")
    })?;

    tracing::debug!("Authenticated {} ({})", user.username, user.id);
    request.extensions_mut().insert(CurrentUser(user));

    Ok(next.run(request).await)
}

/// Cookie first, then `Authorization: Bearer <token>`
fn extract_access_token(jar: &CookieJar, headers: &HeaderMap) -> Option<String> {
    if let Some(cookie) = jar.get(ACCESS_TOKEN_COOKIE) {
        if !cookie.value().trim().is_empty() {
            return Some(cookie.value().to_string());
        }
    }

    let header = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let token = header.strip_prefix("Bearer ")?.trim();
    if token.is_empty() {
        return None;
    }
    Some(token.to_string())
}

#[async_trait]
impl<S: Send + Sync> FromRequestParts<S> for CurrentUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts.extensions.get::<CurrentUser>().cloned().ok_or_else(|| {
            tracing::error!("CurrentUser requested on a route without verify_jwt");
            ApiError::unauthorized("Unauthorized request")
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;
    use axum_extra::extract::cookie::Cookie;

    #[test]
    fn prefers_cookie_over_header() {
        let jar = CookieJar::new().add(Cookie::new(ACCESS_TOKEN_COOKIE, "from-cookie"));
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer from-header"));

        assert_eq!(extract_access_token(&jar, &headers).as_deref(), Some("from-cookie"));
    }

    #[test]
    fn falls_back_to_bearer_header() {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer abc.def.ghi"));

        assert_eq!(
            extract_access_token(&CookieJar::new(), &headers).as_deref(),
            Some("abc.def.ghi")
        );
    }

    #[test]
    fn rejects_non_bearer_and_empty_tokens() {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_static("Basic dXNlcjpwYXNz"));
        assert!(extract_access_token(&CookieJar::new(), &headers).is_none());

        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer   "));
        assert!(extract_access_token(&CookieJar::new(), &headers).is_none());

        assert!(extract_access_token(&CookieJar::new(), &HeaderMap::new()).is_none());
    }
}
