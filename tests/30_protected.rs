mod common;

use anyhow::Result;
use reqwest::{Method, StatusCode};

use common::assert_error_envelope;

const PROTECTED: &[(&str, &str)] = &[
    ("POST", "/api/v1/users/logout"),
    ("POST", "/api/v1/users/change-password"),
    ("GET", "/api/v1/users/current-user"),
    ("PATCH", "/api/v1/users/update-account"),
    ("PATCH", "/api/v1/users/avatar"),
    ("PATCH", "/api/v1/users/cover-image"),
    ("GET", "/api/v1/users/c/someone"),
    ("GET", "/api/v1/users/history"),
    ("POST", "/api/v1/videos"),
    ("GET", "/api/v1/videos/00000000-0000-0000-0000-000000000000"),
    ("POST", "/api/v1/subscriptions/c/00000000-0000-0000-0000-000000000000"),
    ("GET", "/api/v1/subscriptions/u/00000000-0000-0000-0000-000000000000"),
];

#[tokio::test]
async fn protected_routes_reject_anonymous_requests() -> Result<()> {
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();

    for (method, path) in PROTECTED {
        let method = Method::from_bytes(method.as_bytes())?;
        let res = client.request(method, server.url(path)).send().await?;

        assert_eq!(res.status(), StatusCode::UNAUTHORIZED, "{}", path);
        let body = res.json::<serde_json::Value>().await?;
        assert_error_envelope(&body, StatusCode::UNAUTHORIZED);
        assert_eq!(body["message"], "Unauthorized request", "{}", path);
    }
    Ok(())
}

#[tokio::test]
async fn forged_bearer_token_is_rejected() -> Result<()> {
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();

    let res = client
        .get(server.url("/api/v1/users/current-user"))
        .bearer_auth("not-a-real-token")
        .send()
        .await?;

    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    let body = res.json::<serde_json::Value>().await?;
    assert_eq!(body["message"], "Invalid access token");
    Ok(())
}

#[tokio::test]
async fn forged_cookie_token_is_rejected() -> Result<()> {
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();

    let res = client
        .get(server.url("/api/v1/users/history"))
        .header("Cookie", "accessToken=forged")
        .send()
        .await?;

    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    let body = res.json::<serde_json::Value>().await?;
    assert_eq!(body["message"], "Invalid access token");
    Ok(())
}
