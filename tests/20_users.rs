mod common;

use anyhow::Result;
use reqwest::multipart::{Form, Part};
use reqwest::StatusCode;
use serde_json::json;

use common::assert_error_envelope;

#[tokio::test]
async fn register_without_fields_lists_each_missing_one() -> Result<()> {
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();

    let form = Form::new().text("username", "alice");
    let res = client
        .post(server.url("/api/v1/users/register"))
        .multipart(form)
        .send()
        .await?;

    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body = res.json::<serde_json::Value>().await?;
    assert_error_envelope(&body, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "All fields are required");
    assert_eq!(body["errors"].as_array().map(|e| e.len()), Some(3), "body: {}", body);
    Ok(())
}

#[tokio::test]
async fn register_without_avatar_is_rejected() -> Result<()> {
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();

    let form = Form::new()
        .text("username", "bob")
        .text("fullName", "Bob Builder")
        .text("email", "bob@example.com")
        .text("password", "can-we-fix-it")
        .part("coverImage", Part::bytes(vec![1, 2, 3]).file_name("cover.png"));
    let res = client
        .post(server.url("/api/v1/users/register"))
        .multipart(form)
        .send()
        .await?;

    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body = res.json::<serde_json::Value>().await?;
    assert_eq!(body["message"], "Avatar file is required");
    Ok(())
}

#[tokio::test]
async fn register_rejects_malformed_username() -> Result<()> {
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();

    let form = Form::new()
        .text("username", "-x")
        .text("fullName", "X")
        .text("email", "x@example.com")
        .text("password", "secret")
        .part("avatar", Part::bytes(vec![1, 2, 3]).file_name("a.png"));
    let res = client
        .post(server.url("/api/v1/users/register"))
        .multipart(form)
        .send()
        .await?;

    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body = res.json::<serde_json::Value>().await?;
    assert_error_envelope(&body, StatusCode::BAD_REQUEST);
    Ok(())
}

#[tokio::test]
async fn login_requires_username_or_email() -> Result<()> {
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();

    let res = client
        .post(server.url("/api/v1/users/login"))
        .json(&json!({ "password": "test-password" }))
        .send()
        .await?;

    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body = res.json::<serde_json::Value>().await?;
    assert_error_envelope(&body, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "username or email is required");
    Ok(())
}

#[tokio::test]
async fn login_requires_password() -> Result<()> {
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();

    let res = client
        .post(server.url("/api/v1/users/login"))
        .json(&json!({ "email": "someone@example.com" }))
        .send()
        .await?;

    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body = res.json::<serde_json::Value>().await?;
    assert_eq!(body["message"], "password is required");
    Ok(())
}

#[tokio::test]
async fn login_with_invalid_json_is_bad_request() -> Result<()> {
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();

    let res = client
        .post(server.url("/api/v1/users/login"))
        .header("Content-Type", "application/json")
        .body("{invalid json")
        .send()
        .await?;

    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body = res.json::<serde_json::Value>().await?;
    assert_error_envelope(&body, StatusCode::BAD_REQUEST);
    Ok(())
}

#[tokio::test]
async fn refresh_without_token_is_unauthorized() -> Result<()> {
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();

    let res = client.post(server.url("/api/v1/users/refresh-token")).send().await?;

    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    let body = res.json::<serde_json::Value>().await?;
    assert_error_envelope(&body, StatusCode::UNAUTHORIZED);
    Ok(())
}

#[tokio::test]
async fn refresh_with_tampered_cookie_is_unauthorized() -> Result<()> {
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();

    let res = client
        .post(server.url("/api/v1/users/refresh-token"))
        .header("Cookie", "refreshToken=eyJhbGciOiJIUzI1NiJ9.e30.bad")
        .send()
        .await?;

    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    let body = res.json::<serde_json::Value>().await?;
    assert_eq!(body["message"], "Invalid refresh token");
    Ok(())
}
