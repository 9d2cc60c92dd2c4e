use axum::extract::{Multipart, State};

use crate::auth::hash_password;
use crate::database::models::{NewUser, User};
use crate::error::ApiError;
use crate::handlers::form::FormData;
use crate::handlers::validation::{require_fields, validate_email_format, validate_username_format};
use crate::media::MediaError;
use crate::middleware::{ApiResponse, ApiResult};
use crate::state::AppState;

/// POST /api/v1/users/register - Create an account
///
/// multipart/form-data with text fields `username`, `fullName`, `email`,
/// `password`, a required `avatar` file and an optional `coverImage` file.
/// Both images are pushed to the media store before the user row is written;
/// if the insert fails the uploads are removed again.
pub async fn register_user(State(state): State<AppState>, multipart: Multipart) -> ApiResult<User> {
    let mut form = FormData::from_multipart(multipart).await?;

    require_fields(&[
        ("username", form.text("username")),
        ("fullName", form.text("fullName")),
        ("email", form.text("email")),
        ("password", form.text("password")),
    ])?;

    let username = form.text("username").unwrap_or_default().to_lowercase();
    let email = form.text("email").unwrap_or_default().to_lowercase();
    let full_name = form.text("fullName").unwrap_or_default().to_string();
    let password = form.text("password").unwrap_or_default().to_string();

    validate_username_format(&username).map_err(ApiError::bad_request)?;
    validate_email_format(&email).map_err(ApiError::bad_request)?;

    let avatar_file = form
        .take_file("avatar")
        .ok_or_else(|| ApiError::bad_request("Avatar file is required"))?;
    let cover_file = form.take_file("coverImage");

    let users = state.users();
    if users
        .find_by_username_or_email(Some(&username), Some(&email))
        .await?
        .is_some()
    {
        return Err(ApiError::conflict("User with email or username already exists"));
    }

    let avatar = state.media.upload(avatar_file).await.map_err(|e| match e {
        MediaError::NotConfigured => ApiError::from(e),
        other => {
            tracing::warn!("Avatar upload failed for {}: {}", username, other);
            ApiError::bad_request("Avatar file is required")
        }
    })?;

    // A failed cover upload leaves the profile without one
    let cover_image = match cover_file {
        Some(file) => match state.media.upload(file).await {
            Ok(uploaded) => Some(uploaded),
            Err(e) => {
                tracing::warn!("Cover image upload failed for {}: {}", username, e);
                None
            }
        },
        None => None,
    };

    let password_hash = hash_password(&password, state.config.security.bcrypt_cost).await?;

    let created = users
        .create(NewUser {
            username,
            email,
            full_name,
            avatar: avatar.url.clone(),
            cover_image: cover_image.as_ref().map(|c| c.url.clone()).unwrap_or_default(),
            password_hash,
        })
        .await;

    let user = match created {
        Ok(user) => user,
        Err(e) => {
            discard_upload(&state, &avatar.url).await;
            if let Some(cover) = &cover_image {
                discard_upload(&state, &cover.url).await;
            }
            return Err(e.into());
        }
    };

    tracing::info!("Registered user {} ({})", user.username, user.id);
    Ok(ApiResponse::created(user, "User registered successfully"))
}

async fn discard_upload(state: &AppState, url: &str) {
    if let Err(e) = state.media.destroy(url).await {
        tracing::warn!("Failed to remove orphaned upload {}: {}", url, e);
    }
}
