use axum::extract::{Multipart, State};

use crate::database::models::User;
use crate::error::ApiError;
use crate::handlers::form::FormData;
use crate::media::MediaError;
use crate::middleware::{ApiResponse, ApiResult, CurrentUser};
use crate::state::AppState;

/// Which profile image a request replaces
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ProfileImage {
    Avatar,
    CoverImage,
}

impl ProfileImage {
    fn field(self) -> &'static str {
        match self {
            ProfileImage::Avatar => "avatar",
            ProfileImage::CoverImage => "coverImage",
        }
    }

    fn missing_message(self) -> &'static str {
        match self {
            ProfileImage::Avatar => "Avatar file is missing",
            ProfileImage::CoverImage => "Cover image file is missing",
        }
    }

    fn upload_failed_message(self) -> &'static str {
        match self {
            ProfileImage::Avatar => "Error while uploading avatar",
            ProfileImage::CoverImage => "Error while uploading cover image",
        }
    }

    fn success_message(self) -> &'static str {
        match self {
            ProfileImage::Avatar => "Avatar image updated successfully",
            ProfileImage::CoverImage => "Cover image updated successfully",
        }
    }

    fn current_url(self, user: &User) -> &str {
        match self {
            ProfileImage::Avatar => &user.avatar,
            ProfileImage::CoverImage => &user.cover_image,
        }
    }
}

/// PATCH /api/v1/users/avatar - multipart `avatar`
pub async fn update_user_avatar(
    State(state): State<AppState>,
    current: CurrentUser,
    multipart: Multipart,
) -> ApiResult<User> {
    replace_image(&state, current, multipart, ProfileImage::Avatar).await
}

/// PATCH /api/v1/users/cover-image - multipart `coverImage`
pub async fn update_user_cover_image(
    State(state): State<AppState>,
    current: CurrentUser,
    multipart: Multipart,
) -> ApiResult<User> {
    replace_image(&state, current, multipart, ProfileImage::CoverImage).await
}

async fn replace_image(
    state: &AppState,
    CurrentUser(user): CurrentUser,
    multipart: Multipart,
    kind: ProfileImage,
) -> ApiResult<User> {
    let mut form = FormData::from_multipart(multipart).await?;
    let file = form
        .take_file(kind.field())
        .ok_or_else(|| ApiError::bad_request(kind.missing_message()))?;

    let uploaded = state.media.upload(file).await.map_err(|e| match e {
        MediaError::NotConfigured => ApiError::from(e),
        other => {
            tracing::warn!("{} upload failed for {}: {}", kind.field(), user.id, other);
            ApiError::bad_request(kind.upload_failed_message())
        }
    })?;

    let users = state.users();
    let updated = match kind {
        ProfileImage::Avatar => users.update_avatar(user.id, &uploaded.url).await?,
        ProfileImage::CoverImage => users.update_cover_image(user.id, &uploaded.url).await?,
    };

    // The old asset is no longer referenced; losing it is not worth failing the request over
    let previous = kind.current_url(&user);
    if !previous.is_empty() && previous != uploaded.url {
        if let Err(e) = state.media.destroy(previous).await {
            tracing::warn!("Could not delete previous {} {}: {}", kind.field(), previous, e);
        }
    }

    Ok(ApiResponse::ok(updated, kind.success_message()))
}
