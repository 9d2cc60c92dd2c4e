use axum::extract::{Path, State};

use crate::database::models::{ChannelProfile, WatchedVideo};
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, CurrentUser};
use crate::state::AppState;

/// GET /api/v1/users/c/:username - Channel page with subscription counts
pub async fn get_user_channel_profile(
    State(state): State<AppState>,
    CurrentUser(viewer): CurrentUser,
    Path(username): Path<String>,
) -> ApiResult<ChannelProfile> {
    let username = username.trim().to_lowercase();
    if username.is_empty() {
        return Err(ApiError::bad_request("username is missing"));
    }

    let channel = state
        .users()
        .channel_profile(&username, viewer.id)
        .await?
        .ok_or_else(|| ApiError::not_found("Channel does not exist"))?;

    Ok(ApiResponse::ok(channel, "User channel fetched successfully"))
}

/// GET /api/v1/users/history - The requester's watch history, newest first
pub async fn get_watch_history(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> ApiResult<Vec<WatchedVideo>> {
    let history = state.users().watch_history(user.id).await?;

    tracing::debug!("Loaded {} history entries for {}", history.len(), user.id);
    Ok(ApiResponse::ok(history, "Watch history fetched successfully"))
}
