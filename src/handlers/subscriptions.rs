use axum::extract::{Path, State};
use uuid::Uuid;

use crate::database::models::{SubscriptionToggle, UserSummary};
use crate::error::ApiError;
use crate::handlers::validation::parse_id;
use crate::middleware::{ApiResponse, ApiResult, CurrentUser};
use crate::state::AppState;

/// POST /api/v1/subscriptions/c/:channelId - Subscribe or unsubscribe
pub async fn toggle_subscription(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(channel_id): Path<String>,
) -> ApiResult<SubscriptionToggle> {
    let channel_id = parse_id(&channel_id, "channelId")?;
    if channel_id == user.id {
        return Err(ApiError::bad_request("You cannot subscribe to your own channel"));
    }
    ensure_user_exists(&state, channel_id).await?;

    let toggle = state.subscriptions().toggle(user.id, channel_id).await?;
    let message = if toggle.subscribed {
        "Subscribed successfully"
    } else {
        "Unsubscribed successfully"
    };

    tracing::info!("User {} subscribed={} to {}", user.id, toggle.subscribed, channel_id);
    Ok(ApiResponse::ok(toggle, message))
}

/// GET /api/v1/subscriptions/c/:channelId - Who subscribes to a channel
pub async fn get_channel_subscribers(
    State(state): State<AppState>,
    _user: CurrentUser,
    Path(channel_id): Path<String>,
) -> ApiResult<Vec<UserSummary>> {
    let channel_id = parse_id(&channel_id, "channelId")?;
    ensure_user_exists(&state, channel_id).await?;

    let subscribers = state.subscriptions().subscribers(channel_id).await?;
    Ok(ApiResponse::ok(subscribers, "Subscribers fetched successfully"))
}

/// GET /api/v1/subscriptions/u/:subscriberId - Channels a user subscribes to
pub async fn get_subscribed_channels(
    State(state): State<AppState>,
    _user: CurrentUser,
    Path(subscriber_id): Path<String>,
) -> ApiResult<Vec<UserSummary>> {
    let subscriber_id = parse_id(&subscriber_id, "subscriberId")?;
    ensure_user_exists(&state, subscriber_id).await?;

    let channels = state.subscriptions().subscribed_channels(subscriber_id).await?;
    Ok(ApiResponse::ok(channels, "Subscribed channels fetched successfully"))
}

async fn ensure_user_exists(state: &AppState, id: Uuid) -> Result<(), ApiError> {
    match state.users().find_by_id(id).await? {
        Some(_) => Ok(()),
        None => Err(ApiError::not_found("Channel does not exist")),
    }
}
