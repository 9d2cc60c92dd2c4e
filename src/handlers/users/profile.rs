use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::auth::{hash_password, verify_password};
use crate::database::models::User;
use crate::error::ApiError;
use crate::handlers::validation::{require_fields, validate_email_format};
use crate::middleware::{ApiResponse, ApiResult, CurrentUser};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordRequest {
    pub old_password: Option<String>,
    pub new_password: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateAccountRequest {
    pub full_name: Option<String>,
    pub email: Option<String>,
}

/// POST /api/v1/users/change-password
pub async fn change_current_password(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    payload: Result<Json<ChangePasswordRequest>, JsonRejection>,
) -> ApiResult<Value> {
    let Json(payload) = payload?;

    require_fields(&[
        ("oldPassword", payload.old_password.as_deref()),
        ("newPassword", payload.new_password.as_deref()),
    ])?;
    let old_password = payload.old_password.unwrap_or_default();
    let new_password = payload.new_password.unwrap_or_default();

    if !verify_password(&old_password, &user.password).await? {
        return Err(ApiError::bad_request("Invalid old password"));
    }

    let password_hash = hash_password(&new_password, state.config.security.bcrypt_cost).await?;
    state.users().update_password(user.id, &password_hash).await?;

    tracing::info!("Password changed for {}", user.id);
    Ok(ApiResponse::ok(json!({}), "Password changed successfully"))
}

/// GET /api/v1/users/current-user
pub async fn get_current_user(CurrentUser(user): CurrentUser) -> ApiResult<User> {
    Ok(ApiResponse::ok(user, "Current user fetched successfully"))
}

/// PATCH /api/v1/users/update-account - Change display name and email
pub async fn update_account_details(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    payload: Result<Json<UpdateAccountRequest>, JsonRejection>,
) -> ApiResult<User> {
    let Json(payload) = payload?;

    require_fields(&[
        ("fullName", payload.full_name.as_deref()),
        ("email", payload.email.as_deref()),
    ])?;
    let full_name = payload.full_name.unwrap_or_default().trim().to_string();
    let email = payload.email.unwrap_or_default().trim().to_lowercase();

    validate_email_format(&email).map_err(ApiError::bad_request)?;

    let updated = state.users().update_account(user.id, &full_name, &email).await?;

    Ok(ApiResponse::ok(updated, "Account details updated successfully"))
}
