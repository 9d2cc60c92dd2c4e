pub mod form;
pub mod subscriptions;
pub mod users;
pub mod validation;
pub mod videos;


use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde_json::{json, Value};

use crate::database::DatabaseManager;
use crate::state::AppState;

/// GET / - service description
pub async fn root() -> Json<Value> {
    let version = env!("CARGO_PKG_VERSION");

    Json(json!({
        "statusCode": 200,
        "success": true,
        "message": "VidTube API",
        "data": {
            "name": "VidTube API",
            "version": version,
            "endpoints": {
                "health": "/health (public)",
                "users": "/api/v1/users/{register,login,refresh-token} (public), /api/v1/users/* (protected)",
                "videos": "/api/v1/videos[/:videoId] (protected)",
                "subscriptions": "/api/v1/subscriptions/{c/:channelId,u/:subscriberId} (protected)"
            }
        }
    }))
}

/// GET /health - liveness plus database reachability
pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let now = chrono::Utc::now();

    match DatabaseManager::health_check(&state.pool).await {
        Ok(_) => (
            StatusCode::OK,
            Json(json!({
                "statusCode": 200,
                "success": true,
                "message": "OK",
                "data": {
                    "status": "ok",
                    "timestamp": now,
                    "database": "ok"
                }
            })),
        ),
        Err(e) => {
            tracing::warn!("Health check failed: {}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({
                    "statusCode": 503,
                    "success": false,
                    "message": "database unavailable",
                    "data": {
                        "status": "degraded",
                        "timestamp": now,
                        "database": "unavailable"
                    }
                })),
            )
        }
    }
}
