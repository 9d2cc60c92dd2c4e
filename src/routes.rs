use axum::{
    extract::DefaultBodyLimit,
    http::{header, HeaderValue, Method},
    middleware,
    routing::{get, patch, post},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::handlers::{self, subscriptions, users, videos};
use crate::middleware::verify_jwt;
use crate::state::AppState;

/// Build the complete application router
pub fn app(state: AppState) -> Router {
    let json_limit = state.config.server.json_body_limit_bytes;
    let cors = cors_layer(&state.config.server.cors_origins);

    Router::new()
        // Public
        .route("/", get(handlers::root))
        .route("/health", get(handlers::health))
        .nest("/api/v1/users", user_routes(state.clone()))
        .nest("/api/v1/videos", video_routes(state.clone()))
        .nest("/api/v1/subscriptions", subscription_routes(state.clone()))
        // Global middleware
        .layer(DefaultBodyLimit::max(json_limit))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn user_routes(state: AppState) -> Router<AppState> {
    let upload_limit = DefaultBodyLimit::max(state.config.server.upload_body_limit_bytes);

    let public = Router::new()
        .route("/register", post(users::register_user).layer(upload_limit))
        .route("/login", post(users::login_user))
        .route("/refresh-token", post(users::refresh_access_token));

    let protected = Router::new()
        .route("/logout", post(users::logout_user))
        .route("/change-password", post(users::change_current_password))
        .route("/current-user", get(users::get_current_user))
        .route("/update-account", patch(users::update_account_details))
        .route("/avatar", patch(users::update_user_avatar).layer(upload_limit))
        .route("/cover-image", patch(users::update_user_cover_image).layer(upload_limit))
        .route("/c/:username", get(users::get_user_channel_profile))
        .route("/history", get(users::get_watch_history))
        .route_layer(middleware::from_fn_with_state(state, verify_jwt));

    public.merge(protected)
}

fn video_routes(state: AppState) -> Router<AppState> {
    let upload_limit = DefaultBodyLimit::max(state.config.server.upload_body_limit_bytes);

    Router::new()
        .route("/", post(videos::publish_video).layer(upload_limit))
        .route("/:videoId", get(videos::get_video_by_id))
        .route_layer(middleware::from_fn_with_state(state, verify_jwt))
}

fn subscription_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route(
            "/c/:channelId",
            post(subscriptions::toggle_subscription).get(subscriptions::get_channel_subscribers),
        )
        .route("/u/:subscriberId", get(subscriptions::get_subscribed_channels))
        .route_layer(middleware::from_fn_with_state(state, verify_jwt))
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin: {}", origin);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(allowed)
        .allow_credentials(true)
        .allow_methods([Method::GET, Method::POST, Method::PATCH, Method::DELETE, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
}
