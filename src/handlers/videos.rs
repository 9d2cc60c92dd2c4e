use axum::extract::{Multipart, Path, State};

use crate::database::models::{NewVideo, Video};
use crate::error::ApiError;
use crate::handlers::form::FormData;
use crate::handlers::validation::{parse_id, require_fields};
use crate::middleware::{ApiResponse, ApiResult, CurrentUser};
use crate::state::AppState;

/// POST /api/v1/videos - Publish a video
///
/// multipart/form-data with `title`, `description`, a `videoFile` and a
/// `thumbnail`. The duration is whatever the media provider measured.
pub async fn publish_video(
    State(state): State<AppState>,
    CurrentUser(owner): CurrentUser,
    multipart: Multipart,
) -> ApiResult<Video> {
    let mut form = FormData::from_multipart(multipart).await?;

    require_fields(&[("title", form.text("title")), ("description", form.text("description"))])?;
    let title = form.text("title").unwrap_or_default().to_string();
    let description = form.text("description").unwrap_or_default().to_string();

    let video_file = form
        .take_file("videoFile")
        .ok_or_else(|| ApiError::bad_request("Video file is required"))?;
    let thumbnail_file = form
        .take_file("thumbnail")
        .ok_or_else(|| ApiError::bad_request("Thumbnail is required"))?;

    let video_upload = state.media.upload(video_file).await?;

    let thumbnail_upload = match state.media.upload(thumbnail_file).await {
        Ok(uploaded) => uploaded,
        Err(e) => {
            if let Err(cleanup) = state.media.destroy(&video_upload.url).await {
                tracing::warn!("Failed to remove orphaned video {}: {}", video_upload.url, cleanup);
            }
            return Err(e.into());
        }
    };

    let video = state
        .videos()
        .create(NewVideo {
            video_file: video_upload.url,
            thumbnail: thumbnail_upload.url,
            title,
            description,
            duration: video_upload.duration.unwrap_or_default(),
            owner_id: owner.id,
        })
        .await?;

    tracing::info!("User {} published video {}", owner.id, video.id);
    Ok(ApiResponse::created(video, "Video published successfully"))
}

/// GET /api/v1/videos/:videoId - Watch a video
///
/// Counts a view and moves the video to the top of the viewer's history.
/// Unpublished videos are visible only to their owner.
pub async fn get_video_by_id(
    State(state): State<AppState>,
    CurrentUser(viewer): CurrentUser,
    Path(video_id): Path<String>,
) -> ApiResult<Video> {
    let video_id = parse_id(&video_id, "videoId")?;
    let videos = state.videos();

    let video = videos
        .find_by_id(video_id)
        .await?
        .filter(|v| v.is_published || v.owner_id == viewer.id)
        .ok_or_else(|| ApiError::not_found("Video not found"))?;

    let video = videos.increment_views(video.id).await?;
    state.users().record_watch(viewer.id, video.id).await?;

    Ok(ApiResponse::ok(video, "Video fetched successfully"))
}
