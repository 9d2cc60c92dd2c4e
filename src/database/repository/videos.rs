use sqlx::PgPool;
use uuid::Uuid;

use crate::database::manager::DatabaseError;
use crate::database::models::{NewVideo, Video};

const VIDEO_COLUMNS: &str =
    "id, video_file, thumbnail, title, description, duration, views, is_published, owner_id, created_at, updated_at";

#[derive(Clone)]
pub struct VideoRepository {
    pool: PgPool,
}

impl VideoRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, new_video: NewVideo) -> Result<Video, DatabaseError> {
        let sql = format!(
            r#"
            INSERT INTO videos (id, video_file, thumbnail, title, description, duration, owner_id)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {}
            "#,
            VIDEO_COLUMNS
        );
        let video = sqlx::query_as::<_, Video>(&sql)
            .bind(Uuid::new_v4())
            .bind(&new_video.video_file)
            .bind(&new_video.thumbnail)
            .bind(&new_video.title)
            .bind(&new_video.description)
            .bind(new_video.duration)
            .bind(new_video.owner_id)
            .fetch_one(&self.pool)
            .await?;
        Ok(video)
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Video>, DatabaseError> {
        let sql = format!("SELECT {} FROM videos WHERE id = $1", VIDEO_COLUMNS);
        let video = sqlx::query_as::<_, Video>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(video)
    }

    pub async fn increment_views(&self, id: Uuid) -> Result<Video, DatabaseError> {
        let sql = format!(
            "UPDATE videos SET views = views + 1 WHERE id = $1 RETURNING {}",
            VIDEO_COLUMNS
        );
        sqlx::query_as::<_, Video>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| DatabaseError::NotFound("Video not found".to_string()))
    }
}
