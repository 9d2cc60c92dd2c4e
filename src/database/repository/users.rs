use sqlx::PgPool;
use uuid::Uuid;

use super::conflict_on_unique;
use crate::database::manager::DatabaseError;
use crate::database::models::{ChannelProfile, NewUser, User, WatchedVideo};

const USER_COLUMNS: &str =
    "id, username, email, full_name, avatar, cover_image, password, refresh_token, created_at, updated_at";

#[derive(Clone)]
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, DatabaseError> {
        let sql = format!("SELECT {} FROM users WHERE id = $1", USER_COLUMNS);
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    /// Match on either identifier; a `None` never matches. A username match
    /// wins over an email match belonging to a different user.
    pub async fn find_by_username_or_email(
        &self,
        username: Option<&str>,
        email: Option<&str>,
    ) -> Result<Option<User>, DatabaseError> {
        let sql = format!(
            "SELECT {} FROM users WHERE username = $1 OR email = $2 ORDER BY (username = $1) DESC NULLS LAST LIMIT 1",
            USER_COLUMNS
        );
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(username)
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    pub async fn create(&self, new_user: NewUser) -> Result<User, DatabaseError> {
        let sql = format!(
            r#"
            INSERT INTO users (id, username, email, full_name, avatar, cover_image, password)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {}
            "#,
            USER_COLUMNS
        );
        sqlx::query_as::<_, User>(&sql)
            .bind(Uuid::new_v4())
            .bind(&new_user.username)
            .bind(&new_user.email)
            .bind(&new_user.full_name)
            .bind(&new_user.avatar)
            .bind(&new_user.cover_image)
            .bind(&new_user.password_hash)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| conflict_on_unique(e, "User with email or username already exists"))
    }

    /// Store (or clear, with `None`) the user's current refresh token
    pub async fn set_refresh_token(&self, id: Uuid, token: Option<&str>) -> Result<(), DatabaseError> {
        let result = sqlx::query("UPDATE users SET refresh_token = $2, updated_at = NOW() WHERE id = $1")
            .bind(id)
            .bind(token)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(DatabaseError::NotFound("User not found".to_string()));
        }
        Ok(())
    }

    /// Replace `current` with `next` only while `current` is still the stored
    /// token. Returns `false` when another request rotated or revoked it first.
    pub async fn rotate_refresh_token(&self, id: Uuid, current: &str, next: &str) -> Result<bool, DatabaseError> {
        let result = sqlx::query(
            "UPDATE users SET refresh_token = $3, updated_at = NOW() WHERE id = $1 AND refresh_token = $2",
        )
        .bind(id)
        .bind(current)
        .bind(next)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() == 1)
    }

    pub async fn update_password(&self, id: Uuid, password_hash: &str) -> Result<(), DatabaseError> {
        let result = sqlx::query("UPDATE users SET password = $2, updated_at = NOW() WHERE id = $1")
            .bind(id)
            .bind(password_hash)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(DatabaseError::NotFound("User not found".to_string()));
        }
        Ok(())
    }

    pub async fn update_account(&self, id: Uuid, full_name: &str, email: &str) -> Result<User, DatabaseError> {
        let sql = format!(
            "UPDATE users SET full_name = $2, email = $3, updated_at = NOW() WHERE id = $1 RETURNING {}",
            USER_COLUMNS
        );
        sqlx::query_as::<_, User>(&sql)
            .bind(id)
            .bind(full_name)
            .bind(email)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| conflict_on_unique(e, "Email is already in use"))?
            .ok_or_else(|| DatabaseError::NotFound("User not found".to_string()))
    }

    pub async fn update_avatar(&self, id: Uuid, avatar_url: &str) -> Result<User, DatabaseError> {
        self.update_image_column(id, "avatar", avatar_url).await
    }

    pub async fn update_cover_image(&self, id: Uuid, cover_image_url: &str) -> Result<User, DatabaseError> {
        self.update_image_column(id, "cover_image", cover_image_url).await
    }

    // `column` is always one of the two literals above, never user input
    async fn update_image_column(&self, id: Uuid, column: &'static str, url: &str) -> Result<User, DatabaseError> {
        let sql = format!(
            "UPDATE users SET {} = $2, updated_at = NOW() WHERE id = $1 RETURNING {}",
            column, USER_COLUMNS
        );
        sqlx::query_as::<_, User>(&sql)
            .bind(id)
            .bind(url)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| DatabaseError::NotFound("User not found".to_string()))
    }

    /// Channel page for `username`, with subscription counts and whether
    /// `viewer_id` is subscribed to it
    pub async fn channel_profile(
        &self,
        username: &str,
        viewer_id: Uuid,
    ) -> Result<Option<ChannelProfile>, DatabaseError> {
        let query = r#"
            SELECT
                u.id, u.username, u.full_name, u.email, u.avatar, u.cover_image,
                (SELECT COUNT(*) FROM subscriptions s WHERE s.channel_id = u.id) AS subscribers_count,
                (SELECT COUNT(*) FROM subscriptions s WHERE s.subscriber_id = u.id) AS channels_subscribed_to_count,
                EXISTS (
                    SELECT 1 FROM subscriptions s
                    WHERE s.channel_id = u.id AND s.subscriber_id = $2
                ) AS is_subscribed
            FROM users u
            WHERE u.username = $1
        "#;

        let profile = sqlx::query_as::<_, ChannelProfile>(query)
            .bind(username)
            .bind(viewer_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(profile)
    }

    /// Videos the user has watched, most recent first, with owners resolved
    pub async fn watch_history(&self, user_id: Uuid) -> Result<Vec<WatchedVideo>, DatabaseError> {
        let query = r#"
            SELECT
                v.id, v.video_file, v.thumbnail, v.title, v.description, v.duration,
                v.views, v.is_published, v.created_at, v.updated_at,
                wh.watched_at,
                o.full_name, o.username, o.avatar
            FROM watch_history wh
            JOIN videos v ON v.id = wh.video_id
            JOIN users o ON o.id = v.owner_id
            WHERE wh.user_id = $1
            ORDER BY wh.watched_at DESC
        "#;

        let history = sqlx::query_as::<_, WatchedVideo>(query)
            .bind(user_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(history)
    }

    /// Add a video to the user's history, or move it to the top if already there
    pub async fn record_watch(&self, user_id: Uuid, video_id: Uuid) -> Result<(), DatabaseError> {
        sqlx::query(
            r#"
            INSERT INTO watch_history (user_id, video_id, watched_at)
            VALUES ($1, $2, NOW())
            ON CONFLICT (user_id, video_id) DO UPDATE SET watched_at = EXCLUDED.watched_at
            "#,
        )
        .bind(user_id)
        .bind(video_id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}
