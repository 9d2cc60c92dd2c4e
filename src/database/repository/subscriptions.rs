use sqlx::PgPool;
use uuid::Uuid;

use crate::database::manager::DatabaseError;
use crate::database::models::{Subscription, SubscriptionToggle, UserSummary};

#[derive(Clone)]
pub struct SubscriptionRepository {
    pool: PgPool,
}

impl SubscriptionRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Unsubscribe if subscribed, subscribe otherwise
    pub async fn toggle(&self, subscriber_id: Uuid, channel_id: Uuid) -> Result<SubscriptionToggle, DatabaseError> {
        let mut tx = self.pool.begin().await?;

        let removed = sqlx::query("DELETE FROM subscriptions WHERE subscriber_id = $1 AND channel_id = $2")
            .bind(subscriber_id)
            .bind(channel_id)
            .execute(&mut *tx)
            .await?;

        if removed.rows_affected() > 0 {
            tx.commit().await?;
            return Ok(SubscriptionToggle {
                subscribed: false,
                subscription: None,
            });
        }

        // A concurrent toggle may have inserted the same pair first
        let subscription = sqlx::query_as::<_, Subscription>(
            r#"
            INSERT INTO subscriptions (id, subscriber_id, channel_id)
            VALUES ($1, $2, $3)
            ON CONFLICT (subscriber_id, channel_id) DO NOTHING
            RETURNING id, subscriber_id, channel_id, created_at, updated_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(subscriber_id)
        .bind(channel_id)
        .fetch_optional(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(SubscriptionToggle {
            subscribed: true,
            subscription,
        })
    }

    /// Users subscribed to `channel_id`, newest first
    pub async fn subscribers(&self, channel_id: Uuid) -> Result<Vec<UserSummary>, DatabaseError> {
        let rows = sqlx::query_as::<_, UserSummary>(
            r#"
            SELECT u.id, u.username, u.full_name, u.avatar
            FROM subscriptions s
            JOIN users u ON u.id = s.subscriber_id
            WHERE s.channel_id = $1
            ORDER BY s.created_at DESC
            "#,
        )
        .bind(channel_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// Channels `subscriber_id` follows, newest first
    pub async fn subscribed_channels(&self, subscriber_id: Uuid) -> Result<Vec<UserSummary>, DatabaseError> {
        let rows = sqlx::query_as::<_, UserSummary>(
            r#"
            SELECT u.id, u.username, u.full_name, u.avatar
            FROM subscriptions s
            JOIN users u ON u.id = s.channel_id
            WHERE s.subscriber_id = $1
            ORDER BY s.created_at DESC
            "#,
        )
        .bind(subscriber_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }
}
