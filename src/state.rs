use std::sync::Arc;

use sqlx::PgPool;

use crate::config::AppConfig;
use crate::database::{SubscriptionRepository, UserRepository, VideoRepository};
use crate::media::MediaStore;

/// Shared handles injected into every handler
#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub config: Arc<AppConfig>,
    pub media: Arc<dyn MediaStore>,
}

impl AppState {
    pub fn new(pool: PgPool, config: AppConfig, media: Arc<dyn MediaStore>) -> Self {
        Self {
            pool,
            config: Arc::new(config),
            media,
        }
    }

    pub fn users(&self) -> UserRepository {
        UserRepository::new(self.pool.clone())
    }

    pub fn videos(&self) -> VideoRepository {
        VideoRepository::new(self.pool.clone())
    }

    pub fn subscriptions(&self) -> SubscriptionRepository {
        SubscriptionRepository::new(self.pool.clone())
    }
}
