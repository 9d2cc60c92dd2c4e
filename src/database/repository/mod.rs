pub mod subscriptions;
pub mod users;
pub mod videos;

pub use subscriptions::SubscriptionRepository;
pub use users::UserRepository;
pub use videos::VideoRepository;

use super::manager::DatabaseError;

/// Turn a unique-constraint violation into a `Conflict` with a caller-chosen message
fn conflict_on_unique(err: sqlx::Error, message: &str) -> DatabaseError {
    match &err {
        sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
            DatabaseError::Conflict(message.to_string())
        }
        _ => DatabaseError::Sqlx(err),
    }
}
