pub mod auth;
pub mod response;

pub use auth::{verify_jwt, CurrentUser};
pub use response::{ApiResponse, ApiResult};
