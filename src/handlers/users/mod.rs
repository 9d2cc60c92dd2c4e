// Account, session, profile and channel handlers under /api/v1/users

pub mod channel;
pub mod images;
pub mod profile;
pub mod register;
pub mod session;

pub use channel::{get_user_channel_profile, get_watch_history};
pub use images::{update_user_avatar, update_user_cover_image};
pub use profile::{change_current_password, get_current_user, update_account_details};
pub use register::register_user;
pub use session::{login_user, logout_user, refresh_access_token};
