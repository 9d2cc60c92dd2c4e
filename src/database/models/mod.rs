pub mod subscription;
pub mod user;
pub mod video;

pub use subscription::{Subscription, SubscriptionToggle};
pub use user::{ChannelProfile, NewUser, User, UserSummary};
pub use video::{NewVideo, OwnerSummary, Video, WatchedVideo};
