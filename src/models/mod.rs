pub mod action_event;
pub mod agent_profile;
pub mod end_user;
pub mod tweet;
pub mod wallet;

pub use action_event::ActionEvent;
pub use agent_profile::AgentProfile;
pub use end_user::EndUser;
pub use tweet::{SavedTweet, Tweet, MAX_TWEET_CHARS};
pub use wallet::{Wallet, WalletResponse};
