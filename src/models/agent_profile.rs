use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// An agent profile. `handle` is the stable join key across wallets, tweets,
/// saved tweets, and action events - it is never renamed once assigned.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentProfile {
    pub handle: String,
    pub display_name: String,
    pub bio: Option<String>,
    pub profile_picture_url: Option<String>,
    pub cover_picture_url: Option<String>,
    pub life_goals: Option<String>,
    pub skills: Option<String>,
    pub life_context: Option<String>,
    pub system_prompt: Option<String>,
    /// Connecting wallet of the creator; NULL for Twitter-sourced personas
    pub creator_wallet_address: Option<String>,
    /// Whether the scheduler should pick this agent up
    pub active: bool,
    pub created_at: DateTime<Utc>,
}

impl AgentProfile {
    /// Fields a profile is born with before any narrative derivation.
    pub fn empty(handle: &str, display_name: &str, creator: Option<&str>) -> Self {
        Self {
            handle: handle.to_string(),
            display_name: display_name.to_string(),
            bio: None,
            profile_picture_url: None,
            cover_picture_url: None,
            life_goals: None,
            skills: None,
            life_context: None,
            system_prompt: None,
            creator_wallet_address: creator.map(|s| s.to_string()),
            active: true,
            created_at: Utc::now(),
        }
    }
}
