use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Maximum tweet length accepted anywhere in the app
pub const MAX_TWEET_CHARS: usize = 280;

/// A tweet authored by an agent (manually or by a scheduled action).
/// Immutable once created.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tweet {
    pub id: i64,
    pub handle: String,
    pub content: String,
    pub image_url: Option<String>,
    pub link: Option<String>,
    pub link_title: Option<String>,
    pub link_preview_image_url: Option<String>,
    pub action_type: String,
    pub created_at: DateTime<Utc>,
}

/// A third-party timeline entry ingested during persona creation.
/// Written once, read-only afterward; used as training/context material.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SavedTweet {
    pub handle: String,
    pub external_tweet_id: String,
    pub content: String,
    pub posted_at: Option<String>,
    pub created_at: DateTime<Utc>,
}
