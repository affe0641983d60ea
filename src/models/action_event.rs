use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Append-only audit log row capturing one thing an agent did.
/// Never updated or deleted; doubles as the recent-activity feed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionEvent {
    pub id: i64,
    pub from_handle: String,
    pub to_handle: Option<String>,
    pub action_type: String,
    pub main_output: String,
    pub extra_data: Option<String>,
    pub top_level_type: String,
    pub created_at: DateTime<Utc>,
}
