use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// An end user, keyed by their connecting wallet address (lowercase hex,
/// 42 chars). Created on the first wallet-connection call and never deleted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EndUser {
    pub wallet_address: String,
    pub has_created_agent: bool,
    pub created_at: DateTime<Utc>,
}
