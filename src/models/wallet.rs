use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A custodial wallet tied to an agent profile. Created once per profile,
/// never rotated. The private key is held by the application on behalf of
/// the agent - a known security concern of this design, not a correctness
/// one.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Wallet {
    pub handle: String,
    pub address: String,
    #[serde(skip_serializing)]
    pub private_key: String,
    pub permit_signature: String,
    /// Hash of the one-time initial funding transaction; None until
    /// funding has gone through
    pub funding_tx_hash: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Response type for wallet API payloads (never exposes the private key)
#[derive(Debug, Clone, Serialize)]
pub struct WalletResponse {
    pub handle: String,
    pub address: String,
    pub created_at: DateTime<Utc>,
}

impl From<Wallet> for WalletResponse {
    fn from(w: Wallet) -> Self {
        Self {
            handle: w.handle,
            address: w.address,
            created_at: w.created_at,
        }
    }
}
