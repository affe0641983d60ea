//! Signed-challenge admin authentication.
//!
//! Admin requests prove control of the configured admin wallet: the server
//! issues a single-use nonce, the client signs the challenge message with
//! the wallet (EIP-191 personal sign), and the request carries
//! `{address, nonce, signature}`. Nothing secret is ever sent over the wire.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use ethers::types::{Address, Signature};
use uuid::Uuid;

use crate::cache::Clock;
use crate::error::ApiError;

/// Unconsumed nonces expire after this long
pub const CHALLENGE_TTL: Duration = Duration::from_secs(300);

/// The exact text the admin wallet signs
pub fn challenge_message(nonce: &str) -> String {
    format!("agent-chain admin challenge: {}", nonce)
}

/// In-memory single-use nonce store
pub struct ChallengeStore {
    nonces: Mutex<HashMap<String, Instant>>,
    ttl: Duration,
    clock: Arc<dyn Clock>,
}

impl ChallengeStore {
    pub fn new(ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            nonces: Mutex::new(HashMap::new()),
            ttl,
            clock,
        }
    }

    /// Issue a fresh nonce
    pub fn issue(&self) -> String {
        let nonce = Uuid::new_v4().to_string();
        let mut nonces = self.nonces.lock().unwrap();
        nonces.insert(nonce.clone(), self.clock.now());
        nonce
    }

    /// Consume a nonce. True exactly once per issued, unexpired nonce.
    pub fn consume(&self, nonce: &str) -> bool {
        let mut nonces = self.nonces.lock().unwrap();
        match nonces.remove(nonce) {
            Some(issued_at) => self.clock.now().duration_since(issued_at) < self.ttl,
            None => false,
        }
    }

    pub fn purge_expired(&self) {
        let now = self.clock.now();
        let mut nonces = self.nonces.lock().unwrap();
        nonces.retain(|_, issued_at| now.duration_since(*issued_at) < self.ttl);
    }
}

/// Verify an admin request: the nonce must be live, the signature must
/// recover to `address`, and `address` must be the configured admin.
pub fn verify_admin(
    store: &ChallengeStore,
    admin_address: Option<&str>,
    address: &str,
    nonce: &str,
    signature: &str,
) -> Result<(), ApiError> {
    let admin = admin_address
        .ok_or_else(|| ApiError::Unauthorized("Admin wallet not configured".to_string()))?;

    if address.to_lowercase() != admin {
        return Err(ApiError::Unauthorized("Not the admin wallet".to_string()));
    }

    if !store.consume(nonce) {
        return Err(ApiError::Unauthorized("Unknown or expired challenge".to_string()));
    }

    let signer: Address = address
        .parse()
        .map_err(|_| ApiError::Validation(format!("Invalid address: {}", address)))?;
    let signature: Signature = signature
        .parse()
        .map_err(|_| ApiError::Unauthorized("Malformed signature".to_string()))?;

    signature
        .verify(challenge_message(nonce), signer)
        .map_err(|_| ApiError::Unauthorized("Signature does not match admin wallet".to_string()))
}
