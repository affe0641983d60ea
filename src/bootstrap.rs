//! Profile bootstrap - idempotent ensure-exists for the
//! end-user -> agent-profile -> custodial-wallet chain.
//!
//! Runs when a connected wallet reaches an authenticated page for the first
//! time in a session. Each step is one read plus at most one conditional
//! write; uniqueness lives in the storage layer, so a concurrent caller
//! racing the same address converges on the same rows.

use std::sync::Arc;

use crate::chain::{WalletProvisioner, PLACEHOLDER_PERMIT_SIGNATURE};
use crate::db::Database;
use crate::error::ApiError;
use crate::models::{AgentProfile, EndUser, Wallet};

/// How many hex chars of the address feed the synthetic handle
const HANDLE_ADDRESS_CHARS: usize = 6;

/// Check for a 42-char 0x-prefixed hex address
pub fn is_valid_address(address: &str) -> bool {
    address.len() == 42
        && address.starts_with("0x")
        && address[2..].chars().all(|c| c.is_ascii_hexdigit())
}

/// Lowercase the address so it can serve as a stable key
pub fn normalize_address(address: &str) -> String {
    address.to_lowercase()
}

/// Deterministic synthetic handle for a wallet-created profile, e.g.
/// `user_a1b2c3`. Collides only when two addresses share their first six
/// hex chars; that surfaces as a conflict error, never as another
/// creator's profile.
pub fn synthesize_handle(address: &str) -> String {
    let prefix: String = address
        .chars()
        .skip(2)
        .take(HANDLE_ADDRESS_CHARS)
        .collect();
    format!("user_{}", prefix.to_lowercase())
}

/// Optional fields a caller may seed a wallet-created profile with
#[derive(Debug, Clone, Default)]
pub struct ProfileSeed {
    pub display_name: Option<String>,
    pub life_context: Option<String>,
    pub life_goals: Option<String>,
    pub skills: Option<String>,
}

/// Outcome of a full bootstrap pass
pub struct BootstrapResult {
    pub user: EndUser,
    pub user_created: bool,
    pub profile: AgentProfile,
    /// None when best-effort wallet creation failed
    pub wallet: Option<Wallet>,
}

pub struct ProfileBootstrap {
    db: Arc<Database>,
    wallets: Arc<dyn WalletProvisioner>,
}

impl ProfileBootstrap {
    pub fn new(db: Arc<Database>, wallets: Arc<dyn WalletProvisioner>) -> Self {
        Self { db, wallets }
    }

    /// Step 1: look up the end user, inserting if absent. Returns the row
    /// and whether this call created it.
    pub fn ensure_end_user(&self, address: &str) -> Result<(EndUser, bool), ApiError> {
        let address = normalize_address(address);
        let (user, created) = self.db.insert_end_user_if_absent(&address)?;
        if created {
            log::info!("Created end user {}", address);
        }
        Ok((user, created))
    }

    /// Step 2: look up the profile by creator address, synthesizing and
    /// inserting one if absent. A uniqueness violation from a concurrent
    /// call for the same address means "already exists" - re-read and
    /// return that row. A handle owned by a different creator is a
    /// conflict, not a fallback.
    pub fn ensure_agent_profile(
        &self,
        address: &str,
        seed: &ProfileSeed,
    ) -> Result<AgentProfile, ApiError> {
        let address = normalize_address(address);

        if let Some(existing) = self.db.get_agent_profile_by_creator(&address)? {
            return Ok(existing);
        }

        let handle = synthesize_handle(&address);
        let mut profile = AgentProfile::empty(
            &handle,
            seed.display_name.as_deref().unwrap_or(&handle),
            Some(&address),
        );
        profile.life_context = seed.life_context.clone();
        profile.life_goals = seed.life_goals.clone();
        profile.skills = seed.skills.clone();

        match self.db.insert_agent_profile(&profile) {
            Ok(()) => {
                log::info!("Created agent profile '{}' for {}", handle, address);
                self.db.mark_agent_created(&address)?;
                Ok(profile)
            }
            Err(e) if is_constraint_violation(&e) => {
                // A conflict on the creator address means a concurrent
                // bootstrap for the same wallet won; converge on its row.
                // A conflict on the handle alone means another creator owns
                // it, and that row is never handed to this caller.
                if let Some(theirs) = self.db.get_agent_profile_by_creator(&address)? {
                    log::info!(
                        "Profile insert for {} lost a race, re-reading existing row",
                        address
                    );
                    return Ok(theirs);
                }
                Err(ApiError::Persistence(format!(
                    "Handle '{}' is already taken by another profile",
                    handle
                )))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Step 3: ensure a custodial wallet row exists for `handle`. Returns
    /// the row and whether this call created it.
    pub fn ensure_wallet(&self, handle: &str) -> Result<(Wallet, bool), ApiError> {
        if let Some(existing) = self.db.get_wallet(handle)? {
            return Ok((existing, false));
        }

        let generated = self.wallets.generate()?;
        let (wallet, created) = self.db.insert_wallet_if_absent(
            handle,
            &generated.address,
            &generated.private_key,
            PLACEHOLDER_PERMIT_SIGNATURE,
        )?;
        if created {
            log::info!("Created custodial wallet {} for '{}'", wallet.address, handle);
        }
        Ok((wallet, created))
    }

    /// The full three-step sequence. Steps 1 and 2 propagate failures;
    /// step 3 is best-effort - the profile must stay usable without a
    /// funded wallet, so wallet failures are logged and swallowed.
    pub fn bootstrap(&self, address: &str, seed: &ProfileSeed) -> Result<BootstrapResult, ApiError> {
        let (user, user_created) = self.ensure_end_user(address)?;
        let profile = self.ensure_agent_profile(address, seed)?;

        let wallet = match self.ensure_wallet(&profile.handle) {
            Ok((wallet, _)) => Some(wallet),
            Err(e) => {
                log::error!(
                    "Best-effort wallet creation failed for '{}': {}",
                    profile.handle,
                    e
                );
                None
            }
        };

        Ok(BootstrapResult {
            user,
            user_created,
            profile,
            wallet,
        })
    }
}

fn is_constraint_violation(e: &rusqlite::Error) -> bool {
    matches!(
        e,
        rusqlite::Error::SqliteFailure(info, _)
            if info.code == rusqlite::ErrorCode::ConstraintViolation
    )
}
