//! Persona ingestion.
//!
//! One-shot pipeline that turns a Twitter handle into an AgentProfile:
//! fetch profile + timeline, provision and fund a custodial wallet, derive
//! the narrative fields generatively, persist. Every step short-circuits if
//! already done, so a failed run is retried by simply invoking it again -
//! there is no compensating rollback.

use std::sync::Arc;

use crate::actions::persona_system_prompt;
use crate::ai::TextGenerator;
use crate::alerts::AlertNotifier;
use crate::chain::{BalanceCache, WalletProvisioner, PLACEHOLDER_PERMIT_SIGNATURE};
use crate::db::Database;
use crate::error::ApiError;
use crate::models::AgentProfile;
use crate::twitter::{TimelineEntry, TwitterData};

/// How many saved timeline entries feed the derivation prompts
const DERIVATION_TIMELINE_LIMIT: usize = 50;

/// Character-supplied creation input, the non-Twitter path
#[derive(Debug, Clone)]
pub struct CharacterSeed {
    pub handle: String,
    pub display_name: String,
    pub bio: Option<String>,
    pub system_prompt: Option<String>,
    pub life_goals: Option<String>,
    pub skills: Option<String>,
    pub life_context: Option<String>,
}

pub struct PersonaIngestion {
    db: Arc<Database>,
    twitter: Arc<dyn TwitterData>,
    generator: Arc<dyn TextGenerator>,
    wallets: Arc<dyn WalletProvisioner>,
    alerts: Arc<AlertNotifier>,
    balances: Arc<BalanceCache>,
}

impl PersonaIngestion {
    pub fn new(
        db: Arc<Database>,
        twitter: Arc<dyn TwitterData>,
        generator: Arc<dyn TextGenerator>,
        wallets: Arc<dyn WalletProvisioner>,
        alerts: Arc<AlertNotifier>,
        balances: Arc<BalanceCache>,
    ) -> Self {
        Self {
            db,
            twitter,
            generator,
            wallets,
            alerts,
            balances,
        }
    }

    /// Create an agent from a Twitter handle. Returns the existing profile
    /// immediately when one is already persisted.
    pub async fn create_agent_from_handle(&self, handle: &str) -> Result<AgentProfile, ApiError> {
        if let Some(existing) = self.db.get_agent_profile(handle)? {
            log::info!("Agent '{}' already exists, skipping ingestion", handle);
            return Ok(existing);
        }

        // External profile; an unknown user is a 404, not a provider fault
        let twitter_profile = self.twitter.fetch_profile(handle).await?;

        let timeline = self.load_or_fetch_timeline(handle).await?;

        self.ensure_funded_wallet(handle).await?;

        // All three narratives are written together in the profile row, so
        // join rather than race
        let profile_summary = summarize_profile(&twitter_profile.display_name, &twitter_profile.bio);
        let timeline_text = summarize_timeline(&timeline);
        let (life_goals, skills, life_context) = tokio::try_join!(
            self.derive(
                &profile_summary,
                &timeline_text,
                "List this person's apparent life goals, as a short first-person paragraph."
            ),
            self.derive(
                &profile_summary,
                &timeline_text,
                "Describe this person's skills and expertise, as a short first-person paragraph."
            ),
            self.derive(
                &profile_summary,
                &timeline_text,
                "Describe this person's life context and daily circumstances, as a short first-person paragraph."
            ),
        )?;

        let mut profile = AgentProfile::empty(&twitter_profile.handle, &twitter_profile.display_name, None);
        profile.bio = twitter_profile.bio.clone();
        profile.profile_picture_url = twitter_profile.profile_picture_url.clone();
        profile.cover_picture_url = twitter_profile.cover_picture_url.clone();
        profile.life_goals = Some(life_goals);
        profile.skills = Some(skills);
        profile.life_context = Some(life_context);
        profile.system_prompt = Some(persona_system_prompt(&profile));

        self.persist_and_reread(profile).await
    }

    /// Create an agent from supplied character fields. Same canonical
    /// creation semantics, minus the external fetches and derivation.
    pub async fn create_agent_from_character(
        &self,
        seed: CharacterSeed,
    ) -> Result<AgentProfile, ApiError> {
        if let Some(existing) = self.db.get_agent_profile(&seed.handle)? {
            log::info!("Agent '{}' already exists, skipping creation", seed.handle);
            return Ok(existing);
        }

        self.ensure_funded_wallet(&seed.handle).await?;

        let mut profile = AgentProfile::empty(&seed.handle, &seed.display_name, None);
        profile.bio = seed.bio;
        profile.life_goals = seed.life_goals;
        profile.skills = seed.skills;
        profile.life_context = seed.life_context;
        profile.system_prompt = seed
            .system_prompt
            .or_else(|| Some(persona_system_prompt(&profile)));

        self.persist_and_reread(profile).await
    }

    /// Reuse previously saved timeline entries when present; otherwise
    /// fetch and persist them. An account with no content cannot seed a
    /// persona.
    async fn load_or_fetch_timeline(&self, handle: &str) -> Result<Vec<TimelineEntry>, ApiError> {
        let saved = self.db.list_saved_tweets(handle, DERIVATION_TIMELINE_LIMIT)?;
        if !saved.is_empty() {
            log::info!("Reusing {} saved timeline entries for '{}'", saved.len(), handle);
            return Ok(saved
                .into_iter()
                .map(|s| TimelineEntry {
                    external_id: s.external_tweet_id,
                    content: s.content,
                    posted_at: s.posted_at,
                })
                .collect());
        }

        let fetched = self.twitter.fetch_timeline(handle).await?;
        if fetched.is_empty() {
            return Err(ApiError::ExternalService(format!(
                "No timeline content available for '{}'",
                handle
            )));
        }

        let rows: Vec<(String, String, Option<String>)> = fetched
            .iter()
            .map(|t| (t.external_id.clone(), t.content.clone(), t.posted_at.clone()))
            .collect();
        let saved_count = self.db.save_timeline_entries(handle, &rows)?;
        log::info!("Saved {} timeline entries for '{}'", saved_count, handle);

        Ok(fetched)
    }

    /// Ensure a wallet row exists and has received its one-time funding.
    /// Not best-effort: a persona without a wallet is invalid. The funding
    /// tx hash is persisted on the wallet row, so a run that failed at
    /// this step is completed by the retry, and a recorded hash is never
    /// funded twice.
    async fn ensure_funded_wallet(&self, handle: &str) -> Result<(), ApiError> {
        let wallet = match self.db.get_wallet(handle)? {
            Some(wallet) => wallet,
            None => {
                let generated = match self.wallets.generate() {
                    Ok(g) => g,
                    Err(e) => {
                        self.alerts
                            .notify_error(
                                &format!("Wallet provisioning failed for {}", handle),
                                &e.to_string(),
                            )
                            .await;
                        return Err(e);
                    }
                };
                let (wallet, _) = self.db.insert_wallet_if_absent(
                    handle,
                    &generated.address,
                    &generated.private_key,
                    PLACEHOLDER_PERMIT_SIGNATURE,
                )?;
                wallet
            }
        };

        if wallet.funding_tx_hash.is_none() {
            match self.wallets.fund(&wallet.address).await {
                Ok(Some(tx_hash)) => {
                    log::info!("Funded wallet for '{}' (tx: {})", handle, tx_hash);
                    self.db.set_wallet_funding_tx(handle, &tx_hash)?;
                    self.balances.invalidate(handle);
                }
                // No chain/deployer configured; leave the hash absent so a
                // configured deployment can fund later
                Ok(None) => {}
                Err(e) => {
                    self.alerts
                        .notify_error(&format!("Wallet funding failed for {}", handle), &e.to_string())
                        .await;
                    return Err(e);
                }
            }
        }

        Ok(())
    }

    async fn derive(
        &self,
        profile_summary: &str,
        timeline_text: &str,
        instruction: &str,
    ) -> Result<String, ApiError> {
        let system = "You analyze a person's public posts and distill persona traits. \
                      Answer with the requested text only, no preamble.";
        let prompt = format!(
            "{}\n\nProfile:\n{}\n\nRecent posts:\n{}",
            instruction, profile_summary, timeline_text
        );
        self.generator.generate(system, &prompt).await
    }

    /// Insert, treating a uniqueness conflict as "a concurrent ingestion
    /// won" - then re-read so the caller sees exactly what is persisted.
    async fn persist_and_reread(&self, profile: AgentProfile) -> Result<AgentProfile, ApiError> {
        let handle = profile.handle.clone();
        if let Err(e) = self.db.insert_agent_profile(&profile) {
            let conflicted = matches!(
                &e,
                rusqlite::Error::SqliteFailure(info, _)
                    if info.code == rusqlite::ErrorCode::ConstraintViolation
            );
            if !conflicted {
                return Err(e.into());
            }
            log::info!("Profile insert for '{}' lost a race, returning existing row", handle);
        }

        self.db.get_agent_profile(&handle)?.ok_or_else(|| {
            ApiError::Persistence(format!("Profile for '{}' missing after insert", handle))
        })
    }
}

fn summarize_profile(display_name: &str, bio: &Option<String>) -> String {
    match bio.as_deref().filter(|s| !s.is_empty()) {
        Some(bio) => format!("{} - {}", display_name, bio),
        None => display_name.to_string(),
    }
}

fn summarize_timeline(entries: &[TimelineEntry]) -> String {
    entries
        .iter()
        .map(|e| format!("- {}", e.content))
        .collect::<Vec<_>>()
        .join("\n")
}
