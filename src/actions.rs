//! Agent action catalog and executor.
//!
//! The catalog is a closed enum: every action the scheduler can pick is a
//! variant here, with its category, prompt, and whether its output is
//! persisted as a tweet. Selection is uniform random over the eligible
//! variants.

use std::sync::Arc;

use async_trait::async_trait;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString, IntoEnumIterator};

use crate::ai::TextGenerator;
use crate::db::Database;
use crate::error::ApiError;
use crate::models::{AgentProfile, Tweet, MAX_TWEET_CHARS};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ActionCategory {
    Social,
    Creative,
    Reflection,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumIter, EnumString,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    PostUpdate,
    ShareHotTake,
    ShareLifeAdvice,
    ReflectOnGoals,
    PlanNextMove,
}

impl ActionKind {
    pub fn category(&self) -> ActionCategory {
        match self {
            ActionKind::PostUpdate | ActionKind::ShareHotTake => ActionCategory::Social,
            ActionKind::ShareLifeAdvice => ActionCategory::Creative,
            ActionKind::ReflectOnGoals | ActionKind::PlanNextMove => ActionCategory::Reflection,
        }
    }

    /// Whether the generated output is also persisted as a tweet
    pub fn saves_as_tweet(&self) -> bool {
        match self {
            ActionKind::PostUpdate | ActionKind::ShareHotTake | ActionKind::ShareLifeAdvice => true,
            ActionKind::ReflectOnGoals | ActionKind::PlanNextMove => false,
        }
    }

    /// Feed grouping for the recorded event
    pub fn top_level_type(&self) -> &'static str {
        if self.saves_as_tweet() {
            "tweet"
        } else {
            "thought"
        }
    }

    fn prompt(&self) -> &'static str {
        match self {
            ActionKind::PostUpdate => {
                "Write a short post about what you are up to right now. Stay in character."
            }
            ActionKind::ShareHotTake => {
                "Share a spicy but good-natured opinion about your field. Keep it under 280 characters."
            }
            ActionKind::ShareLifeAdvice => {
                "Share one piece of life advice drawn from your experience. Keep it under 280 characters."
            }
            ActionKind::ReflectOnGoals => {
                "Reflect briefly on your life goals and how today moved you toward or away from them."
            }
            ActionKind::PlanNextMove => {
                "Describe, in a few sentences, the next concrete thing you plan to do and why."
            }
        }
    }
}

/// Uniform random pick over the catalog, optionally restricted to one
/// category. None only when the filter matches nothing.
pub fn pick_action(category: Option<ActionCategory>) -> Option<ActionKind> {
    let eligible: Vec<ActionKind> = ActionKind::iter()
        .filter(|a| category.map_or(true, |c| a.category() == c))
        .collect();
    eligible.choose(&mut rand::thread_rng()).copied()
}

/// System prompt for generating in a persona's voice. Prefers the stored
/// prompt, otherwise composes one from the profile fields.
pub fn persona_system_prompt(profile: &AgentProfile) -> String {
    if let Some(prompt) = profile.system_prompt.as_deref().filter(|s| !s.is_empty()) {
        return prompt.to_string();
    }

    let mut parts = vec![format!(
        "You are {}, an autonomous agent posting on a social platform.",
        profile.display_name
    )];
    if let Some(bio) = profile.bio.as_deref().filter(|s| !s.is_empty()) {
        parts.push(format!("Bio: {}", bio));
    }
    if let Some(goals) = profile.life_goals.as_deref().filter(|s| !s.is_empty()) {
        parts.push(format!("Life goals: {}", goals));
    }
    if let Some(skills) = profile.skills.as_deref().filter(|s| !s.is_empty()) {
        parts.push(format!("Skills: {}", skills));
    }
    if let Some(context) = profile.life_context.as_deref().filter(|s| !s.is_empty()) {
        parts.push(format!("Life context: {}", context));
    }
    parts.push("Write in first person. Never mention being an AI.".to_string());
    parts.join("\n")
}

/// What executing one action produced
pub struct ActionOutcome {
    pub action: ActionKind,
    pub output: String,
    pub tweet: Option<Tweet>,
}

/// Seam over action execution so the scheduler is testable without a
/// generation provider.
#[async_trait]
pub trait ActionExecutor: Send + Sync {
    async fn execute(
        &self,
        profile: &AgentProfile,
        action: ActionKind,
    ) -> Result<ActionOutcome, ApiError>;
}

pub struct GenerativeActionExecutor {
    db: Arc<Database>,
    generator: Arc<dyn TextGenerator>,
}

impl GenerativeActionExecutor {
    pub fn new(db: Arc<Database>, generator: Arc<dyn TextGenerator>) -> Self {
        Self { db, generator }
    }
}

#[async_trait]
impl ActionExecutor for GenerativeActionExecutor {
    async fn execute(
        &self,
        profile: &AgentProfile,
        action: ActionKind,
    ) -> Result<ActionOutcome, ApiError> {
        let system = persona_system_prompt(profile);
        let output = self.generator.generate(&system, action.prompt()).await?;

        let tweet = if action.saves_as_tweet() {
            let content = truncate_to_tweet(&output);
            let action_type = action.to_string();
            let tweet = self.db.insert_tweet(
                &profile.handle,
                &content,
                None,
                None,
                None,
                None,
                &action_type,
            )?;
            Some(tweet)
        } else {
            None
        };

        Ok(ActionOutcome {
            action,
            output,
            tweet,
        })
    }
}

fn truncate_to_tweet(text: &str) -> String {
    if text.chars().count() <= MAX_TWEET_CHARS {
        text.to_string()
    } else {
        text.chars().take(MAX_TWEET_CHARS).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    pub(crate) struct StubGenerator {
        pub responses: Mutex<Vec<String>>,
    }

    impl StubGenerator {
        pub(crate) fn returning(text: &str) -> Self {
            Self {
                responses: Mutex::new(vec![text.to_string()]),
            }
        }
    }

    #[async_trait]
    impl TextGenerator for StubGenerator {
        async fn generate(&self, _system: &str, _prompt: &str) -> Result<String, ApiError> {
            let mut responses = self.responses.lock().unwrap();
            if responses.is_empty() {
                return Err(ApiError::ExternalService("no more responses".to_string()));
            }
            Ok(responses.remove(0))
        }
    }

    fn test_db() -> (Arc<Database>, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let db = Arc::new(Database::new(dir.path().join("test.db").to_str().unwrap()).unwrap());
        (db, dir)
    }

    #[test]
    fn test_every_action_has_a_prompt() {
        for action in ActionKind::iter() {
            assert!(!action.prompt().is_empty(), "{} has no prompt", action);
        }
    }

    #[test]
    fn test_pick_action_respects_category_filter() {
        for _ in 0..20 {
            let action = pick_action(Some(ActionCategory::Reflection)).unwrap();
            assert_eq!(action.category(), ActionCategory::Reflection);
        }
    }

    #[test]
    fn test_pick_action_unfiltered_always_returns() {
        assert!(pick_action(None).is_some());
    }

    #[test]
    fn test_action_kind_string_roundtrip() {
        assert_eq!(ActionKind::PostUpdate.to_string(), "post_update");
        assert_eq!(
            "share_hot_take".parse::<ActionKind>().unwrap(),
            ActionKind::ShareHotTake
        );
    }

    #[test]
    fn test_system_prompt_prefers_stored_prompt() {
        let mut profile = AgentProfile::empty("ada", "Ada", None);
        profile.system_prompt = Some("You are Ada.".to_string());
        assert_eq!(persona_system_prompt(&profile), "You are Ada.");
    }

    #[test]
    fn test_system_prompt_composed_from_fields() {
        let mut profile = AgentProfile::empty("ada", "Ada", None);
        profile.bio = Some("mathematician".to_string());
        profile.life_goals = Some("write the first program".to_string());
        let prompt = persona_system_prompt(&profile);
        assert!(prompt.contains("You are Ada"));
        assert!(prompt.contains("mathematician"));
        assert!(prompt.contains("write the first program"));
    }

    #[tokio::test]
    async fn test_execute_tweet_action_persists_tweet() {
        let (db, _dir) = test_db();
        let generator = Arc::new(StubGenerator::returning("hello world"));
        let executor = GenerativeActionExecutor::new(db.clone(), generator);
        let profile = AgentProfile::empty("ada", "Ada", None);

        let outcome = executor
            .execute(&profile, ActionKind::PostUpdate)
            .await
            .unwrap();

        assert_eq!(outcome.output, "hello world");
        let tweet = outcome.tweet.unwrap();
        assert_eq!(tweet.content, "hello world");
        assert_eq!(tweet.action_type, "post_update");
        assert_eq!(db.count_tweets_for_handle("ada").unwrap(), 1);
    }

    #[tokio::test]
    async fn test_execute_thought_action_writes_no_tweet() {
        let (db, _dir) = test_db();
        let generator = Arc::new(StubGenerator::returning("thinking..."));
        let executor = GenerativeActionExecutor::new(db.clone(), generator);
        let profile = AgentProfile::empty("ada", "Ada", None);

        let outcome = executor
            .execute(&profile, ActionKind::ReflectOnGoals)
            .await
            .unwrap();

        assert!(outcome.tweet.is_none());
        assert_eq!(db.count_tweets_for_handle("ada").unwrap(), 0);
    }

    #[tokio::test]
    async fn test_long_output_truncated_to_tweet_length() {
        let (db, _dir) = test_db();
        let long = "x".repeat(400);
        let generator = Arc::new(StubGenerator::returning(&long));
        let executor = GenerativeActionExecutor::new(db.clone(), generator);
        let profile = AgentProfile::empty("ada", "Ada", None);

        let outcome = executor
            .execute(&profile, ActionKind::PostUpdate)
            .await
            .unwrap();

        assert_eq!(outcome.tweet.unwrap().content.chars().count(), MAX_TWEET_CHARS);
        // The recorded output keeps the full text
        assert_eq!(outcome.output.chars().count(), 400);
    }
}
