//! Scheduled agent action runner.
//!
//! One batch pass: for each active agent, pick one action from the catalog,
//! execute it, and record an event. Agents run strictly sequentially with a
//! fixed pause between them so the generation provider is not hammered. A
//! failing agent is recorded and skipped; it never aborts the batch.

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;

use crate::actions::{pick_action, ActionCategory, ActionExecutor, ActionKind};
use crate::alerts::AlertNotifier;
use crate::db::Database;
use crate::error::ApiError;
use crate::models::AgentProfile;

/// Ceiling on agents processed per batch
pub const BATCH_LIMIT: usize = 50;

/// Pause between consecutive agents
pub const AGENT_DELAY: Duration = Duration::from_secs(1);

#[derive(Clone)]
pub struct SchedulerConfig {
    pub batch_limit: usize,
    pub agent_delay: Duration,
    /// Shared secret the caller must present. None rejects every run.
    pub secret_key: Option<String>,
}

impl SchedulerConfig {
    pub fn new(secret_key: Option<String>) -> Self {
        Self {
            batch_limit: BATCH_LIMIT,
            agent_delay: AGENT_DELAY,
            secret_key,
        }
    }
}

/// Per-agent outcome of a batch run
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentActionResult {
    pub handle: String,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub action: Option<ActionKind>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

pub struct ActionScheduler {
    db: Arc<Database>,
    executor: Arc<dyn ActionExecutor>,
    alerts: Arc<AlertNotifier>,
    config: SchedulerConfig,
}

impl ActionScheduler {
    pub fn new(
        db: Arc<Database>,
        executor: Arc<dyn ActionExecutor>,
        alerts: Arc<AlertNotifier>,
        config: SchedulerConfig,
    ) -> Self {
        Self {
            db,
            executor,
            alerts,
            config,
        }
    }

    /// Run one batch. The secret is checked before any work; a bad or
    /// missing key does not touch the database.
    pub async fn run_scheduled_actions(
        &self,
        secret_key: &str,
        category: Option<ActionCategory>,
    ) -> Result<Vec<AgentActionResult>, ApiError> {
        match self.config.secret_key.as_deref() {
            Some(expected) if expected == secret_key => {}
            _ => return Err(ApiError::Unauthorized("Invalid scheduler key".to_string())),
        }

        let profiles = self.db.list_active_agent_profiles(self.config.batch_limit)?;
        if profiles.is_empty() {
            log::info!("Scheduled actions: no active agents");
            return Ok(Vec::new());
        }

        log::info!("Scheduled actions: running {} agents", profiles.len());
        let mut results = Vec::with_capacity(profiles.len());

        for (i, profile) in profiles.iter().enumerate() {
            if i > 0 && !self.config.agent_delay.is_zero() {
                tokio::time::sleep(self.config.agent_delay).await;
            }
            results.push(self.run_one(profile, category).await);
        }

        self.alerts.notify(&batch_summary(&results)).await;
        Ok(results)
    }

    async fn run_one(
        &self,
        profile: &AgentProfile,
        category: Option<ActionCategory>,
    ) -> AgentActionResult {
        let action = match pick_action(category) {
            Some(a) => a,
            None => {
                return AgentActionResult {
                    handle: profile.handle.clone(),
                    success: false,
                    action: None,
                    error: Some("No eligible action for category".to_string()),
                }
            }
        };

        match self.executor.execute(profile, action).await {
            Ok(outcome) => {
                let extra_data = outcome
                    .tweet
                    .as_ref()
                    .map(|t| serde_json::json!({ "tweetId": t.id }).to_string());
                let event = self.db.insert_action_event(
                    &profile.handle,
                    None,
                    &action.to_string(),
                    &outcome.output,
                    extra_data.as_deref(),
                    action.top_level_type(),
                );
                match event {
                    Ok(_) => AgentActionResult {
                        handle: profile.handle.clone(),
                        success: true,
                        action: Some(action),
                        error: None,
                    },
                    Err(e) => self.failed(profile, Some(action), ApiError::from(e)),
                }
            }
            Err(e) => self.failed(profile, Some(action), e),
        }
    }

    fn failed(
        &self,
        profile: &AgentProfile,
        action: Option<ActionKind>,
        error: ApiError,
    ) -> AgentActionResult {
        log::error!("Scheduled action failed for '{}': {}", profile.handle, error);
        self.alerts.notify_error_background(
            &format!("Scheduled action failed for {}", profile.handle),
            &error.to_string(),
        );
        AgentActionResult {
            handle: profile.handle.clone(),
            success: false,
            action,
            error: Some(error.to_string()),
        }
    }
}

/// Operator-facing one-liner posted to the alert channel after each batch
fn batch_summary(results: &[AgentActionResult]) -> String {
    let failed: Vec<&str> = results
        .iter()
        .filter(|r| !r.success)
        .map(|r| r.handle.as_str())
        .collect();
    if failed.is_empty() {
        format!("Scheduled actions batch: {} agents, all succeeded", results.len())
    } else {
        format!(
            "Scheduled actions batch: {} agents, {} failed ({})",
            results.len(),
            failed.len(),
            failed.join(", ")
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actions::ActionOutcome;
    use async_trait::async_trait;

    struct StubExecutor {
        fail_for: Option<String>,
    }

    #[async_trait]
    impl ActionExecutor for StubExecutor {
        async fn execute(
            &self,
            profile: &AgentProfile,
            action: ActionKind,
        ) -> Result<ActionOutcome, ApiError> {
            if self.fail_for.as_deref() == Some(profile.handle.as_str()) {
                return Err(ApiError::ExternalService("generation blew up".to_string()));
            }
            Ok(ActionOutcome {
                action,
                output: format!("output for {}", profile.handle),
                tweet: None,
            })
        }
    }

    fn scheduler_with(
        db: Arc<Database>,
        fail_for: Option<&str>,
        secret: &str,
    ) -> ActionScheduler {
        let mut config = SchedulerConfig::new(Some(secret.to_string()));
        config.agent_delay = Duration::ZERO;
        ActionScheduler::new(
            db,
            Arc::new(StubExecutor {
                fail_for: fail_for.map(|s| s.to_string()),
            }),
            Arc::new(AlertNotifier::new(None, None)),
            config,
        )
    }

    fn seed_agents(db: &Database, handles: &[&str]) {
        for handle in handles {
            let profile = AgentProfile::empty(handle, handle, None);
            db.insert_agent_profile(&profile).unwrap();
        }
    }

    fn test_db() -> (Arc<Database>, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let db = Arc::new(Database::new(dir.path().join("test.db").to_str().unwrap()).unwrap());
        (db, dir)
    }

    #[tokio::test]
    async fn test_bad_secret_rejected_before_any_work() {
        let (db, _dir) = test_db();
        seed_agents(&db, &["alice"]);
        let scheduler = scheduler_with(db.clone(), None, "right-key");

        let err = scheduler
            .run_scheduled_actions("wrong-key", None)
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Unauthorized(_)));
        assert!(db.list_action_events_for_handle("alice", 10).unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_unconfigured_secret_rejects_everything() {
        let (db, _dir) = test_db();
        let mut config = SchedulerConfig::new(None);
        config.agent_delay = Duration::ZERO;
        let scheduler = ActionScheduler::new(
            db,
            Arc::new(StubExecutor { fail_for: None }),
            Arc::new(AlertNotifier::new(None, None)),
            config,
        );

        let err = scheduler.run_scheduled_actions("", None).await.unwrap_err();
        assert!(matches!(err, ApiError::Unauthorized(_)));
    }

    #[tokio::test]
    async fn test_empty_agent_set_yields_empty_results() {
        let (db, _dir) = test_db();
        let scheduler = scheduler_with(db, None, "key");
        let results = scheduler.run_scheduled_actions("key", None).await.unwrap();
        assert!(results.is_empty());
    }

    #[tokio::test]
    async fn test_one_failing_agent_does_not_abort_batch() {
        let (db, _dir) = test_db();
        seed_agents(&db, &["alice", "bob", "carol"]);
        let scheduler = scheduler_with(db.clone(), Some("bob"), "key");

        let results = scheduler.run_scheduled_actions("key", None).await.unwrap();

        assert_eq!(results.len(), 3);
        let bob = results.iter().find(|r| r.handle == "bob").unwrap();
        assert!(!bob.success);
        assert!(bob.error.as_deref().unwrap().contains("generation blew up"));
        for r in results.iter().filter(|r| r.handle != "bob") {
            assert!(r.success, "{} should have succeeded", r.handle);
            assert!(r.action.is_some());
        }

        // Events recorded only for the successful agents
        assert_eq!(db.list_action_events_for_handle("alice", 10).unwrap().len(), 1);
        assert!(db.list_action_events_for_handle("bob", 10).unwrap().is_empty());
    }

    #[test]
    fn test_batch_summary_names_failed_agents() {
        let results = vec![
            AgentActionResult {
                handle: "alice".to_string(),
                success: true,
                action: Some(ActionKind::PostUpdate),
                error: None,
            },
            AgentActionResult {
                handle: "bob".to_string(),
                success: false,
                action: Some(ActionKind::PostUpdate),
                error: Some("boom".to_string()),
            },
        ];

        let summary = batch_summary(&results);
        assert!(summary.contains("2 agents"));
        assert!(summary.contains("1 failed"));
        assert!(summary.contains("bob"));
        assert!(!summary.contains("alice"));

        let all_ok = batch_summary(&results[..1]);
        assert!(all_ok.contains("all succeeded"));
    }

    #[tokio::test]
    async fn test_inactive_agents_are_skipped() {
        let (db, _dir) = test_db();
        seed_agents(&db, &["alice", "bob"]);
        db.set_agent_active("bob", false).unwrap();
        let scheduler = scheduler_with(db, None, "key");

        let results = scheduler.run_scheduled_actions("key", None).await.unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].handle, "alice");
    }
}
