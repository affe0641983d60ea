//! Chat responder.
//!
//! Stateless: one prompt in, one persona-voiced reply out. Multi-turn
//! memory, if wanted, is the caller's job to thread through the prompt.

use std::sync::Arc;

use crate::actions::persona_system_prompt;
use crate::ai::TextGenerator;
use crate::db::Database;
use crate::error::ApiError;

pub struct ChatResponder {
    db: Arc<Database>,
    generator: Arc<dyn TextGenerator>,
}

impl ChatResponder {
    pub fn new(db: Arc<Database>, generator: Arc<dyn TextGenerator>) -> Self {
        Self { db, generator }
    }

    /// Reply to `prompt` in the voice of `handle`'s persona
    pub async fn generate_response(&self, handle: &str, prompt: &str) -> Result<String, ApiError> {
        let profile = self
            .db
            .get_agent_profile(handle)?
            .ok_or_else(|| ApiError::NotFound(format!("Unknown agent: {}", handle)))?;

        let system = persona_system_prompt(&profile);
        self.generator.generate(&system, prompt).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::AgentProfile;
    use async_trait::async_trait;
    use std::sync::Mutex;

    struct EchoGenerator {
        last_system: Mutex<Option<String>>,
    }

    #[async_trait]
    impl TextGenerator for EchoGenerator {
        async fn generate(&self, system: &str, prompt: &str) -> Result<String, ApiError> {
            *self.last_system.lock().unwrap() = Some(system.to_string());
            Ok(format!("reply to: {}", prompt))
        }
    }

    fn test_db() -> (Arc<Database>, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let db = Arc::new(Database::new(dir.path().join("test.db").to_str().unwrap()).unwrap());
        (db, dir)
    }

    #[tokio::test]
    async fn test_unknown_handle_is_not_found() {
        let (db, _dir) = test_db();
        let responder = ChatResponder::new(
            db,
            Arc::new(EchoGenerator {
                last_system: Mutex::new(None),
            }),
        );

        let err = responder.generate_response("ghost", "hi").await.unwrap_err();
        assert!(matches!(err, ApiError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_reply_uses_persona_system_prompt() {
        let (db, _dir) = test_db();
        let mut profile = AgentProfile::empty("ada", "Ada", None);
        profile.system_prompt = Some("You are Ada.".to_string());
        db.insert_agent_profile(&profile).unwrap();

        let generator = Arc::new(EchoGenerator {
            last_system: Mutex::new(None),
        });
        let responder = ChatResponder::new(db, generator.clone());

        let reply = responder.generate_response("ada", "hello").await.unwrap();
        assert_eq!(reply, "reply to: hello");
        assert_eq!(
            generator.last_system.lock().unwrap().as_deref(),
            Some("You are Ada.")
        );
    }
}
