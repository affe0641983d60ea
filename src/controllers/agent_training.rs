//! Agent-training dispatch endpoint.
//!
//! One route, three operations selected by the `action` field. Required
//! fields are validated per action so the caller gets a precise 400
//! instead of a generic deserialization error.

use actix_web::{web, HttpResponse};
use serde::Deserialize;

use crate::error::ApiError;
use crate::persona::CharacterSeed;
use crate::AppState;

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/api/agent-training").route(web::post().to(agent_training)));
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TrainingRequest {
    action: String,
    handle: Option<String>,
    display_name: Option<String>,
    bio: Option<String>,
    system_prompt: Option<String>,
    life_goals: Option<String>,
    skills: Option<String>,
    life_context: Option<String>,
    prompt: Option<String>,
}

fn required<'a>(field: Option<&'a str>, name: &str, action: &str) -> Result<&'a str, ApiError> {
    field
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| ApiError::Validation(format!("Missing '{}' for action '{}'", name, action)))
}

async fn agent_training(
    state: web::Data<AppState>,
    body: web::Json<TrainingRequest>,
) -> Result<HttpResponse, ApiError> {
    let request = body.into_inner();

    match request.action.as_str() {
        "createFromTwitter" => {
            let handle = required(request.handle.as_deref(), "handle", "createFromTwitter")?;
            let profile = state.persona.create_agent_from_handle(handle).await?;
            Ok(HttpResponse::Ok().json(serde_json::json!({
                "success": true,
                "profile": profile,
            })))
        }
        "createFromCharacter" => {
            let handle = required(request.handle.as_deref(), "handle", "createFromCharacter")?;
            let display_name = required(
                request.display_name.as_deref(),
                "displayName",
                "createFromCharacter",
            )?;
            let profile = state
                .persona
                .create_agent_from_character(CharacterSeed {
                    handle: handle.to_string(),
                    display_name: display_name.to_string(),
                    bio: request.bio,
                    system_prompt: request.system_prompt,
                    life_goals: request.life_goals,
                    skills: request.skills,
                    life_context: request.life_context,
                })
                .await?;
            Ok(HttpResponse::Ok().json(serde_json::json!({
                "success": true,
                "profile": profile,
            })))
        }
        "generateResponse" => {
            let handle = required(request.handle.as_deref(), "handle", "generateResponse")?;
            let prompt = required(request.prompt.as_deref(), "prompt", "generateResponse")?;
            let reply = state.chat.generate_response(handle, prompt).await?;
            Ok(HttpResponse::Ok().json(serde_json::json!({
                "success": true,
                "response": reply,
            })))
        }
        other => Err(ApiError::Validation(format!("Unknown action: {}", other))),
    }
}
