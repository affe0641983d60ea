//! Web chat surface over the chat responder.

use actix_web::{web, HttpResponse};
use serde::Deserialize;

use crate::error::ApiError;
use crate::AppState;

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/api/chat").route(web::post().to(chat)));
}

#[derive(Debug, Deserialize)]
struct ChatRequest {
    handle: String,
    message: String,
}

async fn chat(
    state: web::Data<AppState>,
    body: web::Json<ChatRequest>,
) -> Result<HttpResponse, ApiError> {
    let message = body.message.trim();
    if message.is_empty() {
        return Err(ApiError::Validation("Message is empty".to_string()));
    }

    let reply = state.chat.generate_response(&body.handle, message).await?;
    Ok(HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "reply": reply,
    })))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controllers::testing::test_state;
    use crate::models::AgentProfile;
    use actix_web::{test, App};

    #[actix_web::test]
    async fn test_chat_replies_in_persona() {
        let (state, _dir) = test_state(None);
        state
            .db
            .insert_agent_profile(&AgentProfile::empty("ada", "Ada", None))
            .unwrap();
        let app = test::init_service(App::new().app_data(state.clone()).configure(config)).await;

        let body: serde_json::Value = test::call_and_read_body_json(
            &app,
            test::TestRequest::post()
                .uri("/api/chat")
                .set_json(serde_json::json!({ "handle": "ada", "message": "hello" }))
                .to_request(),
        )
        .await;
        assert_eq!(body["success"], true);
        assert!(body["reply"].as_str().unwrap().contains("hello"));
    }

    #[actix_web::test]
    async fn test_unknown_agent_is_404() {
        let (state, _dir) = test_state(None);
        let app = test::init_service(App::new().app_data(state.clone()).configure(config)).await;

        let resp = test::call_service(
            &app,
            test::TestRequest::post()
                .uri("/api/chat")
                .set_json(serde_json::json!({ "handle": "ghost", "message": "hi" }))
                .to_request(),
        )
        .await;
        assert_eq!(resp.status(), 404);
    }

    #[actix_web::test]
    async fn test_empty_message_is_400() {
        let (state, _dir) = test_state(None);
        let app = test::init_service(App::new().app_data(state.clone()).configure(config)).await;

        let resp = test::call_service(
            &app,
            test::TestRequest::post()
                .uri("/api/chat")
                .set_json(serde_json::json!({ "handle": "ada", "message": "  " }))
                .to_request(),
        )
        .await;
        assert_eq!(resp.status(), 400);
    }
}
