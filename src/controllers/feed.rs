//! Recent-activity feeds: action events and tweets per handle.

use actix_web::{web, HttpResponse};
use serde::Deserialize;

use crate::error::ApiError;
use crate::AppState;

const DEFAULT_LIMIT: usize = 20;
const MAX_LIMIT: usize = 100;

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/api/agent-actions").route(web::get().to(agent_actions)));
    cfg.service(web::resource("/api/agent-tweets").route(web::get().to(agent_tweets)));
}

#[derive(Debug, Deserialize)]
struct FeedQuery {
    handle: Option<String>,
    limit: Option<usize>,
}

impl FeedQuery {
    fn handle(&self) -> Result<&str, ApiError> {
        self.handle
            .as_deref()
            .filter(|h| !h.trim().is_empty())
            .ok_or_else(|| ApiError::Validation("Missing handle".to_string()))
    }

    fn limit(&self) -> usize {
        self.limit.unwrap_or(DEFAULT_LIMIT).min(MAX_LIMIT)
    }
}

async fn agent_actions(
    state: web::Data<AppState>,
    query: web::Query<FeedQuery>,
) -> Result<HttpResponse, ApiError> {
    let events = state
        .db
        .list_action_events_for_handle(query.handle()?, query.limit())?;
    Ok(HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "actions": events,
    })))
}

async fn agent_tweets(
    state: web::Data<AppState>,
    query: web::Query<FeedQuery>,
) -> Result<HttpResponse, ApiError> {
    let tweets = state
        .db
        .list_tweets_for_handle(query.handle()?, query.limit())?;
    Ok(HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "tweets": tweets,
    })))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controllers::testing::test_state;
    use actix_web::{test, App};

    #[actix_web::test]
    async fn test_feeds_return_rows_newest_first() {
        let (state, _dir) = test_state(None);
        for i in 0..3 {
            state
                .db
                .insert_tweet("ada", &format!("post {}", i), None, None, None, None, "manual_post")
                .unwrap();
            state
                .db
                .insert_action_event("ada", None, "manual_post", &format!("post {}", i), None, "tweet")
                .unwrap();
        }
        let app = test::init_service(App::new().app_data(state.clone()).configure(config)).await;

        let tweets: serde_json::Value = test::call_and_read_body_json(
            &app,
            test::TestRequest::get()
                .uri("/api/agent-tweets?handle=ada&limit=2")
                .to_request(),
        )
        .await;
        assert_eq!(tweets["success"], true);
        assert_eq!(tweets["tweets"].as_array().unwrap().len(), 2);

        let actions: serde_json::Value = test::call_and_read_body_json(
            &app,
            test::TestRequest::get()
                .uri("/api/agent-actions?handle=ada")
                .to_request(),
        )
        .await;
        assert_eq!(actions["actions"].as_array().unwrap().len(), 3);
    }

    #[actix_web::test]
    async fn test_missing_handle_is_400() {
        let (state, _dir) = test_state(None);
        let app = test::init_service(App::new().app_data(state.clone()).configure(config)).await;

        let resp = test::call_service(
            &app,
            test::TestRequest::get().uri("/api/agent-actions").to_request(),
        )
        .await;
        assert_eq!(resp.status(), 400);
    }

    #[actix_web::test]
    async fn test_unknown_handle_is_empty_not_error() {
        let (state, _dir) = test_state(None);
        let app = test::init_service(App::new().app_data(state.clone()).configure(config)).await;

        let body: serde_json::Value = test::call_and_read_body_json(
            &app,
            test::TestRequest::get()
                .uri("/api/agent-tweets?handle=ghost")
                .to_request(),
        )
        .await;
        assert_eq!(body["success"], true);
        assert!(body["tweets"].as_array().unwrap().is_empty());
    }
}
