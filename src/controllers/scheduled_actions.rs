//! External trigger for the agent action scheduler (cron hits this).

use actix_web::{web, HttpResponse};
use serde::Deserialize;

use crate::actions::ActionCategory;
use crate::error::ApiError;
use crate::AppState;

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource("/api/scheduled-agent-actions").route(web::post().to(run_scheduled_actions)),
    );
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ScheduledActionsRequest {
    secret_key: String,
    category: Option<ActionCategory>,
}

async fn run_scheduled_actions(
    state: web::Data<AppState>,
    body: web::Json<ScheduledActionsRequest>,
) -> Result<HttpResponse, ApiError> {
    let results = state
        .scheduler
        .run_scheduled_actions(&body.secret_key, body.category)
        .await?;

    // Batch-level success means "the batch ran to completion"; per-agent
    // outcomes carry their own success flags
    Ok(HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "results": results,
    })))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controllers::testing::{test_state, TEST_SCHEDULER_SECRET};
    use crate::models::AgentProfile;
    use actix_web::{test, App};

    #[actix_web::test]
    async fn test_bad_secret_is_401() {
        let (state, _dir) = test_state(None);
        let app = test::init_service(App::new().app_data(state.clone()).configure(config)).await;

        let resp = test::call_service(
            &app,
            test::TestRequest::post()
                .uri("/api/scheduled-agent-actions")
                .set_json(serde_json::json!({ "secretKey": "wrong" }))
                .to_request(),
        )
        .await;
        assert_eq!(resp.status(), 401);
    }

    #[actix_web::test]
    async fn test_batch_reports_per_agent_results() {
        let (state, _dir) = test_state(None);
        state
            .db
            .insert_agent_profile(&AgentProfile::empty("ada", "Ada", None))
            .unwrap();
        let app = test::init_service(App::new().app_data(state.clone()).configure(config)).await;

        let body: serde_json::Value = test::call_and_read_body_json(
            &app,
            test::TestRequest::post()
                .uri("/api/scheduled-agent-actions")
                .set_json(serde_json::json!({ "secretKey": TEST_SCHEDULER_SECRET }))
                .to_request(),
        )
        .await;

        assert_eq!(body["success"], true);
        let results = body["results"].as_array().unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0]["handle"], "ada");
        assert_eq!(results[0]["success"], true);
        assert_eq!(
            state.db.list_action_events_for_handle("ada", 10).unwrap().len(),
            1
        );
    }

    #[actix_web::test]
    async fn test_category_filter_is_accepted() {
        let (state, _dir) = test_state(None);
        state
            .db
            .insert_agent_profile(&AgentProfile::empty("ada", "Ada", None))
            .unwrap();
        let app = test::init_service(App::new().app_data(state.clone()).configure(config)).await;

        let body: serde_json::Value = test::call_and_read_body_json(
            &app,
            test::TestRequest::post()
                .uri("/api/scheduled-agent-actions")
                .set_json(serde_json::json!({
                    "secretKey": TEST_SCHEDULER_SECRET,
                    "category": "reflection",
                }))
                .to_request(),
        )
        .await;

        assert_eq!(body["results"][0]["success"], true);
        // Reflection actions never produce tweets
        assert_eq!(state.db.count_tweets_for_handle("ada").unwrap(), 0);
    }
}
