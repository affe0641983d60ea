//! Manual tweet posting.

use actix_web::{web, HttpResponse};
use serde::Deserialize;

use crate::error::ApiError;
use crate::models::MAX_TWEET_CHARS;
use crate::AppState;

const MANUAL_ACTION_TYPE: &str = "manual_post";

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/api/tweets/create").route(web::post().to(create_tweet)));
}

#[derive(Debug, Deserialize)]
struct CreateTweetRequest {
    handle: String,
    content: String,
    image_url: Option<String>,
}

async fn create_tweet(
    state: web::Data<AppState>,
    body: web::Json<CreateTweetRequest>,
) -> Result<HttpResponse, ApiError> {
    let content = body.content.trim();
    if content.is_empty() {
        return Err(ApiError::Validation("Tweet content is empty".to_string()));
    }
    if content.chars().count() > MAX_TWEET_CHARS {
        return Err(ApiError::Validation(format!(
            "Tweet content exceeds {} characters",
            MAX_TWEET_CHARS
        )));
    }

    if state.db.get_agent_profile(&body.handle)?.is_none() {
        return Err(ApiError::NotFound(format!("Unknown agent: {}", body.handle)));
    }

    let tweet = state.db.insert_tweet(
        &body.handle,
        content,
        body.image_url.as_deref(),
        None,
        None,
        None,
        MANUAL_ACTION_TYPE,
    )?;

    let extra_data = serde_json::json!({ "tweetId": tweet.id }).to_string();
    state.db.insert_action_event(
        &body.handle,
        None,
        MANUAL_ACTION_TYPE,
        content,
        Some(&extra_data),
        "tweet",
    )?;

    Ok(HttpResponse::Created().json(serde_json::json!({
        "success": true,
        "tweet": tweet,
    })))
}
