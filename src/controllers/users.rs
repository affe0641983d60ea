//! Wallet-connection and profile-creation endpoints.
//!
//! `wallet-connection` is the hot path hit on every authenticated page
//! mount, so it sits behind the per-IP rate limiter and the response
//! cache: a repeat caller within the TTL gets the exact bytes of the
//! first response without touching the database.

use actix_web::{web, HttpRequest, HttpResponse};
use serde::Deserialize;

use crate::bootstrap::{is_valid_address, normalize_address, ProfileSeed};
use crate::error::ApiError;
use crate::models::WalletResponse;
use crate::AppState;

use super::{auth_token, client_ip};

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource("/api/users/wallet-connection").route(web::post().to(wallet_connection)),
    );
    cfg.service(
        web::resource("/api/users/create-agent-profile")
            .route(web::post().to(create_agent_profile)),
    );
    cfg.service(web::resource("/api/users/create").route(web::post().to(create_from_handle)));
}

#[derive(Debug, Deserialize)]
struct WalletConnectionRequest {
    address: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateAgentProfileRequest {
    address: String,
    display_name: Option<String>,
    life_context: Option<String>,
    life_goals: Option<String>,
    skills: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CreateFromHandleRequest {
    handle: String,
}

async fn wallet_connection(
    state: web::Data<AppState>,
    req: HttpRequest,
    body: web::Json<WalletConnectionRequest>,
) -> Result<HttpResponse, ApiError> {
    if !is_valid_address(&body.address) {
        return Err(ApiError::Validation(format!(
            "Invalid wallet address: {}",
            body.address
        )));
    }

    let ip = client_ip(&req);
    if !state.rate_limiter.check(&ip) {
        log::warn!("Rate limited wallet-connection from {}", ip);
        return Err(ApiError::RateLimited(
            "Too many requests, slow down".to_string(),
        ));
    }

    let address = normalize_address(&body.address);
    if let Some(cached) = state.response_cache.get(&address) {
        return Ok(replay(cached.status, cached.body));
    }

    let result = state.bootstrap.bootstrap(&address, &ProfileSeed::default())?;

    let response_body = serde_json::json!({
        "success": true,
        "created": result.user_created,
        "user": result.user,
        "profile": result.profile,
        "wallet": result.wallet.map(WalletResponse::from),
    })
    .to_string();
    let status = if result.user_created { 201 } else { 200 };

    state.response_cache.put(&address, status, response_body.clone());
    Ok(replay(status, response_body))
}

async fn create_agent_profile(
    state: web::Data<AppState>,
    req: HttpRequest,
    body: web::Json<CreateAgentProfileRequest>,
) -> Result<HttpResponse, ApiError> {
    if auth_token(&req).is_none() {
        return Err(ApiError::Unauthorized(
            "No authorization token provided".to_string(),
        ));
    }
    if !is_valid_address(&body.address) {
        return Err(ApiError::Validation(format!(
            "Invalid wallet address: {}",
            body.address
        )));
    }

    let address = normalize_address(&body.address);
    let seed = ProfileSeed {
        display_name: body.display_name.clone(),
        life_context: body.life_context.clone(),
        life_goals: body.life_goals.clone(),
        skills: body.skills.clone(),
    };
    let result = state.bootstrap.bootstrap(&address, &seed)?;

    // The cached wallet-connection response is stale now
    state.response_cache.invalidate(&address);

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "profile": result.profile,
        "wallet": result.wallet.map(WalletResponse::from),
    })))
}

async fn create_from_handle(
    state: web::Data<AppState>,
    body: web::Json<CreateFromHandleRequest>,
) -> Result<HttpResponse, ApiError> {
    let handle = body.handle.trim();
    if handle.is_empty() {
        return Err(ApiError::Validation("Missing handle".to_string()));
    }

    let profile = state.persona.create_agent_from_handle(handle).await?;
    Ok(HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "profile": profile,
    })))
}

/// Serve a (possibly cached) serialized body with its original status
fn replay(status: u16, body: String) -> HttpResponse {
    let status = actix_web::http::StatusCode::from_u16(status)
        .unwrap_or(actix_web::http::StatusCode::OK);
    HttpResponse::build(status)
        .content_type("application/json")
        .body(body)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controllers::testing::test_state;
    use actix_web::{test, App};

    const ADDR: &str = "0xaaaabbbbccccddddeeeeffff0000111122223333";

    #[actix_web::test]
    async fn test_fresh_address_bootstraps_everything() {
        let (state, _dir) = test_state(None);
        let app = test::init_service(App::new().app_data(state.clone()).configure(config)).await;

        let req = test::TestRequest::post()
            .uri("/api/users/wallet-connection")
            .set_json(serde_json::json!({ "address": ADDR }))
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), 201);
        let body: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(body["success"], true);
        assert_eq!(body["created"], true);
        assert_eq!(body["profile"]["handle"], "user_aaaabb");
        assert!(body["wallet"]["address"].is_string());
        // The custodial key never crosses the API boundary
        assert!(body["wallet"].get("private_key").is_none());

        assert!(state.db.get_end_user(ADDR).unwrap().is_some());
        assert!(state.db.get_wallet("user_aaaabb").unwrap().is_some());
    }

    #[actix_web::test]
    async fn test_invalid_address_rejected() {
        let (state, _dir) = test_state(None);
        let app = test::init_service(App::new().app_data(state.clone()).configure(config)).await;

        let req = test::TestRequest::post()
            .uri("/api/users/wallet-connection")
            .set_json(serde_json::json!({ "address": "not-an-address" }))
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), 400);
        let body: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(body["success"], false);
        assert!(state.db.get_end_user("not-an-address").unwrap().is_none());
    }

    #[actix_web::test]
    async fn test_repeat_connection_replays_cached_bytes() {
        let (state, _dir) = test_state(None);
        let app = test::init_service(App::new().app_data(state.clone()).configure(config)).await;

        let first = test::call_service(
            &app,
            test::TestRequest::post()
                .uri("/api/users/wallet-connection")
                .set_json(serde_json::json!({ "address": ADDR }))
                .to_request(),
        )
        .await;
        let first_status = first.status();
        let first_body = test::read_body(first).await;

        let second = test::call_service(
            &app,
            test::TestRequest::post()
                .uri("/api/users/wallet-connection")
                .set_json(serde_json::json!({ "address": ADDR }))
                .to_request(),
        )
        .await;

        // Byte-identical replay, original status included
        assert_eq!(second.status(), first_status);
        assert_eq!(test::read_body(second).await, first_body);
    }

    #[actix_web::test]
    async fn test_rate_limit_kicks_in_after_ten_requests() {
        let (state, _dir) = test_state(None);
        let app = test::init_service(App::new().app_data(state.clone()).configure(config)).await;

        let mut last_status = None;
        for _ in 0..11 {
            let resp = test::call_service(
                &app,
                test::TestRequest::post()
                    .uri("/api/users/wallet-connection")
                    .set_json(serde_json::json!({ "address": ADDR }))
                    .to_request(),
            )
            .await;
            last_status = Some(resp.status());
        }

        assert_eq!(last_status.unwrap(), 429);
    }

    #[actix_web::test]
    async fn test_create_agent_profile_requires_token() {
        let (state, _dir) = test_state(None);
        let app = test::init_service(App::new().app_data(state.clone()).configure(config)).await;

        let req = test::TestRequest::post()
            .uri("/api/users/create-agent-profile")
            .set_json(serde_json::json!({ "address": ADDR, "displayName": "Ada" }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 401);
    }

    #[actix_web::test]
    async fn test_create_agent_profile_with_seed_fields() {
        let (state, _dir) = test_state(None);
        let app = test::init_service(App::new().app_data(state.clone()).configure(config)).await;

        let req = test::TestRequest::post()
            .uri("/api/users/create-agent-profile")
            .insert_header(("Authorization", "Bearer some-token"))
            .set_json(serde_json::json!({
                "address": ADDR,
                "displayName": "Ada",
                "lifeGoals": "ship things",
            }))
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), 200);
        let body: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(body["profile"]["display_name"], "Ada");
        assert_eq!(body["profile"]["life_goals"], "ship things");
    }

    #[actix_web::test]
    async fn test_create_from_handle_runs_ingestion() {
        let (state, _dir) = test_state(None);
        let app = test::init_service(App::new().app_data(state.clone()).configure(config)).await;

        let req = test::TestRequest::post()
            .uri("/api/users/create")
            .set_json(serde_json::json!({ "handle": "ada" }))
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), 200);
        let body: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(body["profile"]["handle"], "ada");
        assert!(state.db.get_wallet("ada").unwrap().is_some());
    }

    #[actix_web::test]
    async fn test_create_from_unknown_handle_is_404() {
        let (state, _dir) = test_state(None);
        let app = test::init_service(App::new().app_data(state.clone()).configure(config)).await;

        let req = test::TestRequest::post()
            .uri("/api/users/create")
            .set_json(serde_json::json!({ "handle": "missing_user" }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 404);
    }
}
