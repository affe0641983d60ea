//! Admin endpoints, gated by signed challenges.

use actix_web::{web, HttpResponse};
use serde::Deserialize;

use crate::admin_auth::{challenge_message, verify_admin};
use crate::error::ApiError;
use crate::AppState;

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/api/admin/challenge").route(web::get().to(get_challenge)));
    cfg.service(web::resource("/api/admin/create-agent").route(web::post().to(create_agent)));
    cfg.service(web::resource("/api/admin/set-agent-active").route(web::post().to(set_agent_active)));
}

async fn get_challenge(state: web::Data<AppState>) -> HttpResponse {
    state.challenges.purge_expired();
    let nonce = state.challenges.issue();
    HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "nonce": nonce,
        "message": challenge_message(&nonce),
    }))
}

#[derive(Debug, Deserialize)]
struct AdminProof {
    address: String,
    nonce: String,
    signature: String,
}

#[derive(Debug, Deserialize)]
struct AdminCreateAgentRequest {
    #[serde(flatten)]
    proof: AdminProof,
    handle: String,
}

#[derive(Debug, Deserialize)]
struct SetAgentActiveRequest {
    #[serde(flatten)]
    proof: AdminProof,
    handle: String,
    active: bool,
}

fn check_proof(state: &web::Data<AppState>, proof: &AdminProof) -> Result<(), ApiError> {
    verify_admin(
        &state.challenges,
        state.config.admin_wallet_address.as_deref(),
        &proof.address,
        &proof.nonce,
        &proof.signature,
    )
}

async fn create_agent(
    state: web::Data<AppState>,
    body: web::Json<AdminCreateAgentRequest>,
) -> Result<HttpResponse, ApiError> {
    check_proof(&state, &body.proof)?;

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

async fn set_agent_active(
    state: web::Data<AppState>,
    body: web::Json<SetAgentActiveRequest>,
) -> Result<HttpResponse, ApiError> {
    check_proof(&state, &body.proof)?;

    if state.db.get_agent_profile(&body.handle)?.is_none() {
        return Err(ApiError::NotFound(format!("Unknown agent: {}", body.handle)));
    }
    state.db.set_agent_active(&body.handle, body.active)?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "handle": body.handle,
        "active": body.active,
    })))
}
