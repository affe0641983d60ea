//! Custodial wallet balance reads, cached.

use actix_web::{web, HttpResponse};
use serde::Deserialize;

use crate::error::ApiError;
use crate::AppState;

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/api/wallet/balance").route(web::get().to(get_balance)));
}

#[derive(Debug, Deserialize)]
struct BalanceQuery {
    handle: Option<String>,
}

async fn get_balance(
    state: web::Data<AppState>,
    query: web::Query<BalanceQuery>,
) -> Result<HttpResponse, ApiError> {
    let handle = query
        .handle
        .as_deref()
        .filter(|h| !h.trim().is_empty())
        .ok_or_else(|| ApiError::Validation("Missing handle".to_string()))?;

    let wallet = state
        .db
        .get_wallet(handle)?
        .ok_or_else(|| ApiError::NotFound(format!("No wallet for agent: {}", handle)))?;

    let balance = match state.balances.get(handle) {
        Some(cached) => cached,
        None => {
            let fresh = state.wallets.balance_of(&wallet.address).await?;
            state.balances.insert(handle, fresh.clone());
            fresh
        }
    };

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "handle": handle,
        "address": wallet.address,
        "balance": balance,
    })))
}
