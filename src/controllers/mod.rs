pub mod admin;
pub mod agent_training;
pub mod chat;
pub mod feed;
pub mod health;
pub mod scheduled_actions;
pub mod tweets;
pub mod users;
pub mod wallet;

use actix_web::HttpRequest;

/// Best-effort client identity for rate limiting
pub fn client_ip(req: &HttpRequest) -> String {
    req.connection_info()
        .realip_remote_addr()
        .map(|s| s.to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

/// Bearer token from the Authorization header, falling back to the
/// `privy-token` cookie some clients send instead.
pub fn auth_token(req: &HttpRequest) -> Option<String> {
    let header = req
        .headers()
        .get("Authorization")
        .and_then(|h| h.to_str().ok())
        .and_then(|s| s.strip_prefix("Bearer "))
        .map(|s| s.to_string());

    header.or_else(|| req.cookie("privy-token").map(|c| c.value().to_string()))
}
