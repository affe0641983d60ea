//! Session gate middleware.
//!
//! Redirects requests for protected page paths to the application root when
//! the wallet-connected flag cookie is absent. The cookie is set client-side
//! after the wallet SDK reports a connection; nothing here validates it
//! cryptographically. This is a UX gate keeping signed-out visitors off
//! app pages, NOT a security boundary - API endpoints carry their own
//! authorization.

use actix_web::body::EitherBody;
use actix_web::dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform};
use actix_web::http::header;
use actix_web::{Error, HttpResponse};
use futures_util::future::LocalBoxFuture;
use std::future::{ready, Ready};

/// Flag cookie written by the client after wallet connection (24h expiry)
pub const WALLET_COOKIE: &str = "wallet-connected";

/// Page path prefixes that require the flag cookie
const PROTECTED_PREFIXES: &[&str] = &["/dashboard", "/profile", "/settings", "/agents"];

/// Where unauthenticated requests are sent
const FALLBACK_PATH: &str = "/";

pub fn is_protected_path(path: &str) -> bool {
    PROTECTED_PREFIXES.iter().any(|p| path.starts_with(p))
}

pub struct SessionGate;

impl<S, B> Transform<S, ServiceRequest> for SessionGate
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Transform = SessionGateMiddleware<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(SessionGateMiddleware { service }))
    }
}

pub struct SessionGateMiddleware<S> {
    service: S,
}

impl<S, B> Service<ServiceRequest> for SessionGateMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let gated = is_protected_path(req.path()) && req.cookie(WALLET_COOKIE).is_none();

        if gated {
            log::debug!("Session gate: redirecting {} to {}", req.path(), FALLBACK_PATH);
            let (req, _) = req.into_parts();
            let response = HttpResponse::Found()
                .insert_header((header::LOCATION, FALLBACK_PATH))
                .finish()
                .map_into_right_body();
            return Box::pin(async move { Ok(ServiceResponse::new(req, response)) });
        }

        let fut = self.service.call(req);
        Box::pin(async move { fut.await.map(|res| res.map_into_left_body()) })
    }
}
