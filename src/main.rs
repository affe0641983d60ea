use actix_cors::Cors;
use actix_web::{middleware::Logger, web, App, HttpServer};
use dotenv::dotenv;
use std::sync::Arc;

mod actions;
mod admin_auth;
mod ai;
mod alerts;
mod bootstrap;
mod cache;
mod chain;
mod chat;
mod config;
mod controllers;
mod db;
mod error;
mod models;
mod persona;
mod scheduler;
mod session_gate;
mod twitter;

use actions::GenerativeActionExecutor;
use admin_auth::{ChallengeStore, CHALLENGE_TTL};
use ai::{GenerationClient, TextGenerator};
use alerts::AlertNotifier;
use bootstrap::ProfileBootstrap;
use cache::{
    RateLimiter, ResponseCache, SystemClock, RATE_LIMIT_MAX_REQUESTS, RATE_LIMIT_WINDOW,
    RESPONSE_CACHE_TTL,
};
use chain::{BalanceCache, EvmChainClient, WalletProvisioner};
use chat::ChatResponder;
use config::Config;
use db::Database;
use persona::PersonaIngestion;
use scheduler::{ActionScheduler, SchedulerConfig};
use session_gate::SessionGate;
use twitter::{TwitterApiClient, TwitterData};

pub struct AppState {
    pub db: Arc<Database>,
    pub config: Config,
    pub response_cache: Arc<ResponseCache>,
    pub rate_limiter: Arc<RateLimiter>,
    pub bootstrap: Arc<ProfileBootstrap>,
    pub persona: Arc<PersonaIngestion>,
    pub chat: Arc<ChatResponder>,
    pub scheduler: Arc<ActionScheduler>,
    pub wallets: Arc<dyn WalletProvisioner>,
    pub balances: Arc<BalanceCache>,
    pub challenges: Arc<ChallengeStore>,
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv().ok();
    env_logger::init();

    let config = Config::from_env();
    let port = config.port;

    log::info!("Initializing database at {}", config.database_url);
    let db = Arc::new(Database::new(&config.database_url).expect("Failed to initialize database"));

    let clock = Arc::new(SystemClock);
    let response_cache = Arc::new(ResponseCache::new(RESPONSE_CACHE_TTL, clock.clone()));
    let rate_limiter = Arc::new(RateLimiter::new(
        RATE_LIMIT_WINDOW,
        RATE_LIMIT_MAX_REQUESTS,
        clock.clone(),
    ));
    cache::spawn_cleanup(response_cache.clone(), rate_limiter.clone());

    let wallets: Arc<dyn WalletProvisioner> = Arc::new(EvmChainClient::from_config(&config));
    let twitter: Arc<dyn TwitterData> = Arc::new(TwitterApiClient::new(
        config.twitter_api_base_url.clone(),
        config.twitter_api_key.clone(),
    ));
    let generator: Arc<dyn TextGenerator> = Arc::new(GenerationClient::new(
        config.generation_endpoint.clone(),
        config.generation_api_key.clone(),
        config.generation_model.clone(),
    ));
    let alerts = Arc::new(AlertNotifier::from_config(&config));
    let balances = Arc::new(BalanceCache::new());

    let bootstrap = Arc::new(ProfileBootstrap::new(db.clone(), wallets.clone()));
    let persona = Arc::new(PersonaIngestion::new(
        db.clone(),
        twitter,
        generator.clone(),
        wallets.clone(),
        alerts.clone(),
        balances.clone(),
    ));
    let chat = Arc::new(ChatResponder::new(db.clone(), generator.clone()));

    let executor = Arc::new(GenerativeActionExecutor::new(db.clone(), generator));
    let scheduler = Arc::new(ActionScheduler::new(
        db.clone(),
        executor,
        alerts,
        SchedulerConfig::new(config.scheduled_actions_secret_key.clone()),
    ));

    let challenges = Arc::new(ChallengeStore::new(CHALLENGE_TTL, clock));

    log::info!("Starting agent-chain server on port {}", port);

    HttpServer::new(move || {
        let cors = Cors::default()
            .allow_any_origin()
            .allow_any_method()
            .allow_any_header()
            .max_age(3600);

        App::new()
            .app_data(web::Data::new(AppState {
                db: Arc::clone(&db),
                config: config.clone(),
                response_cache: Arc::clone(&response_cache),
                rate_limiter: Arc::clone(&rate_limiter),
                bootstrap: Arc::clone(&bootstrap),
                persona: Arc::clone(&persona),
                chat: Arc::clone(&chat),
                scheduler: Arc::clone(&scheduler),
                wallets: Arc::clone(&wallets),
                balances: Arc::clone(&balances),
                challenges: Arc::clone(&challenges),
            }))
            .wrap(Logger::default())
            .wrap(cors)
            .wrap(SessionGate)
            .configure(controllers::health::config)
            .configure(controllers::users::config)
            .configure(controllers::agent_training::config)
            .configure(controllers::scheduled_actions::config)
            .configure(controllers::tweets::config)
            .configure(controllers::feed::config)
            .configure(controllers::chat::config)
            .configure(controllers::wallet::config)
            .configure(controllers::admin::config)
    })
    .bind(("0.0.0.0", port))?
    .run()
    .await
}
