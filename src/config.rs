use std::env;

/// Environment variable names - single source of truth
pub mod env_vars {
    pub const PORT: &str = "PORT";
    pub const DATABASE_URL: &str = "DATABASE_URL";
    pub const CHAIN_RPC_URL: &str = "CHAIN_RPC_URL";
    pub const CHAIN_ID: &str = "CHAIN_ID";
    pub const DEPLOYER_PRIVATE_KEY: &str = "DEPLOYER_PRIVATE_KEY";
    pub const INITIAL_FUNDING_WEI: &str = "INITIAL_FUNDING_WEI";
    pub const TWITTER_API_KEY: &str = "TWITTER_API_KEY";
    pub const TWITTER_API_BASE_URL: &str = "TWITTER_API_BASE_URL";
    pub const GENERATION_API_KEY: &str = "GENERATION_API_KEY";
    pub const GENERATION_ENDPOINT: &str = "GENERATION_ENDPOINT";
    pub const GENERATION_MODEL: &str = "GENERATION_MODEL";
    pub const DISCORD_WEBHOOK_URL: &str = "DISCORD_WEBHOOK_URL";
    pub const DISCORD_ERROR_WEBHOOK_URL: &str = "DISCORD_ERROR_WEBHOOK_URL";
    pub const SCHEDULED_ACTIONS_SECRET_KEY: &str = "SCHEDULED_ACTIONS_SECRET_KEY";
    pub const ADMIN_WALLET_ADDRESS: &str = "ADMIN_WALLET_ADDRESS";
}

/// Default values
pub mod defaults {
    pub const PORT: u16 = 8080;
    pub const DATABASE_URL: &str = "./.db/agent-chain.db";
    pub const CHAIN_ID: u64 = 8453; // Base mainnet
    pub const INITIAL_FUNDING_WEI: &str = "100000000000000"; // 0.0001 ETH
    pub const TWITTER_API_BASE_URL: &str = "https://api.twitterapi.io";
    pub const GENERATION_ENDPOINT: &str = "https://api.openai.com/v1/chat/completions";
    pub const GENERATION_MODEL: &str = "gpt-4o-mini";
}

#[derive(Clone)]
pub struct Config {
    pub port: u16,
    pub database_url: String,
    pub chain_rpc_url: Option<String>,
    pub chain_id: u64,
    pub deployer_private_key: Option<String>,
    pub initial_funding_wei: String,
    pub twitter_api_key: Option<String>,
    pub twitter_api_base_url: String,
    pub generation_api_key: Option<String>,
    pub generation_endpoint: String,
    pub generation_model: String,
    pub discord_webhook_url: Option<String>,
    pub discord_error_webhook_url: Option<String>,
    pub scheduled_actions_secret_key: Option<String>,
    pub admin_wallet_address: Option<String>,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            port: env::var(env_vars::PORT)
                .unwrap_or_else(|_| defaults::PORT.to_string())
                .parse()
                .expect("PORT must be a valid number"),
            database_url: env::var(env_vars::DATABASE_URL)
                .unwrap_or_else(|_| defaults::DATABASE_URL.to_string()),
            chain_rpc_url: non_empty(env_vars::CHAIN_RPC_URL),
            chain_id: env::var(env_vars::CHAIN_ID)
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults::CHAIN_ID),
            initial_funding_wei: env::var(env_vars::INITIAL_FUNDING_WEI)
                .unwrap_or_else(|_| defaults::INITIAL_FUNDING_WEI.to_string()),
            deployer_private_key: non_empty(env_vars::DEPLOYER_PRIVATE_KEY),
            twitter_api_key: non_empty(env_vars::TWITTER_API_KEY),
            twitter_api_base_url: env::var(env_vars::TWITTER_API_BASE_URL)
                .unwrap_or_else(|_| defaults::TWITTER_API_BASE_URL.to_string()),
            generation_api_key: non_empty(env_vars::GENERATION_API_KEY),
            generation_endpoint: env::var(env_vars::GENERATION_ENDPOINT)
                .unwrap_or_else(|_| defaults::GENERATION_ENDPOINT.to_string()),
            generation_model: env::var(env_vars::GENERATION_MODEL)
                .unwrap_or_else(|_| defaults::GENERATION_MODEL.to_string()),
            discord_webhook_url: non_empty(env_vars::DISCORD_WEBHOOK_URL),
            discord_error_webhook_url: non_empty(env_vars::DISCORD_ERROR_WEBHOOK_URL),
            scheduled_actions_secret_key: non_empty(env_vars::SCHEDULED_ACTIONS_SECRET_KEY),
            admin_wallet_address: non_empty(env_vars::ADMIN_WALLET_ADDRESS)
                .map(|a| a.to_lowercase()),
        }
    }
}

/// Read an env var, treating empty strings as unset
fn non_empty(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.trim().is_empty())
}
