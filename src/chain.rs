//! EVM chain collaborator.
//!
//! Custodial wallet generation, one-time initial funding from the deployer
//! account, and balance reads with a short-lived cache in front.

use async_trait::async_trait;
use ethers::prelude::*;
use std::time::Duration;

use crate::config::Config;
use crate::error::ApiError;

/// TTL for cached balance reads
const BALANCE_CACHE_TTL_SECS: u64 = 60;

/// Placeholder until a real permit flow exists; wallets are created with
/// this value and never updated.
pub const PLACEHOLDER_PERMIT_SIGNATURE: &str = "0x0";

#[derive(Debug, Clone)]
pub struct GeneratedWallet {
    /// Lowercase 0x-prefixed address
    pub address: String,
    /// Hex-encoded signing key, held custodially
    pub private_key: String,
}

/// Seam over key generation and chain RPC so bootstrap/ingestion are
/// testable without a live chain.
#[async_trait]
pub trait WalletProvisioner: Send + Sync {
    /// Generate a fresh keypair (no chain interaction)
    fn generate(&self) -> Result<GeneratedWallet, ApiError>;

    /// Send the initial funding transaction to `address`. Returns the tx
    /// hash, or None when no deployer/RPC is configured (funding skipped).
    async fn fund(&self, address: &str) -> Result<Option<String>, ApiError>;

    /// Current balance of `address` in wei, as a decimal string
    async fn balance_of(&self, address: &str) -> Result<String, ApiError>;
}

pub struct EvmChainClient {
    rpc_url: Option<String>,
    chain_id: u64,
    deployer_private_key: Option<String>,
    initial_funding_wei: String,
}

impl EvmChainClient {
    pub fn from_config(config: &Config) -> Self {
        Self {
            rpc_url: config.chain_rpc_url.clone(),
            chain_id: config.chain_id,
            deployer_private_key: config.deployer_private_key.clone(),
            initial_funding_wei: config.initial_funding_wei.clone(),
        }
    }

    fn provider(&self) -> Result<Option<Provider<Http>>, ApiError> {
        let url = match &self.rpc_url {
            Some(u) => u,
            None => return Ok(None),
        };
        Provider::<Http>::try_from(url.as_str())
            .map(Some)
            .map_err(|e| ApiError::ExternalService(format!("Invalid chain RPC URL: {}", e)))
    }
}

#[async_trait]
impl WalletProvisioner for EvmChainClient {
    fn generate(&self) -> Result<GeneratedWallet, ApiError> {
        let wallet = LocalWallet::new(&mut rand::thread_rng());
        let address = format!("{:?}", wallet.address()).to_lowercase();
        let private_key = format!("0x{}", hex::encode(wallet.signer().to_bytes()));
        Ok(GeneratedWallet {
            address,
            private_key,
        })
    }

    async fn fund(&self, address: &str) -> Result<Option<String>, ApiError> {
        let (provider, deployer_key) = match (self.provider()?, &self.deployer_private_key) {
            (Some(p), Some(k)) => (p, k),
            _ => {
                log::info!("Chain RPC or deployer key not configured, skipping funding of {}", address);
                return Ok(None);
            }
        };

        let deployer: LocalWallet = deployer_key
            .parse::<LocalWallet>()
            .map_err(|e| ApiError::ExternalService(format!("Invalid deployer private key: {}", e)))?
            .with_chain_id(self.chain_id);

        let to: Address = address
            .parse()
            .map_err(|e| ApiError::Validation(format!("Invalid funding target address: {}", e)))?;

        let amount = U256::from_dec_str(&self.initial_funding_wei)
            .map_err(|e| ApiError::ExternalService(format!("Invalid funding amount: {}", e)))?;

        let client = SignerMiddleware::new(provider, deployer);
        let tx = TransactionRequest::pay(to, amount);

        let pending = client
            .send_transaction(tx, None)
            .await
            .map_err(|e| ApiError::ExternalService(format!("Funding transaction failed: {}", e)))?;

        let tx_hash = format!("{:?}", pending.tx_hash());
        log::info!("Sent initial funding to {} (tx: {})", address, tx_hash);
        Ok(Some(tx_hash))
    }

    async fn balance_of(&self, address: &str) -> Result<String, ApiError> {
        let provider = self
            .provider()?
            .ok_or_else(|| ApiError::ExternalService("Chain RPC not configured".to_string()))?;

        let addr: Address = address
            .parse()
            .map_err(|e| ApiError::Validation(format!("Invalid address: {}", e)))?;

        let balance = provider
            .get_balance(addr, None)
            .await
            .map_err(|e| ApiError::ExternalService(format!("Balance read failed: {}", e)))?;

        Ok(balance.to_string())
    }
}

/// Hot-path cache for balance reads, keyed by handle. Invalidated when
/// funding lands so the next read reflects the new balance.
pub struct BalanceCache {
    cache: moka::sync::Cache<String, String>,
}

impl BalanceCache {
    pub fn new() -> Self {
        Self {
            cache: moka::sync::Cache::builder()
                .time_to_live(Duration::from_secs(BALANCE_CACHE_TTL_SECS))
                .build(),
        }
    }

    pub fn get(&self, handle: &str) -> Option<String> {
        self.cache.get(handle)
    }

    pub fn insert(&self, handle: &str, balance: String) {
        self.cache.insert(handle.to_string(), balance);
    }

    pub fn invalidate(&self, handle: &str) {
        self.cache.invalidate(handle);
    }
}

impl Default for BalanceCache {
    fn default() -> Self {
        Self::new()
    }
}
