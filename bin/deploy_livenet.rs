//! Deploy the wrapper contracts to Casper livenet/testnet using Odra livenet environment.
//!
//! Usage:
//!   cargo run --bin deploy_livenet --release
//!
//! Requires .env file with:
//!   ODRA_CASPER_LIVENET_SECRET_KEY_PATH=/path/to/secret_key.pem
//!   ODRA_CASPER_LIVENET_NODE_ADDRESS=https://node.testnet.casper.network
//!   ODRA_CASPER_LIVENET_CHAIN_NAME=casper-test
//!   ODRA_CASPER_LIVENET_PAYMENT_AMOUNT=200000000000
//!
//! Optional:
//!   WRAPPER_UNDERLYING=hash-...        collateral of the oracle wrapper
//!   WRAPPER_PRICE_FEED=hash-...        feed of the oracle wrapper
//!   WRAPPER_VAULT_UNDERLYING=hash-...  rebasing token of the vault wrapper
//!   WRAPPER_STALE_FEED_POLICY=revert   or `freeze`
//!   WRAPPER_DEPLOYMENT_RECORD=deployment.json
//!
//! Missing tokens and feeds are replaced by freshly deployed mocks.

use std::str::FromStr;

use log::info;
use odra::casper_types::U256;
use odra::host::{Deployer, HostEnv, HostRef, NoArgs};
use odra::prelude::*;
use serde::Serialize;
use thiserror::Error;

use elastic_wrapper_contracts::mocks::{MockAsset, MockAssetInitArgs, MockPriceFeed, MockPriceFeedInitArgs};
use elastic_wrapper_contracts::oracle_wrapper::OracleWrapper;
use elastic_wrapper_contracts::registry::{WrapperRegistry, WrapperRegistryInitArgs};
use elastic_wrapper_contracts::types::StaleFeedPolicy;
use elastic_wrapper_contracts::vault_wrapper::VaultWrapper;

const DEFAULT_PAYMENT_AMOUNT: u64 = 200_000_000_000;
const DEFAULT_RECORD_PATH: &str = "deployment.json";
/// Price reported by a mock feed: 2000.00000000
const MOCK_PRICE: u64 = 200_000_000_000;

#[derive(Debug, Error)]
enum DeployError {
    #[error("{var} is not a valid address: {value}")]
    InvalidAddress { var: &'static str, value: String },
    #[error("unknown stale feed policy `{0}` (expected `revert` or `freeze`)")]
    InvalidPolicy(String),
    #[error("failed to encode deployment record: {0}")]
    Encode(#[from] serde_json::Error),
    #[error("failed to write deployment record: {0}")]
    Write(#[from] std::io::Error),
}

struct DeployConfig {
    payment_amount: u64,
    underlying: Option<Address>,
    price_feed: Option<Address>,
    vault_underlying: Option<Address>,
    stale_feed_policy: StaleFeedPolicy,
    record_path: String,
}

impl DeployConfig {
    fn from_env() -> Result<Self, DeployError> {
        let payment_amount = std::env::var("ODRA_CASPER_LIVENET_PAYMENT_AMOUNT")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_PAYMENT_AMOUNT);

        let stale_feed_policy = match std::env::var("WRAPPER_STALE_FEED_POLICY") {
            Err(_) => StaleFeedPolicy::Revert,
            Ok(value) => match value.to_lowercase().as_str() {
                "revert" => StaleFeedPolicy::Revert,
                "freeze" => StaleFeedPolicy::Freeze,
                _ => return Err(DeployError::InvalidPolicy(value)),
            },
        };

        Ok(Self {
            payment_amount,
            underlying: address_var("WRAPPER_UNDERLYING")?,
            price_feed: address_var("WRAPPER_PRICE_FEED")?,
            vault_underlying: address_var("WRAPPER_VAULT_UNDERLYING")?,
            stale_feed_policy,
            record_path: std::env::var("WRAPPER_DEPLOYMENT_RECORD")
                .unwrap_or_else(|_| DEFAULT_RECORD_PATH.to_string()),
        })
    }
}

fn address_var(var: &'static str) -> Result<Option<Address>, DeployError> {
    match std::env::var(var) {
        Err(_) => Ok(None),
        Ok(value) => Address::from_str(&value)
            .map(Some)
            .map_err(|_| DeployError::InvalidAddress { var, value }),
    }
}

#[derive(Debug, Serialize)]
struct DeploymentRecord {
    deployer: String,
    underlying: String,
    price_feed: String,
    vault_underlying: String,
    oracle_wrapper: String,
    vault_wrapper: String,
    registry: String,
}

fn describe(address: &Address) -> String {
    format!("{:?}", address)
}

fn mock_asset(env: &HostEnv, symbol: &str) -> Address {
    info!("Deploying MockAsset {}...", symbol);
    let asset = MockAsset::deploy(
        env,
        MockAssetInitArgs {
            name: format!("Mock {}", symbol),
            symbol: symbol.to_string(),
            decimals: 18,
        },
    );
    asset.address()
}

fn run() -> Result<(), DeployError> {
    let config = DeployConfig::from_env()?;

    // Initialize Odra livenet environment
    let env = odra_casper_livenet_env::env();
    env.set_gas(config.payment_amount);

    let deployer = env.caller();
    info!("Deployer: {:?}", deployer);

    // ==================== Phase 1: Dependencies ====================
    let underlying = match config.underlying {
        Some(address) => address,
        None => mock_asset(&env, "WETH"),
    };
    let price_feed = match config.price_feed {
        Some(address) => address,
        None => {
            info!("Deploying MockPriceFeed...");
            let feed = MockPriceFeed::deploy(
                &env,
                MockPriceFeedInitArgs { value: U256::from(MOCK_PRICE), valid: true },
            );
            feed.address()
        }
    };
    let vault_underlying = match config.vault_underlying {
        Some(address) => address,
        None => mock_asset(&env, "AMPL"),
    };

    // ==================== Phase 2: Wrappers ====================
    info!("Deploying OracleWrapper...");
    let mut oracle_wrapper = OracleWrapper::deploy(&env, NoArgs);
    oracle_wrapper.initialize(
        underlying,
        "Button Token".to_string(),
        "bTKN".to_string(),
        price_feed,
        config.stale_feed_policy,
    );
    info!("OracleWrapper deployed at: {:?}", oracle_wrapper.address());

    info!("Deploying VaultWrapper...");
    let mut vault_wrapper = VaultWrapper::deploy(&env, NoArgs);
    vault_wrapper.initialize(vault_underlying, "Unbutton Token".to_string(), "ubTKN".to_string());
    info!("VaultWrapper deployed at: {:?}", vault_wrapper.address());

    // ==================== Phase 3: Registry ====================
    info!("Deploying WrapperRegistry...");
    let mut registry = WrapperRegistry::deploy(&env, WrapperRegistryInitArgs { owner: deployer });
    let oracle_added = registry.add_wrapper(oracle_wrapper.address());
    let vault_added = registry.add_wrapper(vault_wrapper.address());
    info!(
        "WrapperRegistry deployed at: {:?} (registered oracle: {}, vault: {})",
        registry.address(),
        oracle_added,
        vault_added
    );

    let record = DeploymentRecord {
        deployer: describe(&deployer),
        underlying: describe(&underlying),
        price_feed: describe(&price_feed),
        vault_underlying: describe(&vault_underlying),
        oracle_wrapper: describe(&oracle_wrapper.address()),
        vault_wrapper: describe(&vault_wrapper.address()),
        registry: describe(&registry.address()),
    };
    std::fs::write(&config.record_path, serde_json::to_string_pretty(&record)?)?;
    info!("Deployment record written to {}", config.record_path);
    Ok(())
}

fn main() {
    // Load environment from .env file
    dotenv::dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    if let Err(err) = run() {
        log::error!("Deployment failed: {}", err);
        std::process::exit(1);
    }
}
