//! Shared deployment helpers.

use elastic_wrapper_contracts::mocks::{
    MockAsset, MockAssetHostRef, MockAssetInitArgs, MockPriceFeed, MockPriceFeedHostRef,
    MockPriceFeedInitArgs,
};
use elastic_wrapper_contracts::oracle_wrapper::{OracleWrapper, OracleWrapperHostRef};
use elastic_wrapper_contracts::types::StaleFeedPolicy;
use elastic_wrapper_contracts::vault_wrapper::{VaultWrapper, VaultWrapperHostRef};
use odra::casper_types::U256;
use odra::host::{Deployer, HostEnv, HostRef, NoArgs};
use odra::prelude::*;

pub const HOUR_MS: u64 = 3_600_000;

/// `whole` with 8 price decimals.
pub fn price(whole: u64) -> U256 {
    U256::from(whole) * U256::from(100_000_000u64)
}

/// `whole` tokens of 18 decimals.
pub fn tokens(whole: u64) -> U256 {
    U256::from(whole) * U256::from(10u64).pow(U256::from(18u64))
}

pub fn deploy_asset(env: &HostEnv, symbol: &str) -> MockAssetHostRef {
    MockAsset::deploy(
        env,
        MockAssetInitArgs {
            name: format!("Mock {}", symbol),
            symbol: symbol.to_string(),
            decimals: 18,
        },
    )
}

pub fn deploy_feed(env: &HostEnv, value: U256, valid: bool) -> MockPriceFeedHostRef {
    MockPriceFeed::deploy(env, MockPriceFeedInitArgs { value, valid })
}

/// Funds `account` and lets `spender` pull without limit.
pub fn fund(env: &HostEnv, asset: &mut MockAssetHostRef, account: Address, spender: Address, amount: U256) {
    asset.mint(account, amount);
    env.set_caller(account);
    asset.approve(spender, U256::MAX);
}

pub struct OracleSetup {
    pub env: HostEnv,
    pub asset: MockAssetHostRef,
    pub feed: MockPriceFeedHostRef,
    pub wrapper: OracleWrapperHostRef,
    pub owner: Address,
    pub alice: Address,
    pub bob: Address,
}

/// Oracle wrapper over a funded mock asset. The caller is left as `alice`.
pub fn oracle_setup(initial_price: U256, policy: StaleFeedPolicy) -> OracleSetup {
    let env = odra_test::env();
    let owner = env.get_account(0);
    let alice = env.get_account(1);
    let bob = env.get_account(2);

    let mut asset = deploy_asset(&env, "WETH");
    let feed = deploy_feed(&env, initial_price, true);
    let mut wrapper = OracleWrapper::deploy(&env, NoArgs);
    wrapper.initialize(
        asset.address(),
        "Button WETH".to_string(),
        "bWETH".to_string(),
        feed.address(),
        policy,
    );

    let spender = wrapper.address();
    fund(&env, &mut asset, alice, spender, tokens(1_000_000));
    fund(&env, &mut asset, bob, spender, tokens(1_000_000));
    env.set_caller(alice);

    OracleSetup { env, asset, feed, wrapper, owner, alice, bob }
}

pub struct VaultSetup {
    pub env: HostEnv,
    pub asset: MockAssetHostRef,
    pub vault: VaultWrapperHostRef,
    pub alice: Address,
    pub bob: Address,
}

/// Vault over a funded mock asset. The caller is left as `alice`.
pub fn vault_setup() -> VaultSetup {
    let env = odra_test::env();
    let alice = env.get_account(1);
    let bob = env.get_account(2);

    let mut asset = deploy_asset(&env, "AMPL");
    let mut vault = VaultWrapper::deploy(&env, NoArgs);
    vault.initialize(asset.address(), "Unbutton AMPL".to_string(), "ubAMPL".to_string());

    let spender = vault.address();
    fund(&env, &mut asset, alice, spender, U256::from(1_000_000u64));
    fund(&env, &mut asset, bob, spender, U256::from(1_000_000u64));
    env.set_caller(alice);

    VaultSetup { env, asset, vault, alice, bob }
}
