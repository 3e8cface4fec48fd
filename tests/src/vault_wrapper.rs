//! Vault wrapper tests.

use crate::fixtures::{deploy_asset, vault_setup};
use elastic_wrapper_contracts::errors::WrapperError;
use elastic_wrapper_contracts::vault_wrapper::VaultWrapper;
use odra::casper_types::account::AccountHash;
use odra::casper_types::U256;
use odra::host::{Deployer, HostRef, NoArgs};
use odra::prelude::*;
use pretty_assertions::assert_eq;

fn n(value: u64) -> U256 {
    U256::from(value)
}

#[test]
fn test_initialize_copies_decimals_once() {
    let mut s = vault_setup();
    assert_eq!(s.vault.decimals(), 18);
    assert_eq!(s.vault.underlying(), s.asset.address());
    assert_eq!(s.vault.initial_rate(), n(1_000_000));
    assert_eq!(s.vault.minimum_deposit(), n(1_000));
    assert_eq!(s.vault.retained_shares(), n(1_000_000));

    let other = deploy_asset(&s.env, "STETH");
    assert_eq!(
        s.vault.try_initialize(other.address(), "x".to_string(), "x".to_string()),
        Err(WrapperError::AlreadyInitialized.into())
    );
}

#[test]
fn test_uninitialized_vault_rejects_calls() {
    let s = vault_setup();
    let mut blank = VaultWrapper::deploy(&s.env, NoArgs);
    assert_eq!(blank.try_deposit(n(1_000)), Err(WrapperError::NotInitialized.into()));
    assert_eq!(blank.try_mint(n(1_000)), Err(WrapperError::NotInitialized.into()));
}

#[test]
fn test_bootstrap_deposit_retains_shares() {
    let mut s = vault_setup();
    let vault = s.vault.address();
    assert_eq!(s.vault.underlying_to_shares(n(1_000)), n(1_000_000_000));

    let shares = s.vault.deposit(n(1_000));

    assert_eq!(shares, n(999_000_000));
    assert_eq!(s.vault.scaled_balance_of(s.alice), n(999_000_000));
    assert_eq!(s.vault.scaled_balance_of(vault), n(1_000_000));
    assert_eq!(s.vault.scaled_total_supply(), n(1_000_000_000));
    assert_eq!(s.vault.balance_of(s.alice), n(999));
    assert_eq!(s.vault.balance_of_underlying(s.alice), n(999));
    assert_eq!(s.vault.total_supply(), n(1_000));
    assert_eq!(s.vault.total_underlying(), n(1_000));
    assert_eq!(s.vault.underlying_to_shares(n(10)), n(10_000_000));
}

#[test]
fn test_bootstrap_below_minimum_fails() {
    let mut s = vault_setup();
    assert_eq!(s.vault.try_deposit(n(999)), Err(WrapperError::BelowMinimumDeposit.into()));
    assert_eq!(
        s.vault.try_deposit(U256::zero()),
        Err(WrapperError::ZeroOrSubUnitAmount.into())
    );
}

#[test]
fn test_bootstrap_mint_pulls_minimum() {
    let mut s = vault_setup();
    let pulled = s.vault.mint(n(999_000_000));
    assert_eq!(pulled, n(1_000));
    assert_eq!(s.vault.scaled_balance_of(s.alice), n(999_000_000));
    assert_eq!(s.vault.scaled_balance_of(s.vault.address()), n(1_000_000));
}

#[test]
fn test_bootstrap_mint_retains_fixed_shares() {
    let mut s = vault_setup();
    let vault = s.vault.address();
    let start = s.asset.balance_of(s.alice);

    assert_eq!(s.vault.try_mint(n(5)), Err(WrapperError::BelowMinimumDeposit.into()));

    // Not a whole number of underlying units at the initial rate.
    let pulled = s.vault.mint(n(999_000_001));
    assert_eq!(pulled, n(1_001));
    assert_eq!(s.asset.balance_of(s.alice), start - n(1_001));
    assert_eq!(s.vault.scaled_balance_of(s.alice), n(999_000_001));
    assert_eq!(s.vault.scaled_balance_of(vault), s.vault.retained_shares());
    assert_eq!(s.vault.scaled_total_supply(), n(1_000_000_001));
}

#[test]
fn test_second_deposit_uses_live_ratio() {
    let mut s = vault_setup();
    s.vault.deposit(n(1_000));

    s.env.set_caller(s.bob);
    let shares = s.vault.deposit(n(1_000));

    assert_eq!(shares, n(1_000_000_000));
    assert_eq!(s.vault.balance_of(s.bob), n(1_000));
    assert_eq!(s.vault.total_underlying(), n(2_000));
}

#[test]
fn test_underlying_rebase_moves_balances() {
    let mut s = vault_setup();
    let vault = s.vault.address();
    s.vault.deposit(n(1_000));
    s.env.set_caller(s.bob);
    s.vault.deposit(n(1_000));

    s.asset.mint(vault, n(2_000));
    assert_eq!(s.vault.balance_of(s.alice), n(1_998));
    assert_eq!(s.vault.balance_of(s.bob), n(2_000));
    assert_eq!(s.vault.total_supply(), n(4_000));

    s.asset.burn(vault, n(3_000));
    assert_eq!(s.vault.balance_of(s.alice), n(499));
    assert_eq!(s.vault.balance_of(s.bob), n(500));
    assert_eq!(s.vault.scaled_balance_of(s.bob), n(1_000_000_000));
}

#[test]
fn test_withdraw_rounds_shares_up() {
    let mut s = vault_setup();
    let vault = s.vault.address();
    s.vault.deposit(n(1_000));
    // 3000 underlying against 1e9 shares
    s.asset.mint(vault, n(2_000));

    let burned = s.vault.withdraw(n(1));
    assert_eq!(burned, n(333_334));
    assert_eq!(s.vault.scaled_balance_of(s.alice), n(999_000_000 - 333_334));
}

#[test]
fn test_burn_rounds_underlying_down() {
    let mut s = vault_setup();
    let vault = s.vault.address();
    s.vault.deposit(n(1_000));
    s.asset.mint(vault, n(2_000));

    assert_eq!(s.vault.shares_to_underlying(n(1_333_333)), n(3));
    assert_eq!(s.vault.burn(n(1_333_333)), n(3));
    assert_eq!(
        s.vault.try_burn(n(333_333)),
        Err(WrapperError::ZeroOrSubUnitAmount.into())
    );
}

#[test]
fn test_mint_rounds_underlying_up() {
    let mut s = vault_setup();
    let vault = s.vault.address();
    s.vault.deposit(n(1_000));
    s.asset.mint(vault, n(2_000));

    s.env.set_caller(s.bob);
    // 1_333_334 shares are worth 4.000002 underlying
    assert_eq!(s.vault.mint(n(1_333_334)), n(5));
    assert_eq!(s.vault.scaled_balance_of(s.bob), n(1_333_334));
    assert_eq!(
        s.vault.try_mint(n(333_333)),
        Err(WrapperError::ZeroOrSubUnitAmount.into())
    );
}

#[test]
fn test_withdraw_all_and_burn_all() {
    let mut s = vault_setup();
    let alice_start = s.asset.balance_of(s.alice);
    let bob_start = s.asset.balance_of(s.bob);
    s.vault.deposit(n(1_000));
    s.env.set_caller(s.bob);
    s.vault.deposit(n(1_000));

    s.env.set_caller(s.alice);
    assert_eq!(s.vault.burn_all(), n(999));
    assert_eq!(s.asset.balance_of(s.alice), alice_start - n(1));

    s.env.set_caller(s.bob);
    assert_eq!(s.vault.withdraw_all(), n(1_000_000_000));
    assert_eq!(s.asset.balance_of(s.bob), bob_start);

    // Only the retained shares and their backing are left.
    assert_eq!(s.vault.scaled_total_supply(), n(1_000_000));
    assert_eq!(s.vault.total_underlying(), n(1));
}

#[test]
fn test_withdraw_more_than_balance_fails() {
    let mut s = vault_setup();
    s.vault.deposit(n(1_000));
    assert_eq!(s.vault.try_withdraw(n(1_000)), Err(WrapperError::InsufficientBalance.into()));
}

#[test]
fn test_transfer_is_denominated_in_underlying() {
    let mut s = vault_setup();
    s.vault.deposit(n(1_000));
    s.env.set_caller(s.bob);
    s.vault.deposit(n(1_000));

    s.env.set_caller(s.alice);
    s.vault.transfer(s.bob, n(100));
    assert_eq!(s.vault.balance_of(s.alice), n(899));
    assert_eq!(s.vault.balance_of(s.bob), n(1_100));
    assert_eq!(s.vault.scaled_total_supply(), n(2_000_000_000));
}

#[test]
fn test_transfer_after_rebase_is_exact() {
    let mut s = vault_setup();
    let vault = s.vault.address();
    s.vault.deposit(n(1_000));
    s.env.set_caller(s.bob);
    s.vault.deposit(n(1_000));
    s.asset.mint(vault, n(1_000));

    s.env.set_caller(s.alice);
    assert_eq!(s.vault.balance_of(s.alice), n(1_498));
    s.vault.transfer(s.bob, n(1));

    assert_eq!(s.vault.balance_of(s.alice), n(1_497));
    assert_eq!(s.vault.balance_of(s.bob), n(1_501));
}

#[test]
fn test_transfer_checks() {
    let mut s = vault_setup();
    s.vault.deposit(n(1_000));
    let zero = Address::Account(AccountHash::default());

    assert_eq!(s.vault.try_transfer(zero, n(1)), Err(WrapperError::InvalidRecipient.into()));
    assert_eq!(
        s.vault.try_transfer(s.bob, n(1_000)),
        Err(WrapperError::InsufficientBalance.into())
    );

    s.vault.approve(s.bob, n(10));
    s.env.set_caller(s.bob);
    assert_eq!(
        s.vault.try_transfer_from(s.alice, s.bob, n(11)),
        Err(WrapperError::InsufficientAllowance.into())
    );
    s.vault.transfer_from(s.alice, s.bob, n(10));
    assert_eq!(s.vault.balance_of(s.bob), n(10));
    assert_eq!(s.vault.allowance(s.alice, s.bob), U256::zero());
}

#[test]
fn test_transfer_all_moves_every_share() {
    let mut s = vault_setup();
    s.vault.deposit(n(1_000));
    s.vault.transfer_all(s.bob);
    assert_eq!(s.vault.scaled_balance_of(s.alice), U256::zero());
    assert_eq!(s.vault.scaled_balance_of(s.bob), n(999_000_000));
    assert_eq!(s.vault.balance_of(s.bob), n(999));
}

#[test]
fn test_transfer_below_share_value_fails() {
    let mut s = vault_setup();
    let vault = s.vault.address();
    s.vault.deposit(n(1_000));
    s.vault.burn(n(998_999_990));
    // Donation pushes one share far above one underlying unit.
    s.asset.mint(vault, n(1_000_000_000_000));
    assert_eq!(s.vault.scaled_balance_of(s.alice), n(10));

    let alice_before = s.vault.balance_of(s.alice);
    assert_eq!(
        s.vault.try_transfer(s.bob, n(1)),
        Err(WrapperError::ZeroOrSubUnitAmount.into())
    );
    assert_eq!(s.vault.balance_of(s.alice), alice_before);
    assert_eq!(s.vault.balance_of(s.bob), U256::zero());

    // Whole shares still move exactly.
    let one_share = s.vault.shares_to_underlying(n(1));
    s.vault.transfer(s.bob, one_share);
    assert_eq!(s.vault.scaled_balance_of(s.bob), n(1));
    assert_eq!(s.vault.balance_of(s.bob), one_share);
}
