//! Ratio-based vault wrapper.
//!
//! Wraps a rebasing CEP-18 token. Holders own shares of the pooled underlying
//! and their balance is `shares × pooled / total_shares`, with `pooled` read
//! from the underlying token on every call. A rebase of the underlying moves
//! every balance without this contract doing anything.
//!
//! The first deposit mints `INITIAL_RATE` shares per underlying unit and locks
//! `RETAINED_SHARES` of them with the vault so the ratio can never be
//! inflated from an empty pool.

use odra::prelude::*;
use odra::casper_types::account::AccountHash;
use odra::casper_types::U256;
use crate::asset::AssetVault;
use crate::conversion::{
    ConversionPolicy, Quote, UnderlyingRatio, INITIAL_RATE, MINIMUM_DEPOSIT, RETAINED_SHARES,
};
use crate::errors::{or_revert, WrapperError};
use crate::events::{Approval, Transfer};
use crate::ledger::ScaledLedger;

#[odra::module(events = [Transfer, Approval])]
pub struct VaultWrapper {
    initialized: Var<bool>,
    /// Rebasing token held by the vault
    underlying: Var<Address>,
    name: Var<String>,
    symbol: Var<String>,
    decimals: Var<u8>,
    ledger: SubModule<ScaledLedger>,
}

#[odra::module]
impl VaultWrapper {
    /// One-time setup of a blank instance.
    pub fn initialize(&mut self, underlying: Address, name: String, symbol: String) {
        if self.initialized.get_or_default() {
            self.env().revert(WrapperError::AlreadyInitialized);
        }
        let decimals = AssetVault::decimals(&self.env(), underlying);
        self.initialized.set(true);
        self.underlying.set(underlying);
        self.name.set(name);
        self.symbol.set(symbol);
        self.decimals.set(decimals);
    }

    pub fn name(&self) -> String {
        self.name.get_or_default()
    }

    pub fn symbol(&self) -> String {
        self.symbol.get_or_default()
    }

    pub fn decimals(&self) -> u8 {
        self.decimals.get_or_default()
    }

    pub fn underlying(&self) -> Address {
        self.require_initialized();
        self.underlying.get_or_revert_with(WrapperError::NotInitialized)
    }

    // ========== Balances ==========

    pub fn total_supply(&self) -> U256 {
        let policy = self.policy();
        self.revert_on(policy.to_external(self.ledger.total_units()))
    }

    /// Total shares, including the retained ones.
    pub fn scaled_total_supply(&self) -> U256 {
        self.ledger.total_units()
    }

    pub fn balance_of(&self, account: Address) -> U256 {
        let policy = self.policy();
        self.revert_on(policy.to_external(self.ledger.units_of(account)))
    }

    /// Shares held by `account`.
    pub fn scaled_balance_of(&self, account: Address) -> U256 {
        self.ledger.units_of(account)
    }

    /// Underlying redeemable for the shares of `account`.
    pub fn balance_of_underlying(&self, account: Address) -> U256 {
        self.balance_of(account)
    }

    /// Underlying currently held by the vault.
    pub fn total_underlying(&self) -> U256 {
        self.pooled()
    }

    pub fn allowance(&self, owner: Address, spender: Address) -> U256 {
        self.ledger.allowance(owner, spender)
    }

    pub fn underlying_to_shares(&self, amount: U256) -> U256 {
        self.revert_on(self.policy().to_shares(amount))
    }

    pub fn shares_to_underlying(&self, shares: U256) -> U256 {
        self.revert_on(self.policy().to_underlying(shares))
    }

    pub fn initial_rate(&self) -> U256 {
        U256::from(INITIAL_RATE)
    }

    pub fn minimum_deposit(&self) -> U256 {
        U256::from(MINIMUM_DEPOSIT)
    }

    pub fn retained_shares(&self) -> U256 {
        U256::from(RETAINED_SHARES)
    }

    // ========== Deposit / withdraw ==========

    /// Deposits `amount` underlying and returns the shares minted.
    pub fn deposit(&mut self, amount: U256) -> U256 {
        let caller = self.env().caller();
        self.deposit_for(caller, amount)
    }

    pub fn deposit_for(&mut self, to: Address, amount: U256) -> U256 {
        self.require_initialized();
        self.check_recipient(to);
        let held = self.ledger.units_of(to);
        let quote = self.revert_on(self.policy().deposit(amount, held));
        self.credit_and_pull(to, quote).units
    }

    /// Withdraws `amount` underlying and returns the shares burned.
    pub fn withdraw(&mut self, amount: U256) -> U256 {
        let caller = self.env().caller();
        self.withdraw_to(caller, amount)
    }

    pub fn withdraw_to(&mut self, to: Address, amount: U256) -> U256 {
        self.require_initialized();
        self.check_recipient(to);
        let from = self.env().caller();
        let quote = self.revert_on(self.policy().withdraw(amount, self.ledger.units_of(from)));
        self.debit_and_push(from, to, quote).units
    }

    /// Redeems every share of the caller and returns the shares burned.
    pub fn withdraw_all(&mut self) -> U256 {
        let caller = self.env().caller();
        self.withdraw_all_to(caller)
    }

    pub fn withdraw_all_to(&mut self, to: Address) -> U256 {
        self.redeem_all(to).units
    }

    /// Mints exactly `shares` and returns the underlying pulled.
    pub fn mint(&mut self, shares: U256) -> U256 {
        let caller = self.env().caller();
        self.mint_for(caller, shares)
    }

    pub fn mint_for(&mut self, to: Address, shares: U256) -> U256 {
        self.require_initialized();
        self.check_recipient(to);
        let held = self.ledger.units_of(to);
        let quote = self.revert_on(self.policy().mint(shares, held));
        self.credit_and_pull(to, quote).amount
    }

    /// Burns exactly `shares` and returns the underlying sent.
    pub fn burn(&mut self, shares: U256) -> U256 {
        let caller = self.env().caller();
        self.burn_to(caller, shares)
    }

    pub fn burn_to(&mut self, to: Address, shares: U256) -> U256 {
        self.require_initialized();
        self.check_recipient(to);
        let from = self.env().caller();
        let quote = self.revert_on(self.policy().burn(shares, self.ledger.units_of(from)));
        self.debit_and_push(from, to, quote).amount
    }

    /// Burns every share of the caller and returns the underlying sent.
    pub fn burn_all(&mut self) -> U256 {
        let caller = self.env().caller();
        self.burn_all_to(caller)
    }

    pub fn burn_all_to(&mut self, to: Address) -> U256 {
        self.redeem_all(to).amount
    }

    // ========== Transfers ==========

    /// Moves `amount` of underlying-denominated balance.
    pub fn transfer(&mut self, recipient: Address, amount: U256) -> bool {
        self.require_initialized();
        self.check_recipient(recipient);
        let sender = self.env().caller();
        self.transfer_internal(sender, recipient, amount);
        true
    }

    pub fn transfer_from(&mut self, owner: Address, recipient: Address, amount: U256) -> bool {
        self.require_initialized();
        self.check_recipient(recipient);
        let spender = self.env().caller();
        let env = self.env();
        or_revert(&env, self.ledger.spend_allowance(owner, spender, amount));
        self.transfer_internal(owner, recipient, amount);
        true
    }

    pub fn transfer_all(&mut self, recipient: Address) -> bool {
        self.require_initialized();
        self.check_recipient(recipient);
        let sender = self.env().caller();
        self.transfer_all_internal(sender, recipient);
        true
    }

    pub fn transfer_all_from(&mut self, owner: Address, recipient: Address) -> bool {
        self.require_initialized();
        self.check_recipient(recipient);
        let spender = self.env().caller();
        let amount = self.balance_of(owner);
        let env = self.env();
        or_revert(&env, self.ledger.spend_allowance(owner, spender, amount));
        self.transfer_all_internal(owner, recipient);
        true
    }

    pub fn approve(&mut self, spender: Address, amount: U256) -> bool {
        let owner = self.env().caller();
        self.approve_internal(owner, spender, amount);
        true
    }

    pub fn increase_allowance(&mut self, spender: Address, added: U256) -> bool {
        let owner = self.env().caller();
        let amount = self.ledger.allowance(owner, spender).saturating_add(added);
        self.approve_internal(owner, spender, amount);
        true
    }

    pub fn decrease_allowance(&mut self, spender: Address, subtracted: U256) -> bool {
        let owner = self.env().caller();
        let amount = self.ledger.allowance(owner, spender).saturating_sub(subtracted);
        self.approve_internal(owner, spender, amount);
        true
    }
}

impl VaultWrapper {
    fn pooled(&self) -> U256 {
        AssetVault::held(&self.env(), self.underlying())
    }

    fn policy(&self) -> UnderlyingRatio {
        if !self.initialized.get_or_default() {
            return UnderlyingRatio::new(U256::zero(), U256::zero());
        }
        UnderlyingRatio::new(self.pooled(), self.ledger.total_units())
    }

    fn revert_on<T>(&self, result: Result<T, WrapperError>) -> T {
        or_revert(&self.env(), result)
    }

    fn require_initialized(&self) {
        if !self.initialized.get_or_default() {
            self.env().revert(WrapperError::NotInitialized);
        }
    }

    fn check_recipient(&self, to: Address) {
        if to == Address::Account(AccountHash::default()) || to == self.env().self_address() {
            self.env().revert(WrapperError::InvalidRecipient);
        }
    }

    fn credit_and_pull(&mut self, to: Address, quote: Quote) -> Quote {
        let env = self.env();
        or_revert(&env, self.ledger.mint(to, quote.units));
        if !quote.retained.is_zero() {
            // Locked with the vault for good.
            or_revert(&env, self.ledger.mint(env.self_address(), quote.retained));
        }
        env.emit_event(Transfer { from: None, to: Some(to), amount: quote.external });

        let underlying = self.underlying();
        or_revert(&env, AssetVault::pull(&env, underlying, env.caller(), quote.amount));
        quote
    }

    fn debit_and_push(&mut self, from: Address, to: Address, quote: Quote) -> Quote {
        let env = self.env();
        or_revert(&env, self.ledger.burn(from, quote.units));
        env.emit_event(Transfer { from: Some(from), to: None, amount: quote.external });

        let underlying = self.underlying();
        or_revert(&env, AssetVault::push(&env, underlying, to, quote.amount));
        quote
    }

    fn redeem_all(&mut self, to: Address) -> Quote {
        self.require_initialized();
        self.check_recipient(to);
        let from = self.env().caller();
        let quote = self.revert_on(self.policy().redeem_all(self.ledger.units_of(from)));
        self.debit_and_push(from, to, quote)
    }

    fn transfer_internal(&mut self, from: Address, to: Address, amount: U256) {
        let env = self.env();
        let units = or_revert(
            &env,
            self.policy()
                .transfer_units(self.ledger.units_of(from), self.ledger.units_of(to), amount),
        );
        or_revert(&env, self.ledger.move_units(from, to, units));
        env.emit_event(Transfer { from: Some(from), to: Some(to), amount });
    }

    fn transfer_all_internal(&mut self, from: Address, to: Address) {
        let env = self.env();
        let units = self.ledger.units_of(from);
        let amount = self.revert_on(self.policy().to_external(units));
        or_revert(&env, self.ledger.move_units(from, to, units));
        env.emit_event(Transfer { from: Some(from), to: Some(to), amount });
    }

    fn approve_internal(&mut self, owner: Address, spender: Address, amount: U256) {
        self.ledger.set_allowance(owner, spender, amount);
        self.env().emit_event(Approval { owner, spender, amount });
    }
}
