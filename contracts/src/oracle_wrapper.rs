//! Oracle-priced elastic wrapper.
//!
//! Wraps a CEP-18 collateral token and exposes a balance denominated in the
//! collateral's price: `balance = collateral × price / 10^8`. Balances are
//! stored as bits (see [`crate::conversion`]) so a price change rebases every
//! holder at once without touching storage.
//!
//! Every state-changing entry point first runs a lazy rebase. Deposits and
//! mints are blocked while the feed is frozen; withdrawals, burns and
//! transfers keep working at the last good price.

use odra::prelude::*;
use odra::casper_types::account::AccountHash;
use odra::casper_types::U256;
use crate::asset::AssetVault;
use crate::conversion::{
    bits_per_collateral, max_collateral, max_price, max_supply, ConversionPolicy, OraclePriced, Quote,
};
use crate::errors::{or_revert, WrapperError};
use crate::events::{
    Approval, FeedFrozen, MinUpdateIntervalUpdated, OwnershipTransferred, PriceOracleUpdated, Rebase,
    Transfer,
};
use crate::ledger::ScaledLedger;
use crate::rebase::RebaseController;
use crate::types::{PriceState, StaleFeedPolicy};

#[odra::module(events = [
    Transfer,
    Approval,
    Rebase,
    PriceOracleUpdated,
    FeedFrozen,
    MinUpdateIntervalUpdated,
    OwnershipTransferred
])]
pub struct OracleWrapper {
    initialized: Var<bool>,
    /// Account allowed to replace the feed and the update interval
    owner: Var<Address>,
    /// Collateral token
    underlying: Var<Address>,
    name: Var<String>,
    symbol: Var<String>,
    /// Copied from the collateral token
    decimals: Var<u8>,
    ledger: SubModule<ScaledLedger>,
    controller: SubModule<RebaseController>,
}

#[odra::module]
impl OracleWrapper {
    /// One-time setup of a blank instance. The caller becomes the owner.
    pub fn initialize(
        &mut self,
        underlying: Address,
        name: String,
        symbol: String,
        oracle: Address,
        stale_feed_policy: StaleFeedPolicy,
    ) {
        if self.initialized.get_or_default() {
            self.env().revert(WrapperError::AlreadyInitialized);
        }
        let env = self.env();
        or_revert(&env, self.controller.configure(oracle, stale_feed_policy));

        self.initialized.set(true);
        self.owner.set(env.caller());
        self.underlying.set(underlying);
        self.name.set(name);
        self.symbol.set(symbol);
        self.decimals.set(AssetVault::decimals(&env, underlying));
    }

    // ========== Metadata ==========

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

    pub fn owner(&self) -> Address {
        self.owner.get_or_revert_with(WrapperError::NotInitialized)
    }

    // ========== Price state ==========

    pub fn price_oracle(&self) -> Option<Address> {
        self.controller.oracle()
    }

    pub fn last_price(&self) -> U256 {
        self.controller.last_price()
    }

    pub fn last_price_update_timestamp_sec(&self) -> u64 {
        self.controller.last_update_sec()
    }

    pub fn min_price_update_interval_sec(&self) -> u64 {
        self.controller.min_interval_sec()
    }

    pub fn epoch(&self) -> u64 {
        self.controller.epoch()
    }

    pub fn is_frozen(&self) -> bool {
        self.controller.is_frozen()
    }

    pub fn stale_feed_policy(&self) -> StaleFeedPolicy {
        self.controller.policy()
    }

    pub fn price_state(&self) -> PriceState {
        self.controller.state()
    }

    /// Price balances are quoted at: the feed's value once the interval has
    /// passed, otherwise the last accepted price.
    pub fn effective_price(&self) -> U256 {
        self.controller.effective_price()
    }

    // ========== Balances ==========

    pub fn total_supply(&self) -> U256 {
        let policy = self.quote_policy();
        self.revert_on(policy.to_external(self.ledger.total_units()))
    }

    /// Total bits.
    pub fn scaled_total_supply(&self) -> U256 {
        self.ledger.total_units()
    }

    pub fn balance_of(&self, account: Address) -> U256 {
        let policy = self.quote_policy();
        self.revert_on(policy.to_external(self.ledger.units_of(account)))
    }

    /// Bits held by `account`.
    pub fn scaled_balance_of(&self, account: Address) -> U256 {
        self.ledger.units_of(account)
    }

    /// Collateral redeemable by `account`, rounded down.
    pub fn balance_of_underlying(&self, account: Address) -> U256 {
        self.ledger.units_of(account) / bits_per_collateral()
    }

    /// Collateral backing the whole supply, rounded down.
    pub fn total_underlying(&self) -> U256 {
        self.ledger.total_units() / bits_per_collateral()
    }

    pub fn allowance(&self, owner: Address, spender: Address) -> U256 {
        self.ledger.allowance(owner, spender)
    }

    /// External amount `collateral` is worth at the effective price.
    pub fn exchange_rate(&self, collateral: U256) -> U256 {
        self.revert_on(self.quote_policy().exchange_rate(collateral))
    }

    pub fn max_collateral(&self) -> U256 {
        max_collateral()
    }

    pub fn max_price(&self) -> U256 {
        max_price()
    }

    pub fn max_supply(&self) -> U256 {
        max_supply()
    }

    // ========== Owner ==========

    /// Switches the price feed. The new feed must report valid data.
    pub fn update_oracle(&mut self, oracle: Address) {
        self.require_owner();
        let env = self.env();
        or_revert(&env, self.controller.replace_oracle(oracle));
    }

    pub fn set_min_update_interval_sec(&mut self, interval_sec: u64) {
        self.require_owner();
        self.controller.set_min_interval(interval_sec);
    }

    pub fn transfer_ownership(&mut self, new_owner: Address) {
        self.require_owner();
        let previous_owner = self.owner();
        self.owner.set(new_owner);
        self.env().emit_event(OwnershipTransferred { previous_owner, new_owner });
    }

    // ========== Rebase ==========

    /// Pulls a fresh price from the feed.
    pub fn rebase(&mut self) {
        self.require_initialized();
        let env = self.env();
        or_revert(&env, self.controller.rebase());
    }

    // ========== Deposit / withdraw ==========

    /// Deposits `collateral` and returns the external amount credited.
    pub fn deposit(&mut self, collateral: U256) -> U256 {
        let caller = self.env().caller();
        self.deposit_for(caller, collateral)
    }

    pub fn deposit_for(&mut self, to: Address, collateral: U256) -> U256 {
        self.prepare(true);
        self.check_recipient(to);
        let held = self.ledger.units_of(to);
        let quote = self.revert_on(self.policy().deposit(collateral, held));
        self.credit_and_pull(to, quote).external
    }

    /// Withdraws `collateral` and returns the external amount debited.
    pub fn withdraw(&mut self, collateral: U256) -> U256 {
        let caller = self.env().caller();
        self.withdraw_to(caller, collateral)
    }

    pub fn withdraw_to(&mut self, to: Address, collateral: U256) -> U256 {
        self.prepare(false);
        self.check_recipient(to);
        let from = self.env().caller();
        let quote = self.revert_on(self.policy().withdraw(collateral, self.ledger.units_of(from)));
        self.debit_and_push(from, to, quote).external
    }

    /// Redeems the caller's whole balance and returns the external amount debited.
    pub fn withdraw_all(&mut self) -> U256 {
        let caller = self.env().caller();
        self.withdraw_all_to(caller)
    }

    pub fn withdraw_all_to(&mut self, to: Address) -> U256 {
        self.redeem_all(to).external
    }

    /// Mints exactly `amount` external tokens and returns the collateral pulled.
    pub fn mint(&mut self, amount: U256) -> U256 {
        let caller = self.env().caller();
        self.mint_for(caller, amount)
    }

    pub fn mint_for(&mut self, to: Address, amount: U256) -> U256 {
        self.prepare(true);
        self.check_recipient(to);
        let held = self.ledger.units_of(to);
        let quote = self.revert_on(self.policy().mint(amount, held));
        self.credit_and_pull(to, quote).amount
    }

    /// Burns exactly `amount` external tokens and returns the collateral sent.
    pub fn burn(&mut self, amount: U256) -> U256 {
        let caller = self.env().caller();
        self.burn_to(caller, amount)
    }

    pub fn burn_to(&mut self, to: Address, amount: U256) -> U256 {
        self.prepare(false);
        self.check_recipient(to);
        let from = self.env().caller();
        let quote = self.revert_on(self.policy().burn(amount, self.ledger.units_of(from)));
        self.debit_and_push(from, to, quote).amount
    }

    /// Burns the caller's whole balance and returns the collateral sent.
    pub fn burn_all(&mut self) -> U256 {
        let caller = self.env().caller();
        self.burn_all_to(caller)
    }

    pub fn burn_all_to(&mut self, to: Address) -> U256 {
        self.redeem_all(to).amount
    }

    // ========== Transfers ==========

    pub fn transfer(&mut self, recipient: Address, amount: U256) -> bool {
        self.prepare(false);
        self.check_recipient(recipient);
        let sender = self.env().caller();
        self.transfer_internal(sender, recipient, amount);
        true
    }

    pub fn transfer_from(&mut self, owner: Address, recipient: Address, amount: U256) -> bool {
        self.prepare(false);
        self.check_recipient(recipient);
        let spender = self.env().caller();
        let env = self.env();
        or_revert(&env, self.ledger.spend_allowance(owner, spender, amount));
        self.transfer_internal(owner, recipient, amount);
        true
    }

    /// Moves every bit the caller holds.
    pub fn transfer_all(&mut self, recipient: Address) -> bool {
        self.prepare(false);
        self.check_recipient(recipient);
        let sender = self.env().caller();
        self.transfer_all_internal(sender, recipient);
        true
    }

    pub fn transfer_all_from(&mut self, owner: Address, recipient: Address) -> bool {
        self.prepare(false);
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

impl OracleWrapper {
    fn policy(&self) -> OraclePriced {
        OraclePriced::new(self.controller.last_price(), self.ledger.total_units())
    }

    /// Read-only counterpart of `policy` for views.
    fn quote_policy(&self) -> OraclePriced {
        OraclePriced::new(self.controller.effective_price(), self.ledger.total_units())
    }

    fn revert_on<T>(&self, result: Result<T, WrapperError>) -> T {
        or_revert(&self.env(), result)
    }

    fn require_initialized(&self) {
        if !self.initialized.get_or_default() {
            self.env().revert(WrapperError::NotInitialized);
        }
    }

    fn require_owner(&self) {
        self.require_initialized();
        if self.env().caller() != self.owner() {
            self.env().revert(WrapperError::Unauthorized);
        }
    }

    /// Lazy rebase, then the frozen-feed gate for calls that add collateral.
    fn prepare(&mut self, adds_collateral: bool) {
        self.require_initialized();
        self.controller.sync();
        if adds_collateral && self.controller.is_frozen() {
            self.env().revert(WrapperError::FeedFrozen);
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
        self.prepare(false);
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
