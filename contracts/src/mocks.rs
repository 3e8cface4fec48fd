//! Test doubles for the external contracts the wrappers talk to.

use odra::prelude::*;
use odra::casper_types::U256;
use odra::ContractRef;
use crate::errors::WrapperError;

/// Price feed returning whatever it was last told to.
#[odra::module]
pub struct MockPriceFeed {
    value: Var<U256>,
    valid: Var<bool>,
}

#[odra::module]
impl MockPriceFeed {
    pub fn init(&mut self, value: U256, valid: bool) {
        self.set_data(value, valid);
    }

    pub fn set_data(&mut self, value: U256, valid: bool) {
        self.value.set(value);
        self.valid.set(valid);
    }

    pub fn get_data(&mut self) -> (U256, bool) {
        (self.value.get_or_default(), self.valid.get_or_default())
    }
}

/// Read-only view a [`MockAsset`] probes during transfers.
#[odra::external_contract]
pub trait ScaledBalanceSource {
    fn scaled_balance_of(&self, account: Address) -> U256;
}

/// Minimal CEP-18 token with free minting and burning.
///
/// `mint`/`burn` against a holder simulate a rebase of that holder's balance.
/// A flat transfer fee and a balance probe are available for wrapper tests.
#[odra::module]
pub struct MockAsset {
    name: Var<String>,
    symbol: Var<String>,
    decimals: Var<u8>,
    total_supply: Var<U256>,
    balances: Mapping<Address, U256>,
    allowances: Mapping<(Address, Address), U256>,
    /// Withheld from every `transfer_from`
    transfer_fee: Var<U256>,
    probe_target: Var<Option<Address>>,
    probe_account: Var<Option<Address>>,
    probed: Var<Option<U256>>,
}

#[odra::module]
impl MockAsset {
    pub fn init(&mut self, name: String, symbol: String, decimals: u8) {
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

    pub fn total_supply(&self) -> U256 {
        self.total_supply.get_or_default()
    }

    pub fn balance_of(&self, account: Address) -> U256 {
        self.balances.get(&account).unwrap_or_default()
    }

    pub fn allowance(&self, owner: Address, spender: Address) -> U256 {
        self.allowances.get(&(owner, spender)).unwrap_or_default()
    }

    pub fn mint(&mut self, to: Address, amount: U256) {
        self.balances.set(&to, self.balance_of(to) + amount);
        self.total_supply.set(self.total_supply() + amount);
    }

    pub fn burn(&mut self, from: Address, amount: U256) {
        let balance = self.balance_of(from);
        if amount > balance {
            self.env().revert(WrapperError::InsufficientBalance);
        }
        self.balances.set(&from, balance - amount);
        self.total_supply.set(self.total_supply() - amount);
    }

    pub fn approve(&mut self, spender: Address, amount: U256) -> bool {
        let owner = self.env().caller();
        self.allowances.set(&(owner, spender), amount);
        true
    }

    pub fn transfer(&mut self, recipient: Address, amount: U256) -> bool {
        let sender = self.env().caller();
        self.run_probe();
        self.move_balance(sender, recipient, amount, U256::zero());
        true
    }

    pub fn transfer_from(&mut self, owner: Address, recipient: Address, amount: U256) -> bool {
        let spender = self.env().caller();
        let allowance = self.allowance(owner, spender);
        if amount > allowance {
            self.env().revert(WrapperError::InsufficientAllowance);
        }
        self.allowances.set(&(owner, spender), allowance - amount);
        self.run_probe();
        let fee = self.transfer_fee.get_or_default().min(amount);
        self.move_balance(owner, recipient, amount, fee);
        true
    }

    pub fn set_transfer_fee(&mut self, fee: U256) {
        self.transfer_fee.set(fee);
    }

    /// Records `target.scaled_balance_of(account)` on every later transfer.
    pub fn set_probe(&mut self, target: Address, account: Address) {
        self.probe_target.set(Some(target));
        self.probe_account.set(Some(account));
    }

    pub fn probed(&self) -> Option<U256> {
        self.probed.get().flatten()
    }
}

impl MockAsset {
    fn move_balance(&mut self, from: Address, to: Address, amount: U256, fee: U256) {
        let balance = self.balance_of(from);
        if amount > balance {
            self.env().revert(WrapperError::InsufficientBalance);
        }
        self.balances.set(&from, balance - amount);
        self.balances.set(&to, self.balance_of(to) + amount - fee);
        self.total_supply.set(self.total_supply() - fee);
    }

    fn run_probe(&mut self) {
        let (Some(target), Some(account)) =
            (self.probe_target.get().flatten(), self.probe_account.get().flatten())
        else {
            return;
        };
        let seen = ScaledBalanceSourceContractRef::new(self.env(), target).scaled_balance_of(account);
        self.probed.set(Some(seen));
    }
}
