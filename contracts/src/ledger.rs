//! Scaled ledger shared by both wrappers.
//!
//! Stores internal units per account and allowances in external units.
//! Converting to visible balances is left to the owning wrapper.

use odra::prelude::*;
use odra::casper_types::U256;
use crate::errors::WrapperError;

/// Internal-unit balances and external-unit allowances.
#[odra::module]
pub struct ScaledLedger {
    /// Sum of all account units
    total_units: Var<U256>,
    /// Units held per account
    units: Mapping<Address, U256>,
    /// Allowances, keyed by (owner, spender)
    allowances: Mapping<(Address, Address), U256>,
}

#[odra::module]
impl ScaledLedger {
    pub fn total_units(&self) -> U256 {
        self.total_units.get_or_default()
    }

    pub fn units_of(&self, account: Address) -> U256 {
        self.units.get(&account).unwrap_or_default()
    }

    pub fn allowance(&self, owner: Address, spender: Address) -> U256 {
        self.allowances.get(&(owner, spender)).unwrap_or_default()
    }
}

impl ScaledLedger {
    pub fn mint(&mut self, account: Address, units: U256) -> Result<(), WrapperError> {
        let total = self
            .total_units()
            .checked_add(units)
            .ok_or(WrapperError::BoundsExceeded)?;
        let held = self.units_of(account) + units;
        self.units.set(&account, held);
        self.total_units.set(total);
        Ok(())
    }

    pub fn burn(&mut self, account: Address, units: U256) -> Result<(), WrapperError> {
        let held = self.units_of(account);
        if units > held {
            return Err(WrapperError::InsufficientBalance);
        }
        self.units.set(&account, held - units);
        self.total_units.set(self.total_units() - units);
        Ok(())
    }

    pub fn move_units(&mut self, from: Address, to: Address, units: U256) -> Result<(), WrapperError> {
        let from_held = self.units_of(from);
        if units > from_held {
            return Err(WrapperError::InsufficientBalance);
        }
        if from == to {
            return Ok(());
        }
        self.units.set(&from, from_held - units);
        self.units.set(&to, self.units_of(to) + units);
        Ok(())
    }

    pub fn set_allowance(&mut self, owner: Address, spender: Address, amount: U256) {
        self.allowances.set(&(owner, spender), amount);
    }

    /// Consumes `amount` of the spender's allowance. `U256::MAX` never decreases.
    pub fn spend_allowance(
        &mut self,
        owner: Address,
        spender: Address,
        amount: U256,
    ) -> Result<(), WrapperError> {
        let current = self.allowance(owner, spender);
        if current == U256::MAX {
            return Ok(());
        }
        if amount > current {
            return Err(WrapperError::InsufficientAllowance);
        }
        self.set_allowance(owner, spender, current - amount);
        Ok(())
    }
}
