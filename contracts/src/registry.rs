//! Registry of deployed wrappers, one per underlying token.

use odra::prelude::*;
use odra::ContractRef;
use crate::errors::{or_revert, WrapperError};
use crate::events::{OwnershipTransferred, WrapperAdded, WrapperRemoved};

/// Anything that wraps a single underlying token.
#[odra::external_contract]
pub trait WrappedToken {
    fn underlying(&self) -> Address;
}

/// Owner-managed enumerable map between underlying tokens and their wrappers.
#[odra::module(events = [WrapperAdded, WrapperRemoved, OwnershipTransferred])]
pub struct WrapperRegistry {
    owner: Var<Address>,
    /// Number of registered pairs
    count: Var<u32>,
    /// Underlying token at each index
    underlyings: Mapping<u32, Address>,
    /// Index + 1 of each registered underlying, 0 once removed
    positions: Mapping<Address, u32>,
    /// Underlying -> wrapper
    wrapper_of: Mapping<Address, Option<Address>>,
    /// Wrapper -> underlying
    underlying_of: Mapping<Address, Option<Address>>,
}

#[odra::module]
impl WrapperRegistry {
    pub fn init(&mut self, owner: Address) {
        self.owner.set(owner);
    }

    /// Registers `wrapper` under the token it reports as underlying.
    /// Returns `false` if that underlying already has a wrapper.
    pub fn add_wrapper(&mut self, wrapper: Address) -> bool {
        self.require_owner();
        let underlying = WrappedTokenContractRef::new(self.env(), wrapper).underlying();
        if self.position_of(underlying) != 0 {
            return false;
        }

        let index = self.num_wrappers();
        self.underlyings.set(&index, underlying);
        self.positions.set(&underlying, index + 1);
        self.wrapper_of.set(&underlying, Some(wrapper));
        self.underlying_of.set(&wrapper, Some(underlying));
        self.count.set(index + 1);

        self.env().emit_event(WrapperAdded { underlying, wrapper });
        true
    }

    /// Drops the wrapper of `underlying`. Returns `false` if none is registered.
    pub fn remove_wrapper(&mut self, underlying: Address) -> bool {
        self.require_owner();
        let position = self.position_of(underlying);
        let Some(wrapper) = self.get_wrapper_from_underlying(underlying) else {
            return false;
        };

        // Swap the last entry into the freed slot.
        let last = self.num_wrappers() - 1;
        let index = position - 1;
        if index != last {
            if let Some(moved) = self.underlyings.get(&last) {
                self.underlyings.set(&index, moved);
                self.positions.set(&moved, position);
            }
        }
        self.count.set(last);
        self.positions.set(&underlying, 0);
        self.wrapper_of.set(&underlying, None);
        self.underlying_of.set(&wrapper, None);

        self.env().emit_event(WrapperRemoved { underlying, wrapper });
        true
    }

    pub fn num_wrappers(&self) -> u32 {
        self.count.get_or_default()
    }

    /// `(underlying, wrapper)` at `index`.
    pub fn wrapper_at(&self, index: u32) -> (Address, Address) {
        if index >= self.num_wrappers() {
            self.env().revert(WrapperError::IndexOutOfRange);
        }
        let env = self.env();
        let underlying = or_revert(
            &env,
            self.underlyings.get(&index).ok_or(WrapperError::IndexOutOfRange),
        );
        let wrapper = or_revert(
            &env,
            self.get_wrapper_from_underlying(underlying).ok_or(WrapperError::IndexOutOfRange),
        );
        (underlying, wrapper)
    }

    pub fn get_wrapper_from_underlying(&self, underlying: Address) -> Option<Address> {
        self.wrapper_of.get(&underlying).flatten()
    }

    pub fn get_underlying_from_wrapper(&self, wrapper: Address) -> Option<Address> {
        self.underlying_of.get(&wrapper).flatten()
    }

    pub fn owner(&self) -> Address {
        self.owner.get_or_revert_with(WrapperError::NotInitialized)
    }

    pub fn transfer_ownership(&mut self, new_owner: Address) {
        self.require_owner();
        let previous_owner = self.owner();
        self.owner.set(new_owner);
        self.env().emit_event(OwnershipTransferred { previous_owner, new_owner });
    }
}

impl WrapperRegistry {
    /// Index + 1 of `underlying`, or 0 when unregistered.
    fn position_of(&self, underlying: Address) -> u32 {
        self.positions.get(&underlying).unwrap_or_default()
    }

    fn require_owner(&self) {
        if self.env().caller() != self.owner() {
            self.env().revert(WrapperError::Unauthorized);
        }
    }
}
