//! Underlying CEP-18 asset access.
//!
//! Pulls are checked against the wrapper's own balance so that fee-on-transfer
//! or otherwise short-paying assets are rejected instead of over-crediting.

use odra::prelude::*;
use odra::casper_types::U256;
use odra::{ContractEnv, ContractRef};
use crate::errors::WrapperError;

/// CEP-18 interface of the wrapped asset.
#[odra::external_contract]
pub trait Cep18Asset {
    fn decimals(&self) -> u8;
    fn balance_of(&self, account: Address) -> U256;
    fn transfer(&mut self, recipient: Address, amount: U256) -> bool;
    fn transfer_from(&mut self, owner: Address, recipient: Address, amount: U256) -> bool;
}

/// Helpers over [`Cep18Asset`] for the wrapper contracts.
pub struct AssetVault;

impl AssetVault {
    fn asset(env: &Rc<ContractEnv>, asset: Address) -> Cep18AssetContractRef {
        Cep18AssetContractRef::new(env.clone(), asset)
    }

    pub fn decimals(env: &Rc<ContractEnv>, asset: Address) -> u8 {
        Self::asset(env, asset).decimals()
    }

    /// Amount of `asset` held by this contract.
    pub fn held(env: &Rc<ContractEnv>, asset: Address) -> U256 {
        Self::asset(env, asset).balance_of(env.self_address())
    }

    /// Moves exactly `amount` from `owner` into this contract.
    pub fn pull(
        env: &Rc<ContractEnv>,
        asset: Address,
        owner: Address,
        amount: U256,
    ) -> Result<(), WrapperError> {
        let before = Self::held(env, asset);
        let ok = Self::asset(env, asset).transfer_from(owner, env.self_address(), amount);
        let after = Self::held(env, asset);
        if !ok || after < before || after - before != amount {
            return Err(WrapperError::AssetTransferFailed);
        }
        Ok(())
    }

    /// Sends `amount` of `asset` from this contract to `recipient`.
    pub fn push(
        env: &Rc<ContractEnv>,
        asset: Address,
        recipient: Address,
        amount: U256,
    ) -> Result<(), WrapperError> {
        if !Self::asset(env, asset).transfer(recipient, amount) {
            return Err(WrapperError::AssetTransferFailed);
        }
        Ok(())
    }
}
