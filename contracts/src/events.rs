//! Events emitted by the wrapper contracts.

use odra::prelude::*;
use odra::casper_types::U256;

/// Ledger movement. `from: None` is a mint, `to: None` is a burn.
#[odra::event]
pub struct Transfer {
    pub from: Option<Address>,
    pub to: Option<Address>,
    pub amount: U256,
}

#[odra::event]
pub struct Approval {
    pub owner: Address,
    pub spender: Address,
    pub amount: U256,
}

/// A new price was accepted.
#[odra::event]
pub struct Rebase {
    pub epoch: u64,
    pub price: U256,
}

#[odra::event]
pub struct PriceOracleUpdated {
    pub oracle: Address,
}

/// The feed went invalid and the last good price is being held.
#[odra::event]
pub struct FeedFrozen {
    pub epoch: u64,
    pub last_price: U256,
}

#[odra::event]
pub struct MinUpdateIntervalUpdated {
    pub interval_sec: u64,
}

#[odra::event]
pub struct OwnershipTransferred {
    pub previous_owner: Address,
    pub new_owner: Address,
}

#[odra::event]
pub struct WrapperAdded {
    pub underlying: Address,
    pub wrapper: Address,
}

#[odra::event]
pub struct WrapperRemoved {
    pub underlying: Address,
    pub wrapper: Address,
}
