//! Common types shared by the wrapper contracts.

use odra::prelude::*;
use odra::casper_types::U256;

/// What a rebase does when the feed reports invalid data.
#[odra::odra_type]
#[derive(Copy, Default)]
pub enum StaleFeedPolicy {
    /// Reject the rebase, leaving the price untouched
    #[default]
    Revert,
    /// Keep the last good price and block deposit/mint until a valid read
    Freeze,
}

/// Snapshot of the oracle-priced conversion state.
#[odra::odra_type]
pub struct PriceState {
    /// Last accepted price (8 decimals)
    pub price: U256,
    /// Block time of the last accepted price, in seconds
    pub last_update_sec: u64,
    /// Number of accepted rebases
    pub epoch: u64,
    /// Whether the feed is currently frozen
    pub frozen: bool,
}
