//! Price feed interface.

use odra::prelude::*;
use odra::casper_types::U256;

/// A price source with 8 decimals.
///
/// `get_data` returns the latest value and whether it is usable. Feeds report
/// staleness through the flag; a zero value is never usable.
#[odra::external_contract]
pub trait PriceFeed {
    fn get_data(&mut self) -> (U256, bool);
}
