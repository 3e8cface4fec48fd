//! Rebase controller for the oracle-priced wrapper.
//!
//! Holds the last accepted price and the feed it came from. A new price is
//! accepted at most once per `min_interval_sec`; each acceptance bumps the
//! epoch and emits [`Rebase`]. When the feed reports invalid data the
//! configured [`StaleFeedPolicy`] decides between rejecting the call and
//! freezing at the last good price.

use odra::prelude::*;
use odra::casper_types::U256;
use odra::{ContractEnv, ContractRef};
use crate::conversion::{max_price, DEFAULT_MIN_UPDATE_INTERVAL_SEC};
use crate::errors::WrapperError;
use crate::events::{FeedFrozen, MinUpdateIntervalUpdated, PriceOracleUpdated, Rebase};
use crate::feed::PriceFeedContractRef;
use crate::types::{PriceState, StaleFeedPolicy};

#[odra::module]
pub struct RebaseController {
    /// Active price feed
    oracle: Var<Address>,
    /// Last accepted price (8 decimals)
    last_price: Var<U256>,
    /// Block time of the last accepted price, in seconds
    last_update_sec: Var<u64>,
    /// Minimum seconds between accepted prices
    min_interval_sec: Var<u64>,
    /// Number of accepted prices
    epoch: Var<u64>,
    /// Reaction to invalid feed data
    policy: Var<StaleFeedPolicy>,
    /// Set while the feed is invalid under the Freeze policy
    frozen: Var<bool>,
}

#[odra::module]
impl RebaseController {
    pub fn oracle(&self) -> Option<Address> {
        self.oracle.get()
    }

    pub fn last_price(&self) -> U256 {
        self.last_price.get_or_default()
    }

    pub fn last_update_sec(&self) -> u64 {
        self.last_update_sec.get_or_default()
    }

    pub fn min_interval_sec(&self) -> u64 {
        self.min_interval_sec.get().unwrap_or(DEFAULT_MIN_UPDATE_INTERVAL_SEC)
    }

    pub fn epoch(&self) -> u64 {
        self.epoch.get_or_default()
    }

    pub fn policy(&self) -> StaleFeedPolicy {
        self.policy.get_or_default()
    }

    pub fn is_frozen(&self) -> bool {
        self.frozen.get_or_default()
    }

    pub fn state(&self) -> PriceState {
        PriceState {
            price: self.last_price(),
            last_update_sec: self.last_update_sec(),
            epoch: self.epoch(),
            frozen: self.is_frozen(),
        }
    }
}

impl RebaseController {
    /// Installs the first feed and accepts its price.
    pub fn configure(&mut self, oracle: Address, policy: StaleFeedPolicy) -> Result<(), WrapperError> {
        let price = Self::read_feed(&self.env(), oracle).ok_or(WrapperError::InvalidFeedData)?;
        self.oracle.set(oracle);
        self.policy.set(policy);
        self.min_interval_sec.set(DEFAULT_MIN_UPDATE_INTERVAL_SEC);
        self.env().emit_event(PriceOracleUpdated { oracle });
        self.apply(price);
        Ok(())
    }

    /// Explicit rebase. Fails inside the minimum interval.
    pub fn rebase(&mut self) -> Result<(), WrapperError> {
        if !self.interval_elapsed() {
            return Err(WrapperError::RebaseTooSoon);
        }
        match self.read_active_feed() {
            Some(price) => {
                self.apply(price);
                Ok(())
            }
            None => match self.policy() {
                StaleFeedPolicy::Revert => Err(WrapperError::InvalidFeedData),
                StaleFeedPolicy::Freeze => {
                    self.freeze();
                    Ok(())
                }
            },
        }
    }

    /// Price the next lazy sync would settle on. Stores nothing.
    pub fn effective_price(&self) -> U256 {
        if self.interval_elapsed() {
            if let Some(price) = self.read_active_feed() {
                return price.min(max_price());
            }
        }
        self.last_price()
    }

    /// Lazy rebase run ahead of state-changing calls. Never fails.
    pub fn sync(&mut self) {
        if !self.interval_elapsed() {
            return;
        }
        match self.read_active_feed() {
            Some(price) => self.apply(price),
            None => {
                if self.policy() == StaleFeedPolicy::Freeze {
                    self.freeze();
                }
            }
        }
    }

    /// Switches to `oracle` and accepts its price immediately.
    pub fn replace_oracle(&mut self, oracle: Address) -> Result<(), WrapperError> {
        let price = Self::read_feed(&self.env(), oracle).ok_or(WrapperError::InvalidFeedData)?;
        self.oracle.set(oracle);
        self.env().emit_event(PriceOracleUpdated { oracle });
        self.apply(price);
        Ok(())
    }

    pub fn set_min_interval(&mut self, interval_sec: u64) {
        self.min_interval_sec.set(interval_sec);
        self.env().emit_event(MinUpdateIntervalUpdated { interval_sec });
    }

    fn now_sec(&self) -> u64 {
        self.env().get_block_time() / 1000
    }

    fn interval_elapsed(&self) -> bool {
        self.now_sec() >= self.last_update_sec().saturating_add(self.min_interval_sec())
    }

    fn read_active_feed(&self) -> Option<U256> {
        let oracle = self.oracle()?;
        Self::read_feed(&self.env(), oracle)
    }

    fn read_feed(env: &Rc<ContractEnv>, oracle: Address) -> Option<U256> {
        let mut feed = PriceFeedContractRef::new(env.clone(), oracle);
        let (value, valid) = feed.get_data();
        if valid && !value.is_zero() {
            Some(value)
        } else {
            None
        }
    }

    fn apply(&mut self, price: U256) {
        let price = price.min(max_price());
        let epoch = self.epoch() + 1;
        self.last_price.set(price);
        self.last_update_sec.set(self.now_sec());
        self.epoch.set(epoch);
        self.frozen.set(false);
        self.env().emit_event(Rebase { epoch, price });
    }

    fn freeze(&mut self) {
        if self.is_frozen() {
            return;
        }
        self.frozen.set(true);
        self.env().emit_event(FeedFrozen {
            epoch: self.epoch(),
            last_price: self.last_price(),
        });
    }
}
