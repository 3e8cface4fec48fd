//! Elastic Wrapper Contracts
//!
//! Elastic-supply wrappers around CEP-18 tokens on Casper.
//!
//! ## Architecture
//!
//! - **OracleWrapper**: balances track `collateral × price`; a price feed
//!   rebases every holder at once
//! - **VaultWrapper**: balances are shares of a rebasing underlying pool,
//!   valued live against the vault's holdings
//! - **ScaledLedger**: internal-unit balances shared by both wrappers
//! - **RebaseController**: feed reads, minimum update interval, stale-feed policy
//! - **WrapperRegistry**: underlying ↔ wrapper directory
//!
//! ## Stale feeds
//!
//! Each oracle wrapper picks a `StaleFeedPolicy` at initialization:
//! - `Revert`: an explicit rebase with invalid feed data fails
//! - `Freeze`: the last good price is kept, deposits and mints are blocked,
//!   withdrawals and transfers continue

#![cfg_attr(target_arch = "wasm32", no_std)]

#[cfg(target_arch = "wasm32")]
extern crate alloc;

// Re-export odra for downstream usage
pub use odra;

// Core module declarations
pub mod types;
pub mod errors;
pub mod events;
pub mod conversion;

// Building blocks
pub mod ledger;
pub mod asset;
pub mod feed;
pub mod rebase;

// Contract modules
pub mod oracle_wrapper;
pub mod vault_wrapper;
pub mod registry;

pub mod mocks;
