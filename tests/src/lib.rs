//! Elastic Wrapper Integration Tests
//!
//! Contracts run on the Odra test VM against mock assets and price feeds.

#[cfg(test)]
mod fixtures;


#[cfg(test)]
mod vault_wrapper;
