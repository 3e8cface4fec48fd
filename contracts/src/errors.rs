//! Wrapper error definitions.

use odra::prelude::*;
use odra::ContractEnv;

/// Errors raised by the wrapper contracts.
#[repr(u16)]
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum WrapperError {
    // Ledger errors (1xx)
    InsufficientBalance = 100,
    InsufficientAllowance = 101,
    InvalidRecipient = 102,

    // Amount errors (2xx)
    ZeroOrSubUnitAmount = 200,
    BoundsExceeded = 201,
    BelowMinimumDeposit = 202,

    // Feed errors (3xx)
    InvalidFeedData = 300,
    RebaseTooSoon = 301,
    FeedFrozen = 302,

    // Access control errors (4xx)
    Unauthorized = 400,
    AlreadyInitialized = 401,
    NotInitialized = 402,

    // Asset errors (5xx)
    AssetTransferFailed = 500,

    // Registry errors (6xx)
    IndexOutOfRange = 600,
}

impl WrapperError {
    pub const fn message(&self) -> &'static str {
        match self {
            // Ledger
            WrapperError::InsufficientBalance => "Insufficient balance",
            WrapperError::InsufficientAllowance => "Insufficient allowance",
            WrapperError::InvalidRecipient => "Invalid recipient",

            // Amount
            WrapperError::ZeroOrSubUnitAmount => "Amount rounds to zero",
            WrapperError::BoundsExceeded => "Amount exceeds bounds",
            WrapperError::BelowMinimumDeposit => "Below minimum bootstrap deposit",

            // Feed
            WrapperError::InvalidFeedData => "Price feed reported invalid data",
            WrapperError::RebaseTooSoon => "Minimum update interval not elapsed",
            WrapperError::FeedFrozen => "Operation blocked: feed frozen",

            // Access control
            WrapperError::Unauthorized => "Unauthorized: caller is not owner",
            WrapperError::AlreadyInitialized => "Already initialized",
            WrapperError::NotInitialized => "Not initialized",

            // Asset
            WrapperError::AssetTransferFailed => "Underlying asset transfer failed",

            // Registry
            WrapperError::IndexOutOfRange => "Registry index out of range",
        }
    }
}

impl core::fmt::Display for WrapperError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.message())
    }
}

impl From<WrapperError> for OdraError {
    fn from(error: WrapperError) -> Self {
        #[cfg(target_arch = "wasm32")]
        {
            OdraError::user(error as u16)
        }

        #[cfg(not(target_arch = "wasm32"))]
        {
            OdraError::user(error as u16, error.message())
        }
    }
}

/// Unwraps `result` or reverts the current call with its error.
pub(crate) fn or_revert<T>(env: &ContractEnv, result: Result<T, WrapperError>) -> T {
    match result {
        Ok(value) => value,
        Err(error) => env.revert(error),
    }
}
