//! Conversion between internal ledger units and external amounts.
//!
//! Both wrappers keep balances as internal units and derive the visible
//! balance on every read:
//!
//! - [`OraclePriced`]: one collateral unit is `BITS_PER_COLLATERAL` internal
//!   units ("bits") and `external = bits * price / PRICE_BITS`.
//! - [`UnderlyingRatio`]: internal units are vault shares and
//!   `external = shares * pooled / total_shares`, with `pooled` read live.
//!
//! Products are formed in U512 so `units * price` can never overflow; results
//! that do not fit back into U256 are rejected as out of bounds.

use odra::casper_types::{U256, U512};
use crate::errors::WrapperError;

/// Decimals of feed prices.
pub const PRICE_DECIMALS: u8 = 8;
/// Default minimum spacing between accepted prices.
pub const DEFAULT_MIN_UPDATE_INTERVAL_SEC: u64 = 3600;

/// Shares minted per underlying unit by the bootstrap deposit.
pub const INITIAL_RATE: u64 = 1_000_000;
/// Smallest bootstrap deposit, in underlying units.
pub const MINIMUM_DEPOSIT: u64 = 1_000;
/// Shares of the bootstrap mint kept by the vault forever.
pub const RETAINED_SHARES: u64 = 1_000_000;

const PRICE_SCALE: u64 = 100_000_000;
/// Least common multiple of 1..=42.
const LCM_1_TO_42: u64 = 219_060_189_739_591_200;

fn pow10(exp: u32) -> U256 {
    U256::from(10u64).pow(U256::from(exp))
}

/// `10^PRICE_DECIMALS`.
pub fn price_scale() -> U256 {
    U256::from(PRICE_SCALE)
}

/// Largest collateral (or underlying) amount accepted in one call or held in total.
pub fn max_collateral() -> U256 {
    pow10(27)
}

/// Feed values above this are clamped.
pub fn max_price() -> U256 {
    U256::from(u128::MAX >> 32)
}

/// Bits per collateral unit.
///
/// Divisible by every integer up to 42 and by `10^32`, so for any price whose
/// prime factors are that small one external unit is a whole number of bits
/// and transfers are exact on both sides.
pub fn bits_per_collateral() -> U256 {
    U256::from(LCM_1_TO_42) * pow10(32)
}

/// Bits backing `max_collateral()`.
pub fn total_bits() -> U256 {
    max_collateral() * bits_per_collateral()
}

/// Bits per external unit at a price of exactly 1.
pub fn price_bits() -> U256 {
    bits_per_collateral() * price_scale()
}

/// External supply at `max_collateral()` and `max_price()`.
pub fn max_supply() -> U256 {
    max_collateral() * max_price() / price_scale()
}

// ===== Wide arithmetic =====

pub(crate) fn u256_to_u512(value: U256) -> U512 {
    let mut bytes = [0u8; 32];
    value.to_little_endian(&mut bytes);
    U512::from_little_endian(&bytes)
}

pub(crate) fn u512_to_u256(value: U512) -> Result<U256, WrapperError> {
    let mut bytes = [0u8; 64];
    value.to_little_endian(&mut bytes);
    if bytes[32..].iter().any(|b| *b != 0) {
        return Err(WrapperError::BoundsExceeded);
    }
    Ok(U256::from_little_endian(&bytes[..32]))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rounding {
    Down,
    Up,
}

/// `a * b / divisor` without intermediate overflow.
pub fn mul_div(a: U256, b: U256, divisor: U256, rounding: Rounding) -> Result<U256, WrapperError> {
    if divisor.is_zero() {
        return Err(WrapperError::ZeroOrSubUnitAmount);
    }
    let product = u256_to_u512(a) * u256_to_u512(b);
    let divisor = u256_to_u512(divisor);
    let mut quotient = product / divisor;
    if rounding == Rounding::Up && !(product % divisor).is_zero() {
        quotient = quotient + U512::one();
    }
    u512_to_u256(quotient)
}

fn checked_add(a: U256, b: U256) -> Result<U256, WrapperError> {
    a.checked_add(b).ok_or(WrapperError::BoundsExceeded)
}

// ===== Ratio =====

/// A holder's external value: `floor(units * num / den)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ratio {
    pub num: U256,
    pub den: U256,
}

impl Ratio {
    pub fn value(&self, units: U256) -> Result<U256, WrapperError> {
        if self.den.is_zero() {
            return Ok(U256::zero());
        }
        mul_div(units, self.num, self.den, Rounding::Down)
    }

    /// Fewest units worth at least `amount`.
    fn units_for(&self, amount: U256) -> Result<U256, WrapperError> {
        if amount.is_zero() {
            return Ok(U256::zero());
        }
        mul_div(amount, self.den, self.num, Rounding::Up)
    }

    /// Inclusive range of unit counts that, added to `held`, raise its value
    /// by exactly `amount`.
    pub fn credit_range(&self, held: U256, amount: U256) -> Result<(U256, U256), WrapperError> {
        let target = checked_add(self.value(held)?, amount)?;
        let lo = self.units_for(target)?.saturating_sub(held);
        let next = self.units_for(checked_add(target, U256::one())?)?;
        let hi = next - U256::one() - held;
        Ok((lo, hi))
    }

    /// Inclusive range of unit counts that, taken from `held`, lower its value
    /// by exactly `amount`.
    pub fn debit_range(&self, held: U256, amount: U256) -> Result<(U256, U256), WrapperError> {
        let balance = self.value(held)?;
        if amount > balance {
            return Err(WrapperError::InsufficientBalance);
        }
        let remaining = balance - amount;
        let hi = held - self.units_for(remaining)?;
        let next = self.units_for(remaining + U256::one())?;
        let lo = held.saturating_sub(next - U256::one());
        Ok((lo, hi))
    }

    /// Units moved when a holder of `from_held` sends `amount` to a holder of
    /// `to_held`.
    ///
    /// Picks a count that moves both balances by exactly `amount`. When none
    /// exists the recipient is credited exactly and the sender's balance moves
    /// by at most one extra unit. Amounts that no unit count can credit
    /// exactly are rejected.
    pub fn transfer_units(
        &self,
        from_held: U256,
        to_held: U256,
        amount: U256,
    ) -> Result<U256, WrapperError> {
        let (debit_lo, debit_hi) = self.debit_range(from_held, amount)?;
        let (credit_lo, credit_hi) = self.credit_range(to_held, amount)?;

        let units = debit_lo.max(credit_lo);
        if units <= debit_hi.min(credit_hi) {
            return Ok(units);
        }
        if credit_lo > credit_hi {
            return Err(WrapperError::ZeroOrSubUnitAmount);
        }
        if credit_lo > from_held {
            return Err(WrapperError::InsufficientBalance);
        }
        let sent = self.value(from_held)? - self.value(from_held - credit_lo)?;
        if sent > amount + U256::one() || sent + U256::one() < amount {
            return Err(WrapperError::ZeroOrSubUnitAmount);
        }
        Ok(credit_lo)
    }
}

// ===== Policies =====

/// Result of pricing a deposit, withdraw, mint or burn.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Quote {
    /// Units credited to or debited from the account
    pub units: U256,
    /// Collateral or underlying moved by the asset transfer
    pub amount: U256,
    /// External amount credited or debited
    pub external: U256,
    /// Extra units minted to the wrapper itself
    pub retained: U256,
}

/// Prices ledger operations for one wrapper variant.
///
/// `held` is the account's current internal units. Implementations reject
/// anything that would round to nothing and check bounds before multiplying.
pub trait ConversionPolicy {
    fn ratio(&self) -> Ratio;

    fn to_external(&self, units: U256) -> Result<U256, WrapperError> {
        self.ratio().value(units)
    }

    fn transfer_units(
        &self,
        from_held: U256,
        to_held: U256,
        amount: U256,
    ) -> Result<U256, WrapperError> {
        self.ratio().transfer_units(from_held, to_held, amount)
    }

    /// Asset-amount driven credit.
    fn deposit(&self, amount: U256, held: U256) -> Result<Quote, WrapperError>;

    /// Asset-amount driven debit.
    fn withdraw(&self, amount: U256, held: U256) -> Result<Quote, WrapperError>;

    /// Ledger-amount driven credit.
    fn mint(&self, target: U256, held: U256) -> Result<Quote, WrapperError>;

    /// Ledger-amount driven debit.
    fn burn(&self, target: U256, held: U256) -> Result<Quote, WrapperError>;

    /// Debit of every unit the account holds.
    fn redeem_all(&self, held: U256) -> Result<Quote, WrapperError>;
}

/// Oracle-priced conversion at a fixed `price` snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OraclePriced {
    price: U256,
    total_units: U256,
}

impl OraclePriced {
    pub fn new(price: U256, total_units: U256) -> Self {
        Self { price, total_units }
    }

    /// External amount `collateral` is worth right now.
    pub fn exchange_rate(&self, collateral: U256) -> Result<U256, WrapperError> {
        mul_div(collateral, self.price, price_scale(), Rounding::Down)
    }

    fn collateral_bits(collateral: U256) -> Result<U256, WrapperError> {
        if collateral > max_collateral() {
            return Err(WrapperError::BoundsExceeded);
        }
        Ok(collateral * bits_per_collateral())
    }

    fn check_capacity(&self, units: U256) -> Result<(), WrapperError> {
        if checked_add(self.total_units, units)? > total_bits() {
            return Err(WrapperError::BoundsExceeded);
        }
        Ok(())
    }
}

impl ConversionPolicy for OraclePriced {
    fn ratio(&self) -> Ratio {
        Ratio { num: self.price, den: price_bits() }
    }

    fn deposit(&self, collateral: U256, _held: U256) -> Result<Quote, WrapperError> {
        if collateral.is_zero() {
            return Err(WrapperError::ZeroOrSubUnitAmount);
        }
        let units = Self::collateral_bits(collateral)?;
        self.check_capacity(units)?;
        let external = self.exchange_rate(collateral)?;
        if external.is_zero() {
            return Err(WrapperError::ZeroOrSubUnitAmount);
        }
        Ok(Quote { units, amount: collateral, external, retained: U256::zero() })
    }

    fn withdraw(&self, collateral: U256, held: U256) -> Result<Quote, WrapperError> {
        if collateral.is_zero() {
            return Err(WrapperError::ZeroOrSubUnitAmount);
        }
        let units = Self::collateral_bits(collateral)?;
        if units > held {
            return Err(WrapperError::InsufficientBalance);
        }
        let external = self.exchange_rate(collateral)?;
        if external.is_zero() {
            return Err(WrapperError::ZeroOrSubUnitAmount);
        }
        Ok(Quote { units, amount: collateral, external, retained: U256::zero() })
    }

    fn mint(&self, external: U256, held: U256) -> Result<Quote, WrapperError> {
        if external.is_zero() {
            return Err(WrapperError::ZeroOrSubUnitAmount);
        }
        if external > max_supply() {
            return Err(WrapperError::BoundsExceeded);
        }
        if mul_div(external, price_scale(), self.price, Rounding::Down)?.is_zero() {
            return Err(WrapperError::ZeroOrSubUnitAmount);
        }
        let (units, _) = self.ratio().credit_range(held, external)?;
        self.check_capacity(units)?;
        let collateral = mul_div(units, U256::one(), bits_per_collateral(), Rounding::Up)?;
        if collateral.is_zero() {
            return Err(WrapperError::ZeroOrSubUnitAmount);
        }
        Ok(Quote { units, amount: collateral, external, retained: U256::zero() })
    }

    fn burn(&self, external: U256, held: U256) -> Result<Quote, WrapperError> {
        if external.is_zero() {
            return Err(WrapperError::ZeroOrSubUnitAmount);
        }
        // Take as many bits as still leaves exactly `balance - external`.
        let (_, units) = self.ratio().debit_range(held, external)?;
        let collateral = units / bits_per_collateral();
        if collateral.is_zero() {
            return Err(WrapperError::ZeroOrSubUnitAmount);
        }
        Ok(Quote { units, amount: collateral, external, retained: U256::zero() })
    }

    fn redeem_all(&self, held: U256) -> Result<Quote, WrapperError> {
        let collateral = held / bits_per_collateral();
        if collateral.is_zero() {
            return Err(WrapperError::ZeroOrSubUnitAmount);
        }
        let external = self.to_external(held)?;
        Ok(Quote { units: held, amount: collateral, external, retained: U256::zero() })
    }
}

/// Share-based conversion against the live pooled underlying.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnderlyingRatio {
    pooled: U256,
    shares: U256,
}

impl UnderlyingRatio {
    pub fn new(pooled: U256, shares: U256) -> Self {
        Self { pooled, shares }
    }

    pub fn is_bootstrapped(&self) -> bool {
        !self.shares.is_zero()
    }

    /// Shares `underlying` buys, rounded down.
    pub fn to_shares(&self, underlying: U256) -> Result<U256, WrapperError> {
        if !self.is_bootstrapped() {
            return underlying
                .checked_mul(U256::from(INITIAL_RATE))
                .ok_or(WrapperError::BoundsExceeded);
        }
        mul_div(underlying, self.shares, self.pooled, Rounding::Down)
    }

    /// Underlying `shares` redeem for, rounded down.
    pub fn to_underlying(&self, shares: U256) -> Result<U256, WrapperError> {
        if !self.is_bootstrapped() {
            return Ok(shares / U256::from(INITIAL_RATE));
        }
        mul_div(shares, self.pooled, self.shares, Rounding::Down)
    }

    /// Value of `units` once the pool holds `pooled` against `shares`.
    fn value_after(units: U256, pooled: U256, shares: U256) -> Result<U256, WrapperError> {
        Ratio { num: pooled, den: shares }.value(units)
    }

    fn check_amount(amount: U256) -> Result<(), WrapperError> {
        if amount.is_zero() {
            return Err(WrapperError::ZeroOrSubUnitAmount);
        }
        if amount > max_collateral() {
            return Err(WrapperError::BoundsExceeded);
        }
        Ok(())
    }
}

impl ConversionPolicy for UnderlyingRatio {
    fn ratio(&self) -> Ratio {
        Ratio { num: self.pooled, den: self.shares }
    }

    fn deposit(&self, amount: U256, _held: U256) -> Result<Quote, WrapperError> {
        Self::check_amount(amount)?;

        if !self.is_bootstrapped() {
            if amount < U256::from(MINIMUM_DEPOSIT) {
                return Err(WrapperError::BelowMinimumDeposit);
            }
            let minted = amount * U256::from(INITIAL_RATE);
            let retained = U256::from(RETAINED_SHARES);
            let units = minted - retained;
            let external = Self::value_after(units, checked_add(self.pooled, amount)?, minted)?;
            return Ok(Quote { units, amount, external, retained });
        }

        let units = mul_div(amount, self.shares, self.pooled, Rounding::Down)?;
        if units.is_zero() {
            return Err(WrapperError::ZeroOrSubUnitAmount);
        }
        let external = Self::value_after(
            units,
            checked_add(self.pooled, amount)?,
            checked_add(self.shares, units)?,
        )?;
        Ok(Quote { units, amount, external, retained: U256::zero() })
    }

    fn withdraw(&self, amount: U256, held: U256) -> Result<Quote, WrapperError> {
        Self::check_amount(amount)?;
        if !self.is_bootstrapped() {
            return Err(WrapperError::InsufficientBalance);
        }
        let units = mul_div(amount, self.shares, self.pooled, Rounding::Up)?;
        if units > held {
            return Err(WrapperError::InsufficientBalance);
        }
        Ok(Quote { units, amount, external: amount, retained: U256::zero() })
    }

    fn mint(&self, target: U256, _held: U256) -> Result<Quote, WrapperError> {
        if target.is_zero() {
            return Err(WrapperError::ZeroOrSubUnitAmount);
        }

        if !self.is_bootstrapped() {
            let retained = U256::from(RETAINED_SHARES);
            let minted = checked_add(target, retained)?;
            let amount = mul_div(minted, U256::one(), U256::from(INITIAL_RATE), Rounding::Up)?;
            Self::check_amount(amount)?;
            if amount < U256::from(MINIMUM_DEPOSIT) {
                return Err(WrapperError::BelowMinimumDeposit);
            }
            let external = Self::value_after(target, checked_add(self.pooled, amount)?, minted)?;
            return Ok(Quote { units: target, amount, external, retained });
        }

        if mul_div(target, self.pooled, self.shares, Rounding::Down)?.is_zero() {
            return Err(WrapperError::ZeroOrSubUnitAmount);
        }
        let amount = mul_div(target, self.pooled, self.shares, Rounding::Up)?;
        Self::check_amount(amount)?;
        let external = Self::value_after(
            target,
            checked_add(self.pooled, amount)?,
            checked_add(self.shares, target)?,
        )?;
        Ok(Quote { units: target, amount, external, retained: U256::zero() })
    }

    fn burn(&self, target: U256, held: U256) -> Result<Quote, WrapperError> {
        if target.is_zero() {
            return Err(WrapperError::ZeroOrSubUnitAmount);
        }
        if target > held {
            return Err(WrapperError::InsufficientBalance);
        }
        let amount = mul_div(target, self.pooled, self.shares, Rounding::Down)?;
        if amount.is_zero() {
            return Err(WrapperError::ZeroOrSubUnitAmount);
        }
        Ok(Quote { units: target, amount, external: amount, retained: U256::zero() })
    }

    fn redeem_all(&self, held: U256) -> Result<Quote, WrapperError> {
        self.burn(held, held)
    }
}
