//! Liquidity <-> token amount conversion for a band `[sqrt_a, sqrt_b)`.
//!
//! All products are taken in 512 bits before dividing, so only the final
//! narrowing to `u128` can fail.

use polkadot_sdk::sp_core::{U256, U512};

/// 2^96, the Q64.96 unit.
pub const Q96: U256 = U256([0, 1 << 32, 0, 0]);

/// `a * b / denominator` without intermediate overflow. `None` on a zero
/// denominator or when the quotient does not fit 256 bits.
pub fn mul_div(a: U256, b: U256, denominator: U256, round_up: bool) -> Option<U256> {
  if denominator.is_zero() {
    return None;
  }
  let (quotient, remainder) = a.full_mul(b).div_mod(U512::from(denominator));
  let quotient = if round_up && !remainder.is_zero() {
    quotient.checked_add(U512::one())?
  } else {
    quotient
  };
  U256::try_from(quotient).ok()
}

fn sorted(sqrt_a: U256, sqrt_b: U256) -> (U256, U256) {
  if sqrt_a > sqrt_b {
    (sqrt_b, sqrt_a)
  } else {
    (sqrt_a, sqrt_b)
  }
}

fn narrow(value: U256) -> Option<u128> {
  u128::try_from(value).ok()
}

/// Liquidity that `amount0` of token0 funds across the band when the price sits
/// at or below it.
pub fn liquidity_for_amount0(sqrt_a: U256, sqrt_b: U256, amount0: u128) -> Option<u128> {
  let (lower, upper) = sorted(sqrt_a, sqrt_b);
  let intermediate = mul_div(lower, upper, Q96, false)?;
  narrow(mul_div(
    U256::from(amount0),
    intermediate,
    upper.checked_sub(lower)?,
    false,
  )?)
}

/// Liquidity that `amount1` of token1 funds across the band when the price sits
/// at or above it.
pub fn liquidity_for_amount1(sqrt_a: U256, sqrt_b: U256, amount1: u128) -> Option<u128> {
  let (lower, upper) = sorted(sqrt_a, sqrt_b);
  narrow(mul_div(
    U256::from(amount1),
    Q96,
    upper.checked_sub(lower)?,
    false,
  )?)
}

/// Token0 held by `liquidity` across the band.
pub fn amount0_for_liquidity(
  sqrt_a: U256,
  sqrt_b: U256,
  liquidity: u128,
  round_up: bool,
) -> Option<u128> {
  let (lower, upper) = sorted(sqrt_a, sqrt_b);
  if lower.is_zero() {
    return None;
  }
  let numerator = U256::from(liquidity) << 96;
  let scaled = mul_div(numerator, upper - lower, upper, round_up)?;
  let (amount, remainder) = scaled.div_mod(lower);
  let amount = if round_up && !remainder.is_zero() {
    amount + U256::one()
  } else {
    amount
  };
  narrow(amount)
}

/// Token1 held by `liquidity` across the band.
pub fn amount1_for_liquidity(
  sqrt_a: U256,
  sqrt_b: U256,
  liquidity: u128,
  round_up: bool,
) -> Option<u128> {
  let (lower, upper) = sorted(sqrt_a, sqrt_b);
  narrow(mul_div(U256::from(liquidity), upper - lower, Q96, round_up)?)
}

/// `(amount0, amount1)` represented by `liquidity` when the pool trades at
/// `sqrt_price`.
pub fn amounts_for_liquidity(
  sqrt_price: U256,
  sqrt_a: U256,
  sqrt_b: U256,
  liquidity: u128,
  round_up: bool,
) -> Option<(u128, u128)> {
  let (lower, upper) = sorted(sqrt_a, sqrt_b);
  if sqrt_price <= lower {
    Some((amount0_for_liquidity(lower, upper, liquidity, round_up)?, 0))
  } else if sqrt_price < upper {
    Some((
      amount0_for_liquidity(sqrt_price, upper, liquidity, round_up)?,
      amount1_for_liquidity(lower, sqrt_price, liquidity, round_up)?,
    ))
  } else {
    Some((0, amount1_for_liquidity(lower, upper, liquidity, round_up)?))
  }
}
