//! Tick <-> sqrt price conversion for concentrated liquidity pools.
//!
//! Prices are `sqrt(1.0001^tick)` in Q64.96 fixed point. The factor table holds
//! `2^128 / sqrt(1.0001^(2^i))` for every bit of the absolute tick.

use polkadot_sdk::sp_core::U256;

pub const MIN_TICK: i32 = -887_272;
pub const MAX_TICK: i32 = 887_272;

/// Sqrt price at `MIN_TICK`.
pub const MIN_SQRT_PRICE: U256 = U256([4_295_128_739, 0, 0, 0]);

/// Sqrt price at `MAX_TICK`.
pub const MAX_SQRT_PRICE: U256 = U256([0x5d95_1d52_6398_8d26, 0xefd1_fc6a_5064_8849, 0xfffd_8963, 0]);

const ODD_TICK_RATIO: u128 = 0xfffcb933bd6fad37aa2d162d1a594001;

const RATIO_FACTORS: [(u32, u128); 19] = [
  (0x2, 0xfff97272373d413259a46990580e213a),
  (0x4, 0xfff2e50f5f656932ef12357cf3c7fdcc),
  (0x8, 0xffe5caca7e10e4e61c3624eaa0941cd0),
  (0x10, 0xffcb9843d60f6159c9db58835c926644),
  (0x20, 0xff973b41fa98c081472e6896dfb254c0),
  (0x40, 0xff2ea16466c96a3843ec78b326b52861),
  (0x80, 0xfe5dee046a99a2a811c461f1969c3053),
  (0x100, 0xfcbe86c7900a88aedcffc83b479aa3a4),
  (0x200, 0xf987a7253ac413176f2b074cf7815e54),
  (0x400, 0xf3392b0822b70005940c7a398e4b70f3),
  (0x800, 0xe7159475a2c29b7443b29c7fa6e889d9),
  (0x1000, 0xd097f3bdfd2022b8845ad8f792aa5825),
  (0x2000, 0xa9f746462d870fdf8a65dc1f90e061e5),
  (0x4000, 0x70d869a156d2a1b890bb3df62baf32f7),
  (0x8000, 0x31be135f97d08fd981231505542fcfa6),
  (0x10000, 0x9aa508b5b7a84e1c677de54f3e99bc9),
  (0x20000, 0x5d6af8dedb81196699c329225ee604),
  (0x40000, 0x2216e584f5fa1ea926041bedfe98),
  (0x80000, 0x48a170391f7dc42444e8fa2),
];

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TickMathError {
  /// Tick outside `[MIN_TICK, MAX_TICK]`.
  TickOutOfBounds,
  /// Tick spacing must be strictly positive.
  InvalidSpacing,
}

/// Q64.96 sqrt price at `tick`, rounded up.
pub fn sqrt_price_at_tick(tick: i32) -> Result<U256, TickMathError> {
  let abs_tick = tick.unsigned_abs();
  if abs_tick > MAX_TICK as u32 {
    return Err(TickMathError::TickOutOfBounds);
  }

  let mut ratio = if abs_tick & 0x1 != 0 {
    U256::from(ODD_TICK_RATIO)
  } else {
    U256::one() << 128
  };
  for (bit, factor) in RATIO_FACTORS {
    if abs_tick & bit != 0 {
      ratio = (ratio * U256::from(factor)) >> 128;
    }
  }

  if tick > 0 {
    ratio = U256::MAX / ratio;
  }

  // Q128.128 -> Q64.96, rounding up so the result never undershoots the tick.
  let round = if (ratio & U256::from(u32::MAX)).is_zero() {
    U256::zero()
  } else {
    U256::one()
  };
  Ok((ratio >> 32) + round)
}

/// Lowest tick addressable with the given spacing.
pub fn min_usable_tick(tick_spacing: i32) -> i32 {
  (MIN_TICK / tick_spacing) * tick_spacing
}

/// Highest tick addressable with the given spacing.
pub fn max_usable_tick(tick_spacing: i32) -> i32 {
  (MAX_TICK / tick_spacing) * tick_spacing
}

/// Round `tick` down (towards negative infinity) to a multiple of `tick_spacing`.
pub fn floor_to_spacing(tick: i32, tick_spacing: i32) -> Result<i32, TickMathError> {
  if tick_spacing <= 0 {
    return Err(TickMathError::InvalidSpacing);
  }
  let mut compressed = tick / tick_spacing;
  if tick < 0 && tick % tick_spacing != 0 {
    compressed -= 1;
  }
  Ok(compressed * tick_spacing)
}
