//! Tick range selection for the bid wall band.

use codec::{Decode, DecodeWithMemTracking, Encode, MaxEncodedLen};
use frame::deps::sp_runtime::RuntimeDebug;
use primitives::{
  PoolKey,
  tick_math::{floor_to_spacing, max_usable_tick, min_usable_tick},
};
use scale_info::TypeInfo;

/// Chooses where single-sided anchor liquidity goes relative to the live price.
///
/// Implementations must be deterministic and return an ordered, spacing-aligned
/// range inside the usable ticks of the pool, or `None` when no such range exists.
pub trait TickRangeStrategy {
  fn calculate_tick_range(
    &self,
    pool_key: &PoolKey,
    current_tick: i32,
    native_is_zero: bool,
  ) -> Option<(i32, i32)>;
}

/// Built-in strategies, selectable at runtime.
#[derive(
  Clone,
  Copy,
  Decode,
  DecodeWithMemTracking,
  Default,
  Encode,
  Eq,
  MaxEncodedLen,
  PartialEq,
  RuntimeDebug,
  TypeInfo,
)]
pub enum TickRangeKind {
  /// One tick spacing directly beside the price
  #[default]
  Adjacent,
  /// `spacings` tick spacings wide, anchored like `Adjacent`
  Wide { spacings: u16 },
}

impl TickRangeKind {
  pub fn width_in_spacings(&self) -> u16 {
    match self {
      TickRangeKind::Adjacent => 1,
      TickRangeKind::Wide { spacings } => *spacings,
    }
  }
}

impl TickRangeStrategy for TickRangeKind {
  fn calculate_tick_range(
    &self,
    pool_key: &PoolKey,
    current_tick: i32,
    native_is_zero: bool,
  ) -> Option<(i32, i32)> {
    let spacing = pool_key.tick_spacing;
    let spacings = self.width_in_spacings();
    if spacing <= 0 || spacings == 0 {
      return None;
    }
    let width = spacing.checked_mul(i32::from(spacings))?;
    let floor = floor_to_spacing(current_tick, spacing).ok()?;

    // Anchor as token0 is only single-sided above the price, as token1 only below it
    let (lower, upper) = if native_is_zero {
      let lower = floor.checked_add(spacing)?;
      (lower, lower.checked_add(width)?)
    } else {
      (floor.checked_sub(width)?, floor)
    };

    let lower = lower.max(min_usable_tick(spacing));
    let upper = upper.min(max_usable_tick(spacing));
    (lower < upper).then_some((lower, upper))
  }
}
