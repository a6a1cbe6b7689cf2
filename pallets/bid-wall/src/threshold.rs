//! Swap-fee threshold gating bid wall rebalances.

use crate::pallet::{Config, Pallet, Settings};
use codec::{Decode, DecodeWithMemTracking, Encode, MaxEncodedLen};
use frame::deps::sp_runtime::RuntimeDebug;
use frame::prelude::Get;
use primitives::{Balance, PoolId};
use scale_info::TypeInfo;
use sp_arithmetic::{helpers_128bit::multiply_by_rational_with_rounding, per_things::Rounding};

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
pub struct ThresholdSettings {
  /// Scale the threshold with cumulative fees instead of using `base_threshold`
  pub use_dynamic_thresholds: bool,
  /// Static threshold, and the floor of the dynamic one
  pub base_threshold: Balance,
  pub min_threshold: Balance,
  pub max_threshold: Balance,
}

impl ThresholdSettings {
  /// Pending fees needed before the wall is (re)placed.
  ///
  /// Dynamic thresholds climb linearly from `min_threshold` to `max_threshold` as
  /// cumulative fees fill up to `max_brackets` brackets of `bracket_size`.
  pub fn threshold_for(
    &self,
    cumulative_fees: Balance,
    bracket_size: Balance,
    max_brackets: u32,
  ) -> Balance {
    if !self.use_dynamic_thresholds {
      return self.base_threshold;
    }
    let max_brackets = Balance::from(max_brackets);
    let brackets = match cumulative_fees.checked_div(bracket_size) {
      Some(filled) => filled.min(max_brackets),
      None => max_brackets,
    };
    let span = self.max_threshold.saturating_sub(self.min_threshold);
    let climbed = multiply_by_rational_with_rounding(span, brackets, max_brackets, Rounding::Down)
      .unwrap_or(span);
    self
      .min_threshold
      .saturating_add(climbed)
      .max(self.base_threshold)
  }
}

impl<T: Config> Pallet<T> {
  /// Threshold in force for a pool with `cumulative_fees` collected so far
  pub fn threshold(_pool_id: &PoolId, cumulative_fees: Balance) -> Balance {
    Settings::<T>::get().threshold_for(
      cumulative_fees,
      T::BracketSize::get(),
      T::MaxBrackets::get(),
    )
  }
}
