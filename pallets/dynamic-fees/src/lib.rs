//! Dynamic Fees Pallet
//!
//! Derives the swap fee of a flaunched pool from a time-weighted volume accumulator.
//!
//! Every tracked swap adds the absolute non-anchor volume to the pool's accumulator,
//! which decays linearly to zero over `RollingWindow`. Once the accumulator crosses
//! `IncreaseThreshold`, the fee is raised towards `MaxFeeScaled` in proportion to how
//! far the accumulator has travelled towards `TotalSupply`. A raised fee then decays
//! back to `MinFeeScaled` over the same window.

#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

pub use pallet::*;

#[cfg(test)]
pub mod mock;

#[cfg(feature = "runtime-benchmarks")]
mod benchmarking;

pub mod weights;
pub use weights::WeightInfo;

use frame::deps::sp_runtime::DispatchResult;
use primitives::{BalanceDelta, PoolKey};

pub const LOG_TARGET: &str = "runtime::dynamic-fees";

/// Swap fee source used by the pool orchestrator.
pub trait FeeCalculator<AccountId> {
  /// Fee in basis points the pool should charge right now.
  fn determine_swap_fee(pool_key: &PoolKey, base_fee_bps: u32) -> u32;

  /// Record a settled swap.
  fn track_swap(sender: &AccountId, pool_key: &PoolKey, delta: BalanceDelta) -> DispatchResult;
}

/// Fixed fee: always the pool's base fee, nothing tracked.
pub struct StaticFee;

impl<AccountId> FeeCalculator<AccountId> for StaticFee {
  fn determine_swap_fee(_pool_key: &PoolKey, base_fee_bps: u32) -> u32 {
    base_fee_bps
  }

  fn track_swap(_: &AccountId, _: &PoolKey, _: BalanceDelta) -> DispatchResult {
    Ok(())
  }
}

#[frame::pallet]
pub mod pallet {
  use super::{FeeCalculator, LOG_TARGET, WeightInfo};
  use frame::deps::frame_support::traits::UnixTime;
  use frame::prelude::*;
  use primitives::{
    Balance, BalanceDelta, PoolId, PoolKey, AssetKind,
    ecosystem::params::FEE_SCALE,
  };
  use sp_arithmetic::{
    PerThing, Perquintill,
    helpers_128bit::multiply_by_rational_with_rounding,
    per_things::Rounding,
  };

  #[pallet::config]
  pub trait Config: frame_system::Config<RuntimeEvent: From<Event<Self>>> {
    /// Wrapped anchor token; the other side of every pool carries the volume
    #[pallet::constant]
    type NativeToken: Get<AssetKind>;

    /// The only account allowed to report swaps
    type PositionManager: Get<Self::AccountId>;

    /// Wall clock in seconds
    type TimeProvider: UnixTime;

    /// Fee floor, scaled (bps * 100)
    #[pallet::constant]
    type MinFeeScaled: Get<u32>;

    /// Fee ceiling, scaled (bps * 100)
    #[pallet::constant]
    type MaxFeeScaled: Get<u32>;

    /// Decay window in seconds for both the accumulator and raised fees
    #[pallet::constant]
    type RollingWindow: Get<u64>;

    /// Accumulated volume at which the fee starts to rise
    #[pallet::constant]
    type IncreaseThreshold: Get<Balance>;

    /// Accumulated volume at which the fee reaches the ceiling
    #[pallet::constant]
    type TotalSupply: Get<Balance>;

    /// Weight information for extrinsics
    type WeightInfo: WeightInfo;
  }

  #[pallet::pallet]
  pub struct Pallet<T>(_);

  /// Fee engine state of a single pool
  #[derive(
    Clone, Encode, Decode, Eq, PartialEq, RuntimeDebug, TypeInfo, MaxEncodedLen, Default,
  )]
  pub struct PoolFeeState {
    /// Fee set by the last increase, before decay
    pub current_fee_scaled: u32,
    /// Unix seconds of the last fee increase
    pub last_fee_increase_time: u64,
    /// Decaying sum of tracked volume
    pub accumulator_weighted_volume: Balance,
    /// Unix seconds of the last accumulator update
    pub accumulator_last_update_time: u64,
  }

  /// Fee state per pool, created on the first tracked swap
  #[pallet::storage]
  #[pallet::getter(fn pool_fees)]
  pub type PoolFees<T: Config> = StorageMap<_, Blake2_128Concat, PoolId, PoolFeeState, OptionQuery>;

  #[pallet::event]
  #[pallet::generate_deposit(pub(super) fn deposit_event)]
  pub enum Event<T: Config> {
    /// A swap was folded into the pool's accumulator
    SwapTracked {
      pool_id: PoolId,
      sender: T::AccountId,
      volume: Balance,
      accumulator: Balance,
      fee_scaled: u32,
    },
    /// The pool fee was raised
    FeeIncreased {
      pool_id: PoolId,
      old_fee_scaled: u32,
      new_fee_scaled: u32,
    },
  }

  #[pallet::error]
  pub enum Error<T> {
    /// Only the position manager may report swaps
    CallerNotPositionManager,
    /// The pool does not trade the anchor token
    InvalidPoolKey,
  }

  #[pallet::call]
  impl<T: Config> Pallet<T> {
    /// Report a settled swap on `pool_key`
    #[pallet::call_index(0)]
    #[pallet::weight(T::WeightInfo::track_swap())]
    pub fn track_swap(
      origin: OriginFor<T>,
      pool_key: PoolKey,
      sender: T::AccountId,
      delta: BalanceDelta,
    ) -> DispatchResult {
      let who = ensure_signed(origin)?;
      ensure!(
        who == T::PositionManager::get(),
        Error::<T>::CallerNotPositionManager
      );
      Self::do_track_swap(&pool_key, &sender, delta)
    }
  }

  impl<T: Config> Pallet<T> {
    fn now() -> u64 {
      T::TimeProvider::now().as_secs()
    }

    /// Stored state, or the untouched state of a fresh pool
    pub fn fee_state(pool_id: &PoolId) -> PoolFeeState {
      Self::pool_fees(pool_id).unwrap_or_else(|| PoolFeeState {
        current_fee_scaled: T::MinFeeScaled::get(),
        ..Default::default()
      })
    }

    /// Fee the pool charges at `now`: the last raised fee decayed linearly back to
    /// the floor over the window
    pub fn decayed_fee(state: &PoolFeeState, now: u64) -> u32 {
      let min_fee = T::MinFeeScaled::get();
      let window = T::RollingWindow::get();
      let elapsed = now.saturating_sub(state.last_fee_increase_time);
      if elapsed >= window {
        return min_fee;
      }
      let excess = state.current_fee_scaled.saturating_sub(min_fee) as u64;
      let decayed = excess.saturating_mul(elapsed) / window;
      state.current_fee_scaled.saturating_sub(decayed as u32).max(min_fee)
    }

    /// Fee in basis points for a swap on `pool_id`, never below the pool's base fee
    pub fn quote_fee(pool_id: &PoolId, base_fee_bps: u32) -> u32 {
      let charged = Self::decayed_fee(&Self::fee_state(pool_id), Self::now());
      charged.max(base_fee_bps.saturating_mul(FEE_SCALE)) / FEE_SCALE
    }

    /// Fee targeted by an accumulator at or above the increase threshold
    pub fn target_fee(accumulator: Balance) -> u32 {
      let min_fee = T::MinFeeScaled::get();
      let max_fee = T::MaxFeeScaled::get();
      let threshold = T::IncreaseThreshold::get();
      let supply = T::TotalSupply::get();
      if accumulator >= supply {
        return max_fee;
      }
      let span = max_fee.saturating_sub(min_fee);
      let increase = multiply_by_rational_with_rounding(
        accumulator.saturating_sub(threshold),
        span as Balance,
        supply.saturating_sub(threshold),
        Rounding::Up,
      )
      .unwrap_or(span as Balance)
      .min(span as Balance);
      min_fee.saturating_add(increase as u32)
    }

    /// Fold a swap into the accumulator and raise the fee when the volume warrants it
    pub fn do_track_swap(
      pool_key: &PoolKey,
      sender: &T::AccountId,
      delta: BalanceDelta,
    ) -> DispatchResult {
      let native_is_zero = pool_key
        .native_is_zero(T::NativeToken::get())
        .ok_or(Error::<T>::InvalidPoolKey)?;
      let pool_id = pool_key.pool_id();
      let (_, token_delta) = delta.split(native_is_zero);
      let volume = token_delta.unsigned_abs();
      let now = Self::now();
      let window = T::RollingWindow::get();
      let mut state = Self::fee_state(&pool_id);

      let since_update = now.saturating_sub(state.accumulator_last_update_time);
      state.accumulator_weighted_volume = if since_update > window {
        volume
      } else {
        Perquintill::from_rational(window.saturating_sub(since_update), window)
          .mul_floor(state.accumulator_weighted_volume)
          .saturating_add(volume)
      };
      state.accumulator_last_update_time = now;

      let charged = Self::decayed_fee(&state, now);
      let mut fee_scaled = charged;
      if !volume.is_zero() && state.accumulator_weighted_volume >= T::IncreaseThreshold::get() {
        let target = Self::target_fee(state.accumulator_weighted_volume);
        if target > charged {
          state.current_fee_scaled = target;
          state.last_fee_increase_time = now;
          fee_scaled = target;
          log::debug!(
            target: LOG_TARGET,
            "fee raised from {} to {} (accumulator {})",
            charged,
            target,
            state.accumulator_weighted_volume
          );
          Self::deposit_event(Event::FeeIncreased {
            pool_id,
            old_fee_scaled: charged,
            new_fee_scaled: target,
          });
        }
      }

      let accumulator = state.accumulator_weighted_volume;
      PoolFees::<T>::insert(pool_id, state);
      Self::deposit_event(Event::SwapTracked {
        pool_id,
        sender: sender.clone(),
        volume,
        accumulator,
        fee_scaled,
      });
      Ok(())
    }
  }

  impl<T: Config> FeeCalculator<T::AccountId> for Pallet<T> {
    fn determine_swap_fee(pool_key: &PoolKey, base_fee_bps: u32) -> u32 {
      Self::quote_fee(&pool_key.pool_id(), base_fee_bps)
    }

    fn track_swap(
      sender: &T::AccountId,
      pool_key: &PoolKey,
      delta: BalanceDelta,
    ) -> DispatchResult {
      Self::do_track_swap(pool_key, sender, delta)
    }
  }
}
