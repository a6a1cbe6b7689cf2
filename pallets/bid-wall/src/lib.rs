//! Bid Wall Pallet
//!
//! Protocol-owned liquidity funded by the anchor-side swap fees of flaunched pools.
//!
//! The position manager hands every swap fee to [`Pallet::deposit`]. Fees pile up as
//! pending until they cross the threshold policy, at which point the whole pending
//! amount is placed as single-sided anchor liquidity in a band chosen by the active
//! [`TickRangeStrategy`]. Later crossings pull the existing band, fold its anchor back
//! in, place a fresh band at the live price and forward any token the band bought to
//! the token's treasury.

#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

pub use pallet::*;


#[cfg(feature = "runtime-benchmarks")]
mod benchmarking;

pub mod strategy;
pub mod threshold;
pub mod weights;

pub use strategy::{TickRangeKind, TickRangeStrategy};
pub use threshold::ThresholdSettings;
pub use weights::WeightInfo;

pub const LOG_TARGET: &str = "runtime::bid-wall";

/// Helper for benchmarking
#[cfg(feature = "runtime-benchmarks")]
pub trait BenchmarkHelper<AccountId> {
  fn fund_account(
    who: &AccountId,
    asset: primitives::AssetKind,
    amount: primitives::Balance,
  ) -> frame::deps::sp_runtime::DispatchResult;
}

#[frame::pallet]
pub mod pallet {
  use super::{LOG_TARGET, TickRangeKind, TickRangeStrategy, ThresholdSettings, WeightInfo};
  use frame::deps::{
    frame_support::traits::{
      fungible::{Inspect as NativeInspect, Mutate as NativeMutate},
      fungibles::{Inspect as FungiblesInspect, Mutate as FungiblesMutate},
      tokens::Preservation,
    },
    sp_runtime::{
      DispatchError,
      traits::{AccountIdConversion, Zero},
    },
  };
  use frame::prelude::*;
  use primitives::{
    AssetKind, Balance, PoolId, PoolKey, TreasuryLookup, LiquidityPrimitive,
    liquidity::{amounts_for_liquidity, liquidity_for_amount0, liquidity_for_amount1},
    tick_math::sqrt_price_at_tick,
  };

  #[pallet::config]
  pub trait Config: frame_system::Config<RuntimeEvent: From<Event<Self>>> {
    /// The assets pallet for managing local fungible tokens (AssetKind::Local)
    type Assets: FungiblesInspect<Self::AccountId, AssetId = u32, Balance = Balance>
      + FungiblesMutate<Self::AccountId, AssetId = u32, Balance = Balance>;

    /// The currency trait for managing native tokens (AssetKind::Native)
    type Currency: NativeInspect<Self::AccountId, Balance = Balance>
      + NativeMutate<Self::AccountId, Balance = Balance>;

    /// Pool engine holding the wall positions
    type Amm: LiquidityPrimitive<Self::AccountId>;

    /// Destination of tokens bought by the wall
    type Treasuries: TreasuryLookup<Self::AccountId>;

    /// Wrapped anchor token the wall is denominated in
    #[pallet::constant]
    type NativeToken: Get<AssetKind>;

    /// The only account allowed to deposit fees
    type PositionManager: Get<Self::AccountId>;

    /// The pallet ID; its account owns every wall position
    #[pallet::constant]
    type PalletId: Get<PalletId>;

    /// Default static threshold
    #[pallet::constant]
    type DefaultBaseThreshold: Get<Balance>;

    /// Default lower bound of the dynamic threshold
    #[pallet::constant]
    type DefaultMinThreshold: Get<Balance>;

    /// Default upper bound of the dynamic threshold
    #[pallet::constant]
    type DefaultMaxThreshold: Get<Balance>;

    /// Cumulative fees per dynamic threshold bracket
    #[pallet::constant]
    type BracketSize: Get<Balance>;

    /// Brackets after which the dynamic threshold stops climbing
    #[pallet::constant]
    type MaxBrackets: Get<u32>;

    /// Origin allowed to tune thresholds, strategy and disabled pools
    type AdminOrigin: EnsureOrigin<Self::RuntimeOrigin>;

    /// Weight information for extrinsics
    type WeightInfo: WeightInfo;

    /// Helper for benchmarking
    #[cfg(feature = "runtime-benchmarks")]
    type BenchmarkHelper: crate::BenchmarkHelper<Self::AccountId>;
  }

  #[pallet::pallet]
  pub struct Pallet<T>(_);

  /// Wall of a single pool
  #[derive(
    Clone, Encode, Decode, Eq, PartialEq, RuntimeDebug, TypeInfo, MaxEncodedLen, Default,
  )]
  pub struct PoolWallState {
    /// A band has been placed at least once
    pub initialized: bool,
    pub tick_lower: i32,
    pub tick_upper: i32,
    /// Liquidity of the band currently held
    pub liquidity: u128,
    /// Every fee ever deposited, forwarded ones included
    pub cumulative_swap_fees: Balance,
    /// Fees waiting for the next threshold crossing
    pub pending_eth_fees: Balance,
  }

  #[pallet::type_value]
  pub fn DefaultSettings<T: Config>() -> ThresholdSettings {
    ThresholdSettings {
      use_dynamic_thresholds: false,
      base_threshold: T::DefaultBaseThreshold::get(),
      min_threshold: T::DefaultMinThreshold::get(),
      max_threshold: T::DefaultMaxThreshold::get(),
    }
  }

  /// Wall state by pool
  #[pallet::storage]
  #[pallet::getter(fn pool_wall)]
  pub type PoolWalls<T: Config> = StorageMap<_, Blake2_128Concat, PoolId, PoolWallState, ValueQuery>;

  /// Threshold policy settings
  #[pallet::storage]
  #[pallet::getter(fn settings)]
  pub type Settings<T: Config> = StorageValue<_, ThresholdSettings, ValueQuery, DefaultSettings<T>>;

  /// Strategy used for every new band
  #[pallet::storage]
  #[pallet::getter(fn active_tick_range)]
  pub type ActiveTickRange<T: Config> = StorageValue<_, TickRangeKind, ValueQuery>;

  /// Pools whose fees bypass the wall and go straight to the treasury
  #[pallet::storage]
  #[pallet::getter(fn is_disabled)]
  pub type DisabledPools<T: Config> = StorageMap<_, Blake2_128Concat, PoolId, bool, ValueQuery>;

  #[pallet::event]
  #[pallet::generate_deposit(pub(super) fn deposit_event)]
  pub enum Event<T: Config> {
    /// Swap fees were added to the pending amount
    DepositReceived {
      pool_id: PoolId,
      amount: Balance,
      pending_eth_fees: Balance,
      cumulative_swap_fees: Balance,
    },
    /// Threshold evaluated after a deposit
    ThresholdCalculated {
      pool_id: PoolId,
      cumulative_swap_fees: Balance,
      threshold: Balance,
    },
    /// First band placed
    PositionCreated {
      pool_id: PoolId,
      tick_lower: i32,
      tick_upper: i32,
      liquidity: u128,
      eth_amount: Balance,
    },
    /// Band replaced at the live price
    PositionRepositioned {
      pool_id: PoolId,
      old_tick_lower: i32,
      old_tick_upper: i32,
      tick_lower: i32,
      tick_upper: i32,
      liquidity: u128,
      eth_amount: Balance,
      tokens_forwarded: Balance,
    },
    /// Fees of a disabled pool were sent to its treasury
    FeesForwarded {
      pool_id: PoolId,
      recipient: T::AccountId,
      amount: Balance,
    },
    ThresholdSettingsUpdated { settings: ThresholdSettings },
    StrategyUpdated { strategy: TickRangeKind },
    DisabledStateUpdated { pool_id: PoolId, disabled: bool },
  }

  #[pallet::error]
  pub enum Error<T> {
    /// Only the position manager may deposit fees
    CallerNotPositionManager,
    /// Pool does not trade the anchor token, or the orientation flag disagrees
    InvalidPoolKey,
    /// The strategy could not produce a usable band
    InvalidTickRange,
    /// Threshold or strategy parameters are inconsistent
    InvalidConfig,
    /// Liquidity does not fit the signed delta
    ArithmeticOverflow,
  }

  #[pallet::call]
  impl<T: Config> Pallet<T> {
    /// Deposit anchor swap fees of `pool_key`, (re)placing the wall once the
    /// threshold is crossed
    #[pallet::call_index(0)]
    #[pallet::weight(T::WeightInfo::deposit())]
    pub fn deposit(
      origin: OriginFor<T>,
      pool_key: PoolKey,
      eth_amount: Balance,
      current_tick: i32,
      native_is_zero: bool,
    ) -> DispatchResult {
      let who = ensure_signed(origin)?;
      ensure!(
        who == T::PositionManager::get(),
        Error::<T>::CallerNotPositionManager
      );
      Self::do_deposit(&who, &pool_key, eth_amount, current_tick, native_is_zero)
    }

    /// Replace the threshold policy settings
    #[pallet::call_index(1)]
    #[pallet::weight(T::WeightInfo::set_threshold_settings())]
    pub fn set_threshold_settings(
      origin: OriginFor<T>,
      settings: ThresholdSettings,
    ) -> DispatchResult {
      T::AdminOrigin::ensure_origin(origin)?;
      ensure!(
        settings.min_threshold <= settings.max_threshold,
        Error::<T>::InvalidConfig
      );
      Settings::<T>::put(settings);
      Self::deposit_event(Event::ThresholdSettingsUpdated { settings });
      Ok(())
    }

    /// Switch the strategy used for future bands
    #[pallet::call_index(2)]
    #[pallet::weight(T::WeightInfo::set_tick_range_strategy())]
    pub fn set_tick_range_strategy(
      origin: OriginFor<T>,
      strategy: TickRangeKind,
    ) -> DispatchResult {
      T::AdminOrigin::ensure_origin(origin)?;
      ensure!(
        strategy.width_in_spacings() > 0,
        Error::<T>::InvalidConfig
      );
      ActiveTickRange::<T>::put(strategy);
      Self::deposit_event(Event::StrategyUpdated { strategy });
      Ok(())
    }

    /// Route a pool's fees to its treasury instead of the wall
    #[pallet::call_index(3)]
    #[pallet::weight(T::WeightInfo::set_disabled_state())]
    pub fn set_disabled_state(
      origin: OriginFor<T>,
      pool_key: PoolKey,
      disabled: bool,
    ) -> DispatchResult {
      T::AdminOrigin::ensure_origin(origin)?;
      let pool_id = pool_key.pool_id();
      DisabledPools::<T>::insert(pool_id, disabled);
      Self::deposit_event(Event::DisabledStateUpdated { pool_id, disabled });
      Ok(())
    }
  }

  impl<T: Config> Pallet<T> {
    pub fn account_id() -> T::AccountId {
      T::PalletId::get().into_account_truncating()
    }

    pub fn do_deposit(
      payer: &T::AccountId,
      pool_key: &PoolKey,
      eth_amount: Balance,
      current_tick: i32,
      native_is_zero: bool,
    ) -> DispatchResult {
      if eth_amount.is_zero() {
        return Ok(());
      }
      let anchor = T::NativeToken::get();
      ensure!(
        pool_key.native_is_zero(anchor) == Some(native_is_zero),
        Error::<T>::InvalidPoolKey
      );
      let token = pool_key
        .non_native(anchor)
        .ok_or(Error::<T>::InvalidPoolKey)?;
      let pool_id = pool_key.pool_id();
      let mut wall = PoolWalls::<T>::get(pool_id);
      wall.cumulative_swap_fees = wall.cumulative_swap_fees.saturating_add(eth_amount);

      if DisabledPools::<T>::get(pool_id) {
        PoolWalls::<T>::insert(pool_id, &wall);
        let treasury = T::Treasuries::treasury_account(&token);
        Self::transfer_asset(payer, &treasury, anchor, eth_amount)?;
        Self::deposit_event(Event::FeesForwarded {
          pool_id,
          recipient: treasury,
          amount: eth_amount,
        });
        return Ok(());
      }

      wall.pending_eth_fees = wall.pending_eth_fees.saturating_add(eth_amount);
      PoolWalls::<T>::insert(pool_id, &wall);
      Self::transfer_asset(payer, &Self::account_id(), anchor, eth_amount)?;
      Self::deposit_event(Event::DepositReceived {
        pool_id,
        amount: eth_amount,
        pending_eth_fees: wall.pending_eth_fees,
        cumulative_swap_fees: wall.cumulative_swap_fees,
      });

      let threshold = Self::threshold(&pool_id, wall.cumulative_swap_fees);
      Self::deposit_event(Event::ThresholdCalculated {
        pool_id,
        cumulative_swap_fees: wall.cumulative_swap_fees,
        threshold,
      });
      if wall.pending_eth_fees < threshold {
        return Ok(());
      }

      let total_fees = wall.pending_eth_fees;
      wall.pending_eth_fees = 0;
      if wall.initialized {
        Self::reposition(pool_key, pool_id, token, wall, total_fees, current_tick, native_is_zero)
      } else {
        Self::place_first(pool_key, pool_id, wall, total_fees, current_tick, native_is_zero)
      }
    }

    fn place_first(
      pool_key: &PoolKey,
      pool_id: PoolId,
      mut wall: PoolWallState,
      total_fees: Balance,
      current_tick: i32,
      native_is_zero: bool,
    ) -> DispatchResult {
      let (tick_lower, tick_upper, liquidity) =
        Self::plan_band(pool_key, current_tick, native_is_zero, total_fees)?;
      wall.initialized = true;
      wall.tick_lower = tick_lower;
      wall.tick_upper = tick_upper;
      wall.liquidity = liquidity;
      PoolWalls::<T>::insert(pool_id, &wall);

      T::Amm::modify_liquidity(
        &Self::account_id(),
        pool_key,
        tick_lower,
        tick_upper,
        Self::signed_liquidity(liquidity)?,
      )?;

      log::debug!(
        target: LOG_TARGET,
        "wall placed at [{}, {}) with {} liquidity from {} anchor",
        tick_lower,
        tick_upper,
        liquidity,
        total_fees
      );
      Self::deposit_event(Event::PositionCreated {
        pool_id,
        tick_lower,
        tick_upper,
        liquidity,
        eth_amount: total_fees,
      });
      Ok(())
    }

    fn reposition(
      pool_key: &PoolKey,
      pool_id: PoolId,
      token: AssetKind,
      mut wall: PoolWallState,
      total_fees: Balance,
      current_tick: i32,
      native_is_zero: bool,
    ) -> DispatchResult {
      let wall_account = Self::account_id();
      let (old_tick_lower, old_tick_upper, old_liquidity) =
        (wall.tick_lower, wall.tick_upper, wall.liquidity);
      wall.liquidity = 0;
      PoolWalls::<T>::insert(pool_id, &wall);

      let (eth_withdrawn, tokens_withdrawn) = if old_liquidity.is_zero() {
        (0, 0)
      } else {
        let delta = T::Amm::modify_liquidity(
          &wall_account,
          pool_key,
          old_tick_lower,
          old_tick_upper,
          Self::signed_liquidity(old_liquidity)?
            .checked_neg()
            .ok_or(Error::<T>::ArithmeticOverflow)?,
        )?;
        let (eth, tokens) = delta.split(native_is_zero);
        (Self::owed(eth), Self::owed(tokens))
      };

      let total_eth = eth_withdrawn.saturating_add(total_fees);
      let (tick_lower, tick_upper, liquidity) =
        Self::plan_band(pool_key, current_tick, native_is_zero, total_eth)?;
      wall.tick_lower = tick_lower;
      wall.tick_upper = tick_upper;
      wall.liquidity = liquidity;
      PoolWalls::<T>::insert(pool_id, &wall);

      T::Amm::modify_liquidity(
        &wall_account,
        pool_key,
        tick_lower,
        tick_upper,
        Self::signed_liquidity(liquidity)?,
      )?;

      let treasury = T::Treasuries::treasury_account(&token);
      Self::transfer_asset(&wall_account, &treasury, token, tokens_withdrawn)?;

      log::debug!(
        target: LOG_TARGET,
        "wall moved from [{}, {}) to [{}, {}) with {} anchor, {} tokens forwarded",
        old_tick_lower,
        old_tick_upper,
        tick_lower,
        tick_upper,
        total_eth,
        tokens_withdrawn
      );
      Self::deposit_event(Event::PositionRepositioned {
        pool_id,
        old_tick_lower,
        old_tick_upper,
        tick_lower,
        tick_upper,
        liquidity,
        eth_amount: total_eth,
        tokens_forwarded: tokens_withdrawn,
      });
      Ok(())
    }

    /// Band from the active strategy and the liquidity `eth_amount` funds in it
    fn plan_band(
      pool_key: &PoolKey,
      current_tick: i32,
      native_is_zero: bool,
      eth_amount: Balance,
    ) -> Result<(i32, i32, u128), DispatchError> {
      let (tick_lower, tick_upper) = ActiveTickRange::<T>::get()
        .calculate_tick_range(pool_key, current_tick, native_is_zero)
        .ok_or(Error::<T>::InvalidTickRange)?;
      let sqrt_lower = sqrt_price_at_tick(tick_lower).map_err(|_| Error::<T>::InvalidTickRange)?;
      let sqrt_upper = sqrt_price_at_tick(tick_upper).map_err(|_| Error::<T>::InvalidTickRange)?;
      let liquidity = if native_is_zero {
        liquidity_for_amount0(sqrt_lower, sqrt_upper, eth_amount)
      } else {
        liquidity_for_amount1(sqrt_lower, sqrt_upper, eth_amount)
      }
      .ok_or(Error::<T>::ArithmeticOverflow)?;
      if liquidity.is_zero() {
        log::warn!(
          target: LOG_TARGET,
          "{} anchor funds no liquidity in [{}, {})",
          eth_amount,
          tick_lower,
          tick_upper
        );
      }
      Ok((tick_lower, tick_upper, liquidity))
    }

    /// `(anchor, token, pending_eth_fees)` held by the wall of `pool_key` at `current_tick`
    pub fn position(
      pool_key: &PoolKey,
      current_tick: i32,
    ) -> Result<(Balance, Balance, Balance), DispatchError> {
      let native_is_zero = pool_key
        .native_is_zero(T::NativeToken::get())
        .ok_or(Error::<T>::InvalidPoolKey)?;
      let wall = PoolWalls::<T>::get(pool_key.pool_id());
      if !wall.initialized || wall.liquidity.is_zero() {
        return Ok((0, 0, wall.pending_eth_fees));
      }
      let sqrt_price = sqrt_price_at_tick(current_tick).map_err(|_| Error::<T>::InvalidTickRange)?;
      let sqrt_lower = sqrt_price_at_tick(wall.tick_lower).map_err(|_| Error::<T>::InvalidTickRange)?;
      let sqrt_upper = sqrt_price_at_tick(wall.tick_upper).map_err(|_| Error::<T>::InvalidTickRange)?;
      let (amount0, amount1) =
        amounts_for_liquidity(sqrt_price, sqrt_lower, sqrt_upper, wall.liquidity, false)
          .ok_or(Error::<T>::ArithmeticOverflow)?;
      let (eth, tokens) = if native_is_zero {
        (amount0, amount1)
      } else {
        (amount1, amount0)
      };
      Ok((eth, tokens, wall.pending_eth_fees))
    }

    fn signed_liquidity(liquidity: u128) -> Result<i128, DispatchError> {
      i128::try_from(liquidity).map_err(|_| Error::<T>::ArithmeticOverflow.into())
    }

    fn owed(amount: i128) -> Balance {
      Balance::try_from(amount).unwrap_or_default()
    }

    fn transfer_asset(
      from: &T::AccountId,
      to: &T::AccountId,
      asset: AssetKind,
      amount: Balance,
    ) -> DispatchResult {
      if amount.is_zero() {
        return Ok(());
      }
      match asset {
        AssetKind::Native => {
          <T::Currency as NativeMutate<T::AccountId>>::transfer(
            from,
            to,
            amount,
            Preservation::Expendable,
          )
          .map(|_| ())
        }
        AssetKind::Local(id) => {
          T::Assets::transfer(id, from, to, amount, Preservation::Expendable).map(|_| ())
        }
      }
    }
  }

  /// Genesis configuration
  #[pallet::genesis_config]
  #[derive(frame::prelude::DefaultNoBound)]
  pub struct GenesisConfig<T: Config> {
    #[serde(skip)]
    pub _marker: core::marker::PhantomData<T>,
  }

  #[pallet::genesis_build]
  impl<T: Config> BuildGenesisConfig for GenesisConfig<T> {
    fn build(&self) {
      // Wall account survives zero native balance via provider reference
      frame_system::Pallet::<T>::inc_providers(&Pallet::<T>::account_id());
    }
  }
}
