//! Treasury Actions Pallet
//!
//! Every flaunched token gets a treasury: a sub-account of this pallet tied to the
//! token's pool. Fee allocations accrue to it in the fee escrow and bid wall skims are
//! forwarded to it. Whoever holds the token's governing position, or a delegate they
//! appointed, may spend the treasury by executing one of the globally approved
//! actions.
//!
//! ## Execution
//!
//! [`Pallet::execute_action`] checks the approval registry and the caller's rights,
//! pulls any fees still escrowed for the treasury, then dispatches through
//! [`Config::Actions`]. The change in both pool currencies held by the treasury is
//! reported in [`Event::ActionExecuted`].

#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

pub use pallet::*;

#[cfg(test)]
pub mod mock;

#[cfg(feature = "runtime-benchmarks")]
mod benchmarking;

pub mod actions;
pub mod weights;

pub use actions::{ActionId, StandardActions, TreasuryAction, action_ids};
pub use weights::WeightInfo;

pub const LOG_TARGET: &str = "runtime::treasury-actions";

/// Helper for benchmarking
#[cfg(feature = "runtime-benchmarks")]
pub trait BenchmarkHelper<AccountId> {
  /// Token with a pool, governed by `owner`
  fn flaunched_token(owner: &AccountId) -> (primitives::AssetKind, primitives::PoolKey);
}

#[frame::pallet]
pub mod pallet {
  use super::{ActionId, LOG_TARGET, TreasuryAction, WeightInfo, actions};
  use alloc::vec::Vec;
  use frame::deps::{
    frame_support::traits::{
      fungible::{Inspect as NativeInspect, Mutate as NativeMutate},
      fungibles::{Inspect as FungiblesInspect, Mutate as FungiblesMutate},
    },
    sp_runtime::traits::AccountIdConversion,
  };
  use frame::prelude::*;
  use primitives::{
    AnchorUnwrapper, AssetKind, Balance, FeeWithdrawal, LiquidityPrimitive, PoolId, PoolKey,
    PoolKeyLookup, TokenOwnership, TreasuryLookup,
  };

  #[pallet::config]
  pub trait Config: frame_system::Config<RuntimeEvent: From<Event<Self>>> {
    /// The assets pallet for managing local fungible tokens (AssetKind::Local)
    type Assets: FungiblesInspect<Self::AccountId, AssetId = u32, Balance = Balance>
      + FungiblesMutate<Self::AccountId, AssetId = u32, Balance = Balance>;

    /// The currency trait for managing native tokens (AssetKind::Native)
    type Currency: NativeInspect<Self::AccountId, Balance = Balance>
      + NativeMutate<Self::AccountId, Balance = Balance>;

    /// Pool engine used by buy-backs
    type Amm: LiquidityPrimitive<Self::AccountId>;

    /// Source of fees escrowed for treasuries
    type Fees: FeeWithdrawal<Self::AccountId>;

    /// Registry of governing token holders
    type Ownership: TokenOwnership<Self::AccountId>;

    /// Turns wrapped anchor held by a treasury into native currency
    type Unwrapper: AnchorUnwrapper<Self::AccountId>;

    /// Action implementations
    type Actions: TreasuryAction<Self::AccountId>;

    /// Wrapped anchor token every flaunched token is paired with
    #[pallet::constant]
    type NativeToken: Get<AssetKind>;

    /// The only account allowed to open treasuries
    type PositionManager: Get<Self::AccountId>;

    /// The pallet ID; treasuries are its sub-accounts
    #[pallet::constant]
    type PalletId: Get<PalletId>;

    /// Largest action payload accepted
    #[pallet::constant]
    type MaxActionData: Get<u32>;

    /// Origin allowed to approve and unapprove actions
    type AdminOrigin: EnsureOrigin<Self::RuntimeOrigin>;

    /// Weight information for extrinsics
    type WeightInfo: WeightInfo;

    /// Helper for benchmarking
    #[cfg(feature = "runtime-benchmarks")]
    type BenchmarkHelper: crate::BenchmarkHelper<Self::AccountId>;
  }

  #[pallet::pallet]
  pub struct Pallet<T>(_);

  /// Actions any treasury may execute
  #[pallet::storage]
  pub type ApprovedActions<T: Config> = StorageMap<_, Blake2_128Concat, ActionId, (), OptionQuery>;

  /// Pool of every token that has a treasury
  #[pallet::storage]
  #[pallet::getter(fn treasury_pool)]
  pub type Treasuries<T: Config> = StorageMap<_, Blake2_128Concat, AssetKind, PoolKey, OptionQuery>;

  /// Delegates by (token, delegate), valued by the holder that appointed them
  #[pallet::storage]
  #[pallet::getter(fn delegate_of)]
  pub type Delegates<T: Config> = StorageDoubleMap<
    _,
    Blake2_128Concat,
    AssetKind,
    Blake2_128Concat,
    T::AccountId,
    T::AccountId,
    OptionQuery,
  >;

  #[pallet::event]
  #[pallet::generate_deposit(pub(super) fn deposit_event)]
  pub enum Event<T: Config> {
    ActionApproved { action: ActionId },
    ActionUnapproved { action: ActionId },
    TreasuryCreated {
      token: AssetKind,
      pool_id: PoolId,
      account: T::AccountId,
    },
    DelegateUpdated {
      token: AssetKind,
      delegate: T::AccountId,
      enabled: bool,
    },
    /// Signed change of the treasury's pool currency balances across the action
    ActionExecuted {
      action: ActionId,
      token: AssetKind,
      pool_id: PoolId,
      token0_delta: i128,
      token1_delta: i128,
    },
  }

  #[pallet::error]
  pub enum Error<T> {
    /// Only the position manager may open treasuries
    CallerNotPositionManager,
    /// Action is not in the approval registry
    ActionNotApproved,
    /// The governing token has no holder anymore
    OwnershipBurned,
    /// Caller neither holds the governing token nor is a delegate
    Unauthorized,
    /// Caller was delegated by a previous holder
    NotOriginalOwner,
    TreasuryAlreadyExists,
    TreasuryNotFound,
    /// Pool does not pair the token with the anchor
    InvalidPoolKey,
    /// Approved id without an implementation
    UnknownAction,
    /// Payload does not decode for the action
    InvalidActionData,
  }

  #[pallet::call]
  impl<T: Config> Pallet<T> {
    #[pallet::call_index(0)]
    #[pallet::weight(T::WeightInfo::approve_action())]
    pub fn approve_action(origin: OriginFor<T>, action: ActionId) -> DispatchResult {
      T::AdminOrigin::ensure_origin(origin)?;
      ApprovedActions::<T>::insert(action, ());
      Self::deposit_event(Event::ActionApproved { action });
      Ok(())
    }

    #[pallet::call_index(1)]
    #[pallet::weight(T::WeightInfo::unapprove_action())]
    pub fn unapprove_action(origin: OriginFor<T>, action: ActionId) -> DispatchResult {
      T::AdminOrigin::ensure_origin(origin)?;
      ApprovedActions::<T>::remove(action);
      Self::deposit_event(Event::ActionUnapproved { action });
      Ok(())
    }

    /// Open the treasury of `token`, which trades in `pool_key`
    #[pallet::call_index(2)]
    #[pallet::weight(T::WeightInfo::create_treasury())]
    pub fn create_treasury(
      origin: OriginFor<T>,
      token: AssetKind,
      pool_key: PoolKey,
    ) -> DispatchResult {
      let who = ensure_signed(origin)?;
      ensure!(
        who == T::PositionManager::get(),
        Error::<T>::CallerNotPositionManager
      );
      ensure!(
        pool_key.non_native(T::NativeToken::get()) == Some(token),
        Error::<T>::InvalidPoolKey
      );
      ensure!(
        !Treasuries::<T>::contains_key(token),
        Error::<T>::TreasuryAlreadyExists
      );
      Treasuries::<T>::insert(token, pool_key);
      let account = Self::treasury_account_of(&token);
      // Treasury survives zero native balance between unwrap and payout
      frame_system::Pallet::<T>::inc_providers(&account);
      Self::deposit_event(Event::TreasuryCreated {
        token,
        pool_id: pool_key.pool_id(),
        account,
      });
      Ok(())
    }

    /// Let `delegate` execute actions for `token` while the caller holds it
    #[pallet::call_index(3)]
    #[pallet::weight(T::WeightInfo::set_delegate())]
    pub fn set_delegate(
      origin: OriginFor<T>,
      token: AssetKind,
      delegate: T::AccountId,
      enabled: bool,
    ) -> DispatchResult {
      let who = ensure_signed(origin)?;
      let owner = T::Ownership::owner_of(&token).ok_or(Error::<T>::OwnershipBurned)?;
      ensure!(who == owner, Error::<T>::Unauthorized);
      if enabled {
        Delegates::<T>::insert(token, &delegate, owner);
      } else {
        Delegates::<T>::remove(token, &delegate);
      }
      Self::deposit_event(Event::DelegateUpdated {
        token,
        delegate,
        enabled,
      });
      Ok(())
    }

    /// Execute approved `action` with the treasury of `token`
    #[pallet::call_index(4)]
    #[pallet::weight(T::WeightInfo::execute_action(data.len() as u32))]
    pub fn execute_action(
      origin: OriginFor<T>,
      token: AssetKind,
      action: ActionId,
      data: BoundedVec<u8, T::MaxActionData>,
    ) -> DispatchResult {
      let who = ensure_signed(origin)?;
      ensure!(
        ApprovedActions::<T>::contains_key(action),
        Error::<T>::ActionNotApproved
      );
      let pool_key = Treasuries::<T>::get(token).ok_or(Error::<T>::TreasuryNotFound)?;
      Self::ensure_can_execute(&who, &token)?;

      let treasury = Self::treasury_account_of(&token);
      let pulled = T::Fees::withdraw_fees(&treasury, &treasury, false)?;
      if pulled > 0 {
        log::debug!(target: LOG_TARGET, "treasury of {:?} pulled {} in fees", token, pulled);
      }

      let before = Self::pool_balances(&pool_key, &treasury);
      T::Actions::execute(action, &treasury, &pool_key, &data)?;
      let after = Self::pool_balances(&pool_key, &treasury);
      let (token0_delta, token1_delta) = (
        Self::signed_delta(before.0, after.0),
        Self::signed_delta(before.1, after.1),
      );

      log::debug!(
        target: LOG_TARGET,
        "action {} executed by {:?} for {:?}: ({}, {})",
        action,
        who,
        token,
        token0_delta,
        token1_delta
      );
      Self::deposit_event(Event::ActionExecuted {
        action,
        token,
        pool_id: pool_key.pool_id(),
        token0_delta,
        token1_delta,
      });
      Ok(())
    }
  }

  impl<T: Config> Pallet<T> {
    pub fn treasury_account_of(token: &AssetKind) -> T::AccountId {
      T::PalletId::get().into_sub_account_truncating(token)
    }

    /// Holder of `token`, or a delegate appointed by the current holder
    fn ensure_can_execute(who: &T::AccountId, token: &AssetKind) -> DispatchResult {
      let owner = T::Ownership::owner_of(token).ok_or(Error::<T>::OwnershipBurned)?;
      if *who == owner {
        return Ok(());
      }
      match Delegates::<T>::get(token, who) {
        None => Err(Error::<T>::Unauthorized.into()),
        Some(grantor) if grantor != owner => Err(Error::<T>::NotOriginalOwner.into()),
        Some(_) => Ok(()),
      }
    }

    fn pool_balances(pool_key: &PoolKey, who: &T::AccountId) -> (Balance, Balance) {
      (
        actions::balance_of::<T>(pool_key.currency0, who),
        actions::balance_of::<T>(pool_key.currency1, who),
      )
    }

    fn signed_delta(before: Balance, after: Balance) -> i128 {
      if after >= before {
        i128::try_from(after - before).unwrap_or(i128::MAX)
      } else {
        i128::try_from(before - after).map_or(i128::MIN, |lost| -lost)
      }
    }
  }

  impl<T: Config> TreasuryLookup<T::AccountId> for Pallet<T> {
    fn treasury_account(token: &AssetKind) -> T::AccountId {
      Self::treasury_account_of(token)
    }
  }

  impl<T: Config> PoolKeyLookup for Pallet<T> {
    fn pool_key(token: &AssetKind) -> Option<PoolKey> {
      Treasuries::<T>::get(token)
    }
  }

  /// Genesis configuration
  #[pallet::genesis_config]
  pub struct GenesisConfig<T: Config> {
    /// Actions approved from the first block
    pub approved_actions: Vec<ActionId>,
    pub _marker: core::marker::PhantomData<T>,
  }

  impl<T: Config> Default for GenesisConfig<T> {
    fn default() -> Self {
      Self {
        approved_actions: Vec::new(),
        _marker: Default::default(),
      }
    }
  }

  #[pallet::genesis_build]
  impl<T: Config> BuildGenesisConfig for GenesisConfig<T> {
    fn build(&self) {
      for action in &self.approved_actions {
        ApprovedActions::<T>::insert(action, ());
      }
    }
  }
}
