//! Fee Escrow Pallet
//!
//! Ledger of what the position manager owes to the participants of flaunched pools:
//!
//! - **Fee balances**: anchor swap fees credited per recipient and withdrawn on
//!   demand, optionally unwrapped to native currency. Treasuries pull theirs through
//!   [`primitives::FeeWithdrawal`] before every action.
//! - **Token allocations**: referral rewards in flaunched tokens, claimable as is or
//!   swapped to the anchor and paid in native currency.
//!
//! Every entry is zeroed before the matching transfer, swap or claim hook runs.

#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

pub use pallet::*;

#[cfg(test)]
pub mod mock;

#[cfg(feature = "runtime-benchmarks")]
mod benchmarking;

pub mod weights;
pub use weights::WeightInfo;

pub const LOG_TARGET: &str = "runtime::fee-escrow";

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
  use super::{LOG_TARGET, WeightInfo};
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
  use polkadot_sdk::sp_core::U256;
  use primitives::{
    AnchorUnwrapper, AssetKind, Balance, FeeWithdrawal, LiquidityPrimitive, OnTokensClaimed,
    PoolId, PoolKeyLookup, SwapParams,
  };

  #[pallet::config]
  pub trait Config: frame_system::Config<RuntimeEvent: From<Event<Self>>> {
    /// The assets pallet for managing local fungible tokens (AssetKind::Local)
    type Assets: FungiblesInspect<Self::AccountId, AssetId = u32, Balance = Balance>
      + FungiblesMutate<Self::AccountId, AssetId = u32, Balance = Balance>;

    /// The currency trait for managing native tokens (AssetKind::Native)
    type Currency: NativeInspect<Self::AccountId, Balance = Balance>
      + NativeMutate<Self::AccountId, Balance = Balance>;

    /// Pool engine used to sell claimed tokens
    type Amm: LiquidityPrimitive<Self::AccountId>;

    /// Pool of each flaunched token
    type Pools: PoolKeyLookup;

    /// Turns wrapped anchor held by the escrow into native currency
    type Unwrapper: AnchorUnwrapper<Self::AccountId>;

    /// Notified between zeroing an allocation and paying it out
    type OnClaim: OnTokensClaimed<Self::AccountId>;

    /// Wrapped anchor token fees are denominated in
    #[pallet::constant]
    type NativeToken: Get<AssetKind>;

    /// The only account allowed to credit balances and allocations
    type PositionManager: Get<Self::AccountId>;

    /// The pallet ID; its account holds everything owed
    #[pallet::constant]
    type PalletId: Get<PalletId>;

    /// Most tokens a single claim may name
    #[pallet::constant]
    type MaxClaimTokens: Get<u32>;

    /// Weight information for extrinsics
    type WeightInfo: WeightInfo;

    /// Helper for benchmarking
    #[cfg(feature = "runtime-benchmarks")]
    type BenchmarkHelper: crate::BenchmarkHelper<Self::AccountId>;
  }

  #[pallet::pallet]
  pub struct Pallet<T>(_);

  /// Withdrawable anchor fees by recipient
  #[pallet::storage]
  #[pallet::getter(fn fee_balance)]
  pub type FeeBalances<T: Config> =
    StorageMap<_, Blake2_128Concat, T::AccountId, Balance, ValueQuery>;

  /// Claimable referral tokens by (user, token)
  #[pallet::storage]
  #[pallet::getter(fn token_allocation)]
  pub type TokenAllocations<T: Config> = StorageDoubleMap<
    _,
    Blake2_128Concat,
    T::AccountId,
    Blake2_128Concat,
    AssetKind,
    Balance,
    ValueQuery,
  >;

  #[pallet::event]
  #[pallet::generate_deposit(pub(super) fn deposit_event)]
  pub enum Event<T: Config> {
    FeesAllocated {
      pool_id: PoolId,
      recipient: T::AccountId,
      amount: Balance,
    },
    FeesWithdrawn {
      sender: T::AccountId,
      recipient: T::AccountId,
      amount: Balance,
      unwrapped: bool,
    },
    TokensAssigned {
      pool_id: PoolId,
      user: T::AccountId,
      token: AssetKind,
      amount: Balance,
    },
    TokensClaimed {
      user: T::AccountId,
      recipient: T::AccountId,
      token: AssetKind,
      amount: Balance,
    },
    /// Claimed tokens were sold and paid out in native currency
    TokensSwapped {
      user: T::AccountId,
      recipient: T::AccountId,
      token: AssetKind,
      amount_in: Balance,
      eth_out: Balance,
    },
  }

  #[pallet::error]
  pub enum Error<T> {
    /// Only the position manager may credit the ledger
    CallerNotPositionManager,
    /// Every claimed token needs exactly one price limit
    MismatchedTokensAndLimits,
    /// No pool is known for a claimed token
    PoolNotFound,
    /// The anchor itself cannot be swapped to the anchor
    InvalidToken,
    /// Swap paid out more than it took, or took the wrong side
    InvalidSwapResult,
  }

  #[pallet::call]
  impl<T: Config> Pallet<T> {
    /// Credit `amount` of anchor fees from `pool_id` to `recipient`
    #[pallet::call_index(0)]
    #[pallet::weight(T::WeightInfo::allocate_fees())]
    pub fn allocate_fees(
      origin: OriginFor<T>,
      pool_id: PoolId,
      recipient: T::AccountId,
      amount: Balance,
    ) -> DispatchResult {
      let who = Self::ensure_position_manager(origin)?;
      if amount.is_zero() {
        return Ok(());
      }
      FeeBalances::<T>::mutate(&recipient, |balance| {
        *balance = balance.saturating_add(amount)
      });
      Self::transfer_asset(&who, &Self::account_id(), T::NativeToken::get(), amount)?;
      Self::deposit_event(Event::FeesAllocated {
        pool_id,
        recipient,
        amount,
      });
      Ok(())
    }

    /// Pay the caller's fee balance to `recipient`, in native currency if `unwrap`
    #[pallet::call_index(1)]
    #[pallet::weight(T::WeightInfo::withdraw_fees())]
    pub fn withdraw_fees(
      origin: OriginFor<T>,
      recipient: T::AccountId,
      unwrap: bool,
    ) -> DispatchResult {
      let who = ensure_signed(origin)?;
      Self::do_withdraw_fees(&who, &recipient, unwrap).map(|_| ())
    }

    /// Allocate referral `amount` of `token` to `user`
    #[pallet::call_index(2)]
    #[pallet::weight(T::WeightInfo::assign_tokens())]
    pub fn assign_tokens(
      origin: OriginFor<T>,
      pool_id: PoolId,
      user: T::AccountId,
      token: AssetKind,
      amount: Balance,
    ) -> DispatchResult {
      let who = Self::ensure_position_manager(origin)?;
      if amount.is_zero() {
        return Ok(());
      }
      TokenAllocations::<T>::mutate(&user, token, |allocation| {
        *allocation = allocation.saturating_add(amount)
      });
      Self::transfer_asset(&who, &Self::account_id(), token, amount)?;
      Self::deposit_event(Event::TokensAssigned {
        pool_id,
        user,
        token,
        amount,
      });
      Ok(())
    }

    /// Claim the caller's allocations of `tokens` to `recipient`
    #[pallet::call_index(3)]
    #[pallet::weight(T::WeightInfo::claim_tokens(tokens.len() as u32))]
    pub fn claim_tokens(
      origin: OriginFor<T>,
      tokens: BoundedVec<AssetKind, T::MaxClaimTokens>,
      recipient: T::AccountId,
    ) -> DispatchResult {
      let who = ensure_signed(origin)?;
      let escrow = Self::account_id();
      for token in tokens {
        let Some(amount) = Self::take_allocation(&who, token) else {
          continue;
        };
        Self::transfer_asset(&escrow, &recipient, token, amount)?;
        Self::deposit_event(Event::TokensClaimed {
          user: who.clone(),
          recipient: recipient.clone(),
          token,
          amount,
        });
      }
      Ok(())
    }

    /// Claim the caller's allocations of `tokens`, sell each for the anchor down to
    /// its price limit and pay `recipient` in native currency. Tokens left unsold at
    /// the limit are paid to `recipient` as is.
    #[pallet::call_index(4)]
    #[pallet::weight(T::WeightInfo::claim_and_swap(tokens.len() as u32))]
    pub fn claim_and_swap(
      origin: OriginFor<T>,
      tokens: BoundedVec<AssetKind, T::MaxClaimTokens>,
      sqrt_price_limits: BoundedVec<U256, T::MaxClaimTokens>,
      recipient: T::AccountId,
    ) -> DispatchResult {
      let who = ensure_signed(origin)?;
      ensure!(
        tokens.len() == sqrt_price_limits.len(),
        Error::<T>::MismatchedTokensAndLimits
      );
      for (token, limit) in tokens.into_iter().zip(sqrt_price_limits) {
        let Some(amount) = Self::take_allocation(&who, token) else {
          continue;
        };
        let (sold, eth_out) = Self::sell_for_anchor(token, amount, limit)?;
        Self::pay_unwrapped(&recipient, eth_out)?;
        log::debug!(
          target: LOG_TARGET,
          "sold {} of {:?} claimed by {:?} for {} anchor",
          sold,
          token,
          who,
          eth_out
        );
        Self::deposit_event(Event::TokensSwapped {
          user: who.clone(),
          recipient: recipient.clone(),
          token,
          amount_in: sold,
          eth_out,
        });

        // Whatever the price limit left unsold goes out as is
        let unsold = amount.saturating_sub(sold);
        if !unsold.is_zero() {
          Self::transfer_asset(&Self::account_id(), &recipient, token, unsold)?;
          Self::deposit_event(Event::TokensClaimed {
            user: who.clone(),
            recipient: recipient.clone(),
            token,
            amount: unsold,
          });
        }
      }
      Ok(())
    }
  }

  impl<T: Config> Pallet<T> {
    pub fn account_id() -> T::AccountId {
      T::PalletId::get().into_account_truncating()
    }

    fn ensure_position_manager(origin: OriginFor<T>) -> Result<T::AccountId, DispatchError> {
      let who = ensure_signed(origin)?;
      ensure!(
        who == T::PositionManager::get(),
        Error::<T>::CallerNotPositionManager
      );
      Ok(who)
    }

    pub fn do_withdraw_fees(
      owner: &T::AccountId,
      recipient: &T::AccountId,
      unwrap: bool,
    ) -> Result<Balance, DispatchError> {
      let amount = FeeBalances::<T>::take(owner);
      if amount.is_zero() {
        return Ok(0);
      }
      if unwrap {
        Self::pay_unwrapped(recipient, amount)?;
      } else {
        Self::transfer_asset(&Self::account_id(), recipient, T::NativeToken::get(), amount)?;
      }
      Self::deposit_event(Event::FeesWithdrawn {
        sender: owner.clone(),
        recipient: recipient.clone(),
        amount,
        unwrapped: unwrap,
      });
      Ok(amount)
    }

    /// Zero a nonzero allocation and notify the claim hook
    fn take_allocation(who: &T::AccountId, token: AssetKind) -> Option<Balance> {
      let amount = TokenAllocations::<T>::take(who, token);
      if amount.is_zero() {
        return None;
      }
      T::OnClaim::on_tokens_claimed(who, &token, amount);
      Some(amount)
    }

    /// Exact-input sale of escrowed `amount` of `token`; returns `(sold, anchor received)`
    fn sell_for_anchor(
      token: AssetKind,
      amount: Balance,
      sqrt_price_limit_x96: U256,
    ) -> Result<(Balance, Balance), DispatchError> {
      let anchor = T::NativeToken::get();
      ensure!(token != anchor, Error::<T>::InvalidToken);
      let pool_key = T::Pools::pool_key(&token).ok_or(Error::<T>::PoolNotFound)?;
      let native_is_zero = pool_key
        .native_is_zero(anchor)
        .ok_or(Error::<T>::PoolNotFound)?;
      let amount_specified = i128::try_from(amount)
        .map_err(|_| Error::<T>::InvalidSwapResult)?
        .saturating_neg();
      let delta = T::Amm::swap(
        &Self::account_id(),
        &pool_key,
        SwapParams {
          zero_for_one: !native_is_zero,
          amount_specified,
          sqrt_price_limit_x96,
        },
      )?;
      let (eth, tokens) = delta.split(native_is_zero);
      let sold = tokens.unsigned_abs();
      ensure!(
        eth >= 0 && tokens <= 0 && sold <= amount,
        Error::<T>::InvalidSwapResult
      );
      if sold < amount {
        log::warn!(
          target: LOG_TARGET,
          "price limit hit selling {:?}: {} of {} sold",
          token,
          sold,
          amount
        );
      }
      Ok((sold, eth.unsigned_abs()))
    }

    /// Unwrap escrowed anchor and pay it to `recipient` as native currency
    fn pay_unwrapped(recipient: &T::AccountId, amount: Balance) -> DispatchResult {
      if amount.is_zero() {
        return Ok(());
      }
      let escrow = Self::account_id();
      T::Unwrapper::unwrap(&escrow, amount)?;
      Self::transfer_asset(&escrow, recipient, AssetKind::Native, amount)
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

  impl<T: Config> FeeWithdrawal<T::AccountId> for Pallet<T> {
    fn withdraw_fees(
      owner: &T::AccountId,
      recipient: &T::AccountId,
      unwrap: bool,
    ) -> Result<Balance, DispatchError> {
      Self::do_withdraw_fees(owner, recipient, unwrap)
    }
  }

  #[pallet::genesis_config]
  #[derive(frame::prelude::DefaultNoBound)]
  pub struct GenesisConfig<T: Config> {
    #[serde(skip)]
    pub _marker: core::marker::PhantomData<T>,
  }

  #[pallet::genesis_build]
  impl<T: Config> BuildGenesisConfig for GenesisConfig<T> {
    fn build(&self) {
      // Escrow account survives zero native balance between unwrap and payout
      frame_system::Pallet::<T>::inc_providers(&Pallet::<T>::account_id());
    }
  }
}
