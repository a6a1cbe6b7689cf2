//! Built-in treasury actions.
//!
//! An action runs with the treasury account as the actor and may move anything the
//! treasury holds. The pallet measures what it did by snapshotting balances around
//! the call, so actions report success or failure only.

use crate::pallet::{Config, Error};
use alloc::vec::Vec;
use codec::{Decode, DecodeAll};
use frame::deps::{
  frame_support::traits::{
    fungible::{Inspect as NativeInspect, Mutate as NativeMutate},
    fungibles::{Inspect as FungiblesInspect, Mutate as FungiblesMutate},
    tokens::{Fortitude, Precision, Preservation},
  },
  sp_runtime::{DispatchError, DispatchResult, traits::Zero},
};
use frame::prelude::Get;
use polkadot_sdk::sp_core::U256;
use primitives::{AnchorUnwrapper, AssetKind, Balance, LiquidityPrimitive, PoolKey, SwapParams};

/// Identifier actions are approved and dispatched by
pub type ActionId = u32;

/// Ids of [`StandardActions`]
pub mod action_ids {
  use super::ActionId;

  /// Does nothing; exercises the dispatch path
  pub const BLANK: ActionId = 0;
  /// Pays `(recipient, amount0, amount1)` entries, anchor side in native currency
  pub const DISTRIBUTE: ActionId = 1;
  /// Sells the whole token balance for the anchor down to a price limit
  pub const BUY_BACK: ActionId = 2;
  /// Burns the whole token balance
  pub const BURN_TOKENS: ActionId = 3;
}

/// Executes an approved action on behalf of `treasury`.
pub trait TreasuryAction<AccountId> {
  fn execute(
    action: ActionId,
    treasury: &AccountId,
    pool_key: &PoolKey,
    data: &[u8],
  ) -> DispatchResult;
}

/// One `DISTRIBUTE` payout, amounts in pool currency order
pub type Distribution<AccountId> = (AccountId, Balance, Balance);

pub struct StandardActions<T>(core::marker::PhantomData<T>);

impl<T: Config> TreasuryAction<T::AccountId> for StandardActions<T> {
  fn execute(
    action: ActionId,
    treasury: &T::AccountId,
    pool_key: &PoolKey,
    data: &[u8],
  ) -> DispatchResult {
    match action {
      action_ids::BLANK => Ok(()),
      action_ids::DISTRIBUTE => {
        let payouts = decode_data::<T, Vec<Distribution<T::AccountId>>>(data)?;
        Self::distribute(treasury, pool_key, payouts)
      }
      action_ids::BUY_BACK => {
        let sqrt_price_limit_x96 = decode_data::<T, U256>(data)?;
        Self::buy_back(treasury, pool_key, sqrt_price_limit_x96)
      }
      action_ids::BURN_TOKENS => Self::burn_tokens(treasury, pool_key),
      _ => Err(Error::<T>::UnknownAction.into()),
    }
  }
}

impl<T: Config> StandardActions<T> {
  fn distribute(
    treasury: &T::AccountId,
    pool_key: &PoolKey,
    payouts: Vec<Distribution<T::AccountId>>,
  ) -> DispatchResult {
    let (anchor, token) = anchor_and_token::<T>(pool_key)?;
    let anchor_is_zero = pool_key.currency0 == anchor;
    let split = |(_, amount0, amount1): &Distribution<T::AccountId>| {
      if anchor_is_zero {
        (*amount0, *amount1)
      } else {
        (*amount1, *amount0)
      }
    };

    let anchor_total = payouts
      .iter()
      .try_fold(Balance::zero(), |total, payout| total.checked_add(split(payout).0))
      .ok_or(Error::<T>::InvalidActionData)?;
    if !anchor_total.is_zero() {
      T::Unwrapper::unwrap(treasury, anchor_total)?;
    }

    for payout in &payouts {
      let (eth, tokens) = split(payout);
      transfer_asset::<T>(treasury, &payout.0, AssetKind::Native, eth)?;
      transfer_asset::<T>(treasury, &payout.0, token, tokens)?;
    }
    Ok(())
  }

  fn buy_back(
    treasury: &T::AccountId,
    pool_key: &PoolKey,
    sqrt_price_limit_x96: U256,
  ) -> DispatchResult {
    let (anchor, token) = anchor_and_token::<T>(pool_key)?;
    let holding = balance_of::<T>(token, treasury);
    if holding.is_zero() {
      return Ok(());
    }
    let amount_specified = i128::try_from(holding)
      .map_err(|_| Error::<T>::InvalidActionData)?
      .saturating_neg();
    T::Amm::swap(
      treasury,
      pool_key,
      SwapParams {
        zero_for_one: pool_key.currency1 == anchor,
        amount_specified,
        sqrt_price_limit_x96,
      },
    )?;
    Ok(())
  }

  fn burn_tokens(treasury: &T::AccountId, pool_key: &PoolKey) -> DispatchResult {
    let (_, token) = anchor_and_token::<T>(pool_key)?;
    let holding = balance_of::<T>(token, treasury);
    if holding.is_zero() {
      return Ok(());
    }
    match token {
      AssetKind::Native => T::Currency::burn_from(
        treasury,
        holding,
        Preservation::Expendable,
        Precision::Exact,
        Fortitude::Polite,
      ),
      AssetKind::Local(id) => T::Assets::burn_from(
        id,
        treasury,
        holding,
        Preservation::Expendable,
        Precision::Exact,
        Fortitude::Polite,
      ),
    }
    .map(|_| ())
  }
}

fn decode_data<T: Config, D: Decode>(data: &[u8]) -> Result<D, DispatchError> {
  D::decode_all(&mut &data[..]).map_err(|_| Error::<T>::InvalidActionData.into())
}

fn anchor_and_token<T: Config>(pool_key: &PoolKey) -> Result<(AssetKind, AssetKind), DispatchError> {
  let anchor = T::NativeToken::get();
  let token = pool_key
    .non_native(anchor)
    .ok_or(Error::<T>::InvalidPoolKey)?;
  Ok((anchor, token))
}

pub(crate) fn balance_of<T: Config>(asset: AssetKind, who: &T::AccountId) -> Balance {
  match asset {
    AssetKind::Native => T::Currency::balance(who),
    AssetKind::Local(id) => T::Assets::balance(id, who),
  }
}

pub(crate) fn transfer_asset<T: Config>(
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
