//! Seams between the Flaunch pallets and the systems they drive but do not own.

use crate::{AssetKind, Balance, BalanceDelta, PoolKey, SwapParams};
use polkadot_sdk::sp_runtime::{DispatchError, DispatchResult};

/// Concentrated-liquidity pool engine.
///
/// Both operations settle immediately against `who`: positive components of the
/// returned delta have been paid to `who`, negative components have been taken
/// from `who`.
pub trait LiquidityPrimitive<AccountId> {
  fn modify_liquidity(
    who: &AccountId,
    pool_key: &PoolKey,
    tick_lower: i32,
    tick_upper: i32,
    liquidity_delta: i128,
  ) -> Result<BalanceDelta, DispatchError>;

  fn swap(
    who: &AccountId,
    pool_key: &PoolKey,
    params: SwapParams,
  ) -> Result<BalanceDelta, DispatchError>;
}

/// Pays out anchor fees held on behalf of `owner`.
pub trait FeeWithdrawal<AccountId> {
  /// Returns the amount paid; zero when nothing was pending.
  fn withdraw_fees(
    owner: &AccountId,
    recipient: &AccountId,
    unwrap: bool,
  ) -> Result<Balance, DispatchError>;
}

impl<AccountId> FeeWithdrawal<AccountId> for () {
  fn withdraw_fees(_: &AccountId, _: &AccountId, _: bool) -> Result<Balance, DispatchError> {
    Ok(0)
  }
}

/// Holder of the governing token of a flaunched token. `None` once burned.
pub trait TokenOwnership<AccountId> {
  fn owner_of(token: &AssetKind) -> Option<AccountId>;
}

/// Converts wrapped anchor held by `who` into native currency held by `who`.
pub trait AnchorUnwrapper<AccountId> {
  fn unwrap(who: &AccountId, amount: Balance) -> DispatchResult;
}

/// Account receiving a token's skimmed and forwarded assets.
pub trait TreasuryLookup<AccountId> {
  fn treasury_account(token: &AssetKind) -> AccountId;
}

/// Pool a flaunched token trades in.
pub trait PoolKeyLookup {
  fn pool_key(token: &AssetKind) -> Option<PoolKey>;
}

/// Observer notified after an allocation is zeroed and before it is paid out.
pub trait OnTokensClaimed<AccountId> {
  fn on_tokens_claimed(who: &AccountId, token: &AssetKind, amount: Balance);
}

impl<AccountId> OnTokensClaimed<AccountId> for () {
  fn on_tokens_claimed(_: &AccountId, _: &AssetKind, _: Balance) {}
}
