//! Pool identity and settlement types shared with the external AMM.

use crate::AssetKind;
use codec::{Decode, DecodeWithMemTracking, Encode, MaxEncodedLen};
use polkadot_sdk::sp_core::U256;
use polkadot_sdk::sp_io::hashing::blake2_256;
use scale_info::TypeInfo;

/// Pool identifier: blake2-256 of the encoded `PoolKey`.
pub type PoolId = [u8; 32];

/// Canonical description of a pool at the AMM. `currency0 < currency1` always holds
/// for keys built through [`PoolKey::new`].
#[derive(
  Clone,
  Copy,
  Debug,
  Decode,
  DecodeWithMemTracking,
  Encode,
  Eq,
  MaxEncodedLen,
  PartialEq,
  TypeInfo,
)]
pub struct PoolKey {
  pub currency0: AssetKind,
  pub currency1: AssetKind,
  /// Pool fee in scaled units; flaunched pools use the dynamic fee engine instead.
  pub fee: u32,
  pub tick_spacing: i32,
}

impl PoolKey {
  /// Build a key with the two currencies in canonical order.
  pub fn new(asset_a: AssetKind, asset_b: AssetKind, fee: u32, tick_spacing: i32) -> Self {
    let (currency0, currency1) = if asset_a < asset_b {
      (asset_a, asset_b)
    } else {
      (asset_b, asset_a)
    };
    Self {
      currency0,
      currency1,
      fee,
      tick_spacing,
    }
  }

  pub fn pool_id(&self) -> PoolId {
    blake2_256(&self.encode())
  }

  /// Whether the anchor token is `currency0`. `None` when the pool does not trade
  /// the anchor at all.
  pub fn native_is_zero(&self, anchor: AssetKind) -> Option<bool> {
    if self.currency0 == anchor {
      Some(true)
    } else if self.currency1 == anchor {
      Some(false)
    } else {
      None
    }
  }

  /// The pool currency that is not the anchor.
  pub fn non_native(&self, anchor: AssetKind) -> Option<AssetKind> {
    self
      .native_is_zero(anchor)
      .map(|zero| if zero { self.currency1 } else { self.currency0 })
  }
}

/// Signed settlement amounts from the caller's perspective: positive components are
/// owed to the caller, negative components are paid by the caller.
#[derive(
  Clone,
  Copy,
  Debug,
  Decode,
  DecodeWithMemTracking,
  Default,
  Encode,
  Eq,
  MaxEncodedLen,
  PartialEq,
  TypeInfo,
)]
pub struct BalanceDelta {
  pub amount0: i128,
  pub amount1: i128,
}

impl BalanceDelta {
  pub fn new(amount0: i128, amount1: i128) -> Self {
    Self { amount0, amount1 }
  }

  /// Split into `(anchor, non_anchor)` components.
  pub fn split(&self, native_is_zero: bool) -> (i128, i128) {
    if native_is_zero {
      (self.amount0, self.amount1)
    } else {
      (self.amount1, self.amount0)
    }
  }
}

/// Swap request forwarded to the AMM. `amount_specified < 0` means exact input.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SwapParams {
  pub zero_for_one: bool,
  pub amount_specified: i128,
  pub sqrt_price_limit_x96: U256,
}
