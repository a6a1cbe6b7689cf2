//! Ecosystem Constants for the Flaunch pallets
//!
//! Pallet identifiers and the calibration parameters of the fee engine, the bid wall
//! and the treasury. Runtime configurations reference these so that every pallet
//! agrees on the same scales.

/// Balance type alias for consistency across ecosystem
pub type Balance = u128;

/// Pallet identifiers for deriving pallet-owned accounts.
pub mod pallet_ids {
  /// Bid wall pallet ID (protocol-owned liquidity)
  pub const BID_WALL_PALLET_ID: &[u8; 8] = b"flbidwal";

  /// Fee escrow pallet ID (fee and referral allocations)
  pub const FEE_ESCROW_PALLET_ID: &[u8; 8] = b"flescrow";

  /// Treasury actions pallet ID (per-token treasuries are sub-accounts)
  pub const TREASURY_ACTIONS_PALLET_ID: &[u8; 8] = b"fltreasy";
}

/// Economic parameters shared by the fee engine and the bid wall.
pub mod params {
  use super::Balance;

  /// One whole anchor token (18 decimals).
  pub const ANCHOR_UNIT: Balance = 1_000_000_000_000_000_000;

  /// Scaled fees are basis points multiplied by this factor.
  pub const FEE_SCALE: u32 = 100;

  /// 100% expressed as a scaled fee.
  pub const FEE_DENOMINATOR: u32 = 1_000_000;

  /// Fee floor (1%).
  pub const MIN_FEE_SCALED: u32 = 10_000;

  /// Fee ceiling (50%).
  pub const MAX_FEE_SCALED: u32 = 500_000;

  /// Window, in seconds, over which a raised fee decays back to the floor and over
  /// which the volume accumulator fully decays.
  pub const ROLLING_WINDOW_SECS: u64 = 3_600;

  /// Total supply of every flaunched token (100bn tokens, 18 decimals).
  pub const TOKEN_TOTAL_SUPPLY: Balance = 100_000_000_000 * ANCHOR_UNIT;

  /// Accumulated volume at which the fee starts rising (0.5% of supply).
  pub const FEE_INCREASE_THRESHOLD: Balance = TOKEN_TOTAL_SUPPLY / 200;

  /// Static swap-fee threshold gating bid wall rebalancing (0.1 anchor).
  pub const BID_WALL_BASE_THRESHOLD: Balance = ANCHOR_UNIT / 10;

  /// Lower bound of the dynamic threshold range (0.05 anchor).
  pub const BID_WALL_MIN_THRESHOLD: Balance = ANCHOR_UNIT / 20;

  /// Upper bound of the dynamic threshold range (0.5 anchor).
  pub const BID_WALL_MAX_THRESHOLD: Balance = ANCHOR_UNIT / 2;

  /// Cumulative fees per dynamic threshold bracket (10 anchor).
  pub const BID_WALL_BRACKET_SIZE: Balance = 10 * ANCHOR_UNIT;

  /// Number of brackets after which the dynamic threshold stops rising.
  pub const BID_WALL_MAX_BRACKETS: u32 = 10;

  /// Tick spacing used by flaunched pools.
  pub const DEFAULT_TICK_SPACING: i32 = 60;
}
