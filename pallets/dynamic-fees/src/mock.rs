use crate as pallet_dynamic_fees;
use core::time::Duration;
use polkadot_sdk::frame_support::{
  construct_runtime, derive_impl,
  traits::{ConstU32, ConstU64, ConstU128, Get, UnixTime},
};
use polkadot_sdk::frame_system;
use polkadot_sdk::sp_runtime::{
  BuildStorage,
  testing::H256,
  traits::{BlakeTwo256, IdentityLookup},
};
use primitives::{AssetKind, PoolKey};
use std::cell::RefCell;

pub const UNIT: u128 = 1_000_000_000_000_000_000;
pub const POSITION_MANAGER: u64 = 1;
pub const TRADER: u64 = 2;
pub const ANCHOR: AssetKind = AssetKind::Local(10);
pub const WINDOW: u64 = 3_600;
pub const GENESIS_TIME: u64 = 1_700_000_000;

thread_local! {
    // Unix seconds served by `MockTime`
    pub static NOW: RefCell<u64> = const { RefCell::new(GENESIS_TIME) };
}

pub fn set_now(seconds: u64) {
  NOW.with(|n| *n.borrow_mut() = seconds);
}

pub fn now() -> u64 {
  NOW.with(|n| *n.borrow())
}

pub fn advance(seconds: u64) {
  NOW.with(|n| *n.borrow_mut() += seconds);
}

pub struct MockTime;
impl UnixTime for MockTime {
  fn now() -> Duration {
    Duration::from_secs(now())
  }
}

/// Anchor is currency0
pub fn pool_key() -> PoolKey {
  PoolKey::new(ANCHOR, AssetKind::Local(20), 0, 60)
}

/// Anchor is currency1
pub fn flipped_pool_key() -> PoolKey {
  PoolKey::new(ANCHOR, AssetKind::Local(5), 0, 60)
}

type Block = frame_system::mocking::MockBlock<Test>;

construct_runtime!(
  pub struct Test {
    System: frame_system,
    DynamicFees: pallet_dynamic_fees,
  }
);

#[derive_impl(frame_system::config_preludes::TestDefaultConfig)]
impl frame_system::Config for Test {
  type Block = Block;
  type AccountId = u64;
  type Lookup = IdentityLookup<Self::AccountId>;
  type Hash = H256;
  type Hashing = BlakeTwo256;
}

pub struct NativeTokenStub;
impl Get<AssetKind> for NativeTokenStub {
  fn get() -> AssetKind {
    ANCHOR
  }
}

pub struct PositionManagerStub;
impl Get<u64> for PositionManagerStub {
  fn get() -> u64 {
    POSITION_MANAGER
  }
}

impl pallet_dynamic_fees::Config for Test {
  type NativeToken = NativeTokenStub;
  type PositionManager = PositionManagerStub;
  type TimeProvider = MockTime;
  type MinFeeScaled = ConstU32<10_000>;
  type MaxFeeScaled = ConstU32<500_000>;
  type RollingWindow = ConstU64<WINDOW>;
  type IncreaseThreshold = ConstU128<{ 5_000_000 * UNIT }>;
  type TotalSupply = ConstU128<{ 100_000_000 * UNIT }>;
  type WeightInfo = ();
}

pub fn new_test_ext() -> polkadot_sdk::sp_io::TestExternalities {
  let t = frame_system::GenesisConfig::<Test>::default()
    .build_storage()
    .unwrap();

  // Reset State
  set_now(GENESIS_TIME);

  let mut ext: polkadot_sdk::sp_io::TestExternalities = t.into();
  ext.execute_with(|| System::set_block_number(1));
  ext
}
