use crate as pallet_fee_escrow;
use polkadot_sdk::frame_support::traits::fungibles::{Inspect, Mutate};
use polkadot_sdk::frame_support::traits::tokens::{Fortitude, Precision, Preservation};
use polkadot_sdk::frame_support::{
  PalletId, construct_runtime, derive_impl,
  traits::{ConstU32, ConstU128, Get},
};
use polkadot_sdk::frame_system;
use polkadot_sdk::sp_runtime::{
  BuildStorage, DispatchError, DispatchResult,
  testing::H256,
  traits::{BlakeTwo256, IdentityLookup},
};
use primitives::{
  AnchorUnwrapper, AssetKind, BalanceDelta, LiquidityPrimitive, OnTokensClaimed, PoolKey,
  PoolKeyLookup, SwapParams,
  ecosystem::{pallet_ids::FEE_ESCROW_PALLET_ID, params},
};
use std::cell::RefCell;

pub const UNIT: u128 = params::ANCHOR_UNIT;
pub const POSITION_MANAGER: u64 = 1;
pub const ALICE: u64 = 2;
pub const BOB: u64 = 3;
/// Recipient of claims made from inside the claim hook
pub const MALLORY: u64 = 4;
pub const AMM: u64 = 500;
pub const ANCHOR_ID: u32 = 10;
pub const ANCHOR: AssetKind = AssetKind::Local(ANCHOR_ID);
pub const TOKEN_ID: u32 = 20;
pub const TOKEN: AssetKind = AssetKind::Local(TOKEN_ID);
/// Token sorting before the anchor
pub const LOW_TOKEN_ID: u32 = 5;
pub const LOW_TOKEN: AssetKind = AssetKind::Local(LOW_TOKEN_ID);
/// Token without a pool
pub const ORPHAN_ID: u32 = 30;
pub const ORPHAN: AssetKind = AssetKind::Local(ORPHAN_ID);

/// What the claim hook saw: (user, token, amount, allocation left, escrow holding)
pub type ClaimObservation = (u64, AssetKind, u128, u128, u128);

// State containers for stateful mocks
thread_local! {
    // Anchor paid per token sold, as (numerator, denominator)
    pub static SWAP_RATE: RefCell<(u128, u128)> = const { RefCell::new((1, 2)) };

    // Every swap request the AMM received
    pub static SWAPS: RefCell<Vec<(PoolKey, SwapParams)>> = const { RefCell::new(Vec::new()) };

    pub static CLAIMS: RefCell<Vec<ClaimObservation>> = const { RefCell::new(Vec::new()) };

    // Most tokens a single swap fills before hitting its price limit
    pub static FILL_CAP: RefCell<Option<u128>> = const { RefCell::new(None) };

    // Whether the claim hook claims the same allocation again
    pub static REENTER: RefCell<bool> = const { RefCell::new(false) };

    // Results of claims made from inside the claim hook
    pub static NESTED_CLAIMS: RefCell<Vec<DispatchResult>> = const { RefCell::new(Vec::new()) };
}

/// Anchor is currency0
pub fn pool_key() -> PoolKey {
  PoolKey::new(ANCHOR, TOKEN, 0, params::DEFAULT_TICK_SPACING)
}

/// Anchor is currency1
pub fn flipped_pool_key() -> PoolKey {
  PoolKey::new(ANCHOR, LOW_TOKEN, 0, params::DEFAULT_TICK_SPACING)
}

pub fn set_swap_rate(numerator: u128, denominator: u128) {
  SWAP_RATE.with(|r| *r.borrow_mut() = (numerator, denominator));
}

pub fn set_fill_cap(cap: u128) {
  FILL_CAP.with(|c| *c.borrow_mut() = Some(cap));
}

pub fn reenter_on_claim() {
  REENTER.with(|r| *r.borrow_mut() = true);
}

pub fn nested_claims() -> Vec<DispatchResult> {
  NESTED_CLAIMS.with(|n| n.borrow().clone())
}

pub fn swaps() -> Vec<(PoolKey, SwapParams)> {
  SWAPS.with(|s| s.borrow().clone())
}

pub fn claims() -> Vec<ClaimObservation> {
  CLAIMS.with(|c| c.borrow().clone())
}

pub fn balance_of(asset: AssetKind, who: u64) -> u128 {
  match asset {
    AssetKind::Native => Balances::free_balance(who),
    AssetKind::Local(id) => Assets::balance(id, who),
  }
}

fn move_asset(asset: AssetKind, from: &u64, to: &u64, amount: u128) -> Result<(), DispatchError> {
  if amount == 0 {
    return Ok(());
  }
  match asset {
    AssetKind::Native => {
      <Balances as polkadot_sdk::frame_support::traits::fungible::Mutate<u64>>::transfer(
        from,
        to,
        amount,
        Preservation::Expendable,
      )?;
    }
    AssetKind::Local(id) => {
      <Assets as Mutate<u64>>::transfer(id, from, to, amount, Preservation::Expendable)?;
    }
  }
  Ok(())
}

type Block = frame_system::mocking::MockBlock<Test>;

construct_runtime!(
  pub struct Test {
    System: frame_system,
    Balances: polkadot_sdk::pallet_balances,
    Assets: polkadot_sdk::pallet_assets,
    FeeEscrow: pallet_fee_escrow,
  }
);

#[derive_impl(frame_system::config_preludes::TestDefaultConfig)]
impl frame_system::Config for Test {
  type Block = Block;
  type AccountId = u64;
  type Lookup = IdentityLookup<Self::AccountId>;
  type Hash = H256;
  type Hashing = BlakeTwo256;
  type AccountData = polkadot_sdk::pallet_balances::AccountData<u128>;
}

impl polkadot_sdk::pallet_balances::Config for Test {
  type MaxLocks = ();
  type MaxReserves = ();
  type ReserveIdentifier = [u8; 8];
  type Balance = u128;
  type DustRemoval = ();
  type RuntimeEvent = RuntimeEvent;
  type ExistentialDeposit = ConstU128<1>;
  type AccountStore = System;
  type WeightInfo = ();
  type FreezeIdentifier = ();
  type MaxFreezes = ();
  type RuntimeHoldReason = ();
  type RuntimeFreezeReason = ();
  type DoneSlashHandler = ();
}

impl polkadot_sdk::pallet_assets::Config for Test {
  type RuntimeEvent = RuntimeEvent;
  type Balance = u128;
  type AssetId = u32;
  type AssetIdParameter = u32;
  type Currency = Balances;
  type CreateOrigin = polkadot_sdk::frame_support::traits::AsEnsureOriginWithArg<
    frame_system::EnsureSigned<Self::AccountId>,
  >;
  type ForceOrigin = frame_system::EnsureRoot<Self::AccountId>;
  type AssetDeposit = ConstU128<1>;
  type AssetAccountDeposit = ConstU128<1>;
  type MetadataDepositBase = ConstU128<1>;
  type MetadataDepositPerByte = ConstU128<1>;
  type ApprovalDeposit = ConstU128<1>;
  type StringLimit = ConstU32<50>;
  type Freezer = ();
  type Extra = ();
  type ReserveData = ();
  type CallbackHandle = ();
  type WeightInfo = ();
  type RemoveItemsLimit = ConstU32<5>;
  type Holder = ();
  #[cfg(feature = "runtime-benchmarks")]
  type BenchmarkHelper = AssetBenchmarkHelper;
}

#[cfg(feature = "runtime-benchmarks")]
pub struct AssetBenchmarkHelper;

#[cfg(feature = "runtime-benchmarks")]
impl polkadot_sdk::pallet_assets::BenchmarkHelper<u32, ()> for AssetBenchmarkHelper {
  fn create_asset_id_parameter(id: u32) -> u32 {
    id
  }
  fn create_reserve_id_parameter(_id: u32) -> () {
    ()
  }
}

/// Pool selling any token for anchor at the fixed `SWAP_RATE`
pub struct MockAmm;
impl LiquidityPrimitive<u64> for MockAmm {
  fn modify_liquidity(
    _: &u64,
    _: &PoolKey,
    _: i32,
    _: i32,
    _: i128,
  ) -> Result<BalanceDelta, DispatchError> {
    Err(DispatchError::Other("Unsupported"))
  }

  fn swap(who: &u64, pool_key: &PoolKey, params: SwapParams) -> Result<BalanceDelta, DispatchError> {
    SWAPS.with(|s| s.borrow_mut().push((*pool_key, params)));
    if params.amount_specified >= 0 {
      return Err(DispatchError::Other("ExactOutputUnsupported"));
    }
    let requested = params.amount_specified.unsigned_abs();
    let amount_in = FILL_CAP
      .with(|c| *c.borrow())
      .map_or(requested, |cap| requested.min(cap));
    let (numerator, denominator) = SWAP_RATE.with(|r| *r.borrow());
    let amount_out = amount_in * numerator / denominator;
    let (token_in, token_out) = if params.zero_for_one {
      (pool_key.currency0, pool_key.currency1)
    } else {
      (pool_key.currency1, pool_key.currency0)
    };
    move_asset(token_in, who, &AMM, amount_in)?;
    move_asset(token_out, &AMM, who, amount_out)?;
    let (paid, received) = (-(amount_in as i128), amount_out as i128);
    Ok(if params.zero_for_one {
      BalanceDelta::new(paid, received)
    } else {
      BalanceDelta::new(received, paid)
    })
  }
}

pub struct MockPools;
impl PoolKeyLookup for MockPools {
  fn pool_key(token: &AssetKind) -> Option<PoolKey> {
    match token {
      t if *t == TOKEN => Some(pool_key()),
      t if *t == LOW_TOKEN => Some(flipped_pool_key()),
      _ => None,
    }
  }
}

/// Burns wrapped anchor and mints the same amount of native currency
pub struct MockUnwrapper;
impl AnchorUnwrapper<u64> for MockUnwrapper {
  fn unwrap(who: &u64, amount: u128) -> DispatchResult {
    <Assets as Mutate<u64>>::burn_from(
      ANCHOR_ID,
      who,
      amount,
      Preservation::Expendable,
      Precision::Exact,
      Fortitude::Polite,
    )?;
    <Balances as polkadot_sdk::frame_support::traits::fungible::Mutate<u64>>::mint_into(
      who, amount,
    )?;
    Ok(())
  }
}

/// Records what the ledger looks like while a claim is in flight, and optionally
/// claims the same allocation again to `MALLORY`
pub struct ClaimObserver;
impl OnTokensClaimed<u64> for ClaimObserver {
  fn on_tokens_claimed(who: &u64, token: &AssetKind, amount: u128) {
    let left = FeeEscrow::token_allocation(who, token);
    let held = balance_of(*token, FeeEscrow::account_id());
    CLAIMS.with(|c| c.borrow_mut().push((*who, *token, amount, left, held)));
    if REENTER.with(|r| *r.borrow()) {
      let nested = FeeEscrow::claim_tokens(
        RuntimeOrigin::signed(*who),
        polkadot_sdk::frame_support::BoundedVec::truncate_from(vec![*token]),
        MALLORY,
      );
      NESTED_CLAIMS.with(|n| n.borrow_mut().push(nested));
    }
  }
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

pub struct PalletIdStub;
impl Get<PalletId> for PalletIdStub {
  fn get() -> PalletId {
    PalletId(*FEE_ESCROW_PALLET_ID)
  }
}

impl pallet_fee_escrow::Config for Test {
  type Assets = Assets;
  type Currency = Balances;
  type Amm = MockAmm;
  type Pools = MockPools;
  type Unwrapper = MockUnwrapper;
  type OnClaim = ClaimObserver;
  type NativeToken = NativeTokenStub;
  type PositionManager = PositionManagerStub;
  type PalletId = PalletIdStub;
  type MaxClaimTokens = ConstU32<16>;
  type WeightInfo = ();
  #[cfg(feature = "runtime-benchmarks")]
  type BenchmarkHelper = FeeEscrowBenchmarkHelper;
}

#[cfg(feature = "runtime-benchmarks")]
pub struct FeeEscrowBenchmarkHelper;

#[cfg(feature = "runtime-benchmarks")]
impl crate::BenchmarkHelper<u64> for FeeEscrowBenchmarkHelper {
  fn fund_account(
    who: &u64,
    asset: AssetKind,
    amount: u128,
  ) -> polkadot_sdk::sp_runtime::DispatchResult {
    match asset {
      AssetKind::Native => {
        use polkadot_sdk::frame_support::traits::Currency;
        let _ = Balances::deposit_creating(who, amount);
      }
      AssetKind::Local(id) => {
        use polkadot_sdk::frame_support::traits::fungibles::Create;
        if !Assets::asset_exists(id) {
          <Assets as Create<u64>>::create(id, POSITION_MANAGER, true, 1)?;
        }
        Assets::mint_into(id, who, amount)?;
      }
    }
    Ok(())
  }
}

pub fn new_test_ext() -> polkadot_sdk::sp_io::TestExternalities {
  let mut t = frame_system::GenesisConfig::<Test>::default()
    .build_storage()
    .unwrap();

  polkadot_sdk::pallet_assets::GenesisConfig::<Test> {
    // Asset id, owner, sufficient, min balance
    assets: vec![
      (ANCHOR_ID, POSITION_MANAGER, true, 1),
      (TOKEN_ID, POSITION_MANAGER, true, 1),
      (LOW_TOKEN_ID, POSITION_MANAGER, true, 1),
      (ORPHAN_ID, POSITION_MANAGER, true, 1),
    ],
    metadata: vec![],
    accounts: vec![
      (ANCHOR_ID, POSITION_MANAGER, 1_000 * UNIT),
      (TOKEN_ID, POSITION_MANAGER, 1_000 * UNIT),
      (LOW_TOKEN_ID, POSITION_MANAGER, 1_000 * UNIT),
      (ORPHAN_ID, POSITION_MANAGER, 1_000 * UNIT),
      (ANCHOR_ID, AMM, 1_000_000 * UNIT),
    ],
    reserves: vec![],
    next_asset_id: None,
  }
  .assimilate_storage(&mut t)
  .unwrap();

  pallet_fee_escrow::GenesisConfig::<Test>::default()
    .assimilate_storage(&mut t)
    .unwrap();

  // Reset State
  SWAP_RATE.with(|r| *r.borrow_mut() = (1, 2));
  SWAPS.with(|s| s.borrow_mut().clear());
  CLAIMS.with(|c| c.borrow_mut().clear());
  FILL_CAP.with(|c| *c.borrow_mut() = None);
  REENTER.with(|r| *r.borrow_mut() = false);
  NESTED_CLAIMS.with(|n| n.borrow_mut().clear());

  let mut ext: polkadot_sdk::sp_io::TestExternalities = t.into();
  ext.execute_with(|| System::set_block_number(1));
  ext
}
