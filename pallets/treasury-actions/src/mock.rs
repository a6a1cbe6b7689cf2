use crate as pallet_treasury_actions;
use crate::action_ids;
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
  AnchorUnwrapper, AssetKind, BalanceDelta, LiquidityPrimitive, PoolKey, SwapParams,
  TokenOwnership,
  ecosystem::{
    pallet_ids::{FEE_ESCROW_PALLET_ID, TREASURY_ACTIONS_PALLET_ID},
    params,
  },
};
use std::cell::RefCell;
use std::collections::BTreeMap;

pub const UNIT: u128 = params::ANCHOR_UNIT;
pub const POSITION_MANAGER: u64 = 1;
pub const HOLDER: u64 = 2;
pub const DELEGATE: u64 = 3;
pub const OUTSIDER: u64 = 4;
pub const NEW_HOLDER: u64 = 5;
pub const AMM: u64 = 500;
pub const ANCHOR_ID: u32 = 10;
pub const ANCHOR: AssetKind = AssetKind::Local(ANCHOR_ID);
pub const TOKEN_ID: u32 = 20;
pub const TOKEN: AssetKind = AssetKind::Local(TOKEN_ID);
/// Token sorting before the anchor
pub const LOW_TOKEN_ID: u32 = 5;
pub const LOW_TOKEN: AssetKind = AssetKind::Local(LOW_TOKEN_ID);

// State containers for stateful mocks
thread_local! {
    // Governing token holder per flaunched token; absent means burned
    pub static OWNERS: RefCell<BTreeMap<AssetKind, u64>> = const { RefCell::new(BTreeMap::new()) };

    // Anchor paid per token sold, as (numerator, denominator)
    pub static SWAP_RATE: RefCell<(u128, u128)> = const { RefCell::new((1, 4)) };

    pub static SWAPS: RefCell<Vec<(PoolKey, SwapParams)>> = const { RefCell::new(Vec::new()) };
}

/// Anchor is currency0
pub fn pool_key() -> PoolKey {
  PoolKey::new(ANCHOR, TOKEN, 0, params::DEFAULT_TICK_SPACING)
}

/// Anchor is currency1
pub fn flipped_pool_key() -> PoolKey {
  PoolKey::new(ANCHOR, LOW_TOKEN, 0, params::DEFAULT_TICK_SPACING)
}

pub fn set_owner(token: AssetKind, owner: Option<u64>) {
  OWNERS.with(|o| match owner {
    Some(owner) => o.borrow_mut().insert(token, owner),
    None => o.borrow_mut().remove(&token),
  });
}

pub fn swaps() -> Vec<(PoolKey, SwapParams)> {
  SWAPS.with(|s| s.borrow().clone())
}

pub fn balance_of(asset: AssetKind, who: u64) -> u128 {
  match asset {
    AssetKind::Native => Balances::free_balance(who),
    AssetKind::Local(id) => Assets::balance(id, who),
  }
}

/// Move `amount` of `asset` from the position manager into the treasury of `token`
pub fn fund_treasury(token: AssetKind, asset: AssetKind, amount: u128) {
  let treasury = TreasuryActions::treasury_account_of(&token);
  move_asset(asset, &POSITION_MANAGER, &treasury, amount).unwrap();
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
    TreasuryActions: pallet_treasury_actions,
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
    let amount_in = params.amount_specified.unsigned_abs();
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

pub struct MockOwnership;
impl TokenOwnership<u64> for MockOwnership {
  fn owner_of(token: &AssetKind) -> Option<u64> {
    OWNERS.with(|o| o.borrow().get(token).copied())
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

pub struct EscrowPalletIdStub;
impl Get<PalletId> for EscrowPalletIdStub {
  fn get() -> PalletId {
    PalletId(*FEE_ESCROW_PALLET_ID)
  }
}

pub struct TreasuryPalletIdStub;
impl Get<PalletId> for TreasuryPalletIdStub {
  fn get() -> PalletId {
    PalletId(*TREASURY_ACTIONS_PALLET_ID)
  }
}

impl pallet_fee_escrow::Config for Test {
  type Assets = Assets;
  type Currency = Balances;
  type Amm = MockAmm;
  type Pools = TreasuryActions;
  type Unwrapper = MockUnwrapper;
  type OnClaim = ();
  type NativeToken = NativeTokenStub;
  type PositionManager = PositionManagerStub;
  type PalletId = EscrowPalletIdStub;
  type MaxClaimTokens = ConstU32<16>;
  type WeightInfo = ();
  #[cfg(feature = "runtime-benchmarks")]
  type BenchmarkHelper = EscrowBenchmarkHelper;
}

impl pallet_treasury_actions::Config for Test {
  type Assets = Assets;
  type Currency = Balances;
  type Amm = MockAmm;
  type Fees = FeeEscrow;
  type Ownership = MockOwnership;
  type Unwrapper = MockUnwrapper;
  type Actions = crate::StandardActions<Test>;
  type NativeToken = NativeTokenStub;
  type PositionManager = PositionManagerStub;
  type PalletId = TreasuryPalletIdStub;
  type MaxActionData = ConstU32<4096>;
  type AdminOrigin = frame_system::EnsureRoot<u64>;
  type WeightInfo = ();
  #[cfg(feature = "runtime-benchmarks")]
  type BenchmarkHelper = TreasuryBenchmarkHelper;
}

#[cfg(feature = "runtime-benchmarks")]
pub struct EscrowBenchmarkHelper;

#[cfg(feature = "runtime-benchmarks")]
impl pallet_fee_escrow::BenchmarkHelper<u64> for EscrowBenchmarkHelper {
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
        Assets::mint_into(id, who, amount)?;
      }
    }
    Ok(())
  }
}

#[cfg(feature = "runtime-benchmarks")]
pub struct TreasuryBenchmarkHelper;

#[cfg(feature = "runtime-benchmarks")]
impl crate::BenchmarkHelper<u64> for TreasuryBenchmarkHelper {
  fn flaunched_token(owner: &u64) -> (AssetKind, PoolKey) {
    set_owner(TOKEN, Some(*owner));
    (TOKEN, pool_key())
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
    ],
    metadata: vec![],
    accounts: vec![
      (ANCHOR_ID, POSITION_MANAGER, 1_000 * UNIT),
      (TOKEN_ID, POSITION_MANAGER, 1_000 * UNIT),
      (LOW_TOKEN_ID, POSITION_MANAGER, 1_000 * UNIT),
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

  pallet_treasury_actions::GenesisConfig::<Test> {
    approved_actions: vec![
      action_ids::BLANK,
      action_ids::DISTRIBUTE,
      action_ids::BUY_BACK,
      action_ids::BURN_TOKENS,
    ],
    _marker: Default::default(),
  }
  .assimilate_storage(&mut t)
  .unwrap();

  // Reset State
  OWNERS.with(|o| {
    let mut owners = o.borrow_mut();
    owners.clear();
    owners.insert(TOKEN, HOLDER);
    owners.insert(LOW_TOKEN, HOLDER);
  });
  SWAP_RATE.with(|r| *r.borrow_mut() = (1, 4));
  SWAPS.with(|s| s.borrow_mut().clear());

  let mut ext: polkadot_sdk::sp_io::TestExternalities = t.into();
  ext.execute_with(|| System::set_block_number(1));
  ext
}

/// Test externalities with treasuries open for `TOKEN` and `LOW_TOKEN`
pub fn new_test_ext_with_treasuries() -> polkadot_sdk::sp_io::TestExternalities {
  let mut ext = new_test_ext();
  ext.execute_with(|| {
    for (token, key) in [(TOKEN, pool_key()), (LOW_TOKEN, flipped_pool_key())] {
      TreasuryActions::create_treasury(RuntimeOrigin::signed(POSITION_MANAGER), token, key)
        .unwrap();
    }
  });
  ext
}
