use crate::*;
use polkadot_sdk::frame_benchmarking::v2::*;
use polkadot_sdk::frame_support::BoundedVec;
use polkadot_sdk::frame_system::RawOrigin;
use polkadot_sdk::sp_runtime::traits::Get;
use primitives::{AssetKind, Balance, PoolId};

const POOL: PoolId = [1u8; 32];
const AMOUNT: Balance = 1_000_000_000_000;

fn funded_manager<T: Config>(asset: AssetKind, amount: Balance) -> T::AccountId {
  let manager = T::PositionManager::get();
  T::BenchmarkHelper::fund_account(&manager, asset, amount)
    .expect("Failed to fund position manager");
  manager
}

/// Distinct non-anchor tokens, `n` of them
fn bench_tokens<T: Config>(n: u32) -> alloc::vec::Vec<AssetKind> {
  let base = match T::NativeToken::get() {
    AssetKind::Local(id) => id.wrapping_add(1),
    AssetKind::Native => 1,
  };
  (0..n).map(|i| AssetKind::Local(base.wrapping_add(i))).collect()
}

#[benchmarks]
mod benches {
  use super::*;

  #[benchmark]
  fn allocate_fees() {
    let manager = funded_manager::<T>(T::NativeToken::get(), AMOUNT * 2);
    let recipient: T::AccountId = whitelisted_caller();

    #[extrinsic_call]
    allocate_fees(RawOrigin::Signed(manager), POOL, recipient.clone(), AMOUNT);

    assert_eq!(FeeBalances::<T>::get(&recipient), AMOUNT);
  }

  #[benchmark]
  fn withdraw_fees() {
    let manager = funded_manager::<T>(T::NativeToken::get(), AMOUNT * 2);
    let caller: T::AccountId = whitelisted_caller();
    Pallet::<T>::allocate_fees(RawOrigin::Signed(manager).into(), POOL, caller.clone(), AMOUNT)
      .expect("Failed to allocate fees");

    #[extrinsic_call]
    withdraw_fees(RawOrigin::Signed(caller.clone()), caller.clone(), false);

    assert_eq!(FeeBalances::<T>::get(&caller), 0);
  }

  #[benchmark]
  fn assign_tokens() {
    let token = bench_tokens::<T>(1)[0];
    let manager = funded_manager::<T>(token, AMOUNT * 2);
    let user: T::AccountId = whitelisted_caller();

    #[extrinsic_call]
    assign_tokens(RawOrigin::Signed(manager), POOL, user.clone(), token, AMOUNT);

    assert_eq!(TokenAllocations::<T>::get(&user, token), AMOUNT);
  }

  #[benchmark]
  fn claim_tokens(n: Linear<1, { T::MaxClaimTokens::get() }>) {
    let caller: T::AccountId = whitelisted_caller();
    let tokens = bench_tokens::<T>(n);
    for token in &tokens {
      let manager = funded_manager::<T>(*token, AMOUNT * 2);
      Pallet::<T>::assign_tokens(
        RawOrigin::Signed(manager).into(),
        POOL,
        caller.clone(),
        *token,
        AMOUNT,
      )
      .expect("Failed to assign tokens");
    }
    let claimed: BoundedVec<AssetKind, T::MaxClaimTokens> = BoundedVec::truncate_from(tokens.clone());

    #[extrinsic_call]
    claim_tokens(RawOrigin::Signed(caller.clone()), claimed, caller.clone());

    for token in tokens {
      assert_eq!(TokenAllocations::<T>::get(&caller, token), 0);
    }
  }

  #[cfg(test)]
  use crate::mock::{Test, new_test_ext};
  #[cfg(test)]
  impl_benchmark_test_suite!(Pallet, new_test_ext(), Test);
}
