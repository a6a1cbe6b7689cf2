use crate::*;
use alloc::vec;
use polkadot_sdk::frame_benchmarking::v2::*;
use polkadot_sdk::frame_support::BoundedVec;
use polkadot_sdk::frame_system::RawOrigin;
use polkadot_sdk::sp_runtime::traits::Get;

#[benchmarks]
mod benches {
  use super::*;

  #[benchmark]
  fn approve_action() {
    #[extrinsic_call]
    approve_action(RawOrigin::Root, 7);

    assert!(ApprovedActions::<T>::contains_key(7));
  }

  #[benchmark]
  fn unapprove_action() {
    ApprovedActions::<T>::insert(7, ());

    #[extrinsic_call]
    unapprove_action(RawOrigin::Root, 7);

    assert!(!ApprovedActions::<T>::contains_key(7));
  }

  #[benchmark]
  fn create_treasury() {
    let owner: T::AccountId = whitelisted_caller();
    let (token, pool_key) = T::BenchmarkHelper::flaunched_token(&owner);

    #[extrinsic_call]
    create_treasury(RawOrigin::Signed(T::PositionManager::get()), token, pool_key);

    assert_eq!(Treasuries::<T>::get(token), Some(pool_key));
  }

  #[benchmark]
  fn set_delegate() {
    let owner: T::AccountId = whitelisted_caller();
    let delegate: T::AccountId = account("delegate", 0, 0);
    let (token, _) = T::BenchmarkHelper::flaunched_token(&owner);

    #[extrinsic_call]
    set_delegate(RawOrigin::Signed(owner.clone()), token, delegate.clone(), true);

    assert_eq!(Delegates::<T>::get(token, &delegate), Some(owner));
  }

  #[benchmark]
  fn execute_action(d: Linear<0, { T::MaxActionData::get() }>) {
    let owner: T::AccountId = whitelisted_caller();
    let (token, pool_key) = T::BenchmarkHelper::flaunched_token(&owner);
    Pallet::<T>::create_treasury(
      RawOrigin::Signed(T::PositionManager::get()).into(),
      token,
      pool_key,
    )
    .expect("Failed to create treasury");
    ApprovedActions::<T>::insert(action_ids::BLANK, ());
    let data: BoundedVec<u8, T::MaxActionData> = BoundedVec::truncate_from(vec![0u8; d as usize]);

    #[extrinsic_call]
    execute_action(RawOrigin::Signed(owner), token, action_ids::BLANK, data);
  }

  #[cfg(test)]
  use crate::mock::{Test, new_test_ext};
  #[cfg(test)]
  impl_benchmark_test_suite!(Pallet, new_test_ext(), Test);
}
