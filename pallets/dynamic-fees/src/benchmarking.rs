use crate::*;
use polkadot_sdk::frame_benchmarking::v2::*;
use polkadot_sdk::frame_system::RawOrigin;
use polkadot_sdk::sp_runtime::traits::Get;
use primitives::{AssetKind, BalanceDelta, PoolKey};

#[benchmarks]
mod benches {
  use super::*;

  #[benchmark]
  fn track_swap() {
    let manager = T::PositionManager::get();
    let sender: T::AccountId = whitelisted_caller();
    let anchor = T::NativeToken::get();
    let token = match anchor {
      AssetKind::Local(id) => AssetKind::Local(id.wrapping_add(1)),
      AssetKind::Native => AssetKind::Local(1),
    };
    let pool_key = PoolKey::new(anchor, token, 0, 60);
    let volume = T::IncreaseThreshold::get().saturating_mul(2) as i128;
    let delta = if pool_key.currency0 == anchor {
      BalanceDelta::new(-1, volume)
    } else {
      BalanceDelta::new(volume, -1)
    };

    #[extrinsic_call]
    track_swap(RawOrigin::Signed(manager), pool_key, sender, delta);

    assert!(PoolFees::<T>::contains_key(pool_key.pool_id()));
  }

  #[cfg(test)]
  use crate::mock::{Test, new_test_ext};
  #[cfg(test)]
  impl_benchmark_test_suite!(Pallet, new_test_ext(), Test);
}
