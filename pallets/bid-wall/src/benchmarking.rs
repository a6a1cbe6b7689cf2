use crate::*;
use polkadot_sdk::frame_benchmarking::v2::*;
use polkadot_sdk::frame_system::RawOrigin;
use polkadot_sdk::sp_runtime::traits::Get;
use primitives::{AssetKind, PoolKey};

fn bench_pool_key<T: Config>() -> PoolKey {
  let anchor = T::NativeToken::get();
  let token = match anchor {
    AssetKind::Local(id) => AssetKind::Local(id.wrapping_add(1)),
    AssetKind::Native => AssetKind::Local(1),
  };
  PoolKey::new(anchor, token, 0, primitives::ecosystem::params::DEFAULT_TICK_SPACING)
}

#[benchmarks]
mod benches {
  use super::*;

  #[benchmark]
  fn deposit() {
    let manager = T::PositionManager::get();
    let pool_key = bench_pool_key::<T>();
    let native_is_zero = pool_key.native_is_zero(T::NativeToken::get()) == Some(true);
    let amount = T::DefaultBaseThreshold::get() / 2;
    T::BenchmarkHelper::fund_account(&manager, T::NativeToken::get(), amount.saturating_mul(4))
      .expect("Failed to fund position manager");

    #[extrinsic_call]
    deposit(RawOrigin::Signed(manager), pool_key, amount, 0, native_is_zero);

    assert_eq!(PoolWalls::<T>::get(pool_key.pool_id()).pending_eth_fees, amount);
  }

  #[benchmark]
  fn set_threshold_settings() {
    let settings = ThresholdSettings {
      use_dynamic_thresholds: true,
      base_threshold: T::DefaultBaseThreshold::get(),
      min_threshold: T::DefaultMinThreshold::get(),
      max_threshold: T::DefaultMaxThreshold::get(),
    };

    #[extrinsic_call]
    set_threshold_settings(RawOrigin::Root, settings);

    assert!(Settings::<T>::get().use_dynamic_thresholds);
  }

  #[benchmark]
  fn set_tick_range_strategy() {
    let strategy = TickRangeKind::Wide { spacings: 4 };

    #[extrinsic_call]
    set_tick_range_strategy(RawOrigin::Root, strategy);

    assert_eq!(ActiveTickRange::<T>::get(), strategy);
  }

  #[benchmark]
  fn set_disabled_state() {
    let pool_key = bench_pool_key::<T>();

    #[extrinsic_call]
    set_disabled_state(RawOrigin::Root, pool_key, true);

    assert!(DisabledPools::<T>::get(pool_key.pool_id()));
  }

  #[cfg(test)]
  use crate::mock::{Test, new_test_ext};
  #[cfg(test)]
  impl_benchmark_test_suite!(Pallet, new_test_ext(), Test);
}
