#![cfg_attr(rustfmt, rustfmt_skip)]
#![allow(unused_parens)]
#![allow(unused_imports)]
#![allow(missing_docs)]

use polkadot_sdk::frame_support::{traits::Get, weights::{Weight, constants::RocksDbWeight}};
use core::marker::PhantomData;

pub trait WeightInfo {
	fn deposit() -> Weight;
	fn set_threshold_settings() -> Weight;
	fn set_tick_range_strategy() -> Weight;
	fn set_disabled_state() -> Weight;
}

pub struct SubstrateWeight<T>(PhantomData<T>);
impl<T: polkadot_sdk::frame_system::Config> WeightInfo for SubstrateWeight<T> {
	/// Worst case is a reposition: wall state, settings, strategy, two AMM position
	/// updates and three asset accounts.
	fn deposit() -> Weight {
		Weight::from_parts(95_000_000, 8000)
			.saturating_add(T::DbWeight::get().reads(9))
			.saturating_add(T::DbWeight::get().writes(8))
	}
	fn set_threshold_settings() -> Weight {
		Weight::from_parts(9_000_000, 0)
			.saturating_add(T::DbWeight::get().writes(1))
	}
	fn set_tick_range_strategy() -> Weight {
		Weight::from_parts(9_000_000, 0)
			.saturating_add(T::DbWeight::get().writes(1))
	}
	fn set_disabled_state() -> Weight {
		Weight::from_parts(10_000_000, 0)
			.saturating_add(T::DbWeight::get().writes(1))
	}
}

impl WeightInfo for () {
	fn deposit() -> Weight {
		Weight::from_parts(95_000_000, 8000)
	}
	fn set_threshold_settings() -> Weight {
		Weight::from_parts(9_000_000, 0)
	}
	fn set_tick_range_strategy() -> Weight {
		Weight::from_parts(9_000_000, 0)
	}
	fn set_disabled_state() -> Weight {
		Weight::from_parts(10_000_000, 0)
	}
}
