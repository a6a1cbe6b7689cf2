#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

pub mod assets;
pub mod ecosystem;
pub mod liquidity;
pub mod pool;
pub mod tick_math;
pub mod traits;

pub use assets::*;
pub use ecosystem::*;
pub use pool::*;
pub use traits::*;
