// src/types/mod.rs

pub mod pager;
pub mod range;
pub mod units;

pub use pager::PagerLevel;
pub use range::Range;
pub use units::{convert, DistanceUnit, KM_PER_MILE};
