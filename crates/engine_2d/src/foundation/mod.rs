//! Foundation utilities: math primitives, timing, pooling, and property bags.

pub mod math;
pub mod pool;
pub mod properties;
pub mod time;
