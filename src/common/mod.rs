//! Small numeric helpers shared across layers.

pub mod math;
