//! Small helpers shared across layers

pub mod fields;
pub mod testing;
