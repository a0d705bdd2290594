//! Internal implementation details.

pub(crate) mod collections;
pub(crate) mod cycle;
