//! Common types.

pub(crate) mod primitives;

pub mod uuid;
