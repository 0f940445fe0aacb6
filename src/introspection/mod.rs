//! Introspection payload normalization.

#[cfg(test)]
pub(crate) mod fixtures;
mod normalize;
mod query;
mod raw;
mod relay;

pub use normalize::{normalize, normalize_str, normalize_with};
pub use query::INTROSPECTION_QUERY;
