//! Collection of the selector tokens referenced by markup and scripts.

pub mod builder;
pub mod script_rules;
pub mod usage_set;

pub use builder::UsageSetBuilder;
pub use usage_set::UsageSet;
