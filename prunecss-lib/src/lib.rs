//! Static removal of unreferenced CSS rules.
//!
//! Stylesheets are split into rule nodes by a brace-counting structural parser
//! (`style::stylesheet`), each rule is checked against the set of class and id
//! tokens referenced by markup and scripts (`style::css_matcher`), and the
//! stylesheet text is rebuilt with only the unused rule spans cut out
//! (`style::rewriter`). Everything outside a removed span is copied verbatim.

pub mod config;
pub mod dom;
pub mod error;
pub mod files;
pub mod parser;
pub mod prune;
pub mod style;
pub mod usage;

pub use config::Config;
pub use error::PruneError;
pub use prune::{prune_text, PruneOptions, StylesheetReport};
pub use style::rewriter::Rewrite;
pub use usage::{UsageSet, UsageSetBuilder};
