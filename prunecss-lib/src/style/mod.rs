//! The selective-removal engine: structural parser, usage classifier and
//! rewriter.

pub mod css_matcher;
pub mod rewriter;
pub mod stylesheet;
