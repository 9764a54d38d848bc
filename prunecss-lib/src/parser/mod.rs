//! HTML parsing for reference collection.

pub mod dom_indices;
pub mod markup;
