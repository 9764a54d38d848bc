use std::collections::BTreeSet;

use crate::dom::dom_tree::{text_content, Document, Handle, NodeData};

/// Selector references found in a parsed HTML document.
#[derive(Debug, Default)]
pub struct MarkupIndex {
    /// Raw `class` attribute values (whitespace-separated lists).
    pub classes: BTreeSet<String>,
    /// `id` attribute values.
    pub ids: BTreeSet<String>,
    /// `data-filter` attribute values, as used by filterable galleries.
    pub filters: BTreeSet<String>,
    /// Bodies of executable `<script>` elements.
    pub scripts: Vec<String>,
    /// Bodies of `<script>` elements holding HTML templates.
    pub templates: Vec<String>,
}

impl MarkupIndex {
    /// Build the index for the entire document.
    pub fn build(document: &Document) -> Self {
        let mut index = MarkupIndex::default();
        Self::traverse(&document.root, &mut index);
        index
    }

    /// Recursively traverse the DOM tree and populate the index.
    fn traverse(node: &Handle, index: &mut MarkupIndex) {
        let node_ref = node.borrow();
        if let NodeData::Element(elem) = &node_ref.data {
            if let Some(class_attr) = elem.attribute("class") {
                if !class_attr.trim().is_empty() {
                    index.classes.insert(class_attr.to_string());
                }
            }
            if let Some(id_value) = elem.attribute("id") {
                if !id_value.trim().is_empty() {
                    index.ids.insert(id_value.to_string());
                }
            }
            if let Some(filter) = elem.attribute("data-filter") {
                index.filters.insert(filter.to_string());
            }

            if elem.tag.eq_ignore_ascii_case("script") {
                let body = text_content(node);
                if !body.trim().is_empty() {
                    if is_template_script(elem.attribute("type")) {
                        index.templates.push(body);
                    } else {
                        index.scripts.push(body);
                    }
                }
                return;
            }
        }

        for child in &node_ref.children {
            Self::traverse(child, index);
        }
    }
}

fn is_template_script(script_type: Option<&str>) -> bool {
    script_type.is_some_and(|value| {
        let value = value.to_ascii_lowercase();
        value.contains("template") || value.contains("html")
    })
}
