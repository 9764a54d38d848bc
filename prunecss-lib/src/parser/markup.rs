//! Parsing of HTML into the DOM tree used for reference collection.
//!
//! It uses html5ever as the HTML parser and builds a DOM tree defined in the
//! `crate::dom::dom_tree` module.

use crate::dom::dom_tree::{self, ElementNode, Handle, Node, NodeData};
use html5ever::tendril::{StrTendril, TendrilSink};
use html5ever::{
    interface::{ElemName, ElementFlags, NodeOrText, QuirksMode, TreeSink},
    Attribute, LocalName, Namespace, QualName,
};
use log::trace;
use std::borrow::Cow;
use std::rc::Rc;

/// Creates a DOM tree from the provided HTML content.
///
/// Malformed markup never fails; html5ever recovers the way browsers do.
pub fn create_dom_tree(html_content: &str) -> dom_tree::Document {
    let tree_sink = MarkupTreeSink::new();
    html5ever::parse_document(tree_sink, Default::default()).one(html_content.to_string())
}

/// A TreeSink that builds a [`dom_tree::Document`].
pub struct MarkupTreeSink {
    document: dom_tree::Document,
}

impl MarkupTreeSink {
    pub fn new() -> Self {
        Self {
            document: dom_tree::new_document(),
        }
    }
}

impl Default for MarkupTreeSink {
    fn default() -> Self {
        Self::new()
    }
}

/// Element name handed back to the parser.
#[derive(Debug)]
pub struct MarkupElemName {
    ns: Namespace,
    local: LocalName,
}

impl ElemName for MarkupElemName {
    fn local_name(&self) -> &LocalName {
        &self.local
    }

    fn ns(&self) -> &Namespace {
        &self.ns
    }
}

/// Detaches `node` from its current parent, if any.
fn detach(node: &Handle) {
    let parent = node.borrow_mut().parent.take();
    if let Some(parent) = parent.and_then(|weak| weak.upgrade()) {
        parent
            .borrow_mut()
            .children
            .retain(|child| !Rc::ptr_eq(child, node));
    }
}

fn append_node(parent: &Handle, child: Handle) {
    detach(&child);
    child.borrow_mut().parent = Some(Rc::downgrade(parent));
    parent.borrow_mut().children.push(child);
}

/// Appends text, merging it into a trailing text node so that a `<script>`
/// body delivered in chunks ends up as one string.
fn append_text(parent: &Handle, text: &str) {
    {
        let parent_node = parent.borrow();
        if let Some(last) = parent_node.children.last() {
            if let NodeData::Text(existing) = &mut last.borrow_mut().data {
                existing.push_str(text);
                return;
            }
        }
    }
    append_node(parent, Node::new_handle(NodeData::Text(text.to_string())));
}

fn into_handle(child: NodeOrText<Handle>) -> Handle {
    match child {
        NodeOrText::AppendNode(node) => node,
        NodeOrText::AppendText(text) => Node::new_handle(NodeData::Text(text.to_string())),
    }
}

impl TreeSink for MarkupTreeSink {
    type Handle = Handle;
    type Output = dom_tree::Document;
    type ElemName<'a>
        = MarkupElemName
    where
        Self: 'a;

    fn finish(self) -> Self::Output {
        self.document
    }

    fn parse_error(&self, msg: Cow<'static, str>) {
        trace!("markup parse error: {}", msg);
    }

    fn get_document(&self) -> Self::Handle {
        self.document.root.clone()
    }

    fn elem_name<'a>(&'a self, target: &'a Self::Handle) -> Self::ElemName<'a> {
        match &target.borrow().data {
            NodeData::Element(elem) => MarkupElemName {
                ns: elem.qual_name.ns.clone(),
                local: elem.qual_name.local.clone(),
            },
            _ => panic!("elem_name called on non-element node"),
        }
    }

    fn create_element(
        &self,
        name: QualName,
        attrs: Vec<Attribute>,
        _flags: ElementFlags,
    ) -> Self::Handle {
        let attributes = attrs
            .into_iter()
            .map(|attr| (attr.name.local.to_string(), attr.value.to_string()))
            .collect();
        Node::new_handle(NodeData::Element(ElementNode::new(name, attributes)))
    }

    fn create_comment(&self, _text: StrTendril) -> Self::Handle {
        Node::new_handle(NodeData::Comment)
    }

    fn create_pi(&self, _target: StrTendril, _data: StrTendril) -> Self::Handle {
        Node::new_handle(NodeData::Comment)
    }

    fn append(&self, parent: &Self::Handle, child: NodeOrText<Self::Handle>) {
        match child {
            NodeOrText::AppendNode(node) => append_node(parent, node),
            NodeOrText::AppendText(text) => append_text(parent, &text),
        }
    }

    fn append_based_on_parent_node(
        &self,
        element: &Self::Handle,
        prev_element: &Self::Handle,
        child: NodeOrText<Self::Handle>,
    ) {
        let has_parent = element.borrow().parent.is_some();
        if has_parent {
            self.append_before_sibling(element, child);
        } else {
            self.append(prev_element, child);
        }
    }

    fn append_doctype_to_document(
        &self,
        _name: StrTendril,
        _public_id: StrTendril,
        _system_id: StrTendril,
    ) {
    }

    fn get_template_contents(&self, target: &Self::Handle) -> Self::Handle {
        target.clone()
    }

    fn same_node(&self, x: &Self::Handle, y: &Self::Handle) -> bool {
        Rc::ptr_eq(x, y)
    }

    fn set_quirks_mode(&self, _mode: QuirksMode) {}

    fn append_before_sibling(&self, sibling: &Self::Handle, child: NodeOrText<Self::Handle>) {
        let parent = sibling
            .borrow()
            .parent
            .as_ref()
            .and_then(|weak| weak.upgrade());
        let Some(parent) = parent else {
            return;
        };

        let child = into_handle(child);
        detach(&child);
        child.borrow_mut().parent = Some(Rc::downgrade(&parent));

        let mut parent_node = parent.borrow_mut();
        let index = parent_node
            .children
            .iter()
            .position(|node| Rc::ptr_eq(node, sibling))
            .unwrap_or(parent_node.children.len());
        parent_node.children.insert(index, child);
    }

    fn add_attrs_if_missing(&self, target: &Self::Handle, attrs: Vec<Attribute>) {
        let mut target_node = target.borrow_mut();

        if let NodeData::Element(elem) = &mut target_node.data {
            for attr in attrs {
                let key = attr.name.local.to_string();
                if !elem.attributes.iter().any(|(k, _)| k == &key) {
                    elem.attributes.push((key, attr.value.to_string()));
                }
            }
        }
    }

    fn remove_from_parent(&self, target: &Self::Handle) {
        detach(target);
    }

    fn reparent_children(&self, node: &Self::Handle, new_parent: &Self::Handle) {
        let children = std::mem::take(&mut node.borrow_mut().children);
        let mut new_parent_node = new_parent.borrow_mut();
        for child in children {
            child.borrow_mut().parent = Some(Rc::downgrade(new_parent));
            new_parent_node.children.push(child);
        }
    }
}
