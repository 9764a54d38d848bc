use html5ever::QualName;
use std::cell::RefCell;
use std::rc::{Rc, Weak};

pub mod dom_tree {
    use super::*;

    pub type Handle = Rc<RefCell<Node>>;
    pub type WeakHandle = Weak<RefCell<Node>>;

    #[derive(Debug)]
    pub struct Node {
        pub data: NodeData,
        pub parent: Option<WeakHandle>,
        pub children: Vec<Handle>,
    }

    #[derive(Debug, Clone)]
    pub enum NodeData {
        DocumentRoot,
        Element(ElementNode),
        Text(String),
        Comment,
    }

    #[derive(Debug, Clone)]
    pub struct ElementNode {
        pub tag: String,
        pub qual_name: QualName,
        pub attributes: Vec<(String, String)>,
    }

    #[derive(Debug)]
    pub struct Document {
        pub root: Handle,
    }

    impl Node {
        pub fn new_handle(data: NodeData) -> Handle {
            Rc::new(RefCell::new(Node {
                data,
                parent: None,
                children: Vec::new(),
            }))
        }
    }

    impl ElementNode {
        pub fn new(qual_name: QualName, attributes: Vec<(String, String)>) -> Self {
            ElementNode {
                tag: qual_name.local.to_string(),
                qual_name,
                attributes,
            }
        }

        /// First value of the attribute, names compared ASCII case-insensitively.
        pub fn attribute(&self, name: &str) -> Option<&str> {
            self.attributes
                .iter()
                .find(|(key, _)| key.eq_ignore_ascii_case(name))
                .map(|(_, value)| value.as_str())
        }
    }

    /// Concatenated text of all descendant text nodes.
    pub fn text_content(node: &Handle) -> String {
        let mut out = String::new();
        collect_text(node, &mut out);
        out
    }

    fn collect_text(node: &Handle, out: &mut String) {
        let node = node.borrow();
        if let NodeData::Text(text) = &node.data {
            out.push_str(text);
        }
        for child in &node.children {
            collect_text(child, out);
        }
    }

    pub fn new_document() -> Document {
        Document {
            root: Node::new_handle(NodeData::DocumentRoot),
        }
    }
}
