//! Thin helpers over the `markup5ever_rcdom` tree.
//!
//! The tagger only needs a handful of operations: classify a node, read its
//! text, create elements and text nodes, and move nodes around while keeping
//! the parent back-pointers consistent. HTML parsing and serialization are
//! left to `html5ever`; the XHTML path lives in [`crate::xhtml`].

use anyhow::{Context, Result};
use html5ever::tendril::TendrilSink;
use html5ever::{
    Attribute, LocalName, Namespace, ParseOpts, QualName, ns, parse_document, serialize,
    serialize::SerializeOpts,
};
use markup5ever_rcdom::{Handle, Node, NodeData, RcDom, SerializableHandle};
use std::cell::{Cell, RefCell};
use std::rc::Rc;

/// Structural kind of a node, as far as the tagger cares.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    Element,
    Text,
    Comment,
    Other,
}

pub fn kind(node: &Handle) -> NodeKind {
    match node.data {
        NodeData::Element { .. } => NodeKind::Element,
        NodeData::Text { .. } => NodeKind::Text,
        NodeData::Comment { .. } => NodeKind::Comment,
        _ => NodeKind::Other,
    }
}

/// Local name of an element, `None` for every other node kind.
pub fn element_name(node: &Handle) -> Option<String> {
    match &node.data {
        NodeData::Element { name, .. } => Some(name.local.to_string()),
        _ => None,
    }
}

/// Literal contents of a text node.
pub fn text_of(node: &Handle) -> Option<String> {
    match &node.data {
        NodeData::Text { contents } => Some(contents.borrow().to_string()),
        _ => None,
    }
}

/// Value of an attribute on an element.
pub fn attribute(node: &Handle, attr: &str) -> Option<String> {
    match &node.data {
        NodeData::Element { attrs, .. } => attrs
            .borrow()
            .iter()
            .find(|a| &*a.name.local == attr)
            .map(|a| a.value.to_string()),
        _ => None,
    }
}

/// Concatenated text of every text node below `node`, in document order.
pub fn text_content(node: &Handle) -> String {
    let mut out = String::new();
    collect_text(node, &mut out);
    out
}

fn collect_text(node: &Handle, out: &mut String) {
    if let NodeData::Text { contents } = &node.data {
        out.push_str(&contents.borrow());
    }
    for child in node.children.borrow().iter() {
        collect_text(child, out);
    }
}

pub fn parent(node: &Handle) -> Option<Handle> {
    let weak = node.parent.take();
    let parent = weak.as_ref().and_then(|w| w.upgrade());
    node.parent.set(weak);
    parent
}

/// Position of `node` among its parent's children.
pub fn index_in_parent(node: &Handle) -> Option<(Handle, usize)> {
    let parent = parent(node)?;
    let idx = parent
        .children
        .borrow()
        .iter()
        .position(|child| Rc::ptr_eq(child, node))?;
    Some((parent, idx))
}

/// Namespace of an element, `None` for every other node kind.
pub fn element_namespace(node: &Handle) -> Option<Namespace> {
    match &node.data {
        NodeData::Element { name, .. } => Some(name.ns.clone()),
        _ => None,
    }
}

/// `node` followed by its ancestors up to the document root.
pub fn ancestors_or_self(node: &Handle) -> Vec<Handle> {
    let mut chain = vec![node.clone()];
    let mut cursor = parent(node);
    while let Some(ancestor) = cursor {
        cursor = parent(&ancestor);
        chain.push(ancestor);
    }
    chain
}

/// Create an HTML element with attributes.
pub fn create_element(tag: &str, attrs: &[(&str, &str)]) -> Handle {
    create_element_ns(ns!(html), tag, attrs)
}

/// Create an element in `namespace`; attributes are unqualified.
pub fn create_element_ns(namespace: Namespace, tag: &str, attrs: &[(&str, &str)]) -> Handle {
    let qual_name = QualName::new(None, namespace, LocalName::from(tag));
    let attributes = attrs
        .iter()
        .map(|(name, value)| Attribute {
            name: QualName::new(None, ns!(), LocalName::from(*name)),
            value: value.to_string().into(),
        })
        .collect();

    Rc::new(Node {
        parent: Cell::new(None),
        children: RefCell::new(Vec::new()),
        data: NodeData::Element {
            name: qual_name,
            attrs: RefCell::new(attributes),
            template_contents: Default::default(),
            mathml_annotation_xml_integration_point: false,
        },
    })
}

pub fn create_text(text: &str) -> Handle {
    Rc::new(Node {
        parent: Cell::new(None),
        children: RefCell::new(Vec::new()),
        data: NodeData::Text {
            contents: RefCell::new(text.to_string().into()),
        },
    })
}

/// Remove `node` from its parent, if it has one.
pub fn detach(node: &Handle) {
    let Some(weak) = node.parent.take() else {
        return;
    };
    if let Some(parent) = weak.upgrade() {
        parent
            .children
            .borrow_mut()
            .retain(|child| !Rc::ptr_eq(child, node));
    }
}

/// Move `child` to the end of `parent`'s children.
pub fn append(parent: &Handle, child: &Handle) {
    detach(child);
    child.parent.set(Some(Rc::downgrade(parent)));
    parent.children.borrow_mut().push(child.clone());
}

/// Move `node` directly in front of `sibling`. Returns `false` when `sibling`
/// has no parent.
pub fn insert_before(sibling: &Handle, node: &Handle) -> bool {
    detach(node);
    let Some((parent, idx)) = index_in_parent(sibling) else {
        return false;
    };
    node.parent.set(Some(Rc::downgrade(&parent)));
    parent.children.borrow_mut().insert(idx, node.clone());
    true
}

/// Put `wrapper` where `target` is and move `target` inside it.
pub fn wrap(target: &Handle, wrapper: &Handle) -> bool {
    if !insert_before(target, wrapper) {
        return false;
    }
    append(wrapper, target);
    true
}

/// Parse a document with the tolerant HTML parser.
pub fn parse_html(html: &str) -> Result<RcDom> {
    parse_document(RcDom::default(), ParseOpts::default())
        .from_utf8()
        .read_from(&mut html.as_bytes())
        .context("HTML parser rejected the input")
}

/// Serialize the whole document with the serializer's default options.
pub fn serialize_html(dom: &RcDom) -> Result<String> {
    let mut output = Vec::new();
    let document = SerializableHandle::from(dom.document.clone());
    serialize(&mut output, &document, SerializeOpts::default())
        .context("HTML serialization failed")?;
    String::from_utf8(output).context("Serialized document is not UTF-8")
}

/// Depth-first search for the first element with the given local name.
pub fn find_element(node: &Handle, tag: &str) -> Option<Handle> {
    if element_name(node).as_deref() == Some(tag) {
        return Some(node.clone());
    }
    node.children
        .borrow()
        .iter()
        .find_map(|child| find_element(child, tag))
}
