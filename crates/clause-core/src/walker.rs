//! Document traversal.
//!
//! Both walks return owned snapshots so callers can mutate the tree after
//! enumeration without disturbing the order of what is left to visit.

use crate::dom::{self, NodeKind};
use crate::options::TaggerOptions;
use markup5ever_rcdom::Handle;
use std::rc::Rc;

/// A text node that carries the only string of its parent.
#[derive(Debug, Clone)]
pub struct TextLeaf {
    pub text_node: Handle,
    pub text: String,
    /// Node that is moved when the leaf is wrapped whole: the text node itself
    /// when it sits directly in the container, its parent element otherwise.
    pub target: Handle,
}

/// Outermost container elements in document order. A container nested in
/// another one is covered by its ancestor's walk and is not listed again.
pub fn containers(root: &Handle, options: &TaggerOptions) -> Vec<Handle> {
    let mut out = Vec::new();
    let mut stack: Vec<Handle> = root.children.borrow().iter().rev().cloned().collect();
    while let Some(node) = stack.pop() {
        let is_container = dom::element_name(&node)
            .map(|name| options.is_container(&name))
            .unwrap_or(false);
        if is_container {
            out.push(node);
        } else {
            stack.extend(node.children.borrow().iter().rev().cloned());
        }
    }
    out
}

/// Pre-order, depth-first snapshot of every node below `root`.
pub fn descendants(root: &Handle) -> Vec<Handle> {
    let mut out = Vec::new();
    let mut stack: Vec<Handle> = root.children.borrow().iter().rev().cloned().collect();
    while let Some(node) = stack.pop() {
        stack.extend(node.children.borrow().iter().rev().cloned());
        out.push(node);
    }
    out
}

/// Returns the leaf view of `node` when it is a non-empty text node with no
/// siblings. Elements, comments and text sharing its parent yield `None`.
pub fn text_leaf(node: &Handle, container: &Handle) -> Option<TextLeaf> {
    if dom::kind(node) != NodeKind::Text {
        return None;
    }
    let text = dom::text_of(node)?;
    if text.is_empty() {
        return None;
    }
    let parent = dom::parent(node)?;
    if parent.children.borrow().len() != 1 {
        return None;
    }
    let target = if Rc::ptr_eq(&parent, container) {
        node.clone()
    } else {
        parent
    };
    Some(TextLeaf {
        text_node: node.clone(),
        text,
        target,
    })
}
