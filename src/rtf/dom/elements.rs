//! The DOM node model (§3): an arena of [`Node`]s addressed by [`NodeId`].
//!
//! Parent-owns-child; the child-to-parent link is a non-owning index back
//! into the same arena. This sidesteps the cyclic-reference problem a
//! pointer-based tree would have in safe Rust and makes a subtree transplant
//! (see [`Tree::absorb`]) a plain index remap instead of a pointer splice.

use crate::rtf::color::ColorValue;
use std::collections::HashMap;

/// Index into a [`Tree`]'s node arena. Only meaningful relative to the tree
/// that produced it — mixing ids from two trees is a logic error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(pub(crate) usize);

/// The ten node types the DOM builder ever constructs (§3).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeType {
    Rtf,
    Para,
    Text,
    Bold,
    Italic,
    Underline,
    Strikethrough,
    Hyperlink,
    Image,
    Pagebreak,
}

impl NodeType {
    pub fn as_str(self) -> &'static str {
        match self {
            NodeType::Rtf => "rtf",
            NodeType::Para => "para",
            NodeType::Text => "text",
            NodeType::Bold => "bold",
            NodeType::Italic => "italic",
            NodeType::Underline => "underline",
            NodeType::Strikethrough => "strikethrough",
            NodeType::Hyperlink => "hyperlink",
            NodeType::Image => "image",
            NodeType::Pagebreak => "pagebreak",
        }
    }
}

/// An attribute value written into a node's attribute map (§4.6: alignment,
/// style, pagebreakBefore, fColor/bColor, href all land here as typed
/// values rather than strings).
#[derive(Debug, Clone, PartialEq)]
pub enum AttrValue {
    Bool(bool),
    Str(String),
    Color(ColorValue),
}

/// A node's own content. Only `text` and `image` nodes carry one; every
/// other node type is a pure container (§3: "text/image nodes have no
/// children").
#[derive(Debug, Clone, PartialEq, Default)]
pub enum NodeValue {
    #[default]
    None,
    Text(String),
    Bytes(Vec<u8>),
}

#[derive(Debug, Clone)]
pub struct Node {
    pub node_type: NodeType,
    pub parent: Option<NodeId>,
    pub children: Vec<NodeId>,
    pub value: NodeValue,
    pub attributes: HashMap<String, AttrValue>,
}

/// The arena backing a parsed document's DOM tree (or a throwaway
/// `fldrslt` sub-tree, see [`crate::rtf::dom::builder`]).
#[derive(Debug, Clone, Default)]
pub struct Tree {
    nodes: Vec<Node>,
}

impl Tree {
    /// Build a tree containing only its root `rtf` node, returning the
    /// tree and the root's id.
    pub fn new_root() -> (Self, NodeId) {
        let mut tree = Tree::default();
        let root = tree.create(NodeType::Rtf, None);
        (tree, root)
    }

    /// Create a node and, if `parent` is given, append it to that node's
    /// children.
    pub fn create(&mut self, node_type: NodeType, parent: Option<NodeId>) -> NodeId {
        let id = self.push_raw(Node {
            node_type,
            parent,
            children: Vec::new(),
            value: NodeValue::None,
            attributes: HashMap::new(),
        });
        if let Some(parent) = parent {
            self.nodes[parent.0].children.push(id);
        }
        id
    }

    fn push_raw(&mut self, node: Node) -> NodeId {
        self.nodes.push(node);
        NodeId(self.nodes.len() - 1)
    }

    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    pub fn node_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id.0]
    }

    /// Distance from the root (`rtf` node), which is depth 0.
    pub fn depth(&self, id: NodeId) -> usize {
        let mut depth = 0;
        let mut current = id;
        while let Some(parent) = self.node(current).parent {
            depth += 1;
            current = parent;
        }
        depth
    }

    pub fn append_text(&mut self, id: NodeId, text: &str) {
        match &mut self.node_mut(id).value {
            NodeValue::Text(s) => s.push_str(text),
            value @ NodeValue::None => *value = NodeValue::Text(text.to_string()),
            NodeValue::Bytes(_) => unreachable!("append_text called on a non-text node"),
        }
    }

    /// Detach `child` from `parent`'s children list. The node itself stays
    /// in the arena (unreachable, but arena slots are never reclaimed).
    pub fn remove_child(&mut self, parent: NodeId, child: NodeId) {
        self.nodes[parent.0].children.retain(|&c| c != child);
    }

    /// First child of `parent` with the given node type, if any.
    pub fn first_child_of_type(&self, parent: NodeId, node_type: NodeType) -> Option<NodeId> {
        self.node(parent)
            .children
            .iter()
            .copied()
            .find(|&c| self.node(c).node_type == node_type)
    }

    /// Move every node reachable from `roots` (in `other`) into `self`,
    /// reparenting the top-level ones under `new_parent`. Returns the new
    /// ids of `roots`, in order. `other` is consumed; this is a transplant,
    /// not a shared reference.
    pub fn absorb(&mut self, other: &Tree, roots: &[NodeId], new_parent: NodeId) -> Vec<NodeId> {
        let mut remap = HashMap::new();
        let adopted: Vec<NodeId> = roots
            .iter()
            .map(|&old_id| self.absorb_node(other, old_id, Some(new_parent), &mut remap))
            .collect();
        self.nodes[new_parent.0].children.extend(adopted.iter().copied());
        adopted
    }

    fn absorb_node(
        &mut self,
        other: &Tree,
        old_id: NodeId,
        parent: Option<NodeId>,
        remap: &mut HashMap<usize, NodeId>,
    ) -> NodeId {
        if let Some(&existing) = remap.get(&old_id.0) {
            return existing;
        }
        let old_node = other.node(old_id);
        let new_id = self.push_raw(Node {
            node_type: old_node.node_type,
            parent,
            children: Vec::new(),
            value: old_node.value.clone(),
            attributes: old_node.attributes.clone(),
        });
        remap.insert(old_id.0, new_id);
        let new_children: Vec<NodeId> = old_node
            .children
            .clone()
            .into_iter()
            .map(|child| self.absorb_node(other, child, Some(new_id), remap))
            .collect();
        self.node_mut(new_id).children = new_children;
        new_id
    }

    /// A detached snapshot of the tree. The arena holds only owned data and
    /// indices, so a clone already is the deep copy (§6).
    pub fn snapshot(&self) -> Tree {
        self.clone()
    }

    /// Depth-first, pre-order traversal starting at `root`.
    pub fn depth_first(&self, root: NodeId) -> DepthFirst<'_> {
        DepthFirst {
            tree: self,
            stack: vec![root],
        }
    }
}

pub struct DepthFirst<'a> {
    tree: &'a Tree,
    stack: Vec<NodeId>,
}

impl<'a> Iterator for DepthFirst<'a> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let id = self.stack.pop()?;
        let children = &self.tree.node(id).children;
        self.stack.extend(children.iter().rev().copied());
        Some(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_links_parent_and_child() {
        let (mut tree, root) = Tree::new_root();
        let para = tree.create(NodeType::Para, Some(root));
        assert_eq!(tree.node(root).children, vec![para]);
        assert_eq!(tree.node(para).parent, Some(root));
        assert_eq!(tree.depth(para), 1);
    }

    #[test]
    fn depth_first_visits_in_document_order() {
        let (mut tree, root) = Tree::new_root();
        let para = tree.create(NodeType::Para, Some(root));
        let bold = tree.create(NodeType::Bold, Some(para));
        let text = tree.create(NodeType::Text, Some(bold));
        let order: Vec<NodeType> = tree
            .depth_first(root)
            .map(|id| tree.node(id).node_type)
            .collect();
        assert_eq!(order, vec![NodeType::Rtf, NodeType::Para, NodeType::Bold, NodeType::Text]);
        let _ = text;
    }

    #[test]
    fn absorb_transplants_a_subtree() {
        let (mut sub, sub_root) = Tree::new_root();
        let sub_para = sub.create(NodeType::Para, Some(sub_root));
        let sub_text = sub.create(NodeType::Text, Some(sub_para));
        sub.append_text(sub_text, "hello");

        let (mut host, host_root) = Tree::new_root();
        let link = host.create(NodeType::Hyperlink, Some(host_root));
        let adopted = host.absorb(&sub, &[sub_text], link);

        assert_eq!(adopted.len(), 1);
        assert_eq!(host.node(link).children, adopted);
        assert_eq!(host.node(adopted[0]).value, NodeValue::Text("hello".into()));
        assert_eq!(host.node(adopted[0]).parent, Some(link));
    }

    #[test]
    fn remove_child_detaches_without_shifting_siblings() {
        let (mut tree, root) = Tree::new_root();
        let para = tree.create(NodeType::Para, Some(root));
        let a = tree.create(NodeType::Text, Some(para));
        let b = tree.create(NodeType::Text, Some(para));
        tree.remove_child(para, a);
        assert_eq!(tree.node(para).children, vec![b]);
    }
}
