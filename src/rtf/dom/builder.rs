//! The DOM builder (§4.6): the parser drives an [`RtfEventSink`] and this
//! module is the only implementation of it shipped with the crate.
//!
//! The interesting part is [`DomBuilder::on_state_change`], which keeps the
//! "current insertion point is always a text node whose formatting
//! ancestors mirror the currently-active booleans" invariant with minimal
//! node churn across arbitrary turn-on/turn-off combinations.

use crate::rtf::color::ColorValue;
use crate::rtf::dom::elements::{AttrValue, Node, NodeId, NodeType, NodeValue, Tree};
use crate::rtf::error::RtfResult;
use crate::rtf::field::{split_fldinst, strip_quotes};
use crate::rtf::picture::PictureAttributes;
use crate::rtf::state::PublicState;
use smallvec::SmallVec;
use std::collections::HashMap;

/// The event contract the parser drives (§6). Required methods have no
/// default body: a type implementing only these is a valid, minimal sink.
/// Optional methods default to no-ops, mirroring the spec's
/// required/optional callback split at the Rust type-system level instead
/// of at construction time.
pub trait RtfEventSink {
    fn on_open_paragraph(&mut self, full_state: &PublicState);
    fn on_append_paragraph(&mut self, text: &str);
    fn on_state_change(&mut self, old: &PublicState, new: &PublicState);
    fn on_field(&mut self, fldinst: &str, fldrslt: &str);

    fn on_close_paragraph(&mut self) {}
    fn on_page_break(&mut self, _full_state: &PublicState) {}
    fn on_image(&mut self, _attrs: &PictureAttributes, _bytes: &[u8]) {}
    fn on_set_document_attribute(&mut self, _key: &str, _value: &str) {}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CharAttr {
    Bold,
    Italic,
    Underline,
    Strikethrough,
}

/// Canonical order formatting chains are built and rebuilt in. Arbitrary
/// but fixed, so re-nesting after a partial turn-off is deterministic.
const BOOLEAN_ATTRS: [CharAttr; 4] = [
    CharAttr::Bold,
    CharAttr::Italic,
    CharAttr::Underline,
    CharAttr::Strikethrough,
];

impl CharAttr {
    fn get(self, state: &PublicState) -> bool {
        match self {
            CharAttr::Bold => state.bold,
            CharAttr::Italic => state.italic,
            CharAttr::Underline => state.underline,
            CharAttr::Strikethrough => state.strikethrough,
        }
    }

    fn node_type(self) -> NodeType {
        match self {
            CharAttr::Bold => NodeType::Bold,
            CharAttr::Italic => NodeType::Italic,
            CharAttr::Underline => NodeType::Underline,
            CharAttr::Strikethrough => NodeType::Strikethrough,
        }
    }
}

struct ChainEntry {
    attr: CharAttr,
    node: NodeId,
}

/// A field driver maps a recognized `fldinst` first token to the wrapper
/// the field's result should be placed in. Pure functions of `fldinst`
/// only: tree mutation is left to [`DomBuilder::on_field`], so drivers
/// never need a `&mut DomBuilder` and the base/override registry can stay
/// a plain `fn` pointer map (§9: "a mapping from field name to a function
/// value").
pub type FieldDriver = fn(&str) -> Option<FieldAction>;

#[derive(Debug, Clone)]
pub enum FieldAction {
    /// Wrap the field result in a hyperlink node with this href.
    Hyperlink(String),
}

fn hyperlink_driver(fldinst: &str) -> Option<FieldAction> {
    let tokens = split_fldinst(fldinst);
    let url = tokens.get(1)?;
    Some(FieldAction::Hyperlink(strip_quotes(url).to_string()))
}

/// Builds a [`Tree`] by implementing [`RtfEventSink`]. Construct with
/// [`DomBuilder::new`], drive it with a [`crate::rtf::parser::Parser`],
/// then take the tree with [`DomBuilder::into_tree`].
pub struct DomBuilder {
    tree: Tree,
    root: NodeId,
    current: NodeId,
    current_paragraph: Option<NodeId>,
    chain: SmallVec<[ChainEntry; 4]>,
    base_drivers: HashMap<String, FieldDriver>,
    override_drivers: HashMap<String, FieldDriver>,
}

impl Default for DomBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl DomBuilder {
    pub fn new() -> Self {
        let (tree, root) = Tree::new_root();
        let mut builder = Self {
            tree,
            root,
            current: root,
            current_paragraph: None,
            chain: SmallVec::new(),
            base_drivers: HashMap::new(),
            override_drivers: HashMap::new(),
        };
        builder.register_field_driver("HYPERLINK", hyperlink_driver);
        builder
    }

    /// Register a field driver for `name` (matched against the first
    /// whitespace-separated token of `fldinst`, case-sensitively). Writes
    /// to the override mapping if `name` is already present in the base
    /// mapping, else to the base mapping (§9).
    pub fn register_field_driver(&mut self, name: &str, driver: FieldDriver) {
        if self.base_drivers.contains_key(name) {
            self.override_drivers.insert(name.to_string(), driver);
        } else {
            self.base_drivers.insert(name.to_string(), driver);
        }
    }

    fn lookup_driver(&self, name: &str) -> Option<FieldDriver> {
        self.override_drivers
            .get(name)
            .or_else(|| self.base_drivers.get(name))
            .copied()
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn tree(&self) -> &Tree {
        &self.tree
    }

    pub fn into_tree(self) -> Tree {
        self.tree
    }

    fn write_paragraph_attribute(&mut self, para: NodeId, key: &str, value: AttrValue) {
        self.tree.node_mut(para).attributes.insert(key.to_string(), value);
    }

    /// Write every non-boolean attribute unconditionally (used when a
    /// paragraph opens, since there is no prior state to diff against).
    fn write_all_paragraph_attributes(&mut self, para: NodeId, state: &PublicState) {
        self.write_paragraph_attribute(para, "alignment", AttrValue::Str(format!("{:?}", state.alignment)));
        self.write_paragraph_attribute(para, "pagebreakBefore", AttrValue::Bool(state.pagebreak_before));
        if let Some(style) = &state.style {
            self.write_paragraph_attribute(para, "style", AttrValue::Str(style.clone()));
        }
        if let Some(color) = state.f_color {
            self.write_paragraph_attribute(para, "fColor", AttrValue::Color(color));
        }
        if let Some(color) = state.b_color {
            self.write_paragraph_attribute(para, "bColor", AttrValue::Color(color));
        }
    }

    /// Write only the non-boolean attributes that changed (§4.6 invariant
    /// 3: fColor/bColor live on the paragraph node, not a character-scope
    /// element, matching this spec as written).
    fn write_paragraph_attribute_diff(&mut self, old: &PublicState, new: &PublicState) {
        let Some(para) = self.current_paragraph else {
            return;
        };
        if old.alignment != new.alignment {
            self.write_paragraph_attribute(para, "alignment", AttrValue::Str(format!("{:?}", new.alignment)));
        }
        if old.pagebreak_before != new.pagebreak_before {
            self.write_paragraph_attribute(para, "pagebreakBefore", AttrValue::Bool(new.pagebreak_before));
        }
        if old.style != new.style {
            if let Some(style) = &new.style {
                self.write_paragraph_attribute(para, "style", AttrValue::Str(style.clone()));
            }
        }
        if old.f_color != new.f_color {
            if let Some(color) = new.f_color {
                self.write_paragraph_attribute(para, "fColor", AttrValue::Color(color));
            }
        }
        if old.b_color != new.b_color {
            if let Some(color) = new.b_color {
                self.write_paragraph_attribute(para, "bColor", AttrValue::Color(color));
            }
        }
    }

    fn write_picture_attributes(&mut self, image: NodeId, attrs: &PictureAttributes) {
        if let Some(w) = attrs.computed_width() {
            self.write_paragraph_attribute(image, "width", AttrValue::Str(w.to_string()));
        }
        if let Some(h) = attrs.computed_height() {
            self.write_paragraph_attribute(image, "height", AttrValue::Str(h.to_string()));
        }
        if let Some(uid) = &attrs.blip_uid {
            self.write_paragraph_attribute(image, "blipUid", AttrValue::Str(uid.clone()));
        } else if let Some(tag) = attrs.blip_tag {
            self.write_paragraph_attribute(image, "blipTag", AttrValue::Str(tag.to_string()));
        }
    }

    fn drop_current_if_empty(&mut self) {
        let is_empty_text = matches!(&self.tree.node(self.current).value, NodeValue::Text(s) if s.is_empty())
            || matches!(self.tree.node(self.current).value, NodeValue::None);
        if is_empty_text {
            if let Some(parent) = self.tree.node(self.current).parent {
                self.tree.remove_child(parent, self.current);
            }
        }
    }
}

impl RtfEventSink for DomBuilder {
    fn on_open_paragraph(&mut self, full_state: &PublicState) {
        let para = self.tree.create(NodeType::Para, Some(self.root));
        self.current_paragraph = Some(para);
        self.chain.clear();
        self.write_all_paragraph_attributes(para, full_state);

        let mut parent = para;
        for &attr in &BOOLEAN_ATTRS {
            if attr.get(full_state) {
                let node = self.tree.create(attr.node_type(), Some(parent));
                self.chain.push(ChainEntry { attr, node });
                parent = node;
            }
        }
        self.current = self.tree.create(NodeType::Text, Some(parent));
    }

    fn on_append_paragraph(&mut self, text: &str) {
        self.tree.append_text(self.current, text);
    }

    fn on_state_change(&mut self, old: &PublicState, new: &PublicState) {
        let mut turned_off_min: Option<(usize, usize)> = None; // (chain index, depth)

        for &attr in &BOOLEAN_ATTRS {
            let was = attr.get(old);
            let is = attr.get(new);
            if !was && is {
                let parent = self
                    .tree
                    .node(self.current)
                    .parent
                    .expect("current insertion node always has a parent");
                let node = self.tree.create(attr.node_type(), Some(parent));
                self.current = self.tree.create(NodeType::Text, Some(node));
                self.chain.push(ChainEntry { attr, node });
            } else if was && !is {
                if let Some(idx) = self.chain.iter().position(|e| e.attr == attr) {
                    let depth = self.tree.depth(self.chain[idx].node);
                    turned_off_min = Some(match turned_off_min {
                        Some((_, best)) if best <= depth => turned_off_min.unwrap(),
                        _ => (idx, depth),
                    });
                }
            }
        }

        self.write_paragraph_attribute_diff(old, new);

        if let Some((cut_index, _)) = turned_off_min {
            let discarded = self.chain.split_off(cut_index);
            let mut parent = self
                .chain
                .last()
                .map(|e| e.node)
                .unwrap_or_else(|| self.current_paragraph.expect("state change always occurs inside a paragraph"));

            for entry in discarded {
                if entry.attr.get(new) {
                    let node = self.tree.create(entry.attr.node_type(), Some(parent));
                    self.chain.push(ChainEntry { attr: entry.attr, node });
                    parent = node;
                }
            }
            self.current = self.tree.create(NodeType::Text, Some(parent));
        }
    }

    fn on_field(&mut self, fldinst: &str, fldrslt: &str) {
        let tokens = split_fldinst(fldinst);
        let action = tokens
            .first()
            .and_then(|name| self.lookup_driver(name))
            .and_then(|driver| driver(fldinst));

        let paragraph = self
            .current_paragraph
            .expect("a field always occurs inside a paragraph");

        let adopt_into = match action {
            Some(FieldAction::Hyperlink(href)) => {
                self.drop_current_if_empty();
                let link = self.tree.create(NodeType::Hyperlink, Some(paragraph));
                self.tree
                    .node_mut(link)
                    .attributes
                    .insert("href".to_string(), AttrValue::Str(href));
                link
            }
            // Unregistered field type: perform only the sub-parse-and-adopt
            // step, directly into the enclosing paragraph.
            None => paragraph,
        };

        let (sub_tree, sub_children) = run_subparse(fldrslt);
        self.tree.absorb(&sub_tree, &sub_children, adopt_into);

        self.current = self.tree.create(NodeType::Text, Some(paragraph));
    }

    fn on_page_break(&mut self, full_state: &PublicState) {
        let para = self
            .current_paragraph
            .expect("a page break always occurs inside a paragraph");
        let pagebreak = self.tree.create(NodeType::Pagebreak, Some(para));
        self.chain.clear();

        let mut parent = pagebreak;
        for &attr in &BOOLEAN_ATTRS {
            if attr.get(full_state) {
                let node = self.tree.create(attr.node_type(), Some(parent));
                self.chain.push(ChainEntry { attr, node });
                parent = node;
            }
        }
        self.current = self.tree.create(NodeType::Text, Some(parent));
    }

    fn on_image(&mut self, attrs: &PictureAttributes, bytes: &[u8]) {
        let parent = self
            .tree
            .node(self.current)
            .parent
            .expect("current insertion node always has a parent");
        let image = self.tree.create(NodeType::Image, Some(parent));
        self.tree.node_mut(image).value = NodeValue::Bytes(bytes.to_vec());
        self.write_picture_attributes(image, attrs);
        self.current = self.tree.create(NodeType::Text, Some(parent));
    }

    fn on_set_document_attribute(&mut self, key: &str, value: &str) {
        self.tree
            .node_mut(self.root)
            .attributes
            .insert(key.to_string(), AttrValue::Str(value.to_string()));
    }
}

/// Parse `fldrslt` as an independent RTF body (§4.6: "as if it were an RTF
/// body wrapped in `{ … }`"), returning its tree and the children of its
/// first paragraph — the slice [`DomBuilder::on_field`] adopts.
fn run_subparse(fldrslt: &str) -> (Tree, Vec<NodeId>) {
    use crate::rtf::parser::Parser;

    let wrapped = format!("{{{fldrslt}}}");
    let mut sub_builder = DomBuilder::new();
    let arena = bumpalo::Bump::new();
    let mut parser = Parser::new(wrapped.as_bytes(), &arena);

    let result: RtfResult<()> = parser.run(&mut sub_builder);
    if result.is_err() {
        return (Tree::default(), Vec::new());
    }

    let root = sub_builder.root();
    let tree = sub_builder.into_tree();
    match tree.first_child_of_type(root, NodeType::Para) {
        Some(para) => {
            let children = tree.node(para).children.clone();
            (tree, children)
        }
        None => (tree, Vec::new()),
    }
}

#[allow(dead_code)]
fn node_attr_str<'a>(node: &'a Node, key: &str) -> Option<&'a str> {
    match node.attributes.get(key) {
        Some(AttrValue::Str(s)) => Some(s),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rtf::state::Alignment;

    fn state(bold: bool, italic: bool) -> PublicState {
        PublicState {
            bold,
            italic,
            ..PublicState::default()
        }
    }

    #[test]
    fn open_paragraph_creates_empty_text_insertion_point() {
        let mut builder = DomBuilder::new();
        builder.on_open_paragraph(&PublicState::default());
        assert_eq!(builder.tree.node(builder.current).node_type, NodeType::Text);
        assert_eq!(builder.tree.depth(builder.current), 2); // rtf -> para -> text
    }

    #[test]
    fn nested_bold_italic_chain_with_partial_turn_off() {
        let mut builder = DomBuilder::new();
        builder.on_open_paragraph(&PublicState::default());

        builder.on_state_change(&state(false, false), &state(true, false));
        builder.on_append_paragraph("ignored-before-italic");
        // reset text node so the append below starts clean, matching the
        // spec scenario: \b\i both\i0 onlyb\b0 none
        builder.tree.node_mut(builder.current).value = NodeValue::None;

        builder.on_state_change(&state(true, false), &state(true, true));
        builder.on_append_paragraph("both");

        builder.on_state_change(&state(true, true), &state(true, false));
        builder.on_append_paragraph("onlyb");

        builder.on_state_change(&state(true, false), &state(false, false));
        builder.on_append_paragraph("none");

        let para = builder.current_paragraph.unwrap();
        let bold = builder.tree.node(para).children[0];
        assert_eq!(builder.tree.node(bold).node_type, NodeType::Bold);
        // bold's children: [italic(containing "both"), text("onlyb")]
        let bold_children = &builder.tree.node(bold).children;
        assert_eq!(bold_children.len(), 2);
        let italic = bold_children[0];
        assert_eq!(builder.tree.node(italic).node_type, NodeType::Italic);
        let italic_text = builder.tree.node(italic).children[0];
        assert_eq!(
            builder.tree.node(italic_text).value,
            NodeValue::Text("both".into())
        );
        let onlyb_text = bold_children[1];
        assert_eq!(
            builder.tree.node(onlyb_text).value,
            NodeValue::Text("onlyb".into())
        );
        // after bold turns off, "none" lands directly under the paragraph
        let para_children = &builder.tree.node(para).children;
        assert_eq!(para_children.len(), 2);
        let none_text = para_children[1];
        assert_eq!(
            builder.tree.node(none_text).value,
            NodeValue::Text("none".into())
        );
    }

    #[test]
    fn field_driver_registration_prefers_override_on_reregister() {
        let mut builder = DomBuilder::new();
        fn alt(_: &str) -> Option<FieldAction> {
            Some(FieldAction::Hyperlink("alt".into()))
        }
        builder.register_field_driver("HYPERLINK", alt);
        assert!(builder.base_drivers.contains_key("HYPERLINK"));
        assert!(builder.override_drivers.contains_key("HYPERLINK"));
        assert_eq!(builder.lookup_driver("HYPERLINK").unwrap()("x").map(|a| matches!(a, FieldAction::Hyperlink(ref s) if s == "alt")), Some(true));
    }

    #[test]
    fn hyperlink_driver_extracts_and_unquotes_url() {
        let action = hyperlink_driver(r#"HYPERLINK "http://example.com""#).unwrap();
        match action {
            FieldAction::Hyperlink(url) => assert_eq!(url, "http://example.com"),
        }
    }

    #[test]
    fn alignment_written_on_paragraph_open() {
        let mut builder = DomBuilder::new();
        let mut state = PublicState::default();
        state.alignment = Alignment::Center;
        builder.on_open_paragraph(&state);
        let para = builder.current_paragraph.unwrap();
        assert_eq!(
            builder.tree.node(para).attributes.get("alignment"),
            Some(&AttrValue::Str("Center".to_string()))
        );
    }
}
