//! The public facade (§6 External Interfaces): parse an RTF byte stream
//! and get back a DOM root.

use super::dom::{DomBuilder, NodeId, NodeValue, Tree};
use super::error::{RtfError, RtfResult};
use super::parser::Parser;
use bumpalo::Bump;
use std::path::Path;

/// A parsed RTF document: an owned DOM [`Tree`] plus the arena used for
/// transient parsing buffers (kept alive only because `Parser` borrows it;
/// the tree itself holds no borrowed data).
pub struct RtfDocument {
    tree: Tree,
    root: NodeId,
    _arena: Bump,
}

impl RtfDocument {
    /// Parse an RTF document from a string.
    ///
    /// ```rust,no_run
    /// use rtfdom::rtf::RtfDocument;
    ///
    /// let rtf = r#"{\rtf1\ansi Hello World!\par}"#;
    /// let doc = RtfDocument::parse(rtf)?;
    /// let text = doc.text();
    /// # Ok::<(), rtfdom::rtf::RtfError>(())
    /// ```
    pub fn parse(input: &str) -> RtfResult<RtfDocument> {
        Self::parse_with(input, |_| {})
    }

    /// Parse, first giving the caller a chance to register custom field
    /// drivers on the [`DomBuilder`] (§6 `fieldDrivers` configuration).
    pub fn parse_with(input: &str, configure: impl FnOnce(&mut DomBuilder)) -> RtfResult<RtfDocument> {
        let arena = Bump::new();
        let mut builder = DomBuilder::new();
        configure(&mut builder);
        {
            let mut parser = Parser::new(input.as_bytes(), &arena);
            parser.run(&mut builder)?;
        }
        let root = builder.root();
        let tree = builder.into_tree();
        Ok(RtfDocument {
            tree,
            root,
            _arena: arena,
        })
    }

    /// Parse an RTF document from a file.
    pub fn open<P: AsRef<Path>>(path: P) -> RtfResult<RtfDocument> {
        let bytes = std::fs::read(path).map_err(|e| RtfError::ParserError(format!("Failed to read file: {}", e)))?;
        Self::from_bytes(&bytes)
    }

    /// Parse an RTF document from raw bytes.
    pub fn from_bytes(bytes: &[u8]) -> RtfResult<RtfDocument> {
        let input = std::str::from_utf8(bytes)
            .map_err(|e| RtfError::InvalidUnicode(format!("Invalid UTF-8: {}", e)))?;
        Self::parse(input)
    }

    /// The root `rtf` node.
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// The underlying DOM tree, for depth-first traversal (§6).
    pub fn tree(&self) -> &Tree {
        &self.tree
    }

    /// A detached snapshot of the tree (§6: "a deep-copy accessor returns a
    /// snapshot detached from the builder's live tree").
    pub fn snapshot(&self) -> Tree {
        self.tree.snapshot()
    }

    /// All text content, concatenated in document order.
    pub fn text(&self) -> String {
        let mut out = String::new();
        for id in self.tree.depth_first(self.root) {
            if let NodeValue::Text(s) = &self.tree.node(id).value {
                out.push_str(s);
            }
        }
        out
    }

    /// Number of top-level paragraph nodes.
    pub fn paragraph_count(&self) -> usize {
        self.tree.node(self.root).children.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn simple_document_round_trips_through_text() {
        let rtf = r#"{\rtf1\ansi Hello World!\par}"#;
        let doc = RtfDocument::parse(rtf).unwrap();
        assert!(doc.text().contains("Hello World"));
        assert_eq!(doc.paragraph_count(), 2); // "Hello World!" then the empty paragraph opened by \par
    }

    #[test]
    fn formatted_text_builds_nested_chain() {
        let rtf = r#"{\rtf1\ansi{\b Bold}{\i Italic}\par}"#;
        let doc = RtfDocument::parse(rtf).unwrap();
        assert!(doc.text().contains("Bold"));
        assert!(doc.text().contains("Italic"));
    }

    #[test]
    fn hyperlink_round_trip() {
        let rtf = r#"{\rtf1 {\field{\*\fldinst HYPERLINK "http://x"}{\fldrslt click}}}"#;
        let doc = RtfDocument::parse(rtf).unwrap();
        let para = doc.tree().node(doc.root()).children[0];
        let hyperlink = doc
            .tree()
            .node(para)
            .children
            .iter()
            .find(|&&id| doc.tree().node(id).node_type == super::super::dom::NodeType::Hyperlink)
            .copied()
            .expect("hyperlink node present");
        match doc.tree().node(hyperlink).attributes.get("href") {
            Some(super::super::dom::AttrValue::Str(href)) => assert_eq!(href, "http://x"),
            other => panic!("unexpected href attribute: {:?}", other),
        }
        let text_child = doc.tree().node(hyperlink).children[0];
        assert_eq!(
            doc.tree().node(text_child).value,
            NodeValue::Text("click".to_string())
        );
    }
}
