//! HTML serialization for inspection, fixtures, and the host's `--dump` output.

use crate::document::{Document, NodeKind};
use crate::updating::NodeKey;

/// Elements that never have an end tag.
const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source", "track",
    "wbr",
];

/// Elements whose text children are emitted raw.
const RAW_TEXT_ELEMENTS: &[&str] = &["script", "style"];

impl Document {
    /// Serialize a node and its subtree. Attribute order is preserved.
    pub fn outer_html(&self, node: NodeKey) -> String {
        let mut out = String::new();
        self.write_node(node, &mut out);
        out
    }

    /// Serialize the children of a node.
    pub fn inner_html(&self, node: NodeKey) -> String {
        let mut out = String::new();
        for child in self.children(node) {
            self.write_node(child, &mut out);
        }
        out
    }

    /// Serialize the whole document.
    pub fn to_html(&self) -> String {
        self.inner_html(NodeKey::ROOT)
    }

    fn write_node(&self, node: NodeKey, out: &mut String) {
        let Some(data) = self.node(node) else {
            return;
        };
        match &data.kind {
            NodeKind::Document => {
                for child in self.children(node) {
                    self.write_node(child, out);
                }
            }
            NodeKind::Text { text } => {
                let raw = self
                    .parent(node)
                    .and_then(|parent| self.tag(parent))
                    .is_some_and(|tag| RAW_TEXT_ELEMENTS.contains(&tag));
                if raw {
                    out.push_str(text);
                } else {
                    out.push_str(&html_escape::encode_text(text));
                }
            }
            NodeKind::Element { tag } => {
                out.push('<');
                out.push_str(tag);
                for (name, value) in data.attrs.iter() {
                    out.push(' ');
                    out.push_str(name);
                    out.push_str("=\"");
                    out.push_str(&html_escape::encode_double_quoted_attribute(value));
                    out.push('"');
                }
                out.push('>');
                if VOID_ELEMENTS.contains(&tag.as_str()) {
                    return;
                }
                for child in self.children(node) {
                    self.write_node(child, out);
                }
                out.push_str("</");
                out.push_str(tag);
                out.push('>');
            }
        }
    }
}
