//! HTML5 parsing using html5ever.

use crate::document::Document;
use crate::updating::NodeKey;
use anyhow::Error;
use html5ever::tendril::TendrilSink as _;
use html5ever::{ParseOpts, parse_document};
use markup5ever_rcdom::{Handle, NodeData as RcNodeData, RcDom};

impl Document {
    /// Parse a complete HTML document.
    ///
    /// Comments, doctypes and processing instructions are dropped. Whitespace-only
    /// text is kept so that text-bearing checks see the same children a browser would.
    /// The resulting document has no pending mutation records.
    ///
    /// # Errors
    /// Returns an error if the input cannot be read or the tree cannot be built.
    pub fn parse_html(html: &str) -> Result<Self, Error> {
        let rc_dom: RcDom = parse_document(RcDom::default(), ParseOpts::default())
            .from_utf8()
            .read_from(&mut html.as_bytes())?;

        let mut document = Self::new();
        for child in rc_dom.document.children.borrow().iter() {
            convert_node(&mut document, child, NodeKey::ROOT)?;
        }
        document.take_updates();
        Ok(document)
    }
}

/// Convert an html5ever node (and its subtree) into our document.
fn convert_node(document: &mut Document, rc_node: &Handle, parent: NodeKey) -> Result<(), Error> {
    match &rc_node.data {
        RcNodeData::Document => {
            for child in rc_node.children.borrow().iter() {
                convert_node(document, child, parent)?;
            }
        }
        RcNodeData::Text { contents } => {
            let node = document.create_text(&contents.borrow());
            document.append_child(parent, node)?;
        }
        RcNodeData::Element { name, attrs, .. } => {
            let node = document.create_element(&name.local);
            for attr in attrs.borrow().iter() {
                document.set_attribute(node, &attr.name.local, &attr.value)?;
            }
            document.append_child(parent, node)?;
            for child in rc_node.children.borrow().iter() {
                convert_node(document, child, node)?;
            }
        }
        RcNodeData::Doctype { .. }
        | RcNodeData::Comment { .. }
        | RcNodeData::ProcessingInstruction { .. } => {}
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_html_body_structure() -> Result<(), Error> {
        let doc = Document::parse_html(
            "<!DOCTYPE html><html><head><title>t</title></head>\
             <body><p style=\"color: red\">Hello <b>world</b></p><!-- note --></body></html>",
        )?;
        assert!(!doc.has_pending_updates());
        let body = doc.body().ok_or_else(|| anyhow::anyhow!("no body"))?;
        let children = doc.children(body);
        assert_eq!(children.len(), 1, "comment dropped");
        let para = children[0];
        assert_eq!(doc.tag(para), Some("p"));
        assert_eq!(doc.attribute(para, "style"), Some("color: red"));
        let inner = doc.children(para);
        assert_eq!(doc.text(inner[0]), Some("Hello "));
        assert_eq!(doc.tag(inner[1]), Some("b"));
        Ok(())
    }

    #[test]
    fn fragments_get_implied_body() -> Result<(), Error> {
        let doc = Document::parse_html("<p>bare</p>")?;
        let body = doc.body().ok_or_else(|| anyhow::anyhow!("no body"))?;
        assert_eq!(doc.children(body).len(), 1);
        Ok(())
    }
}
