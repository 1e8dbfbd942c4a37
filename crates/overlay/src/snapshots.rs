//! Capture-once stores of pre-adjustment values, keyed by [`NodeKey`].
//!
//! A snapshot must be taken before the first write to a node; capturing after a write
//! would record already-adjusted values. [`Document`] never reuses a key and rejects
//! mirrored records that bring one back, so an entry for a removed node can only go
//! stale, never alias a new node. Stale entries are dropped by `prune`.

use std::collections::HashMap;

use dom::{Document, NodeKey};
use log::trace;
use style_engine::StyleEngine;

/// Original computed text metrics of one element, serialized like `getComputedStyle`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StyleSnapshot {
    pub font_size: String,
    pub line_height: String,
    pub letter_spacing: String,
    /// The `style` attribute text before adjustment, `None` if the attribute was absent.
    pub original_inline_style: Option<String>,
}

impl StyleSnapshot {
    /// Read the computed values of `node` as they are right now.
    pub fn capture(document: &Document, styles: &StyleEngine, node: NodeKey) -> Self {
        let computed = styles.computed_style(document, node);
        Self {
            font_size: computed.css_value("font-size").unwrap_or_default(),
            line_height: computed.css_value("line-height").unwrap_or_default(),
            letter_spacing: computed.css_value("letter-spacing").unwrap_or_default(),
            original_inline_style: document.attribute(node, "style").map(str::to_owned),
        }
    }
}

#[derive(Debug, Default)]
pub struct StyleSnapshotStore {
    entries: HashMap<NodeKey, StyleSnapshot>,
}

impl StyleSnapshotStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the stored snapshot for `node`, capturing it first if there is none.
    pub fn get_or_capture(
        &mut self,
        document: &Document,
        styles: &StyleEngine,
        node: NodeKey,
    ) -> &StyleSnapshot {
        self.entries.entry(node).or_insert_with(|| {
            trace!("style snapshot captured for {node:?}");
            StyleSnapshot::capture(document, styles, node)
        })
    }

    pub fn get(&self, node: NodeKey) -> Option<&StyleSnapshot> {
        self.entries.get(&node)
    }

    pub fn has(&self, node: NodeKey) -> bool {
        self.entries.contains_key(&node)
    }

    /// Drop the snapshot so the next adjustment captures fresh originals.
    pub fn forget(&mut self, node: NodeKey) -> Option<StyleSnapshot> {
        self.entries.remove(&node)
    }

    /// Keep only entries whose key satisfies `keep`. Returns the number dropped.
    pub fn prune<F>(&mut self, keep: F) -> usize
    where
        F: Fn(NodeKey) -> bool,
    {
        let before = self.entries.len();
        self.entries.retain(|key, _| keep(*key));
        before - self.entries.len()
    }

    /// Snapshotted nodes in ascending key order.
    pub fn keys(&self) -> Vec<NodeKey> {
        let mut keys: Vec<NodeKey> = self.entries.keys().copied().collect();
        keys.sort_unstable();
        keys
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Original text of nodes the spacing pass has changed.
#[derive(Debug, Default)]
pub struct TextSnapshotStore {
    entries: HashMap<NodeKey, String>,
}

impl TextSnapshotStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the stored text for `node`, capturing its current content first if there
    /// is none. Returns `None` for nodes that are not text nodes.
    pub fn get_or_capture(&mut self, document: &Document, node: NodeKey) -> Option<&str> {
        if !self.entries.contains_key(&node) {
            let text = document.text(node)?;
            trace!("text snapshot captured for {node:?}");
            self.entries.insert(node, text.to_owned());
        }
        self.entries.get(&node).map(String::as_str)
    }

    pub fn get(&self, node: NodeKey) -> Option<&str> {
        self.entries.get(&node).map(String::as_str)
    }

    pub fn has(&self, node: NodeKey) -> bool {
        self.entries.contains_key(&node)
    }

    pub fn forget(&mut self, node: NodeKey) -> Option<String> {
        self.entries.remove(&node)
    }

    /// Keep only entries whose key satisfies `keep`. Returns the number dropped.
    pub fn prune<F>(&mut self, keep: F) -> usize
    where
        F: Fn(NodeKey) -> bool,
    {
        let before = self.entries.len();
        self.entries.retain(|key, _| keep(*key));
        before - self.entries.len()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
