//! Reversible text-spacing normalization over the document's text nodes.

mod cjk;

use core::fmt;

use anyhow::Error;
use dom::{Document, NodeKey};
use log::{debug, warn};

use crate::snapshots::TextSnapshotStore;

pub use cjk::CjkSpacer;

/// Elements whose text is never rewritten.
pub const EXCLUDED_CONTAINERS: &[&str] = &["script", "style", "textarea", "pre", "code"];

/// An external segmentation capability: returns `text` with separating whitespace
/// inserted where it belongs.
pub trait Segmenter: Send {
    fn segment(&self, text: &str) -> String;
}

/// Applies and reverts a [`Segmenter`] pass, keeping originals in a [`TextSnapshotStore`].
pub struct TextSpacingTransformer {
    segmenter: Option<Box<dyn Segmenter>>,
    applied: bool,
}

impl TextSpacingTransformer {
    /// A transformer without a segmenter reports every `apply` as unavailable.
    pub fn new(segmenter: Option<Box<dyn Segmenter>>) -> Self {
        Self {
            segmenter,
            applied: false,
        }
    }

    pub fn is_available(&self) -> bool {
        self.segmenter.is_some()
    }

    /// Whether the last completed call was `apply`.
    pub const fn is_applied(&self) -> bool {
        self.applied
    }

    /// Segment every eligible text node, capturing originals before the first change.
    /// Returns the number of nodes rewritten.
    ///
    /// Without a segmenter this logs a warning and changes nothing, including the
    /// applied flag.
    ///
    /// # Errors
    /// Returns an error if the document rejects a text write.
    pub fn apply(
        &mut self,
        document: &mut Document,
        store: &mut TextSnapshotStore,
    ) -> Result<usize, Error> {
        let Some(segmenter) = self.segmenter.as_deref() else {
            warn!("text spacing requested but no segmenter is available");
            return Ok(0);
        };
        let mut changed = 0_usize;
        for node in text_universe(document) {
            if is_excluded(document, node) {
                continue;
            }
            let Some(current) = document.text(node) else {
                continue;
            };
            if current.trim().is_empty() {
                continue;
            }
            let spaced = segmenter.segment(current);
            if spaced == current {
                continue;
            }
            store.get_or_capture(document, node);
            document.set_text(node, &spaced)?;
            changed += 1;
        }
        self.applied = true;
        debug!("text spacing applied to {changed} nodes");
        Ok(changed)
    }

    /// Restore every snapshotted text node to its original content. Snapshots are kept
    /// so a later `apply` still records the true original. Returns the number of nodes
    /// rewritten.
    ///
    /// # Errors
    /// Returns an error if the document rejects a text write.
    pub fn revert(
        &mut self,
        document: &mut Document,
        store: &TextSnapshotStore,
    ) -> Result<usize, Error> {
        let mut changed = 0_usize;
        for node in text_universe(document) {
            let Some(original) = store.get(node) else {
                continue;
            };
            if document.text(node) == Some(original) {
                continue;
            }
            document.set_text(node, original)?;
            changed += 1;
        }
        self.applied = false;
        debug!("text spacing reverted on {changed} nodes");
        Ok(changed)
    }
}

impl fmt::Debug for TextSpacingTransformer {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("TextSpacingTransformer")
            .field("available", &self.is_available())
            .field("applied", &self.applied)
            .finish()
    }
}

/// Text nodes under `<body>`, or under the whole document when there is no body.
fn text_universe(document: &Document) -> Vec<NodeKey> {
    let scope = document.body().unwrap_or_else(|| document.root());
    document
        .descendants(scope)
        .into_iter()
        .filter(|node| document.is_text(*node))
        .collect()
}

/// Whether any ancestor of `node` is an excluded container.
fn is_excluded(document: &Document, node: NodeKey) -> bool {
    document.ancestors(node).into_iter().any(|ancestor| {
        document
            .tag(ancestor)
            .is_some_and(|tag| EXCLUDED_CONTAINERS.contains(&tag))
    })
}
