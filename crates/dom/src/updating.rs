use anyhow::Error;

/// A 64-bit stable key for DOM nodes, used to correlate mutation records and
/// per-node side tables. Keys are never reused: locally minted keys grow
/// monotonically and a document rejects external records that bring back the key
/// of a removed node. A key that outlives its node simply stops resolving.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, PartialOrd, Ord)]
pub struct NodeKey(pub u64);

impl NodeKey {
    /// The document node key (always present).
    pub const ROOT: Self = Self(0);
}

/// A mutation record. Structural records (insertions and removals) are what a
/// `childList`/`subtree` observer sees; the others are attribute and character
/// data changes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DOMUpdate {
    InsertElement {
        parent: NodeKey,
        node: NodeKey,
        tag: String,
        pos: usize,
    },
    InsertText {
        parent: NodeKey,
        node: NodeKey,
        text: String,
        pos: usize,
    },
    SetAttr {
        node: NodeKey,
        name: String,
        value: String,
    },
    RemoveAttr {
        node: NodeKey,
        name: String,
    },
    SetText {
        node: NodeKey,
        text: String,
    },
    /// `parent` is the node's parent at the time of removal.
    RemoveNode {
        parent: NodeKey,
        node: NodeKey,
    },
}

impl DOMUpdate {
    /// Whether this record changes the shape of the tree.
    pub const fn is_structural(&self) -> bool {
        matches!(
            self,
            Self::InsertElement { .. } | Self::InsertText { .. } | Self::RemoveNode { .. }
        )
    }

    /// The node the record is about.
    pub const fn node(&self) -> NodeKey {
        match self {
            Self::InsertElement { node, .. }
            | Self::InsertText { node, .. }
            | Self::SetAttr { node, .. }
            | Self::RemoveAttr { node, .. }
            | Self::SetText { node, .. }
            | Self::RemoveNode { node, .. } => *node,
        }
    }
}

/// A subscriber that receives mutation records and mirrors them into its own state.
pub trait DOMSubscriber {
    /// Apply a single record to the subscriber state.
    ///
    /// # Errors
    /// Returns an error if the subscriber cannot apply the record.
    fn apply_update(&mut self, update: DOMUpdate) -> Result<(), Error>;
}
