use crate::updating::{DOMSubscriber, DOMUpdate, NodeKey};
use anyhow::{Error, anyhow, bail};
use core::mem;
use indextree::{Arena, NodeId};
use log::trace;
use smallvec::SmallVec;
use std::collections::{HashMap, HashSet};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum NodeKind {
    #[default]
    Document,
    Element {
        tag: String,
    },
    Text {
        text: String,
    },
}

#[derive(Debug, Clone)]
pub struct DOMNode {
    pub key: NodeKey,
    pub kind: NodeKind,
    /// Attributes in source order; names are lowercase.
    pub attrs: SmallVec<(String, String), 4>,
}

impl DOMNode {
    fn new(key: NodeKey, kind: NodeKind) -> Self {
        Self {
            key,
            kind,
            attrs: SmallVec::new(),
        }
    }
}

/// A live document tree.
///
/// Nodes live in an `indextree` arena and are addressed from outside by
/// [`NodeKey`]. Removing a node frees its whole subtree and unregisters every key
/// in it, which is the hook side tables use to drop entries for detached nodes.
#[derive(Debug)]
pub struct Document {
    dom: Arena<DOMNode>,
    root: NodeId,
    ids: HashMap<NodeKey, NodeId>,
    /// Keys of removed nodes. They are never registered again.
    retired: HashSet<NodeKey>,
    next_key: u64,
    /// Mutation records not yet taken by an observer.
    pending: Vec<DOMUpdate>,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    /// Create an empty document containing only the document node.
    pub fn new() -> Self {
        let mut dom = Arena::new();
        let root = dom.new_node(DOMNode::new(NodeKey::ROOT, NodeKind::Document));
        let mut ids = HashMap::new();
        ids.insert(NodeKey::ROOT, root);
        Self {
            dom,
            root,
            ids,
            retired: HashSet::new(),
            next_key: 1,
            pending: Vec::new(),
        }
    }

    // -----------------------
    // Construction
    // -----------------------

    /// Mint a fresh key that has never been used in this document.
    pub fn mint_key(&mut self) -> NodeKey {
        let key = NodeKey(self.next_key);
        self.next_key = self.next_key.saturating_add(1);
        key
    }

    /// Create a detached element.
    pub fn create_element(&mut self, tag: &str) -> NodeKey {
        let key = self.mint_key();
        self.register(
            key,
            NodeKind::Element {
                tag: tag.to_ascii_lowercase(),
            },
        );
        key
    }

    /// Create a detached text node.
    pub fn create_text(&mut self, text: &str) -> NodeKey {
        let key = self.mint_key();
        self.register(
            key,
            NodeKind::Text {
                text: text.to_owned(),
            },
        );
        key
    }

    fn register(&mut self, key: NodeKey, kind: NodeKind) -> NodeId {
        let id = self.dom.new_node(DOMNode::new(key, kind));
        self.ids.insert(key, id);
        id
    }

    /// Register a node under a key minted elsewhere and insert it under `parent`.
    /// Nothing stays registered when the insertion fails.
    fn insert_external(
        &mut self,
        parent: NodeKey,
        key: NodeKey,
        kind: NodeKind,
        pos: usize,
    ) -> Result<(), Error> {
        if self.ids.contains_key(&key) {
            bail!("node key {key:?} is already in use");
        }
        if self.retired.contains(&key) {
            bail!("node key {key:?} belonged to a removed node");
        }
        self.id_of(parent)?;
        let id = self.register(key, kind);
        if let Err(err) = self.insert_child(parent, key, pos) {
            self.ids.remove(&key);
            id.remove_subtree(&mut self.dom);
            return Err(err);
        }
        self.next_key = self.next_key.max(key.0.saturating_add(1));
        Ok(())
    }

    // -----------------------
    // Tree mutation
    // -----------------------

    /// Append a detached node as the last child of `parent`.
    ///
    /// # Errors
    /// See [`Document::insert_child`].
    pub fn append_child(&mut self, parent: NodeKey, child: NodeKey) -> Result<(), Error> {
        self.insert_child(parent, child, usize::MAX)
    }

    /// Insert a detached node at `pos` among the children of `parent`; positions past
    /// the end append.
    ///
    /// # Errors
    /// Returns an error if either key is unknown, the parent cannot have children,
    /// or the child is the document node or already has a parent.
    pub fn insert_child(
        &mut self,
        parent: NodeKey,
        child: NodeKey,
        pos: usize,
    ) -> Result<(), Error> {
        let parent_id = self.id_of(parent)?;
        let child_id = self.id_of(child)?;
        if child_id == self.root {
            bail!("the document node cannot be inserted");
        }
        if matches!(self.get(parent_id).kind, NodeKind::Text { .. }) {
            bail!("text node {parent:?} cannot have children");
        }
        if self.dom[child_id].parent().is_some() {
            bail!("node {child:?} is already attached");
        }
        let next_sibling = parent_id.children(&self.dom).nth(pos);
        let index = if let Some(sibling) = next_sibling {
            sibling
                .checked_insert_before(child_id, &mut self.dom)
                .map_err(|err| anyhow!("insert {child:?} into {parent:?}: {err}"))?;
            pos
        } else {
            parent_id
                .checked_append(child_id, &mut self.dom)
                .map_err(|err| anyhow!("append {child:?} to {parent:?}: {err}"))?;
            parent_id.children(&self.dom).count().saturating_sub(1)
        };
        if self.is_connected_id(parent_id) {
            let record = match &self.get(child_id).kind {
                NodeKind::Element { tag } => DOMUpdate::InsertElement {
                    parent,
                    node: child,
                    tag: tag.clone(),
                    pos: index,
                },
                NodeKind::Text { text } => DOMUpdate::InsertText {
                    parent,
                    node: child,
                    text: text.clone(),
                    pos: index,
                },
                NodeKind::Document => bail!("the document node cannot be inserted"),
            };
            self.pending.push(record);
        }
        Ok(())
    }

    /// Remove a node and free its subtree. Every key in the subtree stops resolving.
    ///
    /// # Errors
    /// Returns an error for unknown keys and for the document node.
    pub fn remove_node(&mut self, node: NodeKey) -> Result<(), Error> {
        let id = self.id_of(node)?;
        if id == self.root {
            bail!("the document node cannot be removed");
        }
        if self.is_connected_id(id)
            && let Some(parent_id) = self.dom[id].parent()
        {
            let parent = self.get(parent_id).key;
            self.pending.push(DOMUpdate::RemoveNode { parent, node });
        }
        let freed: Vec<NodeKey> = id
            .descendants(&self.dom)
            .map(|descendant| self.get(descendant).key)
            .collect();
        for key in &freed {
            self.ids.remove(key);
        }
        self.retired.extend(freed.iter().copied());
        id.remove_subtree(&mut self.dom);
        trace!("removed {node:?} ({} keys freed)", freed.len());
        Ok(())
    }

    /// Set an attribute on an element, replacing any existing value.
    ///
    /// # Errors
    /// Returns an error for unknown keys and non-element nodes.
    pub fn set_attribute(&mut self, node: NodeKey, name: &str, value: &str) -> Result<(), Error> {
        let id = self.element_id(node)?;
        let name = name.to_ascii_lowercase();
        let attrs = &mut self.get_mut(id).attrs;
        if let Some(existing) = attrs.iter_mut().find(|(attr, _)| *attr == name) {
            value.clone_into(&mut existing.1);
        } else {
            attrs.push((name.clone(), value.to_owned()));
        }
        if self.is_connected_id(id) {
            self.pending.push(DOMUpdate::SetAttr {
                node,
                name,
                value: value.to_owned(),
            });
        }
        Ok(())
    }

    /// Remove an attribute, returning whether it was present.
    ///
    /// # Errors
    /// Returns an error for unknown keys and non-element nodes.
    pub fn remove_attribute(&mut self, node: NodeKey, name: &str) -> Result<bool, Error> {
        let id = self.element_id(node)?;
        let attrs = &mut self.get_mut(id).attrs;
        let Some(index) = attrs
            .iter()
            .position(|(attr, _)| attr.eq_ignore_ascii_case(name))
        else {
            return Ok(false);
        };
        let (removed, _) = attrs.remove(index);
        if self.is_connected_id(id) {
            self.pending
                .push(DOMUpdate::RemoveAttr { node, name: removed });
        }
        Ok(true)
    }

    /// Replace the contents of a text node.
    ///
    /// # Errors
    /// Returns an error for unknown keys and non-text nodes.
    pub fn set_text(&mut self, node: NodeKey, text: &str) -> Result<(), Error> {
        let id = self.id_of(node)?;
        let NodeKind::Text { text: current } = &mut self.get_mut(id).kind else {
            bail!("node {node:?} is not a text node");
        };
        text.clone_into(current);
        if self.is_connected_id(id) {
            self.pending.push(DOMUpdate::SetText {
                node,
                text: text.to_owned(),
            });
        }
        Ok(())
    }

    /// Drain the mutation records accumulated since the last call.
    pub fn take_updates(&mut self) -> Vec<DOMUpdate> {
        mem::take(&mut self.pending)
    }

    /// Whether mutation records are waiting to be taken.
    pub fn has_pending_updates(&self) -> bool {
        !self.pending.is_empty()
    }

    // -----------------------
    // Queries
    // -----------------------

    pub const fn root(&self) -> NodeKey {
        NodeKey::ROOT
    }

    /// Whether the key still resolves to a node.
    pub fn contains(&self, node: NodeKey) -> bool {
        self.ids.contains_key(&node)
    }

    /// Whether the node is reachable from the document node.
    pub fn is_connected(&self, node: NodeKey) -> bool {
        self.ids
            .get(&node)
            .is_some_and(|id| self.is_connected_id(*id))
    }

    /// The `<html>` element: the first element child of the document node.
    pub fn document_element(&self) -> Option<NodeKey> {
        self.children(NodeKey::ROOT)
            .into_iter()
            .find(|child| self.is_element(*child))
    }

    /// The `<body>` element, if the document has one.
    pub fn body(&self) -> Option<NodeKey> {
        let html = self.document_element()?;
        self.children(html)
            .into_iter()
            .find(|child| self.tag(*child) == Some("body"))
    }

    pub fn node(&self, node: NodeKey) -> Option<&DOMNode> {
        self.ids.get(&node).map(|id| self.get(*id))
    }

    pub fn parent(&self, node: NodeKey) -> Option<NodeKey> {
        let id = self.ids.get(&node)?;
        self.dom[*id].parent().map(|parent| self.get(parent).key)
    }

    pub fn children(&self, node: NodeKey) -> Vec<NodeKey> {
        self.ids.get(&node).map_or_else(Vec::new, |id| {
            id.children(&self.dom)
                .map(|child| self.get(child).key)
                .collect()
        })
    }

    /// Descendants of `node` in document order, excluding `node` itself.
    pub fn descendants(&self, node: NodeKey) -> Vec<NodeKey> {
        self.ids.get(&node).map_or_else(Vec::new, |id| {
            id.descendants(&self.dom)
                .skip(1)
                .map(|descendant| self.get(descendant).key)
                .collect()
        })
    }

    /// Ancestors of `node`, nearest first, excluding `node` itself.
    pub fn ancestors(&self, node: NodeKey) -> Vec<NodeKey> {
        self.ids.get(&node).map_or_else(Vec::new, |id| {
            id.ancestors(&self.dom)
                .skip(1)
                .map(|ancestor| self.get(ancestor).key)
                .collect()
        })
    }

    /// Lowercase tag name for elements.
    pub fn tag(&self, node: NodeKey) -> Option<&str> {
        match &self.node(node)?.kind {
            NodeKind::Element { tag } => Some(tag.as_str()),
            NodeKind::Document | NodeKind::Text { .. } => None,
        }
    }

    pub fn text(&self, node: NodeKey) -> Option<&str> {
        match &self.node(node)?.kind {
            NodeKind::Text { text } => Some(text.as_str()),
            NodeKind::Document | NodeKind::Element { .. } => None,
        }
    }

    pub fn attribute(&self, node: NodeKey, name: &str) -> Option<&str> {
        self.node(node)?
            .attrs
            .iter()
            .find(|(attr, _)| attr.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    pub fn is_element(&self, node: NodeKey) -> bool {
        self.tag(node).is_some()
    }

    pub fn is_text(&self, node: NodeKey) -> bool {
        self.text(node).is_some()
    }

    // -----------------------
    // Internals
    // -----------------------

    fn id_of(&self, node: NodeKey) -> Result<NodeId, Error> {
        self.ids
            .get(&node)
            .copied()
            .ok_or_else(|| anyhow!("unknown node key {node:?}"))
    }

    fn element_id(&self, node: NodeKey) -> Result<NodeId, Error> {
        let id = self.id_of(node)?;
        if matches!(self.get(id).kind, NodeKind::Element { .. }) {
            Ok(id)
        } else {
            Err(anyhow!("node {node:?} is not an element"))
        }
    }

    fn is_connected_id(&self, id: NodeId) -> bool {
        id.ancestors(&self.dom).any(|ancestor| ancestor == self.root)
    }

    fn get(&self, id: NodeId) -> &DOMNode {
        self.dom[id].get()
    }

    fn get_mut(&mut self, id: NodeId) -> &mut DOMNode {
        self.dom[id].get_mut()
    }
}

/// Mirrors externally produced mutation records into the tree. Keys carried by
/// insert records are minted by the producer.
impl DOMSubscriber for Document {
    fn apply_update(&mut self, update: DOMUpdate) -> Result<(), Error> {
        use DOMUpdate::*;
        match update {
            InsertElement {
                parent,
                node,
                tag,
                pos,
            } => self.insert_external(
                parent,
                node,
                NodeKind::Element {
                    tag: tag.to_ascii_lowercase(),
                },
                pos,
            ),
            InsertText {
                parent,
                node,
                text,
                pos,
            } => self.insert_external(parent, node, NodeKind::Text { text }, pos),
            SetAttr { node, name, value } => self.set_attribute(node, &name, &value),
            RemoveAttr { node, name } => self.remove_attribute(node, &name).map(drop),
            SetText { node, text } => self.set_text(node, &text),
            RemoveNode { parent, node } => {
                if self.parent(node) != Some(parent) {
                    bail!("node {node:?} is not a child of {parent:?}");
                }
                self.remove_node(node)
            }
        }
    }
}
