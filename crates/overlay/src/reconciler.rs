//! Debounced re-application of the active adjustment after structural mutations.
//!
//! Time is passed in by the caller, so the timer is a plain deadline: a new structural
//! change replaces it, a new request clears it, and the owner fires it from `poll`.

use core::time::Duration;
use std::time::Instant;

use dom::{DOMUpdate, Document, NodeKey};
use log::trace;

#[derive(Debug, Clone)]
pub struct MutationReconciler {
    delay: Duration,
    deadline: Option<Instant>,
}

impl MutationReconciler {
    pub const fn new(delay: Duration) -> Self {
        Self {
            delay,
            deadline: None,
        }
    }

    pub const fn delay(&self) -> Duration {
        self.delay
    }

    /// When the pending re-application is due, if one is scheduled.
    pub const fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    pub const fn is_scheduled(&self) -> bool {
        self.deadline.is_some()
    }

    /// Whether a mutation record should trigger reconciliation. Only insertions and
    /// removals under `<body>` count; attribute and text writes never do, which keeps
    /// the engine's own style writes from re-triggering it. A removal whose parent has
    /// since been removed as well counts, since its place can no longer be checked.
    pub fn is_relevant(document: &Document, update: &DOMUpdate) -> bool {
        match update {
            DOMUpdate::InsertElement { parent, .. } | DOMUpdate::InsertText { parent, .. } => {
                within_body(document, *parent)
            }
            DOMUpdate::RemoveNode { parent, .. } => {
                !document.contains(*parent) || within_body(document, *parent)
            }
            DOMUpdate::SetAttr { .. }
            | DOMUpdate::RemoveAttr { .. }
            | DOMUpdate::SetText { .. } => false,
        }
    }

    /// Restart the quiescence timer from `now`.
    pub fn notify(&mut self, now: Instant) {
        let deadline = now + self.delay;
        if self.deadline.is_some() {
            trace!("reconciliation timer restarted");
        }
        self.deadline = Some(deadline);
    }

    /// Clear any pending re-application. Returns whether one was pending.
    pub fn cancel(&mut self) -> bool {
        let pending = self.deadline.take().is_some();
        if pending {
            trace!("reconciliation timer cleared");
        }
        pending
    }

    /// Consume the deadline if it has passed at `now`.
    pub fn take_due(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if deadline <= now => {
                self.deadline = None;
                true
            }
            Some(_) | None => false,
        }
    }
}

/// Whether `node` is `<body>` or inside it. Without a body every node counts.
fn within_body(document: &Document, node: NodeKey) -> bool {
    document
        .body()
        .is_none_or(|body| node == body || document.ancestors(node).contains(&body))
}
