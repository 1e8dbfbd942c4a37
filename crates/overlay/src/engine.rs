use std::time::Instant;

use anyhow::Error;
use dom::{DOMSubscriber, DOMUpdate, Document};
use log::{debug, info, warn};
use style_engine::StyleEngine;

use crate::applier::{CandidateSelector, DeltaStyleApplier};
use crate::config::OverlayConfig;
use crate::protocol::{Adjustment, ENGINE_VERSION, StatusReport};
use crate::reconciler::MutationReconciler;
use crate::resetter::StyleResetter;
use crate::snapshots::{StyleSnapshotStore, TextSnapshotStore};
use crate::spacing::{CjkSpacer, Segmenter, TextSpacingTransformer};
use crate::state::OverlayState;

/// Attribute on the root element recording whether spacing was last requested on.
pub const SPACING_MARKER: &str = "data-lite-read-pangu";

/// One overlay instance bound to one document.
///
/// The engine owns the document and every piece of overlay state. Callers drive it
/// with requests, mutation notifications and explicit timestamps.
#[derive(Debug)]
pub struct OverlayEngine {
    document: Document,
    styles: StyleEngine,
    /// Set when structural changes may have added or removed `<style>` elements.
    stylesheets_dirty: bool,
    config: OverlayConfig,
    state: OverlayState,
    style_snapshots: StyleSnapshotStore,
    text_snapshots: TextSnapshotStore,
    applier: DeltaStyleApplier,
    resetter: StyleResetter,
    spacing: TextSpacingTransformer,
    reconciler: MutationReconciler,
    styles_applied: bool,
}

impl OverlayEngine {
    /// Attach an engine using the built-in [`CjkSpacer`].
    pub fn attach(document: Document, config: OverlayConfig) -> Self {
        Self::attach_with_segmenter(document, config, Some(Box::new(CjkSpacer)))
    }

    /// Attach an engine with a custom segmenter, or none to run without spacing support.
    pub fn attach_with_segmenter(
        mut document: Document,
        config: OverlayConfig,
        segmenter: Option<Box<dyn Segmenter>>,
    ) -> Self {
        let earlier = document.take_updates();
        if !earlier.is_empty() {
            debug!("discarded {} mutation records from before attach", earlier.len());
        }
        let styles = StyleEngine::from_document(&document);
        let applier = DeltaStyleApplier::new(CandidateSelector::new(&config.extension_tags));
        let reconciler = MutationReconciler::new(config.reconcile_debounce());
        let spacing = TextSpacingTransformer::new(segmenter);
        info!(
            "overlay attached (version {ENGINE_VERSION}, spacing {})",
            if spacing.is_available() { "available" } else { "unavailable" }
        );
        Self {
            document,
            styles,
            stylesheets_dirty: false,
            config,
            state: OverlayState::default(),
            style_snapshots: StyleSnapshotStore::new(),
            text_snapshots: TextSnapshotStore::new(),
            applier,
            resetter: StyleResetter,
            spacing,
            reconciler,
            styles_applied: false,
        }
    }

    pub const fn document(&self) -> &Document {
        &self.document
    }

    /// Mutable access for hosts that change the page directly. Call
    /// [`OverlayEngine::observe`] afterwards so structural changes are seen.
    pub const fn document_mut(&mut self) -> &mut Document {
        &mut self.document
    }

    pub fn into_document(self) -> Document {
        self.document
    }

    pub const fn config(&self) -> &OverlayConfig {
        &self.config
    }

    pub const fn state(&self) -> &OverlayState {
        &self.state
    }

    pub const fn styles_applied(&self) -> bool {
        self.styles_applied
    }

    pub const fn spacing_applied(&self) -> bool {
        self.spacing.is_applied()
    }

    pub const fn style_snapshots(&self) -> &StyleSnapshotStore {
        &self.style_snapshots
    }

    pub const fn text_snapshots(&self) -> &TextSnapshotStore {
        &self.text_snapshots
    }

    /// When the pending reconciliation is due, if one is scheduled.
    pub const fn next_deadline(&self) -> Option<Instant> {
        self.reconciler.deadline()
    }

    /// Replace the requested adjustment and bring the document in line with it.
    ///
    /// A pending reconciliation is cleared first, so it can never run with an older
    /// state. When `spacing` is `None` the spacing pass and the marker are left as
    /// they are.
    ///
    /// # Errors
    /// Returns an error if the document rejects a write. The state is already
    /// replaced at that point.
    pub fn set_adjustment(&mut self, adjustment: Adjustment) -> Result<(), Error> {
        self.reconciler.cancel();
        self.state = OverlayState {
            font_size_delta: adjustment.font_size_delta,
            line_height_delta: adjustment.line_height_delta,
            letter_spacing_delta: adjustment.letter_spacing_delta,
            spacing_enabled: adjustment.spacing.unwrap_or(self.state.spacing_enabled),
        };

        if let Some(enabled) = adjustment.spacing {
            self.write_marker(enabled)?;
            if enabled && !self.spacing.is_applied() {
                self.spacing.apply(&mut self.document, &mut self.text_snapshots)?;
            } else if !enabled && self.spacing.is_applied() {
                self.spacing.revert(&mut self.document, &self.text_snapshots)?;
            }
        }

        if self.state.is_identity(self.config.identity_epsilon) {
            self.reset_styles()?;
        } else {
            self.apply_styles()?;
        }
        info!(
            "adjustment set: font {:+}px, line {:+}px, letter {:+}px, spacing {}",
            self.state.font_size_delta,
            self.state.line_height_delta,
            self.state.letter_spacing_delta,
            self.state.spacing_enabled
        );
        Ok(())
    }

    /// Current state plus the persisted spacing marker. Never mutates anything.
    pub fn status(&self) -> StatusReport {
        StatusReport {
            font_size: self.state.font_size_delta,
            line_height: self.state.line_height_delta,
            letter_spacing: self.state.letter_spacing_delta,
            pangu: self.spacing_marker(),
            version: ENGINE_VERSION,
        }
    }

    /// Whether the root element's marker says spacing is enabled.
    pub fn spacing_marker(&self) -> bool {
        self.document
            .document_element()
            .and_then(|root| self.document.attribute(root, SPACING_MARKER))
            == Some("true")
    }

    /// Drain pending mutation records. Structural changes prune snapshots of removed
    /// nodes and, while an adjustment is active, restart the reconciliation timer.
    /// Returns the number of records that counted as structural changes.
    pub fn observe(&mut self, now: Instant) -> usize {
        let updates = self.document.take_updates();
        let mut relevant = 0_usize;
        let mut removed = false;
        for update in &updates {
            if update.is_structural() {
                self.stylesheets_dirty = true;
            }
            if MutationReconciler::is_relevant(&self.document, update) {
                relevant += 1;
                removed |= matches!(update, DOMUpdate::RemoveNode { .. });
            }
        }
        if removed {
            let document = &self.document;
            let styles = self.style_snapshots.prune(|key| document.contains(key));
            let texts = self.text_snapshots.prune(|key| document.contains(key));
            if styles + texts > 0 {
                debug!("pruned {styles} style and {texts} text snapshots of removed nodes");
            }
        }
        if relevant > 0 && !self.state.is_identity(self.config.identity_epsilon) {
            self.reconciler.notify(now);
        }
        relevant
    }

    /// Run the reconciliation if its deadline has passed at `now`. Returns whether the
    /// applier ran.
    ///
    /// # Errors
    /// Returns an error if the document rejects a write.
    pub fn poll(&mut self, now: Instant) -> Result<bool, Error> {
        if !self.reconciler.take_due(now) {
            return Ok(false);
        }
        if self.state.is_identity(self.config.identity_epsilon) {
            return Ok(false);
        }
        debug!("reconciling after structural changes");
        self.apply_styles()?;
        Ok(true)
    }

    fn apply_styles(&mut self) -> Result<(), Error> {
        if self.stylesheets_dirty {
            self.styles = StyleEngine::from_document(&self.document);
            self.stylesheets_dirty = false;
        }
        self.applier.apply(
            &mut self.document,
            &self.styles,
            &mut self.style_snapshots,
            &self.state,
        )?;
        self.styles_applied = true;
        Ok(())
    }

    fn reset_styles(&mut self) -> Result<(), Error> {
        if !self.styles_applied {
            return Ok(());
        }
        let restored = self
            .resetter
            .reset(&mut self.document, &mut self.style_snapshots)?;
        self.styles_applied = false;
        info!("styles reset on {restored} elements");
        Ok(())
    }

    fn write_marker(&mut self, enabled: bool) -> Result<(), Error> {
        let Some(root) = self.document.document_element() else {
            warn!("document has no root element; spacing marker not written");
            return Ok(());
        };
        let value = if enabled { "true" } else { "false" };
        self.document.set_attribute(root, SPACING_MARKER, value)
    }
}

/// External mutation batches are applied to the owned document. Call
/// [`OverlayEngine::observe`] once the batch is in.
impl DOMSubscriber for OverlayEngine {
    fn apply_update(&mut self, update: DOMUpdate) -> Result<(), Error> {
        self.document.apply_update(update)
    }
}
