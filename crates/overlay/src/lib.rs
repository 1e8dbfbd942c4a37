#![allow(
    clippy::missing_inline_in_public_items,
    reason = "Inlining decisions left to compiler for this crate"
)]

//! Reversible text-metric overlay for a live document.
//!
//! An [`OverlayEngine`] is attached to one [`dom::Document`]. Requests set relative
//! deltas for font size, line height and letter spacing plus an optional
//! text-spacing pass; the engine snapshots each element's original computed style
//! before its first write, so every adjustment is computed from the original and
//! the identity request restores the page exactly.

pub mod applier;
pub mod config;
pub mod engine;
pub mod handler;
pub mod protocol;
pub mod reconciler;
pub mod resetter;
pub mod runtime;
pub mod snapshots;
pub mod spacing;
pub mod state;

pub use applier::{AdjustedMetrics, CandidateSelector, DeltaStyleApplier};
pub use config::OverlayConfig;
pub use engine::{OverlayEngine, SPACING_MARKER};
pub use handler::RequestHandler;
pub use protocol::{
    Adjustment, CoerceError, ENGINE_VERSION, NumericInput, Preset, Request, Response,
    ResponseStatus, StatusReport, needs_reinject,
};
pub use reconciler::MutationReconciler;
pub use resetter::StyleResetter;
pub use snapshots::{StyleSnapshot, StyleSnapshotStore, TextSnapshotStore};
pub use spacing::{CjkSpacer, Segmenter, TextSpacingTransformer};
pub use state::OverlayState;
