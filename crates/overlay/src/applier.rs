//! Relative text-metric adjustment of candidate elements.
//!
//! Every new value is computed from the element's snapshot, never from its current
//! style, so re-applying any delta is idempotent and a second delta replaces the first
//! rather than stacking on it.

use std::collections::BTreeSet;

use anyhow::Error;
use css_style_attr::StyleDeclarationBlock;
use css_values_units::{
    LengthUnit, LetterSpacing, LineHeight, compute_length_px, format_px, parse_length,
    parse_letter_spacing, parse_line_height, parse_value,
};
use dom::{Document, NodeKey};
use log::{debug, trace};
use style_engine::StyleEngine;

use crate::snapshots::{StyleSnapshot, StyleSnapshotStore};
use crate::state::OverlayState;

/// Text-bearing block and inline tags that receive adjustments.
pub const CANDIDATE_TAGS: &[&str] = &[
    "p", "span", "li", "a", "h1", "h2", "h3", "h4", "h5", "h6", "td", "th", "blockquote", "pre",
    "code", "div", "b", "strong", "i", "em", "mark", "small", "label",
];

/// Custom element used by third-party highlighter overlays.
pub const ANNOTATION_TAG: &str = "markerow8";

/// `line-height: normal` approximated as a multiple of the font size.
const NORMAL_LINE_HEIGHT: f64 = 1.2;

/// Decides which elements the applier touches.
#[derive(Debug, Clone)]
pub struct CandidateSelector {
    tags: BTreeSet<String>,
}

impl Default for CandidateSelector {
    fn default() -> Self {
        Self::new(&[])
    }
}

impl CandidateSelector {
    /// The built-in allow-list plus `extra` tag names.
    pub fn new(extra: &[String]) -> Self {
        let tags = CANDIDATE_TAGS
            .iter()
            .copied()
            .chain([ANNOTATION_TAG])
            .map(str::to_owned)
            .chain(extra.iter().map(|tag| tag.to_ascii_lowercase()))
            .collect();
        Self { tags }
    }

    /// Whether `node` is a candidate. A `div` only counts when it directly holds
    /// non-whitespace text, so pure layout containers are left alone.
    pub fn matches(&self, document: &Document, node: NodeKey) -> bool {
        let Some(tag) = document.tag(node) else {
            return false;
        };
        if !self.tags.contains(tag) {
            return false;
        }
        tag != "div"
            || document.children(node).into_iter().any(|child| {
                document
                    .text(child)
                    .is_some_and(|text| !text.trim().is_empty())
            })
    }

    /// All candidates in document order.
    pub fn select(&self, document: &Document) -> Vec<NodeKey> {
        document
            .descendants(document.root())
            .into_iter()
            .filter(|node| self.matches(document, *node))
            .collect()
    }
}

/// New pixel values for one element. `None` means the property is left unwritten.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AdjustedMetrics {
    pub font_size: Option<f64>,
    pub line_height: Option<f64>,
    pub letter_spacing: f64,
}

impl AdjustedMetrics {
    /// Derive adjusted values from an element's original computed style.
    /// Returns `None` when the original font size is not a pixel length.
    pub fn compute(snapshot: &StyleSnapshot, state: &OverlayState) -> Option<Self> {
        let original_font_size = parse_px(&snapshot.font_size)?;
        let new_font_size = original_font_size + f64::from(state.font_size_delta);

        let base_line_height = line_height_px(&snapshot.line_height, original_font_size);
        let mut new_line_height = base_line_height + state.line_height_delta;
        if !new_line_height.is_finite() || new_line_height <= 0.0 {
            new_line_height = new_font_size;
        }

        let base_letter_spacing = match parse_value(&snapshot.letter_spacing, parse_letter_spacing)
        {
            Ok(LetterSpacing::Length(length)) if length.unit == LengthUnit::Pixels => {
                f64::from(length.value)
            }
            _ => 0.0,
        };
        let mut new_letter_spacing = base_letter_spacing + state.letter_spacing_delta;
        if !new_letter_spacing.is_finite() {
            new_letter_spacing = base_letter_spacing;
        }

        Some(Self {
            font_size: (new_font_size > 0.0).then_some(new_font_size),
            line_height: (new_line_height > 0.0).then_some(new_line_height),
            letter_spacing: new_letter_spacing,
        })
    }

    /// Write the values into `block` as `!important` declarations.
    pub fn write_into(&self, block: &mut StyleDeclarationBlock) {
        if let Some(font_size) = self.font_size {
            block.set_property("font-size", &format_px(font_size), true);
        }
        if let Some(line_height) = self.line_height {
            block.set_property("line-height", &format_px(line_height), true);
        }
        block.set_property("letter-spacing", &format_px(self.letter_spacing), true);
    }
}

/// Pixel value of a computed length such as `16px`.
fn parse_px(text: &str) -> Option<f64> {
    parse_value(text, parse_length)
        .ok()
        .filter(|length| length.unit == LengthUnit::Pixels)
        .map(|length| f64::from(compute_length_px(length, 0.0, 0.0)))
}

/// Base line height in px: `normal` and anything unrecognised fall back to 1.2 times the
/// font size; a unitless number multiplies it; a px length is taken as is.
fn line_height_px(text: &str, font_size: f64) -> f64 {
    match parse_value(text, parse_line_height) {
        Ok(LineHeight::Number(multiplier)) => f64::from(multiplier) * font_size,
        Ok(LineHeight::Length(length)) if length.unit == LengthUnit::Pixels => {
            f64::from(length.value)
        }
        _ => font_size * NORMAL_LINE_HEIGHT,
    }
}

/// Writes adjusted metrics to every candidate element.
#[derive(Debug, Default, Clone)]
pub struct DeltaStyleApplier {
    selector: CandidateSelector,
}

impl DeltaStyleApplier {
    pub const fn new(selector: CandidateSelector) -> Self {
        Self { selector }
    }

    pub const fn selector(&self) -> &CandidateSelector {
        &self.selector
    }

    /// Apply the deltas of `state` to all candidates. Returns how many `style`
    /// attributes changed.
    ///
    /// # Errors
    /// Returns an error if the document rejects an attribute write.
    pub fn apply(
        &self,
        document: &mut Document,
        styles: &StyleEngine,
        store: &mut StyleSnapshotStore,
        state: &OverlayState,
    ) -> Result<usize, Error> {
        let candidates = self.selector.select(document);
        let mut written = 0_usize;
        for node in &candidates {
            let snapshot = store.get_or_capture(document, styles, *node);
            let Some(metrics) = AdjustedMetrics::compute(snapshot, state) else {
                trace!("{node:?} has no pixel font size, skipped");
                continue;
            };
            let current = document.attribute(*node, "style");
            let mut block = StyleDeclarationBlock::parse(current.unwrap_or_default());
            metrics.write_into(&mut block);
            let text = block.to_css_text();
            if current == Some(text.as_str()) {
                continue;
            }
            trace!("{node:?} style -> {text}");
            document.set_attribute(*node, "style", &text)?;
            written += 1;
        }
        debug!(
            "applied deltas to {} candidates ({written} changed)",
            candidates.len()
        );
        Ok(written)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot(font_size: &str, line_height: &str, letter_spacing: &str) -> StyleSnapshot {
        StyleSnapshot {
            font_size: font_size.to_owned(),
            line_height: line_height.to_owned(),
            letter_spacing: letter_spacing.to_owned(),
            original_inline_style: None,
        }
    }

    fn deltas(font_size: i32, line_height: f64, letter_spacing: f64) -> OverlayState {
        OverlayState {
            font_size_delta: font_size,
            line_height_delta: line_height,
            letter_spacing_delta: letter_spacing,
            spacing_enabled: false,
        }
    }

    fn written(snapshot: &StyleSnapshot, state: &OverlayState) -> Option<String> {
        let metrics = AdjustedMetrics::compute(snapshot, state)?;
        let mut block = StyleDeclarationBlock::default();
        metrics.write_into(&mut block);
        Some(block.to_css_text())
    }

    #[test]
    fn font_size_delta_adds_pixels() {
        let metrics =
            AdjustedMetrics::compute(&snapshot("16px", "normal", "normal"), &deltas(2, 0.0, 0.0));
        assert_eq!(metrics.and_then(|adjusted| adjusted.font_size), Some(18.0));
    }

    #[test]
    fn normal_line_height_uses_twelve_tenths() {
        assert_eq!(
            written(&snapshot("16px", "normal", "normal"), &deltas(0, 10.0, 0.0)),
            Some(
                "font-size: 16px !important; line-height: 29.2px !important; letter-spacing: 0px !important;"
                    .to_owned()
            )
        );
    }

    #[test]
    fn non_finite_deltas_never_reach_the_style() {
        assert_eq!(
            written(&snapshot("16px", "normal", "1px"), &deltas(0, f64::NAN, f64::NAN)),
            Some(
                "font-size: 16px !important; line-height: 16px !important; letter-spacing: 1px !important;"
                    .to_owned()
            )
        );
        assert_eq!(
            written(&snapshot("16px", "20px", "normal"), &deltas(1, 0.0, f64::INFINITY)),
            Some(
                "font-size: 17px !important; line-height: 20px !important; letter-spacing: 0px !important;"
                    .to_owned()
            )
        );
    }

    #[test]
    fn line_height_bases() {
        assert!((line_height_px("24px", 16.0) - 24.0).abs() < 1e-9);
        assert!((line_height_px("1.5", 20.0) - 30.0).abs() < 1e-6);
        assert!((line_height_px("normal", 10.0) - 12.0).abs() < 1e-9);
        assert!((line_height_px("2em", 10.0) - 12.0).abs() < 1e-9);
    }

    #[test]
    fn collapsed_line_height_falls_back_to_font_size() {
        let metrics =
            AdjustedMetrics::compute(&snapshot("16px", "20px", "normal"), &deltas(4, -25.0, 0.0));
        assert_eq!(metrics.and_then(|adjusted| adjusted.line_height), Some(20.0));
    }

    #[test]
    fn non_positive_font_size_is_not_written() {
        let metrics =
            AdjustedMetrics::compute(&snapshot("10px", "normal", "1.5px"), &deltas(-12, 0.0, 0.5));
        assert_eq!(
            metrics,
            Some(AdjustedMetrics {
                font_size: None,
                line_height: Some(12.0),
                letter_spacing: 2.0,
            })
        );
    }

    #[test]
    fn unparsable_font_size_skips_element() {
        assert_eq!(
            AdjustedMetrics::compute(&snapshot("", "normal", "normal"), &deltas(1, 0.0, 0.0)),
            None
        );
    }

    #[test]
    fn selector_filters_layout_divs() -> anyhow::Result<()> {
        let document = Document::parse_html(
            "<div id=layout>\n  <p>text</p>\n</div><div id=leaf>words</div><markerow8>hl</markerow8><section>no</section>",
        )?;
        let selector = CandidateSelector::default();
        let tags: Vec<String> = selector
            .select(&document)
            .into_iter()
            .map(|node| {
                let tag = document.tag(node).unwrap_or_default();
                let id = document.attribute(node, "id").unwrap_or_default();
                format!("{tag}#{id}")
            })
            .collect();
        assert_eq!(tags, vec!["p#", "div#leaf", "markerow8#"]);

        let extended = CandidateSelector::new(&["Section".to_owned()]);
        assert_eq!(extended.select(&document).len(), 4);
        Ok(())
    }
}
