//! Computed text metrics for elements of a [`dom::Document`].
//!
//! The engine cascades user-agent defaults, author `<style>` rules and the inline
//! `style` attribute for the three inherited properties the overlay works with:
//! `font-size`, `line-height` and `letter-spacing`. Every other property is ignored.

use css_style_attr::{Declaration, parse_style_attribute};
use css_values_units::{
    Length, LetterSpacing, LineHeight, ParseError, Percentage, compute_length_px, parse_length,
    parse_letter_spacing, parse_line_height, parse_percentage, parse_value,
};
use cssparser::Parser;
use dom::{Document, NodeKey};
use log::debug;

mod computed_style;
mod stylesheet;
mod ua;

pub use computed_style::{ComputedLetterSpacing, ComputedLineHeight, ComputedStyle};
pub use stylesheet::{Rule, SimpleSelector, Specificity};
pub use ua::MEDIUM_FONT_SIZE;

/// Specified `font-size` after parsing, before resolution against the parent.
#[derive(Debug, Clone, Copy, PartialEq)]
enum FontSizeSpecified {
    Absolute(f32),
    Length(Length),
    Percentage(Percentage),
    Smaller,
    Larger,
    Inherit,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Specified<T> {
    Value(T),
    Inherit,
    Initial,
}

/// Winning specified values for one element.
#[derive(Debug, Default)]
struct Cascaded {
    font_size: Option<FontSizeSpecified>,
    line_height: Option<Specified<LineHeight>>,
    letter_spacing: Option<Specified<LetterSpacing>>,
}

/// Cascade sort key: importance, origin, specificity, source order.
type CascadeKey = (u8, u8, Specificity, u32);

const ORIGIN_UA: u8 = 0;
const ORIGIN_AUTHOR: u8 = 1;

/// Resolves computed text metrics on demand from the document's current state.
#[derive(Debug, Default, Clone)]
pub struct StyleEngine {
    rules: Vec<Rule>,
    next_order: u32,
}

impl StyleEngine {
    /// Create an engine with only user-agent defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an engine holding every `<style>` element of `document`, in tree order.
    pub fn from_document(document: &Document) -> Self {
        let mut engine = Self::new();
        for node in document.descendants(document.root()) {
            if document.tag(node) != Some("style") {
                continue;
            }
            let css: String = document
                .children(node)
                .into_iter()
                .filter_map(|child| document.text(child))
                .collect();
            engine.add_stylesheet(&css);
        }
        engine
    }

    /// Append an author stylesheet; later sheets win ties on specificity.
    pub fn add_stylesheet(&mut self, css: &str) {
        let before = self.rules.len();
        self.next_order = stylesheet::parse_stylesheet(css, &mut self.rules, self.next_order);
        debug!(
            "author stylesheet added: {} rules",
            self.rules.len().saturating_sub(before)
        );
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    /// Computed style of `node`. Text nodes report their parent element's style.
    pub fn computed_style(&self, document: &Document, node: NodeKey) -> ComputedStyle {
        let mut chain: Vec<NodeKey> = document
            .ancestors(node)
            .into_iter()
            .filter(|ancestor| document.is_element(*ancestor))
            .collect();
        chain.reverse();
        if document.is_element(node) {
            chain.push(node);
        }

        let mut style = ComputedStyle::default();
        let mut root_font_size = MEDIUM_FONT_SIZE;
        for (depth, element) in chain.into_iter().enumerate() {
            style = self.compute_element(document, element, &style, root_font_size);
            if depth == 0 {
                root_font_size = style.font_size;
            }
        }
        style
    }

    /// Serialized computed value of `property` for `node`, as a browser reports it.
    pub fn computed_value(
        &self,
        document: &Document,
        node: NodeKey,
        property: &str,
    ) -> Option<String> {
        self.computed_style(document, node).css_value(property)
    }

    fn compute_element(
        &self,
        document: &Document,
        element: NodeKey,
        parent: &ComputedStyle,
        root_font_size: f32,
    ) -> ComputedStyle {
        let cascaded = self.cascade(document, element);

        let font_size = match cascaded.font_size {
            None | Some(FontSizeSpecified::Inherit) => parent.font_size,
            Some(FontSizeSpecified::Absolute(px)) => px,
            Some(FontSizeSpecified::Length(length)) => {
                compute_length_px(length, parent.font_size, root_font_size)
            }
            Some(FontSizeSpecified::Percentage(percentage)) => percentage.of(parent.font_size),
            Some(FontSizeSpecified::Smaller) => parent.font_size / 1.2,
            Some(FontSizeSpecified::Larger) => parent.font_size * 1.2,
        };

        let line_height = match cascaded.line_height {
            None | Some(Specified::Inherit) => parent.line_height,
            Some(Specified::Initial | Specified::Value(LineHeight::Normal)) => {
                ComputedLineHeight::Normal
            }
            Some(Specified::Value(LineHeight::Number(number))) => {
                ComputedLineHeight::Number(number)
            }
            Some(Specified::Value(LineHeight::Length(length))) => {
                ComputedLineHeight::Px(compute_length_px(length, font_size, root_font_size))
            }
            Some(Specified::Value(LineHeight::Percentage(percentage))) => {
                ComputedLineHeight::Px(percentage.of(font_size))
            }
        };

        let letter_spacing = match cascaded.letter_spacing {
            None | Some(Specified::Inherit) => parent.letter_spacing,
            Some(Specified::Initial | Specified::Value(LetterSpacing::Normal)) => {
                ComputedLetterSpacing::Normal
            }
            Some(Specified::Value(LetterSpacing::Length(length))) => {
                ComputedLetterSpacing::Px(compute_length_px(length, font_size, root_font_size))
            }
        };

        ComputedStyle {
            font_size,
            line_height,
            letter_spacing,
        }
    }

    fn cascade(&self, document: &Document, element: NodeKey) -> Cascaded {
        let mut items: Vec<(CascadeKey, Declaration)> = Vec::new();

        if let Some(tag) = document.tag(element) {
            for (property, value) in ua::ua_declarations(tag) {
                items.push((
                    (0, ORIGIN_UA, Specificity::default(), 0),
                    Declaration {
                        property: (*property).to_owned(),
                        value: (*value).to_owned(),
                        important: false,
                    },
                ));
            }
        }

        for rule in &self.rules {
            if !rule.selector.matches(document, element) {
                continue;
            }
            let specificity = rule.selector.specificity();
            for declaration in &rule.declarations {
                items.push((
                    (
                        u8::from(declaration.important),
                        ORIGIN_AUTHOR,
                        specificity,
                        rule.source_order,
                    ),
                    declaration.clone(),
                ));
            }
        }

        // Inline style sits in the author origin with a specificity no selector reaches.
        if let Some(inline) = document.attribute(element, "style") {
            for declaration in parse_style_attribute(inline) {
                items.push((
                    (
                        u8::from(declaration.important),
                        ORIGIN_AUTHOR,
                        Specificity::INLINE,
                        u32::MAX,
                    ),
                    declaration,
                ));
            }
        }

        // Stable sort keeps declaration order inside one block.
        items.sort_by(|left, right| left.0.cmp(&right.0));

        let mut cascaded = Cascaded::default();
        for (_, declaration) in items {
            let value = declaration.value.trim();
            match declaration.property.as_str() {
                "font-size" => {
                    if let Some(specified) = parse_font_size(value) {
                        cascaded.font_size = Some(specified);
                    }
                }
                "line-height" => {
                    if let Some(specified) = parse_specified(value, parse_line_height) {
                        cascaded.line_height = Some(specified);
                    }
                }
                "letter-spacing" => {
                    if let Some(specified) = parse_specified(value, parse_letter_spacing) {
                        cascaded.letter_spacing = Some(specified);
                    }
                }
                _ => {}
            }
        }
        cascaded
    }
}

/// Parse a value that may also be one of the CSS-wide keywords.
/// Invalid values yield `None` and lose to earlier declarations.
fn parse_specified<T, F>(value: &str, parse: F) -> Option<Specified<T>>
where
    F: FnOnce(&mut Parser) -> Result<T, ParseError>,
{
    match value.to_ascii_lowercase().as_str() {
        "inherit" | "unset" => Some(Specified::Inherit),
        "initial" => Some(Specified::Initial),
        _ => parse_value(value, parse).ok().map(Specified::Value),
    }
}

fn parse_font_size(value: &str) -> Option<FontSizeSpecified> {
    let keyword = value.to_ascii_lowercase();
    let absolute = match keyword.as_str() {
        "inherit" | "unset" => return Some(FontSizeSpecified::Inherit),
        "smaller" => return Some(FontSizeSpecified::Smaller),
        "larger" => return Some(FontSizeSpecified::Larger),
        "xx-small" => Some(9.0),
        "x-small" => Some(10.0),
        "small" => Some(13.0),
        "medium" | "initial" => Some(MEDIUM_FONT_SIZE),
        "large" => Some(18.0),
        "x-large" => Some(24.0),
        "xx-large" => Some(32.0),
        "xxx-large" => Some(48.0),
        _ => None,
    };
    if let Some(px) = absolute {
        return Some(FontSizeSpecified::Absolute(px));
    }
    if let Ok(percentage) = parse_value(value, parse_percentage) {
        return (percentage.0 >= 0.0).then_some(FontSizeSpecified::Percentage(percentage));
    }
    parse_value(value, parse_length)
        .ok()
        .filter(|length| length.value >= 0.0)
        .map(FontSizeSpecified::Length)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn font_size_keywords_and_units() {
        assert_eq!(
            parse_font_size("LARGE"),
            Some(FontSizeSpecified::Absolute(18.0))
        );
        assert_eq!(
            parse_font_size("150%"),
            Some(FontSizeSpecified::Percentage(Percentage(1.5)))
        );
        assert_eq!(
            parse_font_size("12px"),
            Some(FontSizeSpecified::Length(Length::px(12.0)))
        );
        assert_eq!(parse_font_size("-2px"), None);
        assert_eq!(parse_font_size("bold"), None);
    }

    #[test]
    fn wide_keywords_are_recognized() {
        assert_eq!(
            parse_specified("inherit", parse_line_height),
            Some(Specified::Inherit)
        );
        assert_eq!(
            parse_specified("1.4", parse_line_height),
            Some(Specified::Value(LineHeight::Number(1.4)))
        );
        assert_eq!(parse_specified("wide", parse_letter_spacing), None);
    }
}
