//! CSS Style Attributes: style="..." attribute processing.
//! Spec: <https://www.w3.org/TR/css-style-attr/>

#![forbid(unsafe_code)]

use cssparser::{Delimiter, ParseError, Parser, ParserInput};

/// A single CSS declaration parsed from a style attribute.
///
/// Spec: <https://www.w3.org/TR/css-style-attr/#interpreting>
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Declaration {
    /// Property name normalized to ASCII lowercase as per CSS case-insensitivity.
    pub property: String,
    /// Raw value slice trimmed of surrounding ASCII whitespace, without any `!important` suffix.
    pub value: String,
    /// Whether the declaration carried `!important`.
    pub important: bool,
}

/// Parse the value of a `style` attribute into a list of declarations.
///
/// This performs a minimal, resilient parse:
/// - Splits at top-level semicolons (`;`) into declaration items. Semicolons inside
///   strings, `url()` and other blocks stay part of the value.
/// - For each item, splits on the first colon (`:`) into property and value.
/// - Trims ASCII whitespace and lowercases the property name.
/// - Strips a trailing `!important` (any case, optional whitespace after `!`).
/// - Skips empty or invalid items (no colon, empty property, or empty value after trimming).
///
/// Values keep their source text.
///
/// Spec: <https://www.w3.org/TR/css-style-attr/#interpreting>
pub fn parse_style_attribute(input: &str) -> Vec<Declaration> {
    if input.is_empty() {
        return Vec::new();
    }
    let mut out: Vec<Declaration> = Vec::new();
    for raw_item in split_declarations(input) {
        let item = raw_item.trim_matches(is_ascii_whitespace);
        if item.is_empty() {
            continue;
        }
        let Some((raw_prop, raw_value)) = item.split_once(':') else {
            continue;
        };
        let property_text = raw_prop.trim_matches(is_ascii_whitespace);
        let (value_text, important) = split_importance(raw_value);
        if property_text.is_empty() || value_text.is_empty() {
            continue;
        }
        out.push(Declaration {
            property: to_ascii_lowercase(property_text),
            value: value_text.to_owned(),
            important,
        });
    }
    out
}

/// Source slices of the top-level `;`-separated items, without the separators.
fn split_declarations(input: &str) -> Vec<&str> {
    let mut parser_input = ParserInput::new(input);
    let mut parser = Parser::new(&mut parser_input);
    let mut items = Vec::new();
    while !parser.is_exhausted() {
        let start = parser.position();
        let consumed: Result<(), ParseError<'_, ()>> =
            parser.parse_until_after(Delimiter::Semicolon, |nested| {
                while nested.next_including_whitespace_and_comments().is_ok() {}
                Ok(())
            });
        if consumed.is_err() {
            break;
        }
        let item = parser.slice_from(start);
        items.push(item.strip_suffix(';').unwrap_or(item));
    }
    items
}

/// Separate a raw value from a trailing `!important` annotation.
///
/// Spec: <https://www.w3.org/TR/css-syntax-3/#consume-declaration>
fn split_importance(raw_value: &str) -> (&str, bool) {
    let value = raw_value.trim_matches(is_ascii_whitespace);
    if let Some(bang) = value.rfind('!') {
        let annotation = value[bang + 1..].trim_matches(is_ascii_whitespace);
        if annotation.eq_ignore_ascii_case("important") {
            return (value[..bang].trim_matches(is_ascii_whitespace), true);
        }
    }
    (value, false)
}

/// ASCII whitespace per CSS Syntax (TAB, LF, FF, CR, SPACE).
///
/// Spec: <https://www.w3.org/TR/css-syntax-3/#whitespace>
const fn is_ascii_whitespace(character: char) -> bool {
    matches!(
        character,
        '\u{0009}' | '\u{000A}' | '\u{000C}' | '\u{000D}' | '\u{0020}'
    )
}

/// Lowercase an ASCII identifier without allocating twice when already lowercase.
fn to_ascii_lowercase(text: &str) -> String {
    if !text.chars().any(|character| character.is_ascii_uppercase()) {
        return text.to_owned();
    }
    text.to_ascii_lowercase()
}

/// An editable inline declaration block, the `element.style` view of a `style` attribute.
///
/// Keeps the last occurrence of each property in source order. Setting an existing
/// property replaces it in place, so re-applying identical values serializes to
/// identical text.
///
/// Spec: <https://drafts.csswg.org/cssom/#the-cssstyledeclaration-interface>
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StyleDeclarationBlock {
    declarations: Vec<Declaration>,
}

impl StyleDeclarationBlock {
    /// Parse a `style` attribute value into a block, collapsing duplicate properties.
    pub fn parse(input: &str) -> Self {
        let mut block = Self::default();
        for decl in parse_style_attribute(input) {
            block.set_property(&decl.property, &decl.value, decl.important);
        }
        block
    }

    /// Iterate the declarations in serialization order.
    pub fn iter(&self) -> impl Iterator<Item = &Declaration> {
        self.declarations.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.declarations.is_empty()
    }

    pub fn len(&self) -> usize {
        self.declarations.len()
    }

    /// Look up the declaration for a property (case-insensitive).
    pub fn get(&self, property: &str) -> Option<&Declaration> {
        self.declarations
            .iter()
            .find(|decl| decl.property.eq_ignore_ascii_case(property))
    }

    /// `CSSStyleDeclaration.getPropertyValue`.
    pub fn property_value(&self, property: &str) -> Option<&str> {
        self.get(property).map(|decl| decl.value.as_str())
    }

    /// `CSSStyleDeclaration.setProperty(property, value, priority)`.
    ///
    /// An existing declaration keeps its position; a new one is appended.
    pub fn set_property(&mut self, property: &str, value: &str, important: bool) {
        let property = to_ascii_lowercase(property.trim_matches(is_ascii_whitespace));
        let value = value.trim_matches(is_ascii_whitespace).to_owned();
        if property.is_empty() || value.is_empty() {
            return;
        }
        if let Some(existing) = self
            .declarations
            .iter_mut()
            .find(|decl| decl.property == property)
        {
            existing.value = value;
            existing.important = important;
        } else {
            self.declarations.push(Declaration {
                property,
                value,
                important,
            });
        }
    }

    /// `CSSStyleDeclaration.removeProperty`, returning the removed declaration.
    pub fn remove_property(&mut self, property: &str) -> Option<Declaration> {
        let index = self
            .declarations
            .iter()
            .position(|decl| decl.property.eq_ignore_ascii_case(property))?;
        Some(self.declarations.remove(index))
    }

    /// Serialize as `cssText`: `prop: value;` items joined by a single space,
    /// with ` !important` before the semicolon where set.
    ///
    /// Spec: <https://drafts.csswg.org/cssom/#serialize-a-css-declaration-block>
    pub fn to_css_text(&self) -> String {
        let mut out = String::new();
        for decl in &self.declarations {
            if !out.is_empty() {
                out.push(' ');
            }
            out.push_str(&decl.property);
            out.push_str(": ");
            out.push_str(&decl.value);
            if decl.important {
                out.push_str(" !important");
            }
            out.push(';');
        }
        out
    }
}
