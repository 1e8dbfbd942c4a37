//! CSS Values and Units Module Level 3: the subset needed to read and write text metrics.
//! Spec: <https://www.w3.org/TR/css-values-3/>

#![forbid(unsafe_code)]

use cssparser::{Parser, ParserInput};

// Per-chapter modules mirroring the spec table of contents.
// Each module documents functions with references to the exact spec section.
pub mod chapter_3_identifiers;
pub mod chapter_4_numbers;
pub mod chapter_5_percentages;
pub mod chapter_6_dimensions;
pub mod typography;

// Re-exports for ergonomic access from other crates.
pub use chapter_3_identifiers::{Ident, parse_ident};
pub use chapter_4_numbers::{Number, format_number, parse_number};
pub use chapter_5_percentages::{Percentage, parse_percentage};
pub use chapter_6_dimensions::{Length, LengthUnit, compute_length_px, format_px, parse_length};
pub use typography::{LetterSpacing, LineHeight, parse_letter_spacing, parse_line_height};

/// Parse error for Values & Units parsing utilities in this crate.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ParseError {
    /// The next token did not match the expected grammar.
    UnexpectedToken,
    /// A value parsed, but trailing tokens remained.
    TrailingInput,
}

/// Run `parse` over a complete string value, trimming surrounding whitespace and
/// rejecting any trailing tokens.
///
/// # Errors
/// Returns the parser's error, or `ParseError::TrailingInput` when tokens remain.
pub fn parse_value<T, F>(text: &str, parse: F) -> Result<T, ParseError>
where
    F: FnOnce(&mut Parser) -> Result<T, ParseError>,
{
    let mut input = ParserInput::new(text.trim());
    let mut parser = Parser::new(&mut input);
    let value = parse(&mut parser)?;
    if parser.is_exhausted() {
        Ok(value)
    } else {
        Err(ParseError::TrailingInput)
    }
}
