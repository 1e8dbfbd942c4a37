//! CSS Values & Units Level 3: §5 Percentages
//! Spec: <https://www.w3.org/TR/css-values-3/#percentages>

use crate::ParseError;
use cssparser::{Parser, Token};

/// A CSS <percentage>
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Percentage(pub f32); // stored as a fraction, 150% => 1.5

/// Parse a CSS <percentage> (§5.1).
///
/// # Errors
/// Returns `ParseError::UnexpectedToken` when the next token is not a `<percentage>`.
pub fn parse_percentage(input: &mut Parser) -> Result<Percentage, ParseError> {
    match input.next_including_whitespace_and_comments() {
        Ok(&Token::Percentage { unit_value, .. }) => Ok(Percentage(unit_value)),
        _ => Err(ParseError::UnexpectedToken),
    }
}

impl Percentage {
    /// Resolve against a reference length in pixels.
    #[inline]
    pub fn of(self, reference_px: f32) -> f32 {
        self.0 * reference_px
    }
}
