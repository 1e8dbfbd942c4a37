//! Typed values for `line-height` and `letter-spacing`.
//! Spec: <https://www.w3.org/TR/css-inline-3/#line-height-property>,
//! <https://www.w3.org/TR/css-text-3/#letter-spacing-property>

use crate::chapter_3_identifiers::parse_ident;
use crate::chapter_4_numbers::parse_number;
use crate::chapter_5_percentages::{Percentage, parse_percentage};
use crate::chapter_6_dimensions::{Length, parse_length};
use crate::ParseError;
use cssparser::Parser;

/// `line-height: normal | <number> | <length> | <percentage>`
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum LineHeight {
    Normal,
    /// Unitless multiplier of the element's own font size.
    Number(f32),
    Length(Length),
    Percentage(Percentage),
}

/// `letter-spacing: normal | <length>`
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum LetterSpacing {
    Normal,
    Length(Length),
}

/// Parse the keyword `normal`.
fn parse_normal(input: &mut Parser) -> Result<(), ParseError> {
    let ident = parse_ident(input)?;
    if ident.is("normal") {
        Ok(())
    } else {
        Err(ParseError::UnexpectedToken)
    }
}

/// Parse a `line-height` value.
///
/// # Errors
/// Returns `ParseError::UnexpectedToken` when none of the alternatives match.
pub fn parse_line_height(input: &mut Parser) -> Result<LineHeight, ParseError> {
    if input.try_parse(parse_normal).is_ok() {
        return Ok(LineHeight::Normal);
    }
    if let Ok(number) = input.try_parse(parse_number) {
        return Ok(LineHeight::Number(number.0));
    }
    if let Ok(percentage) = input.try_parse(parse_percentage) {
        return Ok(LineHeight::Percentage(percentage));
    }
    parse_length(input).map(LineHeight::Length)
}

/// Parse a `letter-spacing` value.
///
/// # Errors
/// Returns `ParseError::UnexpectedToken` when the value is neither `normal` nor a `<length>`.
pub fn parse_letter_spacing(input: &mut Parser) -> Result<LetterSpacing, ParseError> {
    if input.try_parse(parse_normal).is_ok() {
        return Ok(LetterSpacing::Normal);
    }
    parse_length(input).map(LetterSpacing::Length)
}
