//! CSS Values & Units Level 3: §4 Numbers
//! Spec: <https://www.w3.org/TR/css-values-3/#numeric-types>

use crate::ParseError;
use cssparser::{Parser, Token};

/// A CSS <number>
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Number(pub f32);

/// Parse a CSS <number> (§4.2). Accepts signed integer or real numbers, e.g. a unitless
/// `line-height` multiplier.
///
/// # Errors
/// Returns `ParseError::UnexpectedToken` when the next token is not a `<number>`.
pub fn parse_number(input: &mut Parser) -> Result<Number, ParseError> {
    let Ok(&Token::Number { value, .. }) = input.next_including_whitespace_and_comments() else {
        return Err(ParseError::UnexpectedToken);
    };
    Ok(Number(value))
}

/// Serialize a number the way the overlay writes values back: at most four
/// fractional digits, trailing zeros trimmed, `-0` folded to `0`.
///
/// `16.0 * 1.2 + 10.0` prints as `29.2` rather than exposing binary rounding noise.
pub fn format_number(value: f64) -> String {
    let rounded = (value * 10_000.0).round() / 10_000.0;
    let normalized = if rounded == 0.0 { 0.0 } else { rounded };
    let mut text = format!("{normalized:.4}");
    if text.contains('.') {
        let trimmed_len = text.trim_end_matches('0').trim_end_matches('.').len();
        text.truncate(trimmed_len);
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse_value;

    #[test]
    fn signed_reals_parse() {
        assert_eq!(parse_value("1.5", parse_number), Ok(Number(1.5)));
        assert_eq!(parse_value("-2", parse_number), Ok(Number(-2.0)));
    }

    #[test]
    fn formats_without_float_noise() {
        assert_eq!(format_number(18.0), "18");
        assert_eq!(format_number(16.0_f64 * 1.2 + 10.0), "29.2");
        assert_eq!(format_number(1.5), "1.5");
        assert_eq!(format_number(-0.000_01), "0");
        assert_eq!(format_number(100.0), "100");
    }

    #[test]
    fn dimensions_are_not_numbers() {
        assert_eq!(
            parse_value("2px", parse_number),
            Err(ParseError::UnexpectedToken)
        );
    }
}
