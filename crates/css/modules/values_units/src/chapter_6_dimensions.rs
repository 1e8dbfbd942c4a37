//! CSS Values & Units Level 3: §6 Dimensions (Lengths subset)
//! Spec: <https://www.w3.org/TR/css-values-3/#lengths>

use crate::ParseError;
use crate::chapter_4_numbers::format_number;
use cssparser::{Parser, Token};

/// Supported subset of CSS <length>: px, pt, em, rem, plus unitless zero.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LengthUnit {
    Pixels,
    Points,
    Ems,
    RootEms,
}

/// A CSS <length> value with unit.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Length {
    pub value: f32,
    pub unit: LengthUnit,
}

impl Length {
    /// Construct a pixel length.
    #[inline]
    pub const fn px(value: f32) -> Self {
        Self {
            value,
            unit: LengthUnit::Pixels,
        }
    }
}

/// Compute the pixel value for a given `Length`.
///
/// - Pixels: returns the raw value.
/// - Points: 1pt = 4/3 px (§6.2.1 absolute lengths).
/// - Ems/RootEms: scales by the provided font sizes.
pub fn compute_length_px(length: Length, font_size_px: f32, root_font_size_px: f32) -> f32 {
    match length.unit {
        LengthUnit::Pixels => length.value,
        LengthUnit::Points => length.value * 4.0 / 3.0,
        LengthUnit::Ems => length.value * font_size_px,
        LengthUnit::RootEms => length.value * root_font_size_px,
    }
}

/// Parse a CSS <length> (§6.2). Supports px/pt/em/rem and unitless zero per spec.
///
/// # Errors
/// Returns `ParseError::UnexpectedToken` when the next token is not a supported `<length>`.
pub fn parse_length(input: &mut Parser) -> Result<Length, ParseError> {
    match input.next_including_whitespace_and_comments() {
        Ok(token) => match token.clone() {
            Token::Dimension { value, unit, .. } => {
                let lower = unit.as_ref().to_ascii_lowercase();
                let unit_kind = match lower.as_str() {
                    "px" => LengthUnit::Pixels,
                    "pt" => LengthUnit::Points,
                    "em" => LengthUnit::Ems,
                    "rem" => LengthUnit::RootEms,
                    _ => return Err(ParseError::UnexpectedToken),
                };
                Ok(Length {
                    value,
                    unit: unit_kind,
                })
            }
            Token::Number { value: 0.0, .. } => Ok(Length::px(0.0)),
            _ => Err(ParseError::UnexpectedToken),
        },
        Err(_) => Err(ParseError::UnexpectedToken),
    }
}

/// Serialize a pixel quantity: [`format_number`] followed by `px`.
pub fn format_px(value: f64) -> String {
    let mut text = format_number(value);
    text.push_str("px");
    text
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse_value;

    #[test]
    fn parses_supported_units() {
        assert_eq!(parse_value("16px", parse_length), Ok(Length::px(16.0)));
        assert_eq!(
            parse_value("1.5em", parse_length),
            Ok(Length {
                value: 1.5,
                unit: LengthUnit::Ems
            })
        );
        assert_eq!(parse_value("0", parse_length), Ok(Length::px(0.0)));
        assert_eq!(
            parse_value("3vw", parse_length),
            Err(ParseError::UnexpectedToken)
        );
    }

    #[test]
    fn computes_relative_units() {
        let em = Length {
            value: 2.0,
            unit: LengthUnit::Ems,
        };
        let rem = Length {
            value: 2.0,
            unit: LengthUnit::RootEms,
        };
        assert!((compute_length_px(em, 10.0, 16.0) - 20.0).abs() < f32::EPSILON);
        assert!((compute_length_px(rem, 10.0, 16.0) - 32.0).abs() < f32::EPSILON);
        let points = Length {
            value: 12.0,
            unit: LengthUnit::Points,
        };
        assert!((compute_length_px(points, 10.0, 16.0) - 16.0).abs() < 1e-4);
    }

    #[test]
    fn formats_pixels_without_float_noise() {
        assert_eq!(format_px(18.0), "18px");
        assert_eq!(format_px(16.0_f64 * 1.2 + 10.0), "29.2px");
        assert_eq!(format_px(f64::from(19.2_f32)), "19.2px");
        assert_eq!(format_px(0.5), "0.5px");
        assert_eq!(format_px(-0.000_01), "0px");
        assert_eq!(format_px(-1.25), "-1.25px");
    }
}
