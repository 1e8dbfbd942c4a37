//! CSS Identifiers: keyword values such as `normal` in `line-height` and `letter-spacing`.
//! Spec: <https://www.w3.org/TR/CSS2/syndata.html#value-def-identifier>

use crate::ParseError;
use cssparser::{Parser, Token};

/// A CSS identifier value, lowercased because keywords are ASCII case-insensitive.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Ident(pub String);

/// Parse a CSS identifier token.
///
/// Whitespace is not skipped; callers pass trimmed input through [`crate::parse_value`].
///
/// # Errors
/// Returns `ParseError::UnexpectedToken` when the next token is not an identifier.
#[inline]
pub fn parse_ident(input: &mut Parser) -> Result<Ident, ParseError> {
    match input.next_including_whitespace_and_comments() {
        Ok(Token::Ident(text)) => Ok(Ident(text.to_ascii_lowercase())),
        _ => Err(ParseError::UnexpectedToken),
    }
}

impl Ident {
    /// Whether this identifier is the given keyword (already lowercase).
    #[inline]
    pub fn is(&self, keyword: &str) -> bool {
        self.0 == keyword
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse_value;

    #[test]
    fn keywords_are_lowercased() {
        let ident = parse_value("NoRmal", parse_ident);
        assert_eq!(ident, Ok(Ident("normal".to_owned())));
        assert!(ident.is_ok_and(|value| value.is("normal")));
    }

    #[test]
    fn numbers_are_not_identifiers() {
        assert_eq!(
            parse_value("12", parse_ident),
            Err(ParseError::UnexpectedToken)
        );
    }
}
