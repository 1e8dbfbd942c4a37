use css_values_units::{format_number, format_px};

/// Computed `line-height`.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum ComputedLineHeight {
    #[default]
    Normal,
    /// Unitless multiplier; inherits as a number and resolves against each element's font size.
    Number(f32),
    Px(f32),
}

/// Computed `letter-spacing`.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum ComputedLetterSpacing {
    #[default]
    Normal,
    Px(f32),
}

/// The text metrics the overlay reads and adjusts.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ComputedStyle {
    pub font_size: f32, // px
    pub line_height: ComputedLineHeight,
    pub letter_spacing: ComputedLetterSpacing,
}

impl Default for ComputedStyle {
    fn default() -> Self {
        Self {
            font_size: 16.0,
            line_height: ComputedLineHeight::Normal,
            letter_spacing: ComputedLetterSpacing::Normal,
        }
    }
}

impl ComputedStyle {
    /// Serialize one property the way `getComputedStyle(el).getPropertyValue(..)` reports it.
    pub fn css_value(&self, property: &str) -> Option<String> {
        match property {
            "font-size" => Some(format_px(f64::from(self.font_size))),
            "line-height" => Some(match self.line_height {
                ComputedLineHeight::Normal => "normal".to_owned(),
                ComputedLineHeight::Number(number) => format_number(f64::from(number)),
                ComputedLineHeight::Px(px) => format_px(f64::from(px)),
            }),
            "letter-spacing" => Some(match self.letter_spacing {
                ComputedLetterSpacing::Normal => "normal".to_owned(),
                ComputedLetterSpacing::Px(px) => format_px(f64::from(px)),
            }),
            _ => None,
        }
    }
}
