use serde::Serialize;

/// The currently requested adjustment. The last write wins.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OverlayState {
    /// Whole pixels added to each candidate's original font size.
    pub font_size_delta: i32,
    /// Pixels added to each candidate's original line height.
    pub line_height_delta: f64,
    /// Pixels added to each candidate's original letter spacing.
    pub letter_spacing_delta: f64,
    pub spacing_enabled: bool,
}

impl OverlayState {
    /// True when no style delta is requested and spacing is off.
    pub fn is_identity(&self, epsilon: f64) -> bool {
        !self.has_style_delta(epsilon) && !self.spacing_enabled
    }

    /// True when at least one delta is outside `epsilon` of zero.
    pub fn has_style_delta(&self, epsilon: f64) -> bool {
        self.font_size_delta != 0
            || self.line_height_delta.abs() >= epsilon
            || self.letter_spacing_delta.abs() >= epsilon
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identity_respects_epsilon_and_spacing() {
        let mut state = OverlayState {
            line_height_delta: 0.005,
            letter_spacing_delta: -0.009,
            ..OverlayState::default()
        };
        assert!(state.is_identity(0.01));
        state.spacing_enabled = true;
        assert!(!state.is_identity(0.01));
        assert!(!state.has_style_delta(0.01));
        state.spacing_enabled = false;
        state.letter_spacing_delta = 0.01;
        assert!(!state.is_identity(0.01));
    }

    #[test]
    fn font_size_delta_is_exact() {
        let state = OverlayState {
            font_size_delta: -1,
            ..OverlayState::default()
        };
        assert!(state.has_style_delta(0.01));
    }
}
