//! User-agent defaults for the text metric properties.
//!
//! Only the declarations that move `font-size`, `line-height` or `letter-spacing`
//! away from their initial values are listed. Values follow the HTML rendering
//! section's suggested stylesheet.

/// Initial `font-size` (`medium`) in px.
pub const MEDIUM_FONT_SIZE: f32 = 16.0;

/// UA declarations for a lowercase tag name, as (property, value) pairs.
pub fn ua_declarations(tag: &str) -> &'static [(&'static str, &'static str)] {
    match tag {
        "h1" => &[("font-size", "2em")],
        "h2" => &[("font-size", "1.5em")],
        "h3" => &[("font-size", "1.17em")],
        "h5" => &[("font-size", "0.83em")],
        "h6" => &[("font-size", "0.67em")],
        "small" | "sub" | "sup" => &[("font-size", "smaller")],
        // Monospace text renders at 13px under the default font settings.
        "code" | "pre" | "kbd" | "samp" | "tt" => &[("font-size", "13px")],
        _ => &[],
    }
}
