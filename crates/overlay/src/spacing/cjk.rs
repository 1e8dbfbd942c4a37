//! Built-in segmenter: a space between CJK characters and ASCII letters or digits.

use super::Segmenter;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum CharClass {
    Cjk,
    AsciiAlphanumeric,
    Other,
}

impl CharClass {
    /// Classify a character by Unicode block.
    fn detect(character: char) -> Self {
        if character.is_ascii_alphanumeric() {
            return Self::AsciiAlphanumeric;
        }
        let code = character as u32;

        // Han: unified ideographs, extension A, compatibility ideographs, extension B
        if (0x4E00..=0x9FFF).contains(&code)
            || (0x3400..=0x4DBF).contains(&code)
            || (0xF900..=0xFAFF).contains(&code)
            || (0x2_0000..=0x2_A6DF).contains(&code)
        {
            return Self::Cjk;
        }

        // Hiragana and Katakana, including phonetic extensions
        if (0x3040..=0x30FF).contains(&code) || (0x31F0..=0x31FF).contains(&code) {
            return Self::Cjk;
        }

        // Hangul syllables, Jamo and compatibility Jamo
        if (0xAC00..=0xD7AF).contains(&code)
            || (0x1100..=0x11FF).contains(&code)
            || (0x3130..=0x318F).contains(&code)
        {
            return Self::Cjk;
        }

        // Bopomofo and its extension
        if (0x3100..=0x312F).contains(&code) || (0x31A0..=0x31BF).contains(&code) {
            return Self::Cjk;
        }

        Self::Other
    }
}

/// Inserts one space at each boundary between a CJK character and an ASCII letter or
/// digit, in either direction. Existing whitespace or punctuation at a boundary is left
/// as is, so the pass is idempotent.
#[derive(Clone, Copy, Debug, Default)]
pub struct CjkSpacer;

impl Segmenter for CjkSpacer {
    fn segment(&self, text: &str) -> String {
        let mut out = String::with_capacity(text.len() + text.len() / 4);
        let mut previous = CharClass::Other;
        for character in text.chars() {
            let class = CharClass::detect(character);
            let boundary = matches!(
                (previous, class),
                (CharClass::Cjk, CharClass::AsciiAlphanumeric)
                    | (CharClass::AsciiAlphanumeric, CharClass::Cjk)
            );
            if boundary {
                out.push(' ');
            }
            out.push(character);
            previous = class;
        }
        out
    }
}
