//! Orthographic normalization for Persian text.
//!
//! Every step is idempotent, so running the normalizer over already
//! normalized text (stop words, then the whole corpus) is a no-op.

use lazy_static::lazy_static;
use regex::Regex;
use unicode_normalization::UnicodeNormalization;

const ZWNJ: char = '\u{200c}';
const KASHIDA: char = '\u{0640}';

lazy_static! {
    static ref SPACE_RUN: Regex = Regex::new(r"[\s\x{200c}]+").unwrap();
    static ref SPACE_BEFORE_PUNCT: Regex = Regex::new(r" ([.,!?؟،؛:])").unwrap();
}

#[derive(Debug, Clone)]
pub struct Normalizer {
    pub lowercase: bool,
    pub character_refinement: bool,
    pub remove_diacritics: bool,
    pub punctuation_spacing: bool,
    /// Also map ASCII digits and `%` to their Persian forms.
    pub persian_numbers: bool,
}

impl Default for Normalizer {
    fn default() -> Self {
        Self {
            lowercase: true,
            character_refinement: true,
            remove_diacritics: true,
            punctuation_spacing: true,
            persian_numbers: true,
        }
    }
}

impl Normalizer {
    pub fn normalize(&self, text: &str) -> String {
        let text = if self.lowercase {
            text.to_lowercase()
        } else {
            text.to_owned()
        };

        let text: String = text
            .nfc()
            .filter(|&c| !(self.remove_diacritics && is_diacritic(c)))
            .map(|c| self.translate(c))
            .collect();

        if !self.character_refinement {
            return text;
        }

        let text = SPACE_RUN.replace_all(&text, |caps: &regex::Captures| {
            if caps[0].chars().any(char::is_whitespace) {
                " "
            } else {
                "\u{200c}"
            }
        });
        let text = if self.punctuation_spacing {
            SPACE_BEFORE_PUNCT.replace_all(&text, "$1").into_owned()
        } else {
            text.into_owned()
        };

        text.trim_matches(|c: char| c.is_whitespace() || c == ZWNJ)
            .to_owned()
    }

    fn translate(&self, c: char) -> char {
        match c {
            'ي' | 'ى' if self.character_refinement => 'ی',
            'ك' if self.character_refinement => 'ک',
            '“' | '”' if self.character_refinement => '"',
            '\u{a0}' if self.character_refinement => ' ',
            // Arabic-Indic digits to Extended Arabic-Indic (Persian) digits.
            '٠'..='٩' => char::from_u32(c as u32 - 0x0660 + 0x06f0).unwrap_or(c),
            '0'..='9' if self.persian_numbers => {
                char::from_u32(c as u32 - '0' as u32 + 0x06f0).unwrap_or(c)
            }
            '%' if self.persian_numbers => '٪',
            _ => c,
        }
    }
}

fn is_diacritic(c: char) -> bool {
    matches!(c, '\u{064b}'..='\u{0652}') || c == KASHIDA
}
