//! Registry form code (numero formulario) extraction and correction.

use tracing::debug;

use super::exceptions::{FORM_CODE_W_REPLACEMENT, FORM_CODE_W_SUFFIX};
use super::patterns::{FORM_CODE_NO_SPACES, FORM_CODE_SHORT, FORM_CODE_STRICT};
use super::substitution::{DIGIT_ZONE, LETTER_ZONE};

/// Canonical length of a form code, spaces included.
pub const FORM_CODE_LEN: usize = 15;

/// Correct a spaced form code (`LLLLL NNNNNN LL[L]`).
///
/// Letter zones go through the letter table; the digit zone is kept as is.
pub fn correct_spaced_form_code(code: &str) -> String {
    let chars: Vec<char> = code.chars().collect();
    if chars.len() < 13 {
        return String::new();
    }

    let prefix: String = chars[..5].iter().collect();
    let digits: String = chars[6..12].iter().collect();
    let suffix: String = chars[13..].iter().collect();

    assemble(&LETTER_ZONE.apply(&prefix), &digits, &LETTER_ZONE.apply(&suffix))
}

/// Correct a form code read without spaces (`LLLLLXXXXXXLL`).
///
/// Returns `None` when the middle zone is not six digits after correction.
pub fn correct_compact_form_code(code: &str) -> Option<String> {
    let chars: Vec<char> = code.chars().collect();
    if chars.len() < 13 {
        return None;
    }

    let prefix: String = chars[..5].iter().collect();
    let digits = DIGIT_ZONE.apply(&chars[5..11].iter().collect::<String>());
    let suffix: String = chars[11..].iter().collect();

    if !digits.chars().all(|c| c.is_ascii_digit()) {
        debug!("Compact form code {:?} has a non-numeric middle zone", code);
        return None;
    }

    Some(assemble(
        &LETTER_ZONE.apply(&prefix),
        &digits,
        &LETTER_ZONE.apply(&suffix),
    ))
}

fn assemble(prefix: &str, digits: &str, suffix: &str) -> String {
    format!("{prefix} {digits} {suffix}")
        .chars()
        .take(FORM_CODE_LEN)
        .collect()
}

/// One way of finding the form code in a region's text.
pub trait FormCodeStrategy {
    /// Strategy name for logs and reports.
    fn name(&self) -> &'static str;

    /// Corrected form code, if this strategy finds one.
    fn find(&self, text: &str) -> Option<String>;
}

/// `LLLLL NNNNNN LL[L]` with single spaces.
pub struct SpacedFormCode;

impl FormCodeStrategy for SpacedFormCode {
    fn name(&self) -> &'static str {
        "spaced"
    }

    fn find(&self, text: &str) -> Option<String> {
        let found = FORM_CODE_STRICT.find(text)?;
        Some(correct_spaced_form_code(found.as_str()))
    }
}

/// `LLLLLXXXXXXLL` with no separators.
pub struct CompactFormCode;

impl FormCodeStrategy for CompactFormCode {
    fn name(&self) -> &'static str {
        "compact"
    }

    fn find(&self, text: &str) -> Option<String> {
        let found = FORM_CODE_NO_SPACES.find(text)?;
        correct_compact_form_code(found.as_str())
    }
}

/// `LLLLL NNNNNN W`, where the OCR engine reads the `VV` suffix as `W`.
pub struct WSuffixFormCode;

impl FormCodeStrategy for WSuffixFormCode {
    fn name(&self) -> &'static str {
        "w_suffix"
    }

    fn find(&self, text: &str) -> Option<String> {
        let found = FORM_CODE_SHORT.find(text)?.as_str();
        if !found.ends_with(FORM_CODE_W_SUFFIX) {
            debug!("Short form code {:?} has no known correction", found);
            return None;
        }

        Some(assemble(
            &LETTER_ZONE.apply(&found[..5]),
            &found[6..12],
            FORM_CODE_W_REPLACEMENT,
        ))
    }
}

/// Ordered form code strategies; the first hit wins.
pub struct FormCodeExtractor {
    strategies: Vec<Box<dyn FormCodeStrategy + Send + Sync>>,
}

impl FormCodeExtractor {
    /// Strategies for the header region.
    pub fn header() -> Self {
        Self {
            strategies: vec![Box::new(SpacedFormCode), Box::new(CompactFormCode)],
        }
    }

    /// Strategies for the footer region, used when the header had no code.
    pub fn footer() -> Self {
        Self {
            strategies: vec![
                Box::new(SpacedFormCode),
                Box::new(CompactFormCode),
                Box::new(WSuffixFormCode),
            ],
        }
    }

    /// Corrected form code and the name of the strategy that found it.
    pub fn extract(&self, text: &str) -> Option<(String, &'static str)> {
        self.strategies.iter().find_map(|strategy| {
            strategy
                .find(text)
                .filter(|code| !code.is_empty())
                .map(|code| (code, strategy.name()))
        })
    }
}
