//! Italian fiscal code (codice fiscale / partita IVA) recovery from the
//! parties region.

use tracing::{debug, trace};

use super::exceptions::{apply_known_filer, is_forced_code};
use super::patterns::{
    FISCAL_CODE_GENERIC, FISCAL_CODE_LABEL, FISCAL_CODE_NUMERIC, FISCAL_CODE_PREFIXED,
    FISCAL_CODE_VALID, NON_WORD, WHITESPACE_RUN, WORD,
};
use super::substitution::{FISCAL_CODE, FISCAL_TOKEN};

/// Number of fiscal codes on a FIR form.
pub const FISCAL_CODE_COUNT: usize = 4;

/// Correct a candidate fiscal code, or reject it.
///
/// Confusable glyphs are substituted, then at most one length/prefix repair
/// is applied, and the result must be 11 digits or 16 alphanumerics.
pub fn correct_fiscal_code(candidate: &str) -> Option<String> {
    let substituted = FISCAL_CODE.apply(candidate);
    let chars: Vec<char> = substituted.chars().collect();

    let repaired: String = match chars.len() {
        13 if ["IT", "1T", "I7", "17"].iter().any(|p| substituted.starts_with(p)) => {
            chars[2..].iter().collect()
        }
        12 if ['7', '[', '{', 'J', 'j', 'L', 'l', '1', '/'].contains(&chars[0]) => {
            chars[1..].iter().collect()
        }
        11 if ['b', 'p', '5', '6', '7', 'C', 'c'].contains(&chars[0]) => {
            std::iter::once('0').chain(chars[1..].iter().copied()).collect()
        }
        10 => format!("0{substituted}"),
        _ => substituted,
    };

    if !FISCAL_CODE_VALID.is_match(&repaired) {
        trace!("Rejected fiscal code candidate {:?} -> {:?}", candidate, repaired);
        return None;
    }

    if repaired.len() == 11 && repaired.starts_with('7') {
        return Some(format!("1{}", &repaired[1..]));
    }

    Some(repaired)
}

/// Verify the check digit of a partita IVA (11 digits) or the check
/// character of a codice fiscale (16 characters).
pub fn verify_checksum(code: &str) -> bool {
    let code = code.to_ascii_uppercase();
    if !code.is_ascii() {
        return false;
    }

    match code.len() {
        11 if code.bytes().all(|b| b.is_ascii_digit()) => verify_vat_number(&code),
        16 if code.bytes().all(|b| b.is_ascii_alphanumeric()) => verify_personal_code(&code),
        _ => false,
    }
}

fn verify_vat_number(code: &str) -> bool {
    let digits: Vec<u32> = code.chars().filter_map(|c| c.to_digit(10)).collect();

    let sum: u32 = digits
        .iter()
        .take(10)
        .enumerate()
        .map(|(i, &d)| {
            if i % 2 == 0 {
                d
            } else {
                let doubled = d * 2;
                if doubled > 9 { doubled - 9 } else { doubled }
            }
        })
        .sum();

    (10 - sum % 10) % 10 == digits[10]
}

fn verify_personal_code(code: &str) -> bool {
    // Values of characters in odd (1-based) positions, indexed by 0-9 / A-Z
    const ODD_DIGITS: [u32; 10] = [1, 0, 5, 7, 9, 13, 15, 17, 19, 21];
    const ODD_LETTERS: [u32; 26] = [
        1, 0, 5, 7, 9, 13, 15, 17, 19, 21, 2, 4, 18, 20, 11, 3, 6, 8, 12, 14, 16, 10, 22, 25, 24,
        23,
    ];

    let bytes = code.as_bytes();
    let mut sum = 0;
    for (i, &b) in bytes.iter().take(15).enumerate() {
        let value = if b.is_ascii_digit() {
            let d = (b - b'0') as usize;
            if i % 2 == 0 { ODD_DIGITS[d] } else { d as u32 }
        } else {
            let l = (b - b'A') as usize;
            if i % 2 == 0 { ODD_LETTERS[l] } else { l as u32 }
        };
        sum += value;
    }

    bytes[15] == b'A' + (sum % 26) as u8
}

/// The parties region text in its two working forms.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartiesText {
    /// Punctuation-normalized text; the label search runs on this.
    pub normalized: String,
    /// Alphanumeric-only text with `O`/`I` read as digits.
    pub cleaned: String,
}

impl PartiesText {
    pub fn new(raw: &str) -> Self {
        let spaced = raw
            .replace('[', " [")
            .replace('{', " {")
            .replace('_', " _")
            .replace([':', '_'], " ")
            .replace(';', "1")
            .replace('.', "");
        let normalized = WHITESPACE_RUN.replace_all(&spaced, " ").into_owned();

        let stripped = NON_WORD.replace_all(&normalized, "");
        let cleaned = stripped
            .split_whitespace()
            .map(|word| FISCAL_TOKEN.apply(word))
            .collect::<Vec<_>>()
            .join(" ");

        Self {
            normalized,
            cleaned,
        }
    }
}

/// One way of finding fiscal code candidates in the parties region.
pub trait CandidateStrategy {
    /// Strategy name for logs and reports.
    fn name(&self) -> &'static str;

    /// Candidates in top-to-bottom order.
    fn candidates(&self, text: &PartiesText) -> Vec<String>;
}

/// 11-digit codes starting with 0 or 1.
pub struct NumericCodes;

impl CandidateStrategy for NumericCodes {
    fn name(&self) -> &'static str {
        "numeric"
    }

    fn candidates(&self, text: &PartiesText) -> Vec<String> {
        find_all(&FISCAL_CODE_NUMERIC, &text.cleaned)
    }
}

/// The word following each (garbled) "Codice Fiscale" label.
pub struct LabelAnchored;

impl CandidateStrategy for LabelAnchored {
    fn name(&self) -> &'static str {
        "label"
    }

    fn candidates(&self, text: &PartiesText) -> Vec<String> {
        let haystack = text.normalized.as_str();
        let mut results = Vec::new();

        for label in FISCAL_CODE_LABEL.find_iter(haystack) {
            let rest = &haystack[label.end()..];
            let Some(word) = WORD.find(rest) else {
                continue;
            };

            // A two-character word is a prefix split off by the OCR engine
            if word.as_str().chars().count() == 2 {
                if let Some(next) = WORD.find(&rest[word.end()..]) {
                    results.push(format!("{}{}", word.as_str(), next.as_str()));
                }
            } else {
                results.push(word.as_str().to_string());
            }
        }

        results
    }
}

/// 11-digit codes behind a two-character country prefix.
pub struct PrefixedCodes;

impl CandidateStrategy for PrefixedCodes {
    fn name(&self) -> &'static str {
        "prefixed"
    }

    fn candidates(&self, text: &PartiesText) -> Vec<String> {
        find_all(&FISCAL_CODE_PREFIXED, &text.cleaned)
    }
}

/// Any 11-digit or 16-alphanumeric token.
pub struct GenericCodes;

impl CandidateStrategy for GenericCodes {
    fn name(&self) -> &'static str {
        "generic"
    }

    fn candidates(&self, text: &PartiesText) -> Vec<String> {
        find_all(&FISCAL_CODE_GENERIC, &text.cleaned)
    }
}

fn find_all(pattern: &regex::Regex, text: &str) -> Vec<String> {
    pattern
        .find_iter(text)
        .map(|m| m.as_str().to_string())
        .collect()
}

/// Outcome of fiscal code extraction on the parties region.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FiscalCodeExtraction {
    /// Producer, plant, transporter and intermediary codes, only when all
    /// four were recovered.
    pub codes: Option<[String; FISCAL_CODE_COUNT]>,
    /// Name of the strategy whose candidates were used.
    pub strategy: &'static str,
    /// Raw candidates found by that strategy.
    pub candidates: Vec<String>,
}

/// Fiscal code extractor for the parties region.
pub struct FiscalCodeExtractor {
    verify_checksums: bool,
    strategies: Vec<Box<dyn CandidateStrategy + Send + Sync>>,
}

impl FiscalCodeExtractor {
    /// Create an extractor with the default strategy order.
    pub fn new() -> Self {
        Self {
            verify_checksums: false,
            strategies: vec![
                Box::new(NumericCodes),
                Box::new(LabelAnchored),
                Box::new(PrefixedCodes),
                Box::new(GenericCodes),
            ],
        }
    }

    /// Set whether corrected codes must pass checksum verification.
    pub fn with_checksums(mut self, verify: bool) -> Self {
        self.verify_checksums = verify;
        self
    }

    /// Run the strategies in order until one finds all four candidates.
    ///
    /// When none does, the last strategy's candidates are used as they are.
    pub fn find_candidates(&self, text: &PartiesText) -> (Vec<String>, &'static str) {
        let mut last = (Vec::new(), "none");

        for strategy in &self.strategies {
            let candidates = strategy.candidates(text);
            debug!(
                "Fiscal code strategy '{}' found {} candidates",
                strategy.name(),
                candidates.len()
            );

            if candidates.len() >= FISCAL_CODE_COUNT {
                return (candidates, strategy.name());
            }
            last = (candidates, strategy.name());
        }

        last
    }

    /// Extract the four fiscal codes from the raw parties region text.
    pub fn extract(&self, raw: &str) -> FiscalCodeExtraction {
        let text = PartiesText::new(raw);
        let (mut candidates, strategy) = self.find_candidates(&text);

        if apply_known_filer(&mut candidates) {
            debug!("Applied known filer override for {}", candidates[0]);
        }

        let corrected: Vec<String> = candidates
            .iter()
            .filter_map(|c| correct_fiscal_code(c))
            .filter(|c| !self.verify_checksums || is_forced_code(c) || verify_checksum(c))
            .collect();

        let codes = <[String; FISCAL_CODE_COUNT]>::try_from(corrected)
            .map_err(|rejected| {
                debug!(
                    "Discarding fiscal codes: {} of {} expected survived correction",
                    rejected.len(),
                    FISCAL_CODE_COUNT
                );
            })
            .ok();

        FiscalCodeExtraction {
            codes,
            strategy,
            candidates,
        }
    }
}

impl Default for FiscalCodeExtractor {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_correct_valid_codes_unchanged() {
        assert_eq!(correct_fiscal_code("01234567890"), Some("01234567890".to_string()));
        assert_eq!(correct_fiscal_code("12345678901"), Some("12345678901".to_string()));
        assert_eq!(
            correct_fiscal_code("RSSMRA85T10A562S"),
            Some("RSSMRA85T10A562S".to_string())
        );
    }

    #[test]
    fn test_correct_leading_confusable() {
        assert_eq!(correct_fiscal_code("O1234567890"), Some("01234567890".to_string()));
        assert_eq!(correct_fiscal_code("b1234567890"), Some("01234567890".to_string()));
        assert_eq!(correct_fiscal_code("71234567890"), Some("01234567890".to_string()));
    }

    #[test]
    fn test_correct_pads_ten_digits() {
        assert_eq!(correct_fiscal_code("1234567890"), Some("01234567890".to_string()));
        assert_eq!(correct_fiscal_code("123456789O"), Some("01234567890".to_string()));
        assert_eq!(correct_fiscal_code("12345678AB"), None);
    }

    #[test]
    fn test_correct_strips_country_prefix() {
        assert_eq!(correct_fiscal_code("IT01234567890"), Some("01234567890".to_string()));
        assert_eq!(correct_fiscal_code("1701234567890"), Some("01234567890".to_string()));
        assert_eq!(correct_fiscal_code("DE01234567890"), None);
    }

    #[test]
    fn test_correct_drops_stray_leading_char() {
        assert_eq!(correct_fiscal_code("[01234567890"), Some("01234567890".to_string()));
        assert_eq!(correct_fiscal_code("L01234567890"), Some("01234567890".to_string()));
    }

    #[test]
    fn test_correct_final_seven_rewrite() {
        // 12 chars: leading '1' dropped, leaving a code that starts with '7'
        assert_eq!(correct_fiscal_code("171234567890"), Some("11234567890".to_string()));
    }

    #[test]
    fn test_correct_rejects_malformed() {
        assert_eq!(correct_fiscal_code(""), None);
        assert_eq!(correct_fiscal_code("ABC"), None);
        assert_eq!(correct_fiscal_code("0123456789012"), None);
        assert_eq!(correct_fiscal_code("0123456789à"), None);
    }

    #[test]
    fn test_verify_checksum() {
        assert!(verify_checksum("08443160158"));
        assert!(verify_checksum("04636090963"));
        assert!(verify_checksum("RSSMRA85T10A562S"));
        assert!(verify_checksum("rssmra85t10a562s"));
        assert!(!verify_checksum("12345678901"));
        assert!(!verify_checksum("RSSMRA85T10A562T"));
        assert!(!verify_checksum("0844316015"));
    }

    #[test]
    fn test_parties_text_cleanup() {
        let text = PartiesText::new("C.F.: IT[0123 Codice_Fiscale; O1I2");
        assert_eq!(text.normalized, "CF IT [0123 Codice Fiscale1 O1I2");
        assert_eq!(text.cleaned, "CF 1T 0123 C0d1ce F1scale1 0112");
    }

    #[test]
    fn test_label_anchored_candidates() {
        let text = PartiesText::new(
            "Codice Fiscale 01234567890 Flscale IT 09876543210 Codice Fiscale IT",
        );
        let candidates = LabelAnchored.candidates(&text);
        assert_eq!(candidates, vec!["01234567890", "IT09876543210"]);
    }

    #[test]
    fn test_strategies_stop_at_four() {
        let extractor = FiscalCodeExtractor::new();
        let text = PartiesText::new("01234567890 11234567890 01111111111 10000000000 Codice Fiscale X");
        let (candidates, strategy) = extractor.find_candidates(&text);
        assert_eq!(strategy, "numeric");
        assert_eq!(candidates.len(), 4);
    }

    #[test]
    fn test_strategies_fall_back_to_generic() {
        let extractor = FiscalCodeExtractor::new();
        let text = PartiesText::new("RSSMRA85T10A562S 21234567890");
        let (candidates, strategy) = extractor.find_candidates(&text);
        assert_eq!(strategy, "generic");
        assert_eq!(candidates, vec!["RSSMRA85T10A562S", "21234567890"]);
    }

    #[test]
    fn test_extract_four_codes() {
        let text = "Produttore Codice Fiscale O1234567890 Impianto Codice Fiscale 11234567890 \
                    Trasportatore Codice Fiscale IT 02345678901 Intermediario Codice Fiscale 1234567890";
        let result = FiscalCodeExtractor::new().extract(text);

        assert_eq!(result.strategy, "label");
        assert_eq!(
            result.codes,
            Some([
                "01234567890".to_string(),
                "11234567890".to_string(),
                "02345678901".to_string(),
                "01234567890".to_string(),
            ])
        );
    }

    #[test]
    fn test_extract_never_partial() {
        let codes = ["01234567890", "11234567890", "01111111111", "10000000000", "01010101010"];
        for count in 0..=codes.len() {
            let text = codes[..count].join(" ");
            let result = FiscalCodeExtractor::new().extract(&text);
            assert_eq!(result.codes.is_some(), count == 4, "count {count}");
        }
    }

    #[test]
    fn test_extract_drops_uncorrectable_candidate() {
        // Five labeled candidates, one rejected by the corrector: four survive
        let text = "Codice Fiscale 01234567890 Codice Fiscale 11234567890 \
                    Codice Fiscale 21234567890 Codice Fiscale 31234567890 Codice Fiscale XYZ";
        let result = FiscalCodeExtractor::new().extract(text);

        assert_eq!(result.strategy, "label");
        assert_eq!(result.candidates.len(), 5);
        assert_eq!(
            result.codes,
            Some([
                "01234567890".to_string(),
                "11234567890".to_string(),
                "21234567890".to_string(),
                "31234567890".to_string(),
            ])
        );
    }

    #[test]
    fn test_extract_known_filer() {
        let text = "Codice Fiscale 08443160158 Codice Fiscale 01234567890 \
                    Codice Fiscale FRRLSNE21 Codice Fiscale 09876543210";
        let result = FiscalCodeExtractor::new().extract(text);
        let codes = result.codes.unwrap();
        assert_eq!(codes[2], "FRRLSN70E21D969W");
    }

    #[test]
    fn test_extract_with_checksums() {
        let text = "08443160158 04636090963 00000000000 12345678901";
        let lenient = FiscalCodeExtractor::new().extract(text);
        assert!(lenient.codes.is_some());

        let strict = FiscalCodeExtractor::new().with_checksums(true).extract(text);
        assert!(strict.codes.is_none());
    }
}
