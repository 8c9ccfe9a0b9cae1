//! Common regex patterns for FIR field extraction.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    // Registry form code (numero formulario)
    pub static ref FORM_CODE_STRICT: Regex = Regex::new(
        r"\b[A-Z]{5} [0-9]{6} [A-Z]{2,3}\b"
    ).unwrap();

    pub static ref FORM_CODE_SHORT: Regex = Regex::new(
        r"\b[A-Z]{5} [0-9]{6} [A-Z]\b"
    ).unwrap();

    pub static ref FORM_CODE_NO_SPACES: Regex = Regex::new(
        r"\b[A-Z]{5}[A-Za-z0-9]{6}[A-Z]{2}\b"
    ).unwrap();

    // Issue date: DD-MM-YYYY or DD-MM-YY with any of - . / as separators
    pub static ref DATE: Regex = Regex::new(
        r"\b[0-9]{2}[-/.][0-9]{2}[-/.][0-9]{4}\b|\b[0-9]{2}[-/.][0-9]{2}[-/.][0-9]{2}\b"
    ).unwrap();

    // Fiscal codes
    pub static ref FISCAL_CODE_NUMERIC: Regex = Regex::new(
        r"\b[01][0-9]{10}\b"
    ).unwrap();

    pub static ref FISCAL_CODE_GENERIC: Regex = Regex::new(
        r"\b[0-9]{11}\b|\b[A-Za-z0-9]{16}\b"
    ).unwrap();

    pub static ref FISCAL_CODE_PREFIXED: Regex = Regex::new(
        r"\b[A-Za-z0-9]{2}[0-9]{11}\b"
    ).unwrap();

    pub static ref FISCAL_CODE_VALID: Regex = Regex::new(
        r"^(?:[0-9]{11}|[A-Za-z0-9]{16})$"
    ).unwrap();

    // OCR readings of the "Codice Fiscale" label, most specific first
    pub static ref FISCAL_CODE_LABEL: Regex = Regex::new(concat!(
        r"(?i)(?:",
        r"Codice Fiscalej|Cocice Fiscelel|C0d1ce F1scalej|Flscalej|F1scalej|Fiscalej|",
        r"Codica Flscalo|Codke Fiscale|Corlice Flscalo|Cadlicc Flscale|Cojico Fiscnlo|",
        r"Corir Fi|CoceFicale|Cocice Fiscale|Cocico Fiscale|Ccdice Fiscale|codice fiscale|",
        r"cocice Fiscale|Codice Fiscale|Flscole|Fiscala|Fiscalc|Fiscolo|Flscate|Fiscalo|",
        r"Fiscele|Fiscnlo|Ficcalu|físcale|Fiscale|flscale|Flscale|Fiscaye|Fiscelel|",
        r"fisca1e|fiscaié|físcaié|fiscaie|fiscaíe|fiscá1e|f1scale|f1scaie|f8scale|",
        r"fiseale|fisoale|fiscále|fiscäle|fiscâle|fiscãle|fiscalé|fiscalè|fiscalê|",
        r"fi5cale|fisçale|fizcale|fiscalee|ficale|fiscai|ficsale|fisacle|fiscvale|fiscnale",
        r")"
    )).unwrap();

    pub static ref WORD: Regex = Regex::new(r"\b\w+\b").unwrap();

    // Movement number: "Mov. nr" then ".", nothing, ":" or ";"
    pub static ref MOVEMENT_NUMBER: Regex = Regex::new(concat!(
        r"Mov\. nr\.\s([0-9]{3}\.[0-9]{3})|",
        r"Mov\. nr\s([0-9]{3}\.[0-9]{3})|",
        r"Mov\. nr:\s([0-9]{3}\.[0-9]{3})|",
        r"Mov\. nr;\s([0-9]{3}\.[0-9]{3})"
    )).unwrap();

    // Parties region cleanup
    pub static ref WHITESPACE_RUN: Regex = Regex::new(r"\s+").unwrap();

    pub static ref NON_WORD: Regex = Regex::new(r"[^\w\s]").unwrap();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_form_code_patterns() {
        assert!(FORM_CODE_STRICT.is_match("n. ABCDE 123456 FG del"));
        assert!(FORM_CODE_STRICT.is_match("ABCDE 123456 FGH"));
        assert!(!FORM_CODE_STRICT.is_match("ABCDE 123456 F"));
        assert!(FORM_CODE_SHORT.is_match("ABCDE 123456 W"));
        assert!(FORM_CODE_NO_SPACES.is_match("ABCDE12O456FG"));
        assert!(!FORM_CODE_NO_SPACES.is_match("ABCDE 123456 FG"));
    }

    #[test]
    fn test_date_pattern() {
        assert_eq!(DATE.find("del 01-02-2023 ore").unwrap().as_str(), "01-02-2023");
        assert_eq!(DATE.find("01.02.23").unwrap().as_str(), "01.02.23");
        assert!(!DATE.is_match("1/2/2023"));
    }

    #[test]
    fn test_fiscal_code_patterns() {
        assert!(FISCAL_CODE_NUMERIC.is_match("01234567890"));
        assert!(!FISCAL_CODE_NUMERIC.is_match("21234567890"));
        assert!(FISCAL_CODE_GENERIC.is_match("RSSMRA85T10A562S"));
        assert!(FISCAL_CODE_PREFIXED.is_match("IT01234567890"));
        assert!(FISCAL_CODE_VALID.is_match("21234567890"));
        assert!(!FISCAL_CODE_VALID.is_match("2123456789"));
    }

    #[test]
    fn test_label_pattern_garbled() {
        for label in ["Codice Fiscale", "CODICE FISCALE", "Cocice Fiscelel", "fiscaié", "Flscale"] {
            assert!(FISCAL_CODE_LABEL.is_match(label), "{label}");
        }
        assert!(!FISCAL_CODE_LABEL.is_match("Partita IVA"));
    }

    #[test]
    fn test_label_prefers_full_label() {
        let m = FISCAL_CODE_LABEL.find("Codice Fiscale 01234567890").unwrap();
        assert_eq!(m.as_str(), "Codice Fiscale");
    }

    #[test]
    fn test_movement_pattern() {
        for text in ["Mov. nr. 123.456", "Mov. nr 123.456", "Mov. nr: 123.456", "Mov. nr; 123.456"] {
            assert!(MOVEMENT_NUMBER.is_match(text), "{text}");
        }
        assert!(!MOVEMENT_NUMBER.is_match("Mov nr 123.456"));
    }
}
