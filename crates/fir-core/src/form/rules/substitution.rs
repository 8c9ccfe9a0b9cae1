//! Character substitution tables for commonly confused OCR glyphs.
//!
//! Letter-only zones, digit zones and fiscal codes see different confusions,
//! so each zone gets its own table.

use tracing::trace;

/// A named, ordered set of single-character replacements.
#[derive(Debug, Clone, Copy)]
pub struct SubstitutionTable {
    name: &'static str,
    pairs: &'static [(char, char)],
}

impl SubstitutionTable {
    pub const fn new(name: &'static str, pairs: &'static [(char, char)]) -> Self {
        Self { name, pairs }
    }

    /// Replacement for a single character, if the table has one.
    pub fn lookup(&self, c: char) -> Option<char> {
        self.pairs
            .iter()
            .find(|(from, _)| *from == c)
            .map(|(_, to)| *to)
    }

    /// Apply the table to every character of `text`.
    pub fn apply(&self, text: &str) -> String {
        let replaced: String = text.chars().map(|c| self.lookup(c).unwrap_or(c)).collect();
        if replaced != text {
            trace!("{}: {:?} -> {:?}", self.name, text, replaced);
        }
        replaced
    }
}

/// Letter segments of the registry form code.
pub const LETTER_ZONE: SubstitutionTable =
    SubstitutionTable::new("letter_zone", &[('O', 'Q'), ('I', 'T'), ('E', 'F'), ('U', 'V')]);

/// Digit segment of the registry form code when read without spaces.
pub const DIGIT_ZONE: SubstitutionTable =
    SubstitutionTable::new("digit_zone", &[('o', '0'), ('O', '0'), ('i', '1'), ('I', '1')]);

/// Word-level pass over the cleaned parties region text.
pub const FISCAL_TOKEN: SubstitutionTable =
    SubstitutionTable::new("fiscal_token", &[('O', '0'), ('o', '0'), ('I', '1'), ('i', '1')]);

/// Fiscal code candidates before length/prefix repair.
pub const FISCAL_CODE: SubstitutionTable = SubstitutionTable::new(
    "fiscal_code",
    &[
        ('O', '0'),
        ('o', '0'),
        ('I', '1'),
        ('i', '1'),
        (';', '1'),
        ('C', '0'),
        ('c', '0'),
    ],
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_letter_zone() {
        assert_eq!(LETTER_ZONE.apply("OIEUA"), "QTFVA");
        assert_eq!(LETTER_ZONE.apply("oieu"), "oieu");
    }

    #[test]
    fn test_digit_zone() {
        assert_eq!(DIGIT_ZONE.apply("o1O2i3I4"), "01021314");
    }

    #[test]
    fn test_fiscal_code_table() {
        assert_eq!(FISCAL_CODE.apply("O;Ic"), "0110");
        assert_eq!(FISCAL_CODE.apply("RSSMRA85T10A562S"), "RSSMRA85T10A562S");
    }

    #[test]
    fn test_tables_are_independent() {
        assert_eq!(LETTER_ZONE.lookup('O'), Some('Q'));
        assert_eq!(DIGIT_ZONE.lookup('O'), Some('0'));
        assert_eq!(FISCAL_TOKEN.lookup('C'), None);
        assert_eq!(FISCAL_CODE.lookup('C'), Some('0'));
    }
}
