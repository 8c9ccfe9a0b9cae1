//! Hard-coded corrections for specific filers and OCR failure modes.
//!
//! These are lookups for observed real-world documents, not general rules.
//! Extend or remove entries here without touching the extraction logic.

/// A filer whose transporter slot is known to be misread.
#[derive(Debug, Clone, Copy)]
pub struct KnownFiler {
    /// Producer VAT number identifying the filer.
    pub producer_vat: &'static str,
    /// Code forced into the transporter slot.
    pub transporter_code: &'static str,
}

/// Filers with a forced transporter fiscal code.
pub const KNOWN_FILERS: &[KnownFiler] = &[
    KnownFiler {
        producer_vat: "08443160158",
        transporter_code: "FRRLSN70E21D969W",
    },
    KnownFiler {
        producer_vat: "04636090963",
        transporter_code: "FRRLSN70E21D969W",
    },
];

/// Final letter of a 14-character form code that is rewritten to `VV`.
pub const FORM_CODE_W_SUFFIX: char = 'W';

/// Replacement suffix for [`FORM_CODE_W_SUFFIX`].
pub const FORM_CODE_W_REPLACEMENT: &str = "VV";

/// Apply the known-filer override to raw fiscal code candidates.
///
/// Only fires on exactly four candidates whose first is a known producer
/// and whose third is not 11 characters long. Returns whether the
/// candidates were changed.
pub fn apply_known_filer(candidates: &mut [String]) -> bool {
    if candidates.len() != 4 {
        return false;
    }

    let Some(filer) = KNOWN_FILERS
        .iter()
        .find(|f| f.producer_vat == candidates[0])
    else {
        return false;
    };

    if candidates[2].chars().count() == 11 {
        return false;
    }

    candidates[2] = filer.transporter_code.to_string();
    true
}

/// Whether `code` is a value forced by the exception table.
pub fn is_forced_code(code: &str) -> bool {
    KNOWN_FILERS.iter().any(|f| f.transporter_code == code)
}
