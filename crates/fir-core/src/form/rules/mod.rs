//! Rule-based field extractors for FIR forms.

pub mod dates;
pub mod exceptions;
pub mod fiscal_code;
pub mod form_code;
pub mod movement;
pub mod patterns;
pub mod substitution;

pub use dates::{extract_issue_date, is_calendar_date, normalize_date};
pub use fiscal_code::{
    correct_fiscal_code, verify_checksum, CandidateStrategy, FiscalCodeExtraction,
    FiscalCodeExtractor, PartiesText,
};
pub use form_code::{
    correct_compact_form_code, correct_spaced_form_code, FormCodeExtractor, FormCodeStrategy,
};
pub use movement::extract_movement_number;
pub use substitution::SubstitutionTable;
