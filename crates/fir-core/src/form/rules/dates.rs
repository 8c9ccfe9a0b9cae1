//! Issue date normalization and extraction.

use chrono::NaiveDate;

use super::patterns::DATE;

/// Normalize a date string to `DD/MM/YYYY`.
///
/// `.` and `-` separators become `/`, day and month are zero-padded and a
/// two-digit year gets the `20` century. Anything that does not split into
/// exactly three parts yields an empty string. The calendar is not checked:
/// `31/02/2024` passes through as is.
pub fn normalize_date(input: &str) -> String {
    if input.is_empty() {
        return String::new();
    }

    let unified = input.replace(['.', '-'], "/");
    let parts: Vec<&str> = unified.split('/').collect();
    let [day, month, year] = parts.as_slice() else {
        return String::new();
    };

    let year = if year.chars().count() == 2 {
        format!("20{year}")
    } else {
        year.to_string()
    };

    format!("{:0>2}/{:0>2}/{}", day, month, year)
}

/// Check that a normalized `DD/MM/YYYY` string names a real calendar day.
pub fn is_calendar_date(date: &str) -> bool {
    NaiveDate::parse_from_str(date, "%d/%m/%Y").is_ok()
}

/// Extract the issue date: the first date-shaped token, normalized.
///
/// With `calendar_only`, a first match that is not a real calendar day
/// yields an empty string.
pub fn extract_issue_date(text: &str, calendar_only: bool) -> String {
    let Some(found) = DATE.find(text) else {
        return String::new();
    };

    let date = normalize_date(found.as_str());
    if calendar_only && !is_calendar_date(&date) {
        return String::new();
    }
    date
}
