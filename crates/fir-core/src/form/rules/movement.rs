//! Movement number (numero movimento) extraction.

use super::patterns::MOVEMENT_NUMBER;

/// Extract the movement number as digits only, or an empty string.
pub fn extract_movement_number(text: &str) -> String {
    let Some(caps) = MOVEMENT_NUMBER.captures(text) else {
        return String::new();
    };

    caps.iter()
        .skip(1)
        .flatten()
        .map(|m| m.as_str())
        .find(|value| !value.is_empty())
        .map(|value| value.replace(['.', ':', ';'], ""))
        .unwrap_or_default()
}
