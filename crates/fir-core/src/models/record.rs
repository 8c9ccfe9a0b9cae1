//! The structured record extracted from a FIR form.

use serde::{Deserialize, Serialize};

/// Fields extracted from one FIR page.
///
/// Every field is a plain string; the empty string means "not found".
/// Keys serialize in declaration order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractedRecord {
    /// Registry form code (`LLLLL NNNNNN LLL`).
    pub numero_formulario: String,

    /// Issue date as `DD/MM/YYYY`.
    pub date_emissione: String,

    /// Producer fiscal code.
    pub produttore_cf: String,

    /// Destination plant fiscal code.
    pub impianto_cf: String,

    /// Transporter fiscal code.
    pub trasportatore_cf: String,

    /// Intermediary fiscal code.
    pub intermediario_cf: String,

    /// Movement number, digits only.
    pub numero_mov: String,
}

impl ExtractedRecord {
    /// Create an empty record.
    pub fn new() -> Self {
        Self::default()
    }

    /// Check if no field was extracted.
    pub fn is_empty(&self) -> bool {
        self.numero_formulario.is_empty()
            && self.date_emissione.is_empty()
            && self.fiscal_codes().iter().all(|cf| cf.is_empty())
            && self.numero_mov.is_empty()
    }

    /// The four fiscal codes in form order: producer, plant, transporter,
    /// intermediary.
    pub fn fiscal_codes(&self) -> [&str; 4] {
        [
            &self.produttore_cf,
            &self.impianto_cf,
            &self.trasportatore_cf,
            &self.intermediario_cf,
        ]
    }

    /// Set all four fiscal codes at once.
    pub fn set_fiscal_codes(&mut self, codes: [String; 4]) {
        let [produttore, impianto, trasportatore, intermediario] = codes;
        self.produttore_cf = produttore;
        self.impianto_cf = impianto;
        self.trasportatore_cf = trasportatore;
        self.intermediario_cf = intermediario;
    }

    /// Serialize as JSON with 4-space indentation.
    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        let mut buf = Vec::new();
        let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
        let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
        self.serialize(&mut ser)?;
        // serde_json only ever emits valid UTF-8
        Ok(String::from_utf8_lossy(&buf).into_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_empty_record() {
        let mut record = ExtractedRecord::new();
        assert!(record.is_empty());

        record.numero_mov = "123456".to_string();
        assert!(!record.is_empty());
    }

    #[test]
    fn test_set_fiscal_codes() {
        let mut record = ExtractedRecord::new();
        record.set_fiscal_codes([
            "01234567890".to_string(),
            "12345678901".to_string(),
            "RSSMRA85T10A562S".to_string(),
            "09876543210".to_string(),
        ]);
        assert_eq!(record.trasportatore_cf, "RSSMRA85T10A562S");
        assert_eq!(record.fiscal_codes()[3], "09876543210");
    }

    #[test]
    fn test_json_layout() {
        let record = ExtractedRecord {
            numero_formulario: "ABCDE 123456 FG".to_string(),
            date_emissione: "01/02/2023".to_string(),
            numero_mov: "123456".to_string(),
            ..Default::default()
        };

        let json = record.to_json_pretty().unwrap();
        let expected = r#"{
    "numero_formulario": "ABCDE 123456 FG",
    "date_emissione": "01/02/2023",
    "produttore_cf": "",
    "impianto_cf": "",
    "trasportatore_cf": "",
    "intermediario_cf": "",
    "numero_mov": "123456"
}"#;
        assert_eq!(json, expected);
    }

    #[test]
    fn test_json_keeps_non_ascii() {
        let record = ExtractedRecord {
            numero_formulario: "àèì".to_string(),
            ..Default::default()
        };
        assert!(record.to_json_pretty().unwrap().contains("àèì"));
    }
}
