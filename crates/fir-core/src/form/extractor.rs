//! Region-by-region field extraction for FIR forms.

use std::time::Instant;

use tracing::{debug, info};

use crate::layout::Region;
use crate::models::config::ExtractionConfig;
use crate::models::record::ExtractedRecord;

use super::rules::{
    extract_issue_date, extract_movement_number, FiscalCodeExtractor, FormCodeExtractor,
};

/// OCR text of each region, fragments joined with single spaces.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegionTexts {
    pub header: String,
    pub parties: String,
    pub footer: String,
}

impl RegionTexts {
    /// Text of one region.
    pub fn get(&self, region: Region) -> &str {
        match region {
            Region::Header => &self.header,
            Region::Parties => &self.parties,
            Region::Footer => &self.footer,
        }
    }

    /// Replace the text of one region.
    pub fn set(&mut self, region: Region, text: String) {
        match region {
            Region::Header => self.header = text,
            Region::Parties => self.parties = text,
            Region::Footer => self.footer = text,
        }
    }
}

/// Result of extracting one page.
#[derive(Debug, Clone)]
pub struct ExtractionReport {
    /// Extracted fields.
    pub record: ExtractedRecord,
    /// Region texts the record was extracted from.
    pub texts: RegionTexts,
    /// Region and strategy that produced the form code.
    pub form_code_source: Option<(Region, &'static str)>,
    /// Strategy whose fiscal code candidates were used.
    pub fiscal_strategy: &'static str,
    /// Number of raw fiscal code candidates that strategy found.
    pub fiscal_candidates: usize,
    /// Processing time in milliseconds.
    pub processing_time_ms: u64,
}

/// Field extractor for the three regions of a FIR form.
pub struct FormExtractor {
    header_codes: FormCodeExtractor,
    footer_codes: FormCodeExtractor,
    fiscal_codes: FiscalCodeExtractor,
    calendar_dates: bool,
}

impl FormExtractor {
    /// Create an extractor with default settings.
    pub fn new() -> Self {
        Self {
            header_codes: FormCodeExtractor::header(),
            footer_codes: FormCodeExtractor::footer(),
            fiscal_codes: FiscalCodeExtractor::new(),
            calendar_dates: false,
        }
    }

    /// Create an extractor from configuration.
    pub fn from_config(config: &ExtractionConfig) -> Self {
        Self::new()
            .with_calendar_dates(config.calendar_dates)
            .with_checksums(config.verify_checksums)
    }

    /// Set whether issue dates must be real calendar days.
    pub fn with_calendar_dates(mut self, enabled: bool) -> Self {
        self.calendar_dates = enabled;
        self
    }

    /// Set fiscal code checksum verification.
    pub fn with_checksums(mut self, enabled: bool) -> Self {
        self.fiscal_codes = self.fiscal_codes.with_checksums(enabled);
        self
    }

    /// Header region: form code and issue date.
    ///
    /// Returns the name of the strategy that found the form code.
    pub fn extract_header(&self, text: &str, record: &mut ExtractedRecord) -> Option<&'static str> {
        let found = self.header_codes.extract(text);
        let strategy = found.as_ref().map(|(_, name)| *name);
        record.numero_formulario = found.map(|(code, _)| code).unwrap_or_default();
        record.date_emissione = extract_issue_date(text, self.calendar_dates);
        strategy
    }

    /// Parties region: all four fiscal codes, or none.
    pub fn extract_parties(&self, text: &str, record: &mut ExtractedRecord) -> (&'static str, usize) {
        let extraction = self.fiscal_codes.extract(text);
        match extraction.codes {
            Some(codes) => record.set_fiscal_codes(codes),
            None => record.set_fiscal_codes(Default::default()),
        }
        (extraction.strategy, extraction.candidates.len())
    }

    /// Footer region: movement number, plus the form code when the header
    /// did not yield one.
    pub fn extract_footer(&self, text: &str, record: &mut ExtractedRecord) -> Option<&'static str> {
        record.numero_mov = extract_movement_number(text);

        if !record.numero_formulario.is_empty() {
            return None;
        }

        let (code, strategy) = self.footer_codes.extract(text)?;
        record.numero_formulario = code;
        Some(strategy)
    }

    /// Extract a full record from the three region texts.
    pub fn extract(&self, texts: &RegionTexts) -> ExtractionReport {
        let start = Instant::now();
        let mut record = ExtractedRecord::new();

        for region in Region::ALL {
            debug!("Region '{}' text: {:?}", region.name(), texts.get(region));
        }

        let mut form_code_source = self
            .extract_header(&texts.header, &mut record)
            .map(|strategy| (Region::Header, strategy));

        let (fiscal_strategy, fiscal_candidates) =
            self.extract_parties(&texts.parties, &mut record);

        if let Some(strategy) = self.extract_footer(&texts.footer, &mut record) {
            form_code_source = Some((Region::Footer, strategy));
        }

        let processing_time_ms = start.elapsed().as_millis() as u64;

        info!(
            "Extraction complete: form code {:?} (source {:?}), fiscal codes via '{}' ({} candidates), in {}ms",
            record.numero_formulario,
            form_code_source,
            fiscal_strategy,
            fiscal_candidates,
            processing_time_ms
        );

        ExtractionReport {
            record,
            texts: texts.clone(),
            form_code_source,
            fiscal_strategy,
            fiscal_candidates,
            processing_time_ms,
        }
    }
}

impl Default for FormExtractor {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn texts(header: &str, parties: &str, footer: &str) -> RegionTexts {
        RegionTexts {
            header: header.to_string(),
            parties: parties.to_string(),
            footer: footer.to_string(),
        }
    }

    #[test]
    fn test_header_region() {
        let extractor = FormExtractor::new();
        let mut record = ExtractedRecord::new();

        let strategy = extractor.extract_header(
            "FORMULARIO ABCDE 123456 FGH Data emissione 01-02-23",
            &mut record,
        );

        assert_eq!(strategy, Some("spaced"));
        assert!(record.numero_formulario.starts_with("ABCDF"));
        assert_eq!(record.numero_formulario, "ABCDF 123456 FG");
        assert_eq!(record.date_emissione, "01/02/2023");
    }

    #[test]
    fn test_full_record() {
        let parties = "Produttore Codice Fiscale 01234567890 Impianto Codice Fiscale 11234567890 \
                       Trasportatore Codice Fiscale 02345678901 Intermediario Codice Fiscale 03456789012";
        let report = FormExtractor::new().extract(&texts(
            "n. ABCDE 123456 FG del 15/01/2024",
            parties,
            "Reg. Mov. nr. 123.456",
        ));

        let expected = ExtractedRecord {
            numero_formulario: "ABCDF 123456 FG".to_string(),
            date_emissione: "15/01/2024".to_string(),
            produttore_cf: "01234567890".to_string(),
            impianto_cf: "11234567890".to_string(),
            trasportatore_cf: "02345678901".to_string(),
            intermediario_cf: "03456789012".to_string(),
            numero_mov: "123456".to_string(),
        };
        assert_eq!(report.record, expected);
        assert_eq!(report.form_code_source, Some((Region::Header, "spaced")));
        assert_eq!(report.fiscal_strategy, "numeric");
        assert_eq!(report.fiscal_candidates, 4);
    }

    #[test]
    fn test_footer_form_code_fallback() {
        let report = FormExtractor::new().extract(&texts(
            "illeggibile",
            "",
            "Mov. nr 001.002 RSTUO 654321 W",
        ));

        assert_eq!(report.record.numero_formulario, "RSTVQ 654321 VV");
        assert_eq!(report.record.numero_mov, "001002");
        assert_eq!(report.form_code_source, Some((Region::Footer, "w_suffix")));
    }

    #[test]
    fn test_footer_does_not_override_header() {
        let report = FormExtractor::new().extract(&texts(
            "ABCDE 123456 FG",
            "",
            "ZZZZZ 999999 ZZ",
        ));
        assert_eq!(report.record.numero_formulario, "ABCDF 123456 FG");
        assert_eq!(report.form_code_source, Some((Region::Header, "spaced")));
    }

    #[test]
    fn test_partial_fiscal_codes_are_dropped() {
        let report = FormExtractor::new().extract(&texts(
            "",
            "01234567890 11234567890 02345678901",
            "",
        ));
        assert!(report.record.fiscal_codes().iter().all(|cf| cf.is_empty()));
        assert!(report.record.is_empty());
    }

    #[test]
    fn test_calendar_dates_option() {
        let config = ExtractionConfig {
            calendar_dates: true,
            verify_checksums: false,
        };
        let report = FormExtractor::from_config(&config).extract(&texts("31.02.2024", "", ""));
        assert_eq!(report.record.date_emissione, "");
    }

    #[test]
    fn test_region_texts_access() {
        let mut texts = RegionTexts::default();
        texts.set(Region::Parties, "abc".to_string());
        assert_eq!(texts.get(Region::Parties), "abc");
        assert_eq!(texts.get(Region::Header), "");
    }
}
