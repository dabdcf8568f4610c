use crate::config::Config;
use crate::extractor::Extraction;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Clone, Serialize)]
pub struct ExtractionReport {
    pub input_path: PathBuf,
    pub input_size: u64,
    /// `None` for a dry run.
    pub output_path: Option<PathBuf>,
    pub signature_offset: usize,
    pub firmware_offset: usize,
    pub payload_len: usize,
    pub truncated: bool,
    pub ignored_matches: usize,
    pub payload_hex: String,
    pub extraction_time: DateTime<Utc>,
    pub extraction_duration: Duration,
    pub config_used: Config,
}

impl ExtractionReport {
    pub fn new(
        input_path: &Path,
        output_path: Option<&Path>,
        extraction: &Extraction,
        config: &Config,
    ) -> Self {
        Self {
            input_path: input_path.to_path_buf(),
            input_size: extraction.image_size,
            output_path: output_path.map(Path::to_path_buf),
            signature_offset: extraction.location.signature_offset,
            firmware_offset: extraction.location.firmware_offset,
            payload_len: extraction.location.length,
            truncated: extraction.location.truncated,
            ignored_matches: extraction.ignored_matches,
            payload_hex: crate::to_hex(&extraction.payload),
            extraction_time: Utc::now(),
            extraction_duration: extraction.duration,
            config_used: config.clone(),
        }
    }

    pub fn is_dry_run(&self) -> bool {
        self.output_path.is_none()
    }

    pub fn warnings(&self) -> Vec<String> {
        let mut warnings = Vec::new();

        if self.truncated {
            warnings.push(format!(
                "Payload truncated: only {} of {} bytes available after the signature",
                self.payload_len, self.config_used.layout.payload_len
            ));
        }

        if self.ignored_matches > 0 {
            warnings.push(format!(
                "Signature occurs {} more time(s) after offset {}; only the first was used",
                self.ignored_matches, self.signature_offset
            ));
        }

        warnings
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scanner::PayloadLocation;

    fn extraction(length: usize, ignored_matches: usize) -> Extraction {
        Extraction {
            location: PayloadLocation {
                signature_offset: 48,
                firmware_offset: 56,
                length,
                truncated: length < 56,
            },
            payload: vec![0xAB; length],
            image_size: 56 + length as u64,
            ignored_matches,
            duration: Duration::from_millis(3),
        }
    }

    #[test]
    fn test_report_fields() {
        let report = ExtractionReport::new(
            Path::new("ZTUB10.sys"),
            Some(Path::new("firmware.bin")),
            &extraction(56, 0),
            &Config::default(),
        );

        assert_eq!(report.firmware_offset, 56);
        assert_eq!(report.payload_len, 56);
        assert!(!report.is_dry_run());
        assert!(report.warnings().is_empty());
        assert!(report.payload_hex.starts_with("ab ab"));
    }

    #[test]
    fn test_report_warnings() {
        let report = ExtractionReport::new(
            Path::new("ZTUB10.sys"),
            None,
            &extraction(12, 2),
            &Config::default(),
        );

        assert!(report.is_dry_run());
        let warnings = report.warnings();
        assert_eq!(warnings.len(), 2);
        assert!(warnings[0].contains("12 of 56"));
        assert!(warnings[1].contains("2 more time(s)"));
    }

    #[test]
    fn test_report_serializes() {
        let report = ExtractionReport::new(
            Path::new("ZTUB10.sys"),
            Some(Path::new("firmware.bin")),
            &extraction(56, 0),
            &Config::default(),
        );

        let value = serde_json::to_value(&report).unwrap();
        assert_eq!(value["firmware_offset"], 56);
        assert_eq!(value["output_path"], "firmware.bin");
        assert_eq!(value["config_used"]["read"]["chunk_size"], 1024 * 1024);
    }
}
