pub mod cli;
pub mod config;
pub mod error;
pub mod extractor;
pub mod scanner;
pub mod ui;

// Public API re-exports
pub use cli::{Cli, OutputFormat};
pub use config::{CliOverrides, Config, LayoutConfig, ReadConfig, FIRMWARE_SIGNATURE};
pub use error::{CutterError, Result, UserFriendlyError};

// Core functionality re-exports
pub use extractor::{
    extract_firmware, Extraction, ExtractionProgress, ExtractionReport, ExtractionState,
    FirmwareExtractor,
};
pub use scanner::{PayloadLocation, SignatureScanner};
pub use ui::{OutputFormatter, OutputMode, ProgressManager};

use std::path::Path;

/// Main library interface: an extractor wired to console output.
pub struct FwCutter {
    config: Config,
    output_formatter: OutputFormatter,
    progress_manager: ProgressManager,
}

impl FwCutter {
    pub fn new(config: Config, output_mode: OutputMode, verbose: u8, quiet: bool) -> Self {
        let output_formatter = OutputFormatter::new(output_mode, verbose, quiet);
        let progress_manager = ProgressManager::new(config.read.show_progress && !quiet);

        Self {
            config,
            output_formatter,
            progress_manager,
        }
    }

    pub fn from_cli(cli_args: &Cli) -> Result<Self> {
        let config = cli_args.load_config()?;

        Ok(Self::new(
            config,
            cli_args.output_format.into(),
            cli_args.verbosity_level(),
            cli_args.quiet,
        ))
    }

    /// Extracts the firmware from `driver` into `output`.
    pub fn extract(&self, driver: &Path, output: &Path) -> Result<ExtractionReport> {
        self.output_formatter.start_operation(&format!(
            "Extracting firmware from {} into {}",
            driver.display(),
            output.display()
        ));

        let extraction = self.run(driver, |extractor, callback| {
            extractor.extract(driver, output, callback)
        })?;

        self.output_formatter.success(&format!(
            "Found the firmware at offset {}",
            extraction.location.firmware_offset
        ));

        Ok(ExtractionReport::new(
            driver,
            Some(output),
            &extraction,
            &self.config,
        ))
    }

    /// Locates the firmware in `driver` without writing anything.
    pub fn inspect(&self, driver: &Path) -> Result<ExtractionReport> {
        self.output_formatter
            .start_operation(&format!("Scanning {} (dry run)", driver.display()));

        let extraction = self.run(driver, |extractor, callback| {
            extractor.inspect(driver, callback)
        })?;

        self.output_formatter.success(&format!(
            "Found the firmware at offset {}",
            extraction.location.firmware_offset
        ));

        Ok(ExtractionReport::new(driver, None, &extraction, &self.config))
    }

    fn run<F>(&self, driver: &Path, operation: F) -> Result<Extraction>
    where
        F: FnOnce(&FirmwareExtractor, Option<&dyn Fn(&ExtractionProgress)>) -> Result<Extraction>,
    {
        let extractor = FirmwareExtractor::from_config(&self.config);
        self.output_formatter.debug(&format!(
            "Signature {} (payload {} bytes at +{}), read chunk {} bytes",
            to_hex(&self.config.layout.signature),
            self.config.layout.payload_len,
            self.config.layout.payload_gap,
            self.config.read.chunk_size
        ));

        let read_progress = self.progress_manager.create_read_progress(&format!(
            "Reading {}",
            driver.display()
        ));
        let progress_callback = {
            let pb = read_progress.clone();
            move |progress: &ExtractionProgress| {
                ui::progress::update_read_progress(&pb, progress);
            }
        };

        let callback: &dyn Fn(&ExtractionProgress) = &progress_callback;
        let result = operation(&extractor, Some(callback));

        match result {
            Ok(ref extraction) => {
                ui::progress::finish_progress_with_summary(
                    &read_progress,
                    "Driver image scanned",
                    extraction.duration,
                );
                self.output_formatter.info(&format!(
                    "Read {} from {}",
                    error::format_bytes(extraction.image_size),
                    driver.display()
                ));
                self.output_formatter.debug(&format!(
                    "Signature at offset {} of {} bytes",
                    extraction.location.signature_offset, extraction.image_size
                ));
            }
            Err(_) => read_progress.abandon(),
        }

        result
    }

    pub fn output_formatter(&self) -> &OutputFormatter {
        &self.output_formatter
    }

    pub fn handle_error(&self, error: &CutterError) {
        self.output_formatter.print_user_friendly_error(error);
    }
}

/// Space-separated lowercase hex, e.g. `44 4e 00 00`.
pub fn to_hex(bytes: &[u8]) -> String {
    bytes
        .iter()
        .map(|b| format!("{:02x}", b))
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn quiet_cutter() -> FwCutter {
        let mut config = Config::default();
        config.read.show_progress = false;
        FwCutter::new(config, OutputMode::Plain, 0, true)
    }

    fn write_driver(dir: &Path, filler: usize) -> std::path::PathBuf {
        let path = dir.join("ZTUB10.sys");
        let mut image = vec![0x5Au8; filler];
        image.extend_from_slice(&FIRMWARE_SIGNATURE);
        image.extend((1u8..=56).collect::<Vec<_>>());
        fs::write(&path, image).unwrap();
        path
    }

    #[test]
    fn test_extract_reports_offset() {
        let temp_dir = TempDir::new().unwrap();
        let driver = write_driver(temp_dir.path(), 48);
        let output = temp_dir.path().join("firmware.bin");

        let report = quiet_cutter().extract(&driver, &output).unwrap();
        assert_eq!(report.firmware_offset, 56);
        assert_eq!(report.payload_len, 56);
        assert_eq!(fs::read(&output).unwrap(), (1u8..=56).collect::<Vec<_>>());
    }

    #[test]
    fn test_inspect_is_dry_run() {
        let temp_dir = TempDir::new().unwrap();
        let driver = write_driver(temp_dir.path(), 0);
        let output = temp_dir.path().join("firmware.bin");

        let report = quiet_cutter().inspect(&driver).unwrap();
        assert!(report.is_dry_run());
        assert_eq!(report.firmware_offset, 8);
        assert!(!output.exists());
    }

    #[test]
    fn test_from_cli_rejects_bad_config() {
        use clap::Parser;

        let cli = Cli::try_parse_from(["fwcutter", "--chunk-size", "1K", "a.sys", "b.bin"]).unwrap();
        assert!(matches!(
            FwCutter::from_cli(&cli),
            Err(CutterError::Config { .. })
        ));
    }

    #[test]
    fn test_to_hex() {
        assert_eq!(to_hex(&FIRMWARE_SIGNATURE), "44 4e 00 00 44 4e 00 00");
        assert_eq!(to_hex(&[]), "");
    }
}
