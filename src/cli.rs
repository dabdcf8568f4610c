use crate::config::{CliOverrides, Config};
use crate::error::Result;
use crate::ui::OutputMode;
use clap::{Parser, ValueEnum};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "fwcutter")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Extract the embedded firmware from a Zinwell ZTUB driver image")]
#[command(
    long_about = "fwcutter scans a Windows driver image (e.g. ZTUB10.sys) for the firmware \
                  signature 44 4E 00 00 44 4E 00 00 and writes the 56-byte firmware \
                  that follows it to a raw binary file."
)]
#[command(after_help = "EXAMPLES:\n  \
    fwcutter ZTUB10.sys ztub10.fw\n  \
    fwcutter ZTUB10.sys ztub10.fw --dry-run -vv\n  \
    fwcutter ZTUB10.sys ztub10.fw --output-format json")]
pub struct Cli {
    /// Driver image to scan
    #[arg(value_name = "driver.sys")]
    pub driver: PathBuf,

    /// File the firmware is written to (created or truncated)
    #[arg(value_name = "firmware.out")]
    pub output: PathBuf,

    /// Output format for status messages and the final report
    #[arg(long, value_enum, default_value_t = OutputFormat::Human)]
    pub output_format: OutputFormat,

    /// Read chunk size (e.g. 64K, 1MB)
    #[arg(long, value_parser = parse_size_string)]
    pub chunk_size: Option<usize>,

    /// Hide the read progress bar
    #[arg(long)]
    pub no_progress: bool,

    /// Verbose output level (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Quiet mode (only errors are printed)
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Locate the firmware and report it without writing the output file
    #[arg(long)]
    pub dry_run: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable colored output
    Human,
    /// JSON formatted output
    Json,
    /// Plain text output
    Plain,
}

impl From<OutputFormat> for OutputMode {
    fn from(format: OutputFormat) -> Self {
        match format {
            OutputFormat::Human => OutputMode::Human,
            OutputFormat::Json => OutputMode::Json,
            OutputFormat::Plain => OutputMode::Plain,
        }
    }
}

impl Cli {
    pub fn load_config(&self) -> Result<Config> {
        let mut config = Config::new();

        let overrides = self.create_cli_overrides();
        config.merge_with_cli_args(&overrides);
        config.validate()?;

        Ok(config)
    }

    pub fn create_cli_overrides(&self) -> CliOverrides {
        let hide_progress =
            self.no_progress || self.quiet || matches!(self.output_format, OutputFormat::Json);

        CliOverrides::new()
            .with_chunk_size(self.chunk_size)
            .with_show_progress(hide_progress.then_some(false))
    }

    pub fn verbosity_level(&self) -> u8 {
        if self.quiet {
            0
        } else {
            self.verbose
        }
    }
}

pub fn parse_size_string(s: &str) -> std::result::Result<usize, String> {
    let s = s.trim().to_lowercase();

    let (number_str, multiplier) = if s.ends_with("kb") || s.ends_with('k') {
        (s.trim_end_matches("kb").trim_end_matches('k'), 1024)
    } else if s.ends_with("mb") || s.ends_with('m') {
        (s.trim_end_matches("mb").trim_end_matches('m'), 1024 * 1024)
    } else if s.ends_with("gb") || s.ends_with('g') {
        (
            s.trim_end_matches("gb").trim_end_matches('g'),
            1024 * 1024 * 1024,
        )
    } else if s.ends_with('b') {
        (s.trim_end_matches('b'), 1)
    } else {
        (s.as_str(), 1)
    };

    let number: f64 = number_str
        .trim()
        .parse()
        .map_err(|_| format!("Invalid number format: {}", number_str))?;

    if !number.is_finite() {
        return Err(format!("Invalid size: {}", number_str.trim()));
    }

    if number < 0.0 {
        return Err("Size cannot be negative".to_string());
    }

    let bytes = number * multiplier as f64;
    if bytes > usize::MAX as f64 {
        return Err(format!("Size too large: {}", s));
    }

    Ok(bytes as usize)
}
