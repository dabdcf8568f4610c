use crate::config::{Config, LayoutConfig, DEFAULT_CHUNK_SIZE, MAX_CHUNK_SIZE, MIN_CHUNK_SIZE};
use crate::error::{CutterError, Result};
use crate::scanner::{PayloadLocation, SignatureScanner};
use std::fs::File;
use std::io::{ErrorKind, Read, Write};
use std::path::Path;
use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtractionState {
    Idle,
    Scanning,
    Done,
    Failed,
}

#[derive(Debug, Clone)]
pub struct ExtractionProgress {
    pub state: ExtractionState,
    pub bytes_read: u64,
    pub total_bytes: u64,
    pub start_time: Instant,
}

impl ExtractionProgress {
    pub fn new(total_bytes: u64) -> Self {
        Self {
            state: ExtractionState::Idle,
            bytes_read: 0,
            total_bytes,
            start_time: Instant::now(),
        }
    }

    pub fn update_read(&mut self, bytes: u64) {
        self.bytes_read += bytes;
    }

    pub fn set_state(&mut self, state: ExtractionState) {
        self.state = state;
    }

    pub fn percentage(&self) -> f64 {
        if self.total_bytes == 0 {
            0.0
        } else {
            (self.bytes_read as f64 / self.total_bytes as f64) * 100.0
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.start_time.elapsed()
    }
}

/// Result of a successful scan, with the payload copied out of the image.
#[derive(Debug, Clone)]
pub struct Extraction {
    pub location: PayloadLocation,
    pub payload: Vec<u8>,
    pub image_size: u64,
    /// Occurrences of the signature after the one that was used.
    pub ignored_matches: usize,
    pub duration: Duration,
}

pub struct FirmwareExtractor {
    layout: LayoutConfig,
    chunk_size: usize,
}

impl FirmwareExtractor {
    pub fn new() -> Self {
        Self {
            layout: LayoutConfig::default(),
            chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new()
            .with_layout(config.layout.clone())
            .with_chunk_size(config.read.chunk_size)
    }

    pub fn with_layout(mut self, layout: LayoutConfig) -> Self {
        self.layout = layout;
        self
    }

    pub fn with_chunk_size(mut self, size: usize) -> Self {
        self.chunk_size = size.clamp(MIN_CHUNK_SIZE, MAX_CHUNK_SIZE);
        self
    }

    /// Copies the firmware payload of `input` into `output`.
    ///
    /// `output` is created (or truncated) before the image is scanned, so a
    /// missing signature leaves it empty. Nothing is created when `input`
    /// cannot be opened.
    pub fn extract(
        &self,
        input: &Path,
        output: &Path,
        progress_callback: Option<&dyn Fn(&ExtractionProgress)>,
    ) -> Result<Extraction> {
        let source = File::open(input).map_err(|e| CutterError::InputOpen {
            path: input.to_path_buf(),
            source: e,
        })?;

        let mut dest = File::create(output).map_err(|e| CutterError::OutputCreate {
            path: output.to_path_buf(),
            source: e,
        })?;

        let extraction = self.scan_source(source, input, progress_callback)?;

        dest.write_all(&extraction.payload)
            .and_then(|_| dest.flush())
            .map_err(|e| CutterError::Write {
                path: output.to_path_buf(),
                source: e,
            })?;

        Ok(extraction)
    }

    /// Locates the payload without creating any output.
    pub fn inspect(
        &self,
        input: &Path,
        progress_callback: Option<&dyn Fn(&ExtractionProgress)>,
    ) -> Result<Extraction> {
        let source = File::open(input).map_err(|e| CutterError::InputOpen {
            path: input.to_path_buf(),
            source: e,
        })?;

        self.scan_source(source, input, progress_callback)
    }

    fn scan_source(
        &self,
        source: File,
        input: &Path,
        progress_callback: Option<&dyn Fn(&ExtractionProgress)>,
    ) -> Result<Extraction> {
        // Size hint only; the read loop runs to EOF regardless.
        let total_bytes = source.metadata().map(|m| m.len()).unwrap_or(0);
        let mut progress = ExtractionProgress::new(total_bytes);

        let image = match self.read_image(source, &mut progress, progress_callback) {
            Ok(image) => image,
            Err(e) => {
                progress.set_state(ExtractionState::Failed);
                notify(progress_callback, &progress);
                return Err(CutterError::Read {
                    path: input.to_path_buf(),
                    source: e,
                });
            }
        };

        let scanner = SignatureScanner::new(&self.layout.signature);
        let Some(location) = PayloadLocation::locate(&image, &self.layout) else {
            progress.set_state(ExtractionState::Failed);
            notify(progress_callback, &progress);
            return Err(CutterError::SignatureNotFound {
                path: input.to_path_buf(),
                scanned_bytes: image.len() as u64,
            });
        };

        let ignored_matches = scanner.count(&image).saturating_sub(1);

        progress.set_state(ExtractionState::Done);
        notify(progress_callback, &progress);

        Ok(Extraction {
            location,
            payload: location.slice(&image).to_vec(),
            image_size: image.len() as u64,
            ignored_matches,
            duration: progress.elapsed(),
        })
    }

    fn read_image(
        &self,
        mut source: File,
        progress: &mut ExtractionProgress,
        progress_callback: Option<&dyn Fn(&ExtractionProgress)>,
    ) -> std::io::Result<Vec<u8>> {
        let mut image = Vec::with_capacity(progress.total_bytes as usize);
        let mut buffer = vec![0u8; self.chunk_size];

        progress.set_state(ExtractionState::Scanning);
        notify(progress_callback, progress);

        loop {
            let bytes_read = match source.read(&mut buffer) {
                Ok(0) => break,
                Ok(n) => n,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            };

            image.extend_from_slice(&buffer[..bytes_read]);
            progress.update_read(bytes_read as u64);
            notify(progress_callback, progress);
        }

        Ok(image)
    }
}

impl Default for FirmwareExtractor {
    fn default() -> Self {
        Self::new()
    }
}

fn notify(callback: Option<&dyn Fn(&ExtractionProgress)>, progress: &ExtractionProgress) {
    if let Some(callback) = callback {
        callback(progress);
    }
}

/// Extracts the firmware from `input` into `output` with the stock layout.
pub fn extract_firmware<P: AsRef<Path>, Q: AsRef<Path>>(
    input: P,
    output: Q,
) -> Result<PayloadLocation> {
    FirmwareExtractor::new()
        .extract(input.as_ref(), output.as_ref(), None)
        .map(|extraction| extraction.location)
}
