use crate::error::{CutterError, Result};
use serde::Serialize;

/// `44 4E 00 00 44 4E 00 00`, "DN\0\0" twice.
pub const FIRMWARE_SIGNATURE: [u8; 8] = [0x44, 0x4E, 0x00, 0x00, 0x44, 0x4E, 0x00, 0x00];

/// Bytes between the start of the signature and the start of the payload.
pub const PAYLOAD_GAP: usize = 8;

/// Size of the firmware payload embedded in ZTUB10.sys.
pub const PAYLOAD_LEN: usize = 56;

pub const DEFAULT_CHUNK_SIZE: usize = 1024 * 1024;
pub const MIN_CHUNK_SIZE: usize = 4 * 1024;
pub const MAX_CHUNK_SIZE: usize = 1024 * 1024 * 1024;

#[derive(Debug, Clone, Default, Serialize)]
pub struct Config {
    pub layout: LayoutConfig,
    pub read: ReadConfig,
}

/// Where the firmware sits relative to the signature. Only the ZTUB10 layout
/// is known, so this is not user configurable.
#[derive(Debug, Clone, Serialize)]
pub struct LayoutConfig {
    #[serde(serialize_with = "serialize_hex")]
    pub signature: [u8; 8],
    pub payload_gap: usize,
    pub payload_len: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReadConfig {
    pub chunk_size: usize,
    pub show_progress: bool,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            signature: FIRMWARE_SIGNATURE,
            payload_gap: PAYLOAD_GAP,
            payload_len: PAYLOAD_LEN,
        }
    }
}

impl Default for ReadConfig {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            show_progress: true,
        }
    }
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn merge_with_cli_args(&mut self, cli_args: &CliOverrides) {
        if let Some(chunk_size) = cli_args.chunk_size {
            self.read.chunk_size = chunk_size;
        }

        if let Some(show_progress) = cli_args.show_progress {
            self.read.show_progress = show_progress;
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.read.chunk_size < MIN_CHUNK_SIZE {
            return Err(CutterError::Config {
                message: format!(
                    "Read chunk size must be at least {} bytes (got {})",
                    MIN_CHUNK_SIZE, self.read.chunk_size
                ),
            });
        }

        if self.read.chunk_size > MAX_CHUNK_SIZE {
            return Err(CutterError::Config {
                message: format!(
                    "Read chunk size must be at most {} bytes (got {})",
                    MAX_CHUNK_SIZE, self.read.chunk_size
                ),
            });
        }

        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct CliOverrides {
    pub chunk_size: Option<usize>,
    pub show_progress: Option<bool>,
}

impl CliOverrides {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_chunk_size(mut self, chunk_size: Option<usize>) -> Self {
        self.chunk_size = chunk_size;
        self
    }

    pub fn with_show_progress(mut self, show_progress: Option<bool>) -> Self {
        self.show_progress = show_progress;
        self
    }
}

fn serialize_hex<S>(bytes: &[u8; 8], serializer: S) -> std::result::Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    serializer.serialize_str(&crate::to_hex(bytes))
}
