use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CutterError {
    #[error("Error opening file {}", path.display())]
    InputOpen {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Error creating file {}", path.display())]
    OutputCreate {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Could not find the firmware signature in this driver")]
    SignatureNotFound { path: PathBuf, scanned_bytes: u64 },

    #[error("Failed to read {}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write {}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Configuration error: {message}")]
    Config { message: String },
}

pub trait UserFriendlyError {
    fn user_message(&self) -> String;
    fn suggestion(&self) -> Option<String>;
}

impl UserFriendlyError for CutterError {
    fn user_message(&self) -> String {
        match self {
            CutterError::InputOpen { path, source } => {
                format!("Error opening file {}: {}", path.display(), source)
            }
            CutterError::OutputCreate { path, source } => {
                format!("Error creating file {}: {}", path.display(), source)
            }
            CutterError::SignatureNotFound {
                path,
                scanned_bytes,
            } => {
                format!(
                    "Could not find the firmware signature in {} (scanned {})",
                    path.display(),
                    format_bytes(*scanned_bytes)
                )
            }
            CutterError::Read { path, source } => {
                format!("Failed to read {}: {}", path.display(), source)
            }
            CutterError::Write { path, source } => {
                format!("Failed to write {}: {}", path.display(), source)
            }
            CutterError::Config { message } => {
                format!("Configuration error: {}", message)
            }
        }
    }

    fn suggestion(&self) -> Option<String> {
        match self {
            CutterError::InputOpen { .. } => Some(
                "Check that the driver image exists and is readable (e.g. ZTUB10.sys from the vendor driver package).".to_string()
            ),
            CutterError::OutputCreate { .. } => Some(
                "Ensure the destination directory exists and you have write permission.".to_string()
            ),
            CutterError::SignatureNotFound { .. } => Some(
                "This driver does not embed the firmware at a known location. The output file was left empty and must not be used.".to_string()
            ),
            CutterError::Config { .. } => Some(
                "Check the command-line options, e.g. --chunk-size must be at least 4K.".to_string()
            ),
            _ => None,
        }
    }
}

impl CutterError {
    /// Process exit status for this failure.
    pub fn exit_code(&self) -> i32 {
        match self {
            CutterError::Config { .. } => 2,
            CutterError::InputOpen { .. } => 3,
            CutterError::OutputCreate { .. } => 4,
            CutterError::SignatureNotFound { .. } => 5,
            CutterError::Read { .. } | CutterError::Write { .. } => 6,
        }
    }
}

pub type Result<T> = std::result::Result<T, CutterError>;

pub(crate) fn format_bytes(bytes: u64) -> String {
    const UNITS: &[&str] = &["B", "KB", "MB", "GB"];
    let mut size = bytes as f64;
    let mut unit_index = 0;

    while size >= 1024.0 && unit_index < UNITS.len() - 1 {
        size /= 1024.0;
        unit_index += 1;
    }

    if unit_index == 0 {
        format!("{} {}", bytes, UNITS[unit_index])
    } else {
        format!("{:.1} {}", size, UNITS[unit_index])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn test_user_friendly_messages() {
        let error = CutterError::SignatureNotFound {
            path: PathBuf::from("ZTUB10.sys"),
            scanned_bytes: 2048,
        };
        let message = error.user_message();
        assert!(message.contains("Could not find the firmware signature"));
        assert!(message.contains("ZTUB10.sys"));
        assert!(message.contains("2.0 KB"));
        assert!(error.suggestion().is_some());
    }

    #[test]
    fn test_io_sources_are_preserved() {
        use std::error::Error;

        let error = CutterError::InputOpen {
            path: PathBuf::from("missing.sys"),
            source: io::Error::new(io::ErrorKind::NotFound, "no such file"),
        };
        assert_eq!(error.to_string(), "Error opening file missing.sys");
        assert!(error.source().is_some());
        assert!(error.user_message().contains("no such file"));
    }

    #[test]
    fn test_exit_codes_are_distinct_and_nonzero() {
        let errors = [
            CutterError::Config {
                message: "bad".to_string(),
            },
            CutterError::InputOpen {
                path: PathBuf::new(),
                source: io::Error::from(io::ErrorKind::NotFound),
            },
            CutterError::OutputCreate {
                path: PathBuf::new(),
                source: io::Error::from(io::ErrorKind::PermissionDenied),
            },
            CutterError::SignatureNotFound {
                path: PathBuf::new(),
                scanned_bytes: 0,
            },
            CutterError::Read {
                path: PathBuf::new(),
                source: io::Error::from(io::ErrorKind::UnexpectedEof),
            },
            CutterError::Write {
                path: PathBuf::new(),
                source: io::Error::from(io::ErrorKind::WriteZero),
            },
        ];

        let codes: Vec<i32> = errors.iter().map(CutterError::exit_code).collect();
        assert_eq!(codes, vec![2, 3, 4, 5, 6, 6]);
    }

    #[test]
    fn test_format_bytes() {
        assert_eq!(format_bytes(1024), "1.0 KB");
        assert_eq!(format_bytes(1048576), "1.0 MB");
        assert_eq!(format_bytes(500), "500 B");
    }
}
