pub mod firmware;
pub mod report;

pub use firmware::{
    extract_firmware, Extraction, ExtractionProgress, ExtractionState, FirmwareExtractor,
};
pub use report::ExtractionReport;
