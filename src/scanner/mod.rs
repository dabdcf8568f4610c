pub mod payload;
pub mod signature;

pub use payload::PayloadLocation;
pub use signature::SignatureScanner;
