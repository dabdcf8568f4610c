use crate::config::LayoutConfig;
use crate::scanner::SignatureScanner;
use serde::Serialize;

/// Position of the firmware payload inside a driver image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PayloadLocation {
    pub signature_offset: usize,
    pub firmware_offset: usize,
    pub length: usize,
    pub truncated: bool,
}

impl PayloadLocation {
    /// Locates the payload following the first signature in `image`.
    ///
    /// The payload is clamped to whatever remains of the image, so a
    /// signature near the end yields a short payload rather than an error.
    pub fn locate(image: &[u8], layout: &LayoutConfig) -> Option<Self> {
        let scanner = SignatureScanner::new(&layout.signature);
        let signature_offset = scanner.find_first(image)?;

        Some(Self::at(signature_offset, image.len(), layout))
    }

    fn at(signature_offset: usize, image_len: usize, layout: &LayoutConfig) -> Self {
        let firmware_offset = signature_offset + layout.payload_gap;
        let available = image_len.saturating_sub(firmware_offset);
        let length = available.min(layout.payload_len);

        Self {
            signature_offset,
            firmware_offset,
            length,
            truncated: length < layout.payload_len,
        }
    }

    pub fn end(&self) -> usize {
        self.firmware_offset + self.length
    }

    pub fn slice<'a>(&self, image: &'a [u8]) -> &'a [u8] {
        &image[self.firmware_offset..self.end()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FIRMWARE_SIGNATURE;

    fn payload() -> Vec<u8> {
        (0u8..56).map(|b| b.wrapping_mul(7).wrapping_add(3)).collect()
    }

    #[test]
    fn test_locate_full_payload() {
        let mut image = vec![0xFFu8; 48];
        image.extend_from_slice(&FIRMWARE_SIGNATURE);
        image.extend_from_slice(&payload());
        image.extend_from_slice(&[0xEE; 32]);

        let location = PayloadLocation::locate(&image, &LayoutConfig::default()).unwrap();
        assert_eq!(location.signature_offset, 48);
        assert_eq!(location.firmware_offset, 56);
        assert_eq!(location.length, 56);
        assert!(!location.truncated);
        assert_eq!(location.slice(&image), payload().as_slice());
    }

    #[test]
    fn test_first_signature_wins() {
        let mut image = FIRMWARE_SIGNATURE.to_vec();
        image.extend_from_slice(&payload());
        image.extend_from_slice(&FIRMWARE_SIGNATURE);
        image.extend_from_slice(&[0x55; 56]);

        let location = PayloadLocation::locate(&image, &LayoutConfig::default()).unwrap();
        assert_eq!(location.signature_offset, 0);
        assert_eq!(location.slice(&image), payload().as_slice());
    }

    #[test]
    fn test_truncated_payload_is_clamped() {
        let mut image = vec![0u8; 10];
        image.extend_from_slice(&FIRMWARE_SIGNATURE);
        image.extend_from_slice(&[1, 2, 3, 4, 5]);

        let location = PayloadLocation::locate(&image, &LayoutConfig::default()).unwrap();
        assert_eq!(location.firmware_offset, 18);
        assert_eq!(location.length, 5);
        assert!(location.truncated);
        assert_eq!(location.slice(&image), &[1u8, 2, 3, 4, 5]);
    }

    #[test]
    fn test_signature_at_very_end_gives_empty_payload() {
        let mut image = vec![0u8; 3];
        image.extend_from_slice(&FIRMWARE_SIGNATURE);

        let location = PayloadLocation::locate(&image, &LayoutConfig::default()).unwrap();
        assert_eq!(location.length, 0);
        assert!(location.truncated);
        assert!(location.slice(&image).is_empty());
    }

    #[test]
    fn test_missing_signature() {
        let image = vec![0x44u8; 256];
        assert!(PayloadLocation::locate(&image, &LayoutConfig::default()).is_none());
        assert!(PayloadLocation::locate(&[], &LayoutConfig::default()).is_none());
    }
}
