use memchr::memmem::Finder;

/// Exact byte-signature search over an in-memory image.
pub struct SignatureScanner<'p> {
    finder: Finder<'p>,
}

impl<'p> SignatureScanner<'p> {
    pub fn new(signature: &'p [u8]) -> Self {
        Self {
            finder: Finder::new(signature),
        }
    }

    /// Lowest offset at which the signature starts, if any.
    pub fn find_first(&self, haystack: &[u8]) -> Option<usize> {
        self.finder.find(haystack)
    }

    /// Number of occurrences, overlapping ones included.
    pub fn count(&self, haystack: &[u8]) -> usize {
        let mut count = 0;
        let mut pos = 0;

        while let Some(start) = self.finder.find(&haystack[pos..]) {
            count += 1;
            pos += start + 1;
        }

        count
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FIRMWARE_SIGNATURE;

    #[test]
    fn test_find_first_occurrence() {
        let mut blob = vec![0xAAu8; 48];
        blob.extend_from_slice(&FIRMWARE_SIGNATURE);
        blob.extend_from_slice(&[0u8; 16]);
        blob.extend_from_slice(&FIRMWARE_SIGNATURE);

        let scanner = SignatureScanner::new(&FIRMWARE_SIGNATURE);
        assert_eq!(scanner.find_first(&blob), Some(48));
        assert_eq!(scanner.count(&blob), 2);
    }

    #[test]
    fn test_signature_at_start_and_end() {
        let scanner = SignatureScanner::new(&FIRMWARE_SIGNATURE);
        assert_eq!(scanner.find_first(&FIRMWARE_SIGNATURE), Some(0));

        let mut blob = vec![0x11u8; 100];
        blob.extend_from_slice(&FIRMWARE_SIGNATURE);
        assert_eq!(scanner.find_first(&blob), Some(100));
    }

    #[test]
    fn test_partial_signature_is_not_a_match() {
        let scanner = SignatureScanner::new(&FIRMWARE_SIGNATURE);

        // "DN\0\0" once, then a near miss
        let blob = [0x44, 0x4E, 0x00, 0x00, 0x44, 0x4E, 0x00, 0x01, 0x44, 0x4E, 0x00];
        assert_eq!(scanner.find_first(&blob), None);
        assert_eq!(scanner.count(&blob), 0);

        assert_eq!(scanner.find_first(&FIRMWARE_SIGNATURE[..7]), None);
        assert_eq!(scanner.find_first(&[]), None);
    }

    #[test]
    fn test_overlapping_prefix() {
        // three "DN\0\0" halves hold two overlapping matches
        let mut blob = vec![0x44, 0x4E, 0x00, 0x00];
        blob.extend_from_slice(&FIRMWARE_SIGNATURE);

        let scanner = SignatureScanner::new(&FIRMWARE_SIGNATURE);
        assert_eq!(scanner.find_first(&blob), Some(0));
        assert_eq!(scanner.find_first(&blob[1..]), Some(3));
        assert_eq!(scanner.count(&blob), 2);
    }

    #[test]
    fn test_count_runs_of_halves() {
        let scanner = SignatureScanner::new(&FIRMWARE_SIGNATURE);
        let blob: Vec<u8> = [0x44, 0x4E, 0x00, 0x00].repeat(5);
        assert_eq!(scanner.count(&blob), 4);
        assert_eq!(scanner.count(&FIRMWARE_SIGNATURE), 1);
        assert_eq!(scanner.count(&[]), 0);
    }
}
