//! JPEG stream completeness check.
//!
//! The `image` crate's JPEG decoder pads a truncated entropy-coded segment
//! with gray and reports success. Decoding a cut-off upload must fail
//! instead, so the backend checks the marker structure first:
//!
//! ```text
//! FF D8                      SOI
//! FF xx <len> <payload>      APPn, DQT, SOF, DHT, ... (length-prefixed)
//! FF DA <len> <header>       SOS, entropy-coded data follows
//! ...                        scan data (FF is always stuffed as FF 00)
//! FF D9                      EOI
//! ```
//!
//! Inside scan data a literal `FF` byte is followed by `00` or a restart
//! marker, so an `FF D9` pair after the first SOS can only be the real EOI.
//! An EOI inside an embedded EXIF thumbnail sits before the first SOS and
//! is skipped with its APP1 segment.

const SOI: [u8; 2] = [0xFF, 0xD8];
const EOI: [u8; 2] = [0xFF, 0xD9];
const SOS: u8 = 0xDA;

/// Offset of the first SOS marker, walking length-prefixed segments from SOI.
fn first_scan_offset(data: &[u8]) -> Option<usize> {
    if !data.starts_with(&SOI) {
        return None;
    }
    let mut pos = 2;
    loop {
        if *data.get(pos)? != 0xFF {
            return None;
        }
        // Fill bytes before a marker
        while data.get(pos + 1) == Some(&0xFF) {
            pos += 1;
        }
        let marker = *data.get(pos + 1)?;
        match marker {
            SOS => return Some(pos),
            0x01 | 0xD0..=0xD7 => pos += 2,
            _ => {
                let len = u16::from_be_bytes([*data.get(pos + 2)?, *data.get(pos + 3)?]);
                pos += 2 + len as usize;
            }
        }
    }
}

/// Whether a JPEG stream reaches its end-of-image marker after the scan data.
pub(crate) fn is_complete(data: &[u8]) -> bool {
    first_scan_offset(data)
        .is_some_and(|scan| data[scan..].windows(2).any(|pair| pair == EOI))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::jpeg_bytes;

    #[test]
    fn encoded_jpeg_is_complete() {
        assert!(is_complete(&jpeg_bytes(64, 48)));
    }

    #[test]
    fn truncated_jpeg_is_incomplete() {
        let bytes = jpeg_bytes(128, 128);
        for divisor in [2, 3, 4] {
            assert!(!is_complete(&bytes[..bytes.len() / divisor]), "1/{divisor}");
        }
        assert!(!is_complete(&bytes[..bytes.len() - 2]));
    }

    #[test]
    fn trailing_bytes_after_eoi_are_accepted() {
        let mut bytes = jpeg_bytes(32, 32);
        bytes.extend_from_slice(b"appended vendor data");
        assert!(is_complete(&bytes));
    }

    #[test]
    fn eoi_before_first_scan_does_not_count() {
        // APP1 segment carrying an EOI pair, then a scan header with no data
        let mut bytes = SOI.to_vec();
        bytes.extend_from_slice(&[0xFF, 0xE1, 0x00, 0x06, 0xFF, 0xD9, 0x00, 0x00]);
        bytes.extend_from_slice(&[0xFF, SOS, 0x00, 0x02]);
        assert_eq!(first_scan_offset(&bytes), Some(10));
        assert!(!is_complete(&bytes));
    }

    #[test]
    fn missing_soi_is_incomplete() {
        assert!(!is_complete(b"not a jpeg"));
        assert!(!is_complete(&[]));
    }
}
