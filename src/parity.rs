use crate::consts::ID_LEN;

pub(crate) fn nibble_high(x: u8) -> u8 {
    x >> 4
}

pub(crate) fn nibble_low(x: u8) -> u8 {
    x & 0x0f
}

/// Even parity over the four low bits.
pub(crate) fn nibble_parity(nibble: u8) -> bool {
    (nibble & 0x0f).count_ones() & 1 == 1
}

/// XOR of the raw identifier bytes.
pub(crate) fn checksum(bytes: &[u8; ID_LEN]) -> u8 {
    bytes.iter().fold(0, |acc, b| acc ^ b)
}

/// The column parity nibble sent after the data rows.
///
/// Only the folded nibble goes on air; the reader recomputes it from the rows.
pub(crate) fn column_nibble(checksum: u8) -> u8 {
    nibble_high(checksum) ^ nibble_low(checksum)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nibble_split() {
        assert_eq!(nibble_high(0xa5), 0x0a);
        assert_eq!(nibble_low(0xa5), 0x05);
    }

    #[test]
    fn test_nibble_parity() {
        assert!(!nibble_parity(0x0));
        assert!(nibble_parity(0x1));
        assert!(!nibble_parity(0x3));
        assert!(nibble_parity(0x7));
        assert!(!nibble_parity(0xf));
        // upper bits are ignored
        assert!(!nibble_parity(0xf0));
    }

    #[test]
    fn test_checksum_and_column() {
        assert_eq!(checksum(&[0, 0, 0, 0, 0]), 0);
        assert_eq!(column_nibble(0), 0);

        let sum = checksum(&[0x12, 0x34, 0x56, 0x78, 0x9a]);
        assert_eq!(sum, 0x12 ^ 0x34 ^ 0x56 ^ 0x78 ^ 0x9a);
        assert_eq!(column_nibble(sum), (sum >> 4) ^ (sum & 0x0f));

        // an odd number of identical bytes leaves the byte itself
        assert_eq!(checksum(&[0xff; 5]), 0xff);
        assert_eq!(column_nibble(0xff), 0);
    }
}
