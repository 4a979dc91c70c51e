//! CRC-8/SMBUS: polynomial `0x07`, init `0x00`, no reflection, no final xor.

use crc::{Crc, CRC_8_SMBUS};

static CRC8: Crc<u8> = Crc::<u8>::new(&CRC_8_SMBUS);

/// CRC-8 of a complete byte slice.
pub fn crc8(bytes: &[u8]) -> u8 {
    CRC8.checksum(bytes)
}

/// Envelope checksum: CRC-8 over the body text followed by the sequence byte.
pub fn checksum(body: &[u8], sequence: u8) -> u8 {
    let mut digest = CRC8.digest();
    digest.update(body);
    digest.update(&[sequence]);
    digest.finalize()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_check_value() {
        assert_eq!(crc8(b"123456789"), 0xF4);
    }

    #[test]
    fn empty_input_is_init() {
        assert_eq!(crc8(b""), 0x00);
    }

    #[test]
    fn checksum_covers_sequence_byte() {
        let body = b"05[1,\"on\"]";
        assert_ne!(checksum(body, 0), checksum(body, 1));

        let mut joined = body.to_vec();
        joined.push(7);
        assert_eq!(checksum(body, 7), crc8(&joined));
    }

    #[test]
    fn known_envelope_checksums() {
        // Bitwise reference values for poly 0x07, init 0.
        fn reference(bytes: &[u8]) -> u8 {
            bytes.iter().fold(0u8, |mut crc, &b| {
                crc ^= b;
                for _ in 0..8 {
                    crc = if crc & 0x80 != 0 { (crc << 1) ^ 0x07 } else { crc << 1 };
                }
                crc
            })
        }

        assert_eq!(checksum(b"05[1,\"on\"]", 0), reference(b"05[1,\"on\"]\x00"));
        assert_eq!(checksum(b"R[0]", 9), reference(b"R[0]\x09"));
    }

    #[test]
    fn single_bit_flip_changes_crc() {
        let a = crc8(b"R[0,42]");
        let b = crc8(b"R[0,43]");
        assert_ne!(a, b);
    }
}
