//! CRC-16/AUG-CCITT, the checksum appended to messages that request one.
//!
//! Polynomial `0x1021`, processed MSB first with no reflection and no final
//! XOR. The register starts at `0x1D0F`, which is what a `0xFFFF` register
//! produces after the two augmenting zero bytes of the classic formulation.

const POLYNOMIAL: u16 = 0x1021;

/// Initial register value; also the checksum of an empty input.
pub const CRC16_INIT: u16 = 0x1D0F;

const TABLE: [u16; 256] = build_table();

const fn build_table() -> [u16; 256] {
    let mut table = [0u16; 256];
    let mut i = 0;
    while i < 256 {
        let mut crc = (i as u16) << 8;
        let mut bit = 0;
        while bit < 8 {
            crc = if crc & 0x8000 != 0 {
                (crc << 1) ^ POLYNOMIAL
            } else {
                crc << 1
            };
            bit += 1;
        }
        table[i] = crc;
        i += 1;
    }
    table
}

/// Computes the checksum of `data`.
pub fn crc16_aug_ccitt(data: &[u8]) -> u16 {
    data.iter().fold(CRC16_INIT, |crc, &byte| {
        (crc << 8) ^ TABLE[((crc >> 8) as u8 ^ byte) as usize]
    })
}

#[test]
fn known_vectors() {
    assert_eq!(crc16_aug_ccitt(&[]), 0x1D0F);
    assert_eq!(crc16_aug_ccitt(b"A"), 0x9479);
    assert_eq!(crc16_aug_ccitt(b"123456789"), 0xE5CC);
    assert_eq!(crc16_aug_ccitt(&[b'A'; 256]), 0xE938);
}

#[test]
fn matches_encoded_message_vector() {
    let payload = [0x91, 0xcf, 0x11, 0x22, 0x10, 0xf4, 0x7d, 0xe9, 0x81, 0x15];
    assert_eq!(crc16_aug_ccitt(&payload), 0x14E9);
}

#[test]
fn bitwise_reference_agrees_with_table() {
    fn bitwise(data: &[u8]) -> u16 {
        let mut crc = CRC16_INIT;
        for &byte in data {
            crc ^= (byte as u16) << 8;
            for _ in 0..8 {
                crc = if crc & 0x8000 != 0 { (crc << 1) ^ POLYNOMIAL } else { crc << 1 };
            }
        }
        crc
    }
    let data: Vec<u8> = (0..=255u8).rev().chain(0..=255u8).collect();
    assert_eq!(crc16_aug_ccitt(&data), bitwise(&data));
}
