//! # Address Checksum
//!
//! CRC16/XMODEM checksum used by checksummed text addresses.
//!
//! The polynomial is 0x1021 with a zero initial value and no reflection.
//! The accumulator is big-endian internally, but addresses carry the result
//! low byte first.

use crc::{Crc, CRC_16_XMODEM};

const XMODEM: Crc<u16> = Crc::<u16>::new(&CRC_16_XMODEM);

/// Length of the checksum suffix in bytes.
pub const CHECKSUM_LENGTH: usize = 2;

/// CRC16/XMODEM of `payload`, emitted little-endian.
pub fn checksum(payload: &[u8]) -> [u8; CHECKSUM_LENGTH] {
    XMODEM.checksum(payload).to_le_bytes()
}

/// Constant-shape comparison of a stored checksum against `payload`.
pub fn verify_checksum(payload: &[u8], expected: &[u8]) -> bool {
    let actual = checksum(payload);
    expected.len() == CHECKSUM_LENGTH && (actual[0] ^ expected[0]) | (actual[1] ^ expected[1]) == 0
}
