// src/common/crc.rs

use crc::{Algorithm, Crc};

/// CRC algorithm used by Modbus RTU (CRC-16/MODBUS).
/// Polynomial: 0x8005 (normal representation of 0xA001 reversed)
/// Initial Value: 0xFFFF
/// Input Reflected: true
/// Output Reflected: true
/// Final XOR: 0x0000
/// Check Value: 0x4B37 (for "123456789")
/// Residue: 0x0000
pub const MODBUS_CRC: Algorithm<u16> = Algorithm {
    width: 16,
    poly: 0x8005,
    init: 0xFFFF,
    refin: true,
    refout: true,
    xorout: 0x0000,
    check: 0x4B37,
    residue: 0x0000,
};

const CRC_COMPUTER: Crc<u16> = Crc::<u16>::new(&MODBUS_CRC);

/// Number of CRC bytes trailing every RTU frame.
pub const CRC_LEN: usize = 2;

/// Calculates the Modbus CRC16 over `data`.
///
/// The calculation covers every byte of the frame from the slave address up
/// to, but not including, the CRC itself.
#[inline]
pub fn calculate_crc16(data: &[u8]) -> u16 {
    CRC_COMPUTER.checksum(data)
}

/// Encodes a CRC for the wire, low byte first.
#[inline]
pub fn encode_crc(crc_value: u16) -> [u8; 2] {
    crc_value.to_le_bytes()
}

/// Decodes a wire CRC (low byte first).
///
/// # Panics
///
/// Panics if `crc_bytes` does not have a length of exactly 2.
pub fn decode_crc(crc_bytes: &[u8]) -> u16 {
    assert_eq!(crc_bytes.len(), CRC_LEN, "Modbus CRC must be 2 bytes long");
    u16::from_le_bytes([crc_bytes[0], crc_bytes[1]])
}

/// Splits a frame into `(received, calculated)` CRC values.
///
/// Returns `None` when the frame cannot even hold a CRC.
pub fn frame_crcs(frame: &[u8]) -> Option<(u16, u16)> {
    if frame.len() < CRC_LEN {
        return None;
    }
    let data_len = frame.len() - CRC_LEN;
    let received = decode_crc(&frame[data_len..]);
    let calculated = calculate_crc16(&frame[..data_len]);
    Some((received, calculated))
}

/// Checks that the last two bytes of `frame` are the CRC of everything before them.
///
/// Frames shorter than the CRC itself never verify.
pub fn verify_frame_crc(frame: &[u8]) -> bool {
    matches!(frame_crcs(frame), Some((received, calculated)) if received == calculated)
}
