//! EDID header validation and the DDC transport used by digital monitor probing.
//!
//! Digital connector detection does not parse full EDID: presence is decided by whether the
//! monitor's identification EEPROM answers on the DDC address and returns a plausible 8-byte
//! EDID header. Full block reads are offered for callers that want to hand the EDID to a
//! mode-selection policy, but header validity is the only thing the detection paths consume:
//! it decides whether detected display metadata should be trusted over built-in timing
//! tables.

/// Size of one EDID block.
pub const EDID_BLOCK_SIZE: usize = 128;

/// The fixed 8-byte EDID block-0 header.
pub const EDID_HEADER: [u8; 8] = [0x00, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0x00];

/// 7-bit DDC address of the EDID EEPROM.
pub const DDC_EDID_ADDRESS: u8 = 0x50;

/// Number of leading bytes of `block` that match the EDID header, 0..=8.
///
/// Marginal links corrupt individual header bytes; callers that tolerate single-bit damage
/// can accept a score of 6 or 7, while the detection paths here require a perfect 8.
pub fn header_score(block: &[u8]) -> usize {
    block
        .iter()
        .zip(EDID_HEADER.iter())
        .take_while(|(a, b)| a == b)
        .count()
}

/// Whether `block` starts with a bit-exact EDID header.
pub fn header_is_valid(block: &[u8]) -> bool {
    header_score(block) == EDID_HEADER.len()
}

/// Whether a full EDID block's bytes sum to zero (mod 256).
pub fn checksum_ok(block: &[u8; EDID_BLOCK_SIZE]) -> bool {
    block.iter().fold(0u8, |acc, &b| acc.wrapping_add(b)) == 0
}

/// Byte-level access to a monitor identification EEPROM over DDC.
///
/// Implemented externally by either the hardware-assisted I2C engine or a bit-banged GPIO
/// transport; this crate does not arbitrate the bus. `read_byte` returns `None` when the
/// device does not acknowledge (nothing attached, or the link is down).
pub trait DdcTransport {
    fn read_byte(&mut self, address: u8, index: u8) -> Option<u8>;
    fn write_byte(&mut self, address: u8, index: u8, value: u8) -> bool;
}

impl<T: DdcTransport + ?Sized> DdcTransport for &mut T {
    fn read_byte(&mut self, address: u8, index: u8) -> Option<u8> {
        (**self).read_byte(address, index)
    }

    fn write_byte(&mut self, address: u8, index: u8, value: u8) -> bool {
        (**self).write_byte(address, index, value)
    }
}

/// Presence probe: read the first 8 bytes from the EDID address and validate the header.
///
/// A `false` result is the ordinary "nothing attached" steady state, not an error.
pub fn probe_ddc<T: DdcTransport>(transport: &mut T) -> bool {
    let mut header = [0u8; 8];
    for (i, byte) in header.iter_mut().enumerate() {
        match transport.read_byte(DDC_EDID_ADDRESS, i as u8) {
            Some(b) => *byte = b,
            None => return false,
        }
    }
    header_is_valid(&header)
}

/// Read EDID block 0, returning it only if the header validates.
///
/// The checksum is deliberately not enforced here: real monitors ship with broken checksums
/// often enough that the original detection logic trusts the header alone. Callers can apply
/// [`checksum_ok`] when they need stricter validation.
pub fn read_base_block<T: DdcTransport>(transport: &mut T) -> Option<[u8; EDID_BLOCK_SIZE]> {
    let mut block = [0u8; EDID_BLOCK_SIZE];
    for (i, byte) in block.iter_mut().enumerate() {
        *byte = transport.read_byte(DDC_EDID_ADDRESS, i as u8)?;
    }
    if header_is_valid(&block) {
        Some(block)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn header_score_counts_leading_matches() {
        assert_eq!(header_score(&EDID_HEADER), 8);
        let mut damaged = EDID_HEADER;
        damaged[3] = 0x7F;
        assert_eq!(header_score(&damaged), 3);
        assert_eq!(header_score(&[]), 0);
    }

    #[test]
    fn header_is_valid_requires_all_eight_bytes() {
        assert!(header_is_valid(&EDID_HEADER));
        assert!(!header_is_valid(&EDID_HEADER[..7]));
        let mut damaged = EDID_HEADER;
        damaged[7] = 0x01;
        assert!(!header_is_valid(&damaged));
    }
}
