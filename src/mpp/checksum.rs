use serde::Serialize;

/// 16-bit frame checksum.
///
/// CRC-16/XMODEM with one MPP Solar twist: after the CRC is computed, any
/// result byte that collides with a reserved wire byte - `(` (0x28), CR
/// (0x0d) or LF (0x0a) - is incremented so it can never be mistaken for a
/// frame marker or terminator.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Checksum(pub u16);

/// Bytes the protocol reserves for framing; a checksum byte may not equal any
/// of them.
const RESERVED_BYTES: [u8; 3] = [b'(', b'\r', b'\n'];

impl Checksum {
    /// Wire size of an encoded checksum.
    pub const LENGTH: usize = 2;

    /// Computes the checksum over `bytes`. Empty input yields zero.
    pub fn compute(bytes: &[u8]) -> Self {
        let crc = crc16::State::<crc16::XMODEM>::calculate(bytes);

        let [mut high, mut low] = crc.to_be_bytes();
        if RESERVED_BYTES.contains(&low) {
            low = low.wrapping_add(1);
        }
        if RESERVED_BYTES.contains(&high) {
            high = high.wrapping_add(1);
        }

        Self(u16::from_be_bytes([high, low]))
    }

    /// Checksum as it travels on the wire: two raw bytes, MSB first.
    pub fn to_bytes(self) -> [u8; 2] {
        self.0.to_be_bytes()
    }

    pub fn from_bytes(bytes: [u8; 2]) -> Self {
        Self(u16::from_be_bytes(bytes))
    }
}

impl From<u16> for Checksum {
    fn from(value: u16) -> Self {
        Self(value)
    }
}

impl std::fmt::Display for Checksum {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "0x{:04X}", self.0)
    }
}

impl std::fmt::Debug for Checksum {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Checksum(0x{:04X})", self.0)
    }
}
