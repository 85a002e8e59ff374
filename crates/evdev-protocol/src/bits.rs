//! Capability bitmaps as returned by `EVIOCGBIT`

use crate::codes::{ABS_CNT, EV_CNT, KEY_CNT};

/// Byte length of a bitmap able to hold `count` bits.
pub const fn bitmap_len(count: usize) -> usize {
    count.div_ceil(8)
}

/// Test bit `bit` of a kernel bitmap (least significant bit first).
///
/// Bits beyond the end of `bytes` read as unset.
pub fn is_bit_set(bytes: &[u8], bit: usize) -> bool {
    bytes
        .get(bit / 8)
        .is_some_and(|byte| byte & (1 << (bit % 8)) != 0)
}

/// Which bitmap an `EVIOCGBIT` query returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CapabilityClass {
    /// Supported event types (`EV_*`).
    EventTypes,
    /// Supported key and button codes.
    Keys,
    /// Supported absolute axis codes.
    AbsAxes,
}

impl CapabilityClass {
    /// Event type passed as the `ev` argument of `EVIOCGBIT`.
    pub fn event_type(self) -> u16 {
        match self {
            Self::EventTypes => 0,
            Self::Keys => crate::codes::EV_KEY,
            Self::AbsAxes => crate::codes::EV_ABS,
        }
    }

    /// Number of codes in this class.
    pub fn code_count(self) -> usize {
        match self {
            Self::EventTypes => EV_CNT,
            Self::Keys => KEY_CNT,
            Self::AbsAxes => ABS_CNT,
        }
    }

    pub fn byte_len(self) -> usize {
        bitmap_len(self.code_count())
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::EventTypes => "EVIOCGBIT(0)",
            Self::Keys => "EVIOCGBIT(EV_KEY)",
            Self::AbsAxes => "EVIOCGBIT(EV_ABS)",
        }
    }
}

/// Owned capability bitmap for one class.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapabilityBits {
    class: CapabilityClass,
    bytes: Vec<u8>,
}

impl CapabilityBits {
    pub fn empty(class: CapabilityClass) -> Self {
        Self {
            class,
            bytes: vec![0u8; class.byte_len()],
        }
    }

    /// Wrap raw ioctl output. Short buffers are zero-extended, long ones cut.
    pub fn from_bytes(class: CapabilityClass, data: &[u8]) -> Self {
        let mut bits = Self::empty(class);
        let len = data.len().min(bits.bytes.len());
        bits.bytes[..len].copy_from_slice(&data[..len]);
        bits
    }

    pub fn from_codes(class: CapabilityClass, codes: &[u16]) -> Self {
        let mut bits = Self::empty(class);
        for &code in codes {
            bits.set(code);
        }
        bits
    }

    pub fn class(&self) -> CapabilityClass {
        self.class
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn as_bytes_mut(&mut self) -> &mut [u8] {
        &mut self.bytes
    }

    pub fn has(&self, code: u16) -> bool {
        is_bit_set(&self.bytes, usize::from(code))
    }

    /// Set `code`; codes outside the class range are ignored.
    pub fn set(&mut self, code: u16) {
        let code = usize::from(code);
        if let Some(byte) = self.bytes.get_mut(code / 8) {
            *byte |= 1 << (code % 8);
        }
    }

    /// Supported codes in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = u16> + '_ {
        (0..self.class.code_count())
            .filter(|&bit| is_bit_set(&self.bytes, bit))
            .filter_map(|bit| u16::try_from(bit).ok())
    }

    pub fn count(&self) -> usize {
        self.bytes.iter().map(|b| b.count_ones() as usize).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codes::*;

    #[test]
    fn test_bitmap_lengths() {
        assert_eq!(CapabilityClass::EventTypes.byte_len(), 4);
        assert_eq!(CapabilityClass::Keys.byte_len(), 96);
        assert_eq!(CapabilityClass::AbsAxes.byte_len(), 8);
    }

    #[test]
    fn test_is_bit_set() {
        let bytes = [0b0000_1010u8, 0x80];
        assert!(!is_bit_set(&bytes, 0));
        assert!(is_bit_set(&bytes, 1));
        assert!(is_bit_set(&bytes, 3));
        assert!(is_bit_set(&bytes, 15));
        assert!(!is_bit_set(&bytes, 16));
        assert!(!is_bit_set(&bytes, 1000));
    }

    #[test]
    fn test_event_type_bits() {
        let bits = CapabilityBits::from_bytes(CapabilityClass::EventTypes, &[0x0B]);
        assert!(bits.has(EV_SYN));
        assert!(bits.has(EV_KEY));
        assert!(!bits.has(EV_REL));
        assert!(bits.has(EV_ABS));
    }

    #[test]
    fn test_iter_ascending() {
        let bits = CapabilityBits::from_codes(
            CapabilityClass::Keys,
            &[BTN_START, KEY_A, BTN_SOUTH, BTN_EAST],
        );
        let codes: Vec<u16> = bits.iter().collect();
        assert_eq!(codes, vec![KEY_A, BTN_SOUTH, BTN_EAST, BTN_START]);
        assert_eq!(bits.count(), 4);
    }

    #[test]
    fn test_set_out_of_range_is_ignored() {
        let mut bits = CapabilityBits::empty(CapabilityClass::AbsAxes);
        bits.set(200);
        assert_eq!(bits.count(), 0);
    }

    #[test]
    fn test_from_bytes_resizes() {
        let bits = CapabilityBits::from_bytes(CapabilityClass::AbsAxes, &[0xFF; 32]);
        assert_eq!(bits.as_bytes().len(), 8);
        assert_eq!(bits.count(), 64);
    }
}
