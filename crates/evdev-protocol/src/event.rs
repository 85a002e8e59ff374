//! `struct input_event` decoding
//!
//! The record starts with a `struct timeval` whose width follows the
//! platform's `long`, so the offsets of `type`, `code` and `value` move
//! between 32-bit and 64-bit targets. Fields are extracted from explicit byte
//! ranges, little-endian; the timestamp is never decoded.

use crate::codes::{EV_ABS, EV_KEY, EV_SYN, SYN_DROPPED, SYN_REPORT};
use crate::{ProtocolResult, le_i32, le_u16, take};

/// Byte layout of one `input_event` record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EventLayout {
    time_len: usize,
}

impl EventLayout {
    /// 64-bit `long` (x86_64, aarch64): 24-byte records.
    pub const LP64: Self = Self { time_len: 16 };

    /// 32-bit `long` (i686, armv7): 16-byte records.
    pub const ILP32: Self = Self { time_len: 8 };

    /// Layout of the running target.
    #[cfg(target_pointer_width = "64")]
    pub const NATIVE: Self = Self::LP64;
    #[cfg(not(target_pointer_width = "64"))]
    pub const NATIVE: Self = Self::ILP32;

    /// Largest record size of any supported layout.
    pub const MAX_SIZE: usize = 24;

    pub const fn type_offset(self) -> usize {
        self.time_len
    }

    pub const fn code_offset(self) -> usize {
        self.time_len + 2
    }

    pub const fn value_offset(self) -> usize {
        self.time_len + 4
    }

    /// Total record size.
    pub const fn size(self) -> usize {
        self.time_len + 8
    }
}

impl Default for EventLayout {
    fn default() -> Self {
        Self::NATIVE
    }
}

/// The three consumed fields of an `input_event`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InputEvent {
    pub event_type: u16,
    pub code: u16,
    pub value: i32,
}

impl InputEvent {
    pub const fn new(event_type: u16, code: u16, value: i32) -> Self {
        Self {
            event_type,
            code,
            value,
        }
    }

    pub const fn key(code: u16, value: i32) -> Self {
        Self::new(EV_KEY, code, value)
    }

    pub const fn abs(code: u16, value: i32) -> Self {
        Self::new(EV_ABS, code, value)
    }

    pub const fn syn_report() -> Self {
        Self::new(EV_SYN, SYN_REPORT, 0)
    }

    pub const fn syn_dropped() -> Self {
        Self::new(EV_SYN, SYN_DROPPED, 0)
    }

    /// Decode one record. Bytes beyond `layout.size()` are ignored.
    pub fn decode(data: &[u8], layout: EventLayout) -> ProtocolResult<Self> {
        let record = take(data, layout.size(), "input_event")?;
        Ok(Self {
            event_type: le_u16(record, layout.type_offset()),
            code: le_u16(record, layout.code_offset()),
            value: le_i32(record, layout.value_offset()),
        })
    }

    /// Encode as a record with a zeroed timestamp.
    pub fn encode(&self, layout: EventLayout) -> Vec<u8> {
        let mut record = vec![0u8; layout.size()];
        let t = layout.type_offset();
        let c = layout.code_offset();
        let v = layout.value_offset();
        record[t..t + 2].copy_from_slice(&self.event_type.to_le_bytes());
        record[c..c + 2].copy_from_slice(&self.code.to_le_bytes());
        record[v..v + 4].copy_from_slice(&self.value.to_le_bytes());
        record
    }

    pub fn is_syn(&self) -> bool {
        self.event_type == EV_SYN
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ProtocolError;
    use crate::codes::*;

    #[test]
    fn test_layout_sizes() {
        assert_eq!(EventLayout::LP64.size(), 24);
        assert_eq!(EventLayout::ILP32.size(), 16);
        assert_eq!(EventLayout::LP64.value_offset(), 20);
        assert_eq!(EventLayout::ILP32.type_offset(), 8);
        assert!(EventLayout::NATIVE.size() <= EventLayout::MAX_SIZE);
    }

    #[test]
    fn test_decode_lp64() -> Result<(), Box<dyn std::error::Error>> {
        let mut record = [0xAAu8; 24];
        // type = EV_ABS, code = ABS_HAT0Y, value = -1
        record[16..24].copy_from_slice(&[0x03, 0x00, 0x11, 0x00, 0xFF, 0xFF, 0xFF, 0xFF]);
        let event = InputEvent::decode(&record, EventLayout::LP64)?;
        assert_eq!(event, InputEvent::abs(ABS_HAT0Y, -1));
        Ok(())
    }

    #[test]
    fn test_decode_ilp32() -> Result<(), Box<dyn std::error::Error>> {
        // Same layout the reMarkable tablet emits: 8-byte timeval.
        let record = [
            0, 0, 0, 0, 0, 0, 0, 0, 0x01, 0x00, 0x30, 0x01, 0x01, 0x00, 0x00, 0x00,
        ];
        let event = InputEvent::decode(&record, EventLayout::ILP32)?;
        assert_eq!(event, InputEvent::key(BTN_SOUTH, 1));
        Ok(())
    }

    #[test]
    fn test_decode_short_record() {
        let result = InputEvent::decode(&[0u8; 20], EventLayout::LP64);
        assert_eq!(
            result,
            Err(ProtocolError::Truncated {
                what: "input_event",
                expected: 24,
                actual: 20,
            })
        );
    }

    #[test]
    fn test_encode_places_fields() {
        let record = InputEvent::syn_dropped().encode(EventLayout::LP64);
        assert_eq!(record.len(), 24);
        assert!(record[..16].iter().all(|&b| b == 0));
        assert_eq!(&record[16..20], &[0x00, 0x00, 0x03, 0x00]);
    }
}
