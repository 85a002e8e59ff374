//! `struct input_absinfo` and axis normalization

use crate::{ProtocolResult, le_i32, take};
use serde::{Deserialize, Serialize};

/// Calibration and current value of one absolute axis (`EVIOCGABS`).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AbsInfo {
    pub value: i32,
    pub minimum: i32,
    pub maximum: i32,
    pub fuzz: i32,
    pub flat: i32,
    pub resolution: i32,
}

impl AbsInfo {
    /// Six `__s32` fields.
    pub const SIZE: usize = 24;

    pub const fn new(value: i32, minimum: i32, maximum: i32) -> Self {
        Self {
            value,
            minimum,
            maximum,
            fuzz: 0,
            flat: 0,
            resolution: 0,
        }
    }

    pub fn decode(data: &[u8]) -> ProtocolResult<Self> {
        let record = take(data, Self::SIZE, "input_absinfo")?;
        Ok(Self {
            value: le_i32(record, 0),
            minimum: le_i32(record, 4),
            maximum: le_i32(record, 8),
            fuzz: le_i32(record, 12),
            flat: le_i32(record, 16),
            resolution: le_i32(record, 20),
        })
    }

    pub fn encode(&self) -> [u8; Self::SIZE] {
        let mut out = [0u8; Self::SIZE];
        let fields = [
            self.value,
            self.minimum,
            self.maximum,
            self.fuzz,
            self.flat,
            self.resolution,
        ];
        for (chunk, field) in out.chunks_exact_mut(4).zip(fields) {
            chunk.copy_from_slice(&field.to_le_bytes());
        }
        out
    }

    /// Map `value` onto `[-1, 1]` using this axis' range.
    pub fn normalize(&self, value: i32) -> f64 {
        normalize_axis(value, self.minimum, self.maximum)
    }
}

/// `((value - min) / (max - min)) * 2 - 1`.
///
/// A degenerate range (`max == min`) returns `value` unchanged.
pub fn normalize_axis(value: i32, minimum: i32, maximum: i32) -> f64 {
    if maximum == minimum {
        return f64::from(value);
    }
    let range = f64::from(maximum) - f64::from(minimum);
    let v = (f64::from(value) - f64::from(minimum)) / range;
    v * 2.0 - 1.0
}
