//! Hat switch state as a 4-direction bitmask

use crate::codes::{ABS_HAT0X, is_hat_code};
use serde::{Deserialize, Serialize};

/// Which half of a hat pair an `ABS_HATnX`/`ABS_HATnY` code drives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HatAxis {
    X,
    Y,
}

impl HatAxis {
    /// Sub-axis by code parity: X codes are even offsets from `ABS_HAT0X`.
    pub fn from_code(code: u16) -> Option<Self> {
        if !is_hat_code(code) {
            return None;
        }
        if (code - ABS_HAT0X) % 2 == 0 {
            Some(Self::X)
        } else {
            Some(Self::Y)
        }
    }
}

/// Directional bits of one hat. `CENTERED` is the empty mask.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct HatState(u8);

impl HatState {
    pub const CENTERED: Self = Self(0);
    pub const UP: Self = Self(1);
    pub const RIGHT: Self = Self(2);
    pub const DOWN: Self = Self(4);
    pub const LEFT: Self = Self(8);

    pub const fn from_bits(bits: u8) -> Self {
        Self(bits & 0x0F)
    }

    pub const fn bits(self) -> u8 {
        self.0
    }

    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0 && other.0 != 0
    }

    pub const fn is_centered(self) -> bool {
        self.0 == 0
    }

    /// Apply a raw hat value to one sub-axis, leaving the other untouched.
    ///
    /// Negative sets LEFT/UP, positive sets RIGHT/DOWN, zero clears both.
    pub fn apply(&mut self, axis: HatAxis, value: i32) {
        let (negative, positive) = match axis {
            HatAxis::X => (Self::LEFT.0, Self::RIGHT.0),
            HatAxis::Y => (Self::UP.0, Self::DOWN.0),
        };
        self.0 &= !(negative | positive);
        if value < 0 {
            self.0 |= negative;
        } else if value > 0 {
            self.0 |= positive;
        }
    }
}

impl std::ops::BitOr for HatState {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codes::*;

    #[test]
    fn test_axis_parity() {
        assert_eq!(HatAxis::from_code(ABS_HAT0X), Some(HatAxis::X));
        assert_eq!(HatAxis::from_code(ABS_HAT0Y), Some(HatAxis::Y));
        assert_eq!(HatAxis::from_code(ABS_HAT3X), Some(HatAxis::X));
        assert_eq!(HatAxis::from_code(ABS_HAT3Y), Some(HatAxis::Y));
        assert_eq!(HatAxis::from_code(ABS_X), None);
    }

    #[test]
    fn test_apply_x_keeps_y() {
        let mut hat = HatState::CENTERED;
        hat.apply(HatAxis::Y, -1);
        hat.apply(HatAxis::X, 1);
        assert_eq!(hat, HatState::UP | HatState::RIGHT);

        hat.apply(HatAxis::X, -1);
        assert_eq!(hat, HatState::UP | HatState::LEFT);

        hat.apply(HatAxis::X, 0);
        assert_eq!(hat, HatState::UP);

        hat.apply(HatAxis::Y, 0);
        assert!(hat.is_centered());
    }

    #[test]
    fn test_contains() {
        let hat = HatState::DOWN | HatState::LEFT;
        assert!(hat.contains(HatState::DOWN));
        assert!(!hat.contains(HatState::UP));
        assert!(!hat.contains(HatState::CENTERED));
    }
}
