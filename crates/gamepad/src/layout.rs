//! Hardware code to compact slot maps
//!
//! Buttons and axes are numbered in ascending hardware-code order so the
//! same device always yields the same slots.
//!
//! Hat precondition: the kernel numbers hat codes as contiguous X/Y pairs
//! (`ABS_HAT0X`, `ABS_HAT0Y`, `ABS_HAT1X`, ...), X first. One hat slot is
//! assigned per pair in which either code is supported, and both codes of the
//! pair resolve to that slot.

use openpad_evdev_protocol::CapabilityBits;
use openpad_evdev_protocol::codes::{
    ABS_CNT, ABS_HAT0X, ABS_HAT3Y, BTN_MISC, BUTTON_CODE_CNT, is_hat_code,
};

/// Where an absolute code lands in the compact state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum AbsSlot {
    #[default]
    Unmapped,
    Axis(usize),
    Hat(usize),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControlLayout {
    buttons: Vec<Option<usize>>,
    abs: [AbsSlot; ABS_CNT],
    axis_count: usize,
    button_count: usize,
    hat_count: usize,
}

impl ControlLayout {
    pub fn from_capabilities(keys: &CapabilityBits, abs: &CapabilityBits) -> Self {
        let mut buttons = vec![None; BUTTON_CODE_CNT];
        let mut button_count = 0;
        for code in keys.iter().filter(|&code| code >= BTN_MISC) {
            if let Some(slot) = buttons.get_mut(usize::from(code - BTN_MISC)) {
                *slot = Some(button_count);
                button_count += 1;
            }
        }

        let mut abs_map = [AbsSlot::Unmapped; ABS_CNT];
        let mut axis_count = 0;
        for code in abs.iter().filter(|&code| !is_hat_code(code)) {
            if let Some(slot) = abs_map.get_mut(usize::from(code)) {
                *slot = AbsSlot::Axis(axis_count);
                axis_count += 1;
            }
        }

        let mut hat_count = 0;
        for x in (ABS_HAT0X..=ABS_HAT3Y).step_by(2) {
            let y = x + 1;
            if !abs.has(x) && !abs.has(y) {
                continue;
            }
            for code in [x, y] {
                if abs.has(code) {
                    abs_map[usize::from(code)] = AbsSlot::Hat(hat_count);
                }
            }
            hat_count += 1;
        }

        Self {
            buttons,
            abs: abs_map,
            axis_count,
            button_count,
            hat_count,
        }
    }

    pub fn axis_count(&self) -> usize {
        self.axis_count
    }

    pub fn button_count(&self) -> usize {
        self.button_count
    }

    pub fn hat_count(&self) -> usize {
        self.hat_count
    }

    /// Button slot for a key code; codes below `BTN_MISC` have none.
    pub fn button_slot(&self, code: u16) -> Option<usize> {
        let index = code.checked_sub(BTN_MISC)?;
        self.buttons.get(usize::from(index)).copied().flatten()
    }

    pub fn abs_slot(&self, code: u16) -> AbsSlot {
        self.abs
            .get(usize::from(code))
            .copied()
            .unwrap_or_default()
    }

    /// Every mapped absolute code with its slot, ascending.
    pub fn mapped_abs(&self) -> impl Iterator<Item = (u16, AbsSlot)> + '_ {
        self.abs
            .iter()
            .enumerate()
            .filter(|(_, slot)| **slot != AbsSlot::Unmapped)
            .filter_map(|(code, slot)| u16::try_from(code).ok().map(|code| (code, *slot)))
    }

    /// Mapped non-hat axis codes, ascending.
    pub fn axis_codes(&self) -> impl Iterator<Item = u16> + '_ {
        self.mapped_abs()
            .filter(|(_, slot)| matches!(slot, AbsSlot::Axis(_)))
            .map(|(code, _)| code)
    }
}
