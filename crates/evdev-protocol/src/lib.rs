//! Raw Linux input protocol for OpenPad
//!
//! This crate holds the data side of the evdev gamepad backend: event codes,
//! capability bitmaps, ioctl request numbers and fixed-layout decoding of the
//! kernel records the backend reads. It performs no I/O.
//!
//! ## Features
//! - `input_event` decoding with explicit per-platform field offsets
//! - `input_absinfo` / `input_id` decoding and axis normalization
//! - Stable 32-hex-digit identity strings for mapping-database lookups
//! - Hat direction bitmask
//! - `inotify_event` record parsing for hotplug

#![deny(unsafe_op_in_unsafe_fn)]
#![deny(clippy::unwrap_used)]

pub mod absinfo;
pub mod bits;
pub mod codes;
pub mod event;
pub mod hat;
pub mod identity;
pub mod inotify;
pub mod ioctl;

pub use absinfo::*;
pub use bits::*;
pub use event::*;
pub use hat::*;
pub use identity::*;
pub use inotify::{NotifyMask, NotifyRecord};

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProtocolError {
    #[error("Truncated {what}: expected {expected} bytes, got {actual}")]
    Truncated {
        what: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("Invalid record: {0}")]
    InvalidRecord(String),
}

pub type ProtocolResult<T> = Result<T, ProtocolError>;

/// Require at least `expected` bytes, returning the leading slice.
pub(crate) fn take<'a>(
    data: &'a [u8],
    expected: usize,
    what: &'static str,
) -> ProtocolResult<&'a [u8]> {
    data.get(..expected).ok_or(ProtocolError::Truncated {
        what,
        expected,
        actual: data.len(),
    })
}

pub(crate) fn le_u16(data: &[u8], offset: usize) -> u16 {
    u16::from_le_bytes([data[offset], data[offset + 1]])
}

pub(crate) fn le_u32(data: &[u8], offset: usize) -> u32 {
    u32::from_le_bytes([
        data[offset],
        data[offset + 1],
        data[offset + 2],
        data[offset + 3],
    ])
}

pub(crate) fn le_i32(data: &[u8], offset: usize) -> i32 {
    i32::from_le_bytes([
        data[offset],
        data[offset + 1],
        data[offset + 2],
        data[offset + 3],
    ])
}
