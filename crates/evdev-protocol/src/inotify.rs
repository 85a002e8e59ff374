//! `struct inotify_event` parsing
//!
//! A read from an inotify descriptor returns back-to-back records: a 16-byte
//! header (`wd`, `mask`, `cookie`, `len`) followed by `len` bytes of
//! NUL-padded file name.

use crate::{ProtocolError, ProtocolResult, le_i32, le_u32, take};

pub const IN_ATTRIB: u32 = 0x0000_0004;
pub const IN_CREATE: u32 = 0x0000_0100;
pub const IN_DELETE: u32 = 0x0000_0200;
pub const IN_Q_OVERFLOW: u32 = 0x0000_4000;
pub const IN_IGNORED: u32 = 0x0000_8000;
pub const IN_ISDIR: u32 = 0x4000_0000;

/// Header size of one record.
pub const HEADER_SIZE: usize = 16;

/// `NAME_MAX + 1`: the longest name a record can carry.
pub const MAX_NAME_LEN: usize = 256;

/// Smallest read buffer guaranteed to hold one record.
pub const MIN_BUFFER_SIZE: usize = HEADER_SIZE + MAX_NAME_LEN;

/// Event mask of a record.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct NotifyMask(pub u32);

impl NotifyMask {
    pub fn is_create_or_attrib(self) -> bool {
        self.0 & (IN_CREATE | IN_ATTRIB) != 0
    }

    pub fn is_delete(self) -> bool {
        self.0 & IN_DELETE != 0
    }

    pub fn is_overflow(self) -> bool {
        self.0 & IN_Q_OVERFLOW != 0
    }
}

/// One decoded notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotifyRecord {
    pub wd: i32,
    pub mask: NotifyMask,
    pub cookie: u32,
    pub name: String,
}

impl NotifyRecord {
    pub fn new(wd: i32, mask: u32, name: impl Into<String>) -> Self {
        Self {
            wd,
            mask: NotifyMask(mask),
            cookie: 0,
            name: name.into(),
        }
    }

    /// Decode the record at the start of `data`, returning it together with
    /// the number of bytes it occupied.
    pub fn decode(data: &[u8]) -> ProtocolResult<(Self, usize)> {
        let header = take(data, HEADER_SIZE, "inotify_event")?;
        let wd = le_i32(header, 0);
        let mask = le_u32(header, 4);
        let cookie = le_u32(header, 8);
        let len = usize::try_from(le_u32(header, 12))
            .map_err(|e| ProtocolError::InvalidRecord(format!("inotify name length: {e}")))?;

        let total = HEADER_SIZE
            .checked_add(len)
            .ok_or_else(|| ProtocolError::InvalidRecord("inotify name length overflow".into()))?;
        let record = take(data, total, "inotify_event name")?;
        let raw_name = &record[HEADER_SIZE..];
        let end = raw_name.iter().position(|&b| b == 0).unwrap_or(raw_name.len());
        let name = String::from_utf8_lossy(&raw_name[..end]).into_owned();

        Ok((
            Self {
                wd,
                mask: NotifyMask(mask),
                cookie,
                name,
            },
            total,
        ))
    }

    /// Decode every record in a read buffer.
    pub fn decode_all(mut data: &[u8]) -> ProtocolResult<Vec<Self>> {
        let mut records = Vec::new();
        while !data.is_empty() {
            let (record, used) = Self::decode(data)?;
            records.push(record);
            data = &data[used..];
        }
        Ok(records)
    }

    /// Encode with the name NUL-padded to a multiple of four bytes, as the
    /// kernel does. An empty name encodes with `len == 0`.
    pub fn encode(&self) -> Vec<u8> {
        let name = self.name.as_bytes();
        let padded = if name.is_empty() {
            0
        } else {
            (name.len() + 1).next_multiple_of(4)
        };
        let mut out = Vec::with_capacity(HEADER_SIZE + padded);
        out.extend_from_slice(&self.wd.to_le_bytes());
        out.extend_from_slice(&self.mask.0.to_le_bytes());
        out.extend_from_slice(&self.cookie.to_le_bytes());
        out.extend_from_slice(&u32::try_from(padded).unwrap_or(u32::MAX).to_le_bytes());
        out.extend_from_slice(name);
        out.resize(HEADER_SIZE + padded, 0);
        out
    }
}
