//! Device identity: `struct input_id` and the mapping-database fingerprint
//!
//! The fingerprint is the 16-byte SDL-style GUID rendered as 32 lowercase hex
//! digits. With a full vendor/product/version triple it reads
//! `BBBB0000VVVV0000PPPP0000RRRR0000` (each field little-endian); otherwise the
//! display name stands in for the last twelve bytes.

use crate::{ProtocolResult, le_u16, take};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Bus and USB-style identity reported by `EVIOCGID`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct InputId {
    pub bustype: u16,
    pub vendor: u16,
    pub product: u16,
    pub version: u16,
}

impl InputId {
    pub const SIZE: usize = 8;

    pub const fn new(bustype: u16, vendor: u16, product: u16, version: u16) -> Self {
        Self {
            bustype,
            vendor,
            product,
            version,
        }
    }

    pub fn decode(data: &[u8]) -> ProtocolResult<Self> {
        let record = take(data, Self::SIZE, "input_id")?;
        Ok(Self {
            bustype: le_u16(record, 0),
            vendor: le_u16(record, 2),
            product: le_u16(record, 4),
            version: le_u16(record, 6),
        })
    }

    pub fn encode(&self) -> [u8; Self::SIZE] {
        let mut out = [0u8; Self::SIZE];
        out[0..2].copy_from_slice(&self.bustype.to_le_bytes());
        out[2..4].copy_from_slice(&self.vendor.to_le_bytes());
        out[4..6].copy_from_slice(&self.product.to_le_bytes());
        out[6..8].copy_from_slice(&self.version.to_le_bytes());
        out
    }

    /// Vendor, product and version are all reported.
    pub fn is_complete(&self) -> bool {
        self.vendor != 0 && self.product != 0 && self.version != 0
    }
}

/// Bytes of the display name folded into a GUID without a full identity.
pub const GUID_NAME_LEN: usize = 12;

/// Stable 16-byte device fingerprint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DeviceGuid([u8; 16]);

impl DeviceGuid {
    pub fn new(id: &InputId, name: &str) -> Self {
        let mut guid = [0u8; 16];
        guid[0..2].copy_from_slice(&id.bustype.to_le_bytes());
        if id.is_complete() {
            guid[4..6].copy_from_slice(&id.vendor.to_le_bytes());
            guid[8..10].copy_from_slice(&id.product.to_le_bytes());
            guid[12..14].copy_from_slice(&id.version.to_le_bytes());
        } else {
            let name = name.as_bytes();
            let len = name.len().min(GUID_NAME_LEN);
            guid[4..4 + len].copy_from_slice(&name[..len]);
        }
        Self(guid)
    }

    pub fn as_bytes(&self) -> &[u8; 16] {
        &self.0
    }
}

impl fmt::Display for DeviceGuid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in self.0 {
            write!(f, "{byte:02x}")?;
        }
        Ok(())
    }
}

/// Identity string handed to the mapping database.
pub fn identity_string(id: &InputId, name: &str) -> String {
    DeviceGuid::new(id, name).to_string()
}
