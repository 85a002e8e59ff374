//! evdev ioctl request numbers
//!
//! Encoded with the generic `_IOC` layout used by x86, ARM and RISC-V.

use crate::absinfo::AbsInfo;
use crate::identity::InputId;

const IOC_NRBITS: u32 = 8;
const IOC_TYPEBITS: u32 = 8;
const IOC_SIZEBITS: u32 = 14;
const IOC_NRSHIFT: u32 = 0;
const IOC_TYPESHIFT: u32 = IOC_NRSHIFT + IOC_NRBITS;
const IOC_SIZESHIFT: u32 = IOC_TYPESHIFT + IOC_TYPEBITS;
const IOC_DIRSHIFT: u32 = IOC_SIZESHIFT + IOC_SIZEBITS;
const IOC_SIZEMASK: u32 = (1 << IOC_SIZEBITS) - 1;
pub const IOC_READ: u32 = 2;

const EVDEV_IOCTL_TYPE: u8 = b'E';
const EVIOC_NR_GID: u8 = 0x02;
const EVIOC_NR_GNAME: u8 = 0x06;
const EVIOC_NR_GBIT: u8 = 0x20;
const EVIOC_NR_GABS: u8 = 0x40;

/// Longest name buffer passed to `EVIOCGNAME`.
pub const NAME_BUFFER_LEN: usize = 256;

const fn ioctl_code(direction: u32, kind: u8, nr: u8, size: usize) -> u32 {
    (direction << IOC_DIRSHIFT)
        | ((kind as u32) << IOC_TYPESHIFT)
        | ((nr as u32) << IOC_NRSHIFT)
        | (((size as u32) & IOC_SIZEMASK) << IOC_SIZESHIFT)
}

const fn ior_len(nr: u8, len: usize) -> u32 {
    ioctl_code(IOC_READ, EVDEV_IOCTL_TYPE, nr, len)
}

/// `EVIOCGID`: read `struct input_id`.
pub const EVIOCGID: u32 = ior_len(EVIOC_NR_GID, InputId::SIZE);

/// `EVIOCGNAME(len)`: read the device name.
pub const fn eviocgname(len: usize) -> u32 {
    ior_len(EVIOC_NR_GNAME, len)
}

/// `EVIOCGBIT(ev, len)`: read the capability bitmap of event type `ev`
/// (`0` for the event-type bitmap itself).
pub const fn eviocgbit(ev: u16, len: usize) -> u32 {
    ior_len(EVIOC_NR_GBIT.wrapping_add(ev as u8), len)
}

/// `EVIOCGABS(abs)`: read `struct input_absinfo` for one axis.
pub const fn eviocgabs(abs: u16) -> u32 {
    ior_len(EVIOC_NR_GABS.wrapping_add(abs as u8), AbsInfo::SIZE)
}

/// Direction bits of a request number.
pub const fn direction(request: u32) -> u32 {
    request >> IOC_DIRSHIFT
}

/// Size field of a request number.
pub const fn size(request: u32) -> usize {
    ((request >> IOC_SIZESHIFT) & IOC_SIZEMASK) as usize
}
