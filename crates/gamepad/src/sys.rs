//! Linux evdev and inotify bindings
//!
//! This module implements the [`crate::ports`] traits using:
//! - `/dev/input/event*` opened `O_RDONLY | O_NONBLOCK`
//! - `EVIOCGBIT`, `EVIOCGID`, `EVIOCGNAME` and `EVIOCGABS` ioctls
//! - `inotify_init1(IN_NONBLOCK)` for hotplug notifications
//!
//! Every ioctl writes into a plain byte buffer that the protocol crate
//! decodes; no `#[repr(C)]` mirror of a kernel struct is used.

use crate::ports::{ChangeSource, DeviceBackend, EventDevice};
use openpad_evdev_protocol::inotify::{IN_ATTRIB, IN_CREATE, IN_DELETE};
use openpad_evdev_protocol::ioctl::{self, NAME_BUFFER_LEN};
use openpad_evdev_protocol::{AbsInfo, CapabilityBits, CapabilityClass, InputId};
use std::ffi::CString;
use std::fs::{File, OpenOptions};
use std::io::{self, Read};
use std::os::fd::{AsRawFd, FromRawFd, OwnedFd, RawFd};
use std::os::unix::ffi::OsStrExt;
use std::os::unix::fs::OpenOptionsExt;
use std::path::Path;
use tracing::debug;

/// Issue a read-direction ioctl that fills `buf`.
fn ioctl_read(fd: RawFd, request: u32, buf: &mut [u8]) -> io::Result<usize> {
    // SAFETY: every request passed here encodes a size no larger than
    // `buf.len()`, so the kernel writes only inside `buf`.
    let rc = unsafe { libc::ioctl(fd, libc::c_ulong::from(request), buf.as_mut_ptr()) };
    if rc < 0 {
        return Err(io::Error::last_os_error());
    }
    Ok(usize::try_from(rc).unwrap_or(0))
}

fn parse_c_string(bytes: &[u8]) -> String {
    let nul_idx = bytes.iter().position(|b| *b == 0).unwrap_or(bytes.len());
    String::from_utf8_lossy(&bytes[..nul_idx]).into_owned()
}

/// Backend over the real device filesystem.
#[derive(Debug, Default, Clone, Copy)]
pub struct EvdevBackend;

impl EvdevBackend {
    pub fn new() -> Self {
        Self
    }
}

impl DeviceBackend for EvdevBackend {
    fn open_device(&self, path: &Path) -> io::Result<Box<dyn EventDevice>> {
        Ok(Box::new(EvdevDevice::open(path)?))
    }

    fn watch_directory(&self, dir: &Path) -> io::Result<Box<dyn ChangeSource>> {
        Ok(Box::new(InotifyWatch::new(dir)?))
    }
}

/// An open `/dev/input/event*` node.
#[derive(Debug)]
pub struct EvdevDevice {
    file: Option<File>,
}

impl EvdevDevice {
    pub fn open(path: &Path) -> io::Result<Self> {
        let file = OpenOptions::new()
            .read(true)
            .custom_flags(libc::O_NONBLOCK)
            .open(path)?;
        Ok(Self { file: Some(file) })
    }

    fn fd(&self) -> io::Result<RawFd> {
        self.file
            .as_ref()
            .map(AsRawFd::as_raw_fd)
            .ok_or_else(|| io::Error::from_raw_os_error(libc::EBADF))
    }
}

impl EventDevice for EvdevDevice {
    fn capabilities(&self, class: CapabilityClass) -> io::Result<CapabilityBits> {
        let mut bits = CapabilityBits::empty(class);
        let len = bits.as_bytes().len();
        ioctl_read(
            self.fd()?,
            ioctl::eviocgbit(class.event_type(), len),
            bits.as_bytes_mut(),
        )?;
        Ok(bits)
    }

    fn input_id(&self) -> io::Result<InputId> {
        let mut buf = [0u8; InputId::SIZE];
        ioctl_read(self.fd()?, ioctl::EVIOCGID, &mut buf)?;
        InputId::decode(&buf).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
    }

    fn name(&self) -> io::Result<String> {
        let mut buf = [0u8; NAME_BUFFER_LEN];
        let copied = ioctl_read(self.fd()?, ioctl::eviocgname(buf.len()), &mut buf)?;
        Ok(parse_c_string(&buf[..copied.min(buf.len())]))
    }

    fn abs_info(&self, code: u16) -> io::Result<AbsInfo> {
        let mut buf = [0u8; AbsInfo::SIZE];
        ioctl_read(self.fd()?, ioctl::eviocgabs(code), &mut buf)?;
        AbsInfo::decode(&buf).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
    }

    fn read_record(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match self.file.as_mut() {
            Some(file) => file.read(buf),
            None => Err(io::Error::from_raw_os_error(libc::EBADF)),
        }
    }

    fn close(&mut self) {
        if let Some(file) = self.file.take() {
            debug!("Closing evdev fd {}", file.as_raw_fd());
            drop(file);
        }
    }

    fn is_closed(&self) -> bool {
        self.file.is_none()
    }
}

/// A non-blocking inotify descriptor watching one directory.
#[derive(Debug)]
pub struct InotifyWatch {
    file: File,
    watch: libc::c_int,
}

impl InotifyWatch {
    pub fn new(dir: &Path) -> io::Result<Self> {
        // SAFETY: inotify_init1 takes no pointers.
        let raw = unsafe { libc::inotify_init1(libc::IN_NONBLOCK | libc::IN_CLOEXEC) };
        if raw < 0 {
            return Err(io::Error::last_os_error());
        }
        // SAFETY: `raw` is a fresh descriptor returned above and owned by nobody else.
        let owned = unsafe { OwnedFd::from_raw_fd(raw) };
        let file = File::from(owned);

        let c_dir = CString::new(dir.as_os_str().as_bytes())
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))?;
        // Register for IN_ATTRIB as well: udev fixes permissions after the
        // node is created, and only then can it be opened.
        // SAFETY: `c_dir` is a valid NUL-terminated string for the duration of the call.
        let watch = unsafe {
            libc::inotify_add_watch(file.as_raw_fd(), c_dir.as_ptr(), IN_CREATE | IN_ATTRIB | IN_DELETE)
        };
        if watch < 0 {
            return Err(io::Error::last_os_error());
        }
        Ok(Self { file, watch })
    }

    pub fn watch_descriptor(&self) -> libc::c_int {
        self.watch
    }
}

impl ChangeSource for InotifyWatch {
    fn read_changes(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.file.read(buf)
    }
}
