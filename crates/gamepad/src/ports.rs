//! Port traits between the driver and the operating system
//!
//! The prober, state machine and watcher only talk to the kernel through
//! these traits. [`crate::sys`] implements them with real file descriptors;
//! [`crate::mock`] implements them in memory for tests.

use openpad_evdev_protocol::{AbsInfo, CapabilityBits, CapabilityClass, InputId};
use std::io;
use std::path::Path;

/// One open event node.
///
/// Implementations own their descriptor exclusively. `close` must be
/// idempotent and dropping an open handle must close it.
pub trait EventDevice: Send {
    /// `EVIOCGBIT` for one capability class.
    fn capabilities(&self, class: CapabilityClass) -> io::Result<CapabilityBits>;

    /// `EVIOCGID`.
    fn input_id(&self) -> io::Result<InputId>;

    /// `EVIOCGNAME`.
    fn name(&self) -> io::Result<String>;

    /// `EVIOCGABS` for one absolute axis code.
    fn abs_info(&self, code: u16) -> io::Result<AbsInfo>;

    /// Non-blocking read of at most one record into `buf`.
    ///
    /// An empty queue is reported as [`io::ErrorKind::WouldBlock`]; a
    /// disconnected device as `ENODEV`.
    fn read_record(&mut self, buf: &mut [u8]) -> io::Result<usize>;

    fn close(&mut self);

    fn is_closed(&self) -> bool;
}

/// A directory change-notification stream.
pub trait ChangeSource: Send {
    /// Non-blocking read of raw notification records into `buf`.
    ///
    /// No pending records is reported as [`io::ErrorKind::WouldBlock`].
    fn read_changes(&mut self, buf: &mut [u8]) -> io::Result<usize>;
}

/// Opens event nodes and arms directory watches.
pub trait DeviceBackend: Send {
    fn open_device(&self, path: &Path) -> io::Result<Box<dyn EventDevice>>;

    /// Watch `dir` for create, attribute-change and delete notifications.
    fn watch_directory(&self, dir: &Path) -> io::Result<Box<dyn ChangeSource>>;
}
