//! In-memory backend for tests
//!
//! [`MockDevice`] describes one scripted event node. Clones share state, so a
//! test keeps a handle to push events, inject disconnects and count closes
//! after the device has been handed to a [`MockBackend`].
//!
//! Events and notifications travel as raw kernel records, so the decoding
//! path is exercised exactly as with real descriptors.

use crate::ports::{ChangeSource, DeviceBackend, EventDevice};
use openpad_evdev_protocol::codes::{EV_ABS, EV_KEY, EV_SYN};
use openpad_evdev_protocol::{
    AbsInfo, CapabilityBits, CapabilityClass, EventLayout, InputEvent, InputId, NotifyRecord,
};
use parking_lot::Mutex;
use std::collections::{BTreeMap, HashMap, VecDeque};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

fn errno(code: i32) -> io::Error {
    io::Error::from_raw_os_error(code)
}

#[derive(Debug)]
struct DeviceState {
    name: Option<String>,
    id: InputId,
    event_types: Option<Vec<u16>>,
    keys: Vec<u16>,
    abs: BTreeMap<u16, AbsInfo>,
    events: VecDeque<InputEvent>,
    layout: EventLayout,
    disconnected: bool,
    read_error: Option<i32>,
    query_error: Option<i32>,
    open_error: Option<i32>,
    open_count: usize,
    close_count: usize,
}

/// A scripted event node.
#[derive(Debug, Clone)]
pub struct MockDevice {
    state: Arc<Mutex<DeviceState>>,
}

impl MockDevice {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            state: Arc::new(Mutex::new(DeviceState {
                name: Some(name.into()),
                id: InputId::default(),
                event_types: None,
                keys: Vec::new(),
                abs: BTreeMap::new(),
                events: VecDeque::new(),
                layout: EventLayout::NATIVE,
                disconnected: false,
                read_error: None,
                query_error: None,
                open_error: None,
                open_count: 0,
                close_count: 0,
            })),
        }
    }

    pub fn with_id(self, id: InputId) -> Self {
        self.state.lock().id = id;
        self
    }

    pub fn with_buttons(self, codes: &[u16]) -> Self {
        self.state.lock().keys.extend_from_slice(codes);
        self
    }

    pub fn with_axis(self, code: u16, info: AbsInfo) -> Self {
        self.state.lock().abs.insert(code, info);
        self
    }

    /// A hat half (`ABS_HATnX`/`ABS_HATnY`) with range `-1..=1`.
    pub fn with_hat(self, code: u16, value: i32) -> Self {
        self.state.lock().abs.insert(code, AbsInfo::new(value, -1, 1));
        self
    }

    /// Override the advertised event classes. By default `EV_SYN` plus
    /// `EV_KEY`/`EV_ABS` when any key/axis is configured.
    pub fn with_event_types(self, types: &[u16]) -> Self {
        self.state.lock().event_types = Some(types.to_vec());
        self
    }

    /// Make `EVIOCGNAME` fail.
    pub fn without_name(self) -> Self {
        self.state.lock().name = None;
        self
    }

    /// Make every ioctl fail with `code`.
    pub fn with_query_error(self, code: i32) -> Self {
        self.state.lock().query_error = Some(code);
        self
    }

    /// Make opening the node fail with `code`.
    pub fn with_open_error(self, code: i32) -> Self {
        self.state.lock().open_error = Some(code);
        self
    }

    pub fn key_bits(&self) -> CapabilityBits {
        CapabilityBits::from_codes(CapabilityClass::Keys, &self.state.lock().keys)
    }

    pub fn abs_bits(&self) -> CapabilityBits {
        let codes: Vec<u16> = self.state.lock().abs.keys().copied().collect();
        CapabilityBits::from_codes(CapabilityClass::AbsAxes, &codes)
    }

    fn event_type_bits(&self) -> CapabilityBits {
        let state = self.state.lock();
        let types = match &state.event_types {
            Some(types) => types.clone(),
            None => {
                let mut types = vec![EV_SYN];
                if !state.keys.is_empty() {
                    types.push(EV_KEY);
                }
                if !state.abs.is_empty() {
                    types.push(EV_ABS);
                }
                types
            }
        };
        CapabilityBits::from_codes(CapabilityClass::EventTypes, &types)
    }

    /// Open a new handle, as the backend would.
    pub fn open_handle(&self) -> MockEventDevice {
        self.state.lock().open_count += 1;
        MockEventDevice {
            device: self.clone(),
            closed: false,
        }
    }

    /// Queue one event for the next read.
    pub fn push_event(&self, event: InputEvent) {
        self.state.lock().events.push_back(event);
    }

    pub fn push_events(&self, events: impl IntoIterator<Item = InputEvent>) {
        self.state.lock().events.extend(events);
    }

    pub fn pending_events(&self) -> usize {
        self.state.lock().events.len()
    }

    /// Change the current hardware value reported by `EVIOCGABS`.
    pub fn set_abs_value(&self, code: u16, value: i32) {
        if let Some(info) = self.state.lock().abs.get_mut(&code) {
            info.value = value;
        }
    }

    /// Replace calibration and value reported by `EVIOCGABS`.
    pub fn set_abs_info(&self, code: u16, info: AbsInfo) {
        self.state.lock().abs.insert(code, info);
    }

    /// Reads and queries report `ENODEV` from now on.
    pub fn disconnect(&self) {
        self.state.lock().disconnected = true;
    }

    /// Reads fail with `code` from now on.
    pub fn fail_reads(&self, code: i32) {
        self.state.lock().read_error = Some(code);
    }

    pub fn open_count(&self) -> usize {
        self.state.lock().open_count
    }

    pub fn close_count(&self) -> usize {
        self.state.lock().close_count
    }
}

/// An open handle to a [`MockDevice`]. Dropping it closes it.
#[derive(Debug)]
pub struct MockEventDevice {
    device: MockDevice,
    closed: bool,
}

impl MockEventDevice {
    fn check_query(&self) -> io::Result<()> {
        if self.closed {
            return Err(errno(libc::EBADF));
        }
        let state = self.device.state.lock();
        if state.disconnected {
            return Err(errno(libc::ENODEV));
        }
        match state.query_error {
            Some(code) => Err(errno(code)),
            None => Ok(()),
        }
    }
}

impl EventDevice for MockEventDevice {
    fn capabilities(&self, class: CapabilityClass) -> io::Result<CapabilityBits> {
        self.check_query()?;
        Ok(match class {
            CapabilityClass::EventTypes => self.device.event_type_bits(),
            CapabilityClass::Keys => self.device.key_bits(),
            CapabilityClass::AbsAxes => self.device.abs_bits(),
        })
    }

    fn input_id(&self) -> io::Result<InputId> {
        self.check_query()?;
        Ok(self.device.state.lock().id)
    }

    fn name(&self) -> io::Result<String> {
        self.check_query()?;
        self.device
            .state
            .lock()
            .name
            .clone()
            .ok_or_else(|| errno(libc::ENOTTY))
    }

    fn abs_info(&self, code: u16) -> io::Result<AbsInfo> {
        self.check_query()?;
        self.device
            .state
            .lock()
            .abs
            .get(&code)
            .copied()
            .ok_or_else(|| errno(libc::EINVAL))
    }

    fn read_record(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if self.closed {
            return Err(errno(libc::EBADF));
        }
        let mut state = self.device.state.lock();
        if let Some(code) = state.read_error {
            return Err(errno(code));
        }
        if state.disconnected {
            return Err(errno(libc::ENODEV));
        }
        let Some(event) = state.events.pop_front() else {
            return Err(io::ErrorKind::WouldBlock.into());
        };
        // The kernel tracks the latest value of every axis it reports.
        if event.event_type == EV_ABS {
            if let Some(info) = state.abs.get_mut(&event.code) {
                info.value = event.value;
            }
        }
        let record = event.encode(state.layout);
        let n = record.len().min(buf.len());
        buf[..n].copy_from_slice(&record[..n]);
        Ok(n)
    }

    fn close(&mut self) {
        if !self.closed {
            self.closed = true;
            self.device.state.lock().close_count += 1;
        }
    }

    fn is_closed(&self) -> bool {
        self.closed
    }
}

impl Drop for MockEventDevice {
    fn drop(&mut self) {
        self.close();
    }
}

#[derive(Debug, Default)]
struct BackendState {
    devices: HashMap<PathBuf, MockDevice>,
    notifications: VecDeque<Vec<u8>>,
    watch_error: Option<i32>,
    watches: usize,
}

/// Backend resolving paths to registered [`MockDevice`]s.
///
/// Unregistered paths fail to open with `ENOENT`. Clones share state.
#[derive(Debug, Clone, Default)]
pub struct MockBackend {
    state: Arc<Mutex<BackendState>>,
}

impl MockBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_device(&self, path: impl Into<PathBuf>, device: MockDevice) {
        self.state.lock().devices.insert(path.into(), device);
    }

    pub fn remove_device(&self, path: &Path) -> Option<MockDevice> {
        self.state.lock().devices.remove(path)
    }

    /// Queue one notification record, delivered by its own read.
    pub fn notify(&self, record: &NotifyRecord) {
        self.state.lock().notifications.push_back(record.encode());
    }

    /// Queue several records delivered together by one read.
    pub fn notify_batch(&self, records: &[NotifyRecord]) {
        let bytes = records.iter().flat_map(NotifyRecord::encode).collect();
        self.state.lock().notifications.push_back(bytes);
    }

    /// Queue raw bytes for one read.
    pub fn notify_raw(&self, bytes: Vec<u8>) {
        self.state.lock().notifications.push_back(bytes);
    }

    pub fn pending_notifications(&self) -> usize {
        self.state.lock().notifications.len()
    }

    /// Make arming the watch fail with `code`.
    pub fn fail_watch(&self, code: i32) {
        self.state.lock().watch_error = Some(code);
    }

    pub fn watch_count(&self) -> usize {
        self.state.lock().watches
    }
}

impl DeviceBackend for MockBackend {
    fn open_device(&self, path: &Path) -> io::Result<Box<dyn EventDevice>> {
        let device = self
            .state
            .lock()
            .devices
            .get(path)
            .cloned()
            .ok_or_else(|| errno(libc::ENOENT))?;
        if let Some(code) = device.state.lock().open_error {
            return Err(errno(code));
        }
        Ok(Box::new(device.open_handle()))
    }

    fn watch_directory(&self, _dir: &Path) -> io::Result<Box<dyn ChangeSource>> {
        let mut state = self.state.lock();
        if let Some(code) = state.watch_error {
            return Err(errno(code));
        }
        state.watches += 1;
        Ok(Box::new(MockChangeSource {
            backend: self.clone(),
        }))
    }
}

#[derive(Debug)]
struct MockChangeSource {
    backend: MockBackend,
}

impl ChangeSource for MockChangeSource {
    fn read_changes(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let mut state = self.backend.state.lock();
        let Some(bytes) = state.notifications.front() else {
            return Err(io::ErrorKind::WouldBlock.into());
        };
        if bytes.len() > buf.len() {
            return Err(errno(libc::EINVAL));
        }
        let n = bytes.len();
        buf[..n].copy_from_slice(bytes);
        state.notifications.pop_front();
        Ok(n)
    }
}
