//! Per-device event decoding and compact state

use crate::error::is_device_gone;
use crate::layout::{AbsSlot, ControlLayout};
use crate::native::NativeGamepad;
use crate::ports::EventDevice;
use crate::{GamepadError, GamepadResult};
use openpad_evdev_protocol::codes::{ABS_CNT, EV_ABS, EV_KEY, EV_SYN, SYN_DROPPED, SYN_REPORT};
use openpad_evdev_protocol::{AbsInfo, EventLayout, HatAxis, HatState, InputEvent};
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

/// One tracked evdev controller.
///
/// Owns its device handle. The handle is closed by [`LinuxGamepad::close`],
/// by a disconnection seen while reading, or when the value is dropped.
pub struct LinuxGamepad {
    path: PathBuf,
    device: Box<dyn EventDevice>,
    layout: ControlLayout,
    record_layout: EventLayout,
    abs_info: [AbsInfo; ABS_CNT],
    dropped: bool,
    axes: Vec<f64>,
    buttons: Vec<bool>,
    hats: Vec<HatState>,
}

impl std::fmt::Debug for LinuxGamepad {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LinuxGamepad")
            .field("path", &self.path)
            .field("closed", &self.device.is_closed())
            .field("dropped", &self.dropped)
            .field("axes", &self.axes)
            .field("buttons", &self.buttons)
            .field("hats", &self.hats)
            .finish_non_exhaustive()
    }
}

impl LinuxGamepad {
    /// Build state for a probed device, querying calibration of every
    /// non-hat axis and then syncing all absolute values.
    ///
    /// # Errors
    ///
    /// Returns [`GamepadError::Query`] when a calibration query fails.
    pub fn new(
        path: impl Into<PathBuf>,
        device: Box<dyn EventDevice>,
        layout: ControlLayout,
    ) -> GamepadResult<Self> {
        let mut gamepad = Self {
            path: path.into(),
            axes: vec![0.0; layout.axis_count()],
            buttons: vec![false; layout.button_count()],
            hats: vec![HatState::CENTERED; layout.hat_count()],
            device,
            layout,
            record_layout: EventLayout::NATIVE,
            abs_info: [AbsInfo::default(); ABS_CNT],
            dropped: false,
        };

        let codes: Vec<u16> = gamepad.layout.axis_codes().collect();
        for code in codes {
            let info = gamepad.query_abs(code)?;
            gamepad.abs_info[usize::from(code)] = info;
        }
        gamepad.poll_abs_state()?;
        Ok(gamepad)
    }

    /// Override the raw record layout (defaults to the host ABI).
    pub fn with_record_layout(mut self, layout: EventLayout) -> Self {
        self.record_layout = layout;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn layout(&self) -> &ControlLayout {
        &self.layout
    }

    /// Calibration last stored for `code`.
    pub fn abs_info(&self, code: u16) -> Option<&AbsInfo> {
        self.abs_info.get(usize::from(code))
    }

    pub fn is_dropped(&self) -> bool {
        self.dropped
    }

    pub fn is_closed(&self) -> bool {
        self.device.is_closed()
    }

    /// Close the device handle. Safe to call more than once.
    pub fn close(&mut self) {
        if !self.device.is_closed() {
            debug!("Closing gamepad {}", self.path.display());
        }
        self.device.close();
    }

    /// Decode every record currently queued on the device.
    ///
    /// # Errors
    ///
    /// A read failure other than an empty queue or a disconnection, a short
    /// record, or a failed calibration re-query.
    pub fn read_events(&mut self) -> GamepadResult<()> {
        let size = self.record_layout.size();
        let mut buf = [0u8; EventLayout::MAX_SIZE];
        loop {
            if self.device.is_closed() {
                return Ok(());
            }
            let n = match self.device.read_record(&mut buf[..size]) {
                Ok(0) => return Ok(()),
                Ok(n) => n,
                Err(e) if e.kind() == io::ErrorKind::WouldBlock => return Ok(()),
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) if is_device_gone(&e) => {
                    debug!("Gamepad {} disconnected", self.path.display());
                    self.close();
                    return Ok(());
                }
                Err(source) => {
                    return Err(GamepadError::Read {
                        path: self.path.clone(),
                        source,
                    });
                }
            };
            let event = InputEvent::decode(&buf[..n], self.record_layout)?;
            self.handle_event(event)?;
        }
    }

    /// Apply one decoded event.
    ///
    /// # Errors
    ///
    /// Only a report boundary can fail, through its calibration re-query.
    pub fn handle_event(&mut self, event: InputEvent) -> GamepadResult<()> {
        if event.event_type == EV_SYN {
            match event.code {
                SYN_DROPPED => {
                    debug!("Event queue overflow on {}", self.path.display());
                    self.dropped = true;
                }
                SYN_REPORT => {
                    if self.dropped {
                        debug!("Resyncing {} after overflow", self.path.display());
                    }
                    self.dropped = false;
                    self.poll_abs_state()?;
                }
                _ => {}
            }
            return Ok(());
        }
        if self.dropped {
            return Ok(());
        }

        match event.event_type {
            EV_KEY => {
                let slot = self.layout.button_slot(event.code);
                if let Some(pressed) = slot.and_then(|slot| self.buttons.get_mut(slot)) {
                    *pressed = event.value != 0;
                }
            }
            EV_ABS => self.handle_abs_event(event.code, event.value),
            _ => {}
        }
        Ok(())
    }

    /// Re-query every mapped absolute code and reapply its current value.
    ///
    /// A device that disappears mid-poll is closed and the poll ends cleanly.
    ///
    /// # Errors
    ///
    /// Returns [`GamepadError::Query`] for any other query failure.
    pub fn poll_abs_state(&mut self) -> GamepadResult<()> {
        let codes: Vec<u16> = self.layout.mapped_abs().map(|(code, _)| code).collect();
        for code in codes {
            let info = match self.device.abs_info(code) {
                Ok(info) => info,
                Err(e) if is_device_gone(&e) => {
                    debug!("Gamepad {} vanished during resync", self.path.display());
                    self.close();
                    return Ok(());
                }
                Err(source) => {
                    return Err(GamepadError::Query {
                        path: self.path.clone(),
                        request: "EVIOCGABS",
                        source,
                    });
                }
            };
            self.abs_info[usize::from(code)] = info;
            self.handle_abs_event(code, info.value);
        }
        Ok(())
    }

    fn handle_abs_event(&mut self, code: u16, value: i32) {
        match self.layout.abs_slot(code) {
            AbsSlot::Hat(slot) => {
                if let (Some(axis), Some(hat)) = (HatAxis::from_code(code), self.hats.get_mut(slot)) {
                    hat.apply(axis, value);
                }
            }
            AbsSlot::Axis(slot) => {
                let info = self.abs_info[usize::from(code)];
                if let Some(axis) = self.axes.get_mut(slot) {
                    *axis = info.normalize(value);
                }
            }
            AbsSlot::Unmapped => {}
        }
    }

    fn query_abs(&self, code: u16) -> GamepadResult<AbsInfo> {
        self.device
            .abs_info(code)
            .map_err(|source| GamepadError::Query {
                path: self.path.clone(),
                request: "EVIOCGABS",
                source,
            })
    }
}

impl NativeGamepad for LinuxGamepad {
    fn update(&mut self) -> GamepadResult<()> {
        self.read_events()
    }

    fn is_connected(&self) -> bool {
        !self.device.is_closed()
    }

    fn has_own_standard_layout_mapping(&self) -> bool {
        false
    }

    fn axis_count(&self) -> usize {
        self.layout.axis_count()
    }

    fn button_count(&self) -> usize {
        self.layout.button_count()
    }

    fn hat_count(&self) -> usize {
        self.layout.hat_count()
    }

    fn axis_value(&self, axis: usize) -> f64 {
        self.axes.get(axis).copied().unwrap_or(0.0)
    }

    fn is_button_pressed(&self, button: usize) -> bool {
        self.buttons.get(button).copied().unwrap_or(false)
    }

    fn button_value(&self, button: usize) -> GamepadResult<f64> {
        Err(GamepadError::ButtonValueUnsupported { button })
    }

    fn hat_state(&self, hat: usize) -> HatState {
        self.hats.get(hat).copied().unwrap_or(HatState::CENTERED)
    }

    fn vibrate(&mut self, _duration: Duration, _strong_magnitude: f64, _weak_magnitude: f64) {}
}

impl Drop for LinuxGamepad {
    fn drop(&mut self) {
        self.device.close();
    }
}
