//! Caller-owned driver facade
//!
//! [`GamepadDriver`] bundles the discovery port with the registry. Call
//! [`GamepadDriver::init`] once, then [`GamepadDriver::update`] once per tick
//! from the same thread; neither call blocks.

use crate::config::DriverConfig;
use crate::gamepad::LinuxGamepad;
use crate::native::NativeGamepad;
use crate::port::LinuxGamepadPort;
use crate::ports::DeviceBackend;
use crate::registry::{Gamepad, GamepadId, Gamepads};
use crate::GamepadResult;
use openpad_evdev_protocol::HatState;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Point-in-time copy of one gamepad's metadata and state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GamepadSnapshot {
    pub id: GamepadId,
    pub name: String,
    pub identity: String,
    pub path: String,
    pub axes: Vec<f64>,
    pub buttons: Vec<bool>,
    pub hats: Vec<HatState>,
}

impl GamepadSnapshot {
    fn capture(gamepad: &Gamepad<LinuxGamepad>) -> Self {
        let native = gamepad.native();
        Self {
            id: gamepad.id(),
            name: gamepad.name().to_string(),
            identity: gamepad.identity().to_string(),
            path: native.path().display().to_string(),
            axes: (0..native.axis_count()).map(|i| native.axis_value(i)).collect(),
            buttons: (0..native.button_count())
                .map(|i| native.is_button_pressed(i))
                .collect(),
            hats: (0..native.hat_count()).map(|i| native.hat_state(i)).collect(),
        }
    }
}

#[derive(Debug)]
pub struct GamepadDriver {
    port: LinuxGamepadPort,
    gamepads: Gamepads<LinuxGamepad>,
}

impl GamepadDriver {
    pub fn new(config: DriverConfig) -> Self {
        Self {
            port: LinuxGamepadPort::new(config),
            gamepads: Gamepads::new(),
        }
    }

    pub fn with_backend(config: DriverConfig, backend: Box<dyn DeviceBackend>) -> Self {
        Self {
            port: LinuxGamepadPort::with_backend(config, backend),
            gamepads: Gamepads::new(),
        }
    }

    /// Arm hotplug and register every controller already present.
    ///
    /// # Errors
    ///
    /// See [`LinuxGamepadPort::init`].
    pub fn init(&mut self) -> GamepadResult<()> {
        self.port.init(&mut self.gamepads)
    }

    /// Apply hotplug notifications, then drain input on every gamepad.
    ///
    /// Both halves always run; the first error is returned.
    ///
    /// # Errors
    ///
    /// See [`LinuxGamepadPort::update`] and [`Gamepads::update`].
    pub fn update(&mut self) -> GamepadResult<()> {
        let hotplug = self.port.update(&mut self.gamepads);
        let input = self
            .gamepads
            .update(self.port.config().remove_disconnected);
        hotplug.and(input)
    }

    /// Re-list the device directory.
    ///
    /// # Errors
    ///
    /// See [`LinuxGamepadPort::rescan`].
    pub fn rescan(&mut self) -> GamepadResult<()> {
        self.port.rescan(&mut self.gamepads)
    }

    pub fn is_watching(&self) -> bool {
        self.port.is_watching()
    }

    pub fn gamepads(&self) -> &Gamepads<LinuxGamepad> {
        &self.gamepads
    }

    pub fn gamepad(&self, id: GamepadId) -> Option<&Gamepad<LinuxGamepad>> {
        self.gamepads.get(id)
    }

    pub fn ids(&self) -> Vec<GamepadId> {
        self.gamepads.ids()
    }

    pub fn len(&self) -> usize {
        self.gamepads.len()
    }

    pub fn is_empty(&self) -> bool {
        self.gamepads.is_empty()
    }

    pub fn find_by_path(&self, path: &Path) -> Option<GamepadId> {
        self.gamepads.find(|g| g.native().path() == path)
    }

    pub fn axis_count(&self, id: GamepadId) -> usize {
        self.native(id).map_or(0, NativeGamepad::axis_count)
    }

    pub fn button_count(&self, id: GamepadId) -> usize {
        self.native(id).map_or(0, NativeGamepad::button_count)
    }

    pub fn hat_count(&self, id: GamepadId) -> usize {
        self.native(id).map_or(0, NativeGamepad::hat_count)
    }

    /// Normalized value, or `0.0` for an unknown gamepad or axis.
    pub fn axis_value(&self, id: GamepadId, axis: usize) -> f64 {
        self.native(id).map_or(0.0, |n| n.axis_value(axis))
    }

    pub fn is_button_pressed(&self, id: GamepadId, button: usize) -> bool {
        self.native(id).is_some_and(|n| n.is_button_pressed(button))
    }

    /// # Errors
    ///
    /// Always [`crate::GamepadError::ButtonValueUnsupported`] on evdev.
    pub fn button_value(&self, id: GamepadId, button: usize) -> GamepadResult<f64> {
        match self.native(id) {
            Some(native) => native.button_value(button),
            None => Err(crate::GamepadError::ButtonValueUnsupported { button }),
        }
    }

    pub fn hat_state(&self, id: GamepadId, hat: usize) -> HatState {
        self.native(id)
            .map_or(HatState::CENTERED, |n| n.hat_state(hat))
    }

    pub fn vibrate(&mut self, id: GamepadId, duration: Duration, strong: f64, weak: f64) {
        if let Some(gamepad) = self.gamepads.get_mut(id) {
            gamepad.native_mut().vibrate(duration, strong, weak);
        }
    }

    pub fn snapshot(&self, id: GamepadId) -> Option<GamepadSnapshot> {
        self.gamepads.get(id).map(GamepadSnapshot::capture)
    }

    pub fn snapshots(&self) -> Vec<GamepadSnapshot> {
        self.gamepads.iter().map(GamepadSnapshot::capture).collect()
    }

    fn native(&self, id: GamepadId) -> Option<&LinuxGamepad> {
        self.gamepads.get(id).map(Gamepad::native)
    }
}
