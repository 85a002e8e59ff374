//! Hot-pluggable Linux evdev gamepad driver
//!
//! Discovers controllers under `/dev/input`, tracks hotplug through inotify
//! and keeps a normalized per-device state that callers poll once per tick.
//!
//! ## Architecture
//! - [`port::LinuxGamepadPort`]: directory scan, hotplug notifications and
//!   capability probing
//! - [`gamepad::LinuxGamepad`]: event decoding, drop/resync and compact state
//! - [`registry::Gamepads`]: tracked-device registry
//! - [`driver::GamepadDriver`]: caller-owned facade tying them together
//! - [`ports`]: seams to the kernel, implemented by [`sys`] (and `mock` for
//!   tests)
//!
//! Nothing here spawns threads or blocks. Every read is non-blocking and an
//! empty queue is the normal result.

#![deny(clippy::unwrap_used)]

pub mod config;
pub mod driver;
pub mod error;
pub mod gamepad;
pub mod layout;
#[cfg(any(test, feature = "harness"))]
pub mod mock;
pub mod native;
pub mod port;
pub mod ports;
pub mod prober;
pub mod registry;
pub mod sys;

pub use config::DriverConfig;
pub use driver::{GamepadDriver, GamepadSnapshot};
pub use error::{GamepadError, GamepadResult};
pub use gamepad::LinuxGamepad;
pub use layout::{AbsSlot, ControlLayout};
pub use native::NativeGamepad;
pub use port::LinuxGamepadPort;
pub use ports::{ChangeSource, DeviceBackend, EventDevice};
pub use registry::{Gamepad, GamepadId, Gamepads};
pub use sys::{EvdevBackend, EvdevDevice, InotifyWatch};

pub use openpad_evdev_protocol::HatState;
