//! Capability probing of an opened event node

use crate::gamepad::LinuxGamepad;
use crate::layout::ControlLayout;
use crate::ports::EventDevice;
use crate::{GamepadError, GamepadResult};
use openpad_evdev_protocol::codes::{EV_ABS, EV_KEY};
use openpad_evdev_protocol::{CapabilityBits, CapabilityClass, InputId, identity_string};
use std::io;
use std::path::Path;
use tracing::debug;

/// Display name used when the node refuses `EVIOCGNAME`.
pub const UNKNOWN_NAME: &str = "Unknown";

/// A controller ready to be registered.
#[derive(Debug)]
pub struct ProbedGamepad {
    pub name: String,
    pub identity: String,
    pub gamepad: LinuxGamepad,
}

/// Inspect an opened node.
///
/// Returns `Ok(None)` after closing the handle when the node lacks either the
/// key or the absolute-axis event class.
///
/// # Errors
///
/// Returns [`GamepadError::Query`] when a capability, identity or calibration
/// query fails. The handle is closed before returning.
pub fn probe(path: &Path, mut device: Box<dyn EventDevice>) -> GamepadResult<Option<ProbedGamepad>> {
    let event_types = match device.capabilities(CapabilityClass::EventTypes) {
        Ok(bits) => bits,
        Err(e) => {
            device.close();
            return Err(query_error(path, CapabilityClass::EventTypes.name())(e));
        }
    };
    if !event_types.has(EV_KEY) || !event_types.has(EV_ABS) {
        debug!("Ignoring {}: not a gamepad (no EV_KEY/EV_ABS)", path.display());
        device.close();
        return Ok(None);
    }

    let (keys, abs, id) = match query_controls(path, device.as_ref()) {
        Ok(v) => v,
        Err(e) => {
            device.close();
            return Err(e);
        }
    };

    let name = match device.name() {
        Ok(name) => name,
        Err(e) => {
            debug!("EVIOCGNAME failed for {}: {}", path.display(), e);
            UNKNOWN_NAME.to_string()
        }
    };
    let identity = identity_string(&id, &name);
    let layout = ControlLayout::from_capabilities(&keys, &abs);
    let gamepad = LinuxGamepad::new(path, device, layout)?;

    Ok(Some(ProbedGamepad {
        name,
        identity,
        gamepad,
    }))
}

fn query_controls(
    path: &Path,
    device: &dyn EventDevice,
) -> GamepadResult<(CapabilityBits, CapabilityBits, InputId)> {
    let keys = device
        .capabilities(CapabilityClass::Keys)
        .map_err(query_error(path, CapabilityClass::Keys.name()))?;
    let abs = device
        .capabilities(CapabilityClass::AbsAxes)
        .map_err(query_error(path, CapabilityClass::AbsAxes.name()))?;
    let id = device.input_id().map_err(query_error(path, "EVIOCGID"))?;
    Ok((keys, abs, id))
}

fn query_error(path: &Path, request: &'static str) -> impl FnOnce(io::Error) -> GamepadError {
    let path = path.to_path_buf();
    move |source| GamepadError::Query {
        path,
        request,
        source,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockDevice;
    use crate::native::NativeGamepad;
    use openpad_evdev_protocol::codes::*;
    use openpad_evdev_protocol::AbsInfo;

    type TestResult = Result<(), Box<dyn std::error::Error>>;

    fn run(device: &MockDevice) -> GamepadResult<Option<ProbedGamepad>> {
        probe(Path::new("/dev/input/event4"), Box::new(device.open_handle()))
    }

    #[test]
    fn test_probe_gamepad() -> TestResult {
        let device = MockDevice::new("Wireless Controller")
            .with_id(InputId::new(BUS_USB, 0x054C, 0x09CC, 0x8111))
            .with_buttons(&[BTN_SOUTH, BTN_EAST, BTN_NORTH, BTN_WEST])
            .with_axis(ABS_X, AbsInfo::new(128, 0, 255))
            .with_axis(ABS_Y, AbsInfo::new(128, 0, 255))
            .with_hat(ABS_HAT0X, 0)
            .with_hat(ABS_HAT0Y, 0);
        let probed = run(&device)?.ok_or("expected a gamepad")?;
        assert_eq!(probed.name, "Wireless Controller");
        assert_eq!(probed.identity, "030000004c050000cc09000011810000");
        assert_eq!(probed.gamepad.button_count(), 4);
        assert_eq!(probed.gamepad.axis_count(), 2);
        assert_eq!(probed.gamepad.hat_count(), 1);
        assert!(!probed.gamepad.has_own_standard_layout_mapping());
        Ok(())
    }

    #[test]
    fn test_rejects_device_without_abs() -> TestResult {
        let device = MockDevice::new("Keyboard")
            .with_event_types(&[EV_SYN, EV_KEY])
            .with_buttons(&[BTN_LEFT]);
        assert!(run(&device)?.is_none());
        assert_eq!(device.close_count(), 1);
        Ok(())
    }

    #[test]
    fn test_unknown_name_fallback() -> TestResult {
        let device = MockDevice::new("ignored")
            .without_name()
            .with_id(InputId::new(BUS_BLUETOOTH, 0, 0, 0))
            .with_buttons(&[BTN_SOUTH])
            .with_axis(ABS_X, AbsInfo::new(0, -1, 1));
        let probed = run(&device)?.ok_or("expected a gamepad")?;
        assert_eq!(probed.name, UNKNOWN_NAME);
        assert_eq!(probed.identity, "05000000556e6b6e6f776e0000000000");
        Ok(())
    }

    #[test]
    fn test_query_failure_closes_handle() {
        let device = MockDevice::new("Pad")
            .with_buttons(&[BTN_SOUTH])
            .with_axis(ABS_X, AbsInfo::new(0, 0, 1))
            .with_query_error(libc::EIO);
        let result = run(&device);
        assert!(matches!(result, Err(GamepadError::Query { .. })));
        assert_eq!(device.close_count(), 1);
    }
}
