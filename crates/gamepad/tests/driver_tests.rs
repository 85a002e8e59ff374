//! End-to-end driver tests over the mock backend
//!
//! Each test creates a temporary device directory holding empty `eventN`
//! files (so the directory scan sees them) and registers a scripted
//! [`MockDevice`] for each path.

use openpad_evdev_protocol::codes::*;
use openpad_evdev_protocol::inotify::{IN_ATTRIB, IN_CREATE, IN_DELETE, IN_Q_OVERFLOW};
use openpad_evdev_protocol::{AbsInfo, InputEvent, InputId, NotifyRecord};
use openpad_gamepad::mock::{MockBackend, MockDevice};
use openpad_gamepad::{DriverConfig, GamepadDriver, GamepadError, GamepadId, HatState};
use std::path::{Path, PathBuf};
use tempfile::TempDir;

type TestResult = Result<(), Box<dyn std::error::Error>>;

fn approx(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-6
}

struct Rig {
    dir: TempDir,
    backend: MockBackend,
    driver: GamepadDriver,
}

impl Rig {
    fn new() -> Result<Self, Box<dyn std::error::Error>> {
        let dir = tempfile::tempdir()?;
        let backend = MockBackend::new();
        let config = DriverConfig::default().with_device_dir(dir.path());
        let driver = GamepadDriver::with_backend(config, Box::new(backend.clone()));
        Ok(Self {
            dir,
            backend,
            driver,
        })
    }

    fn path(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    /// Create the node file and register its scripted device.
    fn plug(&self, name: &str, device: &MockDevice) -> Result<PathBuf, std::io::Error> {
        let path = self.path(name);
        std::fs::write(&path, [])?;
        self.backend.add_device(&path, device.clone());
        Ok(path)
    }

    fn unplug(&self, name: &str) -> Result<(), std::io::Error> {
        let path = self.path(name);
        std::fs::remove_file(&path)?;
        self.backend.remove_device(&path);
        Ok(())
    }

    fn only_id(&self) -> Result<GamepadId, &'static str> {
        match self.driver.ids().as_slice() {
            [id] => Ok(*id),
            _ => Err("expected exactly one gamepad"),
        }
    }
}

fn two_button_pad() -> MockDevice {
    MockDevice::new("Test Pad")
        .with_id(InputId::new(BUS_USB, 0x045E, 0x028E, 0x0114))
        .with_buttons(&[BTN_SOUTH, BTN_EAST])
        .with_axis(ABS_X, AbsInfo::new(0, 0, 255))
}

#[test]
fn end_to_end_axis_normalization() -> TestResult {
    let mut rig = Rig::new()?;
    let pad = two_button_pad();
    rig.plug("event0", &pad)?;
    rig.driver.init()?;

    let id = rig.only_id()?;
    assert_eq!(rig.driver.button_count(id), 2);
    assert_eq!(rig.driver.axis_count(id), 1);
    assert_eq!(rig.driver.hat_count(id), 0);

    pad.push_events([InputEvent::abs(ABS_X, 255), InputEvent::syn_report()]);
    rig.driver.update()?;
    assert!(approx(rig.driver.axis_value(id, 0), 1.0));

    pad.push_events([InputEvent::abs(ABS_X, 0), InputEvent::syn_report()]);
    rig.driver.update()?;
    assert!(approx(rig.driver.axis_value(id, 0), -1.0));

    pad.push_events([InputEvent::abs(ABS_X, 127), InputEvent::syn_report()]);
    rig.driver.update()?;
    assert!((rig.driver.axis_value(id, 0) - (-0.003_921_568_6)).abs() < 1e-6);

    pad.push_events([
        InputEvent::key(BTN_SOUTH, 1),
        InputEvent::key(BTN_EAST, 0),
        InputEvent::syn_report(),
    ]);
    rig.driver.update()?;
    assert!(rig.driver.is_button_pressed(id, 0));
    assert!(!rig.driver.is_button_pressed(id, 1));
    Ok(())
}

#[test]
fn identity_and_name_are_registered() -> TestResult {
    let mut rig = Rig::new()?;
    rig.plug("event0", &two_button_pad())?;
    rig.driver.init()?;

    let id = rig.only_id()?;
    let gamepad = rig.driver.gamepad(id).ok_or("missing gamepad")?;
    assert_eq!(gamepad.name(), "Test Pad");
    assert_eq!(gamepad.identity(), "030000005e0400008e02000014010000");
    Ok(())
}

#[test]
fn delete_notification_removes_and_closes_once() -> TestResult {
    let mut rig = Rig::new()?;
    let pad = two_button_pad();
    let path = rig.plug("event3", &pad)?;
    rig.driver.init()?;
    assert!(rig.driver.find_by_path(&path).is_some());

    rig.unplug("event3")?;
    rig.backend.notify(&NotifyRecord::new(1, IN_DELETE, "event3"));
    rig.driver.update()?;

    assert!(rig.driver.find_by_path(&path).is_none());
    assert!(rig.driver.is_empty());
    assert_eq!(pad.close_count(), 1);

    drop(rig);
    assert_eq!(pad.close_count(), 1);
    Ok(())
}

#[test]
fn create_notification_probes_new_node() -> TestResult {
    let mut rig = Rig::new()?;
    rig.driver.init()?;
    assert!(rig.driver.is_empty());
    assert!(rig.driver.is_watching());

    let pad = two_button_pad();
    let path = rig.plug("event7", &pad)?;
    rig.backend.notify(&NotifyRecord::new(1, IN_CREATE, "event7"));
    rig.driver.update()?;

    assert!(rig.driver.find_by_path(&path).is_some());
    Ok(())
}

#[test]
fn attrib_after_create_does_not_duplicate() -> TestResult {
    let mut rig = Rig::new()?;
    rig.driver.init()?;

    let pad = two_button_pad();
    rig.plug("event2", &pad)?;
    rig.backend.notify_batch(&[
        NotifyRecord::new(1, IN_CREATE, "event2"),
        NotifyRecord::new(1, IN_ATTRIB, "event2"),
    ]);
    rig.driver.update()?;
    rig.backend.notify(&NotifyRecord::new(1, IN_ATTRIB, "event2"));
    rig.driver.update()?;

    assert_eq!(rig.driver.len(), 1);
    assert_eq!(pad.open_count(), 1);
    Ok(())
}

#[test]
fn unreadable_node_is_retried_on_attrib() -> TestResult {
    let mut rig = Rig::new()?;
    rig.driver.init()?;

    let locked = two_button_pad().with_open_error(libc::EACCES);
    rig.plug("event1", &locked)?;
    rig.backend.notify(&NotifyRecord::new(1, IN_CREATE, "event1"));
    rig.driver.update()?;
    assert!(rig.driver.is_empty());

    // udev fixes permissions and the node is reported again
    let pad = two_button_pad();
    rig.backend.add_device(rig.path("event1"), pad);
    rig.backend.notify(&NotifyRecord::new(1, IN_ATTRIB, "event1"));
    rig.driver.update()?;
    assert_eq!(rig.driver.len(), 1);
    Ok(())
}

#[test]
fn non_matching_names_are_ignored() -> TestResult {
    let mut rig = Rig::new()?;
    let pad = two_button_pad();
    rig.plug("js0", &pad)?;
    rig.driver.init()?;
    assert!(rig.driver.is_empty());

    rig.backend.notify_batch(&[
        NotifyRecord::new(1, IN_CREATE, "js0"),
        NotifyRecord::new(1, IN_CREATE, "by-id"),
        NotifyRecord::new(1, IN_CREATE, "event"),
    ]);
    rig.driver.update()?;
    assert!(rig.driver.is_empty());
    assert_eq!(pad.open_count(), 0);
    Ok(())
}

#[test]
fn non_gamepads_are_rejected() -> TestResult {
    let mut rig = Rig::new()?;
    let mouse = MockDevice::new("Mouse")
        .with_event_types(&[EV_SYN, EV_KEY, EV_REL])
        .with_buttons(&[BTN_LEFT, BTN_RIGHT]);
    let touchpad = MockDevice::new("Accelerometer")
        .with_event_types(&[EV_SYN, EV_ABS])
        .with_axis(ABS_X, AbsInfo::new(0, -512, 512));
    rig.plug("event0", &mouse)?;
    rig.plug("event1", &touchpad)?;
    rig.driver.init()?;

    assert!(rig.driver.is_empty());
    assert_eq!(mouse.close_count(), 1);
    assert_eq!(touchpad.close_count(), 1);
    Ok(())
}

#[test]
fn drop_resync_matches_direct_poll() -> TestResult {
    let mut rig = Rig::new()?;
    let pad = MockDevice::new("Pad")
        .with_buttons(&[BTN_SOUTH])
        .with_axis(ABS_X, AbsInfo::new(0, 0, 200))
        .with_hat(ABS_HAT0X, 0)
        .with_hat(ABS_HAT0Y, 0);
    rig.plug("event0", &pad)?;
    rig.driver.init()?;
    let id = rig.only_id()?;

    pad.push_events([
        InputEvent::abs(ABS_X, 50),
        InputEvent::syn_dropped(),
        InputEvent::abs(ABS_X, 150),
        InputEvent::key(BTN_SOUTH, 1),
    ]);
    rig.driver.update()?;
    assert!(approx(rig.driver.axis_value(id, 0), -0.5));
    assert!(!rig.driver.is_button_pressed(id, 0));

    // Hardware moved on while events were lost.
    pad.set_abs_value(ABS_X, 100);
    pad.set_abs_value(ABS_HAT0X, 1);
    pad.push_event(InputEvent::syn_report());
    rig.driver.update()?;

    assert!(approx(rig.driver.axis_value(id, 0), 0.0));
    assert_eq!(rig.driver.hat_state(id, 0), HatState::RIGHT);
    Ok(())
}

#[test]
fn hat_axes_are_independent() -> TestResult {
    let mut rig = Rig::new()?;
    let pad = MockDevice::new("Pad")
        .with_buttons(&[BTN_SOUTH])
        .with_hat(ABS_HAT0X, 0)
        .with_hat(ABS_HAT0Y, 0);
    rig.plug("event0", &pad)?;
    rig.driver.init()?;
    let id = rig.only_id()?;

    pad.push_events([InputEvent::abs(ABS_HAT0X, -1), InputEvent::abs(ABS_HAT0Y, -1)]);
    rig.driver.update()?;
    assert_eq!(rig.driver.hat_state(id, 0), HatState::LEFT | HatState::UP);

    pad.push_event(InputEvent::abs(ABS_HAT0X, 1));
    rig.driver.update()?;
    assert_eq!(rig.driver.hat_state(id, 0), HatState::RIGHT | HatState::UP);

    pad.push_event(InputEvent::abs(ABS_HAT0Y, 0));
    rig.driver.update()?;
    assert_eq!(rig.driver.hat_state(id, 0), HatState::RIGHT);
    Ok(())
}

#[test]
fn out_of_range_queries_return_defaults() -> TestResult {
    let mut rig = Rig::new()?;
    rig.plug("event0", &two_button_pad())?;
    rig.driver.init()?;
    let id = rig.only_id()?;

    assert!(approx(rig.driver.axis_value(id, 1), 0.0));
    assert!(!rig.driver.is_button_pressed(id, 2));
    assert_eq!(rig.driver.hat_state(id, 0), HatState::CENTERED);

    let unknown = GamepadId(42);
    assert!(approx(rig.driver.axis_value(unknown, 0), 0.0));
    assert!(!rig.driver.is_button_pressed(unknown, 0));
    assert_eq!(rig.driver.hat_state(unknown, 0), HatState::CENTERED);
    assert_eq!(rig.driver.axis_count(unknown), 0);
    Ok(())
}

#[test]
fn button_value_is_unsupported() -> TestResult {
    let mut rig = Rig::new()?;
    rig.plug("event0", &two_button_pad())?;
    rig.driver.init()?;
    let id = rig.only_id()?;
    assert!(matches!(
        rig.driver.button_value(id, 0),
        Err(GamepadError::ButtonValueUnsupported { button: 0 })
    ));
    rig.driver
        .vibrate(id, std::time::Duration::from_millis(100), 1.0, 0.5);
    Ok(())
}

#[test]
fn missing_directory_is_not_an_error() -> TestResult {
    let backend = MockBackend::new();
    let config = DriverConfig::default().with_device_dir("/nonexistent/openpad/input");
    let mut driver = GamepadDriver::with_backend(config, Box::new(backend.clone()));
    driver.init()?;
    driver.update()?;
    assert!(driver.is_empty());
    assert!(!driver.is_watching());
    assert_eq!(backend.watch_count(), 0);
    Ok(())
}

#[test]
fn disconnect_during_read_removes_entry() -> TestResult {
    let mut rig = Rig::new()?;
    let pad = two_button_pad();
    rig.plug("event0", &pad)?;
    rig.driver.init()?;

    pad.disconnect();
    rig.driver.update()?;
    assert!(rig.driver.is_empty());
    assert_eq!(pad.close_count(), 1);

    // The delete notification that follows finds nothing left to close.
    rig.unplug("event0")?;
    rig.backend.notify(&NotifyRecord::new(1, IN_DELETE, "event0"));
    rig.driver.update()?;
    assert_eq!(pad.close_count(), 1);
    Ok(())
}

#[test]
fn disconnected_entry_kept_when_configured() -> TestResult {
    let dir = tempfile::tempdir()?;
    let backend = MockBackend::new();
    let path = dir.path().join("event0");
    std::fs::write(&path, [])?;
    let pad = two_button_pad();
    backend.add_device(&path, pad.clone());

    let config = DriverConfig {
        remove_disconnected: false,
        ..DriverConfig::default().with_device_dir(dir.path())
    };
    let mut driver = GamepadDriver::with_backend(config, Box::new(backend));
    driver.init()?;
    pad.disconnect();
    driver.update()?;

    let id = driver.find_by_path(&path).ok_or("entry should remain")?;
    let gamepad = driver.gamepad(id).ok_or("missing gamepad")?;
    assert!(gamepad.native().is_closed());
    Ok(())
}

#[test]
fn scan_is_sorted_and_continues_past_failures() -> TestResult {
    let mut rig = Rig::new()?;
    rig.plug("event10", &two_button_pad())?;
    rig.plug("event2", &two_button_pad().with_query_error(libc::EIO))?;
    rig.plug("event1", &two_button_pad())?;

    let result = rig.driver.init();
    assert!(matches!(result, Err(GamepadError::Query { .. })));
    assert_eq!(rig.driver.len(), 2);

    let first = rig
        .driver
        .gamepad(GamepadId(0))
        .ok_or("missing first gamepad")?;
    assert_eq!(first.native().path(), rig.path("event1").as_path());
    let second = rig
        .driver
        .gamepad(GamepadId(1))
        .ok_or("missing second gamepad")?;
    assert_eq!(second.native().path(), rig.path("event10").as_path());
    Ok(())
}

#[test]
fn queue_overflow_triggers_rescan() -> TestResult {
    let mut rig = Rig::new()?;
    let old = two_button_pad();
    rig.plug("event0", &old)?;
    rig.driver.init()?;

    // Both changes were lost; only the overflow marker arrives.
    rig.unplug("event0")?;
    let new = two_button_pad();
    let new_path = rig.plug("event5", &new)?;
    rig.backend.notify(&NotifyRecord::new(-1, IN_Q_OVERFLOW, ""));
    rig.driver.update()?;

    assert_eq!(rig.driver.len(), 1);
    assert!(rig.driver.find_by_path(&new_path).is_some());
    assert_eq!(old.close_count(), 1);
    Ok(())
}

#[test]
fn hotplug_disabled_skips_watch() -> TestResult {
    let dir = tempfile::tempdir()?;
    let backend = MockBackend::new();
    let config = DriverConfig::default()
        .with_device_dir(dir.path())
        .with_hotplug(false);
    let mut driver = GamepadDriver::with_backend(config, Box::new(backend.clone()));
    driver.init()?;
    assert!(!driver.is_watching());
    assert_eq!(backend.watch_count(), 0);
    Ok(())
}

#[test]
fn watch_failure_is_reported() -> TestResult {
    let dir = tempfile::tempdir()?;
    let backend = MockBackend::new();
    backend.fail_watch(libc::EMFILE);
    let config = DriverConfig::default().with_device_dir(dir.path());
    let mut driver = GamepadDriver::with_backend(config, Box::new(backend));
    assert!(matches!(driver.init(), Err(GamepadError::Watch { .. })));
    Ok(())
}

#[test]
fn rescan_picks_up_silent_changes() -> TestResult {
    let mut rig = Rig::new()?;
    rig.driver.init()?;
    let pad = two_button_pad();
    let path = rig.plug("event4", &pad)?;
    rig.driver.rescan()?;
    assert!(rig.driver.find_by_path(&path).is_some());

    rig.unplug("event4")?;
    rig.driver.rescan()?;
    assert!(rig.driver.is_empty());
    assert_eq!(pad.close_count(), 1);
    Ok(())
}

#[test]
fn snapshot_reflects_state() -> TestResult {
    let mut rig = Rig::new()?;
    let pad = two_button_pad();
    rig.plug("event0", &pad)?;
    rig.driver.init()?;
    pad.push_events([InputEvent::key(BTN_EAST, 1), InputEvent::abs(ABS_X, 255)]);
    rig.driver.update()?;

    let snapshots = rig.driver.snapshots();
    let [snapshot] = snapshots.as_slice() else {
        return Err("expected one snapshot".into());
    };
    assert_eq!(snapshot.name, "Test Pad");
    assert_eq!(snapshot.buttons, vec![false, true]);
    assert_eq!(snapshot.axes.len(), 1);
    assert!(snapshot.hats.is_empty());
    assert!(Path::new(&snapshot.path).ends_with("event0"));

    let json = serde_json::to_value(snapshot)?;
    assert_eq!(json["identity"], "030000005e0400008e02000014010000");
    Ok(())
}
