//! Device discovery and hotplug for the evdev backend
//!
//! [`LinuxGamepadPort`] owns the directory watch and decides which nodes
//! become registry entries. Scanning happens once at [`LinuxGamepadPort::init`]
//! (and on [`LinuxGamepadPort::rescan`]); afterwards change notifications drive
//! probing and removal from [`LinuxGamepadPort::update`].

use crate::config::DriverConfig;
use crate::error::is_skippable_open_error;
use crate::gamepad::LinuxGamepad;
use crate::ports::{ChangeSource, DeviceBackend};
use crate::prober::probe;
use crate::registry::{GamepadId, Gamepads};
use crate::sys::EvdevBackend;
use crate::{GamepadError, GamepadResult};
use openpad_evdev_protocol::NotifyRecord;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

pub struct LinuxGamepadPort {
    config: DriverConfig,
    backend: Box<dyn DeviceBackend>,
    watcher: Option<Box<dyn ChangeSource>>,
    notify_buf: Vec<u8>,
}

impl std::fmt::Debug for LinuxGamepadPort {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LinuxGamepadPort")
            .field("config", &self.config)
            .field("watching", &self.watcher.is_some())
            .finish_non_exhaustive()
    }
}

impl LinuxGamepadPort {
    pub fn new(config: DriverConfig) -> Self {
        Self::with_backend(config, Box::new(EvdevBackend::new()))
    }

    pub fn with_backend(config: DriverConfig, backend: Box<dyn DeviceBackend>) -> Self {
        let notify_buf = vec![0u8; config.notify_buffer_size];
        Self {
            config,
            backend,
            watcher: None,
            notify_buf,
        }
    }

    pub fn config(&self) -> &DriverConfig {
        &self.config
    }

    pub fn is_watching(&self) -> bool {
        self.watcher.is_some()
    }

    /// Arm the hotplug watch and probe every node already present.
    ///
    /// A missing device directory leaves the port idle and is not an error.
    ///
    /// # Errors
    ///
    /// Invalid configuration, a watch that cannot be armed on an existing
    /// directory, an unreadable directory, or the first probe failure of the
    /// initial scan (the scan itself runs to completion).
    pub fn init(&mut self, gamepads: &mut Gamepads<LinuxGamepad>) -> GamepadResult<()> {
        self.config.validate()?;
        self.notify_buf.resize(self.config.notify_buffer_size, 0);

        let dir = self.config.device_dir().to_path_buf();
        if !dir.is_dir() {
            info!("{} not present; no gamepads available", dir.display());
            return Ok(());
        }

        if self.config.hotplug {
            match self.backend.watch_directory(&dir) {
                Ok(watcher) => {
                    info!("Watching {} for gamepad hotplug", dir.display());
                    self.watcher = Some(watcher);
                }
                Err(e) if e.kind() == io::ErrorKind::NotFound => {
                    info!("{} vanished before it could be watched", dir.display());
                    return Ok(());
                }
                Err(source) => return Err(GamepadError::Watch { path: dir, source }),
            }
        }

        self.scan(gamepads)
    }

    /// Process pending change notifications.
    ///
    /// # Errors
    ///
    /// A failed read of the notification stream, a malformed record, or the
    /// first probe failure among the processed records.
    pub fn update(&mut self, gamepads: &mut Gamepads<LinuxGamepad>) -> GamepadResult<()> {
        let records = self.drain_notifications()?;
        if records.is_empty() {
            return Ok(());
        }

        let mut first_error = None;
        let mut overflowed = false;
        for record in records {
            debug!("Change notification {:#x} for {:?}", record.mask.0, record.name);
            if record.mask.is_overflow() {
                overflowed = true;
                continue;
            }
            if !self.config.is_event_node(&record.name) {
                continue;
            }

            let path = self.config.node_path(&record.name);
            if record.mask.is_create_or_attrib() {
                if let Err(e) = self.open_gamepad(gamepads, &path) {
                    warn!("Failed to add gamepad {}: {}", path.display(), e);
                    first_error.get_or_insert(e);
                }
            } else if record.mask.is_delete() {
                self.close_gamepad(gamepads, &path);
            }
        }

        if overflowed {
            info!("Change notification queue overflowed; rescanning");
            if let Err(e) = self.rescan(gamepads) {
                first_error.get_or_insert(e);
            }
        }
        first_error.map_or(Ok(()), Err)
    }

    /// Open and probe `path`, registering it when it is a controller.
    ///
    /// Already-tracked paths, unreadable nodes and non-controllers all return
    /// `Ok(None)`.
    ///
    /// # Errors
    ///
    /// Open failures other than missing permission or a vanished node, and
    /// probe-time query failures.
    pub fn open_gamepad(
        &mut self,
        gamepads: &mut Gamepads<LinuxGamepad>,
        path: &Path,
    ) -> GamepadResult<Option<GamepadId>> {
        if gamepads.find(|g| g.native().path() == path).is_some() {
            return Ok(None);
        }

        let device = match self.backend.open_device(path) {
            Ok(device) => device,
            Err(e) if is_skippable_open_error(&e) => {
                debug!("Skipping {}: {}", path.display(), e);
                return Ok(None);
            }
            Err(source) => {
                return Err(GamepadError::Open {
                    path: path.to_path_buf(),
                    source,
                });
            }
        };

        let Some(probed) = probe(path, device)? else {
            return Ok(None);
        };
        info!(
            "Gamepad connected: {} ({}) at {}: {} axes, {} buttons, {} hats",
            probed.name,
            probed.identity,
            path.display(),
            probed.gamepad.layout().axis_count(),
            probed.gamepad.layout().button_count(),
            probed.gamepad.layout().hat_count(),
        );
        Ok(Some(gamepads.add(probed.name, probed.identity, probed.gamepad)))
    }

    /// Close and forget the gamepad tracked at `path`.
    pub fn close_gamepad(&mut self, gamepads: &mut Gamepads<LinuxGamepad>, path: &Path) -> bool {
        let Some(id) = gamepads.find(|g| g.native().path() == path) else {
            return false;
        };
        if let Some(gamepad) = gamepads.get_mut(id) {
            gamepad.native_mut().close();
            info!("Gamepad disconnected: {} at {}", gamepad.name(), path.display());
        }
        gamepads.remove(|g| g.id() == id);
        true
    }

    /// Re-list the device directory: probe new nodes and retire tracked
    /// nodes whose file is gone.
    ///
    /// # Errors
    ///
    /// An unreadable directory or the first probe failure.
    pub fn rescan(&mut self, gamepads: &mut Gamepads<LinuxGamepad>) -> GamepadResult<()> {
        let stale: Vec<PathBuf> = gamepads
            .iter()
            .map(|g| g.native().path().to_path_buf())
            .filter(|path| !path.exists())
            .collect();
        for path in stale {
            self.close_gamepad(gamepads, &path);
        }

        if !self.config.device_dir().is_dir() {
            return Ok(());
        }
        self.scan(gamepads)
    }

    fn scan(&mut self, gamepads: &mut Gamepads<LinuxGamepad>) -> GamepadResult<()> {
        let dir = self.config.device_dir().to_path_buf();
        let scan_error = |source: io::Error| GamepadError::Scan {
            path: dir.clone(),
            source,
        };

        let mut names = Vec::new();
        for entry in std::fs::read_dir(&dir).map_err(scan_error)? {
            let entry = entry.map_err(scan_error)?;
            let name = entry.file_name().to_string_lossy().into_owned();
            if self.config.is_event_node(&name) {
                names.push(name);
            }
        }
        names.sort();

        let mut first_error = None;
        for name in names {
            let path = self.config.node_path(&name);
            if let Err(e) = self.open_gamepad(gamepads, &path) {
                warn!("Failed to probe {}: {}", path.display(), e);
                first_error.get_or_insert(e);
            }
        }
        first_error.map_or(Ok(()), Err)
    }

    fn drain_notifications(&mut self) -> GamepadResult<Vec<NotifyRecord>> {
        let Some(watcher) = self.watcher.as_mut() else {
            return Ok(Vec::new());
        };
        let mut records = Vec::new();
        loop {
            match watcher.read_changes(&mut self.notify_buf) {
                Ok(0) => break,
                Ok(n) => records.extend(NotifyRecord::decode_all(&self.notify_buf[..n])?),
                Err(e) if e.kind() == io::ErrorKind::WouldBlock => break,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(source) => {
                    return Err(GamepadError::Watch {
                        path: self.config.device_dir.clone(),
                        source,
                    });
                }
            }
        }
        Ok(records)
    }
}
