//! Driver configuration

use crate::{GamepadError, GamepadResult};
use openpad_evdev_protocol::codes::is_event_node_name;
use openpad_evdev_protocol::inotify;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const DEFAULT_DEVICE_DIR: &str = "/dev/input";
pub const DEFAULT_NODE_PREFIX: &str = "event";
pub const DEFAULT_NOTIFY_BUFFER_SIZE: usize = 16384;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DriverConfig {
    /// Directory scanned at init and watched for hotplug.
    pub device_dir: PathBuf,
    /// Controller nodes are this prefix followed by digits.
    pub node_prefix: String,
    /// Arm the change-notification watch at init.
    pub hotplug: bool,
    /// Bytes read per drain of the change-notification descriptor.
    pub notify_buffer_size: usize,
    /// Drop registry entries whose device disconnected during a read.
    pub remove_disconnected: bool,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            device_dir: PathBuf::from(DEFAULT_DEVICE_DIR),
            node_prefix: DEFAULT_NODE_PREFIX.to_string(),
            hotplug: true,
            notify_buffer_size: DEFAULT_NOTIFY_BUFFER_SIZE,
            remove_disconnected: true,
        }
    }
}

impl DriverConfig {
    pub fn with_device_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.device_dir = dir.into();
        self
    }

    pub fn with_hotplug(mut self, hotplug: bool) -> Self {
        self.hotplug = hotplug;
        self
    }

    /// # Errors
    ///
    /// Returns [`GamepadError::InvalidConfig`] for an empty node prefix or a
    /// notification buffer too small for one record.
    pub fn validate(&self) -> GamepadResult<()> {
        if self.node_prefix.is_empty() {
            return Err(GamepadError::InvalidConfig(
                "node_prefix must not be empty".to_string(),
            ));
        }
        if self.notify_buffer_size < inotify::MIN_BUFFER_SIZE {
            return Err(GamepadError::InvalidConfig(format!(
                "notify_buffer_size must be at least {} bytes, got {}",
                inotify::MIN_BUFFER_SIZE,
                self.notify_buffer_size
            )));
        }
        Ok(())
    }

    pub fn is_event_node(&self, name: &str) -> bool {
        is_event_node_name(name, &self.node_prefix)
    }

    pub fn node_path(&self, name: &str) -> PathBuf {
        self.device_dir.join(name)
    }

    pub fn device_dir(&self) -> &Path {
        &self.device_dir
    }
}
