//! Command implementations for padctl

pub mod list;
pub mod watch;

use anyhow::Result;
use openpad_gamepad::{DriverConfig, GamepadDriver};
use std::path::{Path, PathBuf};
use tracing::warn;

use crate::error::CliError;

/// Driver options shared by every subcommand
#[derive(Debug, Clone, Default)]
pub struct DriverOptions {
    pub config_file: Option<PathBuf>,
    pub device_dir: Option<PathBuf>,
    pub no_hotplug: bool,
}

impl DriverOptions {
    /// Resolve the driver configuration: file first, then flag overrides.
    pub fn load_config(&self) -> Result<DriverConfig, CliError> {
        let mut config = match &self.config_file {
            Some(path) => read_config(path)?,
            None => DriverConfig::default(),
        };
        if let Some(dir) = &self.device_dir {
            config = config.with_device_dir(dir);
        }
        if self.no_hotplug {
            config = config.with_hotplug(false);
        }
        config.validate()?;
        Ok(config)
    }
}

fn read_config(path: &Path) -> Result<DriverConfig, CliError> {
    let text = std::fs::read_to_string(path)?;
    serde_json::from_str(&text)
        .map_err(|e| CliError::InvalidConfiguration(format!("{}: {}", path.display(), e)))
}

/// Build the driver and run the initial scan.
///
/// A probe failure for one node is reported but does not stop the command;
/// the other gamepads remain usable.
pub fn open_driver(options: &DriverOptions) -> Result<GamepadDriver> {
    let config = options.load_config()?;
    let mut driver = GamepadDriver::new(config);
    if let Err(e) = driver.init() {
        if driver.is_empty() {
            return Err(CliError::from(e).into());
        }
        warn!("Initial scan incomplete: {}", e);
    }
    Ok(driver)
}
