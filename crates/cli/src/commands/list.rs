//! One-shot gamepad listing

use anyhow::Result;

use crate::commands::{DriverOptions, open_driver};
use crate::output;

pub fn execute(options: &DriverOptions, json: bool, detailed: bool) -> Result<()> {
    let driver = open_driver(options)?;
    output::print_gamepad_list(&driver.snapshots(), json, detailed);
    Ok(())
}
