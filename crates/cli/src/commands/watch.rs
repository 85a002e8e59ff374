//! Live state monitoring

use anyhow::Result;
use openpad_gamepad::{GamepadId, GamepadSnapshot};
use std::collections::BTreeMap;
use std::time::Duration;
use tokio::time::{MissedTickBehavior, interval};
use tracing::{debug, warn};

use crate::commands::{DriverOptions, open_driver};
use crate::output;

/// Poll the driver on a fixed tick, printing hotplug transitions and state
/// changes until Ctrl+C or `ticks` updates have run.
pub async fn execute(
    options: &DriverOptions,
    json: bool,
    interval_ms: u64,
    ticks: Option<u64>,
) -> Result<()> {
    let mut driver = open_driver(options)?;

    if !json {
        println!("Watching gamepads (Press Ctrl+C to stop)");
    }

    let mut previous: BTreeMap<GamepadId, GamepadSnapshot> = BTreeMap::new();
    for snapshot in driver.snapshots() {
        output::print_connection(&snapshot, true, json);
        previous.insert(snapshot.id, snapshot);
    }

    let mut ticker = interval(Duration::from_millis(interval_ms.max(1)));
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let mut remaining = ticks;

    loop {
        tokio::select! {
            _ = ticker.tick() => {}
            _ = tokio::signal::ctrl_c() => {
                debug!("Interrupted");
                break;
            }
        }

        if let Err(e) = driver.update() {
            warn!("Update failed: {}", e);
        }
        previous = report_changes(previous, driver.snapshots(), json);

        if let Some(left) = remaining.as_mut() {
            *left = left.saturating_sub(1);
            if *left == 0 {
                break;
            }
        }
    }
    Ok(())
}

fn report_changes(
    mut previous: BTreeMap<GamepadId, GamepadSnapshot>,
    current: Vec<GamepadSnapshot>,
    json: bool,
) -> BTreeMap<GamepadId, GamepadSnapshot> {
    let mut next = BTreeMap::new();
    for snapshot in current {
        match previous.remove(&snapshot.id) {
            Some(old) if old.path == snapshot.path => {
                if old != snapshot {
                    output::print_state_change(&snapshot, json);
                }
            }
            Some(old) => {
                output::print_connection(&old, false, json);
                output::print_connection(&snapshot, true, json);
            }
            None => output::print_connection(&snapshot, true, json),
        }
        next.insert(snapshot.id, snapshot);
    }
    for gone in previous.values() {
        output::print_connection(gone, false, json);
    }
    next
}
