//! Output formatting for CLI responses

use anyhow::Error;
use colored::*;
use openpad_gamepad::{GamepadSnapshot, HatState};
use serde_json::json;

use crate::error::CliError;

fn print_json(value: &serde_json::Value) {
    match serde_json::to_string_pretty(value) {
        Ok(s) => println!("{}", s),
        Err(e) => eprintln!("Failed to format output as JSON: {}", e),
    }
}

/// Print error in JSON format
pub fn print_error_json(error: &Error) {
    let kind = error
        .downcast_ref::<CliError>()
        .map_or("error", CliError::type_name);
    print_json(&json!({
        "success": false,
        "error": {
            "message": error.to_string(),
            "type": kind
        }
    }));
}

/// Print error in human-readable format
pub fn print_error_human(error: &Error) {
    eprintln!("{} {}", "Error:".red().bold(), error);

    let mut source = error.source();
    while let Some(err) = source {
        eprintln!("  {} {}", "Caused by:".yellow(), err);
        source = err.source();
    }
}

/// Print gamepad list in specified format
pub fn print_gamepad_list(gamepads: &[GamepadSnapshot], json: bool, detailed: bool) {
    if json {
        print_json(&json!({
            "success": true,
            "gamepads": gamepads
        }));
        return;
    }

    if gamepads.is_empty() {
        println!("{}", "No gamepads found".yellow());
        return;
    }

    println!("{}", "Connected Gamepads:".bold());
    for gamepad in gamepads {
        println!(
            "  {} {} ({})",
            "●".green(),
            gamepad.name.bold(),
            gamepad.id.to_string().dimmed()
        );
        println!("    Path: {}", gamepad.path);
        println!("    Identity: {}", gamepad.identity);
        println!(
            "    Controls: {} axes, {} buttons, {} hats",
            gamepad.axes.len(),
            gamepad.buttons.len(),
            gamepad.hats.len()
        );
        if detailed {
            print_state_human(gamepad);
        }
    }
}

fn print_state_human(gamepad: &GamepadSnapshot) {
    if !gamepad.axes.is_empty() {
        let axes: Vec<String> = gamepad.axes.iter().map(|v| format!("{:+.3}", v)).collect();
        println!("    Axes: {}", axes.join(" "));
    }
    if !gamepad.buttons.is_empty() {
        let buttons: String = gamepad
            .buttons
            .iter()
            .map(|pressed| if *pressed { '1' } else { '0' })
            .collect();
        println!("    Buttons: {}", buttons);
    }
    if !gamepad.hats.is_empty() {
        let hats: Vec<&str> = gamepad.hats.iter().map(|h| hat_label(*h)).collect();
        println!("    Hats: {}", hats.join(" "));
    }
}

/// Print a gamepad whose state changed since the previous tick
pub fn print_state_change(gamepad: &GamepadSnapshot, json: bool) {
    if json {
        match serde_json::to_string(gamepad) {
            Ok(s) => println!("{}", s),
            Err(e) => eprintln!("Failed to format state as JSON: {}", e),
        }
        return;
    }
    println!("{} {}", format!("[{}]", gamepad.id).cyan(), gamepad.name.bold());
    print_state_human(gamepad);
}

/// Print a hotplug transition
pub fn print_connection(gamepad: &GamepadSnapshot, connected: bool, json: bool) {
    if json {
        print_json(&json!({
            "event": if connected { "connected" } else { "disconnected" },
            "id": gamepad.id,
            "name": gamepad.name,
            "identity": gamepad.identity,
        }));
        return;
    }
    if connected {
        println!("{} {} ({})", "+".green().bold(), gamepad.name, gamepad.path);
    } else {
        println!("{} {} ({})", "-".red().bold(), gamepad.name, gamepad.path);
    }
}

pub fn hat_label(hat: HatState) -> &'static str {
    const LABELS: [&str; 16] = [
        "C", "N", "E", "NE", "S", "?", "SE", "?", "W", "NW", "?", "?", "SW", "?", "?", "?",
    ];
    LABELS
        .get(usize::from(hat.bits()))
        .copied()
        .unwrap_or("?")
}
