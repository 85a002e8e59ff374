//! Backend capability interface held by each registry entry

use crate::GamepadResult;
use openpad_evdev_protocol::HatState;
use std::time::Duration;

/// What a platform backend exposes for one tracked controller.
///
/// Index-taking queries never fail for an out-of-range index; they return the
/// neutral value instead (`0.0`, `false`, [`HatState::CENTERED`]).
pub trait NativeGamepad: Send {
    /// Drain pending input without blocking.
    ///
    /// # Errors
    ///
    /// Returns an error for read or decode failures other than an empty queue
    /// or a disconnection.
    fn update(&mut self) -> GamepadResult<()>;

    /// False once the device handle has closed.
    fn is_connected(&self) -> bool;

    /// Whether the backend already knows the standard layout without a
    /// mapping-database lookup.
    fn has_own_standard_layout_mapping(&self) -> bool;

    fn axis_count(&self) -> usize;

    fn button_count(&self) -> usize;

    fn hat_count(&self) -> usize;

    fn axis_value(&self, axis: usize) -> f64;

    fn is_button_pressed(&self, button: usize) -> bool;

    /// Analog pressure of a button.
    ///
    /// # Errors
    ///
    /// Backends that only report digital buttons return
    /// [`crate::GamepadError::ButtonValueUnsupported`].
    fn button_value(&self, button: usize) -> GamepadResult<f64>;

    fn hat_state(&self, hat: usize) -> HatState;

    /// Request rumble. Backends without force feedback ignore it.
    fn vibrate(&mut self, duration: Duration, strong_magnitude: f64, weak_magnitude: f64);
}
