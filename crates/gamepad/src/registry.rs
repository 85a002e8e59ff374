//! Tracked-device registry
//!
//! The backend only calls [`Gamepads::add`], [`Gamepads::find`] and
//! [`Gamepads::remove`]. The remaining accessors serve callers of the facade.

use crate::GamepadResult;
use crate::native::NativeGamepad;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::warn;

/// Slot index of a tracked gamepad. Reused after removal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct GamepadId(pub usize);

impl fmt::Display for GamepadId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A registry entry: generic metadata plus the backend payload.
#[derive(Debug)]
pub struct Gamepad<N> {
    id: GamepadId,
    name: String,
    identity: String,
    native: N,
}

impl<N: NativeGamepad> Gamepad<N> {
    pub fn id(&self) -> GamepadId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// 32-hex-digit identity string used for mapping-database lookups.
    pub fn identity(&self) -> &str {
        &self.identity
    }

    pub fn native(&self) -> &N {
        &self.native
    }

    pub fn native_mut(&mut self) -> &mut N {
        &mut self.native
    }
}

#[derive(Debug)]
pub struct Gamepads<N> {
    slots: Vec<Option<Gamepad<N>>>,
}

impl<N> Default for Gamepads<N> {
    fn default() -> Self {
        Self { slots: Vec::new() }
    }
}

impl<N: NativeGamepad> Gamepads<N> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Track a new gamepad in the lowest free slot.
    pub fn add(&mut self, name: impl Into<String>, identity: impl Into<String>, native: N) -> GamepadId {
        let index = self
            .slots
            .iter()
            .position(Option::is_none)
            .unwrap_or(self.slots.len());
        let id = GamepadId(index);
        let gamepad = Gamepad {
            id,
            name: name.into(),
            identity: identity.into(),
            native,
        };
        match self.slots.get_mut(index) {
            Some(slot) => *slot = Some(gamepad),
            None => self.slots.push(Some(gamepad)),
        }
        id
    }

    /// First tracked gamepad matching `predicate`.
    pub fn find(&self, mut predicate: impl FnMut(&Gamepad<N>) -> bool) -> Option<GamepadId> {
        self.iter().find(|g| predicate(g)).map(Gamepad::id)
    }

    /// Drop every tracked gamepad matching `predicate`.
    pub fn remove(&mut self, mut predicate: impl FnMut(&Gamepad<N>) -> bool) {
        for slot in &mut self.slots {
            if slot.as_ref().is_some_and(&mut predicate) {
                *slot = None;
            }
        }
        while matches!(self.slots.last(), Some(None)) {
            self.slots.pop();
        }
    }

    pub fn get(&self, id: GamepadId) -> Option<&Gamepad<N>> {
        self.slots.get(id.0).and_then(Option::as_ref)
    }

    pub fn get_mut(&mut self, id: GamepadId) -> Option<&mut Gamepad<N>> {
        self.slots.get_mut(id.0).and_then(Option::as_mut)
    }

    pub fn len(&self) -> usize {
        self.slots.iter().flatten().count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn ids(&self) -> Vec<GamepadId> {
        self.iter().map(Gamepad::id).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Gamepad<N>> {
        self.slots.iter().flatten()
    }

    /// Drain input on every tracked gamepad.
    ///
    /// Every gamepad is updated even if one fails; the first failure is
    /// returned. With `remove_disconnected`, entries whose device closed are
    /// dropped afterwards.
    ///
    /// # Errors
    ///
    /// The first error returned by a gamepad's update.
    pub fn update(&mut self, remove_disconnected: bool) -> GamepadResult<()> {
        let mut first_error = None;
        for gamepad in self.slots.iter_mut().flatten() {
            if let Err(e) = gamepad.native.update() {
                warn!("Update failed for gamepad {} ({}): {}", gamepad.id, gamepad.name, e);
                first_error.get_or_insert(e);
            }
        }
        if remove_disconnected {
            self.remove(|g| !g.native.is_connected());
        }
        first_error.map_or(Ok(()), Err)
    }
}
