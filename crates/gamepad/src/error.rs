//! Error types for the gamepad driver

use openpad_evdev_protocol::ProtocolError;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum GamepadError {
    #[error("Failed to open {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("ioctl {request} failed for {path}: {source}")]
    Query {
        path: PathBuf,
        request: &'static str,
        #[source]
        source: io::Error,
    },

    #[error("Read failed for {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Hotplug watch failed for {path}: {source}")]
    Watch {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to scan {path}: {source}")]
    Scan {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    #[error("Analog value of button {button} is not available on evdev; query is_button_pressed instead")]
    ButtonValueUnsupported { button: usize },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

pub type GamepadResult<T> = Result<T, GamepadError>;

impl GamepadError {
    fn io_source(&self) -> Option<&io::Error> {
        match self {
            GamepadError::Open { source, .. }
            | GamepadError::Query { source, .. }
            | GamepadError::Read { source, .. }
            | GamepadError::Watch { source, .. }
            | GamepadError::Scan { source, .. } => Some(source),
            _ => None,
        }
    }

    /// The device vanished underneath the operation (`ENODEV`/`ENOENT`).
    pub fn is_device_gone(&self) -> bool {
        self.io_source().is_some_and(is_device_gone)
    }

    /// The caller lacks permission for the node (`EACCES`/`EPERM`).
    pub fn is_access_denied(&self) -> bool {
        self.io_source()
            .is_some_and(|e| e.kind() == io::ErrorKind::PermissionDenied)
    }
}

/// `ENODEV` from a read or ioctl, or `ENOENT` from an open racing a removal.
pub(crate) fn is_device_gone(err: &io::Error) -> bool {
    err.raw_os_error() == Some(libc::ENODEV) || err.kind() == io::ErrorKind::NotFound
}

/// Open failures that mean "not ours to read" rather than a fault: missing
/// permission, a sandbox refusal (`EPERM`), or a node already gone.
pub(crate) fn is_skippable_open_error(err: &io::Error) -> bool {
    matches!(
        err.kind(),
        io::ErrorKind::PermissionDenied | io::ErrorKind::NotFound
    ) || matches!(
        err.raw_os_error(),
        Some(libc::EACCES) | Some(libc::EPERM) | Some(libc::ENOENT)
    )
}
