//! Error types for padctl CLI

use openpad_gamepad::GamepadError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CliError {
    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("Driver error: {0}")]
    Driver(#[source] GamepadError),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

impl From<GamepadError> for CliError {
    fn from(err: GamepadError) -> Self {
        match err {
            GamepadError::InvalidConfig(msg) => CliError::InvalidConfiguration(msg),
            e if e.is_access_denied() => CliError::PermissionDenied(e.to_string()),
            e => CliError::Driver(e),
        }
    }
}

impl CliError {
    /// Process exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::InvalidConfiguration(_) | CliError::JsonError(_) => 4,
            CliError::PermissionDenied(_) => 6,
            CliError::Driver(_) | CliError::IoError(_) => 1,
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            CliError::PermissionDenied(_) => "permission_denied",
            CliError::InvalidConfiguration(_) => "invalid_configuration",
            CliError::Driver(_) => "driver",
            CliError::IoError(_) => "io",
            CliError::JsonError(_) => "json",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;
    use std::path::PathBuf;

    #[test]
    fn test_gamepad_error_mapping() {
        let err = CliError::from(GamepadError::InvalidConfig("bad".into()));
        assert!(matches!(err, CliError::InvalidConfiguration(_)));
        assert_eq!(err.exit_code(), 4);

        let err = CliError::from(GamepadError::Open {
            path: PathBuf::from("/dev/input/event0"),
            source: io::Error::from(io::ErrorKind::PermissionDenied),
        });
        assert_eq!(err.exit_code(), 6);

        let err = CliError::from(GamepadError::Read {
            path: PathBuf::from("/dev/input/event0"),
            source: io::Error::from(io::ErrorKind::Other),
        });
        assert_eq!(err.exit_code(), 1);
        assert_eq!(err.type_name(), "driver");
    }
}
