//! Error types for the flashing flow

use std::{path::PathBuf, time::Duration};

use thiserror::Error;

use crate::ports::SerialPortDescriptor;

/// The class a [`FlashError`] belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The run was misconfigured before any device was touched
    Configuration,
    /// No serial port looked like the target board
    DeviceNotFound,
    /// Talking to the serial port failed
    Communication,
    /// The bootloader volume never showed up
    Timeout,
    /// Writing the image onto the volume failed
    Copy,
}

#[derive(Debug, Error)]
pub enum FlashError {
    #[error("UF2 file not found: {}", path.display())]
    ImageNotFound { path: PathBuf },

    #[error("Image path {} has no file name", path.display())]
    ImageHasNoFileName { path: PathBuf },

    #[error("Could not find the board's serial port ({} port(s) available)", available.len())]
    PortNotFound {
        available: Vec<SerialPortDescriptor>,
    },

    #[error("Failed to enumerate serial ports: {0}")]
    PortEnumeration(#[source] serialport::Error),

    #[error("Failed to open serial port {port}: {source}")]
    OpenPort {
        port: String,
        #[source]
        source: serialport::Error,
    },

    #[error("Failed to write reboot command to {port}: {source}")]
    WritePort {
        port: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Bootloader drive did not appear within {:.1}s", waited.as_secs_f32())]
    DriveTimeout { waited: Duration },

    #[error("Failed to copy {} to {}: {source}", from.display(), to.display())]
    Copy {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl FlashError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::ImageNotFound { .. } | Self::ImageHasNoFileName { .. } => {
                ErrorKind::Configuration
            }
            Self::PortNotFound { .. } => ErrorKind::DeviceNotFound,
            Self::PortEnumeration(_) | Self::OpenPort { .. } | Self::WritePort { .. } => {
                ErrorKind::Communication
            }
            Self::DriveTimeout { .. } => ErrorKind::Timeout,
            Self::Copy { .. } => ErrorKind::Copy,
        }
    }
}

pub type Result<T> = std::result::Result<T, FlashError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_image_message_names_path() {
        let err = FlashError::ImageNotFound {
            path: PathBuf::from("build/zephyr/zephyr.uf2"),
        };
        assert_eq!(err.kind(), ErrorKind::Configuration);
        assert!(err.to_string().contains("build/zephyr/zephyr.uf2"));
    }

    #[test]
    fn write_failure_is_communication() {
        let err = FlashError::WritePort {
            port: "COM5".into(),
            source: std::io::Error::new(std::io::ErrorKind::BrokenPipe, "gone"),
        };
        assert_eq!(err.kind(), ErrorKind::Communication);
        assert!(err.to_string().contains("COM5"));
        assert!(err.to_string().contains("gone"));
    }

    #[test]
    fn timeout_reports_wait() {
        let err = FlashError::DriveTimeout {
            waited: Duration::from_secs(10),
        };
        assert_eq!(err.kind(), ErrorKind::Timeout);
        assert_eq!(err.to_string(), "Bootloader drive did not appear within 10.0s");
    }
}
