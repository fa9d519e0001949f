//! Flash a UF2 image onto a board that may still be running its application.
//!
//! If no UF2 bootloader volume is mounted, the board's serial port is found,
//! sent a one byte reboot command, and the volume is polled for until it
//! shows up. The image is then copied onto it.
//!
//! # Examples
//!
//! ```no_run
//! use uf2flash_core::{FlashConfig, NoProgress, SystemHost, flash};
//!
//! let config = FlashConfig::new("build/zephyr/zephyr.uf2");
//! let report = flash(&mut SystemHost::new(), &config, NoProgress).unwrap();
//! println!("wrote {}", report.destination.display());
//! ```

pub mod config;
pub mod drives;
pub mod error;
pub mod flash;
pub mod host;
pub mod image;
pub mod poll;
pub mod ports;
pub mod reboot;

pub use config::{FlashConfig, default_image_for_current_exe, default_image_path};
pub use drives::{DriveFinder, DriveHandle, UF2_MARKER_FILE, VolumeSource};
pub use error::{ErrorKind, FlashError};
pub use flash::{FlashReport, FlashState, flash};
pub use host::{Host, SystemHost};
pub use image::FirmwareImage;
pub use poll::{PollConfig, wait_for_drive};
pub use ports::{PortFinder, PortMatch, PortRule, SerialPortDescriptor};
pub use reboot::{RebootCommand, trigger_bootloader};

pub trait ProgressReporter {
    fn start(&mut self, total_bytes: usize);
    fn advance(&mut self, bytes: usize);
    fn finish(&mut self);
}

pub struct NoProgress;
impl ProgressReporter for NoProgress {
    fn start(&mut self, _total_bytes: usize) {}
    fn advance(&mut self, _bytes: usize) {}
    fn finish(&mut self) {}
}
