use std::time::Duration;

use crate::{
    drives::{DriveFinder, DriveHandle},
    error::{FlashError, Result},
    host::Host,
};

/// How often and for how long to look for the bootloader volume.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollConfig {
    pub interval: Duration,
    pub timeout: Duration,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_millis(500),
            timeout: Duration::from_secs(10),
        }
    }
}

/// Scan for a bootloader volume until one shows up or `config.timeout`
/// passes.
pub fn wait_for_drive(
    host: &mut dyn Host,
    finder: &DriveFinder,
    config: &PollConfig,
) -> Result<DriveHandle> {
    log::info!("Waiting for Pico drive to appear...");

    let start = host.now();
    let mut attempts = 0u32;

    while host.now().saturating_sub(start) < config.timeout {
        attempts += 1;
        if let Some(drive) = finder.find(host.volume_source()) {
            log::info!("Found Pico drive at {}", drive.mount_point.display());
            return Ok(drive);
        }
        log::debug!("No bootloader drive yet (attempt {attempts})");
        host.sleep(config.interval);
    }

    Err(FlashError::DriveTimeout {
        waited: host.now().saturating_sub(start),
    })
}
