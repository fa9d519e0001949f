//! The end to end flow: find the board, get it into its bootloader, copy the
//! image.
//!
//! Every step runs once, in order. The first failure ends the run.

use std::{fmt, path::PathBuf};

use crate::{
    ProgressReporter,
    config::FlashConfig,
    drives::DriveHandle,
    error::Result,
    host::Host,
    image::FirmwareImage,
    poll::wait_for_drive,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlashState {
    Start,
    CheckAlreadyInBootloader,
    FindPort,
    TriggerReboot,
    WaitSettle,
    WaitForDrive,
    Copy,
    End,
}

impl fmt::Display for FlashState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Start => "start",
            Self::CheckAlreadyInBootloader => "check already in bootloader",
            Self::FindPort => "find port",
            Self::TriggerReboot => "trigger reboot",
            Self::WaitSettle => "wait for settle",
            Self::WaitForDrive => "wait for drive",
            Self::Copy => "copy",
            Self::End => "end",
        };
        f.write_str(name)
    }
}

/// What a successful run did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlashReport {
    pub drive: DriveHandle,
    pub destination: PathBuf,
    /// The port the reboot byte went to, `None` if the board was already in
    /// its bootloader.
    pub rebooted_via: Option<String>,
}

fn enter(state: FlashState) {
    log::debug!("-> {state}");
}

pub fn flash(
    host: &mut dyn Host,
    config: &FlashConfig,
    progress: impl ProgressReporter,
) -> Result<FlashReport> {
    enter(FlashState::Start);
    let image = FirmwareImage::open(&config.image)?;
    log::info!("UF2 file: {}", image.path().display());

    enter(FlashState::CheckAlreadyInBootloader);
    if let Some(drive) = config.drives.find(host.volume_source()) {
        log::info!(
            "Pico already in bootloader mode at {}",
            drive.mount_point.display()
        );
        return copy(&image, drive, None, progress);
    }

    enter(FlashState::FindPort);
    let port_name = match &config.port {
        Some(port) => port.clone(),
        None => {
            let found = config.ports.require(host.serial_ports()?)?;
            log::debug!("Picked {} by {}", found.port_name, found.rule);
            found.port_name
        }
    };
    log::info!("Using COM port: {port_name}");

    enter(FlashState::TriggerReboot);
    host.send_reboot(&port_name, &config.reboot)?;

    enter(FlashState::WaitSettle);
    host.sleep(config.settle_delay);

    enter(FlashState::WaitForDrive);
    let drive = wait_for_drive(host, &config.drives, &config.poll)?;

    copy(&image, drive, Some(port_name), progress)
}

fn copy(
    image: &FirmwareImage,
    drive: DriveHandle,
    rebooted_via: Option<String>,
    progress: impl ProgressReporter,
) -> Result<FlashReport> {
    enter(FlashState::Copy);
    let destination = image.copy_to(&drive, progress)?;

    enter(FlashState::End);
    Ok(FlashReport {
        drive,
        destination,
        rebooted_via,
    })
}
