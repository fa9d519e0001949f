//! Everything the flashing flow needs from the machine it runs on.

use std::time::{Duration, Instant};

use crate::{
    drives::{VolumeSource, host_volumes},
    error::Result,
    ports::{self, SerialPortDescriptor},
    reboot::{self, RebootCommand},
};

pub trait Host {
    /// Serial ports attached right now.
    fn serial_ports(&mut self) -> Result<Vec<SerialPortDescriptor>>;

    /// Where mounted volumes are listed from. Re-queried on every scan.
    fn volume_source(&self) -> &dyn VolumeSource;

    /// Deliver the reboot command on `port_name`.
    fn send_reboot(&mut self, port_name: &str, command: &RebootCommand) -> Result<()>;

    fn sleep(&mut self, duration: Duration);

    /// Monotonic time since the host was created.
    fn now(&self) -> Duration;
}

/// The real machine: OS serial enumeration, mounted volumes and wall clock.
pub struct SystemHost {
    volumes: Box<dyn VolumeSource>,
    started: Instant,
}

impl Default for SystemHost {
    fn default() -> Self {
        Self::new()
    }
}

impl SystemHost {
    pub fn new() -> Self {
        Self::with_volumes(host_volumes())
    }

    pub fn with_volumes(volumes: Box<dyn VolumeSource>) -> Self {
        Self {
            volumes,
            started: Instant::now(),
        }
    }
}

impl Host for SystemHost {
    fn serial_ports(&mut self) -> Result<Vec<SerialPortDescriptor>> {
        ports::available_ports()
    }

    fn volume_source(&self) -> &dyn VolumeSource {
        self.volumes.as_ref()
    }

    fn send_reboot(&mut self, port_name: &str, command: &RebootCommand) -> Result<()> {
        reboot::trigger_bootloader(port_name, command)
    }

    fn sleep(&mut self, duration: Duration) {
        std::thread::sleep(duration);
    }

    fn now(&self) -> Duration {
        self.started.elapsed()
    }
}
