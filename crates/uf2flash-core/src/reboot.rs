//! Reboot-to-bootloader over the application's serial port.

use std::{io::Write, time::Duration};

use crate::error::{FlashError, Result};

/// The single byte the application firmware treats as "reboot into the
/// bootloader", and how to deliver it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RebootCommand {
    pub byte: u8,
    pub baud_rate: u32,
    pub timeout: Duration,
}

impl Default for RebootCommand {
    fn default() -> Self {
        Self {
            byte: b'R',
            baud_rate: 115200,
            timeout: Duration::from_secs(1),
        }
    }
}

impl RebootCommand {
    /// Write the command byte to an already open link. No reply is read.
    pub fn send_to(&self, link: &mut impl Write) -> std::io::Result<()> {
        link.write_all(&[self.byte])?;
        link.flush()
    }
}

/// Open `port_name`, send the reboot byte and close the port again.
///
/// The port is dropped before returning on every path, so nothing is held
/// open while the board drops off the bus.
pub fn trigger_bootloader(port_name: &str, command: &RebootCommand) -> Result<()> {
    log::info!("Sending reboot command to {port_name}...");

    let mut port = serialport::new(port_name, command.baud_rate)
        .timeout(command.timeout)
        .open()
        .map_err(|source| FlashError::OpenPort {
            port: port_name.to_string(),
            source,
        })?;

    let sent = command.send_to(&mut port);
    drop(port);

    sent.map_err(|source| FlashError::WritePort {
        port: port_name.to_string(),
        source,
    })?;

    log::info!("Reboot command sent");
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::io;

    use super::*;

    #[test]
    fn default_command() {
        let command = RebootCommand::default();
        assert_eq!(command.byte, b'R');
        assert_eq!(command.baud_rate, 115200);
        assert_eq!(command.timeout, Duration::from_secs(1));
    }

    #[test]
    fn sends_exactly_one_byte() {
        let mut link = Vec::new();
        RebootCommand::default().send_to(&mut link).unwrap();
        assert_eq!(link, b"R");
    }

    struct BrokenLink;

    impl Write for BrokenLink {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "device went away"))
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn write_error_surfaces() {
        let err = RebootCommand::default().send_to(&mut BrokenLink).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::BrokenPipe);
    }

    #[test]
    fn missing_port_fails_to_open() {
        let name = if cfg!(windows) {
            "COM250"
        } else {
            "/dev/uf2flash-no-such-port"
        };
        match trigger_bootloader(name, &RebootCommand::default()) {
            Err(FlashError::OpenPort { port, .. }) => assert_eq!(port, name),
            other => panic!("unexpected result {other:?}"),
        }
    }
}
