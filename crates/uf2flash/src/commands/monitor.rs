use std::{
    io::{self, Read, Write},
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
    thread,
    time::Duration,
};

use anyhow::{Context, Result};
use uf2flash_core::{PortFinder, ports::available_ports};

const ATTEMPTS: usize = 100;
const RETRY_DELAY: Duration = Duration::from_millis(200);
const READ_TIMEOUT: Duration = Duration::from_millis(100);

/// Wait for the freshly flashed application to bring its serial port back and
/// copy everything it prints to stdout until Ctrl+C.
pub fn monitor(finder: &PortFinder, baud_rate: u32) -> Result<()> {
    let running = Arc::new(AtomicBool::new(true));
    {
        let running = running.clone();
        ctrlc::set_handler(move || running.store(false, Ordering::SeqCst))
            .context("Error setting Ctrl-C handler")?;
    }

    log::info!("Looking for the board's serial port...");

    let Some(port_name) = wait_for_port(finder, &running)? else {
        log::warn!("Board serial port did not come back");
        return Ok(());
    };

    let Some(mut port) = open_port(&port_name, baud_rate, &running) else {
        log::warn!("Unable to open {port_name}");
        return Ok(());
    };

    // Zephyr's CDC ACM holds output back until the host raises DTR
    if let Err(err) = port.write_data_terminal_ready(true) {
        log::debug!("Unable to set DTR on {port_name}: {err}");
    }

    log::info!("Connected to {port_name}, press Ctrl+C to exit");

    stream(&mut port, &mut io::stdout(), &running, &port_name)?;

    Ok(())
}

/// Copy `port` into `out` until Ctrl+C, end of stream or a read error.
fn stream(
    port: &mut impl Read,
    out: &mut impl Write,
    running: &AtomicBool,
    port_name: &str,
) -> io::Result<()> {
    let mut serial_buf = [0; 1024];
    while running.load(Ordering::SeqCst) {
        match port.read(&mut serial_buf) {
            Ok(0) => {
                log::info!("{port_name} closed");
                break;
            }
            Ok(read) => {
                out.write_all(&serial_buf[..read])?;
                out.flush()?;
            }
            Err(ref e) if e.kind() == io::ErrorKind::TimedOut => (),
            Err(e) if e.kind() == io::ErrorKind::Interrupted => break,
            Err(e) => {
                log::info!("{port_name} closed: {e}");
                break;
            }
        }
    }

    Ok(())
}

fn wait_for_port(finder: &PortFinder, running: &AtomicBool) -> Result<Option<String>> {
    for _ in 0..ATTEMPTS {
        if !running.load(Ordering::SeqCst) {
            break;
        }

        if let Some(found) = finder.find(&available_ports()?) {
            log::info!("Found board serial on {}", found.port_name);
            return Ok(Some(found.port_name));
        }

        thread::sleep(RETRY_DELAY);
    }

    Ok(None)
}

fn open_port(
    port_name: &str,
    baud_rate: u32,
    running: &AtomicBool,
) -> Option<Box<dyn serialport::SerialPort>> {
    for _ in 0..ATTEMPTS {
        if !running.load(Ordering::SeqCst) {
            break;
        }

        match serialport::new(port_name, baud_rate)
            .timeout(READ_TIMEOUT)
            .flow_control(serialport::FlowControl::None)
            .open()
        {
            Ok(port) => return Some(port),
            Err(err) => log::debug!("Opening {port_name} failed: {err}"),
        }

        thread::sleep(RETRY_DELAY);
    }

    None
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;

    use super::*;

    struct Scripted(VecDeque<io::Result<Vec<u8>>>);

    impl Read for Scripted {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            match self.0.pop_front() {
                Some(Ok(bytes)) => {
                    buf[..bytes.len()].copy_from_slice(&bytes);
                    Ok(bytes.len())
                }
                Some(Err(err)) => Err(err),
                None => Ok(0),
            }
        }
    }

    #[test]
    fn end_of_stream_stops_streaming() {
        let mut port = Scripted(VecDeque::from([
            Err(io::ErrorKind::TimedOut.into()),
            Ok(b"hello ".to_vec()),
            Ok(b"board\n".to_vec()),
        ]));
        let mut out = Vec::new();
        let running = AtomicBool::new(true);

        stream(&mut port, &mut out, &running, "/dev/ttyACM0").unwrap();

        assert_eq!(out, b"hello board\n");
        assert!(running.load(Ordering::SeqCst));
    }

    #[test]
    fn read_error_stops_streaming() {
        let mut port = Scripted(VecDeque::from([
            Ok(b"boot".to_vec()),
            Err(io::ErrorKind::BrokenPipe.into()),
            Ok(b"never read".to_vec()),
        ]));
        let mut out = Vec::new();

        stream(&mut port, &mut out, &AtomicBool::new(true), "COM4").unwrap();

        assert_eq!(out, b"boot");
    }

    #[test]
    fn nothing_is_read_after_ctrl_c() {
        let mut port = io::Cursor::new(b"pending".to_vec());
        let mut out = Vec::new();

        stream(&mut port, &mut out, &AtomicBool::new(false), "COM4").unwrap();

        assert!(out.is_empty());
        assert_eq!(port.position(), 0);
    }
}
