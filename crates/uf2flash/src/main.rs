use std::{path::PathBuf, process::ExitCode, time::Duration};

use clap::Parser;
use env_logger::Env;

mod commands;
mod progress_bar;

/// Reboot a board into its UF2 bootloader over serial and copy firmware onto it.
///
/// With no arguments the serial port is auto-detected and the image is taken
/// from `../../../../build/zephyr/zephyr.uf2` relative to this executable.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Opts {
    /// Verbose
    #[arg(short, long)]
    verbose: bool,

    /// List serial ports and UF2 bootloader drives, then exit
    #[arg(short, long)]
    list: bool,

    /// Pause after sending the reboot command before looking for the drive, in milliseconds
    #[arg(long, value_name = "MS", default_value_t = 1000)]
    settle_ms: u64,

    /// Time between scans for the bootloader drive, in milliseconds
    #[arg(long, value_name = "MS", default_value_t = 500,
          value_parser = clap::value_parser!(u64).range(1..))]
    poll_interval_ms: u64,

    /// Stream the board's serial output once it has been flashed
    #[cfg(feature = "serial")]
    #[arg(short, long)]
    monitor: bool,

    /// Serial port of the running board, auto-detected when omitted
    #[arg(value_name = "SERIAL_PORT")]
    port: Option<String>,

    /// UF2 image to flash
    #[arg(value_name = "IMAGE_PATH")]
    image: Option<PathBuf>,
}

fn main() -> ExitCode {
    let opts = match Opts::try_parse() {
        Ok(opts) => opts,
        Err(err) => {
            let _ = err.print();
            return match err.kind() {
                clap::error::ErrorKind::DisplayHelp | clap::error::ErrorKind::DisplayVersion => {
                    ExitCode::SUCCESS
                }
                _ => ExitCode::FAILURE,
            };
        }
    };

    let level = if opts.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(Env::default().default_filter_or(level))
        .format_timestamp(None)
        .format_target(false)
        .init();

    #[cfg(feature = "serial")]
    let monitor = opts.monitor;
    #[cfg(not(feature = "serial"))]
    let monitor = false;

    let result = if opts.list {
        commands::list::list()
    } else {
        commands::flash::flash(
            opts.port,
            opts.image,
            Duration::from_millis(opts.settle_ms),
            Duration::from_millis(opts.poll_interval_ms),
            monitor,
        )
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            commands::report(&err);
            ExitCode::FAILURE
        }
    }
}
