use std::{path::PathBuf, time::Duration};

use anyhow::Result;
use uf2flash_core::{FlashConfig, SystemHost, default_image_for_current_exe};

use crate::progress_bar::ProgressBarReporter;

pub fn flash(
    port: Option<String>,
    image: Option<PathBuf>,
    settle_delay: Duration,
    poll_interval: Duration,
    monitor: bool,
) -> Result<()> {
    let image = image.unwrap_or_else(default_image_for_current_exe);

    let mut config = FlashConfig::new(image)
        .settle_delay(settle_delay)
        .poll_interval(poll_interval);
    if let Some(port) = port {
        config = config.port(port);
    }

    let report = uf2flash_core::flash(
        &mut SystemHost::new(),
        &config,
        ProgressBarReporter::new(),
    )?;

    log::debug!(
        "Wrote {} to {}",
        config.image.display(),
        report.destination.display()
    );

    #[cfg(feature = "serial")]
    if monitor {
        super::monitor::monitor(&config.ports, config.reboot.baud_rate)?;
    }
    #[cfg(not(feature = "serial"))]
    if monitor {
        log::warn!("Built without the `serial` feature, not monitoring");
    }

    Ok(())
}
