use std::{
    path::{Path, PathBuf},
    time::Duration,
};

use crate::{drives::DriveFinder, poll::PollConfig, ports::PortFinder, reboot::RebootCommand};

/// Where a Zephyr build leaves its UF2, relative to the anchor's ancestor.
const BUILD_OUTPUT: [&str; 3] = ["build", "zephyr", "zephyr.uf2"];

/// How many path components above the tool the build tree sits.
const ANCHOR_DEPTH: usize = 4;

/// Everything one flashing run needs to know.
#[derive(Debug, Clone)]
pub struct FlashConfig {
    /// Serial port to reboot through. `None` means auto-detect.
    pub port: Option<String>,
    pub image: PathBuf,
    pub reboot: RebootCommand,
    /// Pause between sending the reboot byte and the first drive scan.
    pub settle_delay: Duration,
    pub poll: PollConfig,
    pub ports: PortFinder,
    pub drives: DriveFinder,
}

impl FlashConfig {
    pub fn new(image: impl Into<PathBuf>) -> Self {
        Self {
            port: None,
            image: image.into(),
            reboot: RebootCommand::default(),
            settle_delay: Duration::from_secs(1),
            poll: PollConfig::default(),
            ports: PortFinder::default(),
            drives: DriveFinder::default(),
        }
    }

    pub fn port(mut self, port: impl Into<String>) -> Self {
        self.port = Some(port.into());
        self
    }

    pub fn settle_delay(mut self, settle_delay: Duration) -> Self {
        self.settle_delay = settle_delay;
        self
    }

    pub fn poll_interval(mut self, interval: Duration) -> Self {
        self.poll.interval = interval;
        self
    }
}

/// The image path used when none is given: `../../../../build/zephyr/zephyr.uf2`
/// taken lexically from `anchor`, normally the running executable.
pub fn default_image_path(anchor: &Path) -> PathBuf {
    let base = anchor
        .ancestors()
        .nth(ANCHOR_DEPTH)
        .unwrap_or_else(|| Path::new(""));
    BUILD_OUTPUT.iter().fold(base.to_path_buf(), |path, part| path.join(part))
}

/// [`default_image_path`] anchored at the current executable, falling back to
/// the working directory when the executable can't be located.
pub fn default_image_for_current_exe() -> PathBuf {
    match std::env::current_exe() {
        Ok(exe) => default_image_path(&exe),
        Err(err) => {
            log::warn!("Unable to locate the running executable: {err}");
            default_image_path(Path::new(""))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_image_is_four_levels_up() {
        let anchor = Path::new("/west/ornament/app/lilly/flash");
        assert_eq!(
            default_image_path(anchor),
            Path::new("/west/build/zephyr/zephyr.uf2")
        );
    }

    #[test]
    fn shallow_anchor_falls_back_to_relative() {
        assert_eq!(
            default_image_path(Path::new("tool")),
            Path::new("build/zephyr/zephyr.uf2")
        );
    }

    #[test]
    fn builder_overrides() {
        let config = FlashConfig::new("fw.uf2")
            .port("COM3")
            .settle_delay(Duration::from_millis(1500))
            .poll_interval(Duration::from_millis(250));
        assert_eq!(config.port.as_deref(), Some("COM3"));
        assert_eq!(config.settle_delay, Duration::from_millis(1500));
        assert_eq!(config.poll.interval, Duration::from_millis(250));
        assert_eq!(config.poll.timeout, Duration::from_secs(10));
    }
}
