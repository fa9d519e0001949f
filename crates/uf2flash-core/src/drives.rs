//! UF2 bootloader volume discovery.

use std::path::{Path, PathBuf};

/// File every UF2 bootloader puts at the root of its volume.
pub const UF2_MARKER_FILE: &str = "INFO_UF2.TXT";

/// A mounted volume. Only meaningful while the volume stays mounted, so it is
/// re-enumerated on every scan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DriveHandle {
    pub mount_point: PathBuf,
    pub label: Option<String>,
}

impl DriveHandle {
    pub fn new(mount_point: impl Into<PathBuf>) -> Self {
        Self {
            mount_point: mount_point.into(),
            label: None,
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn path(&self) -> &Path {
        &self.mount_point
    }
}

/// Something that can list the volumes currently mounted on the host.
pub trait VolumeSource {
    fn volumes(&self) -> Vec<DriveHandle>;
}

/// Volumes as reported by [`sysinfo::Disks`].
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemVolumes;

impl VolumeSource for SystemVolumes {
    fn volumes(&self) -> Vec<DriveHandle> {
        labelled_mounts()
            .into_iter()
            .map(|(mount_point, label)| {
                let handle = DriveHandle::new(mount_point);
                match label {
                    Some(label) => handle.with_label(label),
                    None => handle,
                }
            })
            .collect()
    }
}

/// Every mount point sysinfo knows about, with its volume label.
fn labelled_mounts() -> Vec<(PathBuf, Option<String>)> {
    let disks = sysinfo::Disks::new_with_refreshed_list();
    disks
        .list()
        .iter()
        .map(|disk| {
            let mount_point = disk.mount_point().to_path_buf();
            let label = volume_label(&mount_point, &disk.name().to_string_lossy());
            (mount_point, label)
        })
        .collect()
}

/// Windows reports the volume label as the disk name. Elsewhere the disk name
/// is the device node (`/dev/sdb1`) and automounters name the mount directory
/// after the label (`/media/user/RPI-RP2`).
fn volume_label(mount_point: &Path, disk_name: &str) -> Option<String> {
    let label = if cfg!(windows) {
        disk_name.to_string()
    } else {
        mount_point
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default()
    };
    (!label.is_empty()).then_some(label)
}

/// Every drive letter from `A:` to `Z:`.
#[cfg(windows)]
#[derive(Debug, Default, Clone, Copy)]
pub struct DriveLetters;

#[cfg(windows)]
impl VolumeSource for DriveLetters {
    fn volumes(&self) -> Vec<DriveHandle> {
        letter_drives(&labelled_mounts())
    }
}

/// `A:\` to `Z:\`, each carrying the label of the mount at that letter.
#[cfg_attr(not(windows), allow(dead_code))]
fn letter_drives(mounts: &[(PathBuf, Option<String>)]) -> Vec<DriveHandle> {
    (b'A'..=b'Z')
        .map(|letter| {
            let handle = DriveHandle::new(format!("{}:\\", letter as char));
            let label = mounts
                .iter()
                .find(|(mount_point, _)| *mount_point == handle.mount_point)
                .and_then(|(_, label)| label.clone());
            match label {
                Some(label) => handle.with_label(label),
                None => handle,
            }
        })
        .collect()
}

impl<T: VolumeSource + ?Sized> VolumeSource for &T {
    fn volumes(&self) -> Vec<DriveHandle> {
        (**self).volumes()
    }
}

impl VolumeSource for Vec<DriveHandle> {
    fn volumes(&self) -> Vec<DriveHandle> {
        self.clone()
    }
}

/// The native way of listing mount points on this host.
pub fn host_volumes() -> Box<dyn VolumeSource> {
    #[cfg(windows)]
    {
        Box::new(DriveLetters)
    }
    #[cfg(not(windows))]
    {
        Box::new(SystemVolumes)
    }
}

#[derive(Debug, Clone)]
pub struct DriveFinder {
    marker: String,
}

impl Default for DriveFinder {
    fn default() -> Self {
        Self::new(UF2_MARKER_FILE)
    }
}

impl DriveFinder {
    pub fn new(marker: impl Into<String>) -> Self {
        Self {
            marker: marker.into(),
        }
    }

    pub fn marker(&self) -> &str {
        &self.marker
    }

    pub fn is_bootloader_volume(&self, drive: &DriveHandle) -> bool {
        drive.mount_point.is_dir() && drive.mount_point.join(&self.marker).is_file()
    }

    /// First mounted volume that carries the marker file.
    pub fn find(&self, source: &dyn VolumeSource) -> Option<DriveHandle> {
        let found = source
            .volumes()
            .into_iter()
            .find(|drive| self.is_bootloader_volume(drive));

        if let Some(drive) = &found {
            log::debug!(
                "{} contains {}",
                drive.mount_point.display(),
                self.marker
            );
        }

        found
    }

    /// Every mounted volume that carries the marker file.
    pub fn find_all(&self, source: &dyn VolumeSource) -> Vec<DriveHandle> {
        source
            .volumes()
            .into_iter()
            .filter(|drive| self.is_bootloader_volume(drive))
            .collect()
    }
}
