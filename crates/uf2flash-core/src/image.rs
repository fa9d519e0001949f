//! The firmware image and copying it onto a bootloader volume.

use std::{
    fs::File,
    io::{Read, Write},
    path::{Path, PathBuf},
};

use crate::{
    ProgressReporter,
    drives::DriveHandle,
    error::{FlashError, Result},
};

const CHUNK_SIZE: usize = 16 * 1024;

/// A firmware file known to exist when it was created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FirmwareImage {
    path: PathBuf,
}

impl FirmwareImage {
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        if !path.is_file() {
            return Err(FlashError::ImageNotFound { path });
        }
        if path.file_name().is_none() {
            return Err(FlashError::ImageHasNoFileName { path });
        }
        Ok(Self { path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Where the image lands on `drive`: its root, same base name.
    pub fn destination_on(&self, drive: &DriveHandle) -> PathBuf {
        match self.path.file_name() {
            Some(name) => drive.mount_point.join(name),
            None => drive.mount_point.join("firmware.uf2"),
        }
    }

    /// Copy the image byte for byte onto `drive`. The bootloader starts
    /// flashing as blocks arrive, so nothing is read back afterwards.
    pub fn copy_to(
        &self,
        drive: &DriveHandle,
        mut progress: impl ProgressReporter,
    ) -> Result<PathBuf> {
        let dest = self.destination_on(drive);
        let copy_err = |source: std::io::Error| FlashError::Copy {
            from: self.path.clone(),
            to: dest.clone(),
            source,
        };

        log::info!("Copying {} to {}...", self.path.display(), dest.display());

        let mut input = File::open(&self.path).map_err(copy_err)?;
        let total = input.metadata().map_err(copy_err)?.len();
        let mut output = File::create(&dest).map_err(copy_err)?;

        progress.start(total as usize);

        let mut buf = vec![0u8; CHUNK_SIZE];
        loop {
            let read = input.read(&mut buf).map_err(copy_err)?;
            if read == 0 {
                break;
            }
            output.write_all(&buf[..read]).map_err(copy_err)?;
            progress.advance(read);
        }
        output.flush().map_err(copy_err)?;

        progress.finish();
        log::info!("Flash complete!");

        Ok(dest)
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::TempDir;

    use super::*;
    use crate::NoProgress;

    #[derive(Default)]
    struct Recorder {
        total: usize,
        seen: usize,
        finished: bool,
    }

    impl ProgressReporter for &mut Recorder {
        fn start(&mut self, total_bytes: usize) {
            self.total = total_bytes;
        }

        fn advance(&mut self, bytes: usize) {
            self.seen += bytes;
        }

        fn finish(&mut self) {
            self.finished = true;
        }
    }

    #[test]
    fn missing_image_is_rejected() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("zephyr.uf2");
        match FirmwareImage::open(&path) {
            Err(FlashError::ImageNotFound { path: missing }) => assert_eq!(missing, path),
            other => panic!("unexpected result {other:?}"),
        }
    }

    #[test]
    fn directory_is_not_an_image() {
        let dir = TempDir::new().unwrap();
        assert!(matches!(
            FirmwareImage::open(dir.path()),
            Err(FlashError::ImageNotFound { .. })
        ));
    }

    #[test]
    fn copies_into_drive_root_keeping_name() {
        let build = TempDir::new().unwrap();
        let drive = TempDir::new().unwrap();
        let src = build.path().join("zephyr.uf2");
        let payload: Vec<u8> = (0..CHUNK_SIZE * 2 + 37).map(|i| (i % 251) as u8).collect();
        fs::write(&src, &payload).unwrap();

        let image = FirmwareImage::open(&src).unwrap();
        let mut recorder = Recorder::default();
        let dest = image
            .copy_to(&DriveHandle::new(drive.path()), &mut recorder)
            .unwrap();

        assert_eq!(dest, drive.path().join("zephyr.uf2"));
        assert_eq!(fs::read(&dest).unwrap(), payload);
        assert_eq!(recorder.total, payload.len());
        assert_eq!(recorder.seen, payload.len());
        assert!(recorder.finished);
    }

    #[test]
    fn vanished_drive_is_a_copy_error() {
        let build = TempDir::new().unwrap();
        let src = build.path().join("zephyr.uf2");
        fs::write(&src, b"UF2\n").unwrap();
        let image = FirmwareImage::open(&src).unwrap();

        let drive = TempDir::new().unwrap();
        let drive_path = drive.path().to_path_buf();
        drop(drive);

        match image.copy_to(&DriveHandle::new(&drive_path), NoProgress) {
            Err(err @ FlashError::Copy { .. }) => {
                assert!(err.to_string().contains("zephyr.uf2"));
            }
            other => panic!("unexpected result {other:?}"),
        }
    }
}
