use uf2flash_core::FlashError;

pub mod flash;
pub mod list;
#[cfg(feature = "serial")]
pub mod monitor;

/// Print `err` and whatever the user can do about it.
pub fn report(err: &anyhow::Error) {
    eprintln!("Error: {err}");

    let Some(err) = err.downcast_ref::<FlashError>() else {
        return;
    };

    match err {
        FlashError::ImageNotFound { .. } => {
            eprintln!("Did you run 'west build' first?");
        }
        FlashError::PortNotFound { available } => {
            eprintln!("Available ports:");
            if available.is_empty() {
                eprintln!("  (none)");
            }
            for port in available {
                eprintln!("  {port}");
            }
        }
        FlashError::DriveTimeout { .. } => {
            eprintln!("Try manually holding BOOTSEL and pressing reset");
        }
        _ => (),
    }
}
