use anyhow::Result;
use uf2flash_core::{DriveFinder, PortFinder, drives::host_volumes, ports::available_ports};

/// Show what auto-detection would see, without touching any device.
pub fn list() -> Result<()> {
    let finder = PortFinder::default();
    let ports = available_ports()?;

    println!("Serial ports:");
    if ports.is_empty() {
        println!("  (none)");
    }
    for port in &ports {
        match finder.rule_for(port) {
            Some(rule) => println!("  {port}  [{rule}]"),
            None => println!("  {port}"),
        }
    }
    if let Some(found) = finder.find(&ports) {
        println!("Auto-detect would use {}", found.port_name);
    }

    println!();

    let drive_finder = DriveFinder::default();
    let drives = drive_finder.find_all(&*host_volumes());

    println!("UF2 bootloader drives ({}):", drive_finder.marker());
    if drives.is_empty() {
        println!("  (none)");
    }
    for drive in drives {
        match drive.label {
            Some(label) => println!("  {} ({label})", drive.mount_point.display()),
            None => println!("  {}", drive.mount_point.display()),
        }
    }

    Ok(())
}
