//! Serial port discovery.
//!
//! The board is found by walking an ordered list of [`PortRule`]s. Each rule
//! is tried against every port in enumeration order before the next rule is
//! considered, so a vendor id hit on the last port still beats a description
//! hit on the first one.

use std::fmt;

use serialport::{SerialPortInfo, SerialPortType};

use crate::error::{FlashError, Result};

/// Raspberry Pi's USB vendor id, used by the RP2040 and RP2350.
pub const RPI_VENDOR_ID: u16 = 0x2e8a;

/// One serial port as reported by the OS.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SerialPortDescriptor {
    pub port_name: String,
    pub vendor_id: Option<u16>,
    pub product_id: Option<u16>,
    pub description: Option<String>,
}

impl SerialPortDescriptor {
    pub fn new(port_name: impl Into<String>) -> Self {
        Self {
            port_name: port_name.into(),
            vendor_id: None,
            product_id: None,
            description: None,
        }
    }

    pub fn with_usb_ids(mut self, vendor_id: u16, product_id: u16) -> Self {
        self.vendor_id = Some(vendor_id);
        self.product_id = Some(product_id);
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

impl From<&SerialPortInfo> for SerialPortDescriptor {
    fn from(info: &SerialPortInfo) -> Self {
        match &info.port_type {
            SerialPortType::UsbPort(usb) => Self {
                port_name: info.port_name.clone(),
                vendor_id: Some(usb.vid),
                product_id: Some(usb.pid),
                description: usb.product.clone().or_else(|| usb.manufacturer.clone()),
            },
            SerialPortType::PciPort => Self::new(&info.port_name).with_description("PCI device"),
            SerialPortType::BluetoothPort => {
                Self::new(&info.port_name).with_description("Bluetooth device")
            }
            SerialPortType::Unknown => Self::new(&info.port_name),
        }
    }
}

impl fmt::Display for SerialPortDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let id = |id: Option<u16>| match id {
            Some(id) => format!("{id:#06x}"),
            None => "None".to_string(),
        };
        write!(
            f,
            "{}: {} (VID={}, PID={})",
            self.port_name,
            self.description.as_deref().unwrap_or("n/a"),
            id(self.vendor_id),
            id(self.product_id),
        )
    }
}

/// A single way of recognising the board's serial port.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PortRule {
    /// The USB vendor id matches exactly
    VendorId(u16),
    /// The port description contains the given text
    DescriptionContains(String),
    /// The port description contains any one of the given texts
    DescriptionContainsAny(Vec<String>),
}

impl PortRule {
    pub fn matches(&self, port: &SerialPortDescriptor) -> bool {
        match self {
            Self::VendorId(vid) => port.vendor_id == Some(*vid),
            Self::DescriptionContains(needle) => port
                .description
                .as_deref()
                .is_some_and(|description| description.contains(needle.as_str())),
            Self::DescriptionContainsAny(needles) => {
                port.description.as_deref().is_some_and(|description| {
                    needles
                        .iter()
                        .any(|needle| description.contains(needle.as_str()))
                })
            }
        }
    }
}

impl fmt::Display for PortRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::VendorId(vid) => write!(f, "vendor id {vid:#06x}"),
            Self::DescriptionContains(needle) => write!(f, "description contains {needle:?}"),
            Self::DescriptionContainsAny(needles) => {
                write!(f, "description contains any of {needles:?}")
            }
        }
    }
}

/// The port picked by a [`PortFinder`] and the rule that picked it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PortMatch {
    pub port_name: String,
    pub rule: PortRule,
}

#[derive(Debug, Clone)]
pub struct PortFinder {
    rules: Vec<PortRule>,
}

impl Default for PortFinder {
    /// Vendor id first, then the Pico product string, then the strings the
    /// ornament firmware puts in its USB descriptor.
    fn default() -> Self {
        Self::new(vec![
            PortRule::VendorId(RPI_VENDOR_ID),
            PortRule::DescriptionContains("Pico".into()),
            PortRule::DescriptionContainsAny(vec!["Lilly".into(), "Christmas".into()]),
        ])
    }
}

impl PortFinder {
    pub fn new(rules: Vec<PortRule>) -> Self {
        Self { rules }
    }

    pub fn rules(&self) -> &[PortRule] {
        &self.rules
    }

    /// Pick the best candidate among `ports`, or `None` if no rule matches.
    ///
    /// Rules are walked in priority order and each one is tried against every
    /// port before the next rule. A plain per-port scan, testing each port
    /// against all rules before moving on, would let a description hit on an
    /// early port shadow a vendor id hit on a later one. Rule priority wins
    /// here. Within one rule, the earliest port in enumeration order is used.
    pub fn find(&self, ports: &[SerialPortDescriptor]) -> Option<PortMatch> {
        self.rules.iter().find_map(|rule| {
            ports.iter().find(|port| rule.matches(port)).map(|port| PortMatch {
                port_name: port.port_name.clone(),
                rule: rule.clone(),
            })
        })
    }

    /// The highest priority rule that `port` satisfies on its own.
    pub fn rule_for(&self, port: &SerialPortDescriptor) -> Option<&PortRule> {
        self.rules.iter().find(|rule| rule.matches(port))
    }

    /// Like [`PortFinder::find`], but a miss becomes
    /// [`FlashError::PortNotFound`] carrying every candidate for diagnostics.
    pub fn require(&self, ports: Vec<SerialPortDescriptor>) -> Result<PortMatch> {
        match self.find(&ports) {
            Some(found) => Ok(found),
            None => Err(FlashError::PortNotFound { available: ports }),
        }
    }
}

/// Ask the OS for every serial port currently attached.
pub fn available_ports() -> Result<Vec<SerialPortDescriptor>> {
    let ports = serialport::available_ports().map_err(FlashError::PortEnumeration)?;
    log::debug!("Found {} serial port(s)", ports.len());
    Ok(ports.iter().map(SerialPortDescriptor::from).collect())
}
