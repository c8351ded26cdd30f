pub mod adb;
pub mod facts;
pub mod scrcpy;

pub use adb::AdbBridge;
pub use scrcpy::ScrcpyMirror;

use crate::driver::traits::{Bridge, BridgeError};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::OnceLock;

/// Port adb uses for wireless (tcpip) sessions
pub const WIRELESS_PORT: u16 = 5555;

/// Connection status as reported by `adb devices`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum DeviceStatus {
    /// Authorized and connected
    Device,
    Unauthorized,
    /// Anything else adb may report (`offline`, `no permissions`, `recovery`, ...)
    #[default]
    Offline,
}

impl DeviceStatus {
    pub fn parse(s: &str) -> Self {
        match s.trim() {
            "device" => DeviceStatus::Device,
            "unauthorized" => DeviceStatus::Unauthorized,
            _ => DeviceStatus::Offline,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DeviceStatus::Device => "device",
            DeviceStatus::Unauthorized => "unauthorized",
            DeviceStatus::Offline => "offline",
        }
    }
}

impl fmt::Display for DeviceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<String> for DeviceStatus {
    fn from(s: String) -> Self {
        DeviceStatus::parse(&s)
    }
}

impl From<DeviceStatus> for String {
    fn from(status: DeviceStatus) -> Self {
        status.as_str().to_string()
    }
}

/// Transport a device is currently reached over
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Medium {
    Wired,
    Wireless,
    Offline,
}

/// One line of `adb devices`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Device {
    pub serial: String,
    pub status: DeviceStatus,
}

/// Parse the flat `adb devices` listing.
///
/// Skips the header, blank lines and daemon notices (`* daemon started ...`).
pub fn parse_device_list(output: &str) -> Vec<Device> {
    let mut devices = Vec::new();

    for line in output.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('*') || line == "List of devices attached" {
            continue;
        }

        let (serial, status) = match line.split_once('\t') {
            Some((serial, status)) => (serial.trim(), status.trim()),
            None => {
                let mut parts = line.split_whitespace();
                match (parts.next(), parts.next()) {
                    (Some(serial), Some(status)) => (serial, status),
                    _ => continue,
                }
            }
        };

        if serial.is_empty() {
            continue;
        }

        devices.push(Device {
            serial: serial.to_string(),
            status: DeviceStatus::parse(status),
        });
    }

    devices
}

/// True for `a.b.c.d:port` serials.
///
/// adb lists an established wireless session under its address instead of
/// the device serial. Those entries are session artifacts, not device
/// identities, and must never become registry keys.
pub fn is_wireless_session_serial(serial: &str) -> bool {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN
        .get_or_init(|| {
            Regex::new(r"^\d{1,3}(\.\d{1,3}){3}:\d+$").expect("wireless serial pattern is valid")
        })
        .is_match(serial)
}

/// Get list of devices currently known to adb
pub async fn get_devices(bridge: &dyn Bridge) -> Result<Vec<Device>, BridgeError> {
    let output = bridge.query(None, &["devices"]).await?;
    Ok(parse_device_list(&output))
}

/// Current status of one serial; `Offline` when it is not listed or adb fails
pub async fn status_of(bridge: &dyn Bridge, serial: &str) -> DeviceStatus {
    match get_devices(bridge).await {
        Ok(devices) => devices
            .into_iter()
            .find(|d| d.serial == serial)
            .map(|d| d.status)
            .unwrap_or(DeviceStatus::Offline),
        Err(_) => DeviceStatus::Offline,
    }
}

/// Whether `serial` is listed right now with status `device`
pub async fn is_authorized(bridge: &dyn Bridge, serial: &str) -> bool {
    status_of(bridge, serial).await == DeviceStatus::Device
}

/// Classify one line of `adb devices -l` for `serial`
pub fn medium_from_listing(listing: &str, serial: &str) -> Medium {
    let port_suffix = format!(":{}", WIRELESS_PORT);

    // First matching line wins
    match listing
        .lines()
        .filter(|line| !line.starts_with("List of devices"))
        .find(|line| line.contains(serial))
    {
        Some(line) if line.contains(&port_suffix) => Medium::Wireless,
        Some(_) => Medium::Wired,
        None => Medium::Offline,
    }
}

/// Connection medium of `serial`, from the long-form device listing
pub async fn medium_of(bridge: &dyn Bridge, serial: &str) -> Medium {
    match bridge.query(None, &["devices", "-l"]).await {
        Ok(listing) => medium_from_listing(&listing, serial),
        Err(_) => Medium::Offline,
    }
}
