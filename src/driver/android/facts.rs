//! Device fact extraction over adb property queries.

use super::{medium_of, Medium};
use crate::driver::traits::Bridge;
use log::debug;
use regex::Regex;
use std::net::Ipv4Addr;
use std::sync::OnceLock;

pub const PROP_MODEL: &str = "ro.product.model";
pub const PROP_DEVICE_TYPE: &str = "ro.product.device";
pub const PROP_SERIAL: &str = "ro.serialno";

/// Network interface that carries adb's wireless session
const WIRELESS_INTERFACE: &str = "wlan0";

/// Snapshot of what a device reports about itself
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceFacts {
    pub model: String,
    pub device_type: String,
    pub serial_number: String,
    pub medium: Medium,
    /// Empty unless the device is on a wireless session
    pub ip_address: String,
}

/// Read one system property. `None` on adb failure.
pub async fn get_prop(bridge: &dyn Bridge, serial: &str, key: &str) -> Option<String> {
    bridge
        .query(Some(serial), &["shell", "getprop", key])
        .await
        .ok()
}

/// Extract the first IPv4 address from `ip addr show` output.
///
/// Takes the first `inet <addr>/<prefix>` whose address is a valid dotted
/// quad; `inet6` lines never match.
pub fn parse_inet_address(output: &str) -> Option<String> {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    let re = PATTERN.get_or_init(|| {
        Regex::new(r"\binet\s+([0-9.]+)/\d+").expect("inet address pattern is valid")
    });

    re.captures_iter(output)
        .find_map(|caps| caps[1].parse::<Ipv4Addr>().ok())
        .map(|ip| ip.to_string())
}

/// Address of the device's wireless interface, if it has one
pub async fn get_ip_address(bridge: &dyn Bridge, serial: &str) -> Option<String> {
    let output = bridge
        .query(
            Some(serial),
            &["shell", "ip", "addr", "show", WIRELESS_INTERFACE],
        )
        .await
        .ok()?;

    let ip = parse_inet_address(&output);
    if ip.is_none() {
        debug!("No inet address on {} for {}", WIRELESS_INTERFACE, serial);
    }
    ip
}

/// Gather facts for a device seen for the first time.
///
/// Returns `None` unless model, device type and hardware serial all come
/// back non-empty, so a partial record is never created.
pub async fn extract_facts(bridge: &dyn Bridge, serial: &str) -> Option<DeviceFacts> {
    let model = get_prop(bridge, serial, PROP_MODEL).await;
    let device_type = get_prop(bridge, serial, PROP_DEVICE_TYPE).await;
    let serial_number = get_prop(bridge, serial, PROP_SERIAL).await;

    let medium = medium_of(bridge, serial).await;

    // Wired devices get an explicit empty address so a stale one is never reused
    let ip_address = match medium {
        Medium::Wireless => get_ip_address(bridge, serial).await.unwrap_or_default(),
        Medium::Wired | Medium::Offline => String::new(),
    };

    match (model, device_type, serial_number) {
        (Some(model), Some(device_type), Some(serial_number))
            if !model.is_empty() && !device_type.is_empty() && !serial_number.is_empty() =>
        {
            Some(DeviceFacts {
                model,
                device_type,
                serial_number,
                medium,
                ip_address,
            })
        }
        _ => {
            debug!("Incomplete properties for {}, not recording it", serial);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::driver::testing::ScriptedBridge;

    const WLAN_OUTPUT: &str = "3: wlan0: <BROADCAST,MULTICAST,UP,LOWER_UP> mtu 1500 qdisc mq state UP\n\
        link/ether 02:00:00:00:00:00 brd ff:ff:ff:ff:ff:ff\n\
        inet 192.168.1.5/24 brd 192.168.1.255 scope global wlan0\n\
        inet6 fe80::1234/64 scope link";

    #[test]
    fn test_parse_inet_address() {
        assert_eq!(parse_inet_address(WLAN_OUTPUT).as_deref(), Some("192.168.1.5"));
        assert_eq!(parse_inet_address("inet6 fe80::1/64 scope link"), None);
        assert_eq!(parse_inet_address("wlan0: state DOWN"), None);
        assert_eq!(parse_inet_address("inet 999.1.1.1/24"), None);
    }

    #[test]
    fn test_parse_inet_address_skips_invalid_quad() {
        let output = "inet 999.1.1.1/24 scope global wlan0\ninet 192.168.1.5/24 brd 192.168.1.255";
        assert_eq!(parse_inet_address(output).as_deref(), Some("192.168.1.5"));
    }

    fn wired_pixel() -> ScriptedBridge {
        ScriptedBridge::new()
            .with("-s ABC123 shell getprop ro.product.model", "Pixel7\n")
            .with("-s ABC123 shell getprop ro.product.device", "panther")
            .with("-s ABC123 shell getprop ro.serialno", "ABC123")
            .with(
                "devices -l",
                "List of devices attached\nABC123 device usb:1-1 model:Pixel_7",
            )
    }

    #[tokio::test]
    async fn test_extract_facts_wired() {
        let bridge = wired_pixel();
        let facts = extract_facts(&bridge, "ABC123").await.unwrap();
        assert_eq!(facts.model, "Pixel7");
        assert_eq!(facts.device_type, "panther");
        assert_eq!(facts.medium, Medium::Wired);
        assert_eq!(facts.ip_address, "");
        assert!(!bridge
            .calls()
            .iter()
            .any(|c| c.contains("ip addr show")));
    }

    #[tokio::test]
    async fn test_extract_facts_wireless_fetches_address() {
        let bridge = ScriptedBridge::new()
            .with("-s XYZ shell getprop ro.product.model", "Pixel 4a")
            .with("-s XYZ shell getprop ro.product.device", "sunfish")
            .with("-s XYZ shell getprop ro.serialno", "XYZ")
            .with("devices -l", "XYZ device 192.168.1.5:5555 model:Pixel_4a")
            .with("-s XYZ shell ip addr show wlan0", WLAN_OUTPUT);

        let facts = extract_facts(&bridge, "XYZ").await.unwrap();
        assert_eq!(facts.medium, Medium::Wireless);
        assert_eq!(facts.ip_address, "192.168.1.5");
    }

    #[tokio::test]
    async fn test_extract_facts_rejects_empty_property() {
        let bridge = wired_pixel().with("-s ABC123 shell getprop ro.product.model", "");
        assert!(extract_facts(&bridge, "ABC123").await.is_none());
    }

    #[tokio::test]
    async fn test_extract_facts_requires_all_properties() {
        let bridge = ScriptedBridge::new()
            .with("-s ABC123 shell getprop ro.product.model", "Pixel7")
            .failing("-s ABC123 shell getprop ro.product.device", "error: closed")
            .with("-s ABC123 shell getprop ro.serialno", "ABC123");
        assert!(extract_facts(&bridge, "ABC123").await.is_none());
    }
}
