//! Interactive device selection.

use crate::driver::android::{self, DeviceStatus};
use crate::driver::traits::Bridge;
use crate::registry::{DeviceRecord, ReconcileReport, Registry};
use anyhow::Result;
use colored::Colorize;
use log::info;
use std::io::{BufRead, Write};

const TITLE: &str = "Droid Mirror";
const TAGLINE: &str = "Pick an Android device and mirror its screen";
const RULE_WIDTH: usize = 55;

/// Result of the selection menu
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuChoice {
    /// User chose 0, input ended, or the chosen device lost authorization
    Exit,
    /// Index into the device list the menu was given
    Selected(usize),
}

/// Records that can be offered right now: stored as `device` and seen as
/// authorized during this run's reconciliation.
pub fn selectable_devices(registry: &Registry, report: &ReconcileReport) -> Vec<DeviceRecord> {
    registry
        .devices
        .iter()
        .filter(|d| d.status == DeviceStatus::Device && report.is_live(&d.serial))
        .cloned()
        .collect()
}

fn print_header<W: Write>(output: &mut W, devices: &[DeviceRecord]) -> Result<()> {
    writeln!(output, "{}", "=".repeat(RULE_WIDTH))?;
    writeln!(output, "{:^50}", TITLE.bold())?;
    writeln!(output, "{:^50}", TAGLINE)?;
    writeln!(output, "{}", "=".repeat(RULE_WIDTH))?;

    writeln!(output, "\nSelect a device to connect to (or 0 to exit):\n")?;
    for (index, device) in devices.iter().enumerate() {
        writeln!(
            output,
            "{}. {} ({})",
            index + 1,
            device.label().white().bold(),
            device.serial.dimmed()
        )?;
    }
    Ok(())
}

/// Show the menu and read a choice.
///
/// Bad input re-prompts until a valid number arrives. A chosen device is
/// re-checked for authorization before it is returned.
pub async fn select_device<R, W>(
    bridge: &dyn Bridge,
    devices: &[DeviceRecord],
    input: &mut R,
    output: &mut W,
) -> Result<MenuChoice>
where
    R: BufRead,
    W: Write,
{
    print_header(output, devices)?;

    let index = loop {
        write!(output, "\nSelect a number: ")?;
        output.flush()?;

        let mut line = String::new();
        if input.read_line(&mut line)? == 0 {
            // stdin closed
            writeln!(output)?;
            return Ok(MenuChoice::Exit);
        }

        match line.trim().parse::<usize>() {
            Ok(0) => return Ok(MenuChoice::Exit),
            Ok(n) if n <= devices.len() => break n - 1,
            Ok(_) => writeln!(output, "{}", "Invalid choice. Please enter a valid number.".yellow())?,
            Err(_) => writeln!(output, "{}", "Invalid input. Please enter a number.".yellow())?,
        }
    };

    let device = &devices[index];
    if !android::is_authorized(bridge, &device.serial).await {
        info!("{} lost authorization before connecting", device.serial);
        writeln!(
            output,
            "\n{}",
            format!("Device {} is unauthorized for ADB connection.", device.label()).red()
        )?;
        writeln!(output, "Please authorize the device via USB first and try again.")?;
        return Ok(MenuChoice::Exit);
    }

    Ok(MenuChoice::Selected(index))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::driver::testing::ScriptedBridge;
    use std::io::Cursor;

    fn pixel() -> DeviceRecord {
        DeviceRecord {
            name: String::new(),
            serial: "ABC123".to_string(),
            model: "Pixel7".to_string(),
            device_type: "panther".to_string(),
            ip_address: String::new(),
            status: DeviceStatus::Device,
        }
    }

    async fn run(bridge: &ScriptedBridge, devices: &[DeviceRecord], input: &str) -> (MenuChoice, String) {
        let mut input = Cursor::new(input.as_bytes().to_vec());
        let mut output = Vec::new();
        let choice = select_device(bridge, devices, &mut input, &mut output)
            .await
            .unwrap();
        (choice, String::from_utf8(output).unwrap())
    }

    #[tokio::test]
    async fn test_zero_exits_without_bridge_calls() {
        let bridge = ScriptedBridge::new().with("devices", "ABC123\tdevice");
        let (choice, output) = run(&bridge, &[pixel()], "0\n").await;
        assert_eq!(choice, MenuChoice::Exit);
        assert!(output.contains("Pixel7"));
        assert!(bridge.calls().is_empty());
    }

    #[tokio::test]
    async fn test_invalid_input_reprompts() {
        let bridge = ScriptedBridge::new().with("devices", "ABC123\tdevice");
        let (choice, output) = run(&bridge, &[pixel()], "abc\n1\n").await;
        assert_eq!(choice, MenuChoice::Selected(0));
        assert_eq!(output.matches("Select a number").count(), 2);
        assert!(output.contains("Please enter a number"));
    }

    #[tokio::test]
    async fn test_out_of_range_reprompts() {
        let bridge = ScriptedBridge::new().with("devices", "ABC123\tdevice");
        let (choice, output) = run(&bridge, &[pixel()], "7\n-1\n1\n").await;
        assert_eq!(choice, MenuChoice::Selected(0));
        assert_eq!(output.matches("Select a number").count(), 3);
    }

    #[tokio::test]
    async fn test_end_of_input_exits() {
        let bridge = ScriptedBridge::new();
        let (choice, _) = run(&bridge, &[pixel()], "abc\n").await;
        assert_eq!(choice, MenuChoice::Exit);
    }

    #[tokio::test]
    async fn test_lost_authorization_names_selected_device() {
        let bridge = ScriptedBridge::new().with("devices", "ABC123\tunauthorized");
        let mut other = pixel();
        other.serial = "OTHER".to_string();
        other.name = "Other phone".to_string();

        let (choice, output) = run(&bridge, &[other, pixel()], "2\n").await;
        assert_eq!(choice, MenuChoice::Exit);
        assert!(output.contains("Device Pixel7 is unauthorized"));
    }

    #[test]
    fn test_selectable_devices_requires_live() {
        let mut stale = pixel();
        stale.serial = "STALE".to_string();
        let mut offline = pixel();
        offline.serial = "OFF".to_string();
        offline.status = DeviceStatus::Offline;

        let registry = Registry {
            devices: vec![pixel(), stale, offline],
        };
        let report = ReconcileReport {
            live: vec!["ABC123".to_string(), "OFF".to_string()],
            ..Default::default()
        };

        let devices = selectable_devices(&registry, &report);
        assert_eq!(devices.len(), 1);
        assert_eq!(devices[0].serial, "ABC123");
    }
}
