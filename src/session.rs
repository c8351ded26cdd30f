//! Hand the chosen device over to the mirroring tool.

use crate::driver::android::{self, Medium, WIRELESS_PORT};
use crate::driver::traits::{Bridge, Mirror};
use crate::registry::DeviceRecord;
use anyhow::Result;
use colored::Colorize;
use log::{info, warn};
use std::io::Write;

/// Prepare connections for `selected` and run the mirror until it exits.
///
/// Every other listed device on a wireless session is disconnected first.
/// The selected device is then connected over the network or switched to
/// USB, depending on how it is reached right now.
pub async fn launch_session<W: Write>(
    bridge: &dyn Bridge,
    mirror: &dyn Mirror,
    devices: &[DeviceRecord],
    selected: &DeviceRecord,
    output: &mut W,
) -> Result<()> {
    for device in devices.iter().filter(|d| d.serial != selected.serial) {
        // Only network sessions can be disconnected
        if android::medium_of(bridge, &device.serial).await == Medium::Wireless {
            writeln!(output, "Disconnecting {} ({})...", device.label(), device.serial)?;
            let _ = bridge.query(Some(device.serial.as_str()), &["disconnect"]).await;
        }
    }

    let serial = selected.serial.as_str();
    match android::medium_of(bridge, serial).await {
        Medium::Wireless => {
            if selected.ip_address.is_empty() {
                warn!("No known address for {}, not reconnecting", serial);
            } else {
                let target = format!("{}:{}", selected.ip_address, WIRELESS_PORT);
                info!("Connecting to {} over Wi-Fi at {}", selected.label(), target);
                let _ = bridge.query(None, &["connect", target.as_str()]).await;
            }
        }
        Medium::Wired => {
            info!("Connecting to {} via USB", selected.label());
            let _ = bridge.query(Some(serial), &["usb"]).await;
        }
        Medium::Offline => {
            warn!("{} is no longer listed by adb", serial);
        }
    }

    writeln!(
        output,
        "{} Mirroring {} ({}). Close the scrcpy window to finish.",
        "▶".green().bold(),
        selected.label().cyan(),
        serial
    )?;
    output.flush()?;
    mirror.mirror(serial).await?;
    writeln!(output, "\nDisconnected.")?;

    Ok(())
}
