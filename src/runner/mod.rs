use crate::driver::android::{AdbBridge, ScrcpyMirror};
use crate::driver::traits::{Bridge, Mirror};
use crate::menu::{self, MenuChoice};
use crate::registry::{self, ReconcileReport, Registry};
use crate::session;
use crate::utils::binary_resolver;
use crate::utils::config::Config;
use anyhow::Result;
use colored::Colorize;
use std::io::{self, BufRead, Write};
use std::path::Path;

/// How an interactive run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    NoDevices,
    Exited,
    Mirrored,
}

/// Load, reconcile and save the registry, reporting unusable devices
pub async fn sync_registry<W: Write>(
    bridge: &dyn Bridge,
    registry_path: &Path,
    output: &mut W,
) -> Result<(Registry, ReconcileReport)> {
    let registry = Registry::load(registry_path)?;
    let (registry, report) = registry::reconcile(bridge, registry).await;
    registry.save(registry_path)?;

    for (serial, status) in &report.skipped {
        writeln!(
            output,
            "Device '{}' is {}. Skipping...",
            registry.label_for(serial),
            status
        )?;
    }

    Ok((registry, report))
}

/// Reconcile, let the user pick a device, and mirror it
pub async fn run_session<R, W>(
    bridge: &dyn Bridge,
    mirror: &dyn Mirror,
    registry_path: &Path,
    input: &mut R,
    output: &mut W,
) -> Result<Outcome>
where
    R: BufRead,
    W: Write,
{
    let (registry, report) = sync_registry(bridge, registry_path, output).await?;

    let devices = menu::selectable_devices(&registry, &report);
    if devices.is_empty() {
        writeln!(output, "No devices are currently connected. Exiting.")?;
        return Ok(Outcome::NoDevices);
    }

    match menu::select_device(bridge, &devices, input, output).await? {
        MenuChoice::Exit => {
            writeln!(output, "Exiting...")?;
            Ok(Outcome::Exited)
        }
        MenuChoice::Selected(index) => {
            session::launch_session(bridge, mirror, &devices, &devices[index], output).await?;
            Ok(Outcome::Mirrored)
        }
    }
}

/// Interactive entry point over the real adb, scrcpy and terminal
pub async fn run(config: &Config) -> Result<Outcome> {
    let bridge = AdbBridge::new(binary_resolver::find_adb(config.adb_path.as_ref())?);
    let mirror = ScrcpyMirror::new(binary_resolver::find_scrcpy(config.scrcpy_path.as_ref())?);

    let stdin = io::stdin();
    let mut input = stdin.lock();
    let mut output = io::stdout();

    run_session(&bridge, &mirror, &config.registry_path, &mut input, &mut output).await
}

/// Reconcile and print the whole registry
pub async fn list_devices(config: &Config) -> Result<()> {
    let bridge = AdbBridge::new(binary_resolver::find_adb(config.adb_path.as_ref())?);
    let mut output = io::stdout();

    print_devices(&bridge, &config.registry_path, &mut output).await
}

/// Reconcile, then write every registry record with its live marker
pub async fn print_devices<W: Write>(
    bridge: &dyn Bridge,
    registry_path: &Path,
    output: &mut W,
) -> Result<()> {
    let (registry, report) = sync_registry(bridge, registry_path, output).await?;

    if registry.devices.is_empty() {
        writeln!(output, "  No devices recorded in {}", registry_path.display())?;
        return Ok(());
    }

    writeln!(
        output,
        "  {} device(s) in {}:",
        registry.devices.len(),
        registry_path.display()
    )?;
    for device in &registry.devices {
        let marker = if report.is_live(&device.serial) {
            "•".green()
        } else {
            "•".dimmed()
        };
        let mut details = vec![device.status.to_string()];
        if !device.model.is_empty() {
            details.push(device.model.clone());
        }
        if !device.ip_address.is_empty() {
            details.push(format!("wifi {}", device.ip_address));
        }
        writeln!(
            output,
            "    {} {} {} ({})",
            marker,
            device.label().white().bold(),
            device.serial.dimmed(),
            details.join(", ")
        )?;
    }

    Ok(())
}
