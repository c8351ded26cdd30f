//! Persisted registry of every device ever seen.
//!
//! The registry is a plain value: `load` reads it, the reconciler mutates it,
//! `save` writes it back. Nothing else touches the file.

pub mod reconcile;

pub use reconcile::{reconcile, ReconcileReport};

use crate::driver::android::DeviceStatus;
use anyhow::{Context, Result};
use log::debug;
use serde::{Deserialize, Deserializer, Serialize};
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;

/// Default registry file, relative to the working directory
pub const DEFAULT_REGISTRY_FILE: &str = "device_map.json";

/// One physical device
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DeviceRecord {
    /// User-assigned label. Reconciliation never writes it.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub name: String,

    #[serde(default, deserialize_with = "null_as_empty")]
    pub serial: String,

    #[serde(default, deserialize_with = "null_as_empty")]
    pub model: String,

    #[serde(default, deserialize_with = "null_as_empty")]
    pub device_type: String,

    /// Only set while the device is on a wireless session
    #[serde(default, deserialize_with = "null_as_empty")]
    pub ip_address: String,

    #[serde(default)]
    pub status: DeviceStatus,
}

impl DeviceRecord {
    /// Display label: name, then model, then serial
    pub fn label(&self) -> &str {
        if !self.name.is_empty() {
            &self.name
        } else if !self.model.is_empty() {
            &self.model
        } else {
            &self.serial
        }
    }
}

/// Write `bytes` to `path` and flush them to disk
fn write_synced(path: &Path, bytes: &[u8]) -> Result<()> {
    let file =
        File::create(path).with_context(|| format!("Failed to create {}", path.display()))?;
    let mut writer = BufWriter::new(file);
    writer
        .write_all(bytes)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    writer
        .flush()
        .with_context(|| format!("Failed to write {}", path.display()))?;
    writer
        .get_ref()
        .sync_all()
        .with_context(|| format!("Failed to sync {}", path.display()))?;
    Ok(())
}

/// Older files store `null` where a value was never resolved
fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

/// Ordered collection of device records, unique by serial
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Registry {
    #[serde(default)]
    pub devices: Vec<DeviceRecord>,
}

impl Registry {
    /// Load the registry from `path`. A missing file is an empty registry.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            debug!("No registry at {}, starting empty", path.display());
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read registry {}", path.display()))?;
        let registry: Registry = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse registry {}", path.display()))?;

        debug!(
            "Loaded {} device(s) from {}",
            registry.devices.len(),
            path.display()
        );
        Ok(registry)
    }

    /// Pretty-printed JSON with 4-space indentation
    pub fn to_json(&self) -> Result<String> {
        let mut buf = Vec::new();
        let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
        let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
        self.serialize(&mut ser)
            .context("Failed to serialize registry")?;
        String::from_utf8(buf).context("Registry JSON is not UTF-8")
    }

    /// Write the registry to `path` through a temporary file and rename.
    ///
    /// The temporary file is removed again if any step fails.
    pub fn save(&self, path: &Path) -> Result<()> {
        let json = self.to_json()?;

        let mut temp_name = path.as_os_str().to_owned();
        temp_name.push(".tmp");
        let temp_path = Path::new(&temp_name);

        let result = write_synced(temp_path, json.as_bytes()).and_then(|()| {
            fs::rename(temp_path, path)
                .with_context(|| format!("Failed to replace registry {}", path.display()))
        });

        if let Err(e) = result {
            let _ = fs::remove_file(temp_path);
            return Err(e);
        }

        debug!("Saved {} device(s) to {}", self.devices.len(), path.display());
        Ok(())
    }

    pub fn get(&self, serial: &str) -> Option<&DeviceRecord> {
        self.devices.iter().find(|d| d.serial == serial)
    }

    pub fn get_mut(&mut self, serial: &str) -> Option<&mut DeviceRecord> {
        self.devices.iter_mut().find(|d| d.serial == serial)
    }

    /// Append a record. Returns false, leaving the registry untouched, if
    /// the serial is already present.
    pub fn insert(&mut self, record: DeviceRecord) -> bool {
        if self.get(&record.serial).is_some() {
            return false;
        }
        self.devices.push(record);
        true
    }

    /// Label for a serial, falling back to the serial itself when unknown
    pub fn label_for<'a>(&'a self, serial: &'a str) -> &'a str {
        self.get(serial).map(|d| d.label()).unwrap_or(serial)
    }
}
