//! Merge what adb reports right now into the persisted registry.

use super::{DeviceRecord, Registry};
use crate::driver::android::facts::{self, PROP_DEVICE_TYPE, PROP_MODEL};
use crate::driver::android::{self, is_wireless_session_serial, DeviceStatus, Medium};
use crate::driver::traits::Bridge;
use log::{debug, info, warn};
use std::collections::HashSet;

/// What a reconciliation pass observed and changed
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconcileReport {
    /// Serials authorized and connected during this pass, in listing order
    pub live: Vec<String>,
    /// Serials appended as new records
    pub added: Vec<String>,
    /// Known serials whose record changed
    pub updated: Vec<String>,
    /// Listed devices that were not usable, with the status adb gave them
    pub skipped: Vec<(String, DeviceStatus)>,
}

impl ReconcileReport {
    pub fn is_live(&self, serial: &str) -> bool {
        self.live.iter().any(|s| s == serial)
    }
}

/// Outcome of fetching a value for an empty field
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldFill {
    Filled(String),
    /// adb answered, but with nothing
    Empty,
    /// adb failed; the field stays empty and is retried next pass
    Failed,
}

impl FieldFill {
    fn from_query(result: Option<String>) -> Self {
        match result {
            Some(value) if !value.is_empty() => FieldFill::Filled(value),
            Some(_) => FieldFill::Empty,
            None => FieldFill::Failed,
        }
    }
}

async fn fill_prop(bridge: &dyn Bridge, serial: &str, key: &str) -> FieldFill {
    let fill = FieldFill::from_query(facts::get_prop(bridge, serial, key).await);
    match fill {
        FieldFill::Empty => debug!("{} reported empty {}", serial, key),
        FieldFill::Failed => warn!("Could not read {} from {}, will retry next run", key, serial),
        FieldFill::Filled(_) => {}
    }
    fill
}

/// Fill in the blanks of a known record. Returns true if anything changed.
///
/// `name` is never written, and non-empty model/type are never re-fetched.
async fn refresh_record(bridge: &dyn Bridge, record: &mut DeviceRecord) -> bool {
    let serial = record.serial.clone();
    let mut changed = false;

    if record.model.is_empty() {
        if let FieldFill::Filled(model) = fill_prop(bridge, &serial, PROP_MODEL).await {
            record.model = model;
            changed = true;
        }
    }

    if record.device_type.is_empty() {
        if let FieldFill::Filled(device_type) = fill_prop(bridge, &serial, PROP_DEVICE_TYPE).await
        {
            record.device_type = device_type;
            changed = true;
        }
    }

    match android::medium_of(bridge, &serial).await {
        Medium::Wireless => {
            if record.ip_address.is_empty() {
                if let Some(ip) = facts::get_ip_address(bridge, &serial).await {
                    record.ip_address = ip;
                    changed = true;
                }
            }
        }
        Medium::Wired => {
            if !record.ip_address.is_empty() {
                record.ip_address.clear();
                changed = true;
            }
        }
        Medium::Offline => {
            debug!("{} vanished from the long listing, keeping its address", serial);
        }
    }

    if record.status != DeviceStatus::Device {
        record.status = DeviceStatus::Device;
        changed = true;
    }

    changed
}

/// Run one reconciliation pass over `registry` and hand it back.
///
/// Never fails: a failed query leaves a field as it was or skips the device.
/// Persisting the result is up to the caller.
pub async fn reconcile(bridge: &dyn Bridge, mut registry: Registry) -> (Registry, ReconcileReport) {
    let mut report = ReconcileReport::default();

    let listed = match android::get_devices(bridge).await {
        Ok(devices) => devices,
        Err(e) => {
            warn!("Could not list devices: {}", e);
            return (registry, report);
        }
    };

    let mut seen = HashSet::new();

    for listed_device in listed {
        let serial = listed_device.serial;

        if is_wireless_session_serial(&serial) {
            debug!("Ignoring wireless session entry {}", serial);
            continue;
        }
        if !seen.insert(serial.clone()) {
            continue;
        }

        let status = android::status_of(bridge, &serial).await;
        if status != DeviceStatus::Device {
            info!("{} is {}, skipping", registry.label_for(&serial), status);
            report.skipped.push((serial, status));
            continue;
        }

        match registry.get_mut(&serial) {
            Some(record) => {
                if refresh_record(bridge, record).await {
                    debug!("Updated {}", serial);
                    report.updated.push(serial.clone());
                }
            }
            None => match facts::extract_facts(bridge, &serial).await {
                Some(facts) => {
                    info!("New device {} ({})", facts.model, serial);
                    registry.insert(DeviceRecord {
                        name: String::new(),
                        serial: serial.clone(),
                        model: facts.model,
                        device_type: facts.device_type,
                        ip_address: facts.ip_address,
                        status,
                    });
                    report.added.push(serial.clone());
                }
                None => {
                    warn!("Could not read device facts for {}, not adding it", serial);
                    continue;
                }
            },
        }

        report.live.push(serial);
    }

    (registry, report)
}
