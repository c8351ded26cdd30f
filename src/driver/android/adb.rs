use crate::driver::traits::{command_line, Bridge, BridgeError};
use async_trait::async_trait;
use log::{debug, warn};
use std::path::PathBuf;
use std::process::Stdio;
use tokio::process::Command;

/// Bridge backed by a real `adb` binary
#[derive(Debug, Clone)]
pub struct AdbBridge {
    adb_path: PathBuf,
}

impl AdbBridge {
    pub fn new(adb_path: PathBuf) -> Self {
        Self { adb_path }
    }
}

#[async_trait]
impl Bridge for AdbBridge {
    async fn query(&self, serial: Option<&str>, args: &[&str]) -> Result<String, BridgeError> {
        let mut full_args = Vec::new();

        if let Some(s) = serial {
            full_args.push("-s");
            full_args.push(s);
        }

        full_args.extend_from_slice(args);

        let command = command_line(serial, args);
        debug!("adb {}", command);

        let output = Command::new(&self.adb_path)
            .args(&full_args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await
            .map_err(|source| {
                warn!("Failed to execute: adb {}: {}", command, source);
                BridgeError::Spawn {
                    command: command.clone(),
                    source,
                }
            })?;

        let mut text = String::from_utf8_lossy(&output.stdout).to_string();
        text.push_str(&String::from_utf8_lossy(&output.stderr));
        let text = text.trim().to_string();

        if !output.status.success() {
            warn!("ADB command failed: adb {} ({}): {}", command, output.status, text);
            return Err(BridgeError::Failed {
                command,
                status: output.status.to_string(),
                output: text,
            });
        }

        Ok(text)
    }
}
