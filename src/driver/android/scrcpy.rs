use crate::driver::traits::Mirror;
use anyhow::{Context, Result};
use async_trait::async_trait;
use log::{info, warn};
use std::path::PathBuf;
use std::process::Stdio;
use tokio::process::Command;

/// Mirror backed by the scrcpy binary
#[derive(Debug, Clone)]
pub struct ScrcpyMirror {
    scrcpy_path: PathBuf,
}

impl ScrcpyMirror {
    pub fn new(scrcpy_path: PathBuf) -> Self {
        Self { scrcpy_path }
    }
}

#[async_trait]
impl Mirror for ScrcpyMirror {
    async fn mirror(&self, serial: &str) -> Result<()> {
        info!("Launching scrcpy for {}", serial);

        // scrcpy's own output is of no interest; only its exit matters
        let status = Command::new(&self.scrcpy_path)
            .args(["-s", serial])
            .stdin(Stdio::inherit())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .await
            .with_context(|| format!("Failed to execute: {:?} -s {}", self.scrcpy_path, serial))?;

        if !status.success() {
            warn!("scrcpy exited with {}", status);
        }

        Ok(())
    }
}
