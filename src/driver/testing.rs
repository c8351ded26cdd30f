//! In-memory doubles for the bridge and mirror seams.

use crate::driver::traits::{command_line, Bridge, BridgeError, Mirror};
use anyhow::Result;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;

/// Bridge that answers from a fixed script and records every call.
///
/// Keys are command lines as rendered by [`command_line`], e.g.
/// `"-s ABC123 shell getprop ro.product.model"`. Unscripted commands fail.
#[derive(Default)]
pub struct ScriptedBridge {
    responses: HashMap<String, Result<String, String>>,
    calls: Mutex<Vec<String>>,
}

impl ScriptedBridge {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, command: &str, output: &str) -> Self {
        self.responses
            .insert(command.to_string(), Ok(output.to_string()));
        self
    }

    pub fn failing(mut self, command: &str, output: &str) -> Self {
        self.responses
            .insert(command.to_string(), Err(output.to_string()));
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    /// Calls that change connection state rather than just read it
    pub fn connection_calls(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter(|c| c.starts_with("connect") || c.ends_with("disconnect") || c.ends_with(" usb"))
            .collect()
    }
}

#[async_trait]
impl Bridge for ScriptedBridge {
    async fn query(&self, serial: Option<&str>, args: &[&str]) -> Result<String, BridgeError> {
        let command = command_line(serial, args);
        self.calls.lock().unwrap().push(command.clone());

        match self.responses.get(&command) {
            Some(Ok(output)) => Ok(output.trim().to_string()),
            Some(Err(output)) => Err(BridgeError::Failed {
                command,
                status: "exit status: 1".to_string(),
                output: output.clone(),
            }),
            None => Err(BridgeError::Failed {
                command,
                status: "exit status: 1".to_string(),
                output: "unscripted".to_string(),
            }),
        }
    }
}

/// Mirror that records which serials it was launched for
#[derive(Default)]
pub struct RecordingMirror {
    launched: Mutex<Vec<String>>,
}

impl RecordingMirror {
    pub fn launched(&self) -> Vec<String> {
        self.launched.lock().unwrap().clone()
    }
}

#[async_trait]
impl Mirror for RecordingMirror {
    async fn mirror(&self, serial: &str) -> Result<()> {
        self.launched.lock().unwrap().push(serial.to_string());
        Ok(())
    }
}
