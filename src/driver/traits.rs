use anyhow::Result;
use async_trait::async_trait;
use thiserror::Error;

/// Failure of a single bridge invocation.
///
/// Callers treat this as "no data for this query", never as fatal.
#[derive(Debug, Error)]
pub enum BridgeError {
    /// The bridge binary could not be started at all
    #[error("failed to execute `adb {command}`: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    /// The bridge ran but exited non-zero
    #[error("`adb {command}` failed ({status}): {output}")]
    Failed {
        command: String,
        status: String,
        output: String,
    },
}

/// Text query/command service in front of the device bridge.
///
/// `serial` binds the call to one device (`adb -s <serial> ...`).
/// Successful output is returned trimmed, stdout and stderr combined.
#[async_trait]
pub trait Bridge: Send + Sync {
    async fn query(&self, serial: Option<&str>, args: &[&str]) -> Result<String, BridgeError>;
}

/// External screen-mirroring process.
#[async_trait]
pub trait Mirror: Send + Sync {
    /// Run a mirroring session for `serial` and block until it exits.
    async fn mirror(&self, serial: &str) -> Result<()>;
}

/// Render a bridge call the way it would be typed after `adb`.
pub fn command_line(serial: Option<&str>, args: &[&str]) -> String {
    match serial {
        Some(s) => format!("-s {} {}", s, args.join(" ")),
        None => args.join(" "),
    }
}
