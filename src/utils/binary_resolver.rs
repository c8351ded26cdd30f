use anyhow::Result;
use log::debug;
use std::path::PathBuf;

/// Per-user install directory (~/.droid-mirror)
pub fn install_dir() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".droid-mirror"))
}

fn exe_name(name: &str) -> String {
    if cfg!(windows) {
        format!("{}.exe", name)
    } else {
        name.to_string()
    }
}

/// Find a binary in the install directory, then on the system PATH.
///
/// `subdir` is where the tool lives under the install directory, e.g.
/// `platform-tools` for adb.
pub fn find_binary(name: &str, subdir: &str) -> Result<PathBuf> {
    let mut checked_paths = Vec::new();
    let file_name = exe_name(name);

    // 1. ~/.droid-mirror/<subdir>/<name>
    if let Some(dir) = install_dir() {
        let path = dir.join(subdir).join(&file_name);
        checked_paths.push(format!("Install Dir: {:?}", path));
        if path.exists() {
            debug!("Using {} from {:?}", name, path);
            return Ok(path);
        }
    }

    // 2. Fallback to system PATH
    checked_paths.push("System PATH".to_string());
    if let Ok(path) = which::which(&file_name) {
        debug!("Using {} from PATH: {:?}", name, path);
        return Ok(path);
    }

    Err(anyhow::anyhow!(
        "Could not find '{}'. Checked:\n{}",
        name,
        checked_paths.join("\n")
    ))
}

/// Use `explicit` when given, otherwise search for the binary
fn resolve(explicit: Option<&PathBuf>, name: &str, subdir: &str) -> Result<PathBuf> {
    match explicit {
        Some(path) if path.exists() => Ok(path.clone()),
        Some(path) => anyhow::bail!("{} binary not found at {}", name, path.display()),
        None => find_binary(name, subdir),
    }
}

/// Find ADB binary
pub fn find_adb(explicit: Option<&PathBuf>) -> Result<PathBuf> {
    resolve(explicit, "adb", "platform-tools")
}

/// Find scrcpy binary
pub fn find_scrcpy(explicit: Option<&PathBuf>) -> Result<PathBuf> {
    resolve(explicit, "scrcpy", "scrcpy")
}
