use clap::{Parser, Subcommand};
use colored::Colorize;
use std::path::PathBuf;

use droid_mirror::registry::DEFAULT_REGISTRY_FILE;
use droid_mirror::runner::{self, Outcome};
use droid_mirror::utils::config::Config;

#[derive(Parser)]
#[command(name = "droid-mirror")]
#[command(version)]
#[command(about = "Pick an Android device over adb and mirror it with scrcpy", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Device registry file
    #[arg(long, global = true, default_value = DEFAULT_REGISTRY_FILE)]
    registry: PathBuf,

    /// Path to the adb binary (searched for when omitted)
    #[arg(long, global = true)]
    adb: Option<PathBuf>,

    /// Path to the scrcpy binary (searched for when omitted)
    #[arg(long, global = true)]
    scrcpy: Option<PathBuf>,

    /// More log output (-v info, -vv debug)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Choose a device and start mirroring (default)
    Connect,

    /// Refresh the registry and list every known device
    Devices,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = Config {
        registry_path: cli.registry,
        adb_path: cli.adb,
        scrcpy_path: cli.scrcpy,
        verbosity: cli.verbose,
    };

    env_logger::Builder::new()
        .filter_level(config.log_level())
        .parse_default_env()
        .init();

    match cli.command.unwrap_or(Commands::Connect) {
        Commands::Connect => {
            if runner::run(&config).await? == Outcome::NoDevices {
                log::info!("Nothing to mirror");
            }
        }

        Commands::Devices => {
            println!("{} Refreshing device registry...", "🔍".blue());
            runner::list_devices(&config).await?;
        }
    }

    Ok(())
}
