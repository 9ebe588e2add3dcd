#![allow(
    clippy::needless_pass_by_value,
    clippy::exit,
    reason = "clap hands over owned args; broken pipes end the process quietly"
)]

use clap::{Args, Parser, Subcommand, ValueEnum};
use clap_complete::Shell;
use fidride_core::adb::AdbBackend;
use std::path::PathBuf;

mod commands;
mod logger;
mod output;

/// CLI-compatible ADB backend selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum AdbBackendArg {
    /// Built-in ADB implementation (no external dependencies)
    Builtin,
    /// Use system-installed adb binary
    System,
}

impl From<AdbBackendArg> for AdbBackend {
    fn from(arg: AdbBackendArg) -> Self {
        match arg {
            AdbBackendArg::Builtin => AdbBackend::Builtin,
            AdbBackendArg::System => AdbBackend::System,
        }
    }
}

#[derive(Parser)]
#[command(name = "fidride")]
#[command(about = "Build and open ride-request deeplinks", long_about = None)]
#[command(version)]
#[command(propagate_version = true)]
pub struct Cli {
    /// ADB backend; overrides the config file
    #[arg(short = 'B', long = "backend", value_enum, global = true)]
    backend: Option<AdbBackendArg>,

    /// Config file to use instead of the default one
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// More logging (-v: info, -vv: debug, -vvv: trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

/// Overrides for the configured ride. Coordinates come in pairs.
#[derive(Args, Debug, Default)]
pub struct RideArgs {
    /// Start from an empty ride instead of the one in the config file
    #[arg(long)]
    no_config_ride: bool,

    /// Product (service tier) ID
    #[arg(long)]
    product: Option<String>,

    #[arg(long, requires = "pickup_lng", allow_negative_numbers = true, value_parser = finite_coordinate)]
    pickup_lat: Option<f64>,
    #[arg(long, requires = "pickup_lat", allow_negative_numbers = true, value_parser = finite_coordinate)]
    pickup_lng: Option<f64>,
    #[arg(long, requires = "pickup_lat")]
    pickup_nickname: Option<String>,
    #[arg(long, requires = "pickup_lat")]
    pickup_address: Option<String>,

    #[arg(long, requires = "dropoff_lng", allow_negative_numbers = true, value_parser = finite_coordinate)]
    dropoff_lat: Option<f64>,
    #[arg(long, requires = "dropoff_lat", allow_negative_numbers = true, value_parser = finite_coordinate)]
    dropoff_lng: Option<f64>,
    #[arg(long, requires = "dropoff_lat")]
    dropoff_nickname: Option<String>,
    #[arg(long, requires = "dropoff_lat")]
    dropoff_address: Option<String>,
}

/// Coordinates must be real numbers; `NaN` and `inf` parse as `f64` but mean nothing on a map.
fn finite_coordinate(s: &str) -> Result<f64, String> {
    match s.parse::<f64>() {
        Ok(v) if v.is_finite() => Ok(v),
        Ok(_) => Err(format!("{s} is not a finite coordinate")),
        Err(e) => Err(e.to_string()),
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Print the deeplink for a ride
    Uri {
        #[command(flatten)]
        ride: RideArgs,

        /// Client ID; overrides the config file
        #[arg(long)]
        client_id: Option<String>,

        /// Print the mobile-web fallback instead of the app link
        #[arg(long, conflicts_with = "json")]
        web: bool,

        /// Print both links as JSON
        #[arg(long)]
        json: bool,
    },

    /// Open the deeplink on a device: in the ride app if installed, else on the mobile site
    Request {
        #[command(flatten)]
        ride: RideArgs,

        /// Client ID; overrides the config file
        #[arg(long)]
        client_id: Option<String>,

        /// Device serial number (optional, uses the configured or first device)
        #[arg(short, long)]
        device: Option<String>,

        /// User ID
        #[arg(short, long)]
        user: Option<u16>,

        /// Only report which link would be opened
        #[arg(long)]
        dry_run: bool,
    },

    /// Decode a deeplink back into its ride
    Parse {
        uri: String,
    },

    /// List connected Android devices
    Devices,

    /// Show the config file path and its effective contents
    Config,

    /// Generate shell completion script
    Completions {
        #[arg(value_enum)]
        shell: Shell,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    logger::setup_logger(cli.verbose)?;

    let load = || commands::Context::load(cli.config.clone(), cli.backend.map(Into::into));

    match cli.command {
        Commands::Uri {
            ref ride,
            ref client_id,
            web,
            json,
        } => {
            commands::print_uri(&load()?, ride, client_id.clone(), web, json)?;
        }
        Commands::Request {
            ref ride,
            ref client_id,
            ref device,
            user,
            dry_run,
        } => {
            commands::request_ride(
                &load()?,
                ride,
                client_id.clone(),
                device.clone(),
                user,
                dry_run,
            )?;
        }
        Commands::Parse { ref uri } => {
            commands::parse_uri(uri)?;
        }
        Commands::Devices => {
            commands::list_devices(&load()?)?;
        }
        Commands::Config => {
            commands::show_config(&load()?)?;
        }
        Commands::Completions { shell } => {
            commands::generate_completions(shell);
        }
    }

    Ok(())
}
