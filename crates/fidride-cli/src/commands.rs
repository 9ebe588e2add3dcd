use crate::output::{self, LinkReport};
use crate::{Cli, RideArgs, print_or_exit, println_or_exit};
use clap::CommandFactory;
use clap_complete::{Shell, generate};
use fidride_core::adb::AdbBackend;
use fidride_core::config::Config;
use fidride_core::deeplink::{DeeplinkTarget, RequestDeeplink};
use fidride_core::device::AdbDevice;
use fidride_core::ride::{Location, RideParameters};
use log::{info, warn};
use std::io::Write;
use std::path::PathBuf;

type CmdResult = Result<(), Box<dyn std::error::Error>>;

/// Everything a command needs from the environment.
pub struct Context {
    pub config_path: PathBuf,
    pub config: Config,
    pub backend: AdbBackend,
}

impl Context {
    pub fn load(
        path: Option<PathBuf>,
        backend: Option<AdbBackend>,
    ) -> Result<Self, fidride_core::config::ConfigError> {
        let config_path = match path {
            Some(p) => p,
            None => Config::default_path()?,
        };
        let config = Config::load_or_init(&config_path)?;
        let backend = backend.unwrap_or(config.backend);
        Ok(Self {
            config_path,
            config,
            backend,
        })
    }

    fn client_id(&self, overridden: Option<String>) -> Result<String, Box<dyn std::error::Error>> {
        match overridden {
            Some(id) => Ok(id),
            None => Ok(self.config.client_id(&self.config_path)?.to_string()),
        }
    }
}

fn location(
    base: Option<&Location>,
    lat: Option<f64>,
    lng: Option<f64>,
    nickname: Option<&String>,
    address: Option<&String>,
) -> Option<Location> {
    match (lat, lng) {
        (Some(latitude), Some(longitude)) => Some(Location::new(
            latitude,
            longitude,
            nickname.map(String::as_str),
            address.map(String::as_str),
        )),
        _ => base.cloned(),
    }
}

/// Config ride (unless disabled), with command-line overrides on top.
pub fn ride_parameters(config: &Config, args: &RideArgs) -> RideParameters {
    let base = if args.no_config_ride {
        RideParameters::default()
    } else {
        config.ride.clone()
    };

    let mut builder = RideParameters::builder()
        .pickup(location(
            base.pickup(),
            args.pickup_lat,
            args.pickup_lng,
            args.pickup_nickname.as_ref(),
            args.pickup_address.as_ref(),
        ))
        .dropoff(location(
            base.dropoff(),
            args.dropoff_lat,
            args.dropoff_lng,
            args.dropoff_nickname.as_ref(),
            args.dropoff_address.as_ref(),
        ));
    if let Some(product_id) = args.product.as_deref().or(base.product_id()) {
        builder = builder.product_id(product_id);
    }
    builder.build()
}

fn build_deeplink(
    ctx: &Context,
    args: &RideArgs,
    client_id: Option<String>,
) -> Result<RequestDeeplink, Box<dyn std::error::Error>> {
    Ok(RequestDeeplink::builder()
        .client_id(ctx.client_id(client_id)?)
        .ride_parameters(ride_parameters(&ctx.config, args))
        .build()?)
}

pub fn print_uri(
    ctx: &Context,
    args: &RideArgs,
    client_id: Option<String>,
    web: bool,
    json: bool,
) -> CmdResult {
    let deeplink = build_deeplink(ctx, args, client_id)?;
    if json {
        output::print_json(&LinkReport::from(&deeplink))?;
    } else {
        let target = if web {
            DeeplinkTarget::MobileWeb
        } else {
            DeeplinkTarget::App
        };
        println_or_exit!("{}", deeplink.uri_for(target));
    }
    Ok(())
}

pub fn request_ride(
    ctx: &Context,
    args: &RideArgs,
    client_id: Option<String>,
    device: Option<String>,
    user: Option<u16>,
    dry_run: bool,
) -> CmdResult {
    let deeplink = build_deeplink(ctx, args, client_id)?;

    let serial = match device.or_else(|| ctx.config.device.clone()) {
        Some(serial) => Some(serial),
        None => AdbDevice::online(ctx.backend)
            .map_err(|e| {
                warn!("Cannot list devices: {e}");
                e
            })?
            .into_iter()
            .next(),
    };
    let Some(serial) = serial else {
        return Err("No device found. Connect a device and authorize USB debugging.".into());
    };
    info!("Using device {serial} via {} backend", ctx.backend);

    let mut device = AdbDevice::new(ctx.backend, Some(serial), user.or(ctx.config.user));
    let intent = if dry_run {
        deeplink.resolve(&device)
    } else {
        deeplink.execute(&mut device)?
    };

    output::print_intent(&intent, dry_run);
    Ok(())
}

pub fn parse_uri(uri: &str) -> CmdResult {
    let (target, deeplink) = RequestDeeplink::parse(uri)?;
    output::print_json(&output::ParsedLink {
        target,
        client_id: deeplink.client_id(),
        ride: deeplink.ride_parameters(),
    })?;
    Ok(())
}

pub fn list_devices(ctx: &Context) -> CmdResult {
    let devices = fidride_core::adb::ACommand::with_backend(ctx.backend).devices()?;
    if devices.is_empty() {
        println_or_exit!("No devices found");
    }
    for (serial, status) in devices {
        println_or_exit!("{serial}\t{status}");
    }
    Ok(())
}

pub fn show_config(ctx: &Context) -> CmdResult {
    println_or_exit!("# {}", ctx.config_path.display());
    print_or_exit!("{}", toml_text(&ctx.config)?);
    if ctx.config.client_id(&ctx.config_path).is_err() {
        warn!("client_id is not set yet");
    }
    Ok(())
}

fn toml_text(config: &Config) -> Result<String, Box<dyn std::error::Error>> {
    Ok(toml::to_string_pretty(config)?)
}

pub fn generate_completions(shell: Shell) {
    let mut cmd = Cli::command();
    generate(shell, &mut cmd, "fidride", &mut std::io::stdout());
}
