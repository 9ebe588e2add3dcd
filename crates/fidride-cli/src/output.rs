use fidride_core::deeplink::{DeeplinkTarget, RequestDeeplink};
use fidride_core::dispatch::Intent;
use fidride_core::ride::RideParameters;
use serde::Serialize;
use std::io::Write;

/// Print to stdout, exiting quietly once the reader (e.g. `head`) closes the pipe.
#[macro_export]
macro_rules! println_or_exit {
    () => {
        if writeln!(std::io::stdout()).is_err() {
            std::process::exit(0);
        }
    };
    ($($arg:tt)*) => {
        if writeln!(std::io::stdout(), $($arg)*).is_err() {
            std::process::exit(0);
        }
    };
}

#[macro_export]
macro_rules! print_or_exit {
    ($($arg:tt)*) => {
        if write!(std::io::stdout(), $($arg)*).is_err() {
            std::process::exit(0);
        }
    };
}

/// Both forms of a deeplink, for `uri --json`.
#[derive(Debug, Serialize)]
pub struct LinkReport<'a> {
    pub client_id: &'a str,
    pub app: String,
    pub mobile_web: String,
}

impl<'a> From<&'a RequestDeeplink> for LinkReport<'a> {
    fn from(deeplink: &'a RequestDeeplink) -> Self {
        Self {
            client_id: deeplink.client_id(),
            app: deeplink.uri_for(DeeplinkTarget::App),
            mobile_web: deeplink.uri_for(DeeplinkTarget::MobileWeb),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ParsedLink<'a> {
    pub target: DeeplinkTarget,
    pub client_id: &'a str,
    pub ride: &'a RideParameters,
}

pub fn print_json<T: Serialize>(value: &T) -> Result<(), serde_json::Error> {
    let text = serde_json::to_string_pretty(value)?;
    println_or_exit!("{text}");
    Ok(())
}

pub fn print_intent(intent: &Intent, dry_run: bool) {
    let verb = if dry_run { "Would open" } else { "Opened" };
    println_or_exit!("{verb} in {}: {}", intent.target, intent.data);
}
