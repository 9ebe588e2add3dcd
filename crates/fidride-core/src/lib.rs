//! Ride-request deeplinks: build them, parse them back,
//! and open them on a device through whichever app can handle them.

pub mod adb;
pub mod config;
pub mod deeplink;
pub mod device;
pub mod dispatch;
pub mod ride;
pub mod utils;

pub use deeplink::{DeeplinkError, DeeplinkTarget, ParseError, RequestDeeplink};
pub use dispatch::{ActivityLauncher, Intent, PackageRegistry};
pub use ride::{Location, RideParameters};
