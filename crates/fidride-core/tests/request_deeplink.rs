use fidride_core::adb::PackageId;
use fidride_core::deeplink::{DeeplinkError, DeeplinkTarget, RequestDeeplink};
use fidride_core::dispatch::{ActivityLauncher, Intent, PackageRegistry, RIDE_APP_PACKAGE};
use fidride_core::ride::RideParameters;
use std::convert::Infallible;
use url::form_urlencoded;

const CLIENT_ID: &str = "clientId";
const PRODUCT_ID: &str = "productId";
const PICKUP_LAT: f64 = 32.1234;
const PICKUP_LONG: f64 = -122.3456;
const PICKUP_NICK: &str = "pickupNick";
const PICKUP_ADDR: &str = "Pickup Address";
const DROPOFF_LAT: f64 = 32.5678;
const DROPOFF_LONG: f64 = -122.6789;
const DROPOFF_NICK: &str = "pickupNick";
const DROPOFF_ADDR: &str = "Dropoff Address";

const BASE_QUERY: &str = "client_id=clientId&user-agent=rides-deeplink-v0.1.0&action=setPickup";
const PICKUP_QUERY: &str = "pickup%5Blatitude%5D=32.1234&pickup%5Blongitude%5D=-122.3456\
    &pickup%5Bnickname%5D=pickupNick&pickup%5Bformatted_address%5D=Pickup+Address";
const DROPOFF_QUERY: &str = "dropoff%5Blatitude%5D=32.5678&dropoff%5Blongitude%5D=-122.6789\
    &dropoff%5Bnickname%5D=pickupNick&dropoff%5Bformatted_address%5D=Dropoff+Address";

#[derive(Default)]
struct Device {
    ride_app_installed: bool,
    started: Vec<Intent>,
}

impl PackageRegistry for Device {
    fn is_package_installed(&self, package: &PackageId) -> bool {
        self.ride_app_installed && package.as_str() == RIDE_APP_PACKAGE
    }
}

impl ActivityLauncher for Device {
    type Error = Infallible;

    fn start_activity(&mut self, intent: &Intent) -> Result<(), Infallible> {
        self.started.push(intent.clone());
        Ok(())
    }
}

fn build(ride: RideParameters) -> RequestDeeplink {
    RequestDeeplink::builder()
        .ride_parameters(ride)
        .client_id(CLIENT_ID)
        .build()
        .expect("client ID and ride parameters are set")
}

fn full_ride() -> RideParameters {
    RideParameters::builder()
        .pickup_location(PICKUP_LAT, PICKUP_LONG, Some(PICKUP_NICK), Some(PICKUP_ADDR))
        .dropoff_location(DROPOFF_LAT, DROPOFF_LONG, Some(DROPOFF_NICK), Some(DROPOFF_ADDR))
        .product_id(PRODUCT_ID)
        .build()
}

fn query_keys(uri: &str) -> Vec<String> {
    let (_, query) = uri.split_once('?').expect("has a query");
    form_urlencoded::parse(query.as_bytes())
        .map(|(k, _)| k.into_owned())
        .collect()
}

#[test]
fn default_ride_params_only_have_defaults() {
    let deeplink = build(RideParameters::builder().build());
    assert_eq!(deeplink.uri(), format!("uber://?{BASE_QUERY}"));
    assert!(
        query_keys(&deeplink.uri())
            .iter()
            .all(|k| !k.starts_with("pickup") && !k.starts_with("dropoff"))
    );
}

#[test]
fn full_ride_params_complete_the_uri() {
    let deeplink = build(full_ride());
    assert_eq!(
        deeplink.uri(),
        format!("uber://?{BASE_QUERY}&product_id=productId&{PICKUP_QUERY}&{DROPOFF_QUERY}")
    );

    let keys = query_keys(&deeplink.uri());
    let ride_keys: Vec<_> = keys
        .iter()
        .filter(|k| !["client_id", "user-agent", "action"].contains(&k.as_str()))
        .collect();
    assert_eq!(ride_keys.len(), 9);
    assert_eq!(ride_keys[0], "product_id");
}

#[test]
fn pickup_only_has_no_dropoff_or_product() {
    let deeplink = build(
        RideParameters::builder()
            .pickup_location(PICKUP_LAT, PICKUP_LONG, Some(PICKUP_NICK), Some(PICKUP_ADDR))
            .build(),
    );
    assert_eq!(deeplink.uri(), format!("uber://?{BASE_QUERY}&{PICKUP_QUERY}"));
}

#[test]
fn dropoff_and_product_without_pickup() {
    let ride = RideParameters::builder()
        .product_id(PRODUCT_ID)
        .dropoff_location(DROPOFF_LAT, DROPOFF_LONG, Some(DROPOFF_NICK), Some(DROPOFF_ADDR))
        .build();
    assert!(ride.pickup().is_none());
    assert_eq!(
        build(ride).uri(),
        format!("uber://?{BASE_QUERY}&product_id=productId&{DROPOFF_QUERY}")
    );
}

#[test]
fn no_nickname_or_address() {
    let deeplink = build(
        RideParameters::builder()
            .product_id(PRODUCT_ID)
            .pickup_location(PICKUP_LAT, PICKUP_LONG, None, None)
            .dropoff_location(DROPOFF_LAT, DROPOFF_LONG, None, None)
            .build(),
    );
    assert_eq!(
        deeplink.uri(),
        format!(
            "uber://?{BASE_QUERY}&product_id=productId\
             &pickup%5Blatitude%5D=32.1234&pickup%5Blongitude%5D=-122.3456\
             &dropoff%5Blatitude%5D=32.5678&dropoff%5Blongitude%5D=-122.6789"
        )
    );
}

#[test]
fn no_client_id_does_not_build() {
    let err = RequestDeeplink::builder()
        .ride_parameters(RideParameters::builder().build())
        .build()
        .unwrap_err();
    assert_eq!(err, DeeplinkError::MissingClientId);
    assert_eq!(err.to_string(), "Must supply a client ID.");
}

#[test]
fn no_ride_params_do_not_build() {
    let err = RequestDeeplink::builder()
        .client_id(CLIENT_ID)
        .build()
        .unwrap_err();
    assert_eq!(err, DeeplinkError::MissingRideParameters);
    assert_eq!(err.to_string(), "Must supply ride parameters.");
}

#[test]
fn execute_without_app_points_to_mobile_site() {
    let mut device = Device::default();
    let deeplink = build(full_ride());

    let intent = deeplink.execute(&mut device).unwrap();

    assert_eq!(device.started.len(), 1);
    let started = &device.started[0];
    assert_eq!(started, &intent);
    assert_eq!(started.target, DeeplinkTarget::MobileWeb);
    assert_eq!(
        started.data,
        format!("https://m.uber.com/?{}", deeplink.query())
    );
    assert_eq!(query_keys(&started.data), query_keys(&deeplink.uri()));
}

#[test]
fn execute_with_app_points_to_app() {
    let mut device = Device {
        ride_app_installed: true,
        ..Device::default()
    };
    let deeplink = build(RideParameters::builder().build());

    deeplink.execute(&mut device).unwrap();

    assert_eq!(device.started.len(), 1);
    assert_eq!(device.started[0].target, DeeplinkTarget::App);
    assert_eq!(device.started[0].data, format!("uber://?{BASE_QUERY}"));
}

#[test]
fn parse_recovers_every_field() {
    let rides = [
        RideParameters::default(),
        full_ride(),
        RideParameters::demo(),
        RideParameters::builder()
            .dropoff_location(-33.8688, 151.2093, None, Some("Sydney & co, NSW"))
            .build(),
    ];
    for ride in rides {
        let deeplink = build(ride.clone());
        for target in DeeplinkTarget::ALL {
            let (parsed_target, parsed) =
                RequestDeeplink::parse(&deeplink.uri_for(target)).unwrap();
            assert_eq!(parsed_target, target);
            assert_eq!(parsed.client_id(), CLIENT_ID);
            assert_eq!(parsed.ride_parameters(), &ride);
            assert_eq!(parsed, deeplink);
        }
    }
}

#[test]
fn unusable_values_never_reach_the_uri() {
    let ride = RideParameters::builder()
        .product_id("")
        .pickup_location(PICKUP_LAT, PICKUP_LONG, Some(""), None)
        .dropoff_location(f64::NAN, DROPOFF_LONG, Some(DROPOFF_NICK), None)
        .build();
    let deeplink = build(ride.clone());
    assert_eq!(
        deeplink.uri(),
        format!(
            "uber://?{BASE_QUERY}&pickup%5Blatitude%5D=32.1234&pickup%5Blongitude%5D=-122.3456"
        )
    );
    let (_, parsed) = RequestDeeplink::parse(&deeplink.uri()).unwrap();
    assert_eq!(parsed.ride_parameters(), &ride);
}
