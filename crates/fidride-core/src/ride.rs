//! Trip description shared by every request of a session.

use log::warn;
use serde::{Deserialize, Serialize};

/// A point on the map, optionally labelled.
///
/// Coordinates only exist as a pair, and labels only exist next to them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nickname: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub formatted_address: Option<String>,
}

impl Location {
    #[must_use]
    pub fn new(
        latitude: f64,
        longitude: f64,
        nickname: Option<&str>,
        formatted_address: Option<&str>,
    ) -> Self {
        Self {
            latitude,
            longitude,
            nickname: non_empty(nickname),
            formatted_address: non_empty(formatted_address),
        }
    }

    /// NaN or infinite coordinates can't be put on a map, nor survive a URI.
    #[must_use]
    pub const fn has_finite_coordinates(&self) -> bool {
        self.latitude.is_finite() && self.longitude.is_finite()
    }
}

/// Empty labels carry nothing and are dropped.
fn non_empty(s: Option<&str>) -> Option<String> {
    s.filter(|s| !s.is_empty()).map(str::to_owned)
}

fn usable(location: Option<Location>) -> Option<Location> {
    let location = location?;
    if location.has_finite_coordinates() {
        Some(Location::new(
            location.latitude,
            location.longitude,
            location.nickname.as_deref(),
            location.formatted_address.as_deref(),
        ))
    } else {
        warn!(
            "Ignoring location with non-finite coordinates ({}, {})",
            location.latitude, location.longitude
        );
        None
    }
}

/// Immutable description of a desired trip.
///
/// Every field is optional: an empty value lets the ride app ask the user.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RideParameters {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    product_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pickup: Option<Location>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    dropoff: Option<Location>,
}

impl RideParameters {
    #[must_use]
    pub fn builder() -> RideParametersBuilder {
        RideParametersBuilder::default()
    }

    /// UberX from the Fidelity Investor Center to One Embarcadero Center.
    #[must_use]
    pub fn demo() -> Self {
        Self::builder()
            .product_id("a1111c8c-c720-46c3-8534-2fcdd730040d")
            .pickup_location(
                37.775_304,
                -122.417_522,
                Some("Fidelity Investor Center"),
                Some("1455 Market Street, San Francisco"),
            )
            .dropoff_location(
                37.795_079,
                -122.397_805,
                Some("Boston"),
                Some("One Embarcadero Center, San Francisco"),
            )
            .build()
    }

    #[must_use]
    pub fn product_id(&self) -> Option<&str> {
        self.product_id.as_deref()
    }

    #[must_use]
    pub const fn pickup(&self) -> Option<&Location> {
        self.pickup.as_ref()
    }

    #[must_use]
    pub const fn dropoff(&self) -> Option<&Location> {
        self.dropoff.as_ref()
    }
}

/// Builder for [`RideParameters`]. Setters overwrite and never fail.
///
/// An empty product ID or label counts as unset,
/// and so does a location with non-finite coordinates.
#[derive(Debug, Clone, Default)]
pub struct RideParametersBuilder(RideParameters);

impl RideParametersBuilder {
    #[must_use]
    pub fn product_id<S: Into<String>>(mut self, product_id: S) -> Self {
        let product_id = product_id.into();
        self.0.product_id = (!product_id.is_empty()).then_some(product_id);
        self
    }

    #[must_use]
    pub fn pickup_location(
        mut self,
        latitude: f64,
        longitude: f64,
        nickname: Option<&str>,
        formatted_address: Option<&str>,
    ) -> Self {
        self.0.pickup = usable(Some(Location::new(
            latitude,
            longitude,
            nickname,
            formatted_address,
        )));
        self
    }

    #[must_use]
    pub fn dropoff_location(
        mut self,
        latitude: f64,
        longitude: f64,
        nickname: Option<&str>,
        formatted_address: Option<&str>,
    ) -> Self {
        self.0.dropoff = usable(Some(Location::new(
            latitude,
            longitude,
            nickname,
            formatted_address,
        )));
        self
    }

    /// Used when a whole [`Location`] is already at hand, e.g. decoded from a deeplink.
    #[must_use]
    pub fn pickup(mut self, location: Option<Location>) -> Self {
        self.0.pickup = usable(location);
        self
    }

    #[must_use]
    pub fn dropoff(mut self, location: Option<Location>) -> Self {
        self.0.dropoff = usable(location);
        self
    }

    #[must_use]
    pub fn build(self) -> RideParameters {
        self.0
    }
}
