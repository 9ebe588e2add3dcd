//! Request deeplinks.
//!
//! A [`RequestDeeplink`] pairs a client ID with [`RideParameters`]
//! and serializes them into a URI the ride app understands.
//! The very same query is served by the mobile website,
//! so a link can be retargeted with [`RequestDeeplink::uri_for`]
//! when the app is missing.
//!
//! Query parameters always come out in one canonical order:
//! `client_id`, `user-agent`, `action`, `product_id`,
//! then pickup and dropoff as `latitude`, `longitude`, `nickname`, `formatted_address`.
//! Absent values are skipped, never emitted empty.

use crate::ride::{Location, RideParameters};
use log::debug;
use std::fmt;
use url::form_urlencoded;

/// Identifies this builder to the ride service.
pub const USER_AGENT_DEEPLINK: &str = "rides-deeplink-v0.1.0";

const CLIENT_ID: &str = "client_id";
const USER_AGENT: &str = "user-agent";
const ACTION: &str = "action";
const SET_PICKUP: &str = "setPickup";
const PRODUCT_ID: &str = "product_id";

const PICKUP: &str = "pickup";
const DROPOFF: &str = "dropoff";

const LATITUDE: &str = "latitude";
const LONGITUDE: &str = "longitude";
const NICKNAME: &str = "nickname";
const FORMATTED_ADDRESS: &str = "formatted_address";

/// Errors raised by [`RequestDeeplinkBuilder::build`].
///
/// Both are misconfigurations of the caller, retrying is pointless.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum DeeplinkError {
    #[error("Must supply a client ID.")]
    MissingClientId,
    #[error("Must supply ride parameters.")]
    MissingRideParameters,
}

/// Errors raised by [`RequestDeeplink::parse`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("not a ride-request deeplink: {0}")]
    UnknownTarget(String),
    #[error("deeplink has no client_id")]
    MissingClientId,
    #[error("{0}[latitude] and {0}[longitude] must be supplied together")]
    PartialCoordinates(&'static str),
    #[error("{0}[nickname] or {0}[formatted_address] given without coordinates")]
    OrphanedDetail(&'static str),
    #[error("invalid coordinate for {key}: {value:?}")]
    InvalidCoordinate { key: String, value: String },
}

/// Where a deeplink is meant to be opened.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DeeplinkTarget {
    /// Custom scheme, resolved by the installed ride app.
    App,
    /// Mobile website, used when the app isn't installed.
    MobileWeb,
}

impl DeeplinkTarget {
    pub const ALL: [Self; 2] = [Self::App, Self::MobileWeb];

    /// Everything before the query string.
    #[must_use]
    pub const fn prefix(self) -> &'static str {
        match self {
            Self::App => "uber://",
            Self::MobileWeb => "https://m.uber.com/",
        }
    }
}

impl fmt::Display for DeeplinkTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::App => write!(f, "app"),
            Self::MobileWeb => write!(f, "mobile web"),
        }
    }
}

/// A validated ride request, ready to be turned into a URI.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestDeeplink {
    client_id: String,
    ride_parameters: RideParameters,
    query: String,
}

impl RequestDeeplink {
    #[must_use]
    pub fn builder() -> RequestDeeplinkBuilder {
        RequestDeeplinkBuilder::default()
    }

    #[must_use]
    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    #[must_use]
    pub const fn ride_parameters(&self) -> &RideParameters {
        &self.ride_parameters
    }

    /// Encoded query string, without the leading `?`.
    #[must_use]
    pub fn query(&self) -> &str {
        &self.query
    }

    /// Native deeplink, e.g. `uber://?client_id=...`.
    #[must_use]
    pub fn uri(&self) -> String {
        self.uri_for(DeeplinkTarget::App)
    }

    #[must_use]
    pub fn uri_for(&self, target: DeeplinkTarget) -> String {
        format!("{}?{}", target.prefix(), self.query)
    }

    /// Decode a URI produced by [`Self::uri_for`], whichever the target.
    ///
    /// Unknown parameters are ignored,
    /// so links carrying extra tracking parameters still decode.
    pub fn parse(uri: &str) -> Result<(DeeplinkTarget, Self), ParseError> {
        let (target, query) = DeeplinkTarget::ALL
            .into_iter()
            .find_map(|t| {
                let rest = uri.strip_prefix(t.prefix())?;
                if rest.is_empty() {
                    Some((t, ""))
                } else {
                    rest.strip_prefix('?').map(|q| (t, q))
                }
            })
            .ok_or_else(|| ParseError::UnknownTarget(uri.to_string()))?;

        let mut fields = QueryFields::default();
        for (key, value) in form_urlencoded::parse(query.as_bytes()) {
            // never emitted by the encoder: an empty value is an absent one
            if value.is_empty() {
                continue;
            }
            fields.accept(&key, value.into_owned());
        }

        let client_id = fields
            .client_id
            .filter(|id| !id.is_empty())
            .ok_or(ParseError::MissingClientId)?;
        let mut ride = RideParameters::builder()
            .pickup(fields.pickup.into_location(PICKUP)?)
            .dropoff(fields.dropoff.into_location(DROPOFF)?);
        if let Some(product_id) = fields.product_id {
            ride = ride.product_id(product_id);
        }

        let deeplink = Self::builder()
            .client_id(client_id)
            .ride_parameters(ride.build())
            .build()
            .map_err(|_| ParseError::MissingClientId)?;
        Ok((target, deeplink))
    }
}

impl fmt::Display for RequestDeeplink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(DeeplinkTarget::App.prefix())?;
        f.write_str("?")?;
        f.write_str(&self.query)
    }
}

/// Builder for [`RequestDeeplink`]; [`Self::build`] checks both fields are set.
#[derive(Debug, Clone, Default)]
pub struct RequestDeeplinkBuilder {
    client_id: Option<String>,
    ride_parameters: Option<RideParameters>,
}

impl RequestDeeplinkBuilder {
    #[must_use]
    pub fn client_id<S: Into<String>>(mut self, client_id: S) -> Self {
        self.client_id = Some(client_id.into());
        self
    }

    #[must_use]
    pub fn ride_parameters(mut self, ride_parameters: RideParameters) -> Self {
        self.ride_parameters = Some(ride_parameters);
        self
    }

    /// An empty client ID counts as missing.
    pub fn build(self) -> Result<RequestDeeplink, DeeplinkError> {
        let client_id = self
            .client_id
            .filter(|id| !id.is_empty())
            .ok_or(DeeplinkError::MissingClientId)?;
        let ride_parameters = self
            .ride_parameters
            .ok_or(DeeplinkError::MissingRideParameters)?;

        let query = encode_query(&client_id, &ride_parameters);
        debug!("Built deeplink query: {query}");
        Ok(RequestDeeplink {
            client_id,
            ride_parameters,
            query,
        })
    }
}

fn location_key(prefix: &str, field: &str) -> String {
    format!("{prefix}[{field}]")
}

fn append_location(
    query: &mut form_urlencoded::Serializer<'_, String>,
    prefix: &str,
    location: &Location,
) {
    query.append_pair(
        &location_key(prefix, LATITUDE),
        &location.latitude.to_string(),
    );
    query.append_pair(
        &location_key(prefix, LONGITUDE),
        &location.longitude.to_string(),
    );
    if let Some(nickname) = non_empty(location.nickname.as_deref()) {
        query.append_pair(&location_key(prefix, NICKNAME), nickname);
    }
    if let Some(address) = non_empty(location.formatted_address.as_deref()) {
        query.append_pair(&location_key(prefix, FORMATTED_ADDRESS), address);
    }
}

fn non_empty(s: Option<&str>) -> Option<&str> {
    s.filter(|s| !s.is_empty())
}

/// Rides deserialized from config bypass the builder, so unusable values are skipped here too.
fn encode_query(client_id: &str, ride: &RideParameters) -> String {
    let mut query = form_urlencoded::Serializer::new(String::new());
    query
        .append_pair(CLIENT_ID, client_id)
        .append_pair(USER_AGENT, USER_AGENT_DEEPLINK)
        .append_pair(ACTION, SET_PICKUP);
    if let Some(product_id) = non_empty(ride.product_id()) {
        query.append_pair(PRODUCT_ID, product_id);
    }
    if let Some(pickup) = ride.pickup().filter(|l| l.has_finite_coordinates()) {
        append_location(&mut query, PICKUP, pickup);
    }
    if let Some(dropoff) = ride.dropoff().filter(|l| l.has_finite_coordinates()) {
        append_location(&mut query, DROPOFF, dropoff);
    }
    query.finish()
}

/// Raw location fields, as found in a query string.
#[derive(Debug, Default)]
struct LocationFields {
    latitude: Option<String>,
    longitude: Option<String>,
    nickname: Option<String>,
    formatted_address: Option<String>,
}

impl LocationFields {
    fn accept(&mut self, field: &str, value: String) {
        let slot = match field {
            LATITUDE => &mut self.latitude,
            LONGITUDE => &mut self.longitude,
            NICKNAME => &mut self.nickname,
            FORMATTED_ADDRESS => &mut self.formatted_address,
            _ => return,
        };
        *slot = Some(value);
    }

    fn into_location(self, prefix: &'static str) -> Result<Option<Location>, ParseError> {
        let coordinate = |field: &str, value: String| {
            value
                .parse::<f64>()
                .ok()
                .filter(|v| v.is_finite())
                .ok_or_else(|| ParseError::InvalidCoordinate {
                    key: location_key(prefix, field),
                    value,
                })
        };
        match (self.latitude, self.longitude) {
            (Some(lat), Some(long)) => Ok(Some(Location {
                latitude: coordinate(LATITUDE, lat)?,
                longitude: coordinate(LONGITUDE, long)?,
                nickname: self.nickname,
                formatted_address: self.formatted_address,
            })),
            (None, None) if self.nickname.is_none() && self.formatted_address.is_none() => {
                Ok(None)
            }
            (None, None) => Err(ParseError::OrphanedDetail(prefix)),
            _ => Err(ParseError::PartialCoordinates(prefix)),
        }
    }
}

#[derive(Debug, Default)]
struct QueryFields {
    client_id: Option<String>,
    product_id: Option<String>,
    pickup: LocationFields,
    dropoff: LocationFields,
}

impl QueryFields {
    fn accept(&mut self, key: &str, value: String) {
        match key {
            CLIENT_ID => self.client_id = Some(value),
            PRODUCT_ID => self.product_id = Some(value),
            _ => {
                let Some((prefix, field)) = key
                    .strip_suffix(']')
                    .and_then(|k| k.split_once('['))
                else {
                    return;
                };
                match prefix {
                    PICKUP => self.pickup.accept(field, value),
                    DROPOFF => self.dropoff.accept(field, value),
                    _ => {}
                }
            }
        }
    }
}
