//! Provider-facing request and response shapes.
//!
//! Response types mirror the Google Maps Platform JSON wire format and are
//! deliberately lenient: everything the tools treat as optional is an
//! `Option` here so a sparse response never fails to parse.

use serde::Deserialize;

use geomcp_common::api::tools::{LatLng, TravelMode};

// ---------------------------------------------------------------------------
// Requests (provider-neutral, built by tool handlers)
// ---------------------------------------------------------------------------

/// Circle search around a center point.
#[derive(Clone, Debug, PartialEq)]
pub struct NearbyRequest {
    pub center: LatLng,
    pub radius_meters: f64,
    pub included_primary_types: Vec<String>,
    pub max_result_count: Option<u32>,
}

/// Circle used to bias autocomplete predictions.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BiasCircle {
    pub center: LatLng,
    pub radius_meters: f64,
}

#[derive(Clone, Debug, PartialEq)]
pub struct AutocompleteRequest {
    pub input: String,
    pub bias: Option<BiasCircle>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct RouteRequest {
    pub origin: String,
    pub destination: String,
    pub mode: TravelMode,
}

// ---------------------------------------------------------------------------
// Geocoding API
// ---------------------------------------------------------------------------

#[derive(Clone, Debug, Deserialize)]
pub struct GeocodeReply {
    #[serde(default)]
    pub results: Vec<WireGeocodeResult>,
    pub status: String,
    #[serde(default)]
    pub error_message: Option<String>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct WireGeocodeResult {
    pub formatted_address: String,
    pub place_id: String,
    pub geometry: WireGeometry,
}

#[derive(Clone, Debug, Deserialize)]
pub struct WireGeometry {
    pub location: WireLatLngLiteral,
}

/// `{lat, lng}` as used by the legacy web-service APIs.
#[derive(Clone, Copy, Debug, Deserialize)]
pub struct WireLatLngLiteral {
    pub lat: f64,
    pub lng: f64,
}

// ---------------------------------------------------------------------------
// Places API (New)
// ---------------------------------------------------------------------------

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WirePlace {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub display_name: Option<LocalizedText>,
    #[serde(default)]
    pub formatted_address: Option<String>,
    #[serde(default)]
    pub location: Option<WireLatLng>,
    #[serde(default)]
    pub rating: Option<f64>,
    #[serde(default)]
    pub user_rating_count: Option<u32>,
    #[serde(default)]
    pub primary_type: Option<String>,
    #[serde(default)]
    pub national_phone_number: Option<String>,
    #[serde(default)]
    pub international_phone_number: Option<String>,
    #[serde(default)]
    pub website_uri: Option<String>,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocalizedText {
    pub text: String,
    #[serde(default)]
    pub language_code: Option<String>,
}

/// `{latitude, longitude}` as used by the Places and Routes APIs.
#[derive(Clone, Copy, Debug, Deserialize)]
pub struct WireLatLng {
    pub latitude: f64,
    pub longitude: f64,
}

impl From<WireLatLng> for LatLng {
    fn from(p: WireLatLng) -> Self {
        LatLng {
            lat: p.latitude,
            lng: p.longitude,
        }
    }
}

impl From<WireLatLngLiteral> for LatLng {
    fn from(p: WireLatLngLiteral) -> Self {
        LatLng {
            lat: p.lat,
            lng: p.lng,
        }
    }
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireSuggestion {
    #[serde(default)]
    pub place_prediction: Option<PlacePrediction>,
    #[serde(default)]
    pub query_prediction: Option<QueryPrediction>,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlacePrediction {
    #[serde(default)]
    pub place_id: Option<String>,
    #[serde(default)]
    pub text: Option<FormattableText>,
    #[serde(default)]
    pub distance_meters: Option<u32>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct QueryPrediction {
    #[serde(default)]
    pub text: Option<FormattableText>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct FormattableText {
    pub text: String,
}

// ---------------------------------------------------------------------------
// Routes API
// ---------------------------------------------------------------------------

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireRoute {
    #[serde(default)]
    pub distance_meters: Option<u32>,
    #[serde(default)]
    pub duration: Option<WireDuration>,
    #[serde(default)]
    pub legs: Vec<WireRouteLeg>,
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireRouteLeg {
    #[serde(default)]
    pub distance_meters: Option<u32>,
    #[serde(default)]
    pub duration: Option<WireDuration>,
    #[serde(default)]
    pub start_location: Option<WireLocation>,
    #[serde(default)]
    pub end_location: Option<WireLocation>,
}

#[derive(Clone, Copy, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireLocation {
    pub lat_lng: WireLatLng,
}

/// A protobuf `Duration` as it appears on the wire.
///
/// JSON transcoding renders it as `"123.5s"`; RPC-style clients hand back
/// `{seconds, nanos}` where `seconds` is an int64 that may arrive as a string.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum WireDuration {
    Text(String),
    Structured {
        #[serde(default)]
        seconds: Option<WireInt64>,
        #[serde(default)]
        nanos: Option<i64>,
    },
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum WireInt64 {
    Number(i64),
    Text(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_sparse_place() {
        let place: WirePlace = serde_json::from_str(r#"{"id": "abc"}"#).unwrap();
        assert_eq!(place.id.as_deref(), Some("abc"));
        assert!(place.display_name.is_none());
        assert!(place.location.is_none());
    }

    #[test]
    fn test_parse_duration_variants() {
        let text: WireDuration = serde_json::from_str(r#""3.5s""#).unwrap();
        assert_eq!(text, WireDuration::Text("3.5s".into()));

        let structured: WireDuration =
            serde_json::from_str(r#"{"seconds": "3", "nanos": 500000000}"#).unwrap();
        assert_eq!(
            structured,
            WireDuration::Structured {
                seconds: Some(WireInt64::Text("3".into())),
                nanos: Some(500_000_000),
            }
        );
    }

    #[test]
    fn test_parse_route_leg_locations() {
        let leg: WireRouteLeg = serde_json::from_str(
            r#"{
                "distanceMeters": 1200,
                "duration": "300s",
                "startLocation": {"latLng": {"latitude": 1.5, "longitude": 2.5}},
                "endLocation": {"latLng": {"latitude": 3.0, "longitude": 4.0}}
            }"#,
        )
        .unwrap();

        let start: LatLng = leg.start_location.unwrap().lat_lng.into();
        assert_eq!(start, LatLng { lat: 1.5, lng: 2.5 });
        assert_eq!(leg.distance_meters, Some(1200));
    }
}
