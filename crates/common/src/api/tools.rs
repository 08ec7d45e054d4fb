//! Argument and result contracts for every tool exposed over MCP.
//!
//! The JSON schemas advertised in `tools/list` are generated from these
//! types, so a field added here is immediately part of the public contract.
//! Optional result fields are omitted (never defaulted) when the provider did
//! not supply them.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// A WGS84 coordinate pair.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

/// Outcome marker for list-style results.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub enum SearchStatus {
    #[serde(rename = "OK")]
    Ok,
    #[serde(rename = "ZERO_RESULTS")]
    ZeroResults,
}

impl SearchStatus {
    /// `ZeroResults` exactly when nothing was mapped.
    pub fn for_count(count: usize) -> Self {
        if count == 0 {
            Self::ZeroResults
        } else {
            Self::Ok
        }
    }
}

// ---------------------------------------------------------------------------
// geocode
// ---------------------------------------------------------------------------

/// POST tools/call `geocode` arguments.
#[derive(Clone, Debug, Serialize, Deserialize, JsonSchema)]
pub struct GeocodeArgs {
    /// Free-form address or landmark, e.g. "Eiffel Tower".
    pub address: String,
}

#[derive(Clone, Debug, Serialize, Deserialize, JsonSchema)]
pub struct GeocodeOutput {
    pub results: Vec<GeocodeResult>,
    /// Provider status string, "OK" or "ZERO_RESULTS".
    pub status: String,
}

#[derive(Clone, Debug, Serialize, Deserialize, JsonSchema)]
pub struct GeocodeResult {
    pub formatted_address: String,
    pub place_id: String,
    pub location: LatLng,
}

// ---------------------------------------------------------------------------
// places_search_text / places_search_nearby
// ---------------------------------------------------------------------------

#[derive(Clone, Debug, Serialize, Deserialize, JsonSchema)]
pub struct PlacesSearchTextArgs {
    /// Text query, e.g. "coffee near Alexanderplatz".
    pub query: String,
}

#[derive(Clone, Debug, Serialize, Deserialize, JsonSchema)]
pub struct PlacesSearchNearbyArgs {
    pub center_lat: f64,
    pub center_lng: f64,
    /// Search radius in meters (0 < r <= 50000).
    pub radius_meters: f64,
    /// Restrict to these primary place types, e.g. ["restaurant"].
    #[serde(default)]
    pub included_primary_types: Option<Vec<String>>,
    /// Maximum number of places to return (1..=20).
    #[serde(default)]
    pub max_result_count: Option<u32>,
}

/// Shared result of both place searches.
#[derive(Clone, Debug, Serialize, Deserialize, JsonSchema)]
pub struct PlacesSearchOutput {
    pub results: Vec<PlaceSummary>,
    pub status: SearchStatus,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct PlaceSummary {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub formatted_address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<LatLng>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_rating_count: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub primary_type: Option<String>,
}

// ---------------------------------------------------------------------------
// places_autocomplete
// ---------------------------------------------------------------------------

#[derive(Clone, Debug, Serialize, Deserialize, JsonSchema)]
pub struct PlacesAutocompleteArgs {
    /// Partial text typed by the user.
    pub input: String,
    /// Latitude of the bias circle center (requires `bias_center_lng`).
    #[serde(default)]
    pub bias_center_lat: Option<f64>,
    /// Longitude of the bias circle center (requires `bias_center_lat`).
    #[serde(default)]
    pub bias_center_lng: Option<f64>,
    /// Bias circle radius in meters, default 5000.
    #[serde(default)]
    pub bias_radius_meters: Option<f64>,
}

#[derive(Clone, Debug, Serialize, Deserialize, JsonSchema)]
pub struct PlacesAutocompleteOutput {
    pub suggestions: Vec<Suggestion>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum SuggestionKind {
    Place,
    Query,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Suggestion {
    pub kind: SuggestionKind,
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub place_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub distance_meters: Option<u32>,
}

// ---------------------------------------------------------------------------
// places_get_place
// ---------------------------------------------------------------------------

#[derive(Clone, Debug, Serialize, Deserialize, JsonSchema)]
pub struct PlacesGetPlaceArgs {
    /// Place id as returned by search or autocomplete.
    pub place_id: String,
}

#[derive(Clone, Debug, Serialize, Deserialize, JsonSchema)]
pub struct PlacesGetPlaceOutput {
    pub place: PlaceDetails,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct PlaceDetails {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub formatted_address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<LatLng>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_rating_count: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub primary_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub website_uri: Option<String>,
}

// ---------------------------------------------------------------------------
// directions
// ---------------------------------------------------------------------------

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum TravelMode {
    #[default]
    Driving,
    Walking,
    Bicycling,
    Transit,
}

#[derive(Clone, Debug, Serialize, Deserialize, JsonSchema)]
pub struct DirectionsArgs {
    /// Start address or place description.
    pub origin: String,
    /// End address or place description.
    pub destination: String,
    /// Travel mode, default "driving".
    #[serde(default)]
    pub mode: TravelMode,
}

#[derive(Clone, Debug, Serialize, Deserialize, JsonSchema)]
pub struct DirectionsOutput {
    pub routes: Vec<RouteSummary>,
    pub status: SearchStatus,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct RouteSummary {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub distance_meters: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_seconds: Option<f64>,
    pub legs: Vec<RouteLeg>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct RouteLeg {
    pub start_location: LatLng,
    pub end_location: LatLng,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub distance_meters: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_seconds: Option<f64>,
}
