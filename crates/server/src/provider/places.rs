use serde::{Deserialize, Serialize};

use geomcp_common::config::ProviderConfig;

use super::types::{AutocompleteRequest, BiasCircle, NearbyRequest, WirePlace, WireSuggestion};
use super::{endpoint, send_json, ProviderError, API_KEY_HEADER, FIELD_MASK_HEADER};

const SEARCH_FIELD_MASK: &str = "places.id,places.displayName,places.formattedAddress,\
places.location,places.rating,places.userRatingCount,places.primaryType";

const DETAILS_FIELD_MASK: &str = "id,displayName,formattedAddress,location,rating,\
userRatingCount,primaryType,nationalPhoneNumber,internationalPhoneNumber,websiteUri";

// ---------------------------------------------------------------------------
// Request wire types
// ---------------------------------------------------------------------------

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SearchTextBody<'a> {
    text_query: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SearchNearbyBody<'a> {
    location_restriction: AreaBody,
    #[serde(skip_serializing_if = "is_empty_slice")]
    included_primary_types: &'a [String],
    #[serde(skip_serializing_if = "Option::is_none")]
    max_result_count: Option<u32>,
}

fn is_empty_slice(items: &&[String]) -> bool {
    items.is_empty()
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct AutocompleteBody<'a> {
    input: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    location_bias: Option<AreaBody>,
}

#[derive(Serialize)]
struct AreaBody {
    circle: CircleBody,
}

#[derive(Serialize)]
struct CircleBody {
    center: PointBody,
    radius: f64,
}

#[derive(Serialize)]
struct PointBody {
    latitude: f64,
    longitude: f64,
}

impl From<BiasCircle> for AreaBody {
    fn from(c: BiasCircle) -> Self {
        AreaBody {
            circle: CircleBody {
                center: PointBody {
                    latitude: c.center.lat,
                    longitude: c.center.lng,
                },
                radius: c.radius_meters,
            },
        }
    }
}

// ---------------------------------------------------------------------------
// Response wire types
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
struct SearchPlacesResponse {
    #[serde(default)]
    places: Vec<WirePlace>,
}

#[derive(Deserialize)]
struct AutocompleteResponse {
    #[serde(default)]
    suggestions: Vec<WireSuggestion>,
}

// ---------------------------------------------------------------------------
// Calls
// ---------------------------------------------------------------------------

/// POST /v1/places:searchText
pub async fn search_text(
    http: &reqwest::Client,
    config: &ProviderConfig,
    query: &str,
) -> Result<Vec<WirePlace>, ProviderError> {
    let request = http
        .post(endpoint(&config.places_base_url, "/v1/places:searchText"))
        .header(API_KEY_HEADER, &config.api_key)
        .header(FIELD_MASK_HEADER, SEARCH_FIELD_MASK)
        .json(&SearchTextBody { text_query: query });

    let response: SearchPlacesResponse =
        send_json("places_search_text", request, config.timeout_seconds).await?;
    Ok(response.places)
}

/// POST /v1/places:searchNearby
pub async fn search_nearby(
    http: &reqwest::Client,
    config: &ProviderConfig,
    nearby: &NearbyRequest,
) -> Result<Vec<WirePlace>, ProviderError> {
    let body = SearchNearbyBody {
        location_restriction: BiasCircle {
            center: nearby.center,
            radius_meters: nearby.radius_meters,
        }
        .into(),
        included_primary_types: &nearby.included_primary_types,
        max_result_count: nearby.max_result_count,
    };

    let request = http
        .post(endpoint(&config.places_base_url, "/v1/places:searchNearby"))
        .header(API_KEY_HEADER, &config.api_key)
        .header(FIELD_MASK_HEADER, SEARCH_FIELD_MASK)
        .json(&body);

    let response: SearchPlacesResponse =
        send_json("places_search_nearby", request, config.timeout_seconds).await?;
    Ok(response.places)
}

/// POST /v1/places:autocomplete
pub async fn autocomplete(
    http: &reqwest::Client,
    config: &ProviderConfig,
    autocomplete: &AutocompleteRequest,
) -> Result<Vec<WireSuggestion>, ProviderError> {
    let body = AutocompleteBody {
        input: &autocomplete.input,
        location_bias: autocomplete.bias.map(AreaBody::from),
    };

    let request = http
        .post(endpoint(&config.places_base_url, "/v1/places:autocomplete"))
        .header(API_KEY_HEADER, &config.api_key)
        .json(&body);

    let response: AutocompleteResponse =
        send_json("places_autocomplete", request, config.timeout_seconds).await?;
    Ok(response.suggestions)
}

/// GET /v1/places/{place_id}
pub async fn get_place(
    http: &reqwest::Client,
    config: &ProviderConfig,
    place_id: &str,
) -> Result<WirePlace, ProviderError> {
    let url = place_url(&config.places_base_url, place_id)?;

    let request = http
        .get(url)
        .header(API_KEY_HEADER, &config.api_key)
        .header(FIELD_MASK_HEADER, DETAILS_FIELD_MASK);

    send_json("places_get_place", request, config.timeout_seconds).await
}

/// Build `{base}/v1/places/{id}` with the id percent-encoded as one segment.
/// Accepts both bare ids and resource names (`places/{id}`).
fn place_url(base: &str, place_id: &str) -> Result<reqwest::Url, ProviderError> {
    let id = place_id.strip_prefix("places/").unwrap_or(place_id);

    let mut url = reqwest::Url::parse(base)
        .map_err(|e| ProviderError::Http(format!("Invalid places base URL '{}': {}", base, e)))?;

    url.path_segments_mut()
        .map_err(|_| ProviderError::Http(format!("Places base URL '{}' cannot be a base", base)))?
        .pop_if_empty()
        .extend(["v1", "places", id]);

    Ok(url)
}
