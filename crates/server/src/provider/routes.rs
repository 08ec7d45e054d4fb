use serde::{Deserialize, Serialize};

use geomcp_common::api::tools::TravelMode;
use geomcp_common::config::ProviderConfig;

use super::types::{RouteRequest, WireRoute};
use super::{endpoint, send_json, ProviderError, API_KEY_HEADER, FIELD_MASK_HEADER};

const COMPUTE_ROUTES_PATH: &str = "/directions/v2:computeRoutes";

const ROUTES_FIELD_MASK: &str = "routes.distanceMeters,routes.duration,\
routes.legs.distanceMeters,routes.legs.duration,routes.legs.startLocation,routes.legs.endLocation";

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ComputeRoutesBody<'a> {
    origin: Waypoint<'a>,
    destination: Waypoint<'a>,
    travel_mode: &'static str,
}

#[derive(Serialize)]
struct Waypoint<'a> {
    address: &'a str,
}

#[derive(Deserialize)]
struct ComputeRoutesResponse {
    #[serde(default)]
    routes: Vec<WireRoute>,
}

/// Routes API enum name for a travel mode.
fn wire_travel_mode(mode: TravelMode) -> &'static str {
    match mode {
        TravelMode::Driving => "DRIVE",
        TravelMode::Walking => "WALK",
        TravelMode::Bicycling => "BICYCLE",
        TravelMode::Transit => "TRANSIT",
    }
}

/// POST /directions/v2:computeRoutes
///
/// The API answers an unroutable pair with `{}`, which decodes to no routes.
pub async fn compute_routes(
    http: &reqwest::Client,
    config: &ProviderConfig,
    route: &RouteRequest,
) -> Result<Vec<WireRoute>, ProviderError> {
    let body = ComputeRoutesBody {
        origin: Waypoint {
            address: &route.origin,
        },
        destination: Waypoint {
            address: &route.destination,
        },
        travel_mode: wire_travel_mode(route.mode),
    };

    let request = http
        .post(endpoint(&config.routes_base_url, COMPUTE_ROUTES_PATH))
        .header(API_KEY_HEADER, &config.api_key)
        .header(FIELD_MASK_HEADER, ROUTES_FIELD_MASK)
        .json(&body);

    let response: ComputeRoutesResponse =
        send_json("directions", request, config.timeout_seconds).await?;
    Ok(response.routes)
}
