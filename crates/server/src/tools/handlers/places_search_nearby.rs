use serde_json::Value;

use geomcp_common::api::tools::{PlacesSearchNearbyArgs, PlacesSearchOutput, SearchStatus};

use super::{center, check_radius, parse_args, place_summary, require_text};
use crate::provider::{MapsProvider, NearbyRequest};
use crate::tools::ToolError;

const MAX_RADIUS_METERS: f64 = 50_000.0;
const MAX_RESULT_COUNT: u32 = 20;

pub async fn run(
    args: Value,
    provider: &dyn MapsProvider,
) -> Result<PlacesSearchOutput, ToolError> {
    let args: PlacesSearchNearbyArgs = parse_args(args)?;
    let request = build_request(args)?;

    let places = provider.search_nearby(&request).await?;

    let results: Vec<_> = places.into_iter().map(place_summary).collect();
    Ok(PlacesSearchOutput {
        status: SearchStatus::for_count(results.len()),
        results,
    })
}

fn build_request(args: PlacesSearchNearbyArgs) -> Result<NearbyRequest, ToolError> {
    let center = center("center_lat", args.center_lat, "center_lng", args.center_lng)?;
    let radius_meters = check_radius("radius_meters", args.radius_meters, MAX_RADIUS_METERS)?;

    if let Some(count) = args.max_result_count {
        if count == 0 || count > MAX_RESULT_COUNT {
            return Err(ToolError::InvalidArguments(format!(
                "max_result_count must be between 1 and {}, got {}",
                MAX_RESULT_COUNT, count
            )));
        }
    }

    let included_primary_types = args
        .included_primary_types
        .unwrap_or_default()
        .iter()
        .map(|t| require_text("included_primary_types", t))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(NearbyRequest {
        center,
        radius_meters,
        included_primary_types,
        max_result_count: args.max_result_count,
    })
}
