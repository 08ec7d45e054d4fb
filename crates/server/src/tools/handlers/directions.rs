use serde_json::Value;

use geomcp_common::api::tools::{
    DirectionsArgs, DirectionsOutput, LatLng, RouteLeg, RouteSummary, SearchStatus,
};

use super::{parse_args, require_text};
use crate::provider::types::{WireLocation, WireRouteLeg};
use crate::provider::{MapsProvider, ProviderError, RouteRequest, WireRoute};
use crate::tools::{duration_to_seconds, ToolError};

pub async fn run(args: Value, provider: &dyn MapsProvider) -> Result<DirectionsOutput, ToolError> {
    let args: DirectionsArgs = parse_args(args)?;
    let request = RouteRequest {
        origin: require_text("origin", &args.origin)?,
        destination: require_text("destination", &args.destination)?,
        mode: args.mode,
    };

    let routes = provider.compute_routes(&request).await?;

    let routes = routes
        .into_iter()
        .map(route_summary)
        .collect::<Result<Vec<_>, _>>()?;

    Ok(DirectionsOutput {
        status: SearchStatus::for_count(routes.len()),
        routes,
    })
}

fn route_summary(route: WireRoute) -> Result<RouteSummary, ProviderError> {
    Ok(RouteSummary {
        distance_meters: route.distance_meters,
        duration_seconds: duration_to_seconds(route.duration.as_ref()),
        legs: route
            .legs
            .into_iter()
            .map(route_leg)
            .collect::<Result<Vec<_>, _>>()?,
    })
}

/// Leg endpoints are part of the output contract; a leg without them is a
/// malformed provider reply.
fn route_leg(leg: WireRouteLeg) -> Result<RouteLeg, ProviderError> {
    Ok(RouteLeg {
        start_location: endpoint(leg.start_location, "startLocation")?,
        end_location: endpoint(leg.end_location, "endLocation")?,
        distance_meters: leg.distance_meters,
        duration_seconds: duration_to_seconds(leg.duration.as_ref()),
    })
}

fn endpoint(location: Option<WireLocation>, field: &str) -> Result<LatLng, ProviderError> {
    location
        .map(|l| LatLng::from(l.lat_lng))
        .ok_or_else(|| ProviderError::Malformed(format!("route leg is missing {}", field)))
}
