use serde_json::Value;

use geomcp_common::api::tools::{
    PlacesAutocompleteArgs, PlacesAutocompleteOutput, Suggestion, SuggestionKind,
};

use super::{center, check_radius, parse_args, require_text};
use crate::provider::{AutocompleteRequest, BiasCircle, MapsProvider, WireSuggestion};
use crate::tools::ToolError;

const DEFAULT_BIAS_RADIUS_METERS: f64 = 5_000.0;
const MAX_BIAS_RADIUS_METERS: f64 = 50_000.0;

pub async fn run(
    args: Value,
    provider: &dyn MapsProvider,
) -> Result<PlacesAutocompleteOutput, ToolError> {
    let args: PlacesAutocompleteArgs = parse_args(args)?;
    let request = build_request(args)?;

    let suggestions = provider.autocomplete(&request).await?;

    Ok(PlacesAutocompleteOutput {
        suggestions: suggestions.into_iter().filter_map(suggestion).collect(),
    })
}

fn build_request(args: PlacesAutocompleteArgs) -> Result<AutocompleteRequest, ToolError> {
    let input = require_text("input", &args.input)?;

    let bias = match (args.bias_center_lat, args.bias_center_lng) {
        (Some(lat), Some(lng)) => {
            let radius = args.bias_radius_meters.unwrap_or(DEFAULT_BIAS_RADIUS_METERS);
            Some(BiasCircle {
                center: center("bias_center_lat", lat, "bias_center_lng", lng)?,
                radius_meters: check_radius("bias_radius_meters", radius, MAX_BIAS_RADIUS_METERS)?,
            })
        }
        (None, None) => {
            if args.bias_radius_meters.is_some() {
                return Err(ToolError::InvalidArguments(
                    "bias_radius_meters requires bias_center_lat and bias_center_lng".into(),
                ));
            }
            None
        }
        _ => {
            return Err(ToolError::InvalidArguments(
                "bias_center_lat and bias_center_lng must be supplied together".into(),
            ))
        }
    };

    Ok(AutocompleteRequest { input, bias })
}

/// Predictions without display text are dropped.
fn suggestion(wire: WireSuggestion) -> Option<Suggestion> {
    if let Some(place) = wire.place_prediction {
        return Some(Suggestion {
            kind: SuggestionKind::Place,
            text: place.text?.text,
            place_id: place.place_id,
            distance_meters: place.distance_meters,
        });
    }

    let query = wire.query_prediction?;
    Some(Suggestion {
        kind: SuggestionKind::Query,
        text: query.text?.text,
        place_id: None,
        distance_meters: None,
    })
}
