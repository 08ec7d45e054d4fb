//! One module per tool. Each exposes `run(args, provider)`: validate the
//! arguments, make exactly one provider call, reshape the reply.

pub mod directions;
pub mod geocode;
pub mod places_autocomplete;
pub mod places_get_place;
pub mod places_search_nearby;
pub mod places_search_text;

use serde::de::DeserializeOwned;
use serde_json::Value;

use geomcp_common::api::tools::{LatLng, PlaceSummary};

use super::ToolError;
use crate::provider::WirePlace;

/// Deserialize tool arguments. A missing `arguments` object is treated as `{}`
/// so required fields are reported by name.
fn parse_args<T: DeserializeOwned>(args: Value) -> Result<T, ToolError> {
    let args = if args.is_null() {
        Value::Object(Default::default())
    } else {
        args
    };
    serde_json::from_value(args).map_err(|e| ToolError::InvalidArguments(e.to_string()))
}

/// Trimmed, non-blank string argument.
fn require_text(field: &str, value: &str) -> Result<String, ToolError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ToolError::InvalidArguments(format!(
            "{} must not be blank",
            field
        )));
    }
    Ok(trimmed.to_string())
}

fn check_latitude(field: &str, lat: f64) -> Result<f64, ToolError> {
    if !(-90.0..=90.0).contains(&lat) {
        return Err(ToolError::InvalidArguments(format!(
            "{} must be within [-90, 90], got {}",
            field, lat
        )));
    }
    Ok(lat)
}

fn check_longitude(field: &str, lng: f64) -> Result<f64, ToolError> {
    if !(-180.0..=180.0).contains(&lng) {
        return Err(ToolError::InvalidArguments(format!(
            "{} must be within [-180, 180], got {}",
            field, lng
        )));
    }
    Ok(lng)
}

/// Strictly positive and at most `max`.
fn check_radius(field: &str, radius: f64, max: f64) -> Result<f64, ToolError> {
    if !radius.is_finite() || radius <= 0.0 || radius > max {
        return Err(ToolError::InvalidArguments(format!(
            "{} must be greater than 0 and at most {}, got {}",
            field, max, radius
        )));
    }
    Ok(radius)
}

fn center(lat_field: &str, lat: f64, lng_field: &str, lng: f64) -> Result<LatLng, ToolError> {
    Ok(LatLng {
        lat: check_latitude(lat_field, lat)?,
        lng: check_longitude(lng_field, lng)?,
    })
}

/// Shared reshaping for both place searches.
fn place_summary(place: WirePlace) -> PlaceSummary {
    PlaceSummary {
        id: place.id,
        display_name: place.display_name.map(|t| t.text),
        formatted_address: place.formatted_address,
        location: place.location.map(LatLng::from),
        rating: place.rating,
        user_rating_count: place.user_rating_count,
        primary_type: place.primary_type,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_require_text_trims_and_rejects_blank() {
        assert_eq!(require_text("query", "  cafe ").unwrap(), "cafe");
        match require_text("query", " \t") {
            Err(ToolError::InvalidArguments(msg)) => assert!(msg.contains("query")),
            other => panic!("Expected InvalidArguments, got {other:?}"),
        }
    }

    #[test]
    fn test_coordinate_bounds() {
        assert!(check_latitude("lat", 90.0).is_ok());
        assert!(check_latitude("lat", -90.1).is_err());
        assert!(check_longitude("lng", -180.0).is_ok());
        assert!(check_longitude("lng", 180.5).is_err());
        assert!(check_latitude("lat", f64::NAN).is_err());
    }

    #[test]
    fn test_radius_bounds() {
        assert!(check_radius("r", 1.0, 50_000.0).is_ok());
        assert!(check_radius("r", 50_000.0, 50_000.0).is_ok());
        assert!(check_radius("r", 0.0, 50_000.0).is_err());
        assert!(check_radius("r", -5.0, 50_000.0).is_err());
        assert!(check_radius("r", 50_000.1, 50_000.0).is_err());
    }

    #[test]
    fn test_parse_args_null_reports_missing_field() {
        #[derive(serde::Deserialize, Debug)]
        struct Args {
            #[allow(dead_code)]
            address: String,
        }
        match parse_args::<Args>(Value::Null) {
            Err(ToolError::InvalidArguments(msg)) => assert!(msg.contains("address")),
            other => panic!("Expected InvalidArguments, got {other:?}"),
        }
        assert!(parse_args::<Args>(json!({ "address": 5 })).is_err());
    }

    #[test]
    fn test_place_summary_omits_missing_fields() {
        let place: WirePlace = serde_json::from_value(json!({
            "id": "p1",
            "displayName": {"text": "Café", "languageCode": "fr"},
            "location": {"latitude": 48.0, "longitude": 2.0}
        }))
        .unwrap();

        let summary = place_summary(place);
        assert_eq!(summary.display_name.as_deref(), Some("Café"));
        assert_eq!(summary.location, Some(LatLng { lat: 48.0, lng: 2.0 }));
        assert!(summary.rating.is_none());
        assert!(summary.formatted_address.is_none());
    }
}
