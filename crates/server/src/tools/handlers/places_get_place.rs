use serde_json::Value;

use geomcp_common::api::tools::{LatLng, PlaceDetails, PlacesGetPlaceArgs, PlacesGetPlaceOutput};

use super::{parse_args, require_text};
use crate::provider::{MapsProvider, WirePlace};
use crate::tools::ToolError;

pub async fn run(
    args: Value,
    provider: &dyn MapsProvider,
) -> Result<PlacesGetPlaceOutput, ToolError> {
    let args: PlacesGetPlaceArgs = parse_args(args)?;
    let place_id = require_text("place_id", &args.place_id)?;
    check_place_id(&place_id)?;

    let place = provider.get_place(&place_id).await?;
    Ok(PlacesGetPlaceOutput {
        place: details(place),
    })
}

/// Dot segments would be collapsed out of the request path, so they can
/// never name a place.
fn check_place_id(place_id: &str) -> Result<(), ToolError> {
    let bare = place_id.strip_prefix("places/").unwrap_or(place_id);
    if matches!(bare, "" | "." | "..") {
        return Err(ToolError::InvalidArguments(format!(
            "place_id '{}' is not a place id",
            place_id
        )));
    }
    Ok(())
}

fn details(place: WirePlace) -> PlaceDetails {
    PlaceDetails {
        id: place.id,
        display_name: place.display_name.map(|t| t.text),
        formatted_address: place.formatted_address,
        location: place.location.map(LatLng::from),
        rating: place.rating,
        user_rating_count: place.user_rating_count,
        primary_type: place.primary_type,
        phone: place
            .national_phone_number
            .or(place.international_phone_number),
        website_uri: place.website_uri,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::mock::MockProvider;
    use serde_json::json;

    #[test]
    fn test_phone_prefers_national_number() {
        let both = WirePlace {
            national_phone_number: Some("01 44 11 23 23".into()),
            international_phone_number: Some("+33 1 44 11 23 23".into()),
            ..Default::default()
        };
        assert_eq!(details(both).phone.as_deref(), Some("01 44 11 23 23"));

        let intl_only = WirePlace {
            international_phone_number: Some("+33 1 44 11 23 23".into()),
            ..Default::default()
        };
        assert_eq!(details(intl_only).phone.as_deref(), Some("+33 1 44 11 23 23"));

        assert!(details(WirePlace::default()).phone.is_none());
    }

    #[tokio::test]
    async fn test_get_place_sparse_response() {
        let provider = MockProvider {
            place: Some(
                serde_json::from_value(json!({
                    "id": "ChIJlouvre",
                    "displayName": {"text": "Louvre Museum"},
                    "websiteUri": "https://www.louvre.fr/"
                }))
                .unwrap(),
            ),
            ..Default::default()
        };

        let out = run(json!({ "place_id": "ChIJlouvre" }), &provider)
            .await
            .unwrap();
        let value = serde_json::to_value(&out).unwrap();
        assert_eq!(
            value,
            json!({"place": {
                "id": "ChIJlouvre",
                "display_name": "Louvre Museum",
                "website_uri": "https://www.louvre.fr/"
            }})
        );
    }

    #[tokio::test]
    async fn test_blank_place_id_rejected() {
        let provider = MockProvider::default();
        let err = run(json!({ "place_id": "" }), &provider).await.unwrap_err();
        assert!(matches!(err, ToolError::InvalidArguments(_)));
    }

    #[tokio::test]
    async fn test_dot_segment_place_id_rejected() {
        let provider = MockProvider::default();
        for id in [".", "..", " .. ", "places/..", "places/"] {
            let err = run(json!({ "place_id": id }), &provider).await.unwrap_err();
            assert!(
                matches!(err, ToolError::InvalidArguments(_)),
                "place_id {id:?} should be rejected"
            );
        }
        assert_eq!(provider.call_count(), 0);

        // Dots inside an id are ordinary characters.
        assert!(check_place_id("ChIJ..x").is_ok());
    }
}
