use serde_json::Value;

use geomcp_common::api::tools::{GeocodeArgs, GeocodeOutput, GeocodeResult, LatLng};

use super::{parse_args, require_text};
use crate::provider::{GeocodeReply, MapsProvider};
use crate::tools::ToolError;

pub async fn run(args: Value, provider: &dyn MapsProvider) -> Result<GeocodeOutput, ToolError> {
    let args: GeocodeArgs = parse_args(args)?;
    let address = require_text("address", &args.address)?;

    let reply = provider.geocode(&address).await?;
    Ok(reshape(reply))
}

fn reshape(reply: GeocodeReply) -> GeocodeOutput {
    GeocodeOutput {
        results: reply
            .results
            .into_iter()
            .map(|r| GeocodeResult {
                formatted_address: r.formatted_address,
                place_id: r.place_id,
                location: LatLng::from(r.geometry.location),
            })
            .collect(),
        status: reply.status,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::mock::MockProvider;
    use serde_json::json;

    fn eiffel() -> GeocodeReply {
        serde_json::from_value(json!({
            "results": [{
                "formatted_address": "Av. Gustave Eiffel, 75007 Paris, France",
                "place_id": "ChIJLU7jZClu5kcR4PcOOO6p3I0",
                "geometry": {"location": {"lat": 48.8583701, "lng": 2.2944813}}
            }],
            "status": "OK"
        }))
        .unwrap()
    }

    #[tokio::test]
    async fn test_geocode_reshapes_results() {
        let provider = MockProvider {
            geocode: Some(eiffel()),
            ..Default::default()
        };

        let out = run(json!({ "address": "Eiffel Tower" }), &provider)
            .await
            .unwrap();

        assert_eq!(out.status, "OK");
        assert_eq!(out.results.len(), 1);
        assert_eq!(out.results[0].place_id, "ChIJLU7jZClu5kcR4PcOOO6p3I0");
        assert_eq!(out.results[0].location.lat, 48.8583701);

        let value = serde_json::to_value(&out).unwrap();
        assert!(value["results"][0]["location"]["lng"].is_f64());
    }

    #[tokio::test]
    async fn test_geocode_zero_results() {
        let provider = MockProvider::default();
        let out = run(json!({ "address": "nowhere at all" }), &provider)
            .await
            .unwrap();
        assert_eq!(out.status, "ZERO_RESULTS");
        assert!(out.results.is_empty());
    }

    #[tokio::test]
    async fn test_geocode_blank_address_rejected() {
        let provider = MockProvider::default();
        let err = run(json!({ "address": "   " }), &provider).await.unwrap_err();
        assert!(matches!(err, ToolError::InvalidArguments(_)));
        assert_eq!(provider.call_count(), 0);
    }
}
