use geomcp_common::config::ProviderConfig;

use super::types::GeocodeReply;
use super::{endpoint, send_json, ProviderError};

const GEOCODE_PATH: &str = "/maps/api/geocode/json";

/// Call the Geocoding API for a free-form address.
pub async fn geocode(
    http: &reqwest::Client,
    config: &ProviderConfig,
    address: &str,
) -> Result<GeocodeReply, ProviderError> {
    let request = http
        .get(endpoint(&config.geocoding_base_url, GEOCODE_PATH))
        .query(&[("address", address), ("key", config.api_key.as_str())]);

    let reply: GeocodeReply = send_json("geocode", request, config.timeout_seconds).await?;
    check_status(reply)
}

/// The Geocoding API reports failures in-band with HTTP 200.
fn check_status(reply: GeocodeReply) -> Result<GeocodeReply, ProviderError> {
    match reply.status.as_str() {
        "OK" | "ZERO_RESULTS" => Ok(reply),
        _ => Err(ProviderError::Status {
            message: reply
                .error_message
                .clone()
                .unwrap_or_else(|| "no error message supplied".into()),
            status: reply.status,
        }),
    }
}
