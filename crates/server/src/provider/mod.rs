mod geocoding;
#[cfg(test)]
pub(crate) mod mock;
mod places;
mod routes;
pub mod types;

use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::Deserialize;

use geomcp_common::config::ProviderConfig;
use geomcp_common::GeoMcpError;

pub use types::{
    AutocompleteRequest, BiasCircle, GeocodeReply, NearbyRequest, RouteRequest, WireDuration,
    WirePlace, WireRoute, WireSuggestion,
};

/// Header carrying the API key for the Places and Routes APIs.
const API_KEY_HEADER: &str = "X-Goog-Api-Key";
/// Header selecting which response fields the Places and Routes APIs return.
const FIELD_MASK_HEADER: &str = "X-Goog-FieldMask";

/// Errors from mapping-provider calls.
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    #[error("Provider request timed out after {0}s")]
    Timeout(u64),

    #[error("Provider HTTP error: {0}")]
    Http(String),

    #[error("Provider auth error: {0}")]
    Auth(String),

    #[error("Provider rate limited: {0}")]
    RateLimited(String),

    #[error("Provider returned {status}: {message}")]
    Api { status: u16, message: String },

    #[error("Provider status {status}: {message}")]
    Status { status: String, message: String },

    #[error("Provider response parse error: {0}")]
    Parse(String),

    #[error("Provider response incomplete: {0}")]
    Malformed(String),
}

impl From<ProviderError> for GeoMcpError {
    fn from(e: ProviderError) -> Self {
        GeoMcpError::Provider(e.to_string())
    }
}

/// Boxed future returned by [`MapsProvider`] methods.
pub type ProviderFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, ProviderError>> + Send + 'a>>;

/// Object-safe provider interface.
/// Tests provide canned implementations; production uses [`GoogleMapsClient`].
pub trait MapsProvider: Send + Sync {
    /// Forward-geocode a free-form address. Statuses other than `OK` and
    /// `ZERO_RESULTS` are errors.
    fn geocode<'a>(&'a self, address: &'a str) -> ProviderFuture<'a, GeocodeReply>;

    fn search_text<'a>(&'a self, query: &'a str) -> ProviderFuture<'a, Vec<WirePlace>>;

    fn search_nearby<'a>(&'a self, request: &'a NearbyRequest)
        -> ProviderFuture<'a, Vec<WirePlace>>;

    fn autocomplete<'a>(
        &'a self,
        request: &'a AutocompleteRequest,
    ) -> ProviderFuture<'a, Vec<WireSuggestion>>;

    fn get_place<'a>(&'a self, place_id: &'a str) -> ProviderFuture<'a, WirePlace>;

    fn compute_routes<'a>(&'a self, request: &'a RouteRequest) -> ProviderFuture<'a, Vec<WireRoute>>;
}

/// Google Maps Platform client (Geocoding, Places (New), Routes).
pub struct GoogleMapsClient {
    http: reqwest::Client,
    config: ProviderConfig,
}

impl GoogleMapsClient {
    /// Build a client whose every request carries `config.timeout_seconds`.
    pub fn new(config: ProviderConfig) -> Result<Self, ProviderError> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("geomcp/", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| ProviderError::Http(e.to_string()))?;

        Ok(Self { http, config })
    }
}

impl MapsProvider for GoogleMapsClient {
    fn geocode<'a>(&'a self, address: &'a str) -> ProviderFuture<'a, GeocodeReply> {
        Box::pin(geocoding::geocode(&self.http, &self.config, address))
    }

    fn search_text<'a>(&'a self, query: &'a str) -> ProviderFuture<'a, Vec<WirePlace>> {
        Box::pin(places::search_text(&self.http, &self.config, query))
    }

    fn search_nearby<'a>(
        &'a self,
        request: &'a NearbyRequest,
    ) -> ProviderFuture<'a, Vec<WirePlace>> {
        Box::pin(places::search_nearby(&self.http, &self.config, request))
    }

    fn autocomplete<'a>(
        &'a self,
        request: &'a AutocompleteRequest,
    ) -> ProviderFuture<'a, Vec<WireSuggestion>> {
        Box::pin(places::autocomplete(&self.http, &self.config, request))
    }

    fn get_place<'a>(&'a self, place_id: &'a str) -> ProviderFuture<'a, WirePlace> {
        Box::pin(places::get_place(&self.http, &self.config, place_id))
    }

    fn compute_routes<'a>(&'a self, request: &'a RouteRequest) -> ProviderFuture<'a, Vec<WireRoute>> {
        Box::pin(routes::compute_routes(&self.http, &self.config, request))
    }
}

/// Google's JSON error envelope (`{"error": {"code", "message", "status"}}`).
#[derive(Deserialize)]
struct GoogleError {
    error: GoogleErrorDetail,
}

#[derive(Deserialize)]
struct GoogleErrorDetail {
    #[serde(default)]
    message: String,
    #[serde(default)]
    status: String,
}

/// Send a prepared request and decode a JSON body, mapping every failure
/// mode onto [`ProviderError`].
async fn send_json<T: DeserializeOwned>(
    api: &'static str,
    request: reqwest::RequestBuilder,
    timeout_seconds: u64,
) -> Result<T, ProviderError> {
    let start = std::time::Instant::now();

    let result = send_json_inner(request, timeout_seconds).await;

    let latency = start.elapsed().as_secs_f64();
    metrics::histogram!("provider.request.latency", "api" => api).record(latency);

    if let Err(ref e) = result {
        metrics::counter!("provider.request.errors", "api" => api).increment(1);
        tracing::warn!(api, latency_s = latency, error = %e, "Provider call failed");
    } else {
        tracing::debug!(api, latency_s = latency, "Provider call succeeded");
    }

    result
}

async fn send_json_inner<T: DeserializeOwned>(
    request: reqwest::RequestBuilder,
    timeout_seconds: u64,
) -> Result<T, ProviderError> {
    let response = request
        .send()
        .await
        .map_err(|e| classify_transport_error(e, timeout_seconds))?;

    let status = response.status();

    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<GoogleError>(&body)
            .map(|e| {
                if e.error.status.is_empty() {
                    e.error.message
                } else {
                    format!("{}: {}", e.error.status, e.error.message)
                }
            })
            .unwrap_or(body);

        return Err(match status {
            reqwest::StatusCode::UNAUTHORIZED | reqwest::StatusCode::FORBIDDEN => {
                ProviderError::Auth(format!("{}: {}", status, message))
            }
            reqwest::StatusCode::TOO_MANY_REQUESTS => ProviderError::RateLimited(message),
            _ => ProviderError::Api {
                status: status.as_u16(),
                message,
            },
        });
    }

    response.json::<T>().await.map_err(|e| {
        if e.is_timeout() {
            ProviderError::Timeout(timeout_seconds)
        } else {
            ProviderError::Parse(e.to_string())
        }
    })
}

fn classify_transport_error(e: reqwest::Error, timeout_seconds: u64) -> ProviderError {
    if e.is_timeout() {
        ProviderError::Timeout(timeout_seconds)
    } else {
        ProviderError::Http(e.to_string())
    }
}

/// Join a configured base URL with an API path.
fn endpoint(base: &str, path: &str) -> String {
    format!("{}{}", base.trim_end_matches('/'), path)
}
