use serde::{Deserialize, Serialize};

/// Top-level server configuration, optionally deserialized from a TOML file
/// and then overridden from the environment.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub transport: TransportConfig,
    pub provider: ProviderConfig,
}

/// HTTP transport parameters.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct TransportConfig {
    /// Bind address.
    pub host: String,
    /// Listen port (positive).
    pub port: u16,
    /// Path serving POST/GET/DELETE for MCP sessions.
    pub endpoint_path: String,
    /// Interval between SSE keep-alive comments on listen streams.
    pub keep_alive_seconds: u64,
    /// Buffered server-push events per session before senders wait.
    pub listen_buffer: usize,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".into(),
            port: 3000,
            endpoint_path: "/mcp".into(),
            keep_alive_seconds: 15,
            listen_buffer: 64,
        }
    }
}

/// Mapping-provider (Google Maps Platform) client parameters.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderConfig {
    /// API key. Usually supplied through the environment; never written back out.
    #[serde(skip_serializing)]
    pub api_key: String,
    /// Base URL of the Geocoding API (`/maps/api/geocode/json`).
    pub geocoding_base_url: String,
    /// Base URL of the Places API (New) (`/v1/places...`).
    pub places_base_url: String,
    /// Base URL of the Routes API (`/directions/v2:computeRoutes`).
    pub routes_base_url: String,
    /// Per-request timeout for every provider call.
    pub timeout_seconds: u64,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            geocoding_base_url: "https://maps.googleapis.com".into(),
            places_base_url: "https://places.googleapis.com".into(),
            routes_base_url: "https://routes.googleapis.com".into(),
            timeout_seconds: 10,
        }
    }
}
