use geomcp_common::config::ServerConfig;

use super::loader::ConfigError;

/// Validate the complete server configuration.
///
/// Collects every problem before failing so one restart fixes them all.
pub fn validate(config: &ServerConfig) -> Result<(), ConfigError> {
    let mut errors: Vec<String> = Vec::new();

    validate_transport(config, &mut errors);
    validate_provider(config, &mut errors);

    if errors.is_empty() {
        Ok(())
    } else {
        Err(ConfigError::Validation(errors.join("; ")))
    }
}

fn validate_transport(config: &ServerConfig, errors: &mut Vec<String>) {
    let t = &config.transport;

    if t.host.trim().is_empty() {
        errors.push("transport.host must not be empty".into());
    }
    if t.port == 0 {
        errors.push("transport.port must be > 0".into());
    }
    if !t.endpoint_path.starts_with('/') || t.endpoint_path.len() < 2 {
        errors.push("transport.endpoint_path must start with '/' and name a path".into());
    }
    if matches!(t.endpoint_path.as_str(), "/health" | "/metrics") {
        errors.push(format!(
            "transport.endpoint_path '{}' collides with a built-in route",
            t.endpoint_path
        ));
    }
    if t.keep_alive_seconds == 0 {
        errors.push("transport.keep_alive_seconds must be > 0".into());
    }
    if t.listen_buffer == 0 {
        errors.push("transport.listen_buffer must be > 0".into());
    }
}

fn validate_provider(config: &ServerConfig, errors: &mut Vec<String>) {
    let p = &config.provider;

    if p.api_key.trim().is_empty() {
        errors.push("provider.api_key must not be empty".into());
    }
    if p.timeout_seconds == 0 {
        errors.push("provider.timeout_seconds must be > 0".into());
    }
    if p.timeout_seconds > 120 {
        errors.push("provider.timeout_seconds must be <= 120".into());
    }

    let urls = [
        ("geocoding_base_url", &p.geocoding_base_url),
        ("places_base_url", &p.places_base_url),
        ("routes_base_url", &p.routes_base_url),
    ];
    for (name, url) in urls {
        if reqwest::Url::parse(url).is_err() {
            errors.push(format!("provider.{} is not a valid URL: '{}'", name, url));
        }
    }
}
