use std::sync::Arc;

use schemars::gen::SchemaSettings;
use schemars::JsonSchema;
use serde::Serialize;
use serde_json::{json, Value};

use geomcp_common::api::tools::{
    DirectionsArgs, DirectionsOutput, GeocodeArgs, GeocodeOutput, PlacesAutocompleteArgs,
    PlacesAutocompleteOutput, PlacesGetPlaceArgs, PlacesGetPlaceOutput, PlacesSearchNearbyArgs,
    PlacesSearchOutput, PlacesSearchTextArgs,
};
use geomcp_common::GeoMcpError;

use super::handlers;
use super::ToolError;
use crate::provider::MapsProvider;

/// Shared context available to all tool handlers.
pub struct ToolHandlerContext {
    pub provider: Arc<dyn MapsProvider>,
}

/// Every tool the server exposes. Dispatch is a `match` on this tag.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ToolKind {
    Geocode,
    PlacesSearchText,
    PlacesSearchNearby,
    PlacesAutocomplete,
    PlacesGetPlace,
    Directions,
}

impl ToolKind {
    /// Advertised order in `tools/list`.
    pub const ALL: [ToolKind; 6] = [
        ToolKind::Geocode,
        ToolKind::PlacesSearchText,
        ToolKind::PlacesSearchNearby,
        ToolKind::PlacesAutocomplete,
        ToolKind::PlacesGetPlace,
        ToolKind::Directions,
    ];

    pub fn name(self) -> &'static str {
        match self {
            ToolKind::Geocode => "geocode",
            ToolKind::PlacesSearchText => "places_search_text",
            ToolKind::PlacesSearchNearby => "places_search_nearby",
            ToolKind::PlacesAutocomplete => "places_autocomplete",
            ToolKind::PlacesGetPlace => "places_get_place",
            ToolKind::Directions => "directions",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.name() == name)
    }

    fn description(self) -> &'static str {
        match self {
            ToolKind::Geocode => {
                "Convert a free-form address or landmark into coordinates and a place id."
            }
            ToolKind::PlacesSearchText => {
                "Search for places matching a text query, e.g. \"pizza in Rome\"."
            }
            ToolKind::PlacesSearchNearby => {
                "Find places within a radius of a coordinate, optionally filtered by primary type."
            }
            ToolKind::PlacesAutocomplete => {
                "Suggest places and queries for partially typed input, optionally biased to a circle."
            }
            ToolKind::PlacesGetPlace => {
                "Fetch details (address, rating, phone, website) for a place id."
            }
            ToolKind::Directions => {
                "Compute routes between an origin and a destination for a travel mode."
            }
        }
    }

    fn definition(self) -> ToolDefinition {
        match self {
            ToolKind::Geocode => ToolDefinition::typed::<GeocodeArgs, GeocodeOutput>(self),
            ToolKind::PlacesSearchText => {
                ToolDefinition::typed::<PlacesSearchTextArgs, PlacesSearchOutput>(self)
            }
            ToolKind::PlacesSearchNearby => {
                ToolDefinition::typed::<PlacesSearchNearbyArgs, PlacesSearchOutput>(self)
            }
            ToolKind::PlacesAutocomplete => {
                ToolDefinition::typed::<PlacesAutocompleteArgs, PlacesAutocompleteOutput>(self)
            }
            ToolKind::PlacesGetPlace => {
                ToolDefinition::typed::<PlacesGetPlaceArgs, PlacesGetPlaceOutput>(self)
            }
            ToolKind::Directions => ToolDefinition::typed::<DirectionsArgs, DirectionsOutput>(self),
        }
    }
}

/// A tool as advertised in `tools/list`.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolDefinition {
    #[serde(skip)]
    pub kind: ToolKind,
    pub name: &'static str,
    pub description: &'static str,
    pub input_schema: Value,
    pub output_schema: Value,
}

impl ToolDefinition {
    fn typed<A: JsonSchema, O: JsonSchema>(kind: ToolKind) -> Self {
        Self {
            kind,
            name: kind.name(),
            description: kind.description(),
            input_schema: schema_of::<A>(),
            output_schema: schema_of::<O>(),
        }
    }
}

/// Self-contained draft-07 schema (no `$ref`s) for `T`.
fn schema_of<T: JsonSchema>() -> Value {
    let generator = SchemaSettings::draft07()
        .with(|s| s.inline_subschemas = true)
        .into_generator();
    let schema = generator.into_root_schema_for::<T>();
    serde_json::to_value(schema).unwrap_or_else(|_| json!({ "type": "object" }))
}

/// Outcome of one `tools/call`.
#[derive(Clone, Debug)]
pub struct ToolExecutionResult {
    /// JSON-serialized result, or the error message.
    pub content: String,
    /// The result as a JSON value; `None` for failures.
    pub structured: Option<Value>,
    pub is_error: bool,
}

/// Startup-time immutable table of tools, shared by every session.
pub struct ToolRegistry {
    definitions: Vec<ToolDefinition>,
    context: Arc<ToolHandlerContext>,
}

impl ToolRegistry {
    pub fn new(context: ToolHandlerContext) -> Self {
        let definitions: Vec<ToolDefinition> =
            ToolKind::ALL.into_iter().map(ToolKind::definition).collect();

        tracing::info!(tools = definitions.len(), "Loaded tool definitions");

        Self {
            definitions,
            context: Arc::new(context),
        }
    }

    /// Get the tool definitions for `tools/list`.
    pub fn definitions(&self) -> &[ToolDefinition] {
        &self.definitions
    }

    /// Look up a registered tool by its advertised name.
    pub fn resolve(&self, name: &str) -> Option<ToolKind> {
        self.definitions
            .iter()
            .find(|d| d.name == name)
            .map(|d| d.kind)
    }

    /// Execute a tool call. Failures become an `is_error` result.
    pub async fn execute(&self, kind: ToolKind, args: Value) -> ToolExecutionResult {
        let name = kind.name();
        let start = std::time::Instant::now();

        tracing::info!(tool = name, "Tool call started");

        let result = dispatch(kind, args, self.context.provider.as_ref()).await;

        let latency = start.elapsed().as_secs_f64();
        metrics::histogram!("tools.execution.latency", "tool" => name).record(latency);
        metrics::counter!("tools.execution.count", "tool" => name).increment(1);

        match result {
            Ok(value) => {
                let content = serde_json::to_string(&value).unwrap_or_else(|e| {
                    format!("{{\"error\": \"Failed to serialize result: {}\"}}", e)
                });
                tracing::info!(
                    tool = name,
                    latency_s = latency,
                    result_len = content.len(),
                    "Tool call succeeded"
                );
                ToolExecutionResult {
                    content,
                    structured: Some(value),
                    is_error: false,
                }
            }
            Err(e) => {
                let content = e.to_string();
                let category = failure_category(&GeoMcpError::from(e));
                tracing::warn!(
                    tool = name,
                    latency_s = latency,
                    category,
                    error = %content,
                    "Tool call failed"
                );
                metrics::counter!("tools.execution.errors", "tool" => name, "category" => category)
                    .increment(1);
                ToolExecutionResult {
                    content,
                    structured: None,
                    is_error: true,
                }
            }
        }
    }
}

/// Metric label for a failed call: the caller's or provider's fault, or ours.
fn failure_category(err: &GeoMcpError) -> &'static str {
    if err.is_tool_failure() {
        "tool_failure"
    } else {
        "internal"
    }
}

async fn dispatch(
    kind: ToolKind,
    args: Value,
    provider: &dyn MapsProvider,
) -> Result<Value, ToolError> {
    match kind {
        ToolKind::Geocode => to_json(handlers::geocode::run(args, provider).await?),
        ToolKind::PlacesSearchText => {
            to_json(handlers::places_search_text::run(args, provider).await?)
        }
        ToolKind::PlacesSearchNearby => {
            to_json(handlers::places_search_nearby::run(args, provider).await?)
        }
        ToolKind::PlacesAutocomplete => {
            to_json(handlers::places_autocomplete::run(args, provider).await?)
        }
        ToolKind::PlacesGetPlace => to_json(handlers::places_get_place::run(args, provider).await?),
        ToolKind::Directions => to_json(handlers::directions::run(args, provider).await?),
    }
}

fn to_json<T: Serialize>(output: T) -> Result<Value, ToolError> {
    serde_json::to_value(output).map_err(ToolError::Output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::mock::MockProvider;
    use crate::provider::types::WireRoute;

    #[test]
    fn test_failure_category() {
        let invalid = GeoMcpError::from(ToolError::InvalidArguments("bad".into()));
        assert_eq!(failure_category(&invalid), "tool_failure");

        let provider = GeoMcpError::from(ToolError::Provider(
            crate::provider::ProviderError::Timeout(10),
        ));
        assert_eq!(failure_category(&provider), "tool_failure");

        let output = GeoMcpError::from(ToolError::Output(
            serde_json::from_str::<Value>("{").unwrap_err(),
        ));
        assert_eq!(failure_category(&output), "internal");
    }

    fn registry_with(provider: MockProvider) -> (ToolRegistry, Arc<MockProvider>) {
        let provider = Arc::new(provider);
        let registry = ToolRegistry::new(ToolHandlerContext {
            provider: provider.clone(),
        });
        (registry, provider)
    }

    #[test]
    fn test_definitions_cover_every_kind_in_order() {
        let (registry, _) = registry_with(MockProvider::default());
        let names: Vec<&str> = registry.definitions().iter().map(|d| d.name).collect();
        assert_eq!(
            names,
            vec![
                "geocode",
                "places_search_text",
                "places_search_nearby",
                "places_autocomplete",
                "places_get_place",
                "directions"
            ]
        );
        for kind in ToolKind::ALL {
            assert_eq!(ToolKind::from_name(kind.name()), Some(kind));
            assert_eq!(registry.resolve(kind.name()), Some(kind));
        }
        assert_eq!(registry.resolve("reverse_geocode"), None);
    }

    #[test]
    fn test_schemas_are_inline_objects() {
        let (registry, _) = registry_with(MockProvider::default());
        for def in registry.definitions() {
            assert_eq!(def.input_schema["type"], "object", "{}", def.name);
            assert_eq!(def.output_schema["type"], "object", "{}", def.name);
            let rendered = def.output_schema.to_string();
            assert!(!rendered.contains("$ref"), "{} has refs", def.name);
        }

        let geocode = &registry.definitions()[0];
        assert_eq!(geocode.input_schema["required"], json!(["address"]));
    }

    #[test]
    fn test_definition_serializes_camel_case() {
        let (registry, _) = registry_with(MockProvider::default());
        let value = serde_json::to_value(&registry.definitions()[5]).unwrap();
        assert_eq!(value["name"], "directions");
        assert!(value.get("inputSchema").is_some());
        assert!(value.get("outputSchema").is_some());
        assert!(value.get("kind").is_none());
    }

    #[tokio::test]
    async fn test_execute_success_carries_structured_result() {
        let (registry, _) = registry_with(MockProvider {
            routes: vec![WireRoute::default()],
            ..Default::default()
        });

        let result = registry
            .execute(
                ToolKind::Directions,
                json!({ "origin": "A", "destination": "B" }),
            )
            .await;

        assert!(!result.is_error);
        let structured = result.structured.unwrap();
        assert_eq!(structured["status"], "OK");
        let reparsed: Value = serde_json::from_str(&result.content).unwrap();
        assert_eq!(reparsed, structured);
    }

    #[tokio::test]
    async fn test_execute_invalid_arguments_skips_provider() {
        let (registry, provider) = registry_with(MockProvider::default());

        let result = registry.execute(ToolKind::Geocode, json!({ "addr": "x" })).await;

        assert!(result.is_error);
        assert!(result.structured.is_none());
        assert!(result.content.starts_with("Invalid arguments"));
        assert_eq!(provider.call_count(), 0);
    }

    #[tokio::test]
    async fn test_execute_provider_failure_is_tool_error() {
        let (registry, provider) = registry_with(MockProvider {
            fail_status: Some(503),
            ..Default::default()
        });

        let result = registry
            .execute(ToolKind::PlacesSearchText, json!({ "query": "museum" }))
            .await;

        assert!(result.is_error);
        assert!(result.content.contains("503"));
        assert_eq!(provider.call_count(), 1);
    }
}
