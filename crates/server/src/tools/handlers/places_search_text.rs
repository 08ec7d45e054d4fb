use serde_json::Value;

use geomcp_common::api::tools::{PlacesSearchOutput, PlacesSearchTextArgs, SearchStatus};

use super::{parse_args, place_summary, require_text};
use crate::provider::MapsProvider;
use crate::tools::ToolError;

pub async fn run(
    args: Value,
    provider: &dyn MapsProvider,
) -> Result<PlacesSearchOutput, ToolError> {
    let args: PlacesSearchTextArgs = parse_args(args)?;
    let query = require_text("query", &args.query)?;

    let places = provider.search_text(&query).await?;

    let results: Vec<_> = places.into_iter().map(place_summary).collect();
    Ok(PlacesSearchOutput {
        status: SearchStatus::for_count(results.len()),
        results,
    })
}
