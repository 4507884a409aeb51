use log::debug;
use thiserror::Error;

use super::types::DepsGraphData;

/// Endpoint serving `{elements, roots}` JSON, relative to the job page.
pub const DATA_ENDPOINT: &str = "depsgraph-data";

/// `depsgraph-data`, or `depsgraph-data/<node>` for the subgraph around one
/// task.
pub fn data_url(base: &str, node_id: Option<&str>) -> String {
	match node_id {
		Some(id) => format!("{base}/{id}"),
		None => base.to_string(),
	}
}

/// Why a depsgraph fetch produced no data.
#[derive(Debug, Error)]
pub enum FetchError {
	#[error("depsgraph request failed: {0}")]
	Request(#[from] reqwest::Error),
	#[error("depsgraph payload did not parse: {0}")]
	Decode(#[from] serde_json::Error),
}

/// Fetch and decode the node/edge data for the view.
pub async fn fetch_depsgraph(url: &str) -> Result<DepsGraphData, FetchError> {
	debug!("Fetching depsgraph data from {url}");
	let body = reqwest::get(url).await?.error_for_status()?.text().await?;
	Ok(serde_json::from_str(&body)?)
}
