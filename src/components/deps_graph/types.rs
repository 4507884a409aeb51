use serde::Deserialize;

/// Label of the placeholder node drawn when a job has no tasks at all.
pub const EMPTY_GRAPH_LABEL: &str = "No tasks here...";

/// Task status as reported by the job system.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TaskStatus {
	UnderConstruction,
	Paused,
	Queued,
	ClaimedByManager,
	Active,
	Processing,
	Completed,
	CancelRequested,
	Canceled,
	Failed,
	FailRequested,
	/// Statuses this build does not know about still render.
	#[default]
	#[serde(other)]
	Unknown,
}

impl TaskStatus {
	/// Fill color the dashboard uses for tasks in this status.
	pub fn color(self) -> &'static str {
		match self {
			TaskStatus::Queued => "#b4bbaa",
			TaskStatus::Canceled => "#999",
			TaskStatus::CancelRequested => "#d0a46d",
			TaskStatus::Failed => "#ff8080",
			TaskStatus::FailRequested => "#bc8585",
			TaskStatus::ClaimedByManager => "#d1c5d3",
			TaskStatus::Processing => "#ffbe00",
			TaskStatus::Active => "#00ceff",
			TaskStatus::Completed => "#bbe151",
			TaskStatus::Paused => "#ccc",
			TaskStatus::UnderConstruction | TaskStatus::Unknown => "#ccd",
		}
	}
}

/// A task in the dependency graph.
#[derive(Clone, Debug, Deserialize)]
pub struct TaskNode {
	#[serde(default)]
	pub id: String,
	#[serde(default)]
	pub label: String,
	#[serde(default)]
	pub status: TaskStatus,
	/// Server-assigned color; falls back to the status color when absent.
	#[serde(default)]
	pub color: Option<String>,
	/// Referenced by the visible subgraph but not itself loaded.
	#[serde(default)]
	pub outside: bool,
	#[serde(default)]
	pub focus: bool,
}

impl TaskNode {
	pub fn fill_color(&self) -> &str {
		self.color.as_deref().unwrap_or_else(|| self.status.color())
	}

	fn placeholder() -> Self {
		Self {
			id: String::new(),
			label: EMPTY_GRAPH_LABEL.to_string(),
			status: TaskStatus::Unknown,
			color: None,
			outside: true,
			focus: false,
		}
	}
}

/// A directed "depends on" relation: `target` depends on `source`.
#[derive(Clone, Debug, Deserialize)]
pub struct DepEdge {
	pub source: String,
	pub target: String,
}

/// One element of the wire payload, tagged by its `group` field. Extra keys
/// (the server sends `position` hints and edge ids) are ignored.
#[derive(Clone, Debug, Deserialize)]
#[serde(tag = "group", content = "data", rename_all = "lowercase")]
pub enum GraphElement {
	Nodes(TaskNode),
	Edges(DepEdge),
}

impl GraphElement {
	pub fn as_node(&self) -> Option<&TaskNode> {
		match self {
			GraphElement::Nodes(node) => Some(node),
			GraphElement::Edges(_) => None,
		}
	}

	pub fn as_edge(&self) -> Option<&DepEdge> {
		match self {
			GraphElement::Nodes(_) => None,
			GraphElement::Edges(edge) => Some(edge),
		}
	}
}

/// Payload of the `depsgraph-data` endpoint. The whole set is replaced on
/// every fetch; nothing is diffed incrementally.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct DepsGraphData {
	#[serde(default)]
	pub elements: Vec<GraphElement>,
	#[serde(default)]
	pub roots: Vec<String>,
}

impl DepsGraphData {
	/// Replace an empty element set with a single placeholder node so the
	/// renderer always has something to draw.
	pub fn ensure_drawable(&mut self) {
		if !self.elements.is_empty() {
			return;
		}
		self.elements.push(GraphElement::Nodes(TaskNode::placeholder()));
		self.roots.clear();
	}

	pub fn nodes(&self) -> impl Iterator<Item = &TaskNode> {
		self.elements.iter().filter_map(GraphElement::as_node)
	}

	pub fn edges(&self) -> impl Iterator<Item = &DepEdge> {
		self.elements.iter().filter_map(GraphElement::as_edge)
	}

	/// Nodes plus edges; this is the count the size classifier looks at.
	pub fn element_count(&self) -> usize {
		self.elements.len()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	const WIRE_SAMPLE: &str = r##"{
		"elements": [
			{"group": "nodes",
			 "data": {"id": "5a1", "label": "blender-render-1-3", "status": "queued",
			          "color": "#b4bbaa", "outside": false, "focus": false},
			 "position": {"x": 0, "y": -100}},
			{"group": "nodes",
			 "data": {"id": "5a2", "label": "merge-exr", "status": "claimed-by-manager",
			          "outside": true, "focus": true}},
			{"group": "edges",
			 "data": {"id": "5a2-5a1", "source": "5a1", "target": "5a2"}}
		],
		"roots": ["5a1"]
	}"##;

	#[test]
	fn parses_wire_format() {
		let data: DepsGraphData = serde_json::from_str(WIRE_SAMPLE).unwrap();
		assert_eq!(data.element_count(), 3);
		assert_eq!(data.nodes().count(), 2);
		assert_eq!(data.edges().count(), 1);
		assert_eq!(data.roots, vec!["5a1".to_string()]);

		let merge = data.nodes().nth(1).unwrap();
		assert_eq!(merge.status, TaskStatus::ClaimedByManager);
		assert!(merge.outside);
		assert!(merge.focus);
		assert!(merge.color.is_none());

		let edge = data.edges().next().unwrap();
		assert_eq!(edge.source, "5a1");
		assert_eq!(edge.target, "5a2");
	}

	#[test]
	fn unknown_status_parses_to_catch_all() {
		let node: TaskNode =
			serde_json::from_str(r#"{"id": "x", "status": "sleeping"}"#).unwrap();
		assert_eq!(node.status, TaskStatus::Unknown);
		assert_eq!(node.fill_color(), "#ccd");
	}

	#[test]
	fn wire_color_wins_over_status_color() {
		let node: TaskNode =
			serde_json::from_str(r##"{"id": "x", "status": "active", "color": "#123456"}"##)
				.unwrap();
		assert_eq!(node.fill_color(), "#123456");

		let node: TaskNode = serde_json::from_str(r#"{"id": "x", "status": "active"}"#).unwrap();
		assert_eq!(node.fill_color(), "#00ceff");
	}

	#[test]
	fn empty_data_falls_back_to_placeholder() {
		let mut data = DepsGraphData {
			elements: Vec::new(),
			roots: vec!["5a1".to_string()],
		};
		data.ensure_drawable();

		assert_eq!(data.element_count(), 1);
		assert!(data.roots.is_empty());
		let node = data.nodes().next().unwrap();
		assert!(node.outside);
		assert_eq!(node.label, "No tasks here...");
		assert!(node.id.is_empty());
	}

	#[test]
	fn non_empty_data_is_left_alone() {
		let mut data: DepsGraphData = serde_json::from_str(WIRE_SAMPLE).unwrap();
		data.ensure_drawable();
		assert_eq!(data.element_count(), 3);
		assert_eq!(data.roots.len(), 1);
	}
}
