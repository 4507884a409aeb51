use std::collections::HashMap;
use std::f64::consts::PI;

use force_graph::{DefaultNodeIdx, EdgeData, ForceGraph, NodeData, SimulationParameters};

use super::layout::{self, LayoutMode};
use super::types::DepsGraphData;

pub const NODE_RADIUS: f64 = 6.0;
pub const HIT_RADIUS: f64 = 12.0;

/// Per-node payload carried into the renderer.
#[derive(Clone, Debug, Default)]
pub struct NodePaint {
	pub id: String,
	pub label: String,
	pub color: String,
	pub outside: bool,
	pub focus: bool,
}

#[derive(Clone, Debug, Default)]
pub struct ViewTransform {
	pub x: f64,
	pub y: f64,
	pub k: f64,
}

#[derive(Clone, Debug, Default)]
pub struct PanState {
	pub active: bool,
	pub start_x: f64,
	pub start_y: f64,
	pub transform_start_x: f64,
	pub transform_start_y: f64,
	travel: f64,
}

/// Render state for one fetched graph: node positions, viewport transform
/// and pan bookkeeping. Rebuilt from scratch on every refresh.
pub struct DepsGraphState {
	pub graph: ForceGraph<NodePaint, ()>,
	pub transform: ViewTransform,
	pub pan: PanState,
	pub width: f64,
	pub height: f64,
	mode: LayoutMode,
	focus_idx: Option<DefaultNodeIdx>,
}

impl DepsGraphState {
	pub fn new(
		data: &DepsGraphData,
		focus_task_id: Option<&str>,
		width: f64,
		height: f64,
	) -> Self {
		let mode = LayoutMode::select(data.element_count());
		let mut graph = ForceGraph::new(SimulationParameters {
			force_charge: 150.0,
			force_spring: 0.05,
			force_max: 100.0,
			node_speed: 3000.0,
			damping_factor: 0.9,
		});

		let layered = match mode {
			LayoutMode::Layered => Some(layout::layered_positions(
				data.nodes(),
				data.edges(),
				&data.roots,
			)),
			LayoutMode::Organic => None,
		};

		let node_count = data.nodes().count();
		let mut idx_of = HashMap::new();
		let mut focus_idx = None;
		for (i, node) in data.nodes().enumerate() {
			let (x, y, anchored) = match &layered {
				Some(positions) => {
					let (x, y) = positions.get(node.id.as_str()).copied().unwrap_or_default();
					(x, y, true)
				}
				None => {
					// Seed small graphs on a circle; the simulation untangles them.
					let angle = (i as f64) * 2.0 * PI / node_count as f64;
					(
						(width / 2.0 + 100.0 * angle.cos()) as f32,
						(height / 2.0 + 100.0 * angle.sin()) as f32,
						false,
					)
				}
			};

			let focus = node.focus || focus_task_id == Some(node.id.as_str());
			let idx = graph.add_node(NodeData {
				x,
				y,
				mass: 10.0,
				is_anchor: anchored,
				user_data: NodePaint {
					id: node.id.clone(),
					label: node.label.clone(),
					color: node.fill_color().to_string(),
					outside: node.outside,
					focus,
				},
			});
			if focus {
				focus_idx = Some(idx);
			}
			idx_of.insert(node.id.clone(), idx);
		}

		for edge in data.edges() {
			// Edges naming unknown tasks are dropped, not rendered.
			if let (Some(&src), Some(&tgt)) = (idx_of.get(&edge.source), idx_of.get(&edge.target))
			{
				graph.add_edge(src, tgt, EdgeData::default());
			}
		}

		let mut state = Self {
			graph,
			transform: ViewTransform {
				x: 0.0,
				y: 0.0,
				k: 1.0,
			},
			pan: PanState::default(),
			width,
			height,
			mode,
			focus_idx,
		};
		state.settle();
		state
	}

	fn settle(&mut self) {
		for _ in 0..self.mode.settle_iterations() {
			self.graph.update(0.016);
		}
	}

	pub fn mode(&self) -> LayoutMode {
		self.mode
	}

	pub fn screen_to_graph(&self, sx: f64, sy: f64) -> (f64, f64) {
		(
			(sx - self.transform.x) / self.transform.k,
			(sy - self.transform.y) / self.transform.k,
		)
	}

	pub fn graph_to_screen(&self, gx: f64, gy: f64) -> (f64, f64) {
		(
			gx * self.transform.k + self.transform.x,
			gy * self.transform.k + self.transform.y,
		)
	}

	/// Id of the task under the given screen position, if any.
	pub fn node_id_at(&self, sx: f64, sy: f64) -> Option<String> {
		let (gx, gy) = self.screen_to_graph(sx, sy);
		let mut found = None;
		self.graph.visit_nodes(|node| {
			let (dx, dy) = (node.x() as f64 - gx, node.y() as f64 - gy);
			// HIT_RADIUS is in world-space, scales with zoom like nodes
			if (dx * dx + dy * dy).sqrt() < HIT_RADIUS {
				found = Some(node.data.user_data.id.clone());
			}
		});
		found
	}

	pub fn node_position(&self, id: &str) -> Option<(f64, f64)> {
		let mut found = None;
		self.graph.visit_nodes(|node| {
			if node.data.user_data.id == id {
				found = Some((node.x() as f64, node.y() as f64));
			}
		});
		found
	}

	pub fn node_count(&self) -> usize {
		let mut count = 0;
		self.graph.visit_nodes(|_| count += 1);
		count
	}

	pub fn edge_count(&self) -> usize {
		let mut count = 0;
		self.graph.visit_edges(|_, _, _| count += 1);
		count
	}

	/// Scale and shift so the whole graph is visible and centered.
	pub fn fit_to_view(&mut self) {
		let mut bounds: Option<(f64, f64, f64, f64)> = None;
		self.graph.visit_nodes(|node| {
			let (x, y) = (node.x() as f64, node.y() as f64);
			bounds = Some(match bounds {
				None => (x, y, x, y),
				Some((min_x, min_y, max_x, max_y)) => {
					(min_x.min(x), min_y.min(y), max_x.max(x), max_y.max(y))
				}
			});
		});
		let Some((min_x, min_y, max_x, max_y)) = bounds else {
			return;
		};

		let margin = 4.0 * NODE_RADIUS;
		let k = (self.width / (max_x - min_x + margin))
			.min(self.height / (max_y - min_y + margin))
			.clamp(0.1, 2.0);
		let (cx, cy) = ((min_x + max_x) / 2.0, (min_y + max_y) / 2.0);
		self.transform = ViewTransform {
			x: self.width / 2.0 - cx * k,
			y: self.height / 2.0 - cy * k,
			k,
		};
	}

	/// Shift the viewport so the focus node sits at the canvas center,
	/// keeping the current zoom. Returns false when there is no focus node.
	pub fn center_on_focus(&mut self) -> bool {
		let Some(focus_idx) = self.focus_idx else {
			return false;
		};
		let mut position = None;
		self.graph.visit_nodes(|node| {
			if node.index() == focus_idx {
				position = Some((node.x() as f64, node.y() as f64));
			}
		});
		let Some((x, y)) = position else {
			return false;
		};
		self.transform.x = self.width / 2.0 - x * self.transform.k;
		self.transform.y = self.height / 2.0 - y * self.transform.k;
		true
	}

	pub fn begin_pan(&mut self, sx: f64, sy: f64) {
		self.pan.active = true;
		self.pan.start_x = sx;
		self.pan.start_y = sy;
		self.pan.transform_start_x = self.transform.x;
		self.pan.transform_start_y = self.transform.y;
		self.pan.travel = 0.0;
	}

	pub fn pan_to(&mut self, sx: f64, sy: f64) {
		if !self.pan.active {
			return;
		}
		let (dx, dy) = (sx - self.pan.start_x, sy - self.pan.start_y);
		self.pan.travel = (dx * dx + dy * dy).sqrt();
		self.transform.x = self.pan.transform_start_x + dx;
		self.transform.y = self.pan.transform_start_y + dy;
	}

	pub fn end_pan(&mut self) {
		self.pan.active = false;
	}

	/// Screen distance covered by the most recent pan gesture; used to tell
	/// a drag from a tap.
	pub fn last_pan_travel(&self) -> f64 {
		self.pan.travel
	}

	pub fn zoom_at(&mut self, sx: f64, sy: f64, factor: f64) {
		let new_k = (self.transform.k * factor).clamp(0.1, 10.0);
		let ratio = new_k / self.transform.k;
		self.transform.x = sx - (sx - self.transform.x) * ratio;
		self.transform.y = sy - (sy - self.transform.y) * ratio;
		self.transform.k = new_k;
	}

	pub fn resize(&mut self, width: f64, height: f64) {
		self.width = width;
		self.height = height;
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::components::deps_graph::types::{DepEdge, GraphElement, TaskNode, TaskStatus};

	fn node(id: &str) -> GraphElement {
		GraphElement::Nodes(TaskNode {
			id: id.to_string(),
			label: id.to_string(),
			status: TaskStatus::Queued,
			color: None,
			outside: false,
			focus: false,
		})
	}

	fn edge(source: &str, target: &str) -> GraphElement {
		GraphElement::Edges(DepEdge {
			source: source.to_string(),
			target: target.to_string(),
		})
	}

	fn data(elements: Vec<GraphElement>, roots: &[&str]) -> DepsGraphData {
		DepsGraphData {
			elements,
			roots: roots.iter().map(|r| r.to_string()).collect(),
		}
	}

	#[test]
	fn dangling_edges_are_skipped() {
		let data = data(
			vec![node("a"), node("b"), edge("a", "b"), edge("a", "ghost")],
			&["a"],
		);
		let state = DepsGraphState::new(&data, None, 800.0, 600.0);
		assert_eq!(state.node_count(), 2);
		assert_eq!(state.edge_count(), 1);
	}

	#[test]
	fn fit_to_view_centers_the_bounding_box() {
		let data = data(vec![node("a"), node("b"), node("c")], &[]);
		let mut state = DepsGraphState::new(&data, None, 800.0, 600.0);
		state.fit_to_view();

		let mut bounds: Option<(f64, f64, f64, f64)> = None;
		state.graph.visit_nodes(|n| {
			let (x, y) = (n.x() as f64, n.y() as f64);
			bounds = Some(match bounds {
				None => (x, y, x, y),
				Some((a, b, c, d)) => (a.min(x), b.min(y), c.max(x), d.max(y)),
			});
		});
		let (min_x, min_y, max_x, max_y) = bounds.unwrap();
		let (sx, sy) = state.graph_to_screen((min_x + max_x) / 2.0, (min_y + max_y) / 2.0);
		assert!((sx - 400.0).abs() < 1e-6);
		assert!((sy - 300.0).abs() < 1e-6);
	}

	#[test]
	fn centers_on_the_focus_node() {
		let data = data(vec![node("a"), node("b"), edge("a", "b")], &["a"]);
		let mut state = DepsGraphState::new(&data, Some("b"), 800.0, 600.0);
		assert!(state.center_on_focus());

		let (x, y) = state.node_position("b").unwrap();
		let (sx, sy) = state.graph_to_screen(x, y);
		assert!((sx - 400.0).abs() < 1e-6);
		assert!((sy - 300.0).abs() < 1e-6);
	}

	#[test]
	fn centering_without_focus_is_a_noop() {
		let data = data(vec![node("a")], &[]);
		let mut state = DepsGraphState::new(&data, None, 800.0, 600.0);
		let before = state.transform.clone();
		assert!(!state.center_on_focus());
		assert_eq!(before.x, state.transform.x);
		assert_eq!(before.y, state.transform.y);
	}

	#[test]
	fn hit_test_finds_the_node_under_the_cursor() {
		let data = data(vec![node("a")], &[]);
		let mut state = DepsGraphState::new(&data, None, 800.0, 600.0);
		state.fit_to_view();

		let (x, y) = state.node_position("a").unwrap();
		let (sx, sy) = state.graph_to_screen(x, y);
		assert_eq!(state.node_id_at(sx, sy), Some("a".to_string()));
		assert_eq!(state.node_id_at(sx + 500.0, sy + 500.0), None);
	}

	#[test]
	fn zoom_keeps_the_cursor_point_fixed() {
		let data = data(vec![node("a"), node("b")], &[]);
		let mut state = DepsGraphState::new(&data, None, 800.0, 600.0);
		let before = state.screen_to_graph(200.0, 150.0);
		state.zoom_at(200.0, 150.0, 1.1);
		let after = state.screen_to_graph(200.0, 150.0);
		assert!((before.0 - after.0).abs() < 1e-9);
		assert!((before.1 - after.1).abs() < 1e-9);
	}

	#[test]
	fn pan_shifts_the_transform_and_tracks_travel() {
		let data = data(vec![node("a")], &[]);
		let mut state = DepsGraphState::new(&data, None, 800.0, 600.0);
		let (x0, y0) = (state.transform.x, state.transform.y);

		state.begin_pan(100.0, 100.0);
		state.pan_to(130.0, 140.0);
		state.end_pan();

		assert_eq!(state.transform.x, x0 + 30.0);
		assert_eq!(state.transform.y, y0 + 40.0);
		assert_eq!(state.last_pan_travel(), 50.0);
		assert!(!state.pan.active);
	}
}
