use std::collections::{HashMap, VecDeque};

use petgraph::Direction;
use petgraph::graph::{DiGraph, NodeIndex};

use super::types::{DepEdge, TaskNode};

/// The number of graph elements (nodes + edges) we consider a "big" graph.
pub const GRAPH_ELEMENTS_CONSIDERED_BIG: usize = 100;

/// Horizontal distance between consecutive layers of the layered layout.
pub const LAYER_SPACING: f32 = 140.0;
/// Vertical distance between rows within one layer.
pub const ROW_SPACING: f32 = 48.0;

pub fn is_big_graph(element_count: usize) -> bool {
	element_count >= GRAPH_ELEMENTS_CONSIDERED_BIG
}

/// Layout strategy, picked from the element count.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LayoutMode {
	/// Force-directed clustering; worth the simulation cost on small graphs.
	Organic,
	/// Breadth-first layers seeded from the root tasks.
	Layered,
}

impl LayoutMode {
	pub fn select(element_count: usize) -> Self {
		if is_big_graph(element_count) {
			LayoutMode::Layered
		} else {
			LayoutMode::Organic
		}
	}

	/// Upper bound on synchronous simulation steps after construction, so a
	/// pathological graph still paints within a fixed budget.
	pub fn settle_iterations(self) -> u32 {
		match self {
			LayoutMode::Organic => 50,
			LayoutMode::Layered => 1,
		}
	}

	/// Small graphs are scaled to fit the viewport. Big graphs keep their
	/// scale (a full fit would zoom out to an unreadable speck) and rely on
	/// focus centering instead.
	pub fn fits_to_view(self) -> bool {
		self == LayoutMode::Organic
	}
}

/// Breadth-first positions for the layered layout, keyed by task id.
///
/// Traversal starts from `roots`; when the server sent none, nodes without
/// incoming dependency edges seed the traversal instead. Nodes left
/// unreachable (cycles, disconnected islands) each seed a fresh traversal at
/// layer zero. Edges naming unknown tasks are dropped.
pub fn layered_positions<'a>(
	nodes: impl Iterator<Item = &'a TaskNode>,
	edges: impl Iterator<Item = &'a DepEdge>,
	roots: &[String],
) -> HashMap<String, (f32, f32)> {
	let mut graph: DiGraph<&'a str, ()> = DiGraph::new();
	let mut index_of: HashMap<&'a str, NodeIndex> = HashMap::new();
	for node in nodes {
		let idx = graph.add_node(node.id.as_str());
		index_of.insert(node.id.as_str(), idx);
	}
	for edge in edges {
		if let (Some(&src), Some(&tgt)) = (
			index_of.get(edge.source.as_str()),
			index_of.get(edge.target.as_str()),
		) {
			graph.add_edge(src, tgt, ());
		}
	}

	let mut seeds: Vec<NodeIndex> = roots
		.iter()
		.filter_map(|id| index_of.get(id.as_str()).copied())
		.collect();
	if seeds.is_empty() {
		seeds = graph
			.node_indices()
			.filter(|&idx| {
				graph
					.neighbors_directed(idx, Direction::Incoming)
					.next()
					.is_none()
			})
			.collect();
	}

	let mut depth_of: HashMap<NodeIndex, usize> = HashMap::new();
	let mut queue: VecDeque<(NodeIndex, usize)> = VecDeque::new();
	for seed in seeds {
		if !depth_of.contains_key(&seed) {
			depth_of.insert(seed, 0);
			queue.push_back((seed, 0));
		}
	}
	descend(&graph, &mut depth_of, &mut queue);

	for idx in graph.node_indices() {
		if !depth_of.contains_key(&idx) {
			depth_of.insert(idx, 0);
			queue.push_back((idx, 0));
			descend(&graph, &mut depth_of, &mut queue);
		}
	}

	let mut rows_in_layer: HashMap<usize, usize> = HashMap::new();
	let mut positions = HashMap::new();
	for idx in graph.node_indices() {
		let depth = depth_of[&idx];
		let row = rows_in_layer.entry(depth).or_insert(0);
		positions.insert(
			graph[idx].to_string(),
			(depth as f32 * LAYER_SPACING, *row as f32 * ROW_SPACING),
		);
		*row += 1;
	}
	positions
}

fn descend(
	graph: &DiGraph<&str, ()>,
	depth_of: &mut HashMap<NodeIndex, usize>,
	queue: &mut VecDeque<(NodeIndex, usize)>,
) {
	while let Some((current, depth)) = queue.pop_front() {
		for next in graph.neighbors(current) {
			if !depth_of.contains_key(&next) {
				depth_of.insert(next, depth + 1);
				queue.push_back((next, depth + 1));
			}
		}
	}
}
