use log::{debug, warn};

use super::fetch::FetchError;
use super::layout::is_big_graph;
use super::state::DepsGraphState;
use super::types::DepsGraphData;

/// Where the view is in its fetch/render cycle. There is no terminal state;
/// both end states accept a new refresh.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ViewPhase {
	Idle,
	Loading,
	Rendered,
	FetchFailed,
}

/// Browser navigation requested by a pointer interaction.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Navigation {
	/// Reload the page focused on this task (same tab).
	Focus(String),
	/// Open the task detail view in a new tab.
	Details(String),
}

impl Navigation {
	pub fn url(&self) -> String {
		match self {
			Navigation::Focus(id) => format!("depsgraph?t={id}"),
			Navigation::Details(id) => format!("../with-task/{id}"),
		}
	}

	pub fn opens_new_tab(&self) -> bool {
		matches!(self, Navigation::Details(_))
	}
}

/// What completing a refresh request did to the view.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RefreshOutcome {
	/// A newer request was issued meanwhile; this response was dropped.
	Stale,
	/// The fetch failed; the previous render is untouched.
	Failed,
	Rendered { element_count: usize, big: bool },
}

/// Owned graph-view instance: the fetch state machine plus the current
/// render state. A successful refresh replaces the render state wholesale,
/// so events arriving through this struct can never act on a stale graph.
pub struct GraphView {
	width: f64,
	height: f64,
	phase: ViewPhase,
	seq: u64,
	state: Option<DepsGraphState>,
}

impl GraphView {
	pub fn new(width: f64, height: f64) -> Self {
		Self {
			width,
			height,
			phase: ViewPhase::Idle,
			seq: 0,
			state: None,
		}
	}

	pub fn phase(&self) -> ViewPhase {
		self.phase
	}

	pub fn state(&self) -> Option<&DepsGraphState> {
		self.state.as_ref()
	}

	pub fn state_mut(&mut self) -> Option<&mut DepsGraphState> {
		self.state.as_mut()
	}

	pub fn resize(&mut self, width: f64, height: f64) {
		self.width = width;
		self.height = height;
		if let Some(state) = self.state.as_mut() {
			state.resize(width, height);
		}
	}

	/// Start a refresh. The returned sequence number must be handed back to
	/// [`GraphView::complete`]; issuing a newer request invalidates it.
	pub fn begin_refresh(&mut self) -> u64 {
		self.seq += 1;
		self.phase = ViewPhase::Loading;
		self.seq
	}

	/// Finish a refresh with the fetch result. Responses racing a newer
	/// request are discarded without touching phase or render state.
	pub fn complete(
		&mut self,
		seq: u64,
		result: Result<DepsGraphData, FetchError>,
		focus_task_id: Option<&str>,
	) -> RefreshOutcome {
		if seq != self.seq {
			debug!("Dropping depsgraph response for superseded request {seq}");
			return RefreshOutcome::Stale;
		}

		match result {
			Err(err) => {
				warn!("Could not get depsgraph data: {err}");
				self.phase = ViewPhase::FetchFailed;
				RefreshOutcome::Failed
			}
			Ok(mut data) => {
				data.ensure_drawable();
				let element_count = data.element_count();
				let big = is_big_graph(element_count);
				debug!("Drawing depsgraph with {element_count} elements (big: {big})");

				self.state = Some(DepsGraphState::new(
					&data,
					focus_task_id,
					self.width,
					self.height,
				));
				if big {
					self.center_focus();
				} else if let Some(state) = self.state.as_mut() {
					state.fit_to_view();
				}
				self.phase = ViewPhase::Rendered;
				RefreshOutcome::Rendered { element_count, big }
			}
		}
	}

	// Runs from the layout-done path; skipped quietly when the render state
	// does not exist yet.
	fn center_focus(&mut self) {
		let Some(state) = self.state.as_mut() else {
			return;
		};
		state.center_on_focus();
	}

	/// Node tap → focus navigation. Placeholder nodes (empty id) never
	/// navigate.
	pub fn tap_at(&self, sx: f64, sy: f64) -> Option<Navigation> {
		let id = self.state.as_ref()?.node_id_at(sx, sy)?;
		if id.is_empty() {
			return None;
		}
		Some(Navigation::Focus(id))
	}

	/// Node right-click → detail view in a new tab.
	pub fn context_tap_at(&self, sx: f64, sy: f64) -> Option<Navigation> {
		let id = self.state.as_ref()?.node_id_at(sx, sy)?;
		if id.is_empty() {
			return None;
		}
		Some(Navigation::Details(id))
	}
}
