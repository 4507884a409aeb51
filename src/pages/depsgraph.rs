use leptos::prelude::*;
use leptos_router::hooks::use_query_map;

use crate::components::deps_graph::DepsGraphCanvas;

/// Dependency graph page for a job. The `t` query parameter picks the task
/// to focus on; without it the view starts at the job's top-level tasks.
#[component]
pub fn DepsGraph() -> impl IntoView {
	let query = use_query_map();
	let focus_task_id = Signal::derive(move || query.with(|q| q.get("t")));

	view! {
		<div class="depsgraph-page">
			<div id="loading">"Loading tasks..."</div>
			<div id="size_warning" style="display: none;">
				"This dependency graph is big ("
				<span id="graphsize"></span>
				" elements), so a simplified layout is used. Click a task to focus on its neighbourhood."
			</div>
			<div class="depsgraph-container">
				<DepsGraphCanvas focus_task_id=focus_task_id />
			</div>
		</div>
	}
}
