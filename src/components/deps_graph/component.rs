use std::cell::RefCell;
use std::rc::Rc;

use leptos::prelude::*;
use leptos::task::spawn_local;
use wasm_bindgen::JsCast;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, MouseEvent, WheelEvent};

use super::fetch::{self, DATA_ENDPOINT};
use super::overlay;
use super::render;
use super::view::{GraphView, Navigation, RefreshOutcome};

type SharedView = Rc<RefCell<Option<GraphView>>>;
type SharedContext = Rc<RefCell<Option<CanvasRenderingContext2d>>>;

/// Pointer travel below this many pixels still counts as a tap.
const TAP_SLOP: f64 = 4.0;

/// Canvas drawing the dependency graph of one job's tasks.
///
/// Tapping a task reloads the page focused on it; right-clicking opens the
/// task's detail view in a new tab; dragging pans and the wheel zooms.
#[component]
pub fn DepsGraphCanvas(
	/// Task id the view centers on, usually from the `t` query parameter.
	#[prop(into)] focus_task_id: Signal<Option<String>>,
	#[prop(default = None)] width: Option<f64>,
	#[prop(default = None)] height: Option<f64>,
) -> impl IntoView {
	let canvas_ref = NodeRef::<leptos::html::Canvas>::new();
	let view: SharedView = Rc::new(RefCell::new(None));
	let ctx: SharedContext = Rc::new(RefCell::new(None));

	let (view_init, ctx_init) = (view.clone(), ctx.clone());
	Effect::new(move |_| {
		let Some(canvas) = canvas_ref.get() else {
			return;
		};
		let canvas: HtmlCanvasElement = canvas.into();

		let (w, h) = (
			width.unwrap_or_else(|| {
				canvas
					.parent_element()
					.map(|p| p.client_width() as f64)
					.unwrap_or(800.0)
			}),
			height.unwrap_or_else(|| {
				canvas
					.parent_element()
					.map(|p| p.client_height() as f64)
					.unwrap_or(600.0)
			}),
		);
		canvas.set_width(w as u32);
		canvas.set_height(h as u32);

		*ctx_init.borrow_mut() = canvas
			.get_context("2d")
			.ok()
			.flatten()
			.and_then(|ctx| ctx.dyn_into::<CanvasRenderingContext2d>().ok());
		*view_init.borrow_mut() = Some(GraphView::new(w, h));

		refresh(&view_init, &ctx_init, focus_task_id.get_untracked());
	});

	// An in-app focus change refetches. The first run is skipped (the mount
	// effect above issues the initial fetch) and the view guard covers this
	// effect firing before the canvas exists.
	let (view_focus, ctx_focus) = (view.clone(), ctx.clone());
	Effect::new(move |prev: Option<Option<String>>| {
		let focus = focus_task_id.get();
		if let Some(prev) = prev {
			if prev != focus && view_focus.borrow().is_some() {
				refresh(&view_focus, &ctx_focus, focus.clone());
			}
		}
		focus
	});

	let view_down = view.clone();
	let on_mousedown = move |ev: MouseEvent| {
		let Some((x, y)) = canvas_coords(canvas_ref, &ev) else {
			return;
		};
		if let Some(view) = view_down.borrow_mut().as_mut() {
			if let Some(state) = view.state_mut() {
				state.begin_pan(x, y);
			}
		}
	};

	let (view_move, ctx_move) = (view.clone(), ctx.clone());
	let on_mousemove = move |ev: MouseEvent| {
		let Some((x, y)) = canvas_coords(canvas_ref, &ev) else {
			return;
		};
		let mut panned = false;
		if let Some(view) = view_move.borrow_mut().as_mut() {
			if let Some(state) = view.state_mut() {
				if state.pan.active {
					state.pan_to(x, y);
					panned = true;
				}
			}
		}
		if panned {
			paint(&view_move, &ctx_move);
		}
	};

	let view_up = view.clone();
	let on_mouseup = move |_: MouseEvent| {
		if let Some(view) = view_up.borrow_mut().as_mut() {
			if let Some(state) = view.state_mut() {
				state.end_pan();
			}
		}
	};

	let view_leave = view.clone();
	let on_mouseleave = move |_: MouseEvent| {
		if let Some(view) = view_leave.borrow_mut().as_mut() {
			if let Some(state) = view.state_mut() {
				state.end_pan();
			}
		}
	};

	let view_click = view.clone();
	let on_click = move |ev: MouseEvent| {
		let Some((x, y)) = canvas_coords(canvas_ref, &ev) else {
			return;
		};
		let navigation = {
			let guard = view_click.borrow();
			let Some(view) = guard.as_ref() else {
				return;
			};
			// A drag that ended on a node is not a tap.
			let travel = view.state().map(|s| s.last_pan_travel()).unwrap_or(0.0);
			if travel > TAP_SLOP {
				return;
			}
			view.tap_at(x, y)
		};
		if let Some(navigation) = navigation {
			ev.prevent_default();
			navigate(&navigation);
		}
	};

	let view_context = view.clone();
	let on_contextmenu = move |ev: MouseEvent| {
		ev.prevent_default();
		let Some((x, y)) = canvas_coords(canvas_ref, &ev) else {
			return;
		};
		let navigation = view_context.borrow().as_ref().and_then(|v| v.context_tap_at(x, y));
		if let Some(navigation) = navigation {
			navigate(&navigation);
		}
	};

	let (view_wheel, ctx_wheel) = (view.clone(), ctx.clone());
	let on_wheel = move |ev: WheelEvent| {
		ev.prevent_default();
		let Some((x, y)) = canvas_coords(canvas_ref, &ev) else {
			return;
		};
		let factor = if ev.delta_y() > 0.0 { 0.9 } else { 1.1 };
		if let Some(view) = view_wheel.borrow_mut().as_mut() {
			if let Some(state) = view.state_mut() {
				state.zoom_at(x, y, factor);
			}
		}
		paint(&view_wheel, &ctx_wheel);
	};

	view! {
		<canvas
			node_ref=canvas_ref
			class="depsgraph-canvas"
			on:mousedown=on_mousedown
			on:mousemove=on_mousemove
			on:mouseup=on_mouseup
			on:mouseleave=on_mouseleave
			on:click=on_click
			on:contextmenu=on_contextmenu
			on:wheel=on_wheel
			style="display: block; cursor: grab;"
		/>
	}
}

/// Kick off one refresh cycle: mark the view loading, fetch, then hand the
/// result back to the view. The loading indicator is cleared on success,
/// failure and stale completion alike.
fn refresh(view: &SharedView, ctx: &SharedContext, focus_task_id: Option<String>) {
	let seq = {
		let mut guard = view.borrow_mut();
		let Some(view) = guard.as_mut() else {
			return;
		};
		view.begin_refresh()
	};
	overlay::set_loading(true);

	let (view, ctx) = (view.clone(), ctx.clone());
	spawn_local(async move {
		let url = resolve_url(&fetch::data_url(DATA_ENDPOINT, focus_task_id.as_deref()));
		let result = fetch::fetch_depsgraph(&url).await;

		let outcome = view
			.borrow_mut()
			.as_mut()
			.map(|view| view.complete(seq, result, focus_task_id.as_deref()));
		if let Some(RefreshOutcome::Rendered { element_count, big }) = outcome {
			if big {
				overlay::show_size_warning(element_count);
			} else {
				overlay::hide_size_warning();
			}
			paint(&view, &ctx);
		}
		overlay::set_loading(false);
	});
}

fn paint(view: &SharedView, ctx: &SharedContext) {
	let (view, ctx) = (view.borrow(), ctx.borrow());
	if let (Some(view), Some(ctx)) = (view.as_ref(), ctx.as_ref()) {
		if let Some(state) = view.state() {
			render::render(state, ctx);
		}
	}
}

fn canvas_coords(
	canvas_ref: NodeRef<leptos::html::Canvas>,
	ev: &MouseEvent,
) -> Option<(f64, f64)> {
	let canvas: HtmlCanvasElement = canvas_ref.get()?.into();
	let rect = canvas.get_bounding_client_rect();
	Some((
		ev.client_x() as f64 - rect.left(),
		ev.client_y() as f64 - rect.top(),
	))
}

fn navigate(navigation: &Navigation) {
	let Some(window) = web_sys::window() else {
		return;
	};
	let url = navigation.url();
	if navigation.opens_new_tab() {
		let _ = window.open_with_url_and_target(&url, "_blank");
	} else {
		let _ = window.location().set_href(&url);
	}
}

// reqwest wants absolute URLs; resolve the relative endpoint against the
// current page like the browser itself would.
fn resolve_url(relative: &str) -> String {
	web_sys::window()
		.and_then(|w| w.location().href().ok())
		.and_then(|href| web_sys::Url::new_with_base(relative, &href).ok())
		.map(|url| url.href())
		.unwrap_or_else(|| relative.to_string())
}
