//! Page overlay elements the view toggles by id. Every element is optional;
//! a page without them simply gets no indicator.

use wasm_bindgen::JsCast;
use web_sys::HtmlElement;

const LOADING_ID: &str = "loading";
const SIZE_WARNING_ID: &str = "size_warning";
const GRAPH_SIZE_ID: &str = "graphsize";

fn by_id(id: &str) -> Option<HtmlElement> {
	web_sys::window()?
		.document()?
		.get_element_by_id(id)?
		.dyn_into()
		.ok()
}

fn set_visible(id: &str, visible: bool) {
	if let Some(element) = by_id(id) {
		let display = if visible { "" } else { "none" };
		let _ = element.style().set_property("display", display);
	}
}

pub fn set_loading(visible: bool) {
	set_visible(LOADING_ID, visible);
}

/// Show the big-graph warning with the element count filled in.
pub fn show_size_warning(element_count: usize) {
	if let Some(element) = by_id(GRAPH_SIZE_ID) {
		element.set_inner_text(&element_count.to_string());
	}
	set_visible(SIZE_WARNING_ID, true);
}

pub fn hide_size_warning() {
	set_visible(SIZE_WARNING_ID, false);
}
