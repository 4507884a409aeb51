use std::f64::consts::PI;

use wasm_bindgen::JsValue;
use web_sys::CanvasRenderingContext2d;

use super::state::{DepsGraphState, NODE_RADIUS};

const BACKGROUND: &str = "#1b2026";

pub fn render(state: &DepsGraphState, ctx: &CanvasRenderingContext2d) {
	ctx.set_fill_style_str(BACKGROUND);
	ctx.fill_rect(0.0, 0.0, state.width, state.height);
	ctx.save();
	let _ = ctx.translate(state.transform.x, state.transform.y);
	let _ = ctx.scale(state.transform.k, state.transform.k);
	draw_edges(state, ctx);
	draw_nodes(state, ctx);
	ctx.restore();
}

fn draw_edges(state: &DepsGraphState, ctx: &CanvasRenderingContext2d) {
	let k = state.transform.k;
	let (line_width, arrow_size) = (1.5 / k, 7.0 / k);

	state.graph.visit_edges(|parent, child, _| {
		let (x1, y1, x2, y2) = (
			parent.x() as f64,
			parent.y() as f64,
			child.x() as f64,
			child.y() as f64,
		);
		let (dx, dy) = (x2 - x1, y2 - y1);
		let dist = (dx * dx + dy * dy).sqrt();
		if dist < 0.001 {
			return;
		}

		let faded = parent.data.user_data.outside || child.data.user_data.outside;
		let alpha = if faded { 0.25 } else { 0.6 };
		ctx.set_stroke_style_str(&format!("rgba(150, 170, 190, {alpha})"));
		ctx.set_line_width(line_width);

		let (ux, uy) = (dx / dist, dy / dist);
		ctx.begin_path();
		ctx.move_to(x1 + ux * NODE_RADIUS, y1 + uy * NODE_RADIUS);
		ctx.line_to(
			x2 - ux * (NODE_RADIUS + arrow_size),
			y2 - uy * (NODE_RADIUS + arrow_size),
		);
		ctx.stroke();

		// Arrowhead at the dependent task.
		ctx.set_fill_style_str(&format!("rgba(150, 170, 190, {alpha})"));
		let (tip_x, tip_y) = (x2 - ux * NODE_RADIUS, y2 - uy * NODE_RADIUS);
		let (back_x, back_y) = (tip_x - ux * arrow_size, tip_y - uy * arrow_size);
		let (px, py) = (-uy * arrow_size * 0.5, ux * arrow_size * 0.5);
		ctx.begin_path();
		ctx.move_to(tip_x, tip_y);
		ctx.line_to(back_x + px, back_y + py);
		ctx.line_to(back_x - px, back_y - py);
		ctx.close_path();
		ctx.fill();
	});
}

fn draw_nodes(state: &DepsGraphState, ctx: &CanvasRenderingContext2d) {
	let k = state.transform.k;

	state.graph.visit_nodes(|node| {
		let paint = &node.data.user_data;
		let (x, y) = (node.x() as f64, node.y() as f64);

		if paint.outside {
			ctx.set_global_alpha(0.35);
		}
		ctx.begin_path();
		let _ = ctx.arc(x, y, NODE_RADIUS, 0.0, 2.0 * PI);
		ctx.set_fill_style_str(&paint.color);
		ctx.fill();
		ctx.set_global_alpha(1.0);

		if paint.outside {
			// Referenced but not loaded: dashed outline.
			let _ = ctx.set_line_dash(&js_sys::Array::of2(
				&JsValue::from_f64(3.0 / k),
				&JsValue::from_f64(3.0 / k),
			));
			ctx.set_stroke_style_str("rgba(255, 255, 255, 0.4)");
			ctx.set_line_width(1.0 / k);
			ctx.begin_path();
			let _ = ctx.arc(x, y, NODE_RADIUS + 1.5 / k, 0.0, 2.0 * PI);
			ctx.stroke();
			let _ = ctx.set_line_dash(&js_sys::Array::new());
		}

		if paint.focus {
			ctx.set_stroke_style_str("rgba(255, 255, 255, 0.9)");
			ctx.set_line_width(2.0 / k);
			ctx.begin_path();
			let _ = ctx.arc(x, y, NODE_RADIUS + 3.0 / k, 0.0, 2.0 * PI);
			ctx.stroke();
		}

		if !paint.label.is_empty() {
			let alpha = if paint.outside { 0.5 } else { 0.85 };
			ctx.set_fill_style_str(&format!("rgba(255, 255, 255, {alpha})"));
			ctx.set_font(&format!("{}px sans-serif", 11.0 / k.max(0.5)));
			let _ = ctx.fill_text(&paint.label, x + NODE_RADIUS + 4.0, y + 3.0);
		}
	});
}
