use std::f64::consts::PI;

use web_sys::CanvasRenderingContext2d;

use super::state::GraphState;
use super::textures::TextureStore;
use crate::graph::Vector;
use crate::options::{GraphConfig, NodeShape, css_color};
use crate::scene::{LinkGroup, NodeDrawable, Scene};

const LINK_STROKE: &str = "rgba(0, 0, 0, 0.3)";
const LABEL_SHADOW: &str = "rgba(0, 0, 0, 0.6)";
const LABEL_SHADOW_DISTANCE: f64 = 2.0;

pub fn render(state: &GraphState, textures: &mut TextureStore, ctx: &CanvasRenderingContext2d) {
	let config = &state.config;
	ctx.set_fill_style_str(&css_color(config.options.background_color));
	ctx.fill_rect(0.0, 0.0, state.width, state.height);
	ctx.save();
	let _ = ctx.translate(state.transform.x, state.transform.y);
	let _ = ctx.scale(state.transform.k, state.transform.k);
	draw_links(state.scene(), config, ctx);
	draw_nodes(state.scene(), config, textures, ctx);
	ctx.restore();
}

fn draw_links(scene: &Scene, config: &GraphConfig, ctx: &CanvasRenderingContext2d) {
	let arrow_color = css_color(config.arrow_color);
	ctx.set_line_width(1.0);
	ctx.set_stroke_style_str(LINK_STROKE);
	for group in scene.links() {
		draw_link(group, &arrow_color, ctx);
	}
}

/// Line, then the self-link indicator, then one arrowhead per edge.
fn draw_link(group: &LinkGroup, arrow_color: &str, ctx: &CanvasRenderingContext2d) {
	if let Some((from, to)) = group.line() {
		ctx.begin_path();
		ctx.move_to(from.x, from.y);
		ctx.line_to(to.x, to.y);
		ctx.stroke();
	}
	ctx.set_fill_style_str(arrow_color);
	if let Some((center, radius)) = group.indicator() {
		ctx.begin_path();
		let _ = ctx.arc(center.x, center.y, radius, 0.0, 2.0 * PI);
		ctx.fill();
	}
	for arrow in group.arrows() {
		let [left, right] = arrow.wings;
		ctx.begin_path();
		ctx.move_to(arrow.tip.x, arrow.tip.y);
		ctx.line_to(left.x, left.y);
		ctx.line_to(right.x, right.y);
		ctx.close_path();
		ctx.fill();
	}
}

fn draw_nodes(
	scene: &Scene,
	config: &GraphConfig,
	textures: &mut TextureStore,
	ctx: &CanvasRenderingContext2d,
) {
	let options = &config.options;
	let (node_color, target_color) = (css_color(options.node_color), css_color(options.target_color));
	let (font_color, stroke_color) = (css_color(options.font_color), css_color(options.font_stroke_color));
	ctx.set_font(&format!("{}px {}", options.font_size, options.font_family));
	ctx.set_text_align("center");
	ctx.set_text_baseline("middle");

	for node in scene.nodes() {
		let p = node.position();
		ctx.set_fill_style_str(if node.target { &target_color } else { &node_color });
		trace_shape(ctx, p, config);
		ctx.fill();

		if node.has_icon() {
			textures.draw(
				ctx,
				&node.kind,
				p.x,
				p.y + node.icon_offset(config),
				config.node_icon_size,
			);
		}
		let stroke = if node.target { &target_color } else { &stroke_color };
		draw_label(node, config, &font_color, stroke, ctx);
	}
}

fn trace_shape(ctx: &CanvasRenderingContext2d, p: Vector, config: &GraphConfig) {
	let size = config.options.node_size;
	let half = size / 2.0;
	let (x, y) = (p.x - half, p.y - half);
	ctx.begin_path();
	match config.options.shape {
		NodeShape::Circle => {
			let _ = ctx.arc(p.x, p.y, half, 0.0, 2.0 * PI);
		}
		NodeShape::Square => ctx.rect(x, y, size, size),
		NodeShape::RoundSquare => {
			let r = size * 0.1;
			ctx.move_to(x + r, y);
			let _ = ctx.arc_to(x + size, y, x + size, y + size, r);
			let _ = ctx.arc_to(x + size, y + size, x, y + size, r);
			let _ = ctx.arc_to(x, y + size, x, y, r);
			let _ = ctx.arc_to(x, y, x + size, y, r);
			ctx.close_path();
		}
	}
}

fn draw_label(
	node: &NodeDrawable,
	config: &GraphConfig,
	fill: &str,
	stroke: &str,
	ctx: &CanvasRenderingContext2d,
) {
	let Some(label) = &node.label else {
		return;
	};
	let p = node.position();
	let y = p.y + node.label_offset(config);
	ctx.save();
	ctx.set_shadow_color(LABEL_SHADOW);
	ctx.set_shadow_offset_x(LABEL_SHADOW_DISTANCE * (PI / 6.0).cos());
	ctx.set_shadow_offset_y(LABEL_SHADOW_DISTANCE * (PI / 6.0).sin());
	ctx.set_line_width(1.0);
	ctx.set_stroke_style_str(stroke);
	let _ = ctx.stroke_text(label, p.x, y);
	ctx.set_fill_style_str(fill);
	let _ = ctx.fill_text(label, p.x, y);
	ctx.restore();
}
