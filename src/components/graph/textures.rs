use std::collections::HashMap;

use log::{debug, warn};
use wasm_bindgen::prelude::*;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, HtmlImageElement};

use crate::options::{GraphOptions, css_color};

struct Icon {
	image: HtmlImageElement,
	tinted: Option<HtmlCanvasElement>,
	_on_error: Closure<dyn FnMut()>,
}

/// Node-type icons, loaded once per graph. Icons that fail to load are simply not drawn.
#[derive(Default)]
pub struct TextureStore {
	icons: HashMap<String, Icon>,
	tint: Option<u32>,
}

impl TextureStore {
	pub fn load(options: &GraphOptions) -> Self {
		let mut icons = HashMap::new();
		for (kind, node_type) in &options.node_types {
			let Some(src) = &node_type.img else {
				continue;
			};
			let image = match HtmlImageElement::new() {
				Ok(image) => image,
				Err(err) => {
					warn!("could not create image for node type {kind}: {err:?}");
					continue;
				}
			};
			let (kind_err, src_err) = (kind.clone(), src.clone());
			let on_error = Closure::<dyn FnMut()>::new(move || {
				warn!("icon for node type {kind_err} failed to load from {src_err}");
			});
			image.set_onerror(Some(on_error.as_ref().unchecked_ref()));
			image.set_src(src);
			icons.insert(
				kind.clone(),
				Icon {
					image,
					tinted: None,
					_on_error: on_error,
				},
			);
		}
		debug!("loading {} node icons", icons.len());
		Self {
			icons,
			tint: options.node_icon_color,
		}
	}

	/// Draws the icon of `kind` centered on `(x, y)` if it has finished loading.
	pub fn draw(&mut self, ctx: &CanvasRenderingContext2d, kind: &str, x: f64, y: f64, size: f64) {
		let Some(icon) = self.icons.get_mut(kind) else {
			return;
		};
		if !icon.image.complete() || icon.image.natural_width() == 0 {
			return;
		}
		let (left, top) = (x - size / 2.0, y - size / 2.0);
		match self.tint {
			Some(color) => {
				if icon.tinted.is_none() {
					icon.tinted = tinted_copy(&icon.image, color);
				}
				if let Some(canvas) = &icon.tinted {
					let _ = ctx.draw_image_with_html_canvas_element_and_dw_and_dh(
						canvas, left, top, size, size,
					);
				}
			}
			None => {
				let _ = ctx.draw_image_with_html_image_element_and_dw_and_dh(
					&icon.image,
					left,
					top,
					size,
					size,
				);
			}
		}
	}
}

/// Offscreen copy of `image` with every opaque pixel painted `color`.
fn tinted_copy(image: &HtmlImageElement, color: u32) -> Option<HtmlCanvasElement> {
	let document = web_sys::window()?.document()?;
	let canvas: HtmlCanvasElement = document.create_element("canvas").ok()?.dyn_into().ok()?;
	let (w, h) = (image.natural_width(), image.natural_height());
	canvas.set_width(w);
	canvas.set_height(h);
	let ctx: CanvasRenderingContext2d = canvas.get_context("2d").ok()??.dyn_into().ok()?;
	ctx.draw_image_with_html_image_element(image, 0.0, 0.0).ok()?;
	let _ = ctx.set_global_composite_operation("source-in");
	ctx.set_fill_style_str(&css_color(color));
	ctx.fill_rect(0.0, 0.0, f64::from(w), f64::from(h));
	Some(canvas)
}
