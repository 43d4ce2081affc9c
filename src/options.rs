//! User options and the geometry derived from them.

use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use serde::Deserialize;

use crate::error::GraphError;

const DEFAULT_MIN_ZOOM: f64 = 0.1;
const DEFAULT_MAX_ZOOM: f64 = 10.0;

/// Outline drawn for every node.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum NodeShape {
	/// Circle of diameter `node_size`.
	#[default]
	Circle,
	/// Square with side `node_size`.
	Square,
	/// Square with corners rounded to a tenth of the side.
	RoundSquare,
}

/// How node positions are produced.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum LayoutMode {
	/// Force-directed simulation.
	#[default]
	Force,
	/// Positions taken from node data, never simulated.
	Fixed,
}

/// Per node-type presentation.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeType {
	/// Human readable description.
	#[serde(default)]
	pub desc: String,
	/// Caption for the id of nodes of this type.
	pub id_label: Option<String>,
	/// Icon image url.
	pub img: Option<String>,
}

/// Rewrites a node label before it is drawn.
#[derive(Clone)]
pub struct LabelTransform(pub Rc<dyn Fn(&str) -> String>);

impl LabelTransform {
	/// Wraps a label mapping.
	pub fn new(f: impl Fn(&str) -> String + 'static) -> Self {
		Self(Rc::new(f))
	}

	/// Maps `label`.
	pub fn apply(&self, label: &str) -> String {
		(self.0)(label)
	}
}

impl fmt::Debug for LabelTransform {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str("LabelTransform(..)")
	}
}

/// Options recognized by the graph. Colors are `0xRRGGBB`.
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GraphOptions {
	/// Canvas fill.
	pub background_color: u32,
	/// Label fill.
	pub font_color: u32,
	/// CSS font family of labels.
	pub font_family: String,
	/// Label size in pixels.
	pub font_size: f64,
	/// Label outline of non-target nodes.
	pub font_stroke_color: u32,
	/// Applied to every label before drawing. Not read from JSON.
	#[serde(skip)]
	pub label_transform: Option<LabelTransform>,
	/// Fill of non-target nodes.
	pub node_color: u32,
	/// Tint for node icons; icons keep their own colors when unset.
	pub node_icon_color: Option<u32>,
	/// Node diameter or side. Every other node and link dimension derives from it.
	pub node_size: f64,
	/// Presentation per node `type`.
	pub node_types: HashMap<String, NodeType>,
	/// Node outline.
	pub shape: NodeShape,
	/// Fill and label outline of target nodes.
	pub target_color: u32,
	/// Position source.
	pub layout: LayoutMode,
	/// Smallest viewport scale.
	pub min_zoom: f64,
	/// Largest viewport scale.
	pub max_zoom: f64,
}

impl Default for GraphOptions {
	fn default() -> Self {
		Self {
			background_color: 0xf5f5f5,
			font_color: 0xffffff,
			font_family: "Arial".into(),
			font_size: 12.0,
			font_stroke_color: 0x0099ff,
			label_transform: None,
			node_color: 0x0099ff,
			node_icon_color: None,
			node_size: 40.0,
			node_types: HashMap::new(),
			shape: NodeShape::Circle,
			target_color: 0x9f9600,
			layout: LayoutMode::Force,
			min_zoom: DEFAULT_MIN_ZOOM,
			max_zoom: DEFAULT_MAX_ZOOM,
		}
	}
}

impl GraphOptions {
	/// Reads options from JSON. Missing fields keep their defaults.
	pub fn from_json(text: &str) -> Result<Self, GraphError> {
		Ok(serde_json::from_str(text)?)
	}

	/// Sets the label transform.
	pub fn with_label_transform(mut self, f: impl Fn(&str) -> String + 'static) -> Self {
		self.label_transform = Some(LabelTransform::new(f));
		self
	}
}

/// Options plus the geometry constants computed once from them.
#[derive(Clone, Debug)]
pub struct GraphConfig {
	/// The options, with the zoom range made usable.
	pub options: GraphOptions,
	/// Half the node size.
	pub node_radius: f64,
	/// Arrowhead length.
	pub arrow_size: f64,
	/// Radius of the dot that marks a self link.
	pub self_link_radius: f64,
	/// Horizontal distance from a node to the start of its self link.
	pub self_link_distance: f64,
	/// Width of the clickable band around a link.
	pub line_hit_width: f64,
	/// Icon edge length.
	pub node_icon_size: f64,
	/// Arrow color picked to contrast the background.
	pub arrow_color: u32,
}

impl GraphConfig {
	/// Derives the geometry from `options`.
	///
	/// A zoom range that is not finite, not positive or inverted falls back to the
	/// default `[0.1, 10]`.
	pub fn new(mut options: GraphOptions) -> Self {
		let (min_zoom, max_zoom) = zoom_range(options.min_zoom, options.max_zoom);
		options.min_zoom = min_zoom;
		options.max_zoom = max_zoom;
		let size = options.node_size;
		let arrow_color = if luma(options.background_color) > 0.5 {
			0x555555
		} else {
			0xaaaaaa
		};
		Self {
			node_radius: size / 2.0,
			arrow_size: size / 4.0,
			self_link_radius: size / 8.0,
			self_link_distance: size,
			line_hit_width: size / 8.0,
			node_icon_size: size / 2.0,
			arrow_color,
			options,
		}
	}

	/// Whether nodes of `kind` have an icon configured.
	pub fn has_icon(&self, kind: &str) -> bool {
		self.options
			.node_types
			.get(kind)
			.is_some_and(|t| t.img.is_some())
	}
}

impl Default for GraphConfig {
	fn default() -> Self {
		Self::new(GraphOptions::default())
	}
}

fn zoom_range(min: f64, max: f64) -> (f64, f64) {
	if min.is_finite() && max.is_finite() && min > 0.0 && min <= max {
		(min, max)
	} else {
		(DEFAULT_MIN_ZOOM, DEFAULT_MAX_ZOOM)
	}
}

/// Relative luminance in `[0, 1]`.
fn luma(color: u32) -> f64 {
	let (r, g, b) = (
		f64::from((color >> 16) & 0xff),
		f64::from((color >> 8) & 0xff),
		f64::from(color & 0xff),
	);
	(0.299 * r + 0.587 * g + 0.114 * b) / 255.0
}

/// CSS color string for `0xRRGGBB`.
pub fn css_color(color: u32) -> String {
	format!("#{:06x}", color & 0xff_ffff)
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::graph::Vector;
	use crate::viewport::ViewTransform;

	#[test]
	fn derived_geometry_follows_node_size() {
		let config = GraphConfig::default();
		assert_eq!(config.node_radius, 20.0);
		assert_eq!(config.arrow_size, 10.0);
		assert_eq!(config.self_link_radius, 5.0);
		assert_eq!(config.self_link_distance, 40.0);
		assert_eq!(config.line_hit_width, 5.0);
		assert_eq!(config.node_icon_size, 20.0);
	}

	#[test]
	fn arrow_color_contrasts_background() {
		assert_eq!(GraphConfig::default().arrow_color, 0x555555);
		let dark = GraphOptions {
			background_color: 0x1a1a2e,
			..GraphOptions::default()
		};
		assert_eq!(GraphConfig::new(dark).arrow_color, 0xaaaaaa);
	}

	#[test]
	fn options_from_json_keep_defaults() {
		let options =
			GraphOptions::from_json(r#"{"nodeSize": 20, "shape": "roundSquare", "layout": "fixed"}"#)
				.unwrap();
		assert_eq!(options.node_size, 20.0);
		assert_eq!(options.shape, NodeShape::RoundSquare);
		assert_eq!(options.layout, LayoutMode::Fixed);
		assert_eq!(options.font_family, "Arial");
	}

	#[test]
	fn inverted_zoom_range_falls_back_to_default() {
		let options = GraphOptions::from_json(r#"{"minZoom": 5, "maxZoom": 1}"#).unwrap();
		let config = GraphConfig::new(options);
		assert_eq!(config.options.min_zoom, 0.1);
		assert_eq!(config.options.max_zoom, 10.0);

		let mut view = ViewTransform::default();
		view.zoom_at(
			Vector::new(10.0, 10.0),
			100.0,
			config.options.min_zoom,
			config.options.max_zoom,
		);
		assert_eq!(view.k, 10.0);
	}

	#[test]
	fn unusable_zoom_bounds_fall_back_to_default() {
		for (min, max) in [(f64::NAN, 4.0), (0.5, f64::INFINITY), (0.0, 4.0), (-1.0, 4.0)] {
			let options = GraphOptions {
				min_zoom: min,
				max_zoom: max,
				..GraphOptions::default()
			};
			let config = GraphConfig::new(options);
			assert_eq!((config.options.min_zoom, config.options.max_zoom), (0.1, 10.0));
		}
	}

	#[test]
	fn valid_zoom_range_is_kept() {
		let options = GraphOptions::from_json(r#"{"minZoom": 0.5, "maxZoom": 0.5}"#).unwrap();
		let config = GraphConfig::new(options);
		assert_eq!((config.options.min_zoom, config.options.max_zoom), (0.5, 0.5));
	}

	#[test]
	fn label_transform_applies() {
		let options = GraphOptions::default().with_label_transform(|l| {
			l.split(' ').next().unwrap_or_default().to_owned()
		});
		let t = options.label_transform.unwrap();
		assert_eq!(t.apply("Liam Wright"), "Liam");
	}

	#[test]
	fn css_colors_are_zero_padded() {
		assert_eq!(css_color(0x0099ff), "#0099ff");
	}
}
