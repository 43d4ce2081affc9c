use crate::error::GraphError;
use crate::graph::{GraphNode, NodeId, Vector};
use crate::input::NodeGesture;
use crate::layout::Layout;
use crate::options::{GraphConfig, NodeShape};

/// Drawable for one graph node.
///
/// `position` is the transform last pushed from the layout, which stays the owner of
/// the value.
#[derive(Clone, Debug)]
pub struct NodeDrawable {
	pub id: NodeId,
	pub kind: String,
	/// Label after the configured transform; `None` when absent or empty.
	pub label: Option<String>,
	pub target: bool,
	pub gesture: NodeGesture,
	has_icon: bool,
	position: Vector,
}

impl NodeDrawable {
	pub fn new(node: &GraphNode, config: &GraphConfig) -> Self {
		let label = node.data.label.as_deref().and_then(|label| {
			let label = match &config.options.label_transform {
				Some(transform) => transform.apply(label),
				None => label.to_owned(),
			};
			(!label.is_empty()).then_some(label)
		});
		Self {
			id: node.id.clone(),
			kind: node.data.kind.clone(),
			label,
			target: node.data.is_target(),
			gesture: NodeGesture::Idle,
			has_icon: config.has_icon(&node.data.kind),
			position: Vector::ZERO,
		}
	}

	/// Pulls the current position from the layout.
	pub fn update(&mut self, layout: &dyn Layout) -> Result<(), GraphError> {
		self.position = layout.node_position(&self.id)?;
		Ok(())
	}

	pub fn position(&self) -> Vector {
		self.position
	}

	pub fn has_icon(&self) -> bool {
		self.has_icon
	}

	/// Vertical offset of the label center from the node center.
	pub fn label_offset(&self, config: &GraphConfig) -> f64 {
		if self.has_icon {
			config.options.font_size * 5.0 / 12.0
		} else {
			0.0
		}
	}

	/// Vertical offset of the icon center from the node center.
	pub fn icon_offset(&self, config: &GraphConfig) -> f64 {
		if self.label.is_some() {
			-config.options.node_size / 4.5
		} else {
			0.0
		}
	}

	/// Whether the world point `p` falls inside the node shape.
	pub fn contains(&self, p: Vector, config: &GraphConfig) -> bool {
		let d = p - self.position;
		let half = config.options.node_size / 2.0;
		match config.options.shape {
			NodeShape::Circle => d.length() <= half,
			NodeShape::Square | NodeShape::RoundSquare => d.x.abs() <= half && d.y.abs() <= half,
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::graph::NodeData;
	use crate::options::{GraphOptions, NodeType};

	fn node(label: &str) -> GraphNode {
		GraphNode {
			id: NodeId::from("1"),
			data: NodeData {
				kind: "Person".into(),
				label: Some(label.into()),
				target: Some(true),
				position: None,
			},
		}
	}

	#[test]
	fn label_transform_is_applied_once() {
		let config = GraphConfig::new(
			GraphOptions::default().with_label_transform(|l| l.to_uppercase()),
		);
		let drawable = NodeDrawable::new(&node("liam"), &config);
		assert_eq!(drawable.label.as_deref(), Some("LIAM"));
		assert!(drawable.target);
	}

	#[test]
	fn empty_transformed_label_is_dropped() {
		let config = GraphConfig::new(GraphOptions::default().with_label_transform(|_| String::new()));
		assert!(NodeDrawable::new(&node("liam"), &config).label.is_none());
	}

	#[test]
	fn hit_test_follows_shape() {
		let circle = GraphConfig::default();
		let drawable = NodeDrawable::new(&node("a"), &circle);
		assert!(drawable.contains(Vector::new(19.0, 0.0), &circle));
		assert!(!drawable.contains(Vector::new(18.0, 18.0), &circle));

		let square = GraphConfig::new(GraphOptions {
			shape: NodeShape::Square,
			..GraphOptions::default()
		});
		assert!(drawable.contains(Vector::new(18.0, 18.0), &square));
	}

	#[test]
	fn icon_moves_label_and_icon_apart() {
		let mut options = GraphOptions::default();
		options.node_types.insert(
			"Person".into(),
			NodeType {
				img: Some("person.png".into()),
				..NodeType::default()
			},
		);
		let config = GraphConfig::new(options);
		let drawable = NodeDrawable::new(&node("a"), &config);
		assert!(drawable.has_icon());
		assert!(drawable.label_offset(&config) > 0.0);
		assert!(drawable.icon_offset(&config) < 0.0);
	}
}
