//! High-level events raised to the hosting application.

use serde::Serialize;

use crate::error::GraphError;
use crate::graph::{NodeData, NodeId};

/// Payload of node events.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct NodeEventDetail {
	/// The node under the pointer.
	pub id: NodeId,
	/// Its data at the time of the event.
	pub data: NodeData,
	/// Pointer client coordinates.
	pub x: f64,
	/// See `x`.
	pub y: f64,
}

/// Payload of background, pan and zoom events.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct StageEventDetail {
	/// Pointer client coordinates.
	pub x: f64,
	/// See `x`.
	pub y: f64,
	/// Current viewport scale.
	pub scale: f64,
}

/// Event delivered as a bubbling DOM `CustomEvent`; serializes to its detail payload.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(untagged)]
pub enum GraphEvent {
	/// `nodetap`: primary press and release on a node without dragging.
	NodeTap(NodeEventDetail),
	/// `noderighttap`: secondary press and release on a node.
	NodeRightTap(NodeEventDetail),
	/// `bgtap`: primary press and release on the background without panning.
	BgTap(StageEventDetail),
	/// `bgrighttap`: secondary press and release on the background.
	BgRightTap(StageEventDetail),
	/// `graphdrag`: the background was panned.
	GraphDrag(StageEventDetail),
	/// `graphzoom`: the wheel changed the scale.
	GraphZoom(StageEventDetail),
}

impl GraphEvent {
	/// DOM event type.
	pub fn name(&self) -> &'static str {
		match self {
			Self::NodeTap(_) => "nodetap",
			Self::NodeRightTap(_) => "noderighttap",
			Self::BgTap(_) => "bgtap",
			Self::BgRightTap(_) => "bgrighttap",
			Self::GraphDrag(_) => "graphdrag",
			Self::GraphZoom(_) => "graphzoom",
		}
	}

	/// The `detail` payload as JSON text.
	pub fn detail_json(&self) -> Result<String, GraphError> {
		Ok(serde_json::to_string(self)?)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn node_tap_carries_id_data_and_client_position() {
		let event = GraphEvent::NodeTap(NodeEventDetail {
			id: NodeId::from("3"),
			data: NodeData {
				kind: "Person".into(),
				label: Some("Jonathan".into()),
				target: None,
				position: None,
			},
			x: 10.0,
			y: 20.0,
		});
		assert_eq!(event.name(), "nodetap");
		assert_eq!(
			event.detail_json().unwrap(),
			r#"{"id":"3","data":{"type":"Person","label":"Jonathan"},"x":10.0,"y":20.0}"#
		);
	}

	#[test]
	fn zoom_carries_position_and_scale() {
		let event = GraphEvent::GraphZoom(StageEventDetail {
			x: 1.0,
			y: 2.0,
			scale: 1.1,
		});
		assert_eq!(event.name(), "graphzoom");
		assert_eq!(event.detail_json().unwrap(), r#"{"x":1.0,"y":2.0,"scale":1.1}"#);
	}
}
