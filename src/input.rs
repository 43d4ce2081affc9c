//! Pointer and wheel routing: node drag and tap, stage pan and tap, zoom to cursor.

use crate::animation::FrameLoop;
use crate::error::GraphError;
use crate::events::{GraphEvent, NodeEventDetail, StageEventDetail};
use crate::graph::{GraphModel, NodeId, Vector};
use crate::layout::Layout;
use crate::options::GraphConfig;
use crate::scene::Scene;
use crate::viewport::ViewTransform;

/// Screen distance a press must travel before it counts as a drag.
pub const DRAG_THRESHOLD: f64 = 3.0;

/// Relative scale change per wheel notch.
pub const ZOOM_STEP: f64 = 0.1;

/// Mouse button behind a pointer sample.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PointerButton {
	/// Usually the left button, or a touch contact.
	Primary,
	/// Usually the right button.
	Secondary,
	/// Middle and auxiliary buttons. Ignored.
	Other,
}

impl PointerButton {
	/// Maps a DOM `MouseEvent.button` value.
	pub fn from_dom(button: i16) -> Self {
		match button {
			0 => Self::Primary,
			2 => Self::Secondary,
			_ => Self::Other,
		}
	}
}

/// One pointer sample.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PointerInput {
	/// Position relative to the canvas.
	pub position: Vector,
	/// Position in client (viewport) coordinates, reported in events.
	pub client: Vector,
	/// Button that changed state, for down and up samples.
	pub button: PointerButton,
	/// Whether the primary button is down during this sample.
	pub primary_held: bool,
}

/// Gesture state of a single node drawable.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub enum NodeGesture {
	#[default]
	Idle,
	Pressed {
		button: PointerButton,
		origin: Vector,
	},
	Dragging,
}

#[derive(Clone, Debug, PartialEq)]
struct StagePan {
	button: PointerButton,
	origin: Vector,
	last: Vector,
	dragging: bool,
}

#[derive(Clone, Debug, PartialEq)]
enum Press {
	Node(NodeId),
	Link,
	Stage(StagePan),
}

/// Borrowed view of everything a gesture may touch.
pub struct InputContext<'a> {
	pub model: &'a GraphModel,
	pub scene: &'a mut Scene,
	pub layout: &'a mut dyn Layout,
	pub viewport: &'a mut ViewTransform,
	pub frames: &'a mut FrameLoop,
	pub config: &'a GraphConfig,
}

impl InputContext<'_> {
	fn stage_detail(&self, client: Vector) -> StageEventDetail {
		StageEventDetail {
			x: client.x,
			y: client.y,
			scale: self.viewport.k,
		}
	}
}

/// Tracks the press in progress, if any, and turns pointer samples into gestures.
#[derive(Debug, Default)]
pub struct PointerRouter {
	active: Option<Press>,
}

impl PointerRouter {
	pub fn pointer_down(&mut self, ctx: &mut InputContext<'_>, input: &PointerInput) {
		if self.active.is_some() || input.button == PointerButton::Other {
			return;
		}
		let world = ctx.viewport.screen_to_graph(input.position);
		let press = if let Some(id) = ctx.scene.node_at(world, ctx.config) {
			if let Some(node) = ctx.scene.node_mut(&id) {
				node.gesture = NodeGesture::Pressed {
					button: input.button,
					origin: input.position,
				};
			}
			Press::Node(id)
		} else if ctx.scene.link_at(world).is_some() {
			Press::Link
		} else {
			Press::Stage(StagePan {
				button: input.button,
				origin: input.position,
				last: input.position,
				dragging: false,
			})
		};
		self.active = Some(press);
	}

	pub fn pointer_move(
		&mut self,
		ctx: &mut InputContext<'_>,
		input: &PointerInput,
	) -> Result<Vec<GraphEvent>, GraphError> {
		match &mut self.active {
			Some(Press::Node(id)) => {
				let id = &id.clone();
				let Some(node) = ctx.scene.node_mut(id) else {
					self.active = None;
					return Ok(Vec::new());
				};
				match node.gesture {
					NodeGesture::Pressed {
						button: PointerButton::Primary,
						origin,
					} if input.primary_held && origin.distance(input.position) > DRAG_THRESHOLD => {
						node.gesture = NodeGesture::Dragging;
						ctx.layout.pin_node(id, true)?;
					}
					NodeGesture::Dragging if input.primary_held => {}
					_ => return Ok(Vec::new()),
				}
				let world = ctx.viewport.screen_to_graph(input.position);
				ctx.layout.set_node_position(id, world)?;
				ctx.frames.on_drag();
				Ok(Vec::new())
			}
			Some(Press::Stage(pan)) => {
				if pan.button != PointerButton::Primary || !input.primary_held {
					return Ok(Vec::new());
				}
				if !pan.dragging {
					if pan.origin.distance(input.position) <= DRAG_THRESHOLD {
						return Ok(Vec::new());
					}
					pan.dragging = true;
				}
				let delta = input.position - pan.last;
				pan.last = input.position;
				ctx.viewport.pan_by(delta);
				Ok(vec![GraphEvent::GraphDrag(ctx.stage_detail(input.client))])
			}
			Some(Press::Link) | None => Ok(Vec::new()),
		}
	}

	pub fn pointer_up(&mut self, ctx: &mut InputContext<'_>, input: &PointerInput) -> Vec<GraphEvent> {
		match self.active.take() {
			Some(Press::Node(id)) => {
				let Some(node) = ctx.scene.node_mut(&id) else {
					return Vec::new();
				};
				let gesture = std::mem::take(&mut node.gesture);
				if !matches!(gesture, NodeGesture::Pressed { .. }) {
					return Vec::new();
				}
				let Some(graph_node) = ctx.model.get_node(&id) else {
					return Vec::new();
				};
				let detail = NodeEventDetail {
					id,
					data: graph_node.data.clone(),
					x: input.client.x,
					y: input.client.y,
				};
				match input.button {
					PointerButton::Primary => vec![GraphEvent::NodeTap(detail)],
					PointerButton::Secondary => vec![GraphEvent::NodeRightTap(detail)],
					PointerButton::Other => Vec::new(),
				}
			}
			Some(Press::Stage(pan)) if !pan.dragging => {
				let detail = ctx.stage_detail(input.client);
				match input.button {
					PointerButton::Primary => vec![GraphEvent::BgTap(detail)],
					PointerButton::Secondary => vec![GraphEvent::BgRightTap(detail)],
					PointerButton::Other => Vec::new(),
				}
			}
			_ => Vec::new(),
		}
	}

	/// Abandons the press in progress without emitting anything.
	pub fn pointer_cancel(&mut self, ctx: &mut InputContext<'_>) {
		if let Some(Press::Node(id)) = self.active.take() {
			if let Some(node) = ctx.scene.node_mut(&id) {
				node.gesture = NodeGesture::Idle;
			}
		}
	}

	/// Forgets a press on a node that was removed from the graph.
	pub fn release(&mut self, id: &NodeId) {
		if matches!(&self.active, Some(Press::Node(pressed)) if pressed == id) {
			self.active = None;
		}
	}

	/// Zooms about the canvas point `position`. A zero `delta_y` does nothing.
	pub fn wheel(
		&mut self,
		ctx: &mut InputContext<'_>,
		position: Vector,
		client: Vector,
		delta_y: f64,
	) -> Option<GraphEvent> {
		if delta_y == 0.0 || !delta_y.is_finite() {
			return None;
		}
		let direction = if delta_y < 0.0 { 1.0 } else { -1.0 };
		let options = &ctx.config.options;
		ctx.viewport
			.zoom_at(position, 1.0 + direction * ZOOM_STEP, options.min_zoom, options.max_zoom);
		Some(GraphEvent::GraphZoom(ctx.stage_detail(client)))
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn dom_buttons() {
		assert_eq!(PointerButton::from_dom(0), PointerButton::Primary);
		assert_eq!(PointerButton::from_dom(1), PointerButton::Other);
		assert_eq!(PointerButton::from_dom(2), PointerButton::Secondary);
	}

	#[test]
	fn gesture_starts_idle() {
		assert_eq!(NodeGesture::default(), NodeGesture::Idle);
	}
}
