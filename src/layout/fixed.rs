use std::collections::HashMap;

use super::{Layout, LinkPosition, Springs};
use crate::error::GraphError;
use crate::graph::{ChangeType, GraphChange, GraphModel, GraphNode, LinkId, NodeId, Vector};

/// Places every node at the position carried in its data and never moves it.
#[derive(Debug, Default)]
pub struct FixedLayout {
	bodies: HashMap<NodeId, Vector>,
	springs: Springs,
}

impl FixedLayout {
	pub fn new(graph: &GraphModel) -> Self {
		let mut layout = Self::default();
		graph.for_each_node(|node| layout.init_body(node));
		graph.for_each_link(|link| layout.springs.insert(link));
		layout
	}

	fn init_body(&mut self, node: &GraphNode) {
		self.bodies
			.entry(node.id.clone())
			.or_insert_with(|| node.data.position.unwrap_or(Vector::ZERO));
	}
}

impl Layout for FixedLayout {
	fn node_position(&self, id: &NodeId) -> Result<Vector, GraphError> {
		self.bodies
			.get(id)
			.copied()
			.ok_or_else(|| GraphError::UnknownNode(id.clone()))
	}

	fn set_node_position(&mut self, id: &NodeId, pos: Vector) -> Result<(), GraphError> {
		let body = self
			.bodies
			.get_mut(id)
			.ok_or_else(|| GraphError::UnknownNode(id.clone()))?;
		*body = pos;
		Ok(())
	}

	fn link_position(&self, id: LinkId) -> Result<LinkPosition, GraphError> {
		let (from, to) = self.springs.get(id)?;
		Ok(LinkPosition {
			from: self.node_position(from)?,
			to: self.node_position(to)?,
		})
	}

	fn pin_node(&mut self, _: &NodeId, _: bool) -> Result<(), GraphError> {
		Ok(())
	}

	// every node is externally placed
	fn is_node_pinned(&self, _: &NodeId) -> bool {
		true
	}

	fn apply_changes(&mut self, changes: &[GraphChange]) {
		for change in changes {
			match change.change_type {
				ChangeType::Add => {
					if let Some(node) = change.node() {
						self.init_body(node);
					}
					if let Some(link) = change.link() {
						self.springs.insert(link);
					}
				}
				ChangeType::Remove => {
					if let Some(node) = change.node() {
						self.bodies.remove(&node.id);
					}
					if let Some(link) = change.link() {
						self.springs.remove(link.id);
					}
				}
				ChangeType::Update => {}
			}
		}
	}
}
