//! Layout providers: the single source of truth for node positions.

mod fixed;
mod force;

use std::collections::HashMap;

pub use fixed::FixedLayout;
pub use force::ForceLayout;

use crate::error::GraphError;
use crate::graph::{GraphChange, GraphLink, GraphModel, LinkId, NodeId, Vector};
use crate::options::{GraphConfig, LayoutMode};

/// World positions of both ends of a link.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LinkPosition {
	pub from: Vector,
	pub to: Vector,
}

/// A layout that advances a simulation frame by frame.
pub trait Simulation {
	/// Advances the simulation by one step.
	fn step(&mut self);

	/// Total displacement produced by the most recent step.
	fn last_move(&self) -> f64;
}

/// Position lookup and mutation over the nodes of one [`GraphModel`].
///
/// Positions for unknown ids are errors: callers check the model first.
pub trait Layout {
	fn node_position(&self, id: &NodeId) -> Result<Vector, GraphError>;

	fn set_node_position(&mut self, id: &NodeId, pos: Vector) -> Result<(), GraphError>;

	fn link_position(&self, id: LinkId) -> Result<LinkPosition, GraphError>;

	/// Exempts a node from (or returns it to) simulated movement.
	fn pin_node(&mut self, id: &NodeId, pinned: bool) -> Result<(), GraphError>;

	fn is_node_pinned(&self, id: &NodeId) -> bool;

	/// Tracks bodies and springs for a batch of model changes.
	fn apply_changes(&mut self, changes: &[GraphChange]);

	/// The stepping facet, absent for static layouts.
	fn simulation(&mut self) -> Option<&mut dyn Simulation> {
		None
	}

	/// Whether [`Layout::simulation`] returns a simulation.
	fn is_simulated(&self) -> bool {
		false
	}
}

/// Builds the layout selected by `config` for `graph`.
pub fn create_layout(graph: &GraphModel, config: &GraphConfig) -> Box<dyn Layout> {
	match config.options.layout {
		LayoutMode::Force => Box::new(ForceLayout::new(graph, config)),
		LayoutMode::Fixed => Box::new(FixedLayout::new(graph)),
	}
}

/// Endpoint table shared by the layouts.
#[derive(Debug, Default)]
struct Springs(HashMap<LinkId, (NodeId, NodeId)>);

impl Springs {
	fn insert(&mut self, link: &GraphLink) {
		self.0
			.entry(link.id)
			.or_insert_with(|| (link.from_id.clone(), link.to_id.clone()));
	}

	fn remove(&mut self, id: LinkId) {
		self.0.remove(&id);
	}

	fn get(&self, id: LinkId) -> Result<&(NodeId, NodeId), GraphError> {
		self.0.get(&id).ok_or(GraphError::UnknownLink(id))
	}

	fn iter(&self) -> impl Iterator<Item = (&LinkId, &(NodeId, NodeId))> {
		self.0.iter()
	}
}
