use std::collections::HashMap;
use std::f64::consts::PI;

use force_graph::{DefaultNodeIdx, EdgeData, ForceGraph, NodeData, SimulationParameters};

use super::{Layout, LinkPosition, Simulation, Springs};
use crate::error::GraphError;
use crate::graph::{ChangeType, GraphChange, GraphModel, GraphNode, LinkId, NodeId, Vector};
use crate::options::GraphConfig;

const FRAME_DT: f32 = 0.016;
const NODE_MASS: f32 = 10.0;
const GOLDEN_ANGLE: f64 = PI * (3.0 - 2.236_067_977_499_79);

/// Simulation parameters scaled for nodes of `node_size` pixels.
fn physics_for_node_size(node_size: f64) -> SimulationParameters {
	let scale = (node_size / 10.0) as f32;
	SimulationParameters {
		force_charge: 150.0 * scale * scale,
		force_spring: 0.05,
		force_max: 100.0 * scale,
		node_speed: 3000.0,
		damping_factor: 0.9,
	}
}

#[derive(Clone, Debug)]
struct Body {
	idx: DefaultNodeIdx,
	pos: Vector,
	pinned: bool,
}

/// Force directed layout over a `force_graph` simulation.
///
/// Positions are mirrored into `bodies` after every step so lookups stay O(1).
pub struct ForceLayout {
	graph: ForceGraph<NodeId, ()>,
	node_size: f64,
	bodies: HashMap<NodeId, Body>,
	order: Vec<NodeId>,
	springs: Springs,
	last_move: f64,
	seeded: usize,
}

impl ForceLayout {
	pub fn new(model: &GraphModel, config: &GraphConfig) -> Self {
		let node_size = config.options.node_size;
		let mut layout = Self {
			graph: ForceGraph::new(physics_for_node_size(node_size)),
			node_size,
			bodies: HashMap::new(),
			order: Vec::new(),
			springs: Springs::default(),
			last_move: 0.0,
			seeded: 0,
		};
		model.for_each_node(|node| layout.init_body(node));
		model.for_each_link(|link| {
			layout.springs.insert(link);
			layout.add_edge(&link.from_id, &link.to_id);
		});
		layout
	}

	/// Next seed position on a golden-angle spiral around the origin.
	fn seed_position(&mut self) -> Vector {
		let n = self.seeded as f64;
		self.seeded += 1;
		let radius = self.node_size * 2.0 * n.sqrt();
		Vector::from_angle(n * GOLDEN_ANGLE) * radius
	}

	fn init_body(&mut self, node: &GraphNode) {
		if self.bodies.contains_key(&node.id) {
			return;
		}
		let pos = match node.data.position {
			Some(pos) => pos,
			None => self.seed_position(),
		};
		let idx = self.graph.add_node(NodeData {
			x: pos.x as f32,
			y: pos.y as f32,
			mass: NODE_MASS,
			is_anchor: false,
			user_data: node.id.clone(),
		});
		self.bodies.insert(
			node.id.clone(),
			Body {
				idx,
				pos,
				pinned: false,
			},
		);
		self.order.push(node.id.clone());
	}

	// self links carry no force
	fn add_edge(&mut self, from: &NodeId, to: &NodeId) {
		if from == to {
			return;
		}
		if let (Some(a), Some(b)) = (self.bodies.get(from), self.bodies.get(to)) {
			let (a, b) = (a.idx, b.idx);
			self.graph.add_edge(a, b, EdgeData::default());
		}
	}

	/// Recreates the simulation from the current bodies and springs.
	fn rebuild(&mut self) {
		self.graph = ForceGraph::new(physics_for_node_size(self.node_size));
		for id in &self.order {
			let Some(body) = self.bodies.get_mut(id) else {
				continue;
			};
			body.idx = self.graph.add_node(NodeData {
				x: body.pos.x as f32,
				y: body.pos.y as f32,
				mass: NODE_MASS,
				is_anchor: body.pinned,
				user_data: id.clone(),
			});
		}
		let springs: Vec<(NodeId, NodeId)> =
			self.springs.iter().map(|(_, ends)| ends.clone()).collect();
		for (from, to) in springs {
			self.add_edge(&from, &to);
		}
	}

	fn body(&self, id: &NodeId) -> Result<&Body, GraphError> {
		self.bodies
			.get(id)
			.ok_or_else(|| GraphError::UnknownNode(id.clone()))
	}
}

impl Layout for ForceLayout {
	fn node_position(&self, id: &NodeId) -> Result<Vector, GraphError> {
		Ok(self.body(id)?.pos)
	}

	fn set_node_position(&mut self, id: &NodeId, pos: Vector) -> Result<(), GraphError> {
		let body = self
			.bodies
			.get_mut(id)
			.ok_or_else(|| GraphError::UnknownNode(id.clone()))?;
		body.pos = pos;
		let idx = body.idx;
		self.graph.visit_nodes_mut(|node| {
			if node.index() == idx {
				node.data.x = pos.x as f32;
				node.data.y = pos.y as f32;
			}
		});
		Ok(())
	}

	fn link_position(&self, id: LinkId) -> Result<LinkPosition, GraphError> {
		let (from, to) = self.springs.get(id)?;
		Ok(LinkPosition {
			from: self.node_position(from)?,
			to: self.node_position(to)?,
		})
	}

	fn pin_node(&mut self, id: &NodeId, pinned: bool) -> Result<(), GraphError> {
		let body = self
			.bodies
			.get_mut(id)
			.ok_or_else(|| GraphError::UnknownNode(id.clone()))?;
		body.pinned = pinned;
		let idx = body.idx;
		self.graph.visit_nodes_mut(|node| {
			if node.index() == idx {
				node.data.is_anchor = pinned;
			}
		});
		Ok(())
	}

	fn is_node_pinned(&self, id: &NodeId) -> bool {
		self.bodies.get(id).is_some_and(|body| body.pinned)
	}

	fn apply_changes(&mut self, changes: &[GraphChange]) {
		let mut removed = false;
		for change in changes {
			match change.change_type {
				ChangeType::Add => {
					if let Some(node) = change.node() {
						self.init_body(node);
					}
					if let Some(link) = change.link() {
						self.springs.insert(link);
						if !removed {
							self.add_edge(&link.from_id, &link.to_id);
						}
					}
				}
				ChangeType::Remove => {
					if let Some(node) = change.node() {
						self.bodies.remove(&node.id);
						self.order.retain(|id| *id != node.id);
					}
					if let Some(link) = change.link() {
						self.springs.remove(link.id);
					}
					removed = true;
				}
				ChangeType::Update => {}
			}
		}
		if removed {
			self.rebuild();
		}
	}

	fn simulation(&mut self) -> Option<&mut dyn Simulation> {
		Some(self)
	}

	fn is_simulated(&self) -> bool {
		true
	}
}

impl Simulation for ForceLayout {
	fn step(&mut self) {
		self.graph.update(FRAME_DT);

		let mut total = 0.0;
		let mut diverged = Vec::new();
		let bodies = &mut self.bodies;
		self.graph.visit_nodes(|node| {
			let Some(body) = bodies.get_mut(&node.data.user_data) else {
				return;
			};
			let next = Vector::new(node.x() as f64, node.y() as f64);
			if next.x.is_finite() && next.y.is_finite() {
				total += body.pos.distance(next);
				body.pos = next;
			} else {
				diverged.push((body.idx, body.pos));
			}
		});
		// coincident bodies can produce NaN forces; keep the last good position
		for (idx, pos) in diverged {
			self.graph.visit_nodes_mut(|node| {
				if node.index() == idx {
					node.data.x = pos.x as f32;
					node.data.y = pos.y as f32;
				}
			});
		}
		self.last_move = total;
	}

	fn last_move(&self) -> f64 {
		self.last_move
	}
}
