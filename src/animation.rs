//! Per-frame loop and convergence detection for simulated layouts.

use log::{debug, info};

use crate::error::GraphError;
use crate::layout::Layout;
use crate::scene::Scene;

/// Consecutive quiet steps required before the simulation freezes.
pub const STEP_COUNT_LIMIT: u32 = 100;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Convergence {
	Running,
	Frozen,
}

/// What the loop should do with the simulation this frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Tick {
	/// Advance the simulation and refresh drawables.
	Step,
	/// Last convergent frame: pin the targets and stop stepping.
	Freeze,
	/// Nothing to simulate.
	Idle,
}

/// Decaying-patience counter deciding when a simulation has settled.
///
/// A step counts as quiet when its displacement is below `moves_limit`
/// (`round(N^2 * 0.04)` for `N` nodes); any louder step resets the count.
#[derive(Clone, Debug)]
pub struct AnimationControl {
	node_count: usize,
	moves_limit: f64,
	step_count_limit: u32,
	step_counter: u32,
	state: Convergence,
}

impl AnimationControl {
	pub fn new(node_count: usize) -> Self {
		let mut control = Self {
			node_count,
			moves_limit: 0.0,
			step_count_limit: STEP_COUNT_LIMIT,
			step_counter: 0,
			state: Convergence::Running,
		};
		control.calculate();
		control
	}

	fn calculate(&mut self) {
		let n = self.node_count as f64;
		self.moves_limit = (n * n * 0.04).round();
	}

	/// Feeds the displacement of the last step.
	pub fn observe(&mut self, last_move: f64) -> Tick {
		if self.state == Convergence::Frozen {
			return Tick::Idle;
		}
		if last_move < self.moves_limit {
			self.step_counter += 1;
		} else {
			self.step_counter = 0;
		}
		if self.step_counter >= self.step_count_limit {
			self.state = Convergence::Frozen;
			return Tick::Freeze;
		}
		Tick::Step
	}

	/// Restarts the quiet-step count. A frozen controller stays frozen.
	pub fn reset(&mut self) {
		self.step_counter = 0;
	}

	/// Recalculates for a new node count and resumes running.
	pub fn update(&mut self, node_count: usize) {
		self.node_count = node_count;
		self.calculate();
		self.reset();
		self.state = Convergence::Running;
	}
}

/// Drives one loop iteration per display frame: step, convergence check, position refresh.
///
/// Painting happens after [`FrameLoop::tick`] every frame, whatever the layout.
#[derive(Debug, Default)]
pub struct FrameLoop {
	started: bool,
	animation: Option<AnimationControl>,
	needs_refresh: bool,
}

impl FrameLoop {
	/// Starts the loop once. Returns `false` if it was already running.
	pub fn start(&mut self, scene: &mut Scene, layout: &dyn Layout) -> Result<bool, GraphError> {
		if self.started {
			return Ok(false);
		}
		scene.refresh(layout)?;
		if layout.is_simulated() {
			self.animation = Some(AnimationControl::new(scene.node_count()));
		}
		self.started = true;
		info!(
			"renderer started ({} layout)",
			if layout.is_simulated() { "force" } else { "fixed" }
		);
		Ok(true)
	}

	pub fn tick(&mut self, scene: &mut Scene, layout: &mut dyn Layout) -> Result<(), GraphError> {
		if !self.started {
			return Ok(());
		}
		if let Some(control) = &mut self.animation {
			let Some(last_move) = layout.simulation().map(|sim| sim.last_move()) else {
				return Ok(());
			};
			match control.observe(last_move) {
				Tick::Step => {
					if let Some(sim) = layout.simulation() {
						sim.step();
					}
					self.needs_refresh = true;
				}
				Tick::Freeze => {
					for id in scene.targets() {
						layout.pin_node(id, true)?;
					}
					debug!("layout converged, {} targets pinned", scene.targets().len());
				}
				Tick::Idle => {}
			}
		}
		if self.needs_refresh {
			scene.refresh(layout)?;
			self.needs_refresh = false;
		}
		Ok(())
	}

	/// A node was dragged.
	pub fn on_drag(&mut self) {
		if let Some(control) = &mut self.animation {
			control.reset();
		}
		self.needs_refresh = true;
	}

	/// Nodes or links were added or removed.
	pub fn on_topology_change(&mut self, node_count: usize) {
		if let Some(control) = &mut self.animation {
			control.update(node_count);
		}
		self.needs_refresh = true;
	}
}

#[cfg(test)]
mod tests {
	use std::collections::{HashMap, HashSet};

	use super::*;
	use crate::graph::{GraphChange, GraphModel, LinkData, LinkId, NodeData, NodeId, Vector};
	use crate::layout::{FixedLayout, LinkPosition, Simulation};
	use crate::options::GraphConfig;

	/// Simulation with a scripted displacement.
	#[derive(Default)]
	struct ScriptedLayout {
		positions: HashMap<NodeId, Vector>,
		pinned: HashSet<NodeId>,
		last_move: f64,
		steps: usize,
	}

	impl ScriptedLayout {
		fn new(model: &GraphModel) -> Self {
			let mut layout = Self::default();
			model.for_each_node(|n| {
				layout.positions.insert(n.id.clone(), Vector::ZERO);
			});
			layout
		}
	}

	impl Layout for ScriptedLayout {
		fn node_position(&self, id: &NodeId) -> Result<Vector, GraphError> {
			self.positions
				.get(id)
				.copied()
				.ok_or_else(|| GraphError::UnknownNode(id.clone()))
		}

		fn set_node_position(&mut self, id: &NodeId, pos: Vector) -> Result<(), GraphError> {
			self.positions.insert(id.clone(), pos);
			Ok(())
		}

		fn link_position(&self, _: LinkId) -> Result<LinkPosition, GraphError> {
			Ok(LinkPosition {
				from: Vector::ZERO,
				to: Vector::new(1.0, 0.0),
			})
		}

		fn pin_node(&mut self, id: &NodeId, pinned: bool) -> Result<(), GraphError> {
			if pinned {
				self.pinned.insert(id.clone());
			} else {
				self.pinned.remove(id);
			}
			Ok(())
		}

		fn is_node_pinned(&self, id: &NodeId) -> bool {
			self.pinned.contains(id)
		}

		fn apply_changes(&mut self, _: &[GraphChange]) {}

		fn simulation(&mut self) -> Option<&mut dyn Simulation> {
			Some(self)
		}

		fn is_simulated(&self) -> bool {
			true
		}
	}

	impl Simulation for ScriptedLayout {
		fn step(&mut self) {
			self.steps += 1;
		}

		fn last_move(&self) -> f64 {
			self.last_move
		}
	}

	fn ten_nodes() -> GraphModel {
		let mut g = GraphModel::new();
		for i in 0..10 {
			let data = NodeData {
				target: Some(i < 2),
				..NodeData::default()
			};
			g.add_node(NodeId::from(i.to_string()), data);
		}
		g
	}

	#[test]
	fn moves_limit_scales_with_node_count() {
		assert_eq!(AnimationControl::new(10).moves_limit, 4.0);
		assert_eq!(AnimationControl::new(100).moves_limit, 400.0);
		assert_eq!(AnimationControl::new(2).moves_limit, 0.0);
	}

	#[test]
	fn loud_steps_reset_the_counter() {
		let mut control = AnimationControl::new(10);
		for _ in 0..50 {
			assert_eq!(control.observe(1.0), Tick::Step);
		}
		assert_eq!(control.step_counter, 50);
		assert_eq!(control.observe(4.0), Tick::Step);
		assert_eq!(control.step_counter, 0);
	}

	#[test]
	fn freezes_after_quiet_steps_and_pins_targets() {
		let model = ten_nodes();
		let config = GraphConfig::default();
		let mut layout = ScriptedLayout::new(&model);
		layout.last_move = 1.0;
		let mut scene = Scene::build(&model, &layout, &config).unwrap();
		let mut frames = FrameLoop::default();
		assert!(frames.start(&mut scene, &layout).unwrap());

		for _ in 0..STEP_COUNT_LIMIT {
			frames.tick(&mut scene, &mut layout).unwrap();
		}
		let control = frames.animation.as_ref().unwrap();
		assert_eq!(control.state, Convergence::Frozen);
		assert_eq!(layout.steps, STEP_COUNT_LIMIT as usize - 1);
		assert!(layout.is_node_pinned(&NodeId::from("0")));
		assert!(layout.is_node_pinned(&NodeId::from("1")));
		assert!(!layout.is_node_pinned(&NodeId::from("2")));

		frames.tick(&mut scene, &mut layout).unwrap();
		assert_eq!(layout.steps, STEP_COUNT_LIMIT as usize - 1);
	}

	#[test]
	fn drag_resets_counter_without_unfreezing() {
		let model = ten_nodes();
		let mut layout = ScriptedLayout::new(&model);
		let mut scene = Scene::build(&model, &layout, &GraphConfig::default()).unwrap();
		let mut frames = FrameLoop::default();
		frames.start(&mut scene, &layout).unwrap();
		for _ in 0..STEP_COUNT_LIMIT {
			frames.tick(&mut scene, &mut layout).unwrap();
		}

		frames.on_drag();
		let control = frames.animation.as_ref().unwrap();
		assert_eq!(control.step_counter, 0);
		assert_eq!(control.state, Convergence::Frozen);
		let steps = layout.steps;
		frames.tick(&mut scene, &mut layout).unwrap();
		assert_eq!(layout.steps, steps);

		frames.on_topology_change(11);
		assert_eq!(frames.animation.as_ref().unwrap().state, Convergence::Running);
		frames.tick(&mut scene, &mut layout).unwrap();
		assert_eq!(layout.steps, steps + 1);
	}

	#[test]
	fn start_is_idempotent() {
		let model = ten_nodes();
		let layout = ScriptedLayout::new(&model);
		let mut scene = Scene::build(&model, &layout, &GraphConfig::default()).unwrap();
		let mut frames = FrameLoop::default();
		assert!(frames.start(&mut scene, &layout).unwrap());
		assert!(!frames.start(&mut scene, &layout).unwrap());
	}

	#[test]
	fn fixed_layout_never_steps() {
		let mut model = GraphModel::new();
		model.add_link(NodeId::from("a"), NodeId::from("b"), LinkData::default());
		let mut layout = FixedLayout::new(&model);
		let mut scene = Scene::build(&model, &layout, &GraphConfig::default()).unwrap();
		let mut frames = FrameLoop::default();
		frames.start(&mut scene, &layout).unwrap();
		assert!(frames.animation.as_ref().is_none());

		layout
			.set_node_position(&NodeId::from("a"), Vector::new(3.0, 4.0))
			.unwrap();
		frames.on_drag();
		frames.tick(&mut scene, &mut layout).unwrap();
		assert_eq!(
			scene.node(&NodeId::from("a")).unwrap().position(),
			Vector::new(3.0, 4.0)
		);
	}
}
