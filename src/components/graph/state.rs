use crossbeam::channel::Receiver;
use log::{debug, info};

use crate::animation::FrameLoop;
use crate::error::GraphError;
use crate::events::GraphEvent;
use crate::graph::json::{GraphInput, JsonTransformers, graph_from_json};
use crate::graph::model::ChangeBatch;
use crate::graph::{GraphModel, LinkId, NodeId, Vector};
use crate::input::{InputContext, PointerInput, PointerRouter};
use crate::layout::{Layout, create_layout};
use crate::options::GraphConfig;
use crate::scene::Scene;
use crate::scene::pinning::pin_main_node;
use crate::viewport::ViewTransform;

/// Everything one graph instance owns: model, layout, drawables, viewport and gestures.
pub struct GraphState {
	/// Options and derived geometry.
	pub config: GraphConfig,
	/// Current pan and zoom.
	pub transform: ViewTransform,
	/// Canvas width in pixels.
	pub width: f64,
	/// Canvas height in pixels.
	pub height: f64,
	model: GraphModel,
	changes: Receiver<ChangeBatch>,
	transformers: Option<JsonTransformers>,
	layout: Box<dyn Layout>,
	scene: Scene,
	router: PointerRouter,
	frames: FrameLoop,
}

impl GraphState {
	/// Takes ownership of `model`, lays it out and pins its main node.
	pub fn new(
		mut model: GraphModel,
		config: GraphConfig,
		width: f64,
		height: f64,
	) -> Result<Self, GraphError> {
		let changes = model.subscribe();
		let mut layout = create_layout(&model, &config);
		let scene = Scene::build(&model, layout.as_ref(), &config)?;
		pin_main_node(&scene, &model, layout.as_mut())?;
		info!(
			"graph initialized: {} nodes, {} links",
			model.node_count(),
			model.link_count()
		);
		let mut state = Self {
			config,
			transform: ViewTransform::default(),
			width,
			height,
			model,
			changes,
			transformers: None,
			layout,
			scene,
			router: PointerRouter::default(),
			frames: FrameLoop::default(),
		};
		state.reset_view();
		Ok(state)
	}

	/// Builds the state from raw input. `Ok(None)` when the input holds no graph.
	pub fn init_graph(
		input: GraphInput,
		transformers: Option<JsonTransformers>,
		config: GraphConfig,
		width: f64,
		height: f64,
	) -> Result<Option<Self>, GraphError> {
		let Some(model) = graph_from_json(input, transformers.as_ref())? else {
			info!("no graph data, nothing to draw");
			return Ok(None);
		};
		let mut state = Self::new(model, config, width, height)?;
		state.transformers = transformers;
		Ok(Some(state))
	}

	/// The graph being drawn.
	pub fn model(&self) -> &GraphModel {
		&self.model
	}

	pub(crate) fn scene(&self) -> &Scene {
		&self.scene
	}

	/// Adds every node and link of `input` as a single change batch.
	///
	/// Nodes already in the graph keep their data.
	pub fn add_data(&mut self, input: GraphInput) -> Result<(), GraphError> {
		let Some(incoming) = graph_from_json(input, self.transformers.as_ref())? else {
			return Err(GraphError::NoData);
		};
		let model = &mut self.model;
		model.begin_update();
		incoming.for_each_node(|node| {
			if !model.has_node(&node.id) {
				model.add_node(node.id.clone(), node.data.clone());
			}
		});
		incoming.for_each_link(|link| {
			model.add_link(link.from_id.clone(), link.to_id.clone(), link.data.clone());
		});
		model.end_update();
		self.sync()
	}

	/// Removes a node and its links. Returns `false` if it was not in the graph.
	pub fn remove_node(&mut self, id: &NodeId) -> Result<bool, GraphError> {
		let removed = self.model.remove_node(id);
		self.sync()?;
		Ok(removed)
	}

	/// Removes one link. Returns `false` if it was not in the graph.
	pub fn remove_link(&mut self, id: LinkId) -> Result<bool, GraphError> {
		let removed = self.model.remove_link(id);
		self.sync()?;
		Ok(removed)
	}

	/// Reconciles layout and drawables with every pending change batch.
	fn sync(&mut self) -> Result<(), GraphError> {
		let batches: Vec<ChangeBatch> = self.changes.try_iter().collect();
		for batch in batches {
			self.layout.apply_changes(&batch);
			let reconciled = self
				.scene
				.apply_changes(&batch, self.layout.as_ref(), &self.config)?;
			for id in &reconciled.removed_nodes {
				self.router.release(id);
			}
			if reconciled.added {
				pin_main_node(&self.scene, &self.model, self.layout.as_mut())?;
			}
			self.frames.on_topology_change(self.scene.node_count());
			debug!("applied batch of {} changes", batch.len());
		}
		Ok(())
	}

	/// Starts the frame loop. Returns `false` if it was already running.
	pub fn start(&mut self) -> Result<bool, GraphError> {
		self.frames.start(&mut self.scene, self.layout.as_ref())
	}

	/// One loop iteration ahead of painting.
	pub fn frame(&mut self) -> Result<(), GraphError> {
		self.frames.tick(&mut self.scene, self.layout.as_mut())
	}

	/// Centers the graph origin at scale 1.
	pub fn reset_view(&mut self) {
		self.transform = ViewTransform::centered(self.width, self.height);
	}

	/// Records the new canvas size. The view keeps its pan and zoom.
	pub fn resize(&mut self, width: f64, height: f64) {
		self.width = width;
		self.height = height;
	}

	fn input(&mut self) -> (&mut PointerRouter, InputContext<'_>) {
		(
			&mut self.router,
			InputContext {
				model: &self.model,
				scene: &mut self.scene,
				layout: self.layout.as_mut(),
				viewport: &mut self.transform,
				frames: &mut self.frames,
				config: &self.config,
			},
		)
	}

	/// Starts a press on a node, a link or the background.
	pub fn pointer_down(&mut self, input: &PointerInput) {
		let (router, mut ctx) = self.input();
		router.pointer_down(&mut ctx, input);
	}

	/// Drags the pressed node or pans the background.
	pub fn pointer_move(&mut self, input: &PointerInput) -> Result<Vec<GraphEvent>, GraphError> {
		let (router, mut ctx) = self.input();
		router.pointer_move(&mut ctx, input)
	}

	/// Ends the press, returning the taps it produced.
	pub fn pointer_up(&mut self, input: &PointerInput) -> Vec<GraphEvent> {
		let (router, mut ctx) = self.input();
		router.pointer_up(&mut ctx, input)
	}

	/// Abandons the press without emitting anything.
	pub fn pointer_cancel(&mut self) {
		let (router, mut ctx) = self.input();
		router.pointer_cancel(&mut ctx);
	}

	/// Zooms about the canvas point `position`.
	pub fn wheel(&mut self, position: Vector, client: Vector, delta_y: f64) -> Option<GraphEvent> {
		let (router, mut ctx) = self.input();
		router.wheel(&mut ctx, position, client, delta_y)
	}
}
