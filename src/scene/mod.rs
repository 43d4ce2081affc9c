//! Drawables kept in lockstep with the graph model.

mod link;
mod node;
pub mod pinning;

use std::collections::HashMap;

use log::debug;

pub use link::LinkGroup;
pub use node::NodeDrawable;

use crate::error::GraphError;
use crate::graph::{ChangeType, GraphChange, GraphLink, GraphModel, GraphNode, GroupId, NodeId, Vector};
use crate::layout::Layout;
use crate::options::GraphConfig;

/// What a batch of changes did to the scene.
#[derive(Debug, Default, PartialEq)]
pub struct Reconciled {
	/// Any node or link was added.
	pub added: bool,
	pub removed_nodes: Vec<NodeId>,
}

/// Node drawables by node id and link groups by group id, in paint order.
#[derive(Debug, Default)]
pub struct Scene {
	nodes: HashMap<NodeId, NodeDrawable>,
	node_order: Vec<NodeId>,
	links: HashMap<GroupId, LinkGroup>,
	link_order: Vec<GroupId>,
	targets: Vec<NodeId>,
}

impl Scene {
	/// Creates drawables for every node and link already in `model`.
	pub fn build(
		model: &GraphModel,
		layout: &dyn Layout,
		config: &GraphConfig,
	) -> Result<Self, GraphError> {
		let mut scene = Self::default();
		model.for_each_node(|node| scene.add_node(node, config));
		let mut links = Vec::with_capacity(model.link_count());
		model.for_each_link(|link| links.push(link.clone()));
		for link in &links {
			scene.add_link(link, layout, config)?;
		}
		Ok(scene)
	}

	pub fn add_node(&mut self, node: &GraphNode, config: &GraphConfig) {
		if self.nodes.contains_key(&node.id) {
			return;
		}
		let drawable = NodeDrawable::new(node, config);
		if drawable.target {
			self.targets.push(node.id.clone());
		}
		self.node_order.push(node.id.clone());
		self.nodes.insert(node.id.clone(), drawable);
	}

	pub fn remove_node(&mut self, id: &NodeId) -> Option<NodeDrawable> {
		let drawable = self.nodes.remove(id)?;
		self.node_order.retain(|n| n != id);
		self.targets.retain(|n| n != id);
		Some(drawable)
	}

	/// Attaches `link` to the group for its endpoints, creating the group if needed.
	pub fn add_link(
		&mut self,
		link: &GraphLink,
		layout: &dyn Layout,
		config: &GraphConfig,
	) -> Result<(), GraphError> {
		if let Some(group) = self.links.get_mut(&link.data.group_id) {
			return group.add_graph_link(link, layout);
		}
		let group = LinkGroup::new(link, layout, config)?;
		self.link_order.push(group.id.clone());
		self.links.insert(group.id.clone(), group);
		Ok(())
	}

	/// Detaches `link` from its group, destroying the group once it is empty.
	pub fn remove_link(&mut self, link: &GraphLink) {
		let group_id = &link.data.group_id;
		let Some(group) = self.links.get_mut(group_id) else {
			return;
		};
		if group.remove_graph_link(link) {
			self.links.remove(group_id);
			self.link_order.retain(|g| g != group_id);
		}
	}

	/// Applies one change batch from the model.
	pub fn apply_changes(
		&mut self,
		changes: &[GraphChange],
		layout: &dyn Layout,
		config: &GraphConfig,
	) -> Result<Reconciled, GraphError> {
		let mut result = Reconciled::default();
		for change in changes {
			match change.change_type {
				ChangeType::Add => {
					if let Some(node) = change.node() {
						self.add_node(node, config);
					}
					if let Some(link) = change.link() {
						self.add_link(link, layout, config)?;
					}
					result.added = true;
				}
				ChangeType::Remove => {
					if let Some(node) = change.node() {
						if self.remove_node(&node.id).is_some() {
							result.removed_nodes.push(node.id.clone());
						}
					}
					if let Some(link) = change.link() {
						self.remove_link(link);
					}
				}
				ChangeType::Update => {}
			}
		}
		debug!(
			"scene reconciled: {} nodes, {} link groups",
			self.node_count(),
			self.link_group_count()
		);
		Ok(result)
	}

	/// Pushes layout positions into every drawable.
	pub fn refresh(&mut self, layout: &dyn Layout) -> Result<(), GraphError> {
		for node in self.nodes.values_mut() {
			node.update(layout)?;
		}
		for link in self.links.values_mut() {
			link.update(layout)?;
		}
		Ok(())
	}

	pub fn node(&self, id: &NodeId) -> Option<&NodeDrawable> {
		self.nodes.get(id)
	}

	pub fn node_mut(&mut self, id: &NodeId) -> Option<&mut NodeDrawable> {
		self.nodes.get_mut(id)
	}

	/// Nodes in paint order.
	pub fn nodes(&self) -> impl Iterator<Item = &NodeDrawable> {
		self.node_order.iter().filter_map(|id| self.nodes.get(id))
	}

	/// Link groups in paint order.
	pub fn links(&self) -> impl Iterator<Item = &LinkGroup> {
		self.link_order.iter().filter_map(|id| self.links.get(id))
	}

	/// Target node ids in the order they were added.
	pub fn targets(&self) -> &[NodeId] {
		&self.targets
	}

	pub fn node_count(&self) -> usize {
		self.nodes.len()
	}

	pub fn link_group_count(&self) -> usize {
		self.links.len()
	}

	/// Topmost node under the world point `p`.
	pub fn node_at(&self, p: Vector, config: &GraphConfig) -> Option<NodeId> {
		self.node_order
			.iter()
			.rev()
			.filter_map(|id| self.nodes.get(id))
			.find(|node| node.contains(p, config))
			.map(|node| node.id.clone())
	}

	/// Topmost link group whose hit area covers the world point `p`.
	pub fn link_at(&self, p: Vector) -> Option<&LinkGroup> {
		self.link_order
			.iter()
			.rev()
			.filter_map(|id| self.links.get(id))
			.find(|link| link.contains(p))
	}
}

#[cfg(test)]
mod tests {
	use std::collections::HashSet;

	use super::*;
	use crate::graph::hash::group_key;
	use crate::graph::{LinkData, LinkId, NodeData};
	use crate::layout::FixedLayout;

	fn data(from: &str, to: &str, uuid: &str) -> LinkData {
		LinkData {
			uuid: uuid.into(),
			group_id: group_key(&NodeId::from(from), &NodeId::from(to)),
			label: None,
		}
	}

	struct Fixture {
		model: GraphModel,
		layout: FixedLayout,
		scene: Scene,
		rx: crossbeam::channel::Receiver<crate::graph::model::ChangeBatch>,
		config: GraphConfig,
	}

	impl Fixture {
		fn new() -> Self {
			let mut model = GraphModel::new();
			let rx = model.subscribe();
			let config = GraphConfig::default();
			let layout = FixedLayout::new(&model);
			let scene = Scene::build(&model, &layout, &config).unwrap();
			Self {
				model,
				layout,
				scene,
				rx,
				config,
			}
		}

		fn sync(&mut self) -> Reconciled {
			let mut out = Reconciled::default();
			for batch in self.rx.try_iter() {
				self.layout.apply_changes(&batch);
				let r = self
					.scene
					.apply_changes(&batch, &self.layout, &self.config)
					.unwrap();
				out.added |= r.added;
				out.removed_nodes.extend(r.removed_nodes);
			}
			out
		}

		fn link(&mut self, from: &str, to: &str, uuid: &str) -> LinkId {
			self.model
				.add_link(NodeId::from(from), NodeId::from(to), data(from, to, uuid))
		}

		fn distinct_groups(&self) -> usize {
			let mut groups = HashSet::new();
			self.model.for_each_link(|l| {
				groups.insert(l.data.group_id.clone());
			});
			groups.len()
		}
	}

	#[test]
	fn one_drawable_per_node() {
		let mut f = Fixture::new();
		f.model.add_node(NodeId::from("a"), NodeData::default());
		f.model.add_node(NodeId::from("b"), NodeData {
			target: Some(true),
			..NodeData::default()
		});
		assert!(f.sync().added);
		assert_eq!(f.scene.node_count(), 2);
		assert_eq!(f.scene.targets(), &[NodeId::from("b")]);

		f.model.remove_node(&NodeId::from("b"));
		let r = f.sync();
		assert_eq!(r.removed_nodes, vec![NodeId::from("b")]);
		assert!(f.scene.node(&NodeId::from("b")).is_none());
		assert!(f.scene.targets().is_empty());
	}

	#[test]
	fn link_groups_track_distinct_group_ids() {
		let mut f = Fixture::new();
		let ab = f.link("a", "b", "1");
		let ba = f.link("b", "a", "2");
		let bc = f.link("b", "c", "3");
		let cc = f.link("c", "c", "4");
		f.sync();
		assert_eq!(f.scene.link_group_count(), f.distinct_groups());
		assert_eq!(f.scene.link_group_count(), 3);

		f.model.remove_link(ab);
		f.sync();
		assert_eq!(f.scene.link_group_count(), 3);

		f.model.remove_link(ba);
		f.sync();
		assert_eq!(f.scene.link_group_count(), f.distinct_groups());
		assert_eq!(f.scene.link_group_count(), 2);

		f.model.remove_link(bc);
		f.model.remove_link(cc);
		f.sync();
		assert_eq!(f.scene.link_group_count(), 0);
	}

	#[test]
	fn removing_a_node_destroys_its_groups() {
		let mut f = Fixture::new();
		f.link("a", "b", "1");
		f.link("a", "c", "2");
		f.sync();
		f.model.remove_node(&NodeId::from("a"));
		f.sync();
		assert_eq!(f.scene.link_group_count(), 0);
		assert_eq!(f.scene.node_count(), 2);
	}

	#[test]
	fn bulk_add_reconciles_in_one_batch() {
		let mut f = Fixture::new();
		f.model.begin_update();
		for i in 0..5 {
			f.link(&i.to_string(), &(i + 1).to_string(), &i.to_string());
		}
		f.model.end_update();
		assert_eq!(f.rx.len(), 1);
		f.sync();
		assert_eq!(f.scene.node_count(), 6);
		assert_eq!(f.scene.link_group_count(), 5);
	}

	#[test]
	fn hit_tests_nodes_before_links() {
		let mut f = Fixture::new();
		f.model.add_node(NodeId::from("a"), NodeData {
			position: Some(Vector::ZERO),
			..NodeData::default()
		});
		f.model.add_node(NodeId::from("b"), NodeData {
			position: Some(Vector::new(200.0, 0.0)),
			..NodeData::default()
		});
		f.link("a", "b", "1");
		f.sync();
		f.scene.refresh(&f.layout).unwrap();

		assert_eq!(
			f.scene.node_at(Vector::new(5.0, 5.0), &f.config),
			Some(NodeId::from("a"))
		);
		assert!(f.scene.node_at(Vector::new(100.0, 0.0), &f.config).is_none());
		assert!(f.scene.link_at(Vector::new(100.0, 1.0)).is_some());
		assert!(f.scene.link_at(Vector::new(100.0, 50.0)).is_none());
	}
}
