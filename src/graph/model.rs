//! Mutable directed multigraph with batched change notifications.

use std::collections::HashMap;

use crossbeam::channel::{self, Receiver, Sender};

use super::{GraphLink, GraphNode, LinkData, LinkId, NodeData, NodeId};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ChangeType {
	Add,
	Remove,
	/// An existing node received new data.
	Update,
}

#[derive(Clone, Debug, PartialEq)]
pub enum GraphElement {
	Node(GraphNode),
	Link(GraphLink),
}

/// One entry of a change batch.
#[derive(Clone, Debug, PartialEq)]
pub struct GraphChange {
	pub change_type: ChangeType,
	pub element: GraphElement,
}

impl GraphChange {
	fn new(change_type: ChangeType, element: GraphElement) -> Self {
		Self {
			change_type,
			element,
		}
	}

	/// The node this change is about, if any.
	pub fn node(&self) -> Option<&GraphNode> {
		match &self.element {
			GraphElement::Node(node) => Some(node),
			GraphElement::Link(_) => None,
		}
	}

	/// The link this change is about, if any.
	pub fn link(&self) -> Option<&GraphLink> {
		match &self.element {
			GraphElement::Link(link) => Some(link),
			GraphElement::Node(_) => None,
		}
	}
}

/// Changes delivered together to subscribers.
pub type ChangeBatch = Vec<GraphChange>;

#[derive(Debug)]
struct NodeEntry {
	node: GraphNode,
	links: Vec<LinkId>,
}

/// Node and link storage keyed by stable ids.
///
/// Every mutation is recorded as a [`GraphChange`]. Outside of a
/// `begin_update`/`end_update` pair each change is published as its own batch;
/// inside one, all changes are published as a single batch when the outermost
/// `end_update` runs.
#[derive(Debug, Default)]
pub struct GraphModel {
	nodes: HashMap<NodeId, NodeEntry>,
	node_order: Vec<NodeId>,
	links: HashMap<LinkId, GraphLink>,
	link_order: Vec<LinkId>,
	next_link_id: LinkId,
	suspended: usize,
	pending: ChangeBatch,
	subscribers: Vec<Sender<ChangeBatch>>,
}

impl GraphModel {
	/// An empty graph.
	pub fn new() -> Self {
		Self::default()
	}

	/// Registers a listener. Dropping the receiver unsubscribes it.
	pub(crate) fn subscribe(&mut self) -> Receiver<ChangeBatch> {
		let (tx, rx) = channel::unbounded();
		self.subscribers.push(tx);
		rx
	}

	/// Starts collecting changes into one batch. Calls nest.
	pub fn begin_update(&mut self) {
		self.suspended += 1;
	}

	/// Closes a `begin_update`; the outermost one publishes the batch.
	pub fn end_update(&mut self) {
		self.suspended = self.suspended.saturating_sub(1);
		if self.suspended == 0 {
			self.flush();
		}
	}

	/// Number of nodes.
	pub fn node_count(&self) -> usize {
		self.nodes.len()
	}

	/// Number of links.
	pub fn link_count(&self) -> usize {
		self.links.len()
	}

	/// Whether `id` is in the graph.
	pub fn has_node(&self, id: &NodeId) -> bool {
		self.nodes.contains_key(id)
	}

	/// The node with `id`.
	pub fn get_node(&self, id: &NodeId) -> Option<&GraphNode> {
		self.nodes.get(id).map(|entry| &entry.node)
	}

	/// The link with `id`.
	pub fn get_link(&self, id: LinkId) -> Option<&GraphLink> {
		self.links.get(&id)
	}

	/// Visits nodes in insertion order.
	pub fn for_each_node(&self, mut f: impl FnMut(&GraphNode)) {
		for id in &self.node_order {
			if let Some(entry) = self.nodes.get(id) {
				f(&entry.node);
			}
		}
	}

	/// Visits links in insertion order.
	pub fn for_each_link(&self, mut f: impl FnMut(&GraphLink)) {
		for id in &self.link_order {
			if let Some(link) = self.links.get(id) {
				f(link);
			}
		}
	}

	/// Links touching `id`, incoming and outgoing. A self link is listed once.
	pub fn links_of(&self, id: &NodeId) -> impl Iterator<Item = &GraphLink> {
		self.nodes
			.get(id)
			.into_iter()
			.flat_map(|entry| entry.links.iter())
			.filter_map(|link_id| self.links.get(link_id))
	}

	/// Combined incoming and outgoing link count.
	pub fn degree(&self, id: &NodeId) -> usize {
		self.links_of(id).count()
	}

	/// Adds a node, or replaces the data of an existing one.
	pub fn add_node(&mut self, id: NodeId, data: NodeData) -> &GraphNode {
		let node = GraphNode {
			id: id.clone(),
			data,
		};
		let change_type = match self.nodes.get_mut(&id) {
			Some(entry) => {
				entry.node = node.clone();
				ChangeType::Update
			}
			None => {
				self.nodes.insert(
					id.clone(),
					NodeEntry {
						node: node.clone(),
						links: Vec::new(),
					},
				);
				self.node_order.push(id.clone());
				ChangeType::Add
			}
		};
		self.record(GraphChange::new(change_type, GraphElement::Node(node)));
		&self.nodes[&id].node
	}

	/// Adds a link, creating missing endpoints with default data.
	pub fn add_link(&mut self, from_id: NodeId, to_id: NodeId, data: LinkData) -> LinkId {
		self.begin_update();
		for endpoint in [&from_id, &to_id] {
			if !self.nodes.contains_key(endpoint) {
				self.add_node(endpoint.clone(), NodeData::default());
			}
		}

		let id = self.next_link_id;
		self.next_link_id += 1;
		let link = GraphLink {
			id,
			from_id: from_id.clone(),
			to_id: to_id.clone(),
			data,
		};
		if let Some(entry) = self.nodes.get_mut(&from_id) {
			entry.links.push(id);
		}
		if !link.is_self_link() {
			if let Some(entry) = self.nodes.get_mut(&to_id) {
				entry.links.push(id);
			}
		}
		self.links.insert(id, link.clone());
		self.link_order.push(id);
		self.record(GraphChange::new(ChangeType::Add, GraphElement::Link(link)));
		self.end_update();
		id
	}

	/// Removes a link. Returns `false` if it was not in the graph.
	pub fn remove_link(&mut self, id: LinkId) -> bool {
		let Some(link) = self.links.remove(&id) else {
			return false;
		};
		self.link_order.retain(|l| *l != id);
		for endpoint in [&link.from_id, &link.to_id] {
			if let Some(entry) = self.nodes.get_mut(endpoint) {
				entry.links.retain(|l| *l != id);
			}
		}
		self.record(GraphChange::new(ChangeType::Remove, GraphElement::Link(link)));
		true
	}

	/// Removes a node after removing every link touching it.
	pub fn remove_node(&mut self, id: &NodeId) -> bool {
		let Some(links) = self.nodes.get(id).map(|entry| entry.links.clone()) else {
			return false;
		};
		self.begin_update();
		for link in links {
			self.remove_link(link);
		}
		if let Some(entry) = self.nodes.remove(id) {
			self.node_order.retain(|n| n != id);
			self.record(GraphChange::new(
				ChangeType::Remove,
				GraphElement::Node(entry.node),
			));
		}
		self.end_update();
		true
	}

	fn record(&mut self, change: GraphChange) {
		self.pending.push(change);
		if self.suspended == 0 {
			self.flush();
		}
	}

	fn flush(&mut self) {
		if self.pending.is_empty() {
			return;
		}
		let batch = std::mem::take(&mut self.pending);
		self.subscribers.retain(|tx| tx.send(batch.clone()).is_ok());
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn id(s: &str) -> NodeId {
		NodeId::from(s)
	}

	#[test]
	fn bulk_update_delivers_one_batch() {
		let mut g = GraphModel::new();
		let rx = g.subscribe();
		g.begin_update();
		g.add_node(id("a"), NodeData::default());
		g.add_node(id("b"), NodeData::default());
		g.add_link(id("a"), id("b"), LinkData::default());
		g.end_update();

		let batches: Vec<_> = rx.try_iter().collect();
		assert_eq!(batches.len(), 1);
		assert_eq!(batches[0].len(), 3);
	}

	#[test]
	fn unbatched_changes_arrive_one_by_one() {
		let mut g = GraphModel::new();
		let rx = g.subscribe();
		g.add_node(id("a"), NodeData::default());
		g.add_node(id("a"), NodeData::default());
		let batches: Vec<_> = rx.try_iter().collect();
		assert_eq!(batches.len(), 2);
		assert_eq!(batches[1][0].change_type, ChangeType::Update);
	}

	#[test]
	fn add_link_creates_missing_endpoints() {
		let mut g = GraphModel::new();
		let rx = g.subscribe();
		g.add_link(id("a"), id("b"), LinkData::default());
		assert_eq!(g.node_count(), 2);
		let batch = rx.try_recv().unwrap();
		assert_eq!(batch.iter().filter(|c| c.node().is_some()).count(), 2);
		assert!(batch.last().unwrap().link().is_some());
	}

	#[test]
	fn remove_node_drops_incident_links_first() {
		let mut g = GraphModel::new();
		g.add_link(id("a"), id("b"), LinkData::default());
		g.add_link(id("b"), id("c"), LinkData::default());
		let rx = g.subscribe();

		assert!(g.remove_node(&id("b")));
		assert_eq!(g.link_count(), 0);
		assert_eq!(g.degree(&id("a")), 0);

		let batch = rx.try_recv().unwrap();
		assert_eq!(batch.len(), 3);
		assert!(batch[0].link().is_some());
		assert!(batch[1].link().is_some());
		assert_eq!(batch[2].node().map(|n| n.id.clone()), Some(id("b")));
		assert!(batch.iter().all(|c| c.change_type == ChangeType::Remove));
	}

	#[test]
	fn degree_counts_both_directions_and_self_links_once() {
		let mut g = GraphModel::new();
		g.add_link(id("a"), id("b"), LinkData::default());
		g.add_link(id("b"), id("a"), LinkData::default());
		g.add_link(id("a"), id("a"), LinkData::default());
		assert_eq!(g.degree(&id("a")), 3);
		assert_eq!(g.degree(&id("b")), 2);
		assert_eq!(g.links_of(&id("a")).count(), 3);
	}

	#[test]
	fn dropped_subscribers_are_pruned() {
		let mut g = GraphModel::new();
		drop(g.subscribe());
		g.add_node(id("a"), NodeData::default());
		assert!(g.subscribers.is_empty());
	}
}
