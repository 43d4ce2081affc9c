use crate::error::GraphError;
use crate::graph::{GraphLink, GroupId, LinkId, Vector};
use crate::layout::{Layout, LinkPosition};
use crate::options::GraphConfig;

const ARROW_SPREAD: f64 = 20.0 * std::f64::consts::PI / 180.0;

/// Two-triangle arrowhead: `tip` on the node boundary, `wings` behind it.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Arrow {
	pub tip: Vector,
	pub wings: [Vector; 2],
}

/// Geometry snapshot of one source edge.
#[derive(Clone, Debug)]
pub struct Edge {
	pub link: LinkId,
	pub position: LinkPosition,
	pub arrow: Option<Arrow>,
}

/// The subset of [`GraphConfig`] link geometry depends on.
#[derive(Clone, Copy, Debug)]
struct LinkMetrics {
	arrow_size: f64,
	line_hit_width: f64,
	node_radius: f64,
	self_link_distance: f64,
	self_link_radius: f64,
}

impl From<&GraphConfig> for LinkMetrics {
	fn from(config: &GraphConfig) -> Self {
		Self {
			arrow_size: config.arrow_size,
			line_hit_width: config.line_hit_width,
			node_radius: config.node_radius,
			self_link_distance: config.self_link_distance,
			self_link_radius: config.self_link_radius,
		}
	}
}

/// One drawable for all links between the same two nodes.
#[derive(Clone, Debug)]
pub struct LinkGroup {
	pub id: GroupId,
	source_links: Vec<String>,
	edges: Vec<Edge>,
	self_link: bool,
	from_pos: Option<Vector>,
	hit_area: [Vector; 4],
	metrics: LinkMetrics,
}

impl LinkGroup {
	/// Creates a group seeded with `link` and computes its geometry.
	pub fn new(
		link: &GraphLink,
		layout: &dyn Layout,
		config: &GraphConfig,
	) -> Result<Self, GraphError> {
		let mut group = Self {
			id: link.data.group_id.clone(),
			source_links: vec![link.data.uuid.clone()],
			edges: vec![Edge {
				link: link.id,
				position: layout.link_position(link.id)?,
				arrow: None,
			}],
			self_link: link.is_self_link(),
			from_pos: None,
			hit_area: [Vector::ZERO; 4],
			metrics: LinkMetrics::from(config),
		};
		group.calculate_edges();
		Ok(group)
	}

	/// Attaches another edge sharing this group's endpoints.
	pub fn add_graph_link(
		&mut self,
		link: &GraphLink,
		layout: &dyn Layout,
	) -> Result<(), GraphError> {
		if link.data.group_id != self.id {
			return Err(GraphError::GroupMismatch {
				link: link.id,
				expected: self.id.clone(),
				actual: link.data.group_id.clone(),
			});
		}
		self.source_links.push(link.data.uuid.clone());
		let position = layout.link_position(link.id)?;
		match self.edges.iter_mut().find(|edge| edge.link == link.id) {
			Some(edge) => edge.position = position,
			None => self.edges.push(Edge {
				link: link.id,
				position,
				arrow: None,
			}),
		}
		self.calculate_edges();
		Ok(())
	}

	/// Detaches an edge. Returns `true` when no edges remain and the group should be destroyed.
	pub fn remove_graph_link(&mut self, link: &GraphLink) -> bool {
		if let Some(i) = self.source_links.iter().position(|uuid| *uuid == link.data.uuid) {
			self.source_links.remove(i);
		}
		self.edges.retain(|edge| edge.link != link.id);
		self.edges.is_empty()
	}

	/// Pulls endpoint positions from the layout and recomputes geometry.
	pub fn update(&mut self, layout: &dyn Layout) -> Result<(), GraphError> {
		for edge in &mut self.edges {
			edge.position = layout.link_position(edge.link)?;
		}
		self.calculate_edges();
		Ok(())
	}

	fn calculate_edges(&mut self) {
		let m = self.metrics;
		let mut hit_area_calculated = false;
		for edge in &mut self.edges {
			let to = edge.position.to;
			let from = if self.self_link {
				let from = to - Vector::new(m.self_link_distance, 0.0);
				self.from_pos = Some(from);
				from
			} else {
				edge.position.from
			};

			let angle = (to.y - from.y).atan2(to.x - from.x);
			let end = to - Vector::from_angle(angle) * m.node_radius;

			// one hit box per group, taken from the first edge
			if !hit_area_calculated {
				let offset = if self.self_link { 0.0 } else { m.node_radius };
				let size = Vector::from_angle(angle - std::f64::consts::FRAC_PI_2) * m.line_hit_width;
				let start = from + Vector::from_angle(angle) * offset;
				self.hit_area = [start + size, end + size, end - size, start - size];
				hit_area_calculated = true;
			}

			edge.arrow = Some(Arrow {
				tip: end,
				wings: [
					end - Vector::from_angle(angle - ARROW_SPREAD) * m.arrow_size,
					end - Vector::from_angle(angle + ARROW_SPREAD) * m.arrow_size,
				],
			});
		}
	}

	/// The single stroke shared by all edges of the group.
	pub fn line(&self) -> Option<(Vector, Vector)> {
		let edge = self.edges.first()?;
		let from = self.from_pos.unwrap_or(edge.position.from);
		Some((from, edge.position.to))
	}

	/// Filled circle marking a self link: center and radius.
	pub fn indicator(&self) -> Option<(Vector, f64)> {
		if !self.self_link {
			return None;
		}
		self.from_pos.map(|center| (center, self.metrics.self_link_radius))
	}

	pub fn arrows(&self) -> impl Iterator<Item = &Arrow> {
		self.edges.iter().filter_map(|edge| edge.arrow.as_ref())
	}

	/// Point-in-polygon test against the hit area.
	pub fn contains(&self, p: Vector) -> bool {
		let poly = &self.hit_area;
		let mut inside = false;
		let mut j = poly.len() - 1;
		for i in 0..poly.len() {
			let (a, b) = (poly[i], poly[j]);
			if (a.y > p.y) != (b.y > p.y) && p.x < (b.x - a.x) * (p.y - a.y) / (b.y - a.y) + a.x {
				inside = !inside;
			}
			j = i;
		}
		inside
	}
}

#[cfg(test)]
mod tests {
	use float_cmp::approx_eq;

	use super::*;
	use crate::graph::hash::group_key;
	use crate::graph::{GraphModel, LinkData, NodeData, NodeId};
	use crate::layout::FixedLayout;

	fn at(x: f64, y: f64) -> NodeData {
		NodeData {
			position: Some(Vector::new(x, y)),
			..NodeData::default()
		}
	}

	fn link(g: &GraphModel, id: LinkId) -> GraphLink {
		g.get_link(id).cloned().unwrap()
	}

	fn data(from: &str, to: &str, uuid: &str) -> LinkData {
		LinkData {
			uuid: uuid.into(),
			group_id: group_key(&NodeId::from(from), &NodeId::from(to)),
			label: None,
		}
	}

	fn model() -> GraphModel {
		let mut g = GraphModel::new();
		g.add_node(NodeId::from("a"), at(0.0, 0.0));
		g.add_node(NodeId::from("b"), at(100.0, 0.0));
		g
	}

	#[test]
	fn arrow_touches_node_boundary() {
		let mut g = model();
		let id = g.add_link(NodeId::from("a"), NodeId::from("b"), data("a", "b", "u1"));
		let layout = FixedLayout::new(&g);
		let config = GraphConfig::default();
		let group = LinkGroup::new(&link(&g, id), &layout, &config).unwrap();

		let arrow = group.arrows().next().unwrap();
		assert_eq!(arrow.tip, Vector::new(80.0, 0.0));
		for wing in arrow.wings {
			assert!(approx_eq!(f64, wing.distance(arrow.tip), config.arrow_size, epsilon = 1e-9));
			assert!(wing.x < arrow.tip.x);
		}
		assert!(approx_eq!(f64, arrow.wings[0].y, -arrow.wings[1].y, epsilon = 1e-9));
		assert_eq!(group.line(), Some((Vector::ZERO, Vector::new(100.0, 0.0))));
		assert!(group.indicator().is_none());
	}

	#[test]
	fn hit_area_straddles_the_line() {
		let mut g = model();
		let id = g.add_link(NodeId::from("a"), NodeId::from("b"), data("a", "b", "u1"));
		let layout = FixedLayout::new(&g);
		let group = LinkGroup::new(&link(&g, id), &layout, &GraphConfig::default()).unwrap();

		assert!(group.contains(Vector::new(50.0, 2.0)));
		assert!(group.contains(Vector::new(50.0, -2.0)));
		assert!(!group.contains(Vector::new(50.0, 10.0)));
		assert!(!group.contains(Vector::new(5.0, 0.0)));
	}

	#[test]
	fn self_link_offsets_source_and_draws_indicator() {
		let mut g = model();
		let id = g.add_link(NodeId::from("b"), NodeId::from("b"), data("b", "b", "u1"));
		let layout = FixedLayout::new(&g);
		let config = GraphConfig::default();
		let group = LinkGroup::new(&link(&g, id), &layout, &config).unwrap();

		assert!(group.self_link);
		let (from, to) = group.line().unwrap();
		assert_eq!(to, Vector::new(100.0, 0.0));
		assert_eq!(from, Vector::new(100.0 - config.self_link_distance, 0.0));
		let (center, radius) = group.indicator().unwrap();
		assert_eq!(center, from);
		assert_eq!(radius, config.self_link_radius);
	}

	#[test]
	fn parallel_edges_share_one_group() {
		let mut g = model();
		let ab = g.add_link(NodeId::from("a"), NodeId::from("b"), data("a", "b", "u1"));
		let ba = g.add_link(NodeId::from("b"), NodeId::from("a"), data("b", "a", "u2"));
		let layout = FixedLayout::new(&g);
		let config = GraphConfig::default();
		let mut group = LinkGroup::new(&link(&g, ab), &layout, &config).unwrap();
		group.add_graph_link(&link(&g, ba), &layout).unwrap();

		assert_eq!(group.edges.len(), 2);
		assert_eq!(group.arrows().count(), 2);
		let tips: Vec<_> = group.arrows().map(|a| a.tip).collect();
		assert!(tips[0].distance(Vector::new(80.0, 0.0)) < 1e-9);
		assert!(tips[1].distance(Vector::new(20.0, 0.0)) < 1e-9);

		assert!(!group.remove_graph_link(&link(&g, ab)));
		assert!(group.remove_graph_link(&link(&g, ba)));
		assert!(group.source_links.is_empty());
	}

	#[test]
	fn attaching_to_the_wrong_group_fails() {
		let mut g = model();
		g.add_node(NodeId::from("c"), at(0.0, 50.0));
		let ab = g.add_link(NodeId::from("a"), NodeId::from("b"), data("a", "b", "u1"));
		let ac = g.add_link(NodeId::from("a"), NodeId::from("c"), data("a", "c", "u2"));
		let layout = FixedLayout::new(&g);
		let mut group = LinkGroup::new(&link(&g, ab), &layout, &GraphConfig::default()).unwrap();

		let err = group.add_graph_link(&link(&g, ac), &layout).unwrap_err();
		assert!(matches!(err, GraphError::GroupMismatch { .. }));
		assert_eq!(group.edges.len(), 1);
	}
}
