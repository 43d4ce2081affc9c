//! Building a [`GraphModel`] from JSON input.

use std::rc::Rc;

use serde::Deserialize;
use serde_json::Value;

use super::hash::{group_key, hash};
use super::{GraphModel, LinkData, NodeData, NodeId};
use crate::error::GraphError;

/// Node entry of a [`JsonGraph`].
#[derive(Clone, Debug, Deserialize)]
pub struct JsonNode {
	/// Numeric or string id.
	pub id: NodeId,
	/// Payload; defaults when absent.
	#[serde(default)]
	pub data: NodeData,
}

/// Link entry of a [`JsonGraph`].
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JsonLink {
	/// Source node id.
	pub from_id: NodeId,
	/// Target node id.
	pub to_id: NodeId,
	/// Payload. `uuid` and `group_id` are filled in when the graph is built.
	#[serde(default)]
	pub data: LinkData,
}

/// Graph in the `{ nodes, links }` interchange shape.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct JsonGraph<N = JsonNode, L = JsonLink> {
	/// Node entries.
	#[serde(default = "Vec::new")]
	pub nodes: Vec<N>,
	/// Link entries.
	#[serde(default = "Vec::new")]
	pub links: Vec<L>,
}

/// Data handed to the graph: either JSON text or arbitrary records to be transformed.
#[derive(Clone, Debug)]
pub enum GraphInput {
	/// A JSON document in the `{ nodes, links }` shape. Blank text means no graph.
	Text(String),
	/// Raw records, read as [`JsonNode`]/[`JsonLink`] or mapped by [`JsonTransformers`].
	Records(JsonGraph<Value, Value>),
}

impl Default for GraphInput {
	fn default() -> Self {
		Self::Records(JsonGraph::default())
	}
}

impl From<&str> for GraphInput {
	fn from(text: &str) -> Self {
		Self::Text(text.to_owned())
	}
}

impl From<JsonGraph<Value, Value>> for GraphInput {
	fn from(records: JsonGraph<Value, Value>) -> Self {
		Self::Records(records)
	}
}

/// User mappings from raw records to graph nodes and links.
#[derive(Clone)]
pub struct JsonTransformers {
	/// Maps one node record.
	pub node: Rc<dyn Fn(&Value) -> JsonNode>,
	/// Maps one link record.
	pub link: Rc<dyn Fn(&Value) -> JsonLink>,
}

impl std::fmt::Debug for JsonTransformers {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.write_str("JsonTransformers")
	}
}

impl GraphInput {
	fn into_records(self) -> Result<Option<JsonGraph<Value, Value>>, GraphError> {
		match self {
			Self::Text(text) if text.trim().is_empty() => Ok(None),
			Self::Text(text) => Ok(Some(serde_json::from_str(&text)?)),
			Self::Records(records) => Ok(Some(records)),
		}
	}
}

/// Builds a model from `input`.
///
/// Returns `Ok(None)` when the input has no nodes or no links.
pub fn graph_from_json(
	input: GraphInput,
	transformers: Option<&JsonTransformers>,
) -> Result<Option<GraphModel>, GraphError> {
	let Some(records) = input.into_records()? else {
		return Ok(None);
	};
	if records.nodes.is_empty() || records.links.is_empty() {
		return Ok(None);
	}

	let mut graph = GraphModel::new();
	for raw in &records.nodes {
		let node = match transformers {
			Some(t) => (t.node)(raw),
			None => JsonNode::deserialize(raw)?,
		};
		graph.add_node(node.id, node.data);
	}
	for raw in &records.links {
		let mut link = match transformers {
			Some(t) => (t.link)(raw),
			None => JsonLink::deserialize(raw)?,
		};
		if transformers.is_some() || link.data.uuid.is_empty() {
			link.data.uuid = hash(raw);
		}
		if transformers.is_some() || link.data.group_id.is_empty() {
			link.data.group_id = group_key(&link.from_id, &link.to_id);
		}
		graph.add_link(link.from_id, link.to_id, link.data);
	}
	Ok(Some(graph))
}
