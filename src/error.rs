//! Error type shared by the graph model, layouts and scene.

use thiserror::Error;

use crate::graph::{GroupId, LinkId, NodeId};

/// Errors raised while building or synchronizing a graph.
#[derive(Error, Debug)]
pub enum GraphError {
	/// A position or pin was requested for a node the layout does not know.
	#[error("unknown node id `{0}`")]
	UnknownNode(NodeId),

	/// A position was requested for a link the layout does not know.
	#[error("unknown link id {0}")]
	UnknownLink(LinkId),

	/// An edge was attached to a link group with a different grouping key.
	#[error("link {link} belongs to group `{actual}`, not `{expected}`")]
	GroupMismatch {
		/// The edge being attached.
		link: LinkId,
		/// Key of the group.
		expected: GroupId,
		/// Key carried by the edge.
		actual: GroupId,
	},

	/// Input carried no nodes or no links.
	#[error("no graph data to add")]
	NoData,

	/// Input or options were not valid JSON for the expected shape.
	#[error("invalid graph json: {0}")]
	Json(#[from] serde_json::Error),
}
