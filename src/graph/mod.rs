//! Graph elements, the mutable graph model and the input transform.

pub mod hash;
pub mod json;
pub mod model;

use std::fmt;
use std::ops::{Add, Mul, Sub};

use serde::{Deserialize, Deserializer, Serialize};

pub use model::{ChangeType, GraphChange, GraphModel};

/// Stable node identifier. Numeric ids from the input are kept as their decimal text.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct NodeId(String);

impl NodeId {
	/// The id as text.
	pub fn as_str(&self) -> &str {
		&self.0
	}
}

impl fmt::Display for NodeId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.0)
	}
}

impl From<&str> for NodeId {
	fn from(id: &str) -> Self {
		Self(id.to_owned())
	}
}

impl From<String> for NodeId {
	fn from(id: String) -> Self {
		Self(id)
	}
}

impl From<u64> for NodeId {
	fn from(id: u64) -> Self {
		Self(id.to_string())
	}
}

impl<'de> Deserialize<'de> for NodeId {
	fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
		#[derive(Deserialize)]
		#[serde(untagged)]
		enum RawId {
			Text(String),
			Int(i64),
			Float(f64),
		}

		Ok(match RawId::deserialize(deserializer)? {
			RawId::Text(s) => Self(s),
			RawId::Int(n) => Self(n.to_string()),
			RawId::Float(n) => Self(n.to_string()),
		})
	}
}

/// Link identifier assigned by the [`GraphModel`], unique per model instance.
pub type LinkId = u64;

/// Key shared by every link between the same unordered pair of nodes.
pub type GroupId = String;

/// 2D vector in graph (world) or screen space.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Vector {
	/// Horizontal component, growing rightwards.
	pub x: f64,
	/// Vertical component, growing downwards.
	pub y: f64,
}

impl Vector {
	/// The origin.
	pub const ZERO: Self = Self { x: 0.0, y: 0.0 };

	/// Creates a vector.
	pub const fn new(x: f64, y: f64) -> Self {
		Self { x, y }
	}

	/// Unit vector pointing at `angle` radians.
	pub fn from_angle(angle: f64) -> Self {
		Self::new(angle.cos(), angle.sin())
	}

	/// Euclidean length.
	pub fn length(self) -> f64 {
		self.x.hypot(self.y)
	}

	/// Distance to another point.
	pub fn distance(self, other: Self) -> f64 {
		(self - other).length()
	}
}

impl Add for Vector {
	type Output = Self;

	fn add(self, rhs: Self) -> Self {
		Self::new(self.x + rhs.x, self.y + rhs.y)
	}
}

impl Sub for Vector {
	type Output = Self;

	fn sub(self, rhs: Self) -> Self {
		Self::new(self.x - rhs.x, self.y - rhs.y)
	}
}

impl Mul<f64> for Vector {
	type Output = Self;

	fn mul(self, rhs: f64) -> Self {
		Self::new(self.x * rhs, self.y * rhs)
	}
}

/// Payload carried by every node.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct NodeData {
	/// Node type, the key into `GraphOptions::node_types`.
	#[serde(rename = "type", default)]
	pub kind: String,
	/// Text drawn under the node.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub label: Option<String>,
	/// Targets get the target color and are preferred as the pinned main node.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub target: Option<bool>,
	/// Initial position, honored by the fixed layout and used as a seed by the force layout.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub position: Option<Vector>,
}

impl NodeData {
	/// Whether the node is flagged as a focal point of the graph.
	pub fn is_target(&self) -> bool {
		self.target.unwrap_or(false)
	}
}

/// Payload carried by every link.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkData {
	/// Identifies one source edge instance.
	#[serde(default)]
	pub uuid: String,
	/// Symmetric key of the endpoint pair.
	#[serde(default)]
	pub group_id: GroupId,
	/// Free-form caption.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub label: Option<String>,
}

/// A node stored in a [`GraphModel`].
#[derive(Clone, Debug, PartialEq)]
pub struct GraphNode {
	/// Node id.
	pub id: NodeId,
	/// Node payload.
	pub data: NodeData,
}

/// A directed link stored in a [`GraphModel`].
#[derive(Clone, Debug, PartialEq)]
pub struct GraphLink {
	/// Id assigned by the model.
	pub id: LinkId,
	/// Source node.
	pub from_id: NodeId,
	/// Target node.
	pub to_id: NodeId,
	/// Link payload.
	pub data: LinkData,
}

impl GraphLink {
	/// A link whose endpoints are the same node.
	pub fn is_self_link(&self) -> bool {
		self.from_id == self.to_id
	}
}
