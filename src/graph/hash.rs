//! Content hashes used to identify links and link groups.

use serde_json::{Map, Value};
use sha2::{Digest, Sha256};

use super::{GroupId, NodeId};

/// Rebuilds `value` with every object's keys in sorted order.
fn sort_keys(value: &Value) -> Value {
	match value {
		Value::Object(obj) => {
			let mut keys: Vec<&String> = obj.keys().collect();
			keys.sort();
			let mut sorted = Map::new();
			for key in keys {
				sorted.insert(key.clone(), sort_keys(&obj[key]));
			}
			Value::Object(sorted)
		}
		Value::Array(items) => Value::Array(items.iter().map(sort_keys).collect()),
		other => other.clone(),
	}
}

/// Hex encoded SHA-256 of the canonical (key sorted, compact) JSON form of `value`.
pub fn hash(value: &Value) -> String {
	let canonical = sort_keys(value).to_string();
	let digest = Sha256::digest(canonical.as_bytes());
	digest.iter().map(|b| format!("{b:02x}")).collect()
}

/// Grouping key for the unordered endpoint pair `{from, to}`.
///
/// Both ids become keys of one object, so direction does not matter and a self
/// link collapses to a single key.
pub fn group_key(from: &NodeId, to: &NodeId) -> GroupId {
	let mut pair = Map::new();
	pair.insert(from.to_string(), Value::String(String::new()));
	pair.insert(to.to_string(), Value::String(String::new()));
	hash(&Value::Object(pair))
}
