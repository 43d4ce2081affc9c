//! Choosing and anchoring the main node.

use log::debug;

use super::Scene;
use crate::error::GraphError;
use crate::graph::{GraphModel, NodeId, Vector};
use crate::layout::Layout;

/// Picks the main node among `targets`.
///
/// A single target always wins. Among several, the one with the highest degree
/// wins, ties going to the earliest target.
pub fn select_main_node<'a>(
	targets: &'a [NodeId],
	degree: impl Fn(&NodeId) -> usize,
) -> Option<&'a NodeId> {
	match targets {
		[] => None,
		[only] => Some(only),
		_ => {
			let mut ranked: Vec<&NodeId> = targets.iter().collect();
			ranked.sort_by_key(|id| std::cmp::Reverse(degree(id)));
			ranked.first().copied()
		}
	}
}

/// Pins the main node at the origin unless it is already pinned.
///
/// Returns the node pinned by this call.
pub fn pin_main_node(
	scene: &Scene,
	model: &GraphModel,
	layout: &mut dyn Layout,
) -> Result<Option<NodeId>, GraphError> {
	let targets: Vec<NodeId> = scene
		.targets()
		.iter()
		.filter(|id| scene.node(id).is_some())
		.cloned()
		.collect();
	let Some(main) = select_main_node(&targets, |id| model.degree(id)) else {
		return Ok(None);
	};
	if layout.is_node_pinned(main) {
		return Ok(None);
	}
	layout.set_node_position(main, Vector::ZERO)?;
	layout.pin_node(main, true)?;
	debug!("pinned main node {main} at origin");
	Ok(Some(main.clone()))
}
