//! Interactive force-directed graph on an HTML canvas, as a Leptos component.

use leptos::prelude::*;
use leptos_meta::*;
use leptos_router::components::*;
use leptos_router::path;
use log::{Level, info};

// Modules
mod animation;
mod components;
mod error;
mod events;
mod graph;
mod input;
mod layout;
mod options;
mod pages;
mod scene;
mod viewport;

pub use components::graph::{GraphCanvas, GraphState};
pub use error::GraphError;
pub use events::{GraphEvent, NodeEventDetail, StageEventDetail};
pub use graph::json::{GraphInput, JsonGraph, JsonLink, JsonNode, JsonTransformers, graph_from_json};
pub use graph::{GraphLink, GraphModel, GraphNode, GroupId, LinkData, LinkId, NodeData, NodeId, Vector};
pub use input::{PointerButton, PointerInput};
pub use options::{GraphConfig, GraphOptions, LabelTransform, LayoutMode, NodeShape, NodeType};
pub use viewport::ViewTransform;

use crate::pages::home::Home;
use crate::pages::not_found::NotFound;

/// Initialize logging and panic hooks for the WASM target.
pub fn init_logging() {
	let _ = console_log::init_with_level(Level::Debug);
	console_error_panic_hook::set_once();
	info!("Logging initialized");
}

/// Demo app: the graph on the home route, 404 elsewhere.
#[component]
pub fn App() -> impl IntoView {
	provide_meta_context();

	view! {
		<Html attr:lang="en" attr:dir="ltr" attr:data-theme="light" />

		<Title text="Connexio" />

		<Meta charset="UTF-8" />
		<Meta name="viewport" content="width=device-width, initial-scale=1.0" />

		<Router>
			<Routes fallback=|| view! { <NotFound /> }>
				<Route path=path!("/") view=Home />
			</Routes>
		</Router>
	}
}
