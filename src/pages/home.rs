use leptos::prelude::*;
use serde_json::{Value, json};

use crate::components::graph::GraphCanvas;
use crate::events::GraphEvent;
use crate::graph::json::{GraphInput, JsonGraph};
use crate::options::{GraphOptions, NodeShape};

/// Generate a sample social graph: a random tree around one target, plus a self link.
fn generate_sample_data(n: usize) -> GraphInput {
	let nodes: Vec<Value> = (0..n)
		.map(|i| {
			json!({
				"id": i,
				"data": {
					"type": if i % 4 == 0 { "Company" } else { "Person" },
					"label": format!("Entity {i}"),
					"target": i == 0,
				},
			})
		})
		.collect();

	let mut links: Vec<Value> = (1..n)
		.map(|i| {
			let to = (rand_simple(i) * (i as f64)) as usize;
			json!({ "fromId": i, "toId": to, "data": { "label": "knows" } })
		})
		.collect();
	links.push(json!({ "fromId": 0, "toId": 0, "data": { "label": "owns" } }));

	GraphInput::Records(JsonGraph { nodes, links })
}

/// Simple pseudo-random number generator (deterministic for consistency).
fn rand_simple(seed: usize) -> f64 {
	let x = ((seed + 1) * 9301 + 49297) % 233280;
	(x as f64) / 233280.0
}

fn demo_options() -> GraphOptions {
	GraphOptions {
		shape: NodeShape::RoundSquare,
		..GraphOptions::default()
	}
	.with_label_transform(|label| label.to_uppercase())
}

/// Default Home Page
#[component]
pub fn Home() -> impl IntoView {
	let graph_data = Signal::derive(move || generate_sample_data(60));
	let (last_event, set_last_event) = signal(String::from("none yet"));
	let on_event = Callback::new(move |event: GraphEvent| {
		let detail = event.detail_json().unwrap_or_default();
		set_last_event.set(format!("{}: {}", event.name(), detail));
	});

	view! {
		<ErrorBoundary fallback=|errors| {
			view! {
				<h1>"Uh oh! Something went wrong!"</h1>

				<p>"Errors: "</p>
				<ul>
					{move || {
						errors
							.get()
							.into_iter()
							.map(|(_, e)| view! { <li>{e.to_string()}</li> })
							.collect_view()
					}}
				</ul>
			}
		}>

			<div class="fullscreen-graph">
				<GraphCanvas data=graph_data options=demo_options() fullscreen=true on_event=on_event />
				<div class="graph-overlay">
					<h1>"Connexio"</h1>
					<p class="subtitle">"Drag nodes to pin them. Scroll to zoom. Drag background to pan."</p>
					<p class="event">"Last event: " {last_event}</p>
				</div>
			</div>
		</ErrorBoundary>
	}
}
