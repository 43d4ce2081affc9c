use std::cell::{Cell, RefCell};
use std::rc::Rc;

use leptos::prelude::*;
use log::{error, warn};
use wasm_bindgen::prelude::*;
use web_sys::{
	CanvasRenderingContext2d, CustomEvent, CustomEventInit, Event, EventTarget, HtmlCanvasElement,
	MouseEvent, PointerEvent, WheelEvent, Window,
};

use super::render;
use super::state::GraphState;
use super::textures::TextureStore;
use crate::events::GraphEvent;
use crate::graph::Vector;
use crate::graph::json::{GraphInput, JsonTransformers};
use crate::input::{PointerButton, PointerInput};
use crate::options::{GraphConfig, GraphOptions};

type Shared<T> = Rc<RefCell<Option<T>>>;

/// Browser callbacks registered by one mounted canvas.
#[derive(Default)]
struct Listeners {
	animate: Shared<Closure<dyn FnMut()>>,
	frame_id: Rc<Cell<i32>>,
	resize: Shared<Closure<dyn FnMut()>>,
	context_menu: Shared<Closure<dyn FnMut(Event)>>,
}

impl Listeners {
	fn release(&self) {
		self.animate.borrow_mut().take();
		let Some(window) = web_sys::window() else {
			return;
		};
		let _ = window.cancel_animation_frame(self.frame_id.get());
		if let Some(cb) = self.resize.borrow_mut().take() {
			let _ = window.remove_event_listener_with_callback("resize", cb.as_ref().unchecked_ref());
		}
		if let (Some(document), Some(cb)) = (window.document(), self.context_menu.borrow_mut().take()) {
			let _ =
				document.remove_event_listener_with_callback("contextmenu", cb.as_ref().unchecked_ref());
		}
	}
}

fn window_size(window: &Window) -> (f64, f64) {
	(
		window.inner_width().ok().and_then(|v| v.as_f64()).unwrap_or(800.0),
		window.inner_height().ok().and_then(|v| v.as_f64()).unwrap_or(600.0),
	)
}

fn context_2d(canvas: &HtmlCanvasElement) -> Option<CanvasRenderingContext2d> {
	canvas.get_context("2d").ok()??.dyn_into().ok()
}

fn pointer_input(canvas: &HtmlCanvasElement, ev: &MouseEvent) -> PointerInput {
	let rect = canvas.get_bounding_client_rect();
	let client = Vector::new(f64::from(ev.client_x()), f64::from(ev.client_y()));
	PointerInput {
		position: Vector::new(client.x - rect.left(), client.y - rect.top()),
		client,
		button: PointerButton::from_dom(ev.button()),
		primary_held: ev.buttons() & 1 == 1,
	}
}

/// Fires `event` as a bubbling `CustomEvent` whose `detail` is the event payload.
fn dispatch(target: &EventTarget, event: &GraphEvent) {
	let detail = match event.detail_json() {
		Ok(detail) => detail,
		Err(err) => {
			warn!("could not serialize {} detail: {err}", event.name());
			return;
		}
	};
	let init = CustomEventInit::new();
	init.set_bubbles(true);
	if let Ok(detail) = js_sys::JSON::parse(&detail) {
		init.set_detail(&detail);
	}
	match CustomEvent::new_with_event_init_dict(event.name(), &init) {
		Ok(custom) => {
			let _ = target.dispatch_event(&custom);
		}
		Err(err) => warn!("could not create {} event: {err:?}", event.name()),
	}
}

/// Interactive graph drawn on a canvas.
///
/// The first non-empty `data` value builds the graph; later values are merged in.
/// Gestures are reported as bubbling DOM events on the wrapping `<div>` and through
/// `on_event`.
#[component]
pub fn GraphCanvas(
	/// Graph data. Empty input draws nothing.
	#[prop(into)] data: Signal<GraphInput>,
	/// Presentation, layout and zoom options.
	#[prop(optional)] options: GraphOptions,
	/// Maps raw records to nodes and links, for this and every later `data` value.
	#[prop(optional)] transformers: Option<JsonTransformers>,
	/// Size the canvas to the window and follow its resizes.
	#[prop(default = false)] fullscreen: bool,
	/// Canvas width; defaults to the parent element's width.
	#[prop(default = None)] width: Option<f64>,
	/// Canvas height; defaults to the parent element's height.
	#[prop(default = None)] height: Option<f64>,
	/// Called with every event after it is dispatched on the DOM.
	#[prop(optional, into)] on_event: Option<Callback<GraphEvent>>,
) -> impl IntoView {
	let container_ref = NodeRef::<leptos::html::Div>::new();
	let canvas_ref = NodeRef::<leptos::html::Canvas>::new();
	let state: Shared<GraphState> = Rc::new(RefCell::new(None));
	let listeners = Rc::new(Listeners::default());
	let (state_init, listeners_init) = (state.clone(), listeners.clone());

	let listeners_cleanup = StoredValue::new_local(listeners.clone());
	on_cleanup(move || {
		listeners_cleanup.try_with_value(|l| l.release());
	});

	Effect::new(move |_| {
		let input = data.get();
		let Some(canvas) = canvas_ref.get() else {
			return;
		};
		if let Some(s) = state_init.borrow_mut().as_mut() {
			if let Err(err) = s.add_data(input) {
				warn!("graph data not added: {err}");
			}
			return;
		}
		let Some(window) = web_sys::window() else {
			return;
		};

		let (w, h) = if fullscreen {
			window_size(&window)
		} else {
			(
				width.unwrap_or_else(|| {
					canvas
						.parent_element()
						.map(|p| f64::from(p.client_width()))
						.unwrap_or(800.0)
				}),
				height.unwrap_or_else(|| {
					canvas
						.parent_element()
						.map(|p| f64::from(p.client_height()))
						.unwrap_or(600.0)
				}),
			)
		};
		canvas.set_width(w as u32);
		canvas.set_height(h as u32);

		let Some(ctx) = context_2d(&canvas) else {
			error!("canvas 2d context unavailable");
			return;
		};
		let config = GraphConfig::new(options.clone());
		let mut graph = match GraphState::init_graph(input, transformers.clone(), config, w, h) {
			Ok(Some(graph)) => graph,
			Ok(None) => return,
			Err(err) => {
				error!("graph not created: {err}");
				return;
			}
		};
		if let Err(err) = graph.start() {
			error!("renderer not started: {err}");
			return;
		}
		let mut textures = TextureStore::load(&graph.config.options);
		*state_init.borrow_mut() = Some(graph);

		if fullscreen {
			let (state_resize, canvas_resize) = (state_init.clone(), canvas.clone());
			*listeners_init.resize.borrow_mut() = Some(Closure::new(move || {
				let Some(win) = web_sys::window() else {
					return;
				};
				let (nw, nh) = window_size(&win);
				canvas_resize.set_width(nw as u32);
				canvas_resize.set_height(nh as u32);
				if let Some(ref mut s) = *state_resize.borrow_mut() {
					s.resize(nw, nh);
				}
			}));
			if let Some(ref cb) = *listeners_init.resize.borrow() {
				let _ =
					window.add_event_listener_with_callback("resize", cb.as_ref().unchecked_ref());
			}
		}

		*listeners_init.context_menu.borrow_mut() =
			Some(Closure::new(|ev: Event| ev.prevent_default()));
		if let (Some(document), Some(cb)) =
			(window.document(), listeners_init.context_menu.borrow().as_ref())
		{
			let _ =
				document.add_event_listener_with_callback("contextmenu", cb.as_ref().unchecked_ref());
		}

		let (state_anim, animate_inner, frame_id) = (
			state_init.clone(),
			listeners_init.animate.clone(),
			listeners_init.frame_id.clone(),
		);
		*listeners_init.animate.borrow_mut() = Some(Closure::new(move || {
			if let Some(ref mut s) = *state_anim.borrow_mut() {
				if let Err(err) = s.frame() {
					error!("frame failed: {err}");
				}
				render::render(s, &mut textures, &ctx);
			}
			if let (Some(cb), Some(win)) = (animate_inner.borrow().as_ref(), web_sys::window()) {
				if let Ok(id) = win.request_animation_frame(cb.as_ref().unchecked_ref()) {
					frame_id.set(id);
				}
			}
		}));
		if let Some(ref cb) = *listeners_init.animate.borrow() {
			if let Ok(id) = window.request_animation_frame(cb.as_ref().unchecked_ref()) {
				listeners_init.frame_id.set(id);
			}
		}
	});

	let emit = move |events: Vec<GraphEvent>| {
		let Some(container) = container_ref.get() else {
			return;
		};
		for event in events {
			dispatch(&container, &event);
			if let Some(cb) = on_event {
				cb.run(event);
			}
		}
	};

	let state_pd = state.clone();
	let on_pointerdown = move |ev: PointerEvent| {
		let Some(canvas) = canvas_ref.get() else {
			return;
		};
		let _ = canvas.set_pointer_capture(ev.pointer_id());
		let input = pointer_input(&canvas, &ev);
		if let Some(ref mut s) = *state_pd.borrow_mut() {
			s.pointer_down(&input);
		}
	};

	let state_pm = state.clone();
	let on_pointermove = move |ev: PointerEvent| {
		let Some(canvas) = canvas_ref.get() else {
			return;
		};
		let input = pointer_input(&canvas, &ev);
		let events = match *state_pm.borrow_mut() {
			Some(ref mut s) => s.pointer_move(&input).unwrap_or_else(|err| {
				error!("pointer move failed: {err}");
				Vec::new()
			}),
			None => return,
		};
		emit(events);
	};

	let state_pu = state.clone();
	let on_pointerup = move |ev: PointerEvent| {
		let Some(canvas) = canvas_ref.get() else {
			return;
		};
		let _ = canvas.release_pointer_capture(ev.pointer_id());
		let input = pointer_input(&canvas, &ev);
		let events = match *state_pu.borrow_mut() {
			Some(ref mut s) => s.pointer_up(&input),
			None => return,
		};
		emit(events);
	};

	let state_pc = state.clone();
	let on_pointercancel = move |_: PointerEvent| {
		if let Some(ref mut s) = *state_pc.borrow_mut() {
			s.pointer_cancel();
		}
	};

	let state_wh = state.clone();
	let on_wheel = move |ev: WheelEvent| {
		ev.prevent_default();
		let Some(canvas) = canvas_ref.get() else {
			return;
		};
		let input = pointer_input(&canvas, &ev);
		let event = match *state_wh.borrow_mut() {
			Some(ref mut s) => s.wheel(input.position, input.client, ev.delta_y()),
			None => return,
		};
		emit(event.into_iter().collect());
	};

	view! {
		<div node_ref=container_ref class="connexio-graph" style="width: 100%; height: 100%;">
			<canvas
				node_ref=canvas_ref
				class="connexio-canvas"
				on:pointerdown=on_pointerdown
				on:pointermove=on_pointermove
				on:pointerup=on_pointerup
				on:pointercancel=on_pointercancel
				on:wheel=on_wheel
				on:contextmenu=|ev: MouseEvent| ev.prevent_default()
				style="display: block; touch-action: none;"
			/>
		</div>
	}
}
