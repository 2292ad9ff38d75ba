use std::cell::RefCell;
use std::rc::Rc;

use leptos::prelude::*;
use send_wrapper::SendWrapper;
use web_sys::Window;

use super::config::MeshConfig;
use super::host::{SceneHost, SceneParams, Subscription};
use super::pointer::client_position;
use super::render::CanvasSurface;
use super::scheduler::{AnimationFrameScheduler, WindowListener};
use super::types::{Theme, Viewport};
use crate::environment::{EnvironmentState, local_hour};

type Host = SceneHost<CanvasSurface, AnimationFrameScheduler>;
type SharedHost = Rc<RefCell<Option<Host>>>;

const POINTER_EVENTS: [&str; 3] = ["mousemove", "touchmove", "touchstart"];

fn window_viewport(window: &Window) -> Viewport {
	let dim = |v: Result<wasm_bindgen::JsValue, wasm_bindgen::JsValue>| {
		v.ok().and_then(|v| v.as_f64()).unwrap_or(0.0)
	};
	Viewport {
		width: dim(window.inner_width()),
		height: dim(window.inner_height()),
	}
}

fn random_seed() -> u64 {
	(js_sys::Math::random() * u32::MAX as f64) as u64
}

fn listeners(host: &SharedHost) -> Vec<Box<dyn Subscription>> {
	let mut subscriptions: Vec<Box<dyn Subscription>> = Vec::new();

	let host_resize = host.clone();
	let resize = WindowListener::register("resize", move |_| {
		let Some(window) = web_sys::window() else {
			return;
		};
		if let Some(h) = host_resize.borrow_mut().as_mut() {
			h.resize(window_viewport(&window));
		}
	});

	let pointer = POINTER_EVENTS.into_iter().map(|event| {
		let host_pointer = host.clone();
		WindowListener::register(event, move |ev| {
			let Some((x, y)) = client_position(&ev) else {
				return;
			};
			if let Some(h) = host_pointer.borrow().as_ref() {
				h.track_pointer(x, y);
			}
		})
	});

	for listener in std::iter::once(resize).chain(pointer) {
		match listener {
			Ok(listener) => subscriptions.push(Box::new(listener)),
			Err(err) => log::warn!("listener not registered: {err}"),
		}
	}
	subscriptions
}

/// Full-bleed canvas drawing the animated network. Fails soft: without a 2D
/// context the region simply stays empty.
#[component]
pub fn NetworkMeshCanvas(
	#[prop(into)] theme: Signal<Theme>,
	#[prop(into)] environment: Signal<EnvironmentState>,
	#[prop(optional)] config: Option<MeshConfig>,
) -> impl IntoView {
	let mount_ref = NodeRef::<leptos::html::Div>::new();
	let host: SharedHost = Rc::new(RefCell::new(None));
	let (host_init, host_params) = (host.clone(), host.clone());

	Effect::new(move |_| {
		let Some(container) = mount_ref.get() else {
			return;
		};
		if host_init.borrow().is_some() {
			return;
		}
		let Some(window) = web_sys::window() else {
			return;
		};

		let surface = match CanvasSurface::attach(&container) {
			Ok(surface) => surface,
			Err(err) => {
				log::warn!("network mesh disabled: {err}");
				return;
			}
		};
		let scheduler = AnimationFrameScheduler::default();
		let params = SceneParams {
			theme: theme.get_untracked(),
			environment: environment.get_untracked(),
			hour: local_hour() as f64,
			seed: random_seed(),
		};
		let config = config.clone().unwrap_or_default();
		let mut scene = SceneHost::new(config, scheduler.clone(), params);
		scene.mount(surface, window_viewport(&window));
		*host_init.borrow_mut() = Some(scene);

		let host_frame = host_init.clone();
		scheduler.bind(move || {
			if let Some(h) = host_frame.borrow_mut().as_mut() {
				let params = SceneParams {
					hour: local_hour() as f64,
					..*h.params()
				};
				h.on_parameter_change(params);
				h.frame();
			}
		});

		let subscriptions = listeners(&host_init);
		if let Some(h) = host_init.borrow_mut().as_mut() {
			h.start(subscriptions);
		}
	});

	Effect::new(move |_| {
		let (theme, environment) = (theme.get(), environment.get());
		if let Some(h) = host_params.borrow_mut().as_mut() {
			let params = SceneParams {
				theme,
				environment,
				..*h.params()
			};
			h.on_parameter_change(params);
		}
	});

	let host_cleanup = SendWrapper::new(host);
	on_cleanup(move || {
		let host = host_cleanup.take();
		if let Some(mut h) = host.borrow_mut().take() {
			h.stop();
		}
	});

	view! {
		<div
			node_ref=mount_ref
			class="network-mesh"
			style="position: absolute; inset: 0; pointer-events: none;"
		/>
	}
}
