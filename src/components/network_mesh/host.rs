//! Lifecycle owner of the mesh: surface, camera, node/edge arena, frame loop
//! and listener subscriptions.

use rand::SeedableRng;
use rand::rngs::SmallRng;

use super::animation::{animate_frame, scene_style};
use super::camera::PerspectiveCamera;
use super::config::MeshConfig;
use super::generator::{generate_edges, generate_nodes};
use super::pointer::PointerTracker;
use super::types::{Edge, Material, Node, PrimitiveKind, RenderHandle, SceneView, Theme, Viewport};
use crate::environment::EnvironmentState;

/// Something primitives can be allocated on and drawn to.
pub trait DrawSurface {
	fn allocate(&mut self, kind: PrimitiveKind, material: &Material) -> RenderHandle;
	/// Returns `false` when the handle was not live.
	fn release(&mut self, handle: RenderHandle) -> bool;
	fn resize(&mut self, viewport: Viewport);
	fn render(&mut self, view: &SceneView<'_>);
	/// Removes the surface from the page.
	fn detach(&mut self);
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FrameHandle(pub i32);

/// Display-refresh callback scheduling.
pub trait FrameScheduler {
	fn request_frame(&mut self) -> Option<FrameHandle>;
	/// Cancelling a handle that already fired is a no-op.
	fn cancel_frame(&mut self, handle: FrameHandle);
	/// Drops the frame callback itself.
	fn release(&mut self) {}
}

/// A registered event listener.
pub trait Subscription {
	fn unsubscribe(&mut self);
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LifecycleState {
	Uninitialized,
	Mounted,
	Running,
	Disposed,
}

/// Inputs that come from outside the mesh.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SceneParams {
	pub theme: Theme,
	pub environment: EnvironmentState,
	/// Local hour, fractional.
	pub hour: f64,
	/// Seed for node placement and edge selection.
	pub seed: u64,
}

impl Default for SceneParams {
	fn default() -> Self {
		Self {
			theme: Theme::Light,
			environment: EnvironmentState::default(),
			hour: 12.0,
			seed: 0,
		}
	}
}

pub struct SceneHost<S: DrawSurface, F: FrameScheduler> {
	config: MeshConfig,
	state: LifecycleState,
	params: SceneParams,
	surface: Option<S>,
	scheduler: F,
	pending: Option<FrameHandle>,
	subscriptions: Vec<Box<dyn Subscription>>,
	camera: Option<PerspectiveCamera>,
	viewport: Viewport,
	nodes: Vec<Node>,
	edges: Vec<Edge>,
	pointer: PointerTracker,
	time: f64,
}

impl<S: DrawSurface, F: FrameScheduler> SceneHost<S, F> {
	pub fn new(config: MeshConfig, scheduler: F, params: SceneParams) -> Self {
		Self {
			config,
			state: LifecycleState::Uninitialized,
			params,
			surface: None,
			scheduler,
			pending: None,
			subscriptions: Vec::new(),
			camera: None,
			viewport: Viewport {
				width: 0.0,
				height: 0.0,
			},
			nodes: Vec::new(),
			edges: Vec::new(),
			pointer: PointerTracker::default(),
			time: 0.0,
		}
	}

	#[cfg(test)]
	pub fn state(&self) -> LifecycleState {
		self.state
	}

	#[cfg(test)]
	pub fn nodes(&self) -> &[Node] {
		&self.nodes
	}

	#[cfg(test)]
	pub fn edges(&self) -> &[Edge] {
		&self.edges
	}

	pub fn params(&self) -> &SceneParams {
		&self.params
	}

	#[cfg(test)]
	pub fn camera(&self) -> Option<&PerspectiveCamera> {
		self.camera.as_ref()
	}

	#[cfg(test)]
	pub fn pointer(&self) -> &PointerTracker {
		&self.pointer
	}

	/// Takes ownership of `surface`, builds the camera and the mesh.
	pub fn mount(&mut self, mut surface: S, viewport: Viewport) {
		if self.state != LifecycleState::Uninitialized {
			log::warn!("mount ignored in state {:?}", self.state);
			surface.detach();
			return;
		}
		surface.resize(viewport);
		self.camera = Some(PerspectiveCamera::new(&self.config.camera, viewport.aspect()));
		self.viewport = viewport;
		self.surface = Some(surface);
		self.regenerate();
		self.state = LifecycleState::Mounted;
		log::info!(
			"network mesh mounted: {} nodes, {} edges",
			self.nodes.len(),
			self.edges.len()
		);
	}

	/// Keeps the listener subscriptions and starts the frame loop.
	pub fn start(&mut self, subscriptions: Vec<Box<dyn Subscription>>) {
		if self.state != LifecycleState::Mounted {
			log::warn!("start ignored in state {:?}", self.state);
			for mut subscription in subscriptions {
				subscription.unsubscribe();
			}
			return;
		}
		self.subscriptions = subscriptions;
		self.state = LifecycleState::Running;
		self.pending = self.scheduler.request_frame();
	}

	/// One iteration of the render loop.
	pub fn frame(&mut self) {
		if self.state != LifecycleState::Running {
			return;
		}
		// the handle that brought us here has fired
		self.pending = None;
		self.time += self.config.animation.time_step;

		let pointer = self.pointer.latest();
		animate_frame(
			&mut self.nodes,
			&mut self.edges,
			&pointer,
			self.time,
			self.params.theme,
			&self.config,
			&self.params.environment,
		);
		self.render();
		self.pending = self.scheduler.request_frame();
	}

	pub fn render(&mut self) {
		if self.state == LifecycleState::Disposed {
			return;
		}
		let (Some(surface), Some(camera)) = (self.surface.as_mut(), self.camera.as_ref()) else {
			return;
		};
		surface.render(&SceneView {
			nodes: &self.nodes,
			edges: &self.edges,
			camera,
			style: scene_style(&self.params.environment, self.params.hour),
		});
	}

	pub fn resize(&mut self, viewport: Viewport) {
		if self.state == LifecycleState::Disposed {
			return;
		}
		let (Some(surface), Some(camera)) = (self.surface.as_mut(), self.camera.as_mut()) else {
			return;
		};
		camera.set_aspect(viewport.aspect());
		surface.resize(viewport);
		self.viewport = viewport;
	}

	pub fn track_pointer(&self, client_x: f64, client_y: f64) {
		if let Some(camera) = self.camera.as_ref() {
			self.pointer.track(client_x, client_y, self.viewport, camera);
		}
	}

	/// Applies new external inputs. A theme or seed change rebuilds the whole
	/// mesh; anything else only changes per-frame style.
	pub fn on_parameter_change(&mut self, params: SceneParams) {
		if self.state == LifecycleState::Disposed || params == self.params {
			return;
		}
		let rebuild = params.theme != self.params.theme || params.seed != self.params.seed;
		self.params = params;
		if rebuild && self.surface.is_some() {
			log::debug!("regenerating mesh for {:?}", params.theme);
			self.regenerate();
		}
	}

	fn regenerate(&mut self) {
		self.release_mesh();
		let Some(surface) = self.surface.as_mut() else {
			return;
		};
		let mut rng = SmallRng::seed_from_u64(self.params.seed);
		let theme = self.params.theme;
		let mut nodes = generate_nodes(&self.config, theme, &mut rng, surface);
		let edges = generate_edges(&mut nodes, &self.config, theme, &mut rng, surface);
		self.nodes = nodes;
		self.edges = edges;
	}

	fn release_mesh(&mut self) {
		let nodes = std::mem::take(&mut self.nodes);
		let edges = std::mem::take(&mut self.edges);
		let Some(surface) = self.surface.as_mut() else {
			return;
		};
		for handle in edges.iter().map(|e| e.handle).chain(nodes.iter().map(|n| n.handle)) {
			surface.release(handle);
		}
	}

	/// Tears everything down. Safe to call in any state, any number of times.
	pub fn stop(&mut self) {
		if self.state == LifecycleState::Disposed {
			return;
		}
		if let Some(handle) = self.pending.take() {
			self.scheduler.cancel_frame(handle);
		}
		for mut subscription in self.subscriptions.drain(..) {
			subscription.unsubscribe();
		}
		self.release_mesh();
		if let Some(mut surface) = self.surface.take() {
			surface.detach();
		}
		self.scheduler.release();
		self.camera = None;
		self.state = LifecycleState::Disposed;
		log::info!("network mesh disposed");
	}
}
