use glam::DVec3;

/// Light/dark flag observed on the document root.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Theme {
	#[default]
	Light,
	Dark,
}

/// Opaque id of a primitive allocated on a drawing surface.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RenderHandle(pub u32);

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum PrimitiveKind {
	Sphere { radius: f64 },
	Line,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Material {
	pub color: u32,
	pub opacity: f64,
}

#[derive(Clone, Debug)]
pub struct Node {
	/// Fixed origin of the floating motion.
	pub position: DVec3,
	/// Animated position, written once per frame.
	pub rendered: DVec3,
	pub scale: f64,
	pub material: Material,
	pub handle: RenderHandle,
	pub connections: Vec<usize>,
	pub budget: usize,
	pub phase: f64,
}

#[derive(Clone, Debug)]
pub struct Edge {
	pub start: usize,
	pub end: usize,
	/// Endpoint coordinates, mirrored from the two nodes every frame.
	pub points: [DVec3; 2],
	pub material: Material,
	pub handle: RenderHandle,
}

/// Latest pointer sample: NDC in `[-1, 1]` plus its projection on Z = 0.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct PointerState {
	pub x: f64,
	pub y: f64,
	pub world_x: f64,
	pub world_y: f64,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Viewport {
	pub width: f64,
	pub height: f64,
}

impl Viewport {
	pub fn aspect(&self) -> f64 {
		if self.height > 0.0 {
			self.width / self.height
		} else {
			1.0
		}
	}
}

/// Per-frame style derived from the environment.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SceneStyle {
	pub fog_density: f64,
	pub opacity: f64,
	/// Rotation of the whole mesh about Z, radians.
	pub rotation: f64,
}

/// What a surface needs to draw one frame.
pub struct SceneView<'a> {
	pub nodes: &'a [Node],
	pub edges: &'a [Edge],
	pub camera: &'a super::camera::PerspectiveCamera,
	pub style: SceneStyle,
}
