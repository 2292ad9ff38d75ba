use std::collections::HashMap;

use glam::{DMat3, DVec3};
use wasm_bindgen::JsCast;
use web_sys::{CanvasRenderingContext2d, Element, HtmlCanvasElement};

use super::camera::ScreenPoint;
use super::error::SurfaceError;
use super::host::DrawSurface;
use super::types::{Material, PrimitiveKind, RenderHandle, SceneStyle, SceneView, Viewport};

const MIN_NODE_RADIUS: f64 = 0.5;

/// Per-handle state kept on the surface: the primitive shape and its CSS
/// color, built once at allocation.
struct Primitive {
	kind: PrimitiveKind,
	color: String,
}

fn css_color(color: u32) -> String {
	let (r, g, b) = ((color >> 16) & 0xff, (color >> 8) & 0xff, color & 0xff);
	format!("rgb({}, {}, {})", r, g, b)
}

/// Exponential-squared fog, as a multiplier on opacity.
fn fog_factor(style: &SceneStyle, depth: f64) -> f64 {
	let d = style.fog_density * depth;
	(-d * d).exp()
}

/// Perspective-projected 2D canvas appended to a container element.
pub struct CanvasSurface {
	canvas: HtmlCanvasElement,
	ctx: CanvasRenderingContext2d,
	viewport: Viewport,
	pixel_ratio: f64,
	next: u32,
	primitives: HashMap<RenderHandle, Primitive>,
}

impl CanvasSurface {
	pub fn attach(container: &Element) -> Result<Self, SurfaceError> {
		let window = web_sys::window().ok_or(SurfaceError::NoDocument)?;
		let document = window.document().ok_or(SurfaceError::NoDocument)?;
		let canvas: HtmlCanvasElement = document
			.create_element("canvas")?
			.dyn_into()
			.map_err(|_| SurfaceError::ContextUnavailable)?;
		let ctx: CanvasRenderingContext2d = canvas
			.get_context("2d")?
			.ok_or(SurfaceError::ContextUnavailable)?
			.dyn_into()
			.map_err(|_| SurfaceError::ContextUnavailable)?;

		let style = canvas.style();
		style.set_property("position", "absolute")?;
		style.set_property("inset", "0")?;
		style.set_property("display", "block")?;
		container.append_child(&canvas)?;

		Ok(Self {
			canvas,
			ctx,
			viewport: Viewport {
				width: 0.0,
				height: 0.0,
			},
			pixel_ratio: window.device_pixel_ratio().max(1.0),
			next: 0,
			primitives: HashMap::new(),
		})
	}

	fn to_screen(
		&self,
		point: DVec3,
		rotation: &DMat3,
		view: &SceneView<'_>,
	) -> Option<ScreenPoint> {
		view.camera.project(*rotation * point, self.viewport)
	}

	fn draw_edges(&self, view: &SceneView<'_>, rotation: &DMat3) {
		self.ctx.set_line_width(1.0);
		for edge in view.edges {
			let Some(primitive) = self.primitives.get(&edge.handle) else {
				continue;
			};
			let (Some(a), Some(b)) = (
				self.to_screen(edge.points[0], rotation, view),
				self.to_screen(edge.points[1], rotation, view),
			) else {
				continue;
			};
			let alpha = edge.material.opacity
				* view.style.opacity
				* fog_factor(&view.style, (a.depth + b.depth) * 0.5);

			self.ctx.set_global_alpha(alpha.clamp(0.0, 1.0));
			self.ctx.set_stroke_style_str(&primitive.color);
			self.ctx.begin_path();
			self.ctx.move_to(a.x, a.y);
			self.ctx.line_to(b.x, b.y);
			self.ctx.stroke();
		}
	}

	fn draw_nodes(&self, view: &SceneView<'_>, rotation: &DMat3) {
		for node in view.nodes {
			let Some(primitive) = self.primitives.get(&node.handle) else {
				continue;
			};
			let PrimitiveKind::Sphere { radius } = primitive.kind else {
				continue;
			};
			let Some(p) = self.to_screen(node.rendered, rotation, view) else {
				continue;
			};
			let r = (radius * node.scale * view.camera.pixels_per_unit(p.depth, self.viewport))
				.max(MIN_NODE_RADIUS);
			let alpha =
				node.material.opacity * view.style.opacity * fog_factor(&view.style, p.depth);

			self.ctx.set_global_alpha(alpha.clamp(0.0, 1.0));
			self.ctx.set_fill_style_str(&primitive.color);
			self.ctx.begin_path();
			let _ = self.ctx.arc(p.x, p.y, r, 0.0, std::f64::consts::TAU);
			self.ctx.fill();
		}
	}
}

impl DrawSurface for CanvasSurface {
	fn allocate(&mut self, kind: PrimitiveKind, material: &Material) -> RenderHandle {
		self.next += 1;
		let handle = RenderHandle(self.next);
		self.primitives.insert(
			handle,
			Primitive {
				kind,
				color: css_color(material.color),
			},
		);
		handle
	}

	fn release(&mut self, handle: RenderHandle) -> bool {
		self.primitives.remove(&handle).is_some()
	}

	fn resize(&mut self, viewport: Viewport) {
		self.viewport = viewport;
		// assigning the backing size drops the old buffer and resets the transform
		self.canvas
			.set_width((viewport.width * self.pixel_ratio).round().max(0.0) as u32);
		self.canvas
			.set_height((viewport.height * self.pixel_ratio).round().max(0.0) as u32);
		let style = self.canvas.style();
		let _ = style.set_property("width", &format!("{}px", viewport.width));
		let _ = style.set_property("height", &format!("{}px", viewport.height));
	}

	fn render(&mut self, view: &SceneView<'_>) {
		let ratio = self.pixel_ratio;
		let _ = self.ctx.set_transform(ratio, 0.0, 0.0, ratio, 0.0, 0.0);
		self.ctx
			.clear_rect(0.0, 0.0, self.viewport.width, self.viewport.height);

		let rotation = DMat3::from_rotation_z(view.style.rotation);
		self.draw_edges(view, &rotation);
		self.draw_nodes(view, &rotation);
		self.ctx.set_global_alpha(1.0);
	}

	fn detach(&mut self) {
		self.primitives.clear();
		self.canvas.remove();
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn hex_colors_become_css() {
		assert_eq!(css_color(0x475569), "rgb(71, 85, 105)");
		assert_eq!(css_color(0x000000), "rgb(0, 0, 0)");
	}

	#[test]
	fn fog_fades_with_depth() {
		let style = SceneStyle {
			fog_density: 0.03,
			opacity: 1.0,
			rotation: 0.0,
		};
		assert_eq!(fog_factor(&style, 0.0), 1.0);
		assert!(fog_factor(&style, 20.0) > fog_factor(&style, 40.0));
		assert!(fog_factor(&style, 20.0) < 1.0);
	}
}
