use glam::{DMat4, DVec3, DVec4};

use super::config::CameraConfig;
use super::types::Viewport;

/// Perspective camera looking down -Z, GL clip conventions.
#[derive(Clone, Debug, PartialEq)]
pub struct PerspectiveCamera {
	pub fov: f64,
	pub aspect: f64,
	pub near: f64,
	pub far: f64,
	pub position: DVec3,
}

/// A world point mapped to the canvas.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScreenPoint {
	pub x: f64,
	pub y: f64,
	/// Distance along the view axis.
	pub depth: f64,
}

impl PerspectiveCamera {
	pub fn new(config: &CameraConfig, aspect: f64) -> Self {
		Self {
			fov: config.fov,
			aspect,
			near: config.near,
			far: config.far,
			position: DVec3::new(0.0, 0.0, config.z),
		}
	}

	pub fn set_aspect(&mut self, aspect: f64) {
		self.aspect = aspect;
	}

	pub fn view(&self) -> DMat4 {
		DMat4::look_at_rh(self.position, self.position + DVec3::NEG_Z, DVec3::Y)
	}

	pub fn projection(&self) -> DMat4 {
		DMat4::perspective_rh_gl(self.fov.to_radians(), self.aspect, self.near, self.far)
	}

	pub fn view_projection(&self) -> DMat4 {
		self.projection() * self.view()
	}

	/// NDC point (z = 0) back into world space.
	pub fn unproject(&self, ndc_x: f64, ndc_y: f64) -> DVec3 {
		self.view_projection()
			.inverse()
			.project_point3(DVec3::new(ndc_x, ndc_y, 0.0))
	}

	/// World point to canvas pixels; `None` when behind the near plane.
	pub fn project(&self, world: DVec3, viewport: Viewport) -> Option<ScreenPoint> {
		let clip = self.view_projection() * DVec4::new(world.x, world.y, world.z, 1.0);
		if clip.w <= self.near {
			return None;
		}
		let (nx, ny) = (clip.x / clip.w, clip.y / clip.w);
		Some(ScreenPoint {
			x: (nx + 1.0) * 0.5 * viewport.width,
			y: (1.0 - ny) * 0.5 * viewport.height,
			depth: clip.w,
		})
	}

	/// Canvas pixels covered by one world unit at `depth`.
	pub fn pixels_per_unit(&self, depth: f64, viewport: Viewport) -> f64 {
		let half_height = (self.fov.to_radians() * 0.5).tan() * depth;
		if half_height <= 0.0 {
			0.0
		} else {
			viewport.height * 0.5 / half_height
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn camera() -> PerspectiveCamera {
		PerspectiveCamera::new(&CameraConfig::default(), 16.0 / 9.0)
	}

	#[test]
	fn origin_projects_to_center() {
		let viewport = Viewport {
			width: 1600.0,
			height: 900.0,
		};
		let p = camera().project(DVec3::ZERO, viewport).unwrap();
		assert!((p.x - 800.0).abs() < 1e-6);
		assert!((p.y - 450.0).abs() < 1e-6);
		assert!((p.depth - 20.0).abs() < 1e-6);
	}

	#[test]
	fn points_behind_camera_are_culled() {
		let viewport = Viewport {
			width: 100.0,
			height: 100.0,
		};
		assert!(camera().project(DVec3::new(0.0, 0.0, 30.0), viewport).is_none());
	}

	#[test]
	fn unproject_lies_on_view_ray() {
		let cam = camera();
		let p = cam.unproject(0.0, 0.0);
		assert!(p.x.abs() < 1e-9 && p.y.abs() < 1e-9);
		assert!(p.z < cam.position.z);
	}
}
