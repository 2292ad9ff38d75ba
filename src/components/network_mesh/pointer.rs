use std::cell::Cell;
use std::rc::Rc;

use wasm_bindgen::JsCast;
use web_sys::{Event, MouseEvent, TouchEvent};

use super::camera::PerspectiveCamera;
use super::types::{PointerState, Viewport};

/// Client coordinates of a mouse event, or of the first finger of a touch.
pub fn client_position(event: &Event) -> Option<(f64, f64)> {
	if let Some(touch) = event.dyn_ref::<TouchEvent>() {
		let first = touch.touches().get(0)?;
		return Some((first.client_x() as f64, first.client_y() as f64));
	}
	let mouse = event.dyn_ref::<MouseEvent>()?;
	Some((mouse.client_x() as f64, mouse.client_y() as f64))
}

/// Screen position to NDC and onto the Z = 0 plane. `None` when the view ray
/// never meets the plane.
pub fn locate(
	client_x: f64,
	client_y: f64,
	viewport: Viewport,
	camera: &PerspectiveCamera,
) -> Option<PointerState> {
	if viewport.width <= 0.0 || viewport.height <= 0.0 {
		return None;
	}
	let x = client_x / viewport.width * 2.0 - 1.0;
	let y = -(client_y / viewport.height) * 2.0 + 1.0;

	let dir = (camera.unproject(x, y) - camera.position).normalize_or_zero();
	if dir.z.abs() < f64::EPSILON {
		return None;
	}
	let world = camera.position + dir * (-camera.position.z / dir.z);

	Some(PointerState {
		x,
		y,
		world_x: world.x,
		world_y: world.y,
	})
}

/// Writer side of the shared pointer record; the animation loop reads the
/// same cell once per frame.
#[derive(Clone, Debug, Default)]
pub struct PointerTracker {
	state: Rc<Cell<PointerState>>,
}

impl PointerTracker {
	pub fn latest(&self) -> PointerState {
		self.state.get()
	}

	pub fn track(
		&self,
		client_x: f64,
		client_y: f64,
		viewport: Viewport,
		camera: &PerspectiveCamera,
	) {
		if let Some(next) = locate(client_x, client_y, viewport, camera) {
			self.state.set(next);
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::components::network_mesh::config::CameraConfig;

	const VIEW: Viewport = Viewport {
		width: 1200.0,
		height: 800.0,
	};

	fn camera() -> PerspectiveCamera {
		PerspectiveCamera::new(&CameraConfig::default(), VIEW.aspect())
	}

	#[test]
	fn centre_of_screen_hits_origin() {
		let p = locate(600.0, 400.0, VIEW, &camera()).unwrap();
		assert!(p.x.abs() < 1e-12 && p.y.abs() < 1e-12);
		assert!(p.world_x.abs() < 1e-9 && p.world_y.abs() < 1e-9);
	}

	#[test]
	fn top_right_corner_matches_frustum() {
		let cam = camera();
		let p = locate(1200.0, 0.0, VIEW, &cam).unwrap();
		assert_eq!((p.x, p.y), (1.0, 1.0));
		let half_h = (cam.fov.to_radians() / 2.0).tan() * cam.position.z;
		assert!((p.world_y - half_h).abs() < 1e-6);
		assert!((p.world_x - half_h * VIEW.aspect()).abs() < 1e-6);
	}

	#[test]
	fn projected_pointer_round_trips_to_screen() {
		let cam = camera();
		let p = locate(300.0, 650.0, VIEW, &cam).unwrap();
		let back = cam
			.project(glam::DVec3::new(p.world_x, p.world_y, 0.0), VIEW)
			.unwrap();
		assert!((back.x - 300.0).abs() < 1e-6);
		assert!((back.y - 650.0).abs() < 1e-6);
	}

	#[test]
	fn last_sample_wins() {
		let (cam, tracker) = (camera(), PointerTracker::default());
		assert_eq!(tracker.latest(), PointerState::default());
		tracker.track(0.0, 0.0, VIEW, &cam);
		tracker.track(600.0, 400.0, VIEW, &cam);
		assert!(tracker.latest().world_x.abs() < 1e-9);
	}

	#[test]
	fn degenerate_viewport_is_ignored() {
		let tracker = PointerTracker::default();
		let empty = Viewport {
			width: 0.0,
			height: 0.0,
		};
		tracker.track(10.0, 10.0, empty, &camera());
		assert_eq!(tracker.latest(), PointerState::default());
	}
}
