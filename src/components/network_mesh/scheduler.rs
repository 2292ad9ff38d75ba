use std::cell::RefCell;
use std::rc::Rc;

use wasm_bindgen::prelude::*;
use web_sys::Event;

use super::error::SurfaceError;
use super::host::{FrameHandle, FrameScheduler, Subscription};

/// `requestAnimationFrame` driver. Clones share the bound callback, so the
/// component can bind it after the host has taken its copy.
#[derive(Clone, Default)]
pub struct AnimationFrameScheduler {
	callback: Rc<RefCell<Option<Closure<dyn FnMut()>>>>,
}

impl AnimationFrameScheduler {
	pub fn bind(&self, callback: impl FnMut() + 'static) {
		*self.callback.borrow_mut() = Some(Closure::new(callback));
	}
}

impl FrameScheduler for AnimationFrameScheduler {
	fn request_frame(&mut self) -> Option<FrameHandle> {
		let window = web_sys::window()?;
		let callback = self.callback.borrow();
		let cb = callback.as_ref()?;
		match window.request_animation_frame(cb.as_ref().unchecked_ref()) {
			Ok(id) => Some(FrameHandle(id)),
			Err(err) => {
				log::warn!("requestAnimationFrame failed: {:?}", err);
				None
			}
		}
	}

	fn cancel_frame(&mut self, handle: FrameHandle) {
		if let Some(window) = web_sys::window() {
			let _ = window.cancel_animation_frame(handle.0);
		}
	}

	fn release(&mut self) {
		self.callback.borrow_mut().take();
	}
}

/// A `window` event listener that is removed on [`WindowListener::remove`]
/// or drop, whichever comes first.
pub struct WindowListener {
	event: &'static str,
	callback: Option<Closure<dyn FnMut(Event)>>,
}

impl WindowListener {
	pub fn register(
		event: &'static str,
		handler: impl FnMut(Event) + 'static,
	) -> Result<Self, SurfaceError> {
		let window = web_sys::window().ok_or(SurfaceError::NoDocument)?;
		let callback = Closure::<dyn FnMut(Event)>::new(handler);
		window.add_event_listener_with_callback(event, callback.as_ref().unchecked_ref())?;
		log::debug!("listening for {event}");
		Ok(Self {
			event,
			callback: Some(callback),
		})
	}

	pub fn remove(&mut self) {
		let Some(callback) = self.callback.take() else {
			return;
		};
		if let Some(window) = web_sys::window() {
			let _ = window
				.remove_event_listener_with_callback(self.event, callback.as_ref().unchecked_ref());
		}
	}
}

impl Subscription for WindowListener {
	fn unsubscribe(&mut self) {
		self.remove();
	}
}

impl Drop for WindowListener {
	fn drop(&mut self) {
		self.remove();
	}
}
